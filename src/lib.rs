//! LevelUp edge functions
//!
//! Server-side functions for the LevelUp productivity app, served over
//! plain HTTP:
//!
//! - **User actions**: authenticated `create_*` calls that insert one row
//!   (task, project, habit, goal or transaction) owned by the caller, with
//!   defaults filled in
//! - **Text-to-speech**: proxies text to ElevenLabs and returns the MP3 as
//!   base64 inside JSON
//!
//! The data store and identity service are a Supabase project (PostgREST and
//! GoTrue). Dev mode swaps both for in-memory stand-ins.

pub mod actions;
pub mod auth;
pub mod config;
pub mod db;
pub mod logging;
pub mod routes;
pub mod server;
pub mod speech;
pub mod supabase;
pub mod types;

pub use config::Args;
pub use server::{run, serve, AppState};
pub use types::{ApiError, Result};
