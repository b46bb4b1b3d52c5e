//! Supabase HTTP client
//!
//! Thin wrapper over the two Supabase endpoints the edge functions need:
//! the auth server's user lookup and PostgREST inserts.

pub mod client;
pub mod error;

pub use client::{AuthUser, SupabaseClient};
pub use error::{Result, SupabaseError};
