//! Authentication for the edge functions
//!
//! Provides:
//! - Bearer token extraction and the auth gate
//! - Identity resolution via the Supabase auth server
//! - Local JWT verification when the project secret is configured
//! - A dev-mode resolver for running without Supabase

pub mod dev;
pub mod gate;
pub mod jwt;
pub mod supabase;

pub use dev::DevIdentityResolver;
pub use gate::{authenticate, extract_token_from_header, Identity, IdentityResolver};
pub use jwt::{Claims, JwtIdentityResolver};
pub use supabase::SupabaseAuthResolver;
