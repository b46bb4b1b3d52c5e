//! HTTP route handlers

pub mod actions;
pub mod health;
pub mod response;
pub mod speech;

pub use actions::handle_user_action;
pub use health::{health_check, version_info};
pub use response::BoxBody;
pub use speech::handle_text_to_speech;
