//! CLI commands for gazeta

pub mod dispatch;
pub mod helpers;
pub mod list;
pub mod manifest;
pub mod resolve;
pub mod rotate;
pub mod verify;
