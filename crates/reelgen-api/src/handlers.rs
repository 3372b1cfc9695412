//! HTTP handlers.

pub mod health;
pub mod render;

pub use health::{health, ready};
pub use render::render;
