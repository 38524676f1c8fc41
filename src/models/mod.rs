//! Data models for the Bluespace marketplace.
//!
//! Wire names are camelCase to match what the web client sends and reads.

mod analytics;
mod notification;
mod project;
mod user;

pub use analytics::*;
pub use notification::*;
pub use project::*;
pub use user::*;
