//! Model definitions
//!
//! The topology document is split into one module per resource kind.

mod integration;
mod organization;
mod project;
mod team;
mod topology;
mod user;
mod variables;

// Re-exports
pub use integration::*;
pub use organization::*;
pub use project::*;
pub use team::*;
pub use topology::*;
pub use user::*;
pub use variables::*;
