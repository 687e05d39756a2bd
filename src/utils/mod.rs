//! Utility functions shared across the application.

mod format;
mod glob;

pub use format::format_size;
pub use glob::glob_paths;
