//! Shared utilities: timing and periodic scheduling

pub mod scheduler;
pub mod time;
