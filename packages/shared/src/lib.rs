//! Utilities shared by the Yoriai packages.

pub mod logger;
pub mod time;
