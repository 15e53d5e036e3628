//! Shared utilities.

mod timestamps;

pub use timestamps::unix_now;
