//! CLI library components for the policy codec.

pub mod logging;
pub mod summary;
