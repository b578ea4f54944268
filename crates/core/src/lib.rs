//! Shared domain primitives for the marquee service.

pub mod types;
pub mod validation;
