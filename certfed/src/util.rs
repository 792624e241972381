//! Basic utility functionality supporting certificate resolution

pub mod error;

pub use crate::util::error::*;
