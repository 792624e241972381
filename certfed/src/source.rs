//! Certificate stores composing remote retrieval, caching and validation

pub mod cache;
pub mod caching;
pub mod federation;
pub mod intermediate;
pub mod remote;

pub use crate::{
    source::cache::*, source::caching::*, source::federation::*, source::intermediate::*,
    source::remote::*,
};
