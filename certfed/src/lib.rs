#![doc = include_str!("../README.md")]
#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod environment;
pub mod loader;
pub mod reference;
pub mod source;
pub mod util;

pub use crate::environment::*;

pub use crate::{loader::*, reference::*, source::*, util::*};
