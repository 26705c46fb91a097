#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg))]

mod error;
#[cfg(feature = "async-tokio")]
mod futures;
mod generator;
mod id;
#[cfg(feature = "serde")]
pub mod serde;
mod time;

pub use crate::error::*;
#[cfg_attr(docsrs, doc(cfg(feature = "async-tokio")))]
#[cfg(feature = "async-tokio")]
pub use crate::futures::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
