//! Built-in dialect descriptors
//!
//! Each submodule returns a [`Dialect`](crate::dialect::Dialect) built from
//! data only. The engine has no code specific to either of them.

pub mod markdown;
pub mod wiki;

pub use markdown::markdown;
pub use wiki::wiki;
