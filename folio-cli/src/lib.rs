//! Library half of the `folio` binary, exposing the inspect transforms.

pub mod transforms;
