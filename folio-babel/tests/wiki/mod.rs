//! Native wiki dialect tests

mod export;
mod import;
