//! Structured grid geometry

pub mod dimensions;

pub use dimensions::*;
