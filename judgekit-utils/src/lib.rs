#![deny(clippy::all)]

pub mod tracing;
