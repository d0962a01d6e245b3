//! HTTP front-end for the progress-photo pipeline.
//!
//! The router, handlers, and error mapping live here so integration
//! tests can drive them in-process; the binary in `main.rs` only adds
//! model loading and process setup.

pub mod error;
pub mod routes;
