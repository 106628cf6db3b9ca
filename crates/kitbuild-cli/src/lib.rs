//! kitbuild CLI library.
//!
//! This crate provides the commands behind the `kitbuild` binary: config
//! validation and CSP header rendering.

pub mod commands;
