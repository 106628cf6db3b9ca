//! kitbuild End-to-End Test Infrastructure
//!
//! This crate provides integration tests that drive the build contracts the
//! way an adapter and a prerenderer would:
//!
//! - **Entries**: routes -> grouped serving units -> manifests on disk
//! - **CSP**: config files -> validated directives -> response headers
//! - **Prerender**: crawl issues -> policy decisions -> prerendered manifest
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p kitbuild-tests
//! ```

pub mod fixtures;
