//! Test infrastructure for the WBXML codec
//!
//! Provides fixture loading, stochastic document generation, and harness
//! helpers.

#![allow(dead_code)]

mod generators;
mod harness;
mod loader;

pub use generators::{Gen, Op};
pub use harness::{expected_nodes, run_roundtrip, run_test, write_ops};
pub use loader::{decode_hex, load_fixtures_by_name, TestCase};
