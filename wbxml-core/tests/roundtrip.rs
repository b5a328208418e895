//! Stochastic writer/reader round trips
//!
//! Set `WBXML_TEST_SEED` to replay a failing run.

mod common;

use common::{run_roundtrip, Gen};

const ITERATIONS: usize = 200;

#[test]
fn generated_documents_roundtrip() {
    let mut gen = Gen::from_env_or_random();
    for i in 0..ITERATIONS {
        let result = run_roundtrip(&mut gen);
        if !result.passed {
            result.print_failure(&format!("iteration {}", i));
            panic!("round trip failed (seed {})", result.seed);
        }
    }
}

#[test]
fn fixed_seed_roundtrip() {
    let mut gen = Gen::new(0x5eed);
    for _ in 0..50 {
        let result = run_roundtrip(&mut gen);
        assert!(result.passed, "{:?}", result.errors);
    }
}
