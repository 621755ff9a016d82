//! Property-based tests for snaptree

mod determinism;
