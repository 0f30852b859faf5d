//! Test utilities for the tensorptr crates.
//!
//! This crate provides:
//! - Cleanup probes that record when, how often and with which pointer a
//!   tensor data deleter is invoked
//! - Owned data buffers that report when they are dropped
//!
//! It is meant for use in the tensorptr test suites only.

pub mod buffer;
pub mod probe;
