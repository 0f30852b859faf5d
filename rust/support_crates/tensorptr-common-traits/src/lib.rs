//! Traits and definitions used throughout the tensorptr crates.
//!
//! This crate provides common traits that are shared across the tensor
//! handle crates.
//!
//! # Modules
//!
//! - [`data_owner`]: Traits for owned tensor data buffers that can hand out a
//!   stable pointer to their contents

pub mod data_owner;
