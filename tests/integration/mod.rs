//! Integration tests for capture-replay
//!
//! These tests verify that stores, mappers, the advice and wiring work together.

#[path = "../common/mod.rs"]
pub mod common;

pub mod cli;
pub mod key_properties;
pub mod wiring;
