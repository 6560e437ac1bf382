//! Utilities for generation and shared helpers

pub mod generate;

pub use generate::{generate_password, generate_username};
