// src/utils/mod.rs
//! Common utilities

pub mod config;
pub mod errors;
