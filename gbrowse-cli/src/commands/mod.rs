//! Command implementations for the gbrowse CLI

pub mod config;
pub mod render;
pub mod resolve;
