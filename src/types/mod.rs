//! Tipos compartilhados do Leitbox.

pub mod config;
pub mod errors;
