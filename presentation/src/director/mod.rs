//! Human director adapters

pub mod stdin;
