//! Browser implementations of the core I/O seams

pub mod client;

pub use client::{BrowserFile, GlooTransport};
