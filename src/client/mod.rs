//! Native client plumbing
//!
//! Implementations of the core platform seams for the terminal client:
//! a JSON file for persistence, `reqwest` for the relay and `tokio::fs`
//! for attachments.

pub mod attachment;
pub mod file_store;
pub mod transport;

pub use attachment::PathAttachment;
pub use file_store::FileStore;
pub use transport::ReqwestTransport;
