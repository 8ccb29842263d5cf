//! State Management
//!
//! Global reactive state and the `localStorage` backend it persists to.

pub mod global;
pub mod storage;

pub use global::{provide_global_state, GlobalState};
pub use storage::LocalStorage;
