//! # railchat-core
//!
//! Platform-neutral state of the railchat client: projects and their
//! transcripts, completion settings, the prompt composer and the
//! submission flow that talks to the completion relay.
//!
//! ## Modules
//!
//! - [`kv`]: string key-value persistence with JSON helpers
//! - [`store`]: the project list and the active-project pointer
//! - [`composer`]: draft text and attachments for the active project
//! - [`submit`]: validation, optimistic update and response reconciliation
//! - [`wire`]: request and response bodies of the relay
//!
//! Platform seams are traits: [`kv::KeyValueStore`] for persistence,
//! [`submit::ChatTransport`] for HTTP and [`attachment::Attachment`] for
//! reading files. The browser client and the CLI each provide their own.

pub mod attachment;
pub mod composer;
pub mod error;
pub mod kv;
pub mod model;
pub mod settings;
pub mod store;
pub mod submit;
pub mod wire;

pub use attachment::{Attachment, AttachmentRejection, InMemoryAttachment};
pub use composer::Composer;
pub use error::{ChatError, ChatResult, Notice, NoticeLevel, StorageError, ValidationError};
pub use kv::{JsonStore, KeyValueStore, MemoryStore};
pub use model::{ChatMessage, Project, Role};
pub use settings::Settings;
pub use store::ProjectStore;
pub use submit::{submit, ChatTransport, Submission, SubmissionPhase, TransportResponse};
pub use wire::{ChatRequest, ChatResponse, ErrorDetail, FileData};
