//! # railchat
//!
//! Chat client for Azure OpenAI deployments, organised in projects with
//! their own system prompt and transcript.
//!
//! This crate holds the native side:
//!
//! - [`api`]: the completion relay (`POST /api/chat`) that extracts text
//!   from attached files and forwards the prompt to Azure OpenAI
//! - [`completion`]: the Azure OpenAI chat completions client
//! - [`extract`]: CSV and PDF text extraction
//! - [`client`]: file store, HTTP transport and disk attachments used by
//!   the terminal client
//! - [`config`] and [`logging`]: shared by both binaries
//!
//! Projects, settings and the submission flow live in `railchat-core`,
//! which the browser client shares.

pub mod api;
pub mod client;
pub mod completion;
pub mod config;
pub mod extract;
pub mod logging;

