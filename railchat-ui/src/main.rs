//! railchat browser client
//!
//! Project-based chat front end built with Leptos (WASM).
//!
//! # Features
//!
//! - Projects with their own system prompt and transcript
//! - Prompt composer with csv, pdf and image attachments
//! - Azure OpenAI settings kept in `localStorage`
//!
//! # Architecture
//!
//! Client-side rendered Leptos application. Projects, settings and the
//! submission flow come from `railchat-core`; this crate provides the
//! browser implementations of its seams (`localStorage`, `gloo-net`,
//! `FileReader`) and the component tree. Prompts go to the railchat relay.

use leptos::*;

mod api;
mod app;
mod components;
mod state;

fn main() {
    // Set up panic hook for better error messages in WASM
    console_error_panic_hook::set_once();

    // Core tracing events arrive through the `log` bridge
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"railchat: console logger already installed".into());
    }

    mount_to_body(|| view! { <app::App /> });
}
