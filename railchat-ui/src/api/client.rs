//! Relay Client
//!
//! `gloo-net` transport for chat requests and `FileReader`-backed
//! attachments.

use async_trait::async_trait;
use futures::channel::oneshot;
use gloo_net::http::Request;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;

use railchat_core::attachment::{strip_data_uri_prefix, Attachment};
use railchat_core::error::{ChatError, ChatResult};
use railchat_core::submit::{ChatTransport, TransportResponse};
use railchat_core::wire::{ChatRequest, DEFAULT_CHAT_URL};

use crate::state::storage::js_message;

/// Posts chat requests to the relay with `fetch`
#[derive(Clone, Debug)]
pub struct GlooTransport {
    url: String,
}

impl GlooTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }
}

impl Default for GlooTransport {
    fn default() -> Self {
        Self::new(DEFAULT_CHAT_URL)
    }
}

#[async_trait(?Send)]
impl ChatTransport for GlooTransport {
    async fn post_chat(&self, request: &ChatRequest) -> ChatResult<TransportResponse> {
        let response = Request::post(&self.url)
            .json(request)
            .map_err(|e| ChatError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        let status = response.status();
        let status_text = response.status_text();
        let body = response
            .text()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        Ok(TransportResponse::new(status, status_text, body))
    }
}

/// A file picked in the browser
#[derive(Clone, Debug)]
pub struct BrowserFile {
    file: web_sys::File,
    name: String,
    size: u64,
    media_type: String,
}

impl BrowserFile {
    pub fn new(file: web_sys::File) -> Self {
        Self {
            name: file.name(),
            size: file.size() as u64,
            media_type: file.type_(),
            file,
        }
    }

    /// Every file of an `<input type="file">` selection
    pub fn from_list(list: &web_sys::FileList) -> Vec<Self> {
        (0..list.length())
            .filter_map(|i| list.get(i))
            .map(Self::new)
            .collect()
    }

    fn read_error(&self, reason: impl Into<String>) -> ChatError {
        ChatError::Attachment {
            filename: self.name.clone(),
            reason: reason.into(),
        }
    }
}

#[async_trait(?Send)]
impl Attachment for BrowserFile {
    fn filename(&self) -> &str {
        &self.name
    }

    fn size(&self) -> u64 {
        self.size
    }

    fn media_type(&self) -> Option<&str> {
        if self.media_type.is_empty() {
            None
        } else {
            Some(&self.media_type)
        }
    }

    async fn read_base64(&self) -> ChatResult<String> {
        let reader = web_sys::FileReader::new().map_err(|e| self.read_error(js_message(&e)))?;
        let (tx, rx) = oneshot::channel::<Result<String, String>>();
        let tx = Rc::new(RefCell::new(Some(tx)));

        let onload = {
            let reader = reader.clone();
            let tx = tx.clone();
            Closure::wrap(Box::new(move |_: web_sys::Event| {
                let result = reader
                    .result()
                    .ok()
                    .and_then(|value| value.as_string())
                    .ok_or_else(|| "Failed to read file as Base64 string".to_string());
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(result);
                }
            }) as Box<dyn FnMut(_)>)
        };
        let onerror = {
            let tx = tx.clone();
            Closure::wrap(Box::new(move |_: web_sys::Event| {
                if let Some(tx) = tx.borrow_mut().take() {
                    let _ = tx.send(Err("the browser could not read the file".to_string()));
                }
            }) as Box<dyn FnMut(_)>)
        };

        reader.set_onload(Some(onload.as_ref().unchecked_ref()));
        reader.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        reader
            .read_as_data_url(&self.file)
            .map_err(|e| self.read_error(js_message(&e)))?;

        let result = rx.await;

        // The closures are dropped below; detach them first
        reader.set_onload(None);
        reader.set_onerror(None);
        drop(onload);
        drop(onerror);

        let data_url = result
            .map_err(|_| self.read_error("read was cancelled"))?
            .map_err(|reason| self.read_error(reason))?;
        Ok(strip_data_uri_prefix(&data_url).to_string())
    }
}
