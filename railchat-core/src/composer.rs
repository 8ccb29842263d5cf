//! Prompt Composer
//!
//! Transient draft state (text and attachments) for the active project.
//! Never persisted; switching projects discards the draft.

use crate::attachment::{check_attachment, Attachment, AttachmentRejection};

pub struct Composer<A> {
    project_id: Option<String>,
    text: String,
    attachments: Vec<A>,
}

impl<A> Default for Composer<A> {
    fn default() -> Self {
        Self {
            project_id: None,
            text: String::new(),
            attachments: Vec::new(),
        }
    }
}

impl<A: Attachment> Composer<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind to `project_id`, resetting the draft if it differs from the current binding
    pub fn sync_project(&mut self, project_id: Option<&str>) {
        if self.project_id.as_deref() != project_id {
            self.project_id = project_id.map(str::to_string);
            self.clear();
        }
    }

    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn attachments(&self) -> &[A] {
        &self.attachments
    }

    /// Add files that pass the policy; duplicates (same name and size) are skipped.
    /// Returns the refused files.
    pub fn attach(&mut self, files: impl IntoIterator<Item = A>) -> Vec<AttachmentRejection> {
        let mut rejected = Vec::new();

        for file in files {
            if let Err(rejection) = check_attachment(&file) {
                tracing::debug!(filename = file.filename(), "Attachment rejected");
                rejected.push(rejection);
                continue;
            }

            let duplicate = self
                .attachments
                .iter()
                .any(|a| a.filename() == file.filename() && a.size() == file.size());
            if !duplicate {
                self.attachments.push(file);
            }
        }

        rejected
    }

    /// Remove every attachment named `filename`
    pub fn remove(&mut self, filename: &str) {
        self.attachments.retain(|a| a.filename() != filename);
    }

    /// A project is bound and there is text or at least one file
    pub fn can_send(&self) -> bool {
        self.project_id.is_some() && (!self.text.trim().is_empty() || !self.attachments.is_empty())
    }

    /// Take the draft for submission, leaving the composer untouched
    pub fn draft(&self) -> (&str, &[A]) {
        (&self.text, &self.attachments)
    }

    /// Drop the draft after a successful submission
    pub fn clear(&mut self) {
        self.text.clear();
        self.attachments.clear();
    }
}
