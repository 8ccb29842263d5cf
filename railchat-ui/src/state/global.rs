//! Global Application State
//!
//! Reactive state management using Leptos signals. The project store and
//! the settings are the only persistent state; everything else is
//! transient UI state.

use leptos::*;
use railchat_core::composer::Composer;
use railchat_core::error::{Notice, NoticeLevel};
use railchat_core::kv::JsonStore;
use railchat_core::settings::Settings;
use railchat_core::store::ProjectStore;
use railchat_core::submit::Submission;

use crate::api::{BrowserFile, GlooTransport};
use crate::state::storage::LocalStorage;

/// Draft of the prompt area, bound to the active project
pub type Draft = Composer<BrowserFile>;

/// Global application state provided to all components
#[derive(Clone, Copy)]
pub struct GlobalState {
    /// Projects and the active pointer, mirrored to `localStorage`
    pub store: RwSignal<ProjectStore<LocalStorage>>,
    /// Azure OpenAI settings, mirrored to `localStorage`
    pub settings: RwSignal<Settings>,
    /// Submissions waiting for the relay
    pub pending: RwSignal<usize>,
    /// Success message (for toasts)
    pub success: RwSignal<Option<String>>,
    /// Warning message (for toasts)
    pub warning: RwSignal<Option<String>>,
    /// Error message (for toasts)
    pub error: RwSignal<Option<String>>,
}

/// Provide global state to the component tree
pub fn provide_global_state() {
    let settings = Settings::load(&JsonStore::new(LocalStorage));
    let store = ProjectStore::load(JsonStore::new(LocalStorage));
    log::info!("Loaded {} project(s)", store.projects().len());

    let state = GlobalState {
        store: create_rw_signal(store),
        settings: create_rw_signal(settings),
        pending: create_rw_signal(0),
        success: create_rw_signal(None),
        warning: create_rw_signal(None),
        error: create_rw_signal(None),
    };

    provide_context(state);
}

impl GlobalState {
    /// Id of the active project (tracked)
    pub fn active_id(&self) -> Option<String> {
        self.store.with(|s| s.active_id().map(str::to_string))
    }

    pub fn create_project(&self) {
        self.store.update(|s| {
            let project = s.create_project();
            log::info!("Created project {}", project.id);
        });
    }

    pub fn select_project(&self, id: &str) {
        self.store.update(|s| {
            s.select_project(id);
        });
    }

    /// Returns false when the name was blank or unchanged
    pub fn rename_project(&self, id: &str, name: &str) -> bool {
        self.store
            .try_update(|s| s.rename_project(id, name))
            .unwrap_or(false)
    }

    pub fn update_system_prompt(&self, prompt: &str) {
        self.store.update(|s| {
            s.update_system_prompt(prompt);
        });
    }

    /// Apply an edit to the settings and persist them right away
    pub fn update_settings(&self, edit: impl FnOnce(&mut Settings)) {
        self.settings.update(edit);
        let settings = self.settings.get_untracked();
        self.store.with_untracked(|s| settings.save(s.kv()));
    }

    /// Send the draft to the active project.
    ///
    /// The user message is appended before the request goes out; the
    /// answer lands in the project that was active at send time even if
    /// the user switches projects meanwhile.
    pub fn send(self, draft: RwSignal<Draft>) {
        let settings = self.settings.get_untracked();
        let (text, files) = draft.with_untracked(|d| {
            let (text, files) = d.draft();
            (text.to_string(), files.to_vec())
        });

        let begun = self
            .store
            .try_update(|s| Submission::begin(s, &settings, &text, files.len()));
        let mut submission = match begun {
            Some(Ok(submission)) => submission,
            Some(Err(e)) => {
                self.show_notice(&e.notice());
                return;
            }
            None => return,
        };

        self.pending.update(|n| *n += 1);
        spawn_local(async move {
            let transport = GlooTransport::default();
            let outcome = submission.exchange(&files, &transport).await;

            let project_id = submission.project_id().to_string();
            let finished = self.store.try_update(|s| submission.finish(s, outcome));
            self.pending.update(|n| *n = n.saturating_sub(1));

            match finished {
                Some(Ok(_)) => {
                    draft.try_update(|d| {
                        if d.project_id() == Some(project_id.as_str()) {
                            d.clear();
                        }
                    });
                }
                Some(Err(e)) => self.show_notice(&e.notice()),
                None => {}
            }
        });
    }

    pub fn show_notice(&self, notice: &Notice) {
        match notice.level {
            NoticeLevel::Success => self.show_success(&notice.message),
            NoticeLevel::Warning => self.show_warning(&notice.message),
            NoticeLevel::Error => self.show_error(&notice.message),
        }
    }

    /// Show a success message (auto-clears after timeout)
    pub fn show_success(&self, message: &str) {
        Self::flash(self.success, message, 3000);
    }

    /// Show a warning message (auto-clears after timeout)
    pub fn show_warning(&self, message: &str) {
        Self::flash(self.warning, message, 4000);
    }

    /// Show an error message (auto-clears after timeout)
    pub fn show_error(&self, message: &str) {
        log::error!("{}", message);
        Self::flash(self.error, message, 5000);
    }

    fn flash(signal: RwSignal<Option<String>>, message: &str, millis: u32) {
        let message = message.to_string();
        signal.set(Some(message.clone()));

        // A newer message must not be cleared by an older timer
        gloo_timers::callback::Timeout::new(millis, move || {
            signal.update(|current| {
                if current.as_deref() == Some(message.as_str()) {
                    *current = None;
                }
            });
        })
        .forget();
    }
}
