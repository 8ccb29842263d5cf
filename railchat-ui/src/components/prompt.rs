//! Prompt Input Area
//!
//! Tabs for the user prompt (with attachments) and the project's system
//! prompt. The draft lives here and is reset whenever the active project
//! changes.

use leptos::*;
use railchat_core::model::{Project, DEFAULT_SYSTEM_PROMPT};

use crate::components::FileAttachment;
use crate::state::global::{Draft, GlobalState};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Tab {
    User,
    System,
}

#[component]
pub fn PromptInputArea() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let draft = create_rw_signal(Draft::new());
    let (tab, set_tab) = create_signal(Tab::User);
    let system_prompt = create_rw_signal(String::new());

    // Only fires when the selection changes, not on every store write
    let active_id = create_memo(move |_| state.active_id());

    create_effect(move |_| {
        let active = active_id.get();
        draft.update(|d| d.sync_project(active.as_deref()));

        let prompt = state.store.with_untracked(|s| editor_prompt(s.active_project()));
        system_prompt.set(prompt);
    });

    let no_project = move || active_id.with(Option::is_none);
    let send_disabled = move || !draft.with(|d| d.can_send());
    let send = move || {
        if !send_disabled() {
            state.send(draft);
        }
    };

    let tab_class = move |which: Tab| {
        move || {
            if tab.get() == which {
                "px-4 py-2 text-sm rounded-md bg-gray-700 font-medium"
            } else {
                "px-4 py-2 text-sm rounded-md text-gray-400 hover:text-white"
            }
        }
    };

    view! {
        <div class="space-y-2">
            <div class="inline-flex p-1 rounded-lg bg-gray-800">
                <button class=tab_class(Tab::User) on:click=move |_| set_tab.set(Tab::User)>
                    "User Prompt"
                </button>
                <button class=tab_class(Tab::System) on:click=move |_| set_tab.set(Tab::System)>
                    "System Prompt"
                </button>
            </div>

            <Show
                when=move || tab.get() == Tab::User
                fallback=move || view! {
                    <textarea
                        placeholder="Enter system prompt here..."
                        prop:value=system_prompt
                        prop:disabled=no_project
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            state.update_system_prompt(&value);
                            system_prompt.set(value);
                        }
                        rows="4"
                        class="w-full bg-gray-800 rounded-lg px-4 py-3 border border-gray-600
                               focus:border-primary-500 focus:outline-none resize-y"
                    />
                }
            >
                <div class="flex items-end space-x-2">
                    <textarea
                        placeholder="Enter your message..."
                        prop:value=move || draft.with(|d| d.text().to_string())
                        prop:disabled=no_project
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            draft.update(|d| d.set_text(value));
                        }
                        on:keydown=move |ev: ev::KeyboardEvent| {
                            if ev.key() == "Enter" && !ev.shift_key() {
                                ev.prevent_default();
                                send();
                            }
                        }
                        rows="3"
                        class="flex-1 bg-gray-800 rounded-lg px-4 py-3 border border-gray-600
                               focus:border-primary-500 focus:outline-none resize-y"
                    />
                    <button
                        on:click=move |_| send()
                        prop:disabled=send_disabled
                        title="Send"
                        class="h-10 w-10 rounded-lg bg-primary-600 hover:bg-primary-700
                               disabled:opacity-50 disabled:cursor-not-allowed"
                    >
                        "➤"
                    </button>
                </div>
                <FileAttachment draft=draft disabled=Signal::derive(no_project) />
            </Show>
        </div>
    }
}

/// Text shown in the system prompt editor; the default when no project is active
fn editor_prompt(project: Option<&Project>) -> String {
    project
        .map(Project::resolved_system_prompt)
        .unwrap_or(DEFAULT_SYSTEM_PROMPT)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_editor_prompt() {
        assert_eq!(editor_prompt(None), DEFAULT_SYSTEM_PROMPT);

        let mut project = Project::new();
        assert_eq!(editor_prompt(Some(&project)), DEFAULT_SYSTEM_PROMPT);

        project.system_prompt = Some("Answer like a pirate.".to_string());
        assert_eq!(editor_prompt(Some(&project)), "Answer like a pirate.");
    }
}
