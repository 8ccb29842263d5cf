//! Chat Interface
//!
//! Transcript of the active project above the prompt area.

use leptos::html::Div;
use leptos::*;
use railchat_core::model::{ChatMessage, Role};

use crate::components::PromptInputArea;
use crate::state::global::GlobalState;

#[component]
pub fn ChatInterface() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let scroller = create_node_ref::<Div>();

    let history = create_memo(move |_| {
        state.store.with(|s| {
            s.active_project()
                .map(|p| p.history.clone())
                .unwrap_or_default()
        })
    });
    let placeholder = move || {
        state.store.with(|s| match s.active_project() {
            Some(p) => format!("Start chatting in \"{}\"!", p.name),
            None => "Select or create a project to begin.".to_string(),
        })
    };

    // Keep the newest message in view
    create_effect(move |_| {
        history.track();
        request_animation_frame(move || {
            if let Some(el) = scroller.get_untracked() {
                el.set_scroll_top(el.scroll_height());
            }
        });
    });

    view! {
        <div node_ref=scroller class="flex-1 overflow-y-auto p-4">
            <Show
                when=move || history.with(|h| !h.is_empty())
                fallback=move || view! {
                    <div class="h-full flex items-center justify-center text-gray-400">
                        {placeholder}
                    </div>
                }
            >
                <For
                    each=move || history.get()
                    key=|message| message.id.clone()
                    children=|message| view! { <MessageBubble message=message /> }
                />
            </Show>

            <Show when=move || state.pending.get() > 0>
                <div class="flex items-center space-x-2 text-gray-400 text-sm mb-4">
                    <div class="loading-spinner w-4 h-4" />
                    <span>"Waiting for the assistant..."</span>
                </div>
            </Show>
        </div>

        <div class="border-t border-gray-700 p-4">
            <PromptInputArea />
        </div>
    }
}

#[component]
fn MessageBubble(message: ChatMessage) -> impl IntoView {
    let (row, bubble) = match message.role {
        Role::User => (
            "flex justify-end mb-4",
            "max-w-[70%] p-3 rounded-s-xl rounded-ee-xl bg-primary-600 text-white",
        ),
        Role::Assistant => (
            "flex items-start mb-4",
            "max-w-[70%] p-3 rounded-e-xl rounded-es-xl bg-gray-700 text-white",
        ),
    };

    view! {
        <div class=row>
            <div class=bubble>
                <p class="text-sm whitespace-pre-wrap break-words">{message.content}</p>
            </div>
        </div>
    }
}
