//! File Attachment
//!
//! Paperclip button over a hidden file input, and the list of files
//! attached to the draft. Refused files are reported as error toasts.

use leptos::html::Input;
use leptos::*;
use railchat_core::attachment::{Attachment, ALLOWED_KINDS};
use wasm_bindgen::JsCast;

use crate::api::BrowserFile;
use crate::state::global::{Draft, GlobalState};

#[component]
pub fn FileAttachment(draft: RwSignal<Draft>, #[prop(into)] disabled: Signal<bool>) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let picker = create_node_ref::<Input>();

    let accept = ALLOWED_KINDS
        .iter()
        .flat_map(|(mime, extensions)| {
            std::iter::once(mime.to_string()).chain(extensions.iter().map(|ext| format!(".{}", ext)))
        })
        .collect::<Vec<_>>()
        .join(",");

    let on_change = move |ev: ev::Event| {
        let Some(input) = ev
            .target()
            .and_then(|t| t.dyn_into::<web_sys::HtmlInputElement>().ok())
        else {
            return;
        };
        let Some(list) = input.files() else {
            return;
        };

        let files = BrowserFile::from_list(&list);
        let rejected = draft.try_update(|d| d.attach(files)).unwrap_or_default();
        for rejection in rejected {
            state.show_error(&rejection.to_string());
        }

        // Picking the same file again must fire `change`
        input.set_value("");
    };

    let open_picker = move |_| {
        if let Some(input) = picker.get_untracked() {
            input.click();
        }
    };

    let attached = move || {
        draft.with(|d| {
            d.attachments()
                .iter()
                .map(|f| (f.filename().to_string(), f.size()))
                .collect::<Vec<_>>()
        })
    };

    view! {
        <div class="mt-2 space-y-2">
            <input
                node_ref=picker
                type="file"
                multiple=true
                accept=accept
                class="hidden"
                on:change=on_change
            />

            <button
                on:click=open_picker
                prop:disabled=disabled
                title="Attach file"
                class="h-9 w-9 rounded-lg border border-gray-600 hover:bg-gray-700
                       disabled:opacity-50 disabled:cursor-not-allowed"
            >
                "📎"
            </button>

            <Show when=move || draft.with(|d| !d.attachments().is_empty())>
                <div class="space-y-1">
                    <p class="text-sm font-medium">"Attached files:"</p>
                    <ul class="list-none p-0 m-0 space-y-1">
                        <For
                            each=attached
                            key=|entry| entry.clone()
                            children=move |(name, size)| {
                                let label = name.clone();
                                view! {
                                    <li class="flex items-center justify-between text-sm p-1 bg-gray-800 rounded-sm">
                                        <div class="flex items-center space-x-1 truncate">
                                            <span class="shrink-0">"📄"</span>
                                            <span class="truncate" title=label.clone()>{label}</span>
                                            <span class="text-xs text-gray-400">{format_size(size)}</span>
                                        </div>
                                        <button
                                            on:click=move |_| draft.update(|d| d.remove(&name))
                                            class="h-5 w-5 text-gray-400 hover:text-white"
                                            title="Remove"
                                        >
                                            "✕"
                                        </button>
                                    </li>
                                }
                            }
                        />
                    </ul>
                </div>
            </Show>
        </div>
    }
}

/// Size in megabytes with two decimals, e.g. `(1.50 MB)`
fn format_size(bytes: u64) -> String {
    format!("({:.2} MB)", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(0), "(0.00 MB)");
        assert_eq!(format_size(1024 * 1024 * 3 / 2), "(1.50 MB)");
        assert_eq!(format_size(20 * 1024 * 1024), "(20.00 MB)");
    }
}
