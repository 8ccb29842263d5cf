//! Settings Panel
//!
//! Azure OpenAI endpoint, key and model. Every edit is persisted at once;
//! there is no save button.

use leptos::*;
use railchat_core::settings::MODEL_CHOICES;

use crate::state::global::GlobalState;

#[component]
pub fn SettingsPanel(open: RwSignal<bool>) -> impl IntoView {
    let state = expect_context::<GlobalState>();

    let endpoint = move || state.settings.with(|s| s.endpoint.clone());
    let api_key = move || state.settings.with(|s| s.api_key.clone());
    let model = move || state.settings.with(|s| s.effective_model().to_string());

    view! {
        <Show when=move || open.get()>
            <div class="fixed inset-0 z-40 bg-black/60" on:click=move |_| open.set(false) />

            <section class="fixed inset-y-0 right-0 z-50 w-full max-w-sm bg-gray-800 border-l border-gray-700
                            p-6 space-y-6 overflow-auto shadow-xl">
                <div class="flex items-start justify-between">
                    <div>
                        <h2 class="text-lg font-semibold">"Settings"</h2>
                        <p class="text-sm text-gray-400">
                            "Configure your Azure OpenAI connection. Changes are saved automatically."
                        </p>
                    </div>
                    <button
                        on:click=move |_| open.set(false)
                        class="text-gray-400 hover:text-white"
                        title="Close"
                    >
                        "✕"
                    </button>
                </div>

                <label class="block space-y-2">
                    <span class="text-sm font-medium">"Azure Endpoint"</span>
                    <input
                        type="text"
                        placeholder="https://your-resource.openai.azure.com/"
                        prop:value=endpoint
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            state.update_settings(|s| s.endpoint = value);
                        }
                        class="w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600
                               focus:border-primary-500 focus:outline-none"
                    />
                </label>

                <label class="block space-y-2">
                    <span class="text-sm font-medium">"API Key"</span>
                    <input
                        type="password"
                        placeholder="Enter your Azure OpenAI API Key"
                        prop:value=api_key
                        on:input=move |ev| {
                            let value = event_target_value(&ev);
                            state.update_settings(|s| s.api_key = value);
                        }
                        class="w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600
                               focus:border-primary-500 focus:outline-none"
                    />
                </label>

                <label class="block space-y-2">
                    <span class="text-sm font-medium">"Model"</span>
                    <select
                        prop:value=model
                        on:change=move |ev| {
                            let value = event_target_value(&ev);
                            state.update_settings(|s| s.model = value);
                        }
                        class="w-full bg-gray-700 rounded-lg px-4 py-2 border border-gray-600
                               focus:border-primary-500 focus:outline-none"
                    >
                        {MODEL_CHOICES
                            .into_iter()
                            .map(|choice| {
                                view! {
                                    <option value=choice selected=move || model() == choice>
                                        {choice}
                                    </option>
                                }
                            })
                            .collect_view()}
                    </select>
                </label>

                <p class="text-xs text-gray-500">
                    "Stored in this browser only. Requests go through the local relay."
                </p>
            </section>
        </Show>
    }
}
