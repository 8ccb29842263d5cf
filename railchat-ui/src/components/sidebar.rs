//! Project Sidebar
//!
//! Project list with creation, selection and renaming, plus the entry
//! point to the settings panel.

use leptos::*;

use crate::components::SettingsPanel;
use crate::state::global::GlobalState;

#[component]
pub fn ProjectSidebar() -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let settings_open = create_rw_signal(false);

    // Keyed on the name too, so a rename re-renders the row
    let rows = move || {
        state.store.with(|s| {
            s.projects()
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect::<Vec<_>>()
        })
    };
    let is_empty = move || state.store.with(|s| s.projects().is_empty());

    view! {
        <aside class="w-64 shrink-0 flex flex-col h-full bg-gray-800 border-r border-gray-700">
            <div class="p-2 border-b border-gray-700">
                <button
                    on:click=move |_| state.create_project()
                    class="w-full flex items-center px-3 py-2 rounded-lg bg-primary-600 hover:bg-primary-700
                           font-medium transition-colors"
                >
                    <span class="mr-2">"+"</span>
                    "New Chat"
                </button>
            </div>

            <nav class="flex-grow p-2 space-y-1 overflow-auto">
                <For
                    each=rows
                    key=|row| row.clone()
                    children=move |(id, name)| view! { <ProjectListItem id=id name=name /> }
                />
                <Show when=is_empty>
                    <p class="text-sm text-gray-400 text-center p-4">
                        "Click \"New Chat\" to start."
                    </p>
                </Show>
            </nav>

            <div class="p-2 border-t border-gray-700">
                <button
                    on:click=move |_| settings_open.set(true)
                    class="w-full flex items-center px-3 py-2 rounded-lg text-gray-300 hover:bg-gray-700
                           transition-colors"
                >
                    <span class="mr-2">"⚙"</span>
                    "Settings"
                </button>
            </div>

            <SettingsPanel open=settings_open />
        </aside>
    }
}

/// One row of the project list with its rename dialog
#[component]
fn ProjectListItem(id: String, name: String) -> impl IntoView {
    let state = expect_context::<GlobalState>();
    let (renaming, set_renaming) = create_signal(false);
    let (new_name, set_new_name) = create_signal(name.clone());

    let is_active = {
        let id = id.clone();
        move || state.store.with(|s| s.active_id() == Some(id.as_str()))
    };

    let select = {
        let id = id.clone();
        move |_| state.select_project(&id)
    };

    let open_dialog = {
        let name = name.clone();
        move |ev: ev::MouseEvent| {
            ev.stop_propagation();
            set_new_name.set(name.clone());
            set_renaming.set(true);
        }
    };

    let save = move || {
        state.rename_project(&id, &new_name.get_untracked());
        set_renaming.set(false);
    };
    let save_on_enter = save.clone();

    let description = format!("Enter a new name for the project \"{}\".", name);

    view! {
        <div
            on:click=select
            class=move || {
                if is_active() {
                    "flex items-center justify-between p-2 rounded-md cursor-pointer bg-gray-700 font-semibold"
                } else {
                    "flex items-center justify-between p-2 rounded-md cursor-pointer hover:bg-gray-700"
                }
            }
        >
            <span class="truncate flex-grow mr-2" title=name.clone()>{name.clone()}</span>
            <button
                on:click=open_dialog
                class="h-6 w-6 text-gray-400 hover:text-white"
                title="Rename"
            >
                "✎"
            </button>
        </div>

        <Show when=move || renaming.get()>
            <div
                class="fixed inset-0 z-40 flex items-center justify-center bg-black/60"
                on:click=move |_| set_renaming.set(false)
            >
                <div
                    class="w-full max-w-md bg-gray-800 rounded-xl p-6 shadow-xl"
                    on:click=|ev: ev::MouseEvent| ev.stop_propagation()
                >
                    <h2 class="text-lg font-semibold mb-1">"Rename Project"</h2>
                    <p class="text-sm text-gray-400 mb-4">{description.clone()}</p>

                    <label class="grid grid-cols-4 items-center gap-4 mb-6">
                        <span class="text-right text-sm">"Name"</span>
                        <input
                            type="text"
                            prop:value=new_name
                            on:input=move |ev| set_new_name.set(event_target_value(&ev))
                            on:keydown={
                                let save = save_on_enter.clone();
                                move |ev: ev::KeyboardEvent| {
                                    if ev.key() == "Enter" {
                                        save();
                                    }
                                }
                            }
                            class="col-span-3 bg-gray-700 rounded-lg px-3 py-2 border border-gray-600
                                   focus:border-primary-500 focus:outline-none"
                        />
                    </label>

                    <div class="flex justify-end space-x-2">
                        <button
                            on:click=move |_| set_renaming.set(false)
                            class="px-4 py-2 rounded-lg bg-gray-700 hover:bg-gray-600"
                        >
                            "Cancel"
                        </button>
                        <button
                            on:click={
                                let save = save.clone();
                                move |_| save()
                            }
                            class="px-4 py-2 rounded-lg bg-primary-600 hover:bg-primary-700 font-medium"
                        >
                            "Save changes"
                        </button>
                    </div>
                </div>
            </div>
        </Show>
    }
}
