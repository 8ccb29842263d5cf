//! App Root Component
//!
//! Sidebar on the left, the active project's chat on the right.

use leptos::*;

use crate::components::{ChatInterface, ProjectSidebar, Toast};
use crate::state::global::provide_global_state;

/// Root application component
#[component]
pub fn App() -> impl IntoView {
    provide_global_state();

    view! {
        <div class="flex h-screen bg-gray-900 text-white">
            <ProjectSidebar />

            <main class="flex-1 flex flex-col min-w-0">
                <ChatInterface />
            </main>

            <Toast />
        </div>
    }
}
