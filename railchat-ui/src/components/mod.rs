//! UI Components
//!
//! Leptos components of the chat client.

pub mod attachment;
pub mod chat;
pub mod prompt;
pub mod settings;
pub mod sidebar;
pub mod toast;

pub use attachment::FileAttachment;
pub use chat::ChatInterface;
pub use prompt::PromptInputArea;
pub use settings::SettingsPanel;
pub use sidebar::ProjectSidebar;
pub use toast::Toast;
