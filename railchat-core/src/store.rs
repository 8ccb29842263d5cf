//! Project Store
//!
//! Single source of truth for all chat state: the ordered project list and
//! the active-project pointer, mirrored into a [`JsonStore`].
//!
//! Mutations never touch the current list in place. Each one builds a new
//! list in which exactly the target entry differs and swaps it in, so a
//! [`ProjectStore::snapshot`] taken earlier keeps seeing the old state.

use std::sync::Arc;

use crate::kv::{JsonStore, KeyValueStore, ACTIVE_PROJECT_KEY, PROJECTS_KEY};
use crate::model::{ChatMessage, Project};

pub struct ProjectStore<K> {
    kv: JsonStore<K>,
    projects: Arc<Vec<Project>>,
    active_id: Option<String>,
}

impl<K: KeyValueStore> ProjectStore<K> {
    /// Load the persisted list and pointer, then reconcile the pointer
    pub fn load(kv: JsonStore<K>) -> Self {
        let projects: Vec<Project> = kv.get(PROJECTS_KEY, Vec::new());
        let active_id: Option<String> = kv.get(ACTIVE_PROJECT_KEY, None);

        let mut store = Self {
            kv,
            projects: Arc::new(projects),
            active_id,
        };
        store.reconcile_active();

        tracing::debug!(
            projects = store.projects.len(),
            active = ?store.active_id,
            "Project store loaded"
        );
        store
    }

    /// The current list. Later mutations do not affect the returned value.
    pub fn snapshot(&self) -> Arc<Vec<Project>> {
        Arc::clone(&self.projects)
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn get(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_project(&self) -> Option<&Project> {
        self.active_id.as_deref().and_then(|id| self.get(id))
    }

    pub fn kv(&self) -> &JsonStore<K> {
        &self.kv
    }

    /// Prepend a new "New Chat" project and make it active
    pub fn create_project(&mut self) -> Project {
        let project = Project::new();

        let mut next = Vec::with_capacity(self.projects.len() + 1);
        next.push(project.clone());
        next.extend(self.projects.iter().cloned());

        tracing::info!(project_id = %project.id, "Created project");
        self.replace(next);
        self.set_active(Some(project.id.clone()));
        project
    }

    /// Point the active pointer at `id`. Unknown ids are rejected.
    pub fn select_project(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::warn!(project_id = id, "Cannot select unknown project");
            return false;
        }
        if self.active_id.as_deref() != Some(id) {
            self.set_active(Some(id.to_string()));
        }
        true
    }

    /// Rename a project. No-op for blank or unchanged names; returns whether anything changed.
    pub fn rename_project(&mut self, id: &str, new_name: &str) -> bool {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return false;
        }

        let next = replace_entry(&self.projects, id, |project| {
            if project.name == new_name {
                return None;
            }
            Some(Project {
                name: new_name.to_string(),
                ..project.clone()
            })
        });

        match next {
            Some(next) => {
                tracing::debug!(project_id = id, "Renamed project");
                self.replace(next);
                true
            }
            None => false,
        }
    }

    /// Replace the system prompt of the active project. No-op without one.
    pub fn update_system_prompt(&mut self, prompt: &str) -> bool {
        let Some(active_id) = self.active_id.clone() else {
            return false;
        };

        let next = replace_entry(&self.projects, &active_id, |project| {
            Some(Project {
                system_prompt: Some(prompt.to_string()),
                ..project.clone()
            })
        });

        match next {
            Some(next) => {
                self.replace(next);
                true
            }
            None => false,
        }
    }

    /// Append `message` to the history of project `id`
    pub fn append_message(&mut self, id: &str, message: ChatMessage) -> bool {
        let next = replace_entry(&self.projects, id, |project| {
            Some(project.with_message(message.clone()))
        });

        match next {
            Some(next) => {
                tracing::debug!(project_id = id, role = %message.role, "Appended message");
                self.replace(next);
                true
            }
            None => {
                tracing::warn!(project_id = id, "Dropping message for unknown project");
                false
            }
        }
    }

    /// Keep the active pointer valid: a missing or dangling pointer moves to the
    /// first project, an empty list clears it. Idempotent; returns whether it moved.
    pub fn reconcile_active(&mut self) -> bool {
        let valid = self
            .active_id
            .as_deref()
            .is_some_and(|id| self.projects.iter().any(|p| p.id == id));
        if valid {
            return false;
        }

        let fallback = self.projects.first().map(|p| p.id.clone());
        if fallback == self.active_id {
            return false;
        }

        tracing::debug!(from = ?self.active_id, to = ?fallback, "Reconciled active project");
        self.set_active(fallback);
        true
    }

    fn replace(&mut self, next: Vec<Project>) {
        self.kv.set(PROJECTS_KEY, &next);
        self.projects = Arc::new(next);
        self.reconcile_active();
    }

    fn set_active(&mut self, id: Option<String>) {
        self.kv.set(ACTIVE_PROJECT_KEY, &id);
        self.active_id = id;
    }
}

/// New list where the entry with `id` is replaced by `update(entry)`.
/// `None` when the id is unknown or `update` declines the change.
pub fn replace_entry<F>(projects: &[Project], id: &str, update: F) -> Option<Vec<Project>>
where
    F: FnOnce(&Project) -> Option<Project>,
{
    let index = projects.iter().position(|p| p.id == id)?;
    let updated = update(&projects[index])?;

    let mut next = Vec::with_capacity(projects.len());
    next.extend(projects[..index].iter().cloned());
    next.push(updated);
    next.extend(projects[index + 1..].iter().cloned());
    Some(next)
}
