//! Presence bookkeeping for collaborators.
//!
//! Transport lives elsewhere; this module only tracks who is present and
//! which environment each collaborator is looking at.

use crate::style::SerializableColor;
use crate::tools::Environment;
use serde::{Deserialize, Serialize};

/// A collaborator currently viewing the diagram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collaborator {
    pub id: String,
    pub environment: Environment,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<SerializableColor>,
}

impl Collaborator {
    pub fn new(id: impl Into<String>, environment: Environment) -> Self {
        Self {
            id: id.into(),
            environment,
            display_name: None,
            color: None,
        }
    }

    pub fn with_user_info(mut self, name: impl Into<String>, color: SerializableColor) -> Self {
        self.display_name = Some(name.into());
        self.color = Some(color);
        self
    }
}

/// Set of present collaborators, unique by id, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PresenceTracker {
    entries: Vec<Collaborator>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a collaborator, replacing any entry with the same id in place.
    pub fn add(&mut self, collaborator: Collaborator) {
        match self.entries.iter_mut().find(|c| c.id == collaborator.id) {
            Some(existing) => {
                if existing.environment != collaborator.environment {
                    log::debug!(
                        "Collaborator {} moved to {:?}",
                        collaborator.id,
                        collaborator.environment
                    );
                }
                *existing = collaborator;
            }
            None => {
                log::debug!("Collaborator {} joined", collaborator.id);
                self.entries.push(collaborator);
            }
        }
    }

    /// Remove a collaborator. Returns the removed entry, if any.
    pub fn remove(&mut self, id: &str) -> Option<Collaborator> {
        let pos = self.entries.iter().position(|c| c.id == id)?;
        log::debug!("Collaborator {} left", id);
        Some(self.entries.remove(pos))
    }

    /// True when anyone else is present.
    pub fn is_active(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Collaborator> {
        self.entries.iter().find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Collaborator> {
        self.entries.iter()
    }

    /// Collaborators currently viewing `environment`.
    pub fn in_environment(&self, environment: Environment) -> impl Iterator<Item = &Collaborator> {
        self.entries
            .iter()
            .filter(move |c| c.environment == environment)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
