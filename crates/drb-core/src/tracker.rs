use crate::cycle::{self, StatusMap};
use crate::registry::Registry;
use crate::CoreError;
use chrono::NaiveDateTime;
use serde::Serialize;

/// What the presentation layer renders for one reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReminderView {
    pub name: String,
    pub done: bool,
    pub next_reset: NaiveDateTime,
}

/// Owns the live registry and status map and serialises every mutation
/// through one place. Callers inject `now`; the tracker never reads the
/// clock itself.
#[derive(Debug, Clone, Default)]
pub struct Tracker {
    registry: Registry,
    status: StatusMap,
}

impl Tracker {
    pub fn new(registry: Registry, status: StatusMap) -> Self {
        Self { registry, status }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn status(&self) -> &StatusMap {
        &self.status
    }

    pub fn into_parts(self) -> (Registry, StatusMap) {
        (self.registry, self.status)
    }

    /// Clears markers from past cycles. Returns true when the status map
    /// changed and should be persisted.
    pub fn reconcile(&mut self, now: NaiveDateTime) -> bool {
        cycle::reconcile(&self.registry, &mut self.status, now)
    }

    pub fn is_done(&self, name: &str, now: NaiveDateTime) -> bool {
        match (self.registry.get(name), self.status.get(name)) {
            (Some(def), Some(marker)) => {
                *marker > cycle::most_recent_boundary(def.reset_hour, def.reset_minute, now)
            }
            _ => false,
        }
    }

    /// One row per registry entry, in registry order.
    pub fn display_state(&self, now: NaiveDateTime) -> Vec<ReminderView> {
        self.registry
            .iter()
            .map(|def| ReminderView {
                name: def.name.clone(),
                done: self.is_done(&def.name, now),
                next_reset: cycle::next_boundary(def.reset_hour, def.reset_minute, now),
            })
            .collect()
    }

    /// Names currently marked done, in registry order.
    pub fn completed_names(&self, now: NaiveDateTime) -> Vec<String> {
        self.registry
            .iter()
            .filter(|def| self.is_done(&def.name, now))
            .map(|def| def.name.clone())
            .collect()
    }

    /// Marks a reminder done (storing the boundary the completion is
    /// satisfied through) or clears its marker.
    pub fn set_done(&mut self, name: &str, done: bool, now: NaiveDateTime) -> Result<(), CoreError> {
        let def = self
            .registry
            .get(name)
            .ok_or_else(|| CoreError::UnknownReminder(name.to_string()))?;
        if done {
            let until = cycle::next_boundary(def.reset_hour, def.reset_minute, now);
            self.status.insert(def.name.clone(), until);
        } else {
            self.status.remove(name);
        }
        Ok(())
    }

    /// Flips the reminder's done state, returning the new state.
    pub fn toggle(&mut self, name: &str, now: NaiveDateTime) -> Result<bool, CoreError> {
        let done = !self.is_done(name, now);
        self.set_done(name, done, now)?;
        Ok(done)
    }

    pub fn add_reminder(
        &mut self,
        name: &str,
        reset_hour: u32,
        reset_minute: u32,
    ) -> Result<(), CoreError> {
        self.registry.add(name, reset_hour, reset_minute)
    }

    /// Edits a definition; on rename the status entry moves to the new
    /// key so the completion survives. Registry and status change
    /// together or not at all.
    pub fn edit_reminder(
        &mut self,
        old_name: &str,
        new_name: &str,
        reset_hour: u32,
        reset_minute: u32,
    ) -> Result<(), CoreError> {
        self.registry.edit(old_name, new_name, reset_hour, reset_minute)?;
        if old_name != new_name {
            if let Some(marker) = self.status.remove(old_name) {
                self.status.insert(new_name.to_string(), marker);
            }
        }
        Ok(())
    }

    /// Removes the definition and its status entry together.
    pub fn delete_reminder(&mut self, name: &str) -> Result<(), CoreError> {
        self.registry.remove(name)?;
        self.status.remove(name);
        Ok(())
    }

    /// Clears every marker unconditionally, regardless of boundaries.
    /// Returns true when any entry was present.
    pub fn reset_all(&mut self) -> bool {
        let had_entries = !self.status.is_empty();
        self.status.clear();
        had_entries
    }
}
