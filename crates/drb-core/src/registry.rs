use crate::CoreError;
use serde::{Deserialize, Serialize};

/// One recurring daily task: a unique name plus the local time of day at
/// which its cycle rolls over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDef {
    pub name: String,
    pub reset_hour: u32,
    #[serde(default)]
    pub reset_minute: u32,
}

/// Ordered collection of reminder definitions. Names are unique,
/// case-sensitive; every mutation validates before it applies, so a
/// rejected write leaves the registry untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    reminders: Vec<ReminderDef>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from loaded definitions, rejecting duplicate
    /// names and out-of-range reset times.
    pub fn from_defs(defs: Vec<ReminderDef>) -> Result<Self, CoreError> {
        let mut registry = Self::new();
        for def in defs {
            registry.add(&def.name, def.reset_hour, def.reset_minute)?;
        }
        Ok(registry)
    }

    pub fn defs(&self) -> &[ReminderDef] {
        &self.reminders
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReminderDef> {
        self.reminders.iter()
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&ReminderDef> {
        self.reminders.iter().find(|def| def.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn add(&mut self, name: &str, reset_hour: u32, reset_minute: u32) -> Result<(), CoreError> {
        validate_name(name)?;
        validate_time(reset_hour, reset_minute)?;
        if self.contains(name) {
            return Err(CoreError::DuplicateName(name.to_string()));
        }
        self.reminders.push(ReminderDef {
            name: name.to_string(),
            reset_hour,
            reset_minute,
        });
        Ok(())
    }

    /// Replaces the definition stored under `old_name`. Renames keep the
    /// entry at its current position. Status rekeying is the caller's
    /// job (see `Tracker::edit_reminder`).
    pub fn edit(
        &mut self,
        old_name: &str,
        new_name: &str,
        reset_hour: u32,
        reset_minute: u32,
    ) -> Result<(), CoreError> {
        validate_name(new_name)?;
        validate_time(reset_hour, reset_minute)?;
        let idx = self
            .reminders
            .iter()
            .position(|def| def.name == old_name)
            .ok_or_else(|| CoreError::UnknownReminder(old_name.to_string()))?;
        if new_name != old_name && self.contains(new_name) {
            return Err(CoreError::DuplicateName(new_name.to_string()));
        }
        self.reminders[idx] = ReminderDef {
            name: new_name.to_string(),
            reset_hour,
            reset_minute,
        };
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Result<ReminderDef, CoreError> {
        let idx = self
            .reminders
            .iter()
            .position(|def| def.name == name)
            .ok_or_else(|| CoreError::UnknownReminder(name.to_string()))?;
        Ok(self.reminders.remove(idx))
    }
}

fn validate_name(name: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::EmptyName);
    }
    Ok(())
}

fn validate_time(hour: u32, minute: u32) -> Result<(), CoreError> {
    if hour > 23 || minute > 59 {
        return Err(CoreError::InvalidTime { hour, minute });
    }
    Ok(())
}
