use std::collections::{BTreeMap, BTreeSet};

use creeper_logging::creeper_debug;

use crate::{ConfirmPolicy, SettingChange, SettingToggle, ToggleStep, HIDE_FEED_KEY_PREFIX};

/// Server-held user settings shown as checkboxes.
///
/// Only registered keys are tracked. A registered key stays unknown, and
/// non-interactive, until the server reports a value for it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SettingsStore {
    loaded: bool,
    toggles: BTreeMap<String, SettingToggle>,
    known: BTreeSet<String>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a setting before the values arrive, e.g. to attach prompts.
    pub fn register(&mut self, key: impl Into<String>, confirm: Option<ConfirmPolicy>) {
        let key = key.into();
        self.toggles
            .entry(key.clone())
            .or_insert_with(|| SettingToggle::new(key, false))
            .set_confirm(confirm);
    }

    pub fn load<I>(&mut self, values: I)
    where
        I: IntoIterator<Item = (String, bool)>,
    {
        for (key, value) in values {
            if key.starts_with(HIDE_FEED_KEY_PREFIX) {
                continue;
            }
            match self.toggles.get_mut(&key) {
                Some(toggle) => {
                    toggle.load(value);
                    self.known.insert(key);
                }
                None => creeper_debug!("ignoring unregistered setting {}", key),
            }
        }
        self.loaded = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Whether the server reported a value for `key`.
    pub fn is_known(&self, key: &str) -> bool {
        self.loaded && self.known.contains(key)
    }

    pub fn get(&self, key: &str) -> Option<&SettingToggle> {
        self.toggles.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SettingToggle> {
        self.toggles.values()
    }

    /// The committed value, or `None` while unknown or in flux.
    pub fn authoritative(&self, key: &str) -> Option<bool> {
        if !self.is_known(key) {
            return None;
        }
        self.toggles
            .get(key)
            .filter(|toggle| toggle.is_interactive())
            .map(SettingToggle::current_value)
    }

    pub fn request(&mut self, key: &str, value: bool) -> ToggleStep {
        if !self.is_known(key) {
            return ToggleStep::Ignored;
        }
        match self.toggles.get_mut(key) {
            Some(toggle) => toggle.request(value),
            None => ToggleStep::Ignored,
        }
    }

    pub fn answer(&mut self, key: &str, accepted: bool) -> Option<SettingChange> {
        self.toggles.get_mut(key)?.answer(accepted)
    }

    pub fn resolve(&mut self, key: &str, success: bool) -> Option<bool> {
        self.toggles.get_mut(key)?.resolve(success)
    }
}
