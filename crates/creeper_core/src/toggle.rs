/// Prompts shown before a change is committed, per direction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConfirmPolicy {
    pub on_check: Option<String>,
    pub on_uncheck: Option<String>,
}

impl ConfirmPolicy {
    pub fn prompt_for(&self, value: bool) -> Option<&str> {
        if value {
            self.on_check.as_deref()
        } else {
            self.on_uncheck.as_deref()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TogglePhase {
    #[default]
    Idle,
    /// A confirmation prompt is open for `requested`.
    Confirming { requested: bool },
    /// The change was sent to the server and is awaiting its answer.
    Pending { requested: bool },
}

/// Body of the settings persistence call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingChange {
    pub key: String,
    pub value: bool,
}

/// What the caller has to do after a toggle interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleStep {
    /// The interaction had no effect.
    Ignored,
    /// Ask the user, then report back through [`SettingToggle::answer`].
    Confirm { prompt: String },
    /// Send the change and report back through [`SettingToggle::resolve`].
    Persist(SettingChange),
}

/// A boolean whose authoritative value lives on the server.
///
/// The visible value never moves ahead of the server: an interaction only
/// changes `current_value` once the persistence call has succeeded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingToggle {
    key: String,
    current_value: bool,
    phase: TogglePhase,
    confirm: Option<ConfirmPolicy>,
}

impl SettingToggle {
    pub fn new(key: impl Into<String>, value: bool) -> Self {
        Self {
            key: key.into(),
            current_value: value,
            phase: TogglePhase::Idle,
            confirm: None,
        }
    }

    pub fn with_confirm(mut self, confirm: ConfirmPolicy) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn current_value(&self) -> bool {
        self.current_value
    }

    pub fn phase(&self) -> TogglePhase {
        self.phase
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.phase, TogglePhase::Pending { .. })
    }

    pub fn is_interactive(&self) -> bool {
        self.phase == TogglePhase::Idle
    }

    pub fn set_confirm(&mut self, confirm: Option<ConfirmPolicy>) {
        self.confirm = confirm;
    }

    /// Replaces the value from an authoritative source. Ignored while a
    /// change is in progress so the in-flight answer decides.
    pub fn load(&mut self, value: bool) {
        if self.is_interactive() {
            self.current_value = value;
        }
    }

    /// User attempted to move the control to `requested`.
    pub fn request(&mut self, requested: bool) -> ToggleStep {
        if !self.is_interactive() || requested == self.current_value {
            return ToggleStep::Ignored;
        }
        let prompt = self
            .confirm
            .as_ref()
            .and_then(|policy| policy.prompt_for(requested))
            .map(ToOwned::to_owned);
        match prompt {
            Some(prompt) => {
                self.phase = TogglePhase::Confirming { requested };
                ToggleStep::Confirm { prompt }
            }
            None => ToggleStep::Persist(self.enter_pending(requested)),
        }
    }

    /// Outcome of the confirmation prompt. A decline leaves the toggle
    /// exactly as it was before the interaction.
    pub fn answer(&mut self, accepted: bool) -> Option<SettingChange> {
        let TogglePhase::Confirming { requested } = self.phase else {
            return None;
        };
        if accepted {
            Some(self.enter_pending(requested))
        } else {
            self.phase = TogglePhase::Idle;
            None
        }
    }

    /// Outcome of the persistence call. Returns the committed value.
    pub fn resolve(&mut self, success: bool) -> Option<bool> {
        let TogglePhase::Pending { requested } = self.phase else {
            return None;
        };
        self.phase = TogglePhase::Idle;
        if success {
            self.current_value = requested;
            Some(requested)
        } else {
            None
        }
    }

    fn enter_pending(&mut self, requested: bool) -> SettingChange {
        self.phase = TogglePhase::Pending { requested };
        SettingChange {
            key: self.key.clone(),
            value: requested,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn confirm_on_check() -> ConfirmPolicy {
        ConfirmPolicy {
            on_check: Some("Allow LAN access?".into()),
            on_uncheck: None,
        }
    }

    #[test]
    fn confirmation_only_applies_to_its_direction() {
        let mut toggle = SettingToggle::new("allow_lan", true).with_confirm(confirm_on_check());
        let step = toggle.request(false);
        assert_eq!(
            step,
            ToggleStep::Persist(SettingChange {
                key: "allow_lan".into(),
                value: false
            })
        );
        assert!(toggle.is_pending());
    }

    #[test]
    fn second_request_while_pending_is_ignored() {
        let mut toggle = SettingToggle::new("allow_lan", false);
        assert!(matches!(toggle.request(true), ToggleStep::Persist(_)));
        assert_eq!(toggle.request(true), ToggleStep::Ignored);
        assert_eq!(toggle.request(false), ToggleStep::Ignored);
    }

    #[test]
    fn stray_answers_are_ignored() {
        let mut toggle = SettingToggle::new("allow_lan", false);
        assert_eq!(toggle.answer(true), None);
        assert_eq!(toggle.resolve(true), None);
        assert!(!toggle.current_value());
    }

    #[test]
    fn load_is_deferred_while_pending() {
        let mut toggle = SettingToggle::new("allow_lan", false);
        toggle.request(true);
        toggle.load(false);
        assert_eq!(toggle.resolve(true), Some(true));
        assert!(toggle.current_value());
    }
}
