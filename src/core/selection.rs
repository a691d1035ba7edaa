//! Selected-archetype state machine.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// The selected archetype no longer exists in the current key list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectionKeyMissing {
    pub missing: String,
    /// Key the selection fell back to, if any keys exist.
    pub fallback: Option<String>,
}

impl std::fmt::Display for SelectionKeyMissing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.fallback {
            Some(fallback) => write!(
                f,
                "archetype {:?} not found, selected {:?} instead",
                self.missing, fallback
            ),
            None => write!(f, "archetype {:?} not found", self.missing),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    #[default]
    Unselected,
    Selected(String),
}

impl Selection {
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Unselected => None,
            Self::Selected(key) => Some(key),
        }
    }

    #[must_use]
    pub const fn is_selected(&self) -> bool {
        matches!(self, Self::Selected(_))
    }

    /// First selection after load. Has no effect once something is selected.
    pub fn initialize(&mut self, first_key: &str) {
        if matches!(self, Self::Unselected) {
            *self = Self::Selected(first_key.to_string());
        }
    }

    /// Step to the next key, wrapping past the end.
    pub fn cycle_forward<S: AsRef<str>>(&mut self, keys: &[S]) {
        let Self::Selected(current) = self else {
            return;
        };
        if keys.is_empty() {
            return;
        }
        let next = position(keys, current).map_or(0, |index| (index + 1) % keys.len());
        *current = keys[next].as_ref().to_string();
    }

    /// Step to the previous key, wrapping before the start.
    pub fn cycle_backward<S: AsRef<str>>(&mut self, keys: &[S]) {
        let Self::Selected(current) = self else {
            return;
        };
        if keys.is_empty() {
            return;
        }
        let previous = match position(keys, current) {
            Some(0) | None => keys.len() - 1,
            Some(index) => index - 1,
        };
        *current = keys[previous].as_ref().to_string();
    }

    /// Select `key` directly. An unknown key falls back to the first key.
    pub fn set_explicit<S: AsRef<str>>(
        &mut self,
        key: &str,
        keys: &[S],
    ) -> Option<SelectionKeyMissing> {
        if position(keys, key).is_some() {
            *self = Self::Selected(key.to_string());
            return None;
        }
        Some(self.fall_back(key, keys))
    }

    /// Re-validate against a fresh key list after the catalog changed.
    pub fn reconcile<S: AsRef<str>>(&mut self, keys: &[S]) -> Option<SelectionKeyMissing> {
        let Some(current) = self.key().map(str::to_string) else {
            if let Some(first) = keys.first() {
                self.initialize(first.as_ref());
            }
            return None;
        };
        if position(keys, &current).is_some() {
            return None;
        }
        Some(self.fall_back(&current, keys))
    }

    fn fall_back<S: AsRef<str>>(&mut self, missing: &str, keys: &[S]) -> SelectionKeyMissing {
        let fallback = keys.first().map(|key| key.as_ref().to_string());
        if let Some(first) = &fallback {
            *self = Self::Selected(first.clone());
        }
        warn!(
            target: "sb::selection",
            missing,
            fallback = fallback.as_deref().unwrap_or("<none>"),
            "selected archetype missing"
        );
        SelectionKeyMissing {
            missing: missing.to_string(),
            fallback,
        }
    }
}

fn position<S: AsRef<str>>(keys: &[S], key: &str) -> Option<usize> {
    keys.iter().position(|candidate| candidate.as_ref() == key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEYS: [&str; 3] = ["Rogue", "Mage", "Cleric"];

    fn selected(key: &str) -> Selection {
        Selection::Selected(key.to_string())
    }

    #[test]
    fn initialize_only_from_unselected() {
        let mut selection = Selection::Unselected;
        selection.initialize("Rogue");
        assert_eq!(selection, selected("Rogue"));
        selection.initialize("Mage");
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn forward_wraps_to_first() {
        let mut selection = selected("Cleric");
        selection.cycle_forward(&KEYS);
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn backward_wraps_to_last() {
        let mut selection = selected("Rogue");
        selection.cycle_backward(&KEYS);
        assert_eq!(selection, selected("Cleric"));
    }

    #[test]
    fn cycling_unselected_is_a_no_op() {
        let mut selection = Selection::Unselected;
        selection.cycle_forward(&KEYS);
        selection.cycle_backward(&KEYS);
        assert_eq!(selection, Selection::Unselected);
    }

    #[test]
    fn cycling_over_empty_keys_keeps_selection() {
        let mut selection = selected("Rogue");
        selection.cycle_forward::<&str>(&[]);
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn stale_key_cycles_to_the_ends() {
        let mut selection = selected("Bard");
        selection.cycle_forward(&KEYS);
        assert_eq!(selection, selected("Rogue"));

        let mut selection = selected("Bard");
        selection.cycle_backward(&KEYS);
        assert_eq!(selection, selected("Cleric"));
    }

    #[test]
    fn set_explicit_member() {
        let mut selection = selected("Rogue");
        assert!(selection.set_explicit("Mage", &KEYS).is_none());
        assert_eq!(selection, selected("Mage"));
    }

    #[test]
    fn set_explicit_unknown_falls_back_to_first() {
        let mut selection = selected("Mage");
        let warning = selection.set_explicit("Bard", &KEYS).unwrap();
        assert_eq!(warning.missing, "Bard");
        assert_eq!(warning.fallback.as_deref(), Some("Rogue"));
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn reconcile_initializes_unselected() {
        let mut selection = Selection::Unselected;
        assert!(selection.reconcile(&KEYS).is_none());
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn reconcile_keeps_present_key() {
        let mut selection = selected("Cleric");
        assert!(selection.reconcile(&KEYS).is_none());
        assert_eq!(selection, selected("Cleric"));
    }

    #[test]
    fn reconcile_replaces_removed_key() {
        let mut selection = selected("Bard");
        let warning = selection.reconcile(&KEYS).unwrap();
        assert_eq!(warning.missing, "Bard");
        assert_eq!(selection, selected("Rogue"));
    }

    #[test]
    fn reconcile_with_no_keys_keeps_stale_key() {
        let mut selection = selected("Bard");
        let warning = selection.reconcile::<&str>(&[]).unwrap();
        assert_eq!(warning.fallback, None);
        assert_eq!(selection, selected("Bard"));
    }
}
