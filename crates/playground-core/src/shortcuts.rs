//! Keyboard shortcut registry and resolution.

use crate::input::KeyPress;

/// What a shortcut does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    Copy,
    Paste,
    Cut,
    Undo,
    Redo,
    Delete,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone)]
pub struct Shortcut {
    pub key: &'static str,
    pub ctrl: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(key: &'static str, ctrl: bool, action: ShortcutAction, description: &'static str) -> Self {
        Self {
            key,
            ctrl,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+C").
    pub fn format(&self) -> String {
        if self.ctrl {
            format!("Ctrl+{}", self.key.to_uppercase())
        } else {
            self.key.to_string()
        }
    }

    fn matches(&self, press: &KeyPress) -> bool {
        if self.ctrl {
            press.modifiers.command() && press.key.eq_ignore_ascii_case(self.key)
        } else {
            press.key == self.key
        }
    }
}

/// Registry of all keyboard shortcuts.
pub struct ShortcutRegistry;

impl ShortcutRegistry {
    /// Get all registered shortcuts.
    pub fn all() -> Vec<Shortcut> {
        vec![
            Shortcut::new("c", true, ShortcutAction::Copy, "Copy shapes"),
            Shortcut::new("v", true, ShortcutAction::Paste, "Paste shapes"),
            Shortcut::new("x", true, ShortcutAction::Cut, "Cut shapes"),
            Shortcut::new("z", true, ShortcutAction::Undo, "Undo"),
            Shortcut::new("y", true, ShortcutAction::Redo, "Redo"),
            Shortcut::new("Delete", false, ShortcutAction::Delete, "Delete selected shapes"),
            Shortcut::new("Backspace", false, ShortcutAction::Delete, "Delete selected shapes"),
        ]
    }

    /// Resolve a key press. Delete keys are left to the focused input
    /// when one has focus.
    pub fn resolve(press: &KeyPress, input_focused: bool) -> Option<ShortcutAction> {
        let action = Self::all()
            .into_iter()
            .find(|shortcut| shortcut.matches(press))
            .map(|shortcut| shortcut.action)?;
        if action == ShortcutAction::Delete && input_focused {
            return None;
        }
        Some(action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_keys() {
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::with_ctrl("c"), false), Some(ShortcutAction::Copy));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::with_meta("V"), false), Some(ShortcutAction::Paste));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::with_ctrl("x"), true), Some(ShortcutAction::Cut));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::with_ctrl("z"), false), Some(ShortcutAction::Undo));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::with_ctrl("y"), false), Some(ShortcutAction::Redo));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("c"), false), None);
    }

    #[test]
    fn test_delete_ignored_in_inputs() {
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("Delete"), false), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("Backspace"), false), Some(ShortcutAction::Delete));
        assert_eq!(ShortcutRegistry::resolve(&KeyPress::new("Backspace"), true), None);
    }

    #[test]
    fn test_format() {
        let all = ShortcutRegistry::all();
        assert_eq!(all[0].format(), "Ctrl+C");
        assert_eq!(all[5].format(), "Delete");
    }
}
