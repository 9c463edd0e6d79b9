//! Keyboard surface
//!
//! Maps key chords to editor commands. All editing shortcuts are inert while
//! input focus is inside a text field or rich-text editable region, so
//! native text editing is never hijacked.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditorCommand {
    Undo,
    Redo,
    Copy,
    Cut,
    Paste,
    Duplicate,
    SelectAll,
    ClearSelection,
}

/// Resolve a key event to a command. `ctrl_or_cmd` covers both Ctrl and the
/// macOS Command modifier. Returns `None` for unbound chords and for any
/// chord while a text-input-like element has focus.
pub fn command_for_key(
    key: &str,
    ctrl_or_cmd: bool,
    shift: bool,
    text_input_focused: bool,
) -> Option<EditorCommand> {
    if text_input_focused {
        return None;
    }
    if key.eq_ignore_ascii_case("escape") {
        return Some(EditorCommand::ClearSelection);
    }
    if !ctrl_or_cmd {
        return None;
    }
    match key.to_ascii_lowercase().as_str() {
        "z" if shift => Some(EditorCommand::Redo),
        "z" => Some(EditorCommand::Undo),
        "y" => Some(EditorCommand::Redo),
        "c" => Some(EditorCommand::Copy),
        "x" => Some(EditorCommand::Cut),
        "v" => Some(EditorCommand::Paste),
        "d" => Some(EditorCommand::Duplicate),
        "a" => Some(EditorCommand::SelectAll),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undo_redo_chords() {
        assert_eq!(command_for_key("z", true, false, false), Some(EditorCommand::Undo));
        assert_eq!(command_for_key("Z", true, true, false), Some(EditorCommand::Redo));
        assert_eq!(command_for_key("y", true, false, false), Some(EditorCommand::Redo));
    }

    #[test]
    fn test_clipboard_chords() {
        assert_eq!(command_for_key("c", true, false, false), Some(EditorCommand::Copy));
        assert_eq!(command_for_key("x", true, false, false), Some(EditorCommand::Cut));
        assert_eq!(command_for_key("v", true, false, false), Some(EditorCommand::Paste));
        assert_eq!(command_for_key("d", true, false, false), Some(EditorCommand::Duplicate));
        assert_eq!(command_for_key("a", true, false, false), Some(EditorCommand::SelectAll));
    }

    #[test]
    fn test_escape_needs_no_modifier() {
        assert_eq!(
            command_for_key("Escape", false, false, false),
            Some(EditorCommand::ClearSelection)
        );
    }

    #[test]
    fn test_inert_while_text_input_focused() {
        assert_eq!(command_for_key("z", true, false, true), None);
        assert_eq!(command_for_key("Escape", false, false, true), None);
    }

    #[test]
    fn test_unbound_chords() {
        assert_eq!(command_for_key("c", false, false, false), None);
        assert_eq!(command_for_key("q", true, false, false), None);
    }
}
