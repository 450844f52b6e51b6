//! Canvas key bindings.
//!
//! Single letters arm a tool (`3` arms the solid tool); Delete/Backspace
//! remove the selection, or every node with ⌘/Ctrl held; ⌘/Ctrl+A and
//! ⌘/Ctrl+D select all and duplicate. Space is handled by the canvas
//! controller as a held Hand tool and never resolves here.

use crate::input::Modifiers;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    ToolMove,
    ToolHand,
    ToolFrame,
    ToolSolid,
    ToolImage,
    ToolComment,
    /// Remove the selected nodes.
    Delete,
    SelectAll,
    Duplicate,
    /// Remove every node (⌘Delete).
    ClearAll,
    /// Disarm the pending node and clear the selection.
    Deselect,
}

pub struct ShortcutMap;

impl ShortcutMap {
    /// Action bound to `key` (a DOM-style key name such as `"3"` or
    /// `"Escape"`) under `modifiers`, if any.
    pub fn resolve(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        if modifiers.cmd() {
            return match key {
                "a" | "A" => Some(ShortcutAction::SelectAll),
                "d" | "D" => Some(ShortcutAction::Duplicate),
                "Delete" | "Backspace" => Some(ShortcutAction::ClearAll),
                _ => None,
            };
        }

        match key {
            "v" | "V" => Some(ShortcutAction::ToolMove),
            "h" | "H" => Some(ShortcutAction::ToolHand),
            "f" | "F" => Some(ShortcutAction::ToolFrame),
            "3" => Some(ShortcutAction::ToolSolid),
            "i" | "I" => Some(ShortcutAction::ToolImage),
            "c" | "C" => Some(ShortcutAction::ToolComment),
            "Delete" | "Backspace" => Some(ShortcutAction::Delete),
            "Escape" => Some(ShortcutAction::Deselect),
            _ => None,
        }
    }
}
