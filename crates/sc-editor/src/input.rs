//! Host-agnostic input events.
//!
//! Pointer coordinates are screen pixels relative to the canvas surface;
//! the controller maps them to world space through the viewport.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    /// Ctrl on Linux/Windows, ⌘ on macOS.
    pub fn cmd(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { x: f32, y: f32, modifiers: Modifiers },
    PointerMove { x: f32, y: f32, modifiers: Modifiers },
    PointerUp { x: f32, y: f32, modifiers: Modifiers },
    /// `x`/`y` is the cursor position; deltas are raw wheel deltas.
    Wheel {
        x: f32,
        y: f32,
        delta_x: f32,
        delta_y: f32,
        modifiers: Modifiers,
    },
    /// `key` is the `KeyboardEvent.key` value (e.g. `"v"`, `" "`, `"Delete"`).
    KeyDown { key: String, modifiers: Modifiers },
    KeyUp { key: String, modifiers: Modifiers },
}

/// Pointer glyph the host should show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    #[default]
    Default,
    Grab,
    Grabbing,
    Crosshair,
    Move,
    NwseResize,
    NeswResize,
    NsResize,
    EwResize,
}

impl Cursor {
    /// CSS `cursor` value.
    pub fn as_css(self) -> &'static str {
        match self {
            Cursor::Default => "default",
            Cursor::Grab => "grab",
            Cursor::Grabbing => "grabbing",
            Cursor::Crosshair => "crosshair",
            Cursor::Move => "move",
            Cursor::NwseResize => "nwse-resize",
            Cursor::NeswResize => "nesw-resize",
            Cursor::NsResize => "ns-resize",
            Cursor::EwResize => "ew-resize",
        }
    }
}
