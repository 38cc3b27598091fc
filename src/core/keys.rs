//! Translation of toolkit input into engine input names.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::player::types::EngineOp;

/// Toolkit key names whose engine name differs
static KEY_REMAP: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    HashMap::from([
        ("Return", "ENTER"),
        ("KP_Enter", "KP_ENTER"),
        ("space", "SPACE"),
        ("KP_Space", "SPACE"),
        ("Escape", "ESC"),
        ("BackSpace", "BS"),
        ("Tab", "TAB"),
        ("Delete", "DEL"),
        ("KP_Delete", "KP_DEL"),
        ("Insert", "INS"),
        ("KP_Insert", "KP_INS"),
        ("Home", "HOME"),
        ("End", "END"),
        ("Page_Up", "PGUP"),
        ("Page_Down", "PGDWN"),
        ("Left", "LEFT"),
        ("Right", "RIGHT"),
        ("Up", "UP"),
        ("Down", "DOWN"),
        ("Print", "PRINT"),
        ("Menu", "MENU"),
        ("Pause", "PAUSE"),
        ("AudioPlay", "PLAY"),
        ("AudioPause", "PAUSE"),
        ("AudioStop", "STOP"),
        ("AudioNext", "NEXT"),
        ("AudioPrev", "PREV"),
        ("AudioForward", "FORWARD"),
        ("AudioRewind", "REWIND"),
        ("AudioMute", "MUTE"),
        ("AudioRaiseVolume", "VOLUME_UP"),
        ("AudioLowerVolume", "VOLUME_DOWN"),
        ("KP_0", "KP0"),
        ("KP_1", "KP1"),
        ("KP_2", "KP2"),
        ("KP_3", "KP3"),
        ("KP_4", "KP4"),
        ("KP_5", "KP5"),
        ("KP_6", "KP6"),
        ("KP_7", "KP7"),
        ("KP_8", "KP8"),
        ("KP_9", "KP9"),
        ("KP_Decimal", "KP_DEC"),
        ("KP_Add", "KP_ADD"),
        ("KP_Subtract", "KP_SUBTRACT"),
        ("KP_Multiply", "KP_MULTIPLY"),
        ("KP_Divide", "KP_DIVIDE"),
        ("numbersign", "SHARP"),
        ("exclam", "!"),
        ("quotedbl", "\""),
        ("dollar", "$"),
        ("percent", "%"),
        ("ampersand", "&"),
        ("apostrophe", "'"),
        ("parenleft", "("),
        ("parenright", ")"),
        ("asterisk", "*"),
        ("plus", "+"),
        ("comma", ","),
        ("minus", "-"),
        ("period", "."),
        ("slash", "/"),
        ("colon", ":"),
        ("semicolon", ";"),
        ("less", "<"),
        ("equal", "="),
        ("greater", ">"),
        ("question", "?"),
        ("at", "@"),
        ("bracketleft", "["),
        ("backslash", "\\"),
        ("bracketright", "]"),
        ("asciicircum", "^"),
        ("underscore", "_"),
        ("grave", "`"),
        ("braceleft", "{"),
        ("bar", "|"),
        ("braceright", "}"),
        ("asciitilde", "~"),
    ])
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
}

/// What a key press should do before it is forwarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Escape always leaves fullscreen
    LeaveFullscreen,
    /// Tab reveals the chrome for keyboard navigation
    RevealChrome,
    /// Send to the engine as a keypress
    Forward(String),
}

/// Engine name for a toolkit key name
pub fn engine_key_name(key_name: &str) -> &str {
    KEY_REMAP.get(key_name).copied().unwrap_or(key_name)
}

/// Combine modifiers and key as `ctrl+alt+shift+KEY`.
///
/// Shift on a single letter is folded into the letter's case instead.
pub fn canonical_chord(key_name: &str, mods: Modifiers) -> String {
    let mut key = engine_key_name(key_name).to_string();
    let mut parts: Vec<&str> = Vec::with_capacity(4);

    if mods.ctrl {
        parts.push("ctrl");
    }
    if mods.alt {
        parts.push("alt");
    }
    if mods.shift {
        let mut chars = key.chars();
        let single_letter = match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => Some(c),
            _ => None,
        };
        match single_letter {
            Some(c) => key = c.to_uppercase().collect(),
            None => parts.push("shift"),
        }
    }

    parts.push(&key);
    parts.join("+")
}

pub fn classify_key(key_name: &str, mods: Modifiers) -> KeyAction {
    match key_name {
        "Escape" => KeyAction::LeaveFullscreen,
        "Tab" | "ISO_Left_Tab" => KeyAction::RevealChrome,
        _ => KeyAction::Forward(canonical_chord(key_name, mods)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    Back,
    Forward,
}

impl MouseButton {
    /// Map a toolkit button number
    pub fn from_button(button: u32) -> Option<Self> {
        match button {
            1 => Some(MouseButton::Left),
            2 => Some(MouseButton::Middle),
            3 => Some(MouseButton::Right),
            8 => Some(MouseButton::Back),
            9 => Some(MouseButton::Forward),
            _ => None,
        }
    }

    pub fn engine_name(self) -> &'static str {
        match self {
            MouseButton::Left => "MBTN_LEFT",
            MouseButton::Middle => "MBTN_MID",
            MouseButton::Right => "MBTN_RIGHT",
            MouseButton::Back => "MBTN_BACK",
            MouseButton::Forward => "MBTN_FORWARD",
        }
    }

    /// Back/forward have no release event worth sending
    pub fn press_op(self) -> EngineOp {
        match self {
            MouseButton::Back | MouseButton::Forward => {
                EngineOp::command("keypress", [self.engine_name()])
            }
            _ => EngineOp::command("keydown", [self.engine_name()]),
        }
    }

    pub fn release_op(self) -> EngineOp {
        EngineOp::command("keyup", [self.engine_name()])
    }

    /// Whether the toolkit should stop handling the press.
    ///
    /// A single left click is left alone so window dragging keeps working.
    pub fn claims_press(self, n_press: i32) -> bool {
        self != MouseButton::Left || n_press == 2
    }
}

/// Wheel key for a scroll over the video; only whole units count.
pub fn wheel_key(dx: f64, dy: f64, natural: bool) -> Option<&'static str> {
    let (up, down, left, right) = if natural {
        ("WHEEL_DOWN", "WHEEL_UP", "WHEEL_RIGHT", "WHEEL_LEFT")
    } else {
        ("WHEEL_UP", "WHEEL_DOWN", "WHEEL_LEFT", "WHEEL_RIGHT")
    };

    if dy.abs() >= 1.0 {
        Some(if dy < 0.0 { up } else { down })
    } else if dx.abs() >= 1.0 {
        Some(if dx > 0.0 { right } else { left })
    } else {
        None
    }
}

/// Scroll delta scaled for smooth or discrete devices, inverted for natural scrolling.
pub fn scroll_step(dy: f64, smooth: bool, natural: bool, discrete_step: f64) -> f64 {
    let step = if smooth { dy } else { dy * discrete_step };
    if natural { -step } else { step }
}
