use serde::{Deserialize, Serialize};

/// What a key press asks the studio to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Shortcut {
    TogglePalette,
    ClosePalette,
    PaletteUp,
    PaletteDown,
    PaletteRun,
    PlayPause,
    ToggleRecord,
    ToggleMetronome,
    SaveProject,
}

/// A key event as delivered by the host window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
    pub alt: bool,
}

impl KeyPress {
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn with_meta(mut self) -> Self {
        self.meta = true;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Modifier {
    None,
    /// Ctrl on Linux/Windows, Cmd on macOS. Either is accepted.
    Command,
}

/// Where a binding applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    Anywhere,
    PaletteOpen,
    PaletteClosed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    key: &'static str,
    modifier: Modifier,
    context: Context,
    pub shortcut: Shortcut,
}

impl KeyBinding {
    /// `chord` is a key name optionally prefixed with `cmd-`, e.g. `"cmd-k"`
    /// or `"space"`.
    pub fn new(chord: &'static str, shortcut: Shortcut, context: Context) -> Self {
        let (modifier, key) = match chord.strip_prefix("cmd-") {
            Some(key) => (Modifier::Command, key),
            None => (Modifier::None, chord),
        };
        Self {
            key,
            modifier,
            context,
            shortcut,
        }
    }

    fn matches(&self, press: &KeyPress, palette_open: bool) -> bool {
        let context_ok = match self.context {
            Context::Anywhere => true,
            Context::PaletteOpen => palette_open,
            Context::PaletteClosed => !palette_open,
        };
        let command_held = press.ctrl || press.meta;
        let modifier_ok = match self.modifier {
            Modifier::None => !command_held,
            Modifier::Command => command_held,
        };
        context_ok && modifier_ok && key_name(&press.key) == self.key
    }
}

fn key_name(key: &str) -> String {
    match key {
        " " => "space".to_string(),
        other => other.to_lowercase(),
    }
}

pub fn keybindings() -> Vec<KeyBinding> {
    vec![
        KeyBinding::new("cmd-k", Shortcut::TogglePalette, Context::Anywhere),
        KeyBinding::new("escape", Shortcut::ClosePalette, Context::PaletteOpen),
        KeyBinding::new("arrowup", Shortcut::PaletteUp, Context::PaletteOpen),
        KeyBinding::new("arrowdown", Shortcut::PaletteDown, Context::PaletteOpen),
        KeyBinding::new("enter", Shortcut::PaletteRun, Context::PaletteOpen),
        KeyBinding::new("cmd-s", Shortcut::SaveProject, Context::Anywhere),
        KeyBinding::new("space", Shortcut::PlayPause, Context::PaletteClosed),
        KeyBinding::new("r", Shortcut::ToggleRecord, Context::PaletteClosed),
        KeyBinding::new("m", Shortcut::ToggleMetronome, Context::PaletteClosed),
    ]
}

/// Resolve a key press against the default bindings.
pub fn resolve(press: &KeyPress, palette_open: bool) -> Option<Shortcut> {
    keybindings()
        .into_iter()
        .find(|binding| binding.matches(press, palette_open))
        .map(|binding| binding.shortcut)
}
