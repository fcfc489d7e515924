//! Command palette: a searchable list of studio commands.

use crate::state::{Action, StudioState};
use onbeat_model::{Modal, Theme, View};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CommandGroup {
    Navigation,
    Studio,
    System,
}

impl CommandGroup {
    pub fn name(&self) -> &'static str {
        match self {
            CommandGroup::Navigation => "Navigation",
            CommandGroup::Studio => "Studio",
            CommandGroup::System => "System",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteCommand {
    pub id: &'static str,
    pub label: String,
    pub group: CommandGroup,
    #[serde(skip)]
    pub action: Action,
}

impl PaletteCommand {
    fn new(id: &'static str, label: impl Into<String>, group: CommandGroup, action: Action) -> Self {
        Self {
            id,
            label: label.into(),
            group,
            action,
        }
    }

    fn matches(&self, needle: &str) -> bool {
        self.label.to_lowercase().contains(needle)
            || self.group.name().to_lowercase().contains(needle)
    }
}

/// The full command list. Labels reflect the current state.
pub fn commands(state: &StudioState) -> Vec<PaletteCommand> {
    use CommandGroup::*;

    let nav = |id, label, view| PaletteCommand::new(id, label, Navigation, Action::SetView { view });
    let play = if state.transport.is_playing {
        "Pause Playback"
    } else {
        "Start Playback"
    };
    let record = if state.transport.is_recording {
        "Stop Recording"
    } else {
        "Start Recording"
    };
    let theme = match state.theme {
        Theme::Dark => "Switch to Light Mode",
        Theme::Light => "Switch to Dark Mode",
    };

    vec![
        nav("nav-home", "Go to Home", View::Home),
        nav("nav-studio", "Go to Studio", View::Studio),
        nav("nav-lib", "Go to Library", View::Library),
        nav("nav-gen", "Go to Generator", View::Generate),
        nav("nav-dis", "Go to Discover", View::Discover),
        PaletteCommand::new("act-play", play, Studio, Action::TogglePlay),
        PaletteCommand::new("act-rec", record, Studio, Action::ToggleRecord),
        PaletteCommand::new("act-metro", "Toggle Metronome", Studio, Action::ToggleMetronome),
        PaletteCommand::new("act-mon", "Toggle Monitoring", Studio, Action::ToggleMonitoring),
        PaletteCommand::new("sys-theme", theme, System, Action::ToggleTheme),
    ]
}

/// Query text and highlighted row of an open palette.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Palette {
    query: String,
    selected: usize,
}

impl Palette {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Called whenever the palette is opened.
    pub fn reset(&mut self) {
        self.query.clear();
        self.selected = 0;
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = 0;
    }

    /// Commands whose label or group contains the query, ignoring case.
    pub fn filtered(&self, state: &StudioState) -> Vec<PaletteCommand> {
        let needle = self.query.to_lowercase();
        commands(state)
            .into_iter()
            .filter(|c| c.matches(&needle))
            .collect()
    }

    pub fn move_down(&mut self, state: &StudioState) {
        let len = self.filtered(state).len();
        if len > 0 {
            self.selected = (self.selected + 1) % len;
        }
    }

    pub fn move_up(&mut self, state: &StudioState) {
        let len = self.filtered(state).len();
        if len > 0 {
            self.selected = (self.selected + len - 1) % len;
        }
    }

    /// Actions to dispatch for the highlighted command: the command itself
    /// followed by closing the palette. Empty when nothing matches.
    pub fn run_selected(&self, state: &StudioState) -> Vec<Action> {
        match self.filtered(state).into_iter().nth(self.selected) {
            Some(command) => vec![
                command.action,
                Action::SetModal {
                    modal: Modal::Command,
                    open: false,
                },
            ],
            None => Vec::new(),
        }
    }
}
