//! The studio state aggregate and the actions that transition it.

use crate::arrangement::Arrangement;
use crate::library;
use crate::session::SessionTracks;
use onbeat_model::{
    BlockType, LibraryTrack, Modal, SettingKey, SettingValue, Settings, Theme, TrackKind,
    TrackPatch, View, VocalPreset,
};
use serde::{Deserialize, Serialize};

pub const DEFAULT_LYRICS: &str = "Yeah, uh...\n(Write your lyrics here...)";
pub const DEFAULT_INPUT: &str = "Default Input";
pub const BUFFER_RECOVERED_NOTICE: &str = "Recovered last 30s of audio!";

/// Independently addressable parts of [`StudioState`]. Subscribers register
/// interest in a set of these and are only told about changes to them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Slice {
    View = 1 << 0,
    ActiveTrack = 1 << 1,
    Transport = 1 << 2,
    Theme = 1 << 3,
    Library = 1 << 4,
    Arrangement = 1 << 5,
    Session = 1 << 6,
    Settings = 1 << 7,
    Modals = 1 << 8,
    Panels = 1 << 9,
    Preset = 1 << 10,
    Lyrics = 1 << 11,
    Buffer = 1 << 12,
}

/// A set of [`Slice`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Slices(u16);

impl Slices {
    pub const NONE: Slices = Slices(0);
    pub const ALL: Slices = Slices(0x1fff);
    /// Slices whose fields (or some of whose fields) survive a restart.
    pub const PERSISTED: Slices = Slices(
        Slice::Theme as u16
            | Slice::Library as u16
            | Slice::Arrangement as u16
            | Slice::Session as u16
            | Slice::Settings as u16
            | Slice::Panels as u16,
    );

    pub fn of(slices: &[Slice]) -> Self {
        Slices(slices.iter().fold(0, |bits, s| bits | *s as u16))
    }

    pub fn with(self, slice: Slice) -> Self {
        Slices(self.0 | slice as u16)
    }

    pub fn contains(&self, slice: Slice) -> bool {
        self.0 & slice as u16 != 0
    }

    pub fn intersects(&self, other: Slices) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

impl From<Slice> for Slices {
    fn from(slice: Slice) -> Self {
        Slices(slice as u16)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Transport {
    pub is_playing: bool,
    pub is_recording: bool,
    pub active_input: String,
    pub metronome: bool,
    pub monitoring: bool,
    pub count_in: bool,
}

impl Default for Transport {
    fn default() -> Self {
        Self {
            is_playing: false,
            is_recording: false,
            active_input: DEFAULT_INPUT.to_string(),
            metronome: false,
            monitoring: false,
            count_in: true,
        }
    }
}

/// Whether the (simulated) audio engine should be running. It runs while
/// playing or recording and is suspended otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Running,
    Suspended,
}

impl Transport {
    pub fn engine_state(&self) -> EngineState {
        if self.is_playing || self.is_recording {
            EngineState::Running
        } else {
            EngineState::Suspended
        }
    }
}

/// Visibility of the five modal dialogs. Each flag is independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modals {
    pub setup: bool,
    pub upgrade: bool,
    pub mastering: bool,
    pub command: bool,
    pub shortcuts: bool,
}

impl Modals {
    pub fn set(&mut self, modal: Modal, open: bool) {
        *self.flag_mut(modal) = open;
    }

    pub fn is_open(&self, modal: Modal) -> bool {
        match modal {
            Modal::Setup => self.setup,
            Modal::Upgrade => self.upgrade,
            Modal::Mastering => self.mastering,
            Modal::Command => self.command,
            Modal::Shortcuts => self.shortcuts,
        }
    }

    fn flag_mut(&mut self, modal: Modal) -> &mut bool {
        match modal {
            Modal::Setup => &mut self.setup,
            Modal::Upgrade => &mut self.upgrade,
            Modal::Mastering => &mut self.mastering,
            Modal::Command => &mut self.command,
            Modal::Shortcuts => &mut self.shortcuts,
        }
    }
}

/// Collapsible studio panels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub console: bool,
    pub arrangement: bool,
    pub vocal_chain: bool,
    pub lyrics: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            console: false,
            arrangement: true,
            vocal_chain: true,
            lyrics: false,
        }
    }
}

/// A file picked by the user, already turned into a playable source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioFile {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "action",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Action {
    SetView { view: View },
    SetActiveTrack { track: Option<LibraryTrack> },
    TogglePlay,
    ToggleRecord,
    ToggleMetronome,
    ToggleMonitoring,
    ToggleCountIn,
    ToggleTheme,
    ToggleLyrics,
    ToggleConsole,
    ToggleArrangement,
    ToggleVocalChain,
    SetModal { modal: Modal, open: bool },
    AddToLibrary { track: LibraryTrack },
    RemoveFromLibrary { title: String },
    AddBlock { kind: BlockType },
    RemoveBlock { id: String },
    ResizeBlock { id: String, width: f64 },
    /// Drag-resize: add `delta` percent to the block's width.
    DragBlock { id: String, delta: f64 },
    SaveArrangement { name: String },
    LoadArrangement { id: String },
    DeleteArrangement { id: String },
    AddSessionTrack { kind: TrackKind },
    RemoveSessionTrack { id: String },
    UpdateSessionTrack { id: String, patch: TrackPatch },
    ImportAudioToTrack { id: String, file: AudioFile },
    SetSetting { key: SettingKey, value: SettingValue },
    SetInput { id: String },
    SetPreset { preset: VocalPreset },
    SetLyrics { text: String },
    AppendLyricLine { line: String },
    ActivateBuffer,
    DumpBuffer,
}

/// Everything the UI reads. Owned exclusively by the store; views only ever
/// see a shared reference.
#[derive(Debug, Clone, PartialEq)]
pub struct StudioState {
    pub view: View,
    pub theme: Theme,
    pub active_track: Option<LibraryTrack>,
    pub transport: Transport,
    pub library: Vec<LibraryTrack>,
    pub arrangement: Arrangement,
    pub session: SessionTracks,
    pub settings: Settings,
    pub modals: Modals,
    pub panels: Panels,
    pub active_preset: VocalPreset,
    pub lyrics: String,
    pub has_buffer: bool,
}

impl Default for StudioState {
    fn default() -> Self {
        Self {
            view: View::default(),
            theme: Theme::default(),
            active_track: None,
            transport: Transport::default(),
            library: Vec::new(),
            arrangement: Arrangement::default(),
            session: SessionTracks::seeded(),
            settings: Settings::default(),
            modals: Modals::default(),
            panels: Panels::default(),
            active_preset: VocalPreset::default(),
            lyrics: DEFAULT_LYRICS.to_string(),
            has_buffer: true,
        }
    }
}

fn touched(changed: bool, slice: Slice) -> Slices {
    if changed { slice.into() } else { Slices::NONE }
}

impl StudioState {
    /// Apply one action and report which slices it touched. Actions never
    /// fail: references to unknown ids or titles leave the state unchanged
    /// and touch nothing.
    pub fn apply(&mut self, action: Action) -> Slices {
        match action {
            Action::SetView { view } => {
                self.view = view;
                Slice::View.into()
            }
            Action::SetActiveTrack { track } => {
                // Selecting a track starts playback.
                if track.is_some() {
                    self.transport.is_playing = true;
                }
                self.active_track = track;
                Slices::of(&[Slice::ActiveTrack, Slice::Transport])
            }
            Action::TogglePlay => {
                self.transport.is_playing = !self.transport.is_playing;
                Slice::Transport.into()
            }
            Action::ToggleRecord => {
                self.transport.is_recording = !self.transport.is_recording;
                Slice::Transport.into()
            }
            Action::ToggleMetronome => {
                self.transport.metronome = !self.transport.metronome;
                Slice::Transport.into()
            }
            Action::ToggleMonitoring => {
                self.transport.monitoring = !self.transport.monitoring;
                Slice::Transport.into()
            }
            Action::ToggleCountIn => {
                self.transport.count_in = !self.transport.count_in;
                Slice::Transport.into()
            }
            Action::ToggleTheme => {
                self.theme = self.theme.toggled();
                Slice::Theme.into()
            }
            Action::ToggleLyrics => {
                self.panels.lyrics = !self.panels.lyrics;
                Slice::Panels.into()
            }
            Action::ToggleConsole => {
                self.panels.console = !self.panels.console;
                Slice::Panels.into()
            }
            Action::ToggleArrangement => {
                self.panels.arrangement = !self.panels.arrangement;
                Slice::Panels.into()
            }
            Action::ToggleVocalChain => {
                self.panels.vocal_chain = !self.panels.vocal_chain;
                Slice::Panels.into()
            }
            Action::SetModal { modal, open } => {
                self.modals.set(modal, open);
                Slice::Modals.into()
            }
            Action::AddToLibrary { track } => {
                library::add(&mut self.library, track);
                Slice::Library.into()
            }
            Action::RemoveFromLibrary { title } => touched(
                library::remove_by_title(&mut self.library, &title),
                Slice::Library,
            ),
            Action::AddBlock { kind } => {
                self.arrangement.add_block(kind);
                Slice::Arrangement.into()
            }
            Action::RemoveBlock { id } => {
                touched(self.arrangement.remove_block(&id), Slice::Arrangement)
            }
            Action::ResizeBlock { id, width } => {
                touched(self.arrangement.resize_block(&id, width), Slice::Arrangement)
            }
            Action::DragBlock { id, delta } => {
                touched(self.arrangement.drag_block(&id, delta), Slice::Arrangement)
            }
            Action::SaveArrangement { name } => {
                self.arrangement.save(&name);
                Slice::Arrangement.into()
            }
            Action::LoadArrangement { id } => {
                touched(self.arrangement.load(&id), Slice::Arrangement)
            }
            Action::DeleteArrangement { id } => {
                touched(self.arrangement.delete(&id), Slice::Arrangement)
            }
            Action::AddSessionTrack { kind } => {
                self.session.add(kind);
                Slice::Session.into()
            }
            Action::RemoveSessionTrack { id } => touched(self.session.remove(&id), Slice::Session),
            Action::UpdateSessionTrack { id, patch } => {
                touched(self.session.update(&id, &patch), Slice::Session)
            }
            Action::ImportAudioToTrack { id, file } => touched(
                self.session.import_audio(&id, &file.name, &file.url),
                Slice::Session,
            ),
            Action::SetSetting { key, value } => {
                let accepted = self.settings.set(key, value);
                if !accepted {
                    tracing::warn!(?key, "ignoring setting value of the wrong type");
                }
                touched(accepted, Slice::Settings)
            }
            Action::SetInput { id } => {
                self.transport.active_input = id;
                Slice::Transport.into()
            }
            Action::SetPreset { preset } => {
                self.active_preset = preset;
                Slice::Preset.into()
            }
            Action::SetLyrics { text } => {
                self.lyrics = text;
                Slice::Lyrics.into()
            }
            Action::AppendLyricLine { line } => {
                self.lyrics = format!("{}\n{}", self.lyrics, line);
                Slice::Lyrics.into()
            }
            Action::ActivateBuffer => {
                self.has_buffer = true;
                Slice::Buffer.into()
            }
            Action::DumpBuffer => {
                tracing::info!("{BUFFER_RECOVERED_NOTICE}");
                Slices::NONE
            }
        }
    }
}
