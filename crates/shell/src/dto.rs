//! Data sent to the UI.
//!
//! Every command answers with a full [`StudioSnapshot`] so the UI never has
//! to ask twice. Poll loops push the smaller [`Event`]s in between.

use crate::fault::FaultReport;
use crate::state::Studio;
use onbeat_api::{GenerationState, JobRecord};
use onbeat_core::catalog::{CatalogBeat, FEATURED};
use onbeat_core::library::filtered;
use onbeat_core::sim::{MasteringPhase, SegmentColor};
use onbeat_core::{EngineState, LibraryFilter, PaletteCommand, StudioState};
use onbeat_engine::MeterReading;
use onbeat_model::{
    LibraryTrack, SavedArrangement, SessionTrack, Settings, SongBlock, Theme, View, VocalPreset,
};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudioSnapshot {
    pub view: View,
    pub theme: Theme,
    pub active_track: Option<LibraryTrack>,
    pub transport: TransportDto,
    pub engine: EngineState,
    pub library: Vec<LibraryTrack>,
    pub library_filter: LibraryFilter,
    pub song_blocks: Vec<SongBlock>,
    pub saved_arrangements: Vec<SavedArrangement>,
    pub session_tracks: Vec<SessionTrack>,
    pub settings: Settings,
    pub modals: ModalsDto,
    pub panels: PanelsDto,
    pub active_preset: VocalPreset,
    pub lyrics: String,
    pub has_buffer: bool,
    pub palette: PaletteDto,
    pub discover: DiscoverDto,
    pub swipe: SwipeDto,
    pub generation: GenerationDto,
    pub history: Vec<JobRecord>,
    pub mastering: MasteringDto,
    pub meter: MeterDto,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportDto {
    pub is_playing: bool,
    pub is_recording: bool,
    pub active_input: String,
    pub metronome: bool,
    pub monitoring: bool,
    pub count_in: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModalsDto {
    pub setup: bool,
    pub upgrade: bool,
    pub mastering: bool,
    pub command: bool,
    pub shortcuts: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelsDto {
    pub console: bool,
    pub arrangement: bool,
    pub vocal_chain: bool,
    pub lyrics: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteDto {
    pub query: String,
    pub selected: usize,
    pub commands: Vec<PaletteCommand>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscoverDto {
    pub category: &'static str,
    pub featured: Vec<CatalogBeat>,
    pub beats: Vec<CatalogBeat>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwipeDto {
    pub index: usize,
    pub current: Option<CatalogBeat>,
    pub done: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Loading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationDto {
    pub status: GenerationStatus,
    pub job: Option<JobRecord>,
    pub error: Option<String>,
    pub duration_secs: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteringDto {
    pub phase: MasteringPhase,
    pub mastered: bool,
    pub previewing: bool,
    pub bars: Vec<f64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterDto {
    pub level: f32,
    pub error: Option<String>,
}

impl From<&MeterReading> for MeterDto {
    fn from(reading: &MeterReading) -> Self {
        Self {
            level: reading.level,
            error: reading.error.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelLevel {
    pub id: String,
    pub level: f64,
    pub segments: Vec<SegmentColor>,
    pub waveform: Vec<f64>,
}

/// Outbound messages, one JSON object per line.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Event {
    Snapshot {
        id: Option<u64>,
        snapshot: Box<StudioSnapshot>,
    },
    Error {
        id: Option<u64>,
        message: String,
    },
    Fault {
        id: Option<u64>,
        report: FaultReport,
    },
    History {
        jobs: Vec<JobRecord>,
    },
    Meter(MeterDto),
    Tick {
        progress: f64,
        elapsed: String,
        tuner_cents: f64,
        tuner_note: &'static str,
        channels: Vec<ChannelLevel>,
        master: [f64; 2],
        mastering: MasteringPhase,
    },
    Notice {
        message: String,
    },
}

pub fn studio_to_snapshot(
    state: &StudioState,
    studio: &Studio,
    history: &[JobRecord],
    meter: &MeterReading,
) -> StudioSnapshot {
    let transport = &state.transport;
    let generation = &studio.generation;
    let (status, job, error) = match generation.state() {
        GenerationState::Idle => (GenerationStatus::Idle, None, None),
        GenerationState::Loading => (GenerationStatus::Loading, None, None),
        GenerationState::Ready(job) => (GenerationStatus::Ready, Some(job.clone()), None),
        GenerationState::Failed(message) => {
            (GenerationStatus::Failed, None, Some(message.clone()))
        }
    };

    StudioSnapshot {
        view: state.view,
        theme: state.theme,
        active_track: state.active_track.clone(),
        transport: TransportDto {
            is_playing: transport.is_playing,
            is_recording: transport.is_recording,
            active_input: transport.active_input.clone(),
            metronome: transport.metronome,
            monitoring: transport.monitoring,
            count_in: transport.count_in,
        },
        engine: transport.engine_state(),
        library: filtered(&state.library, studio.library_filter)
            .cloned()
            .collect(),
        library_filter: studio.library_filter,
        song_blocks: state.arrangement.blocks().to_vec(),
        saved_arrangements: state.arrangement.saved().to_vec(),
        session_tracks: state.session.tracks().to_vec(),
        settings: state.settings.clone(),
        modals: ModalsDto {
            setup: state.modals.setup,
            upgrade: state.modals.upgrade,
            mastering: state.modals.mastering,
            command: state.modals.command,
            shortcuts: state.modals.shortcuts,
        },
        panels: PanelsDto {
            console: state.panels.console,
            arrangement: state.panels.arrangement,
            vocal_chain: state.panels.vocal_chain,
            lyrics: state.panels.lyrics,
        },
        active_preset: state.active_preset,
        lyrics: state.lyrics.clone(),
        has_buffer: state.has_buffer,
        palette: PaletteDto {
            query: studio.palette.query().to_string(),
            selected: studio.palette.selected(),
            commands: studio.palette.filtered(state),
        },
        discover: DiscoverDto {
            category: studio.feed.category(),
            featured: FEATURED.to_vec(),
            beats: studio.feed.beats().to_vec(),
        },
        swipe: SwipeDto {
            index: studio.swipe.index(),
            current: studio.swipe.current().cloned(),
            done: studio.swipe.is_done(),
        },
        generation: GenerationDto {
            status,
            job,
            error,
            duration_secs: generation.duration_secs(),
        },
        history: history.to_vec(),
        mastering: MasteringDto {
            phase: studio.mastering.phase(),
            mastered: studio.mastering.is_mastered(),
            previewing: studio.mastering.is_previewing(),
            bars: studio.mastering.bars(),
        },
        meter: meter.into(),
    }
}

/// The periodic simulation update.
pub fn studio_to_tick(studio: &Studio) -> Event {
    let mut channels: Vec<ChannelLevel> = studio
        .channel_meters
        .iter()
        .map(|(id, meter)| ChannelLevel {
            id: id.clone(),
            level: meter.level(),
            segments: meter.segments().to_vec(),
            waveform: studio.lane_waveforms.get(id).cloned().unwrap_or_default(),
        })
        .collect();
    channels.sort_by(|a, b| a.id.cmp(&b.id));

    Event::Tick {
        progress: studio.progress.percent(),
        elapsed: studio.progress.elapsed_label(),
        tuner_cents: studio.tuner.cents(),
        tuner_note: studio.tuner.note(),
        channels,
        master: [
            studio.master_meters[0].level(),
            studio.master_meters[1].level(),
        ],
        mastering: studio.mastering.phase(),
    }
}
