//! Command handlers.
//!
//! The UI sends one [`Command`] per line. Each handler locks what it needs,
//! acts, and answers with a fresh snapshot so the UI stays in sync without
//! a separate `getState` round trip.

use crate::dto::{Event, StudioSnapshot, studio_to_snapshot};
use crate::fault::catch_fault;
use crate::state::{AppState, Studio};
use onbeat_api::full_prompt;
use onbeat_core::catalog::{CatalogBeat, FEATURED, SwipeDirection, open_in_studio, preview};
use onbeat_core::keybindings::{KeyPress, Shortcut, resolve};
use onbeat_core::state::BUFFER_RECOVERED_NOTICE;
use onbeat_core::{Action, AudioFile, LibraryFilter, Store, library};
use onbeat_model::{Modal, View};
use serde::Deserialize;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

pub type CommandResult<T> = Result<T, String>;

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "cmd", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Command {
    GetState,
    Dispatch {
        action: Action,
    },
    /// Write the persisted record now.
    Save,
    ImportLibraryFile {
        path: PathBuf,
    },
    ImportTrackFile {
        id: String,
        path: PathBuf,
    },
    Generate {
        prompt: String,
        genre: Option<String>,
    },
    SetGenerationDuration {
        secs: u32,
    },
    OpenGeneratedTrack,
    FetchHistory,
    /// Poll one job and update its history entry.
    RefreshJob {
        id: i64,
    },
    KeyPress {
        press: KeyPress,
    },
    PaletteQuery {
        query: String,
    },
    PaletteRun,
    Swipe {
        direction: SwipeDirection,
    },
    SwipeRestart,
    OpenCatalogBeat {
        id: u32,
    },
    PreviewCatalogBeat {
        id: u32,
    },
    LoadMoreBeats,
    SetCategory {
        name: String,
    },
    SetLibraryFilter {
        filter: LibraryFilter,
    },
    StartMastering,
    ToggleMasteringAb,
    ToggleMasteringPreview,
    /// Leave the fault screen: rebuild from persisted state.
    Restart,
}

pub struct Reply {
    pub snapshot: StudioSnapshot,
    pub notices: Vec<String>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> CommandResult<MutexGuard<'a, T>> {
    mutex
        .lock()
        .map_err(|_| format!("Failed to acquire {what} lock"))
}

/// Run one command inside the fault boundary and turn the outcome into the
/// events to send back. While faulted, everything except `Restart` answers
/// with the fault.
pub fn execute(app: &AppState, id: Option<u64>, command: Command) -> Vec<Event> {
    if !matches!(command, Command::Restart) {
        if let Some(report) = app.fault() {
            return vec![Event::Fault { id, report }];
        }
    }

    match catch_fault(AssertUnwindSafe(|| handle(app, command))) {
        Ok(Ok(reply)) => {
            let mut events = vec![Event::Snapshot {
                id,
                snapshot: Box::new(reply.snapshot),
            }];
            events.extend(
                reply
                    .notices
                    .into_iter()
                    .map(|message| Event::Notice { message }),
            );
            events
        }
        Ok(Err(message)) => vec![Event::Error { id, message }],
        Err(report) => {
            app.set_fault(report.clone());
            vec![Event::Fault { id, report }]
        }
    }
}

/// Parse and execute one line of input.
pub fn execute_line(app: &AppState, line: &str) -> Vec<Event> {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(e) => {
            return vec![Event::Error {
                id: None,
                message: format!("invalid JSON: {e}"),
            }];
        }
    };
    let id = value.get("id").and_then(serde_json::Value::as_u64);
    match serde_json::from_value::<Command>(value) {
        Ok(command) => execute(app, id, command),
        Err(e) => vec![Event::Error {
            id,
            message: format!("invalid command: {e}"),
        }],
    }
}

pub fn handle(app: &AppState, command: Command) -> CommandResult<Reply> {
    let actions = match command {
        Command::GetState => Vec::new(),
        Command::Dispatch { action } => vec![action],
        Command::Save => {
            lock(&app.store, "store")?
                .save()
                .map_err(|e| e.to_string())?;
            tracing::info!("studio saved");
            Vec::new()
        }
        Command::ImportLibraryFile { path } => vec![import_library_file(&path)?],
        Command::ImportTrackFile { id, path } => vec![Action::ImportAudioToTrack {
            id,
            file: AudioFile {
                name: file_name(&path)?,
                url: file_url(&path),
            },
        }],
        Command::Generate { prompt, genre } => {
            generate(app, &full_prompt(genre.as_deref(), &prompt))?;
            Vec::new()
        }
        Command::SetGenerationDuration { secs } => {
            lock(&app.studio, "studio")?
                .generation
                .set_duration_secs(secs);
            Vec::new()
        }
        Command::OpenGeneratedTrack => {
            let track = lock(&app.studio, "studio")?
                .generation
                .active_track()
                .ok_or_else(|| "No generated track".to_string())?;
            vec![
                Action::SetActiveTrack { track: Some(track) },
                Action::SetView { view: View::Studio },
            ]
        }
        Command::FetchHistory => {
            refresh_history(app)?;
            Vec::new()
        }
        Command::RefreshJob { id } => {
            refresh_job(app, id)?;
            Vec::new()
        }
        Command::KeyPress { press } => key_press(app, &press)?,
        Command::PaletteQuery { query } => {
            lock(&app.studio, "studio")?.palette.set_query(query);
            Vec::new()
        }
        Command::PaletteRun => {
            let store = lock(&app.store, "store")?;
            lock(&app.studio, "studio")?
                .palette
                .run_selected(store.state())
        }
        Command::Swipe { direction } => lock(&app.studio, "studio")?.swipe.swipe(direction),
        Command::SwipeRestart => {
            lock(&app.studio, "studio")?.swipe.restart();
            Vec::new()
        }
        Command::OpenCatalogBeat { id } => {
            let beat = find_beat(&*lock(&app.studio, "studio")?, id)?;
            open_in_studio(&beat).to_vec()
        }
        Command::PreviewCatalogBeat { id } => {
            let store = lock(&app.store, "store")?;
            let beat = find_beat(&*lock(&app.studio, "studio")?, id)?;
            vec![preview(&beat, store.state().active_track.as_ref())]
        }
        Command::LoadMoreBeats => {
            lock(&app.studio, "studio")?.feed.load_more();
            Vec::new()
        }
        Command::SetCategory { name } => {
            if !lock(&app.studio, "studio")?.feed.set_category(&name) {
                return Err(format!("Unknown category: {name}"));
            }
            Vec::new()
        }
        Command::SetLibraryFilter { filter } => {
            lock(&app.studio, "studio")?.library_filter = filter;
            Vec::new()
        }
        Command::StartMastering => {
            lock(&app.studio, "studio")?.mastering.start();
            Vec::new()
        }
        Command::ToggleMasteringAb => {
            lock(&app.studio, "studio")?.mastering.toggle_ab();
            Vec::new()
        }
        Command::ToggleMasteringPreview => {
            lock(&app.studio, "studio")?.mastering.toggle_preview();
            Vec::new()
        }
        Command::Restart => {
            app.restart();
            Vec::new()
        }
    };

    apply_actions(app, actions)
}

/// Dispatch `actions` in order, keep the page-local models and the
/// microphone in step with the result, and snapshot everything.
fn apply_actions(app: &AppState, actions: Vec<Action>) -> CommandResult<Reply> {
    let mut store = lock(&app.store, "store")?;
    let mut studio = lock(&app.studio, "studio")?;
    let mut meter = lock(&app.meter, "meter")?;
    let history = lock(&app.history, "history")?;

    let setup_was_open = store.state().modals.setup;
    let mut notices = Vec::new();
    for action in actions {
        if action == Action::DumpBuffer {
            notices.push(BUFFER_RECOVERED_NOTICE.to_string());
        }
        dispatch(&mut store, &mut studio, action);
    }

    // Capture follows the setup dialog. A device that failed to open is only
    // retried when the dialog is opened again.
    let setup_open = store.state().modals.setup;
    if setup_open != setup_was_open {
        meter.set_active(setup_open);
    }
    studio.sync(store.state());

    Ok(Reply {
        snapshot: studio_to_snapshot(store.state(), &studio, &history, meter.reading()),
        notices,
    })
}

fn dispatch(store: &mut Store, studio: &mut Studio, action: Action) {
    let opened = match &action {
        Action::SetModal { modal, open: true } => Some(*modal),
        _ => None,
    };
    store.dispatch(action);
    match opened {
        Some(Modal::Command) => studio.palette.reset(),
        Some(Modal::Mastering) => studio.mastering.reset(),
        _ => {}
    }
}

fn key_press(app: &AppState, press: &KeyPress) -> CommandResult<Vec<Action>> {
    let store = lock(&app.store, "store")?;
    let mut studio = lock(&app.studio, "studio")?;
    let palette_open = store.state().modals.command;

    let Some(shortcut) = resolve(press, palette_open) else {
        return Ok(Vec::new());
    };
    tracing::debug!(?shortcut, "key binding");

    let actions = match shortcut {
        Shortcut::TogglePalette => vec![Action::SetModal {
            modal: Modal::Command,
            open: !palette_open,
        }],
        Shortcut::ClosePalette => vec![Action::SetModal {
            modal: Modal::Command,
            open: false,
        }],
        Shortcut::PaletteUp => {
            studio.palette.move_up(store.state());
            Vec::new()
        }
        Shortcut::PaletteDown => {
            studio.palette.move_down(store.state());
            Vec::new()
        }
        Shortcut::PaletteRun => studio.palette.run_selected(store.state()),
        Shortcut::PlayPause => vec![Action::TogglePlay],
        Shortcut::ToggleRecord => vec![Action::ToggleRecord],
        Shortcut::ToggleMetronome => vec![Action::ToggleMetronome],
        Shortcut::SaveProject => {
            store.save().map_err(|e| e.to_string())?;
            tracing::info!("studio saved");
            Vec::new()
        }
    };
    Ok(actions)
}

fn generate(app: &AppState, prompt: &str) -> CommandResult<()> {
    if !lock(&app.studio, "studio")?.generation.start(prompt) {
        return Ok(());
    }
    // No lock is held across the request.
    let result = app.service.generate(prompt);
    lock(&app.studio, "studio")?.generation.finish(result);
    Ok(())
}

/// Fetch the job history into the shared list. Never fails on network
/// trouble; an unreachable backend reads as an empty history.
pub fn refresh_history(app: &AppState) -> CommandResult<Vec<onbeat_api::JobRecord>> {
    let jobs = app.service.history();
    *lock(&app.history, "history")? = jobs.clone();
    Ok(jobs)
}

/// Replace a job's history entry with its current status, adding it at
/// the front when the history does not know it yet. Network errors are
/// returned to the caller.
fn refresh_job(app: &AppState, id: i64) -> CommandResult<()> {
    let job = app.service.status(id).map_err(|e| e.to_string())?;
    let mut history = lock(&app.history, "history")?;
    match history.iter_mut().find(|entry| entry.id == id) {
        Some(entry) => *entry = job,
        None => history.insert(0, job),
    }
    Ok(())
}

fn find_beat(studio: &Studio, id: u32) -> CommandResult<CatalogBeat> {
    studio
        .feed
        .beats()
        .iter()
        .chain(FEATURED.iter())
        .find(|beat| beat.id == id)
        .cloned()
        .ok_or_else(|| format!("Unknown beat: {id}"))
}

fn file_name(path: &Path) -> CommandResult<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| format!("Not a file: {}", path.display()))
}

fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

fn import_library_file(path: &Path) -> CommandResult<Action> {
    let name = file_name(path)?;
    let duration = match onbeat_decode::duration_label(path) {
        Ok(label) => Some(label),
        Err(e) => {
            tracing::warn!("could not read duration of {}: {e}", path.display());
            None
        }
    };
    Ok(Action::AddToLibrary {
        track: library::upload(&name, &file_url(path), duration),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use onbeat_api::{ApiError, JobRecord, JobStatus, MusicService};
    use onbeat_core::sim::MasteringPhase;
    use onbeat_engine::{CaptureBackend, CaptureSession, LevelMeter, MeterError};
    use onbeat_model::Theme;
    use onbeat_project::{MemoryStorage, Storage};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    struct FakeService {
        explode: bool,
    }

    fn job(id: i64) -> JobRecord {
        JobRecord {
            id,
            title: Some("Lo-Fi - AI Gen".to_string()),
            prompt: "p".to_string(),
            status: JobStatus::Completed,
            progress: Some(100),
            duration: Some(30),
            file_url: None,
            created_at: "2024-05-01T10:00:00".to_string(),
        }
    }

    impl MusicService for FakeService {
        fn generate(&self, prompt: &str) -> Result<JobRecord, ApiError> {
            if self.explode {
                panic!("backend client blew up");
            }
            if prompt.contains("fail") {
                return Err(ApiError::Status(500));
            }
            Ok(job(9))
        }

        fn history(&self) -> Vec<JobRecord> {
            vec![job(1), job(2)]
        }

        fn status(&self, id: i64) -> Result<JobRecord, ApiError> {
            if id == 404 {
                return Err(ApiError::Status(404));
            }
            Ok(JobRecord {
                status: JobStatus::Processing,
                ..job(id)
            })
        }
    }

    #[derive(Clone, Default)]
    struct FakeMic {
        capturing: Arc<AtomicBool>,
    }

    impl CaptureBackend for FakeMic {
        fn open(&mut self, _sink: rtrb::Producer<f32>) -> Result<CaptureSession, MeterError> {
            self.capturing.store(true, Ordering::SeqCst);
            let capturing = Arc::clone(&self.capturing);
            Ok(CaptureSession::new(48_000, move || {
                capturing.store(false, Ordering::SeqCst)
            }))
        }
    }

    fn app_with(storage: MemoryStorage, explode: bool, mic: FakeMic) -> AppState {
        let config = Config {
            mastering_ms: 100,
            ..Default::default()
        };
        AppState::new(
            config,
            Box::new(move || -> Box<dyn Storage> { Box::new(storage.clone()) }),
            Arc::new(FakeService { explode }),
            LevelMeter::new(Box::new(mic)),
        )
    }

    fn app() -> AppState {
        app_with(MemoryStorage::new(), false, FakeMic::default())
    }

    fn snapshot(events: Vec<Event>) -> StudioSnapshot {
        match events.into_iter().next() {
            Some(Event::Snapshot { snapshot, .. }) => *snapshot,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    fn run(app: &AppState, json: &str) -> Vec<Event> {
        execute_line(app, json)
    }

    #[test]
    fn test_dispatch_returns_snapshot() {
        let app = app();
        let snap = snapshot(run(
            &app,
            r#"{"id":1,"cmd":"dispatch","action":{"action":"togglePlay"}}"#,
        ));
        assert!(snap.transport.is_playing);
        assert_eq!(snap.engine, onbeat_core::EngineState::Running);
    }

    #[test]
    fn test_malformed_input_is_error_event() {
        let app = app();
        assert!(matches!(
            run(&app, "{nope").as_slice(),
            [Event::Error { id: None, .. }]
        ));
        assert!(matches!(
            run(&app, r#"{"id":4,"cmd":"fly"}"#).as_slice(),
            [Event::Error { id: Some(4), .. }]
        ));
    }

    #[derive(Clone, Default)]
    struct DeniedMic {
        attempts: Arc<AtomicUsize>,
    }

    impl CaptureBackend for DeniedMic {
        fn open(&mut self, _sink: rtrb::Producer<f32>) -> Result<CaptureSession, MeterError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            Err(MeterError::NoDevice)
        }
    }

    #[test]
    fn test_denied_microphone_retried_only_on_reopen() {
        let mic = DeniedMic::default();
        let storage = MemoryStorage::new();
        let app = AppState::new(
            Config::default(),
            Box::new(move || -> Box<dyn Storage> { Box::new(storage.clone()) }),
            Arc::new(FakeService { explode: false }),
            LevelMeter::new(Box::new(mic.clone())),
        );
        let open = r#"{"cmd":"dispatch","action":{"action":"setModal","modal":"setup","open":true}}"#;
        let close = r#"{"cmd":"dispatch","action":{"action":"setModal","modal":"setup","open":false}}"#;

        let snap = snapshot(run(&app, open));
        assert_eq!(snap.meter.error.as_deref(), Some(onbeat_engine::PERMISSION_DENIED));
        run(&app, r#"{"cmd":"getState"}"#);
        run(&app, r#"{"cmd":"dispatch","action":{"action":"togglePlay"}}"#);
        assert_eq!(mic.attempts.load(Ordering::SeqCst), 1);

        run(&app, close);
        run(&app, open);
        assert_eq!(mic.attempts.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_setup_modal_drives_microphone() {
        let mic = FakeMic::default();
        let app = app_with(MemoryStorage::new(), false, mic.clone());

        run(
            &app,
            r#"{"cmd":"dispatch","action":{"action":"setModal","modal":"setup","open":true}}"#,
        );
        assert!(mic.capturing.load(Ordering::SeqCst));

        run(
            &app,
            r#"{"cmd":"dispatch","action":{"action":"setModal","modal":"setup","open":false}}"#,
        );
        assert!(!mic.capturing.load(Ordering::SeqCst));
    }

    #[test]
    fn test_palette_via_keys() {
        let app = app();
        run(&app, r#"{"cmd":"paletteQuery","query":"old"}"#);
        let snap = snapshot(run(&app, r#"{"cmd":"keyPress","press":{"key":"k","ctrl":true}}"#));
        assert!(snap.modals.command);
        assert_eq!(snap.palette.query, "");

        run(&app, r#"{"cmd":"paletteQuery","query":"library"}"#);
        let snap = snapshot(run(&app, r#"{"cmd":"keyPress","press":{"key":"Enter"}}"#));
        assert_eq!(snap.view, View::Library);
        assert!(!snap.modals.command);
    }

    #[test]
    fn test_generation_flow() {
        let app = app();
        let snap = snapshot(run(&app, r#"{"cmd":"generate","prompt":"","genre":null}"#));
        assert!(matches!(snap.generation.status, crate::dto::GenerationStatus::Idle));

        run(&app, r#"{"cmd":"setGenerationDuration","secs":45}"#);
        run(&app, r#"{"cmd":"generate","prompt":"night","genre":"Trap"}"#);
        let snap = snapshot(run(&app, r#"{"cmd":"openGeneratedTrack"}"#));
        let track = snap.active_track.expect("active");
        assert_eq!(track.title, "AI Gen #9");
        assert_eq!(track.duration, "45s");
        assert_eq!(snap.view, View::Studio);

        let snap = snapshot(run(&app, r#"{"cmd":"generate","prompt":"fail please"}"#));
        assert_eq!(
            snap.generation.error.as_deref(),
            Some(onbeat_api::GENERATION_FAILED)
        );
    }

    #[test]
    fn test_history_is_fetched() {
        let app = app();
        let snap = snapshot(run(&app, r#"{"cmd":"fetchHistory"}"#));
        assert_eq!(snap.history.len(), 2);
    }

    #[test]
    fn test_refresh_job_updates_history_entry() {
        let app = app();
        run(&app, r#"{"cmd":"fetchHistory"}"#);

        let snap = snapshot(run(&app, r#"{"cmd":"refreshJob","id":2}"#));
        assert_eq!(snap.history.len(), 2);
        assert_eq!(snap.history[1].status, JobStatus::Processing);

        let snap = snapshot(run(&app, r#"{"cmd":"refreshJob","id":5}"#));
        assert_eq!(snap.history.len(), 3);
        assert_eq!(snap.history[0].id, 5);

        assert!(matches!(
            run(&app, r#"{"cmd":"refreshJob","id":404}"#).as_slice(),
            [Event::Error { .. }]
        ));
    }

    #[test]
    fn test_opening_mastering_resets_job() {
        let app = app();
        run(&app, r#"{"cmd":"startMastering"}"#);
        app.studio
            .lock()
            .expect("lock")
            .advance(Duration::from_millis(100), false);
        assert_eq!(
            app.studio.lock().expect("lock").mastering.phase(),
            MasteringPhase::Completed
        );

        let snap = snapshot(run(
            &app,
            r#"{"cmd":"dispatch","action":{"action":"setModal","modal":"mastering","open":true}}"#,
        ));
        assert_eq!(snap.mastering.phase, MasteringPhase::Idle);
        assert!(!snap.mastering.mastered);
    }

    #[test]
    fn test_dump_buffer_sends_notice() {
        let app = app();
        let events = run(&app, r#"{"cmd":"dispatch","action":{"action":"dumpBuffer"}}"#);
        assert!(matches!(
            events.last(),
            Some(Event::Notice { message }) if message == "Recovered last 30s of audio!"
        ));
    }

    #[test]
    fn test_import_unreadable_file_uses_fallback_duration() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("my take.mp3");
        std::fs::write(&path, b"garbage").expect("write");

        let app = app();
        let command = Command::ImportLibraryFile { path: path.clone() };
        let snap = handle(&app, command).expect("import").snapshot;
        let track = &snap.library[0];
        assert_eq!(track.title, "my take");
        assert_eq!(track.duration, "2:30");
        assert_eq!(track.artist.as_deref(), Some("User Upload"));
        assert_eq!(track.file_url, Some(format!("file://{}", path.display())));
    }

    #[test]
    fn test_swipe_up_loads_beat() {
        let app = app();
        run(&app, r#"{"cmd":"swipe","direction":"right"}"#);
        let snap = snapshot(run(&app, r#"{"cmd":"swipe","direction":"up"}"#));
        assert_eq!(
            snap.active_track.map(|t| t.title),
            Some("Drill Season".to_string())
        );
        assert_eq!(snap.view, View::Studio);
    }

    #[test]
    fn test_fault_then_restart() {
        let storage = MemoryStorage::new();
        let app = app_with(storage, true, FakeMic::default());

        run(&app, r#"{"cmd":"dispatch","action":{"action":"toggleTheme"}}"#);
        run(&app, r#"{"cmd":"dispatch","action":{"action":"togglePlay"}}"#);

        let events = run(&app, r#"{"id":8,"cmd":"generate","prompt":"boom"}"#);
        match events.as_slice() {
            [Event::Fault { id, report }] => {
                assert_eq!(*id, Some(8));
                assert_eq!(report.message, "backend client blew up");
            }
            other => panic!("expected fault, got {other:?}"),
        }

        // Stays faulted until restart.
        assert!(matches!(
            run(&app, r#"{"cmd":"getState"}"#).as_slice(),
            [Event::Fault { .. }]
        ));

        let snap = snapshot(run(&app, r#"{"cmd":"restart"}"#));
        assert_eq!(snap.theme, Theme::Light);
        assert!(!snap.transport.is_playing);
        assert!(matches!(
            run(&app, r#"{"cmd":"getState"}"#).as_slice(),
            [Event::Snapshot { .. }]
        ));
    }
}
