//! Shared application state.
//!
//! Every command handler and poll loop works through one `AppState`. The
//! store is the single source of truth; `Studio` holds the page-local
//! models that the browser would otherwise keep in component state.

use crate::config::Config;
use crate::fault::FaultReport;
use onbeat_api::{Generation, JobRecord, MusicService};
use onbeat_core::catalog::{DiscoverFeed, SwipeDeck};
use onbeat_core::sim::{ConsoleMeter, MasteringJob, PlaybackProgress, Tuner, track_waveform};
use onbeat_core::{LibraryFilter, Palette, StudioState, Store};
use onbeat_engine::LevelMeter;
use onbeat_project::Storage;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// Bars drawn per session lane.
pub const WAVEFORM_BARS: usize = 64;

/// Opens the persisted-state storage. Called at start-up and on restart.
pub type StorageFactory = Box<dyn Fn() -> Box<dyn Storage> + Send + Sync>;

/// Page-local models: palette, discover, swipe deck, generator and the
/// simulated meters.
pub struct Studio {
    pub palette: Palette,
    pub swipe: SwipeDeck,
    pub feed: DiscoverFeed,
    pub library_filter: LibraryFilter,
    pub generation: Generation,
    pub mastering: MasteringJob,
    pub tuner: Tuner,
    pub progress: PlaybackProgress,
    pub channel_meters: HashMap<String, ConsoleMeter>,
    pub master_meters: [ConsoleMeter; 2],
    /// Lane waveform bars, keyed like `channel_meters`.
    pub lane_waveforms: HashMap<String, Vec<f64>>,
    waveform_phase: u32,
    waveform_rng: fastrand::Rng,
    console_interval: Duration,
}

impl Studio {
    pub fn new(config: &Config) -> Self {
        let console_interval = config.console_meter_interval();
        let meter = || ConsoleMeter::new(console_interval, fastrand::Rng::new());
        Self {
            palette: Palette::new(),
            swipe: SwipeDeck::default(),
            feed: DiscoverFeed::default(),
            library_filter: LibraryFilter::default(),
            generation: Generation::new(),
            mastering: MasteringJob::new(config.mastering_duration()),
            tuner: Tuner::new(config.tuner_interval(), fastrand::Rng::new()),
            progress: PlaybackProgress::default(),
            channel_meters: HashMap::new(),
            master_meters: [meter(), meter()],
            lane_waveforms: HashMap::new(),
            waveform_phase: 0,
            waveform_rng: fastrand::Rng::new(),
            console_interval,
        }
    }

    /// Match simulation activity to the studio state: the tuner runs while
    /// recording or monitoring, a channel meter while playing an audible
    /// track (unmuted, and soloed if anything is) that has audio, the master
    /// meters while playing.
    pub fn sync(&mut self, state: &StudioState) {
        let transport = &state.transport;
        self.tuner
            .set_active(transport.is_recording || transport.monitoring);

        let tracks = state.session.tracks();
        self.channel_meters
            .retain(|id, _| tracks.iter().any(|t| &t.id == id));
        for track in tracks {
            let interval = self.console_interval;
            let meter = self
                .channel_meters
                .entry(track.id.clone())
                .or_insert_with(|| ConsoleMeter::new(interval, fastrand::Rng::new()));
            meter.set_active(
                transport.is_playing
                    && state.session.is_audible(&track.id)
                    && track.file_url.is_some(),
            );
        }
        for meter in &mut self.master_meters {
            meter.set_active(transport.is_playing);
        }
        self.refresh_waveforms();
    }

    pub fn advance(&mut self, elapsed: Duration, playing: bool) {
        self.mastering.advance(elapsed);
        self.tuner.advance(elapsed);
        self.progress.advance(elapsed, playing);
        for meter in self.channel_meters.values_mut() {
            meter.advance(elapsed);
        }
        for meter in &mut self.master_meters {
            meter.advance(elapsed);
        }
        if playing {
            self.waveform_phase = self.waveform_phase.wrapping_add(1);
        }
        self.refresh_waveforms();
    }

    /// A lane's waveform drifts while its channel meter is running and
    /// holds the idle shape otherwise.
    fn refresh_waveforms(&mut self) {
        self.lane_waveforms
            .retain(|id, _| self.channel_meters.contains_key(id));
        for (id, meter) in &self.channel_meters {
            let bars = track_waveform(
                WAVEFORM_BARS,
                self.waveform_phase,
                meter.is_active(),
                &mut self.waveform_rng,
            );
            self.lane_waveforms.insert(id.clone(), bars);
        }
    }
}

pub struct AppState {
    pub store: Mutex<Store>,
    pub studio: Mutex<Studio>,
    pub meter: Mutex<LevelMeter>,
    pub history: Mutex<Vec<JobRecord>>,
    pub fault: Mutex<Option<FaultReport>>,
    pub service: Arc<dyn MusicService>,
    pub config: Config,
    storage: StorageFactory,
}

impl AppState {
    pub fn new(
        config: Config,
        storage: StorageFactory,
        service: Arc<dyn MusicService>,
        meter: LevelMeter,
    ) -> Self {
        let store = Store::restored(storage());
        let mut studio = Studio::new(&config);
        studio.sync(store.state());
        Self {
            store: Mutex::new(store),
            studio: Mutex::new(studio),
            meter: Mutex::new(meter),
            history: Mutex::new(Vec::new()),
            fault: Mutex::new(None),
            service,
            config,
            storage,
        }
    }

    /// Rebuild from persisted state after a fault. Anything that was never
    /// persisted is discarded.
    pub fn restart(&self) {
        tracing::info!("restarting studio from persisted state");
        *relock(&self.store) = Store::restored((self.storage)());
        let mut studio = Studio::new(&self.config);
        studio.sync(relock(&self.store).state());
        *relock(&self.studio) = studio;
        relock(&self.meter).set_active(false);
        relock(&self.history).clear();
        *relock(&self.fault) = None;
    }

    pub fn fault(&self) -> Option<FaultReport> {
        relock(&self.fault).clone()
    }

    pub fn set_fault(&self, report: FaultReport) {
        *relock(&self.fault) = Some(report);
    }
}

/// Lock, recovering from poisoning. A panicking handler leaves its locks
/// poisoned; the fault boundary then owns recovery.
pub fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        mutex.clear_poison();
        poisoned.into_inner()
    })
}
