use crate::{ApiError, JobRecord};
use onbeat_model::LibraryTrack;

pub const GENERATION_FAILED: &str = "Failed to generate track. Is backend running?";

pub const GENRES: [&str; 7] = [
    "Lofi Hip Hop",
    "Trap",
    "Cinematic",
    "Synthwave",
    "R&B",
    "Drill",
    "Ambient",
];

pub const MIN_DURATION_SECS: u32 = 10;
pub const MAX_DURATION_SECS: u32 = 60;
const DURATION_STEP: u32 = 5;

/// Prompt sent to the backend: the genre, if one is picked, in front of the
/// user's text.
pub fn full_prompt(genre: Option<&str>, prompt: &str) -> String {
    match genre.filter(|g| !g.is_empty()) {
        Some(genre) => format!("{genre}, {prompt}"),
        None => prompt.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum GenerationState {
    Idle,
    Loading,
    Ready(JobRecord),
    Failed(String),
}

/// One prompt-to-track attempt on the generator page.
#[derive(Debug, Clone, PartialEq)]
pub struct Generation {
    state: GenerationState,
    duration_secs: u32,
}

impl Generation {
    pub fn new() -> Self {
        Self {
            state: GenerationState::Idle,
            duration_secs: 30,
        }
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == GenerationState::Loading
    }

    pub fn duration_secs(&self) -> u32 {
        self.duration_secs
    }

    /// The length slider: 10..=60 in steps of 5.
    pub fn set_duration_secs(&mut self, secs: u32) {
        let clamped = secs.clamp(MIN_DURATION_SECS, MAX_DURATION_SECS);
        self.duration_secs = clamped - (clamped - MIN_DURATION_SECS) % DURATION_STEP;
    }

    /// Begin a request. Returns false, leaving everything untouched, for an
    /// empty prompt. Otherwise clears any previous result or error.
    pub fn start(&mut self, prompt: &str) -> bool {
        if prompt.is_empty() {
            return false;
        }
        self.state = GenerationState::Loading;
        true
    }

    pub fn finish(&mut self, result: Result<JobRecord, ApiError>) {
        self.state = match result {
            Ok(job) => GenerationState::Ready(job),
            Err(e) => {
                tracing::warn!("generation failed: {e}");
                GenerationState::Failed(GENERATION_FAILED.to_string())
            }
        };
    }

    /// The finished job as a playable track, once one is ready.
    pub fn active_track(&self) -> Option<LibraryTrack> {
        match &self.state {
            GenerationState::Ready(job) => Some(LibraryTrack::new(
                format!("AI Gen #{}", job.id),
                format!("{}s", self.duration_secs),
            )),
            _ => None,
        }
    }
}

impl Default for Generation {
    fn default() -> Self {
        Self::new()
    }
}
