//! Client for the music generation backend.
//!
//! Submitting a job surfaces failures to the caller. Reading history never
//! does: any failure there reads as an empty history.

mod client;
mod generation;

pub use client::HttpMusicService;
pub use generation::{
    GENERATION_FAILED, GENRES, Generation, GenerationState, MAX_DURATION_SECS, MIN_DURATION_SECS,
    full_prompt,
};

use serde::{Deserialize, Serialize};

pub const DEFAULT_API_BASE: &str = "http://127.0.0.1:8000/api/v1";
/// Length the backend is asked to generate, in seconds.
pub const REQUEST_DURATION_SECS: u32 = 30;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("server returned status {0}")]
    Status(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid response body: {0}")]
    Decode(#[from] std::io::Error),
}

impl From<ureq::Error> for ApiError {
    fn from(e: ureq::Error) -> Self {
        match e {
            ureq::Error::Status(code, _) => ApiError::Status(code),
            ureq::Error::Transport(t) => ApiError::Transport(t.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

/// A generation job as the backend reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    pub prompt: String,
    pub status: JobStatus,
    #[serde(default)]
    pub progress: Option<u8>,
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub file_url: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest<'a> {
    pub prompt: &'a str,
    pub duration: u32,
}

pub trait MusicService: Send + Sync {
    /// Submit a generation job.
    fn generate(&self, prompt: &str) -> Result<JobRecord, ApiError>;

    /// Recent jobs, newest first. Empty on any failure.
    fn history(&self) -> Vec<JobRecord>;

    /// Current state of one job.
    fn status(&self, id: i64) -> Result<JobRecord, ApiError>;
}
