use crate::{ApiError, GenerateRequest, JobRecord, MusicService, REQUEST_DURATION_SECS};
use std::time::Duration;

/// [`MusicService`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpMusicService {
    agent: ureq::Agent,
    base: String,
}

impl HttpMusicService {
    pub fn new(base: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(30))
            .build();
        Self {
            agent,
            base: base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/music/{}", self.base, path)
    }

    fn fetch_history(&self) -> Result<Vec<JobRecord>, ApiError> {
        let response = self.agent.get(&self.url("history")).call()?;
        Ok(response.into_json()?)
    }
}

impl MusicService for HttpMusicService {
    fn generate(&self, prompt: &str) -> Result<JobRecord, ApiError> {
        let body = GenerateRequest {
            prompt,
            duration: REQUEST_DURATION_SECS,
        };
        let response = self
            .agent
            .post(&self.url("generate"))
            .send_json(&body)
            .inspect_err(|e| tracing::error!("generation request failed: {e}"))?;
        let job: JobRecord = response.into_json()?;
        tracing::info!(id = job.id, "generation job submitted");
        Ok(job)
    }

    fn history(&self) -> Vec<JobRecord> {
        self.fetch_history().unwrap_or_else(|e| {
            tracing::warn!("history unavailable: {e}");
            Vec::new()
        })
    }

    fn status(&self, id: i64) -> Result<JobRecord, ApiError> {
        let response = self.agent.get(&self.url(&format!("status/{id}"))).call()?;
        Ok(response.into_json()?)
    }
}
