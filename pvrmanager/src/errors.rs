use thiserror::Error;

use crate::jobs::JobKind;

#[derive(Error, Debug)]
pub enum PvrError {
    // Retryable: drives the provider activation loop while starting
    #[error("No active PVR provider")]
    NoActiveProvider,
    #[error("Channel {0} not found in the playing group")]
    ChannelNotFound(u32),
    #[error("No channel group is selected")]
    NoPlayingGroup,
    #[error("Nothing is playing")]
    NotPlaying,
    #[error("PVR manager is not loaded")]
    NotLoaded,
    #[error("Failed to switch to channel '{0}'")]
    SwitchFailed(String),
    #[error("Settings store unavailable: {0}")]
    PersistenceUnavailable(String),
    #[error("Job {kind} failed: {reason}")]
    JobExecutionFailed { kind: JobKind, reason: String },
    #[error("Provider Error: {0}")]
    Provider(String),
    #[error("Store Error: {0}")]
    Store(String),
    #[error("Cannot spawn the PVR manager worker: {0}")]
    WorkerSpawn(#[from] std::io::Error),
    #[error("Configuration Error: {0}")]
    Config(#[from] anyhow::Error),
}

impl PvrError {
    pub fn switch_failed(channel_name: &str) -> Self {
        PvrError::SwitchFailed(channel_name.to_string())
    }

    pub fn provider(message: &str) -> Self {
        PvrError::Provider(message.to_string())
    }

    pub fn store(message: &str) -> Self {
        PvrError::Store(message.to_string())
    }

    pub fn job_failed(kind: JobKind, reason: impl ToString) -> Self {
        PvrError::JobExecutionFailed {
            kind,
            reason: reason.to_string(),
        }
    }

    /// True for errors the manager retries on its own.
    pub fn is_retryable(&self) -> bool {
        matches!(self, PvrError::NoActiveProvider)
    }
}
