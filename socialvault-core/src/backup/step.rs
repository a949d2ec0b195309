use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::INTERRUPTED_MESSAGE;
use crate::error::{Result, VaultError};

/// The five stages of a backup, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepId {
    Fetch,
    Process,
    Encrypt,
    Store,
    Record,
}

impl StepId {
    pub const ALL: [StepId; 5] = [
        StepId::Fetch,
        StepId::Process,
        StepId::Encrypt,
        StepId::Store,
        StepId::Record,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            StepId::Fetch => "fetch",
            StepId::Process => "process",
            StepId::Encrypt => "encrypt",
            StepId::Store => "store",
            StepId::Record => "record",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StepId::Fetch => "Fetching data from platform",
            StepId::Process => "Processing and organizing data",
            StepId::Encrypt => "Encrypting data (optional)",
            StepId::Store => "Uploading to content store",
            StepId::Record => "Recording on ledger",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl StepStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            StepStatus::Pending => "pending",
            StepStatus::InProgress => "in_progress",
            StepStatus::Completed => "completed",
            StepStatus::Failed => "failed",
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Completed | StepStatus::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupStep {
    pub id: StepId,
    pub title: String,
    pub status: StepStatus,
    pub message: Option<String>,
}

/// Ordered step list for one run.
///
/// Transitions are checked: a step starts only from `Pending` once every
/// earlier step is `Completed`, and only an `InProgress` step can complete or
/// fail. `Completed` and `Failed` never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepList {
    steps: Vec<BackupStep>,
}

impl Default for StepList {
    fn default() -> Self {
        Self::new()
    }
}

impl StepList {
    pub fn new() -> Self {
        Self {
            steps: StepId::ALL
                .iter()
                .map(|&id| BackupStep {
                    id,
                    title: id.title().to_string(),
                    status: StepStatus::Pending,
                    message: None,
                })
                .collect(),
        }
    }

    pub fn get(&self, id: StepId) -> &BackupStep {
        &self.steps[id.index()]
    }

    pub fn status(&self, id: StepId) -> StepStatus {
        self.get(id).status
    }

    pub fn iter(&self) -> impl Iterator<Item = &BackupStep> {
        self.steps.iter()
    }

    pub fn as_slice(&self) -> &[BackupStep] {
        &self.steps
    }

    /// True while nothing has started yet.
    pub fn is_idle(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Pending)
    }

    pub fn is_succeeded(&self) -> bool {
        self.steps.iter().all(|s| s.status == StepStatus::Completed)
    }

    pub fn has_failed(&self) -> bool {
        self.steps.iter().any(|s| s.status == StepStatus::Failed)
    }

    /// The run is over: every step completed, or one failed.
    pub fn is_finished(&self) -> bool {
        self.has_failed() || self.steps.iter().all(|s| s.status.is_terminal())
    }

    /// Number of leading `Completed` steps.
    pub fn completed_prefix_len(&self) -> usize {
        self.steps
            .iter()
            .take_while(|s| s.status == StepStatus::Completed)
            .count()
    }

    pub fn start(&mut self, id: StepId, message: impl Into<String>) -> Result<&BackupStep> {
        let idx = id.index();
        if self.steps[..idx].iter().any(|s| s.status != StepStatus::Completed) {
            return Err(VaultError::InvalidTransition {
                step: id,
                from: self.steps[idx].status.as_str(),
                to: StepStatus::InProgress.as_str(),
            });
        }
        self.transition(id, StepStatus::Pending, StepStatus::InProgress, Some(message.into()))
    }

    pub fn complete(&mut self, id: StepId, message: impl Into<String>) -> Result<&BackupStep> {
        self.transition(id, StepStatus::InProgress, StepStatus::Completed, Some(message.into()))
    }

    pub fn fail(&mut self, id: StepId, message: impl Into<String>) -> Result<&BackupStep> {
        self.transition(id, StepStatus::InProgress, StepStatus::Failed, Some(message.into()))
    }

    /// Fail every step still `InProgress`; returns the ids that were changed.
    pub fn interrupt(&mut self) -> Vec<StepId> {
        let mut changed = Vec::new();
        for step in self.steps.iter_mut().filter(|s| s.status == StepStatus::InProgress) {
            step.status = StepStatus::Failed;
            step.message = Some(INTERRUPTED_MESSAGE.to_string());
            changed.push(step.id);
        }
        changed
    }

    /// Return every step to `Pending` for an explicit retry.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn transition(
        &mut self,
        id: StepId,
        expected: StepStatus,
        next: StepStatus,
        message: Option<String>,
    ) -> Result<&BackupStep> {
        let step = &mut self.steps[id.index()];
        if step.status != expected {
            return Err(VaultError::InvalidTransition {
                step: id,
                from: step.status.as_str(),
                to: next.as_str(),
            });
        }
        step.status = next;
        step.message = message;
        Ok(&*step)
    }
}
