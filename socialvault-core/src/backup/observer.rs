use super::step::BackupStep;

/// Receives every step transition as it happens.
pub trait StepObserver {
    fn on_transition(&self, step: &BackupStep);
}

/// Observer that ignores all transitions.
pub struct NoopObserver;

impl StepObserver for NoopObserver {
    fn on_transition(&self, _step: &BackupStep) {}
}
