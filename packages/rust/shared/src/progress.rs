//! Progress callbacks for long-running stages.

/// Progress callback for reporting stage status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each unit of work (a seed, a keyword).
    fn step(&self, label: &str, current: usize, total: usize);
    /// Called when the stage completes.
    fn finish(&self, summary: &str);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn step(&self, _label: &str, _current: usize, _total: usize) {}
    fn finish(&self, _summary: &str) {}
}
