use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use nsai_model::{ExternalRunnerStats, JobSpec, RunnerName};

use super::{Explanation, RunnerSummary, Selector};
use crate::CoreError;

/// Thread-safe handle to a [`Selector`].
///
/// Every call holds the lock for its whole duration, so each `select`, `update` and
/// `sync_from_external` is atomic with respect to the others.
///
/// A poisoned lock is recovered; counters are only mutated after the last fallible step.
#[derive(Clone, Debug)]
pub struct SharedSelector {
    inner: Arc<Mutex<Selector>>,
}

impl SharedSelector {
    pub fn new(selector: Selector) -> Self {
        Self {
            inner: Arc::new(Mutex::new(selector)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Selector> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn select(&self, job: &JobSpec, job_name: &str) -> (Option<RunnerName>, Explanation) {
        self.lock().select(job, job_name)
    }

    pub fn update(
        &self,
        runner: &str,
        success: bool,
        duration_secs: f64,
        cost_per_minute: f64,
    ) -> Result<(), CoreError> {
        self.lock()
            .update(runner, success, duration_secs, cost_per_minute)
    }

    pub fn sync_from_external(&self, external: &BTreeMap<String, ExternalRunnerStats>) -> usize {
        self.lock().sync_from_external(external)
    }

    pub fn get_stats(&self) -> BTreeMap<RunnerName, RunnerSummary> {
        self.lock().get_stats()
    }

    /// Run `f` with exclusive access, e.g. to register runners and track them in one step.
    pub fn with<R>(&self, f: impl FnOnce(&mut Selector) -> R) -> R {
        f(&mut self.lock())
    }
}

impl From<Selector> for SharedSelector {
    fn from(selector: Selector) -> Self {
        Self::new(selector)
    }
}
