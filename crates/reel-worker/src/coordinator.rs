//! Job coordination: single-flight execution and cooperative
//! cancellation.
//!
//! At most one generation job is active at a time. A start request
//! while a job is running is rejected immediately, never queued. The
//! cancellation token is checked at stage entry points; an external
//! tool invocation already in flight finishes before the next
//! checkpoint observes the signal.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tracing::info;

use reel_models::JobState;

use crate::error::{WorkerError, WorkerResult};

/// Cancellation signal, cloned into every stage of a job.
#[derive(Debug, Clone)]
pub struct CancelToken {
    rx: watch::Receiver<bool>,
}

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Checkpoint: return the cancellation outcome if the signal has
    /// been raised.
    pub fn check(&self) -> WorkerResult<()> {
        if self.is_cancelled() {
            Err(WorkerError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Sender half of a cancellation signal.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        let _ = self.tx.send(true);
    }
}

/// Create a connected cancel handle/token pair.
pub fn cancel_pair() -> (CancelHandle, CancelToken) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle { tx }, CancelToken { rx })
}

struct Inner {
    state: Mutex<JobState>,
    cancel: Mutex<Option<CancelHandle>>,
}

/// Owner of the process-wide job slot.
#[derive(Clone)]
pub struct JobCoordinator {
    inner: Arc<Inner>,
}

impl Default for JobCoordinator {
    fn default() -> Self {
        Self::new()
    }
}

impl JobCoordinator {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(JobState::Idle),
                cancel: Mutex::new(None),
            }),
        }
    }

    /// Current job state.
    pub fn state(&self) -> JobState {
        *self.inner.state.lock().expect("job state poisoned")
    }

    /// Claim the job slot. Fails with `Busy` unless the slot is idle.
    ///
    /// The returned guard releases the slot when dropped, so success
    /// and failure paths both return to `Idle` without bookkeeping at
    /// every exit point.
    pub fn try_start(&self) -> WorkerResult<JobGuard> {
        let mut state = self.inner.state.lock().expect("job state poisoned");
        if *state != JobState::Idle {
            return Err(WorkerError::Busy);
        }
        *state = JobState::Running;
        drop(state);

        let (handle, token) = cancel_pair();
        *self.inner.cancel.lock().expect("cancel slot poisoned") = Some(handle);

        info!("Job slot claimed");
        Ok(JobGuard {
            inner: Arc::clone(&self.inner),
            token,
        })
    }

    /// Request cancellation of the running job, if any. Returns
    /// whether a running job was signalled.
    pub fn request_cancel(&self) -> bool {
        let mut state = self.inner.state.lock().expect("job state poisoned");
        if *state != JobState::Running {
            return false;
        }
        *state = JobState::Cancelling;
        drop(state);

        if let Some(handle) = self.inner.cancel.lock().expect("cancel slot poisoned").as_ref() {
            info!("Cancellation requested");
            handle.cancel();
            true
        } else {
            false
        }
    }
}

/// Exclusive claim on the job slot for one generation job.
pub struct JobGuard {
    inner: Arc<Inner>,
    token: CancelToken,
}

impl JobGuard {
    pub fn token(&self) -> CancelToken {
        self.token.clone()
    }
}

impl Drop for JobGuard {
    fn drop(&mut self) {
        *self.inner.state.lock().expect("job state poisoned") = JobState::Idle;
        *self.inner.cancel.lock().expect("cancel slot poisoned") = None;
        info!("Job slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_flight_rejects_second_start() {
        let coordinator = JobCoordinator::new();

        let guard = coordinator.try_start().unwrap();
        assert_eq!(coordinator.state(), JobState::Running);

        // Second start is rejected immediately, not queued.
        assert!(matches!(coordinator.try_start(), Err(WorkerError::Busy)));

        drop(guard);
        assert_eq!(coordinator.state(), JobState::Idle);
        assert!(coordinator.try_start().is_ok());
    }

    #[test]
    fn test_cancel_signals_running_job() {
        let coordinator = JobCoordinator::new();
        let guard = coordinator.try_start().unwrap();
        let token = guard.token();

        assert!(!token.is_cancelled());
        assert!(token.check().is_ok());

        assert!(coordinator.request_cancel());
        assert_eq!(coordinator.state(), JobState::Cancelling);
        assert!(token.is_cancelled());
        assert!(matches!(token.check(), Err(WorkerError::Cancelled)));

        drop(guard);
        assert_eq!(coordinator.state(), JobState::Idle);
    }

    #[test]
    fn test_cancel_without_running_job_is_a_noop() {
        let coordinator = JobCoordinator::new();
        assert!(!coordinator.request_cancel());
        assert_eq!(coordinator.state(), JobState::Idle);
    }
}
