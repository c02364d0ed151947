// SPDX-FileCopyrightText: 2026 Nodescope contributors
// SPDX-License-Identifier: MIT

//! Hand-off of work from network threads to the single thread that owns the
//! host context.
//!
//! Host objects are not safe to touch from arbitrary threads, so session
//! threads never hold a reference to the context. They submit closures
//! through a [`MainThreadBridge`] and block on the result; the owning thread
//! drains them in submission order through a [`CooperativeExecutor`].

use std::fmt;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, SyncSender};
use std::time::Duration;

type Job<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;

/// A submitted call failed before producing a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// The executor did not run the job within the caller's deadline.
    Timeout,
    /// The executor side has been dropped; no job will ever run again.
    Closed,
}

impl fmt::Display for BridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout => write!(f, "host thread did not answer within the deadline"),
            Self::Closed => write!(f, "host executor is gone"),
        }
    }
}

impl std::error::Error for BridgeError {}

/// Submission half of the bridge. Cheap to clone; one per session thread.
pub struct MainThreadBridge<C> {
    jobs: Sender<Job<C>>,
}

impl<C> Clone for MainThreadBridge<C> {
    fn clone(&self) -> Self {
        Self {
            jobs: self.jobs.clone(),
        }
    }
}

impl<C: 'static> MainThreadBridge<C> {
    /// Queue a job without waiting for it to run.
    pub fn defer(&self, job: impl FnOnce(&mut C) + Send + 'static) -> Result<(), BridgeError> {
        self.jobs
            .send(Box::new(job))
            .map_err(|_| BridgeError::Closed)
    }

    /// Queue a job and block until the executor has run it, up to `timeout`.
    ///
    /// On timeout the job may still run later; its result is discarded.
    pub fn call<R: Send + 'static>(
        &self,
        timeout: Duration,
        job: impl FnOnce(&mut C) -> R + Send + 'static,
    ) -> Result<R, BridgeError> {
        let (result_tx, result_rx): (SyncSender<R>, Receiver<R>) = mpsc::sync_channel(1);
        self.defer(move |context| {
            // The caller may have timed out and dropped the receiver.
            let _ = result_tx.try_send(job(context));
        })?;
        result_rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => BridgeError::Timeout,
            RecvTimeoutError::Disconnected => BridgeError::Closed,
        })
    }
}

/// Consumption half of the bridge, owned by the thread that owns `C`.
pub struct CooperativeExecutor<C> {
    jobs: Receiver<Job<C>>,
}

impl<C> CooperativeExecutor<C> {
    /// Run every job currently queued, in submission order. Never blocks.
    pub fn run_pending(&self, context: &mut C) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.jobs.try_recv() {
            job(context);
            ran += 1;
        }
        ran
    }

    /// Block up to `timeout` for one job and run it.
    ///
    /// `Ok(false)` means the wait timed out with nothing queued; an `Err`
    /// means every submission handle is gone and the loop can end.
    pub fn run_next(&self, context: &mut C, timeout: Duration) -> Result<bool, BridgeError> {
        match self.jobs.recv_timeout(timeout) {
            Ok(job) => {
                job(context);
                Ok(true)
            }
            Err(RecvTimeoutError::Timeout) => Ok(false),
            Err(RecvTimeoutError::Disconnected) => Err(BridgeError::Closed),
        }
    }
}

/// Create a connected bridge/executor pair for a context of type `C`.
pub fn channel<C: 'static>() -> (MainThreadBridge<C>, CooperativeExecutor<C>) {
    let (jobs_tx, jobs_rx) = mpsc::channel();
    (
        MainThreadBridge { jobs: jobs_tx },
        CooperativeExecutor { jobs: jobs_rx },
    )
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    use super::{channel, BridgeError};

    #[test]
    fn deferred_jobs_run_in_submission_order() {
        let (bridge, executor) = channel::<Vec<u32>>();
        for n in 0..5 {
            bridge.defer(move |log| log.push(n)).expect("defer");
        }

        let mut log = Vec::new();
        assert_eq!(executor.run_pending(&mut log), 5);
        assert_eq!(log, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn call_returns_the_job_result() {
        let (bridge, executor) = channel::<u32>();
        let handle = thread::spawn(move || {
            bridge.call(Duration::from_secs(5), |counter| {
                *counter += 1;
                *counter
            })
        });

        let mut counter = 41;
        while executor.run_pending(&mut counter) == 0 {
            thread::yield_now();
        }
        assert_eq!(handle.join().expect("join"), Ok(42));
        assert_eq!(counter, 42);
    }

    #[test]
    fn call_times_out_when_nothing_drains_the_queue() {
        let (bridge, _executor) = channel::<()>();
        let result = bridge.call(Duration::from_millis(20), |()| ());
        assert_eq!(result, Err(BridgeError::Timeout));
    }

    #[test]
    fn call_reports_closed_when_the_executor_is_gone() {
        let (bridge, executor) = channel::<()>();
        drop(executor);
        let result = bridge.call(Duration::from_secs(1), |()| ());
        assert_eq!(result, Err(BridgeError::Closed));
    }

    #[test]
    fn run_next_ends_cleanly_after_the_last_bridge_drops() {
        let (bridge, executor) = channel::<u32>();
        bridge.defer(|counter| *counter += 1).expect("defer");
        drop(bridge);

        let mut counter = 0;
        assert_eq!(executor.run_next(&mut counter, Duration::from_secs(1)), Ok(true));
        assert_eq!(
            executor.run_next(&mut counter, Duration::from_secs(1)),
            Err(BridgeError::Closed)
        );
        assert_eq!(counter, 1);
    }

    #[test]
    fn concurrent_calls_never_overlap_on_the_context() {
        struct Guarded {
            in_flight: Arc<AtomicUsize>,
            peak: Arc<AtomicUsize>,
        }

        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));
        let (bridge, executor) = channel::<Guarded>();

        let callers: Vec<_> = (0..50)
            .map(|_| {
                let bridge = bridge.clone();
                thread::spawn(move || {
                    bridge.call(Duration::from_secs(10), |guarded| {
                        let now = guarded.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        guarded.peak.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_micros(200));
                        guarded.in_flight.fetch_sub(1, Ordering::SeqCst);
                    })
                })
            })
            .collect();
        drop(bridge);

        let mut context = Guarded {
            in_flight: Arc::clone(&in_flight),
            peak: Arc::clone(&peak),
        };
        loop {
            match executor.run_next(&mut context, Duration::from_secs(5)) {
                Ok(_) => {}
                Err(BridgeError::Closed) => break,
                Err(err) => panic!("executor failed: {err}"),
            }
        }

        for caller in callers {
            assert_eq!(caller.join().expect("join"), Ok(()));
        }
        assert_eq!(peak.load(Ordering::SeqCst), 1);
    }
}
