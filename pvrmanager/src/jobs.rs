//! Deferred, deduplicated background jobs.
//!
//! Any thread may enqueue a job; only the manager worker executes them. At
//! most one job of each [`JobKind`] is queued at any time, so bursts of
//! triggers during a slow refresh collapse into a single follow-up run.
//!
//! The wake signal is a single-slot channel: several triggers before the
//! worker wakes up leave exactly one token behind.

use std::collections::VecDeque;
use std::fmt;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum JobKind {
    RecordingsUpdate,
    TimersUpdate,
    ChannelsUpdate,
    ChannelGroupsUpdate,
    SaveChannelSettings,
}

impl JobKind {
    pub fn name(&self) -> &'static str {
        match self {
            JobKind::RecordingsUpdate => "pvr-update-recordings",
            JobKind::TimersUpdate => "pvr-update-timers",
            JobKind::ChannelsUpdate => "pvr-update-channels",
            JobKind::ChannelGroupsUpdate => "pvr-update-channelgroups",
            JobKind::SaveChannelSettings => "pvr-save-channelsettings",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A queued job. Owned by the queue until popped, then by the executing frame.
#[derive(Debug)]
pub struct PendingJob {
    kind: JobKind,
    queued_at: Instant,
}

impl PendingJob {
    fn new(kind: JobKind) -> Self {
        Self {
            kind,
            queued_at: Instant::now(),
        }
    }

    pub fn kind(&self) -> JobKind {
        self.kind
    }

    /// Time spent in the queue before being popped.
    pub fn waited(&self) -> Duration {
        self.queued_at.elapsed()
    }
}

pub struct JobQueue {
    pending: Mutex<VecDeque<PendingJob>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl JobQueue {
    pub fn new() -> Self {
        let (wake_tx, wake_rx) = bounded(1);
        Self {
            pending: Mutex::new(VecDeque::new()),
            wake_tx,
            wake_rx,
        }
    }

    /// Appends a job of `kind` unless one is already queued, then wakes the
    /// worker. Returns whether a job was enqueued.
    pub fn push(&self, kind: JobKind) -> bool {
        {
            let mut pending = self.pending.lock().expect("Job queue mutex poisoned");
            if pending.iter().any(|job| job.kind == kind) {
                return false;
            }
            pending.push_back(PendingJob::new(kind));
        }
        self.wake();
        true
    }

    pub fn is_pending(&self, kind: JobKind) -> bool {
        self.pending
            .lock()
            .expect("Job queue mutex poisoned")
            .iter()
            .any(|job| job.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.pending.lock().expect("Job queue mutex poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Kinds currently queued, oldest first.
    pub fn kinds(&self) -> Vec<JobKind> {
        self.pending
            .lock()
            .expect("Job queue mutex poisoned")
            .iter()
            .map(|job| job.kind)
            .collect()
    }

    /// Pops and runs jobs front to back until the queue is empty.
    ///
    /// The queue lock is only held while popping, so `run` may take other
    /// locks and new jobs may be pushed while it executes; those are run in
    /// the same pass. The wake signal is cleared once the queue is observed
    /// empty. Returns the number of jobs executed.
    pub fn drain<F>(&self, mut run: F) -> usize
    where
        F: FnMut(PendingJob),
    {
        let mut executed = 0;
        loop {
            let job = {
                let mut pending = self.pending.lock().expect("Job queue mutex poisoned");
                match pending.pop_front() {
                    Some(job) => job,
                    None => {
                        self.clear_wake();
                        break;
                    }
                }
            };
            run(job);
            executed += 1;
        }
        executed
    }

    /// Drops every queued job and the wake token.
    pub fn clear(&self) {
        let mut pending = self.pending.lock().expect("Job queue mutex poisoned");
        pending.clear();
        self.clear_wake();
    }

    pub fn wake(&self) {
        // A full slot already carries the wake-up
        let _ = self.wake_tx.try_send(());
    }

    pub fn is_woken(&self) -> bool {
        !self.wake_rx.is_empty()
    }

    /// Blocks until woken or `timeout` elapses. Consumes the wake token.
    pub fn wait(&self, timeout: Duration) -> bool {
        match self.wake_rx.recv_timeout(timeout) {
            Ok(()) => true,
            Err(RecvTimeoutError::Timeout) => false,
            // Both ends live in self
            Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    fn clear_wake(&self) {
        while self.wake_rx.try_recv().is_ok() {}
    }
}
