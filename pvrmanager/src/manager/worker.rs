//! The manager worker thread.
//!
//! Loads the PVR data once a provider is up, then loops: activate the
//! remaining providers, run the queued jobs, commit the displayed channel to
//! the previous-channel history and sleep until woken or the wake timeout
//! elapses. Only this thread executes jobs.

use std::sync::atomic::Ordering;
use std::thread;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use super::PvrManager;
use crate::capabilities::PvrComponents;
use crate::config_ext::StartLastChannel;
use crate::errors::PvrError;
use crate::jobs::JobKind;
use crate::model::{ManagerState, PvrEvent};

impl PvrManager {
    /// Spawns the worker thread. No-op if one is already running.
    pub(super) fn spawn_worker(&self) -> Result<(), PvrError> {
        let mut handle_guard = self
            .worker_handle
            .lock()
            .expect("Worker handle mutex poisoned");
        if handle_guard.is_some() {
            return Ok(());
        }

        self.worker_stop_flag.store(false, Ordering::SeqCst);

        let manager = self.clone();
        let handle = thread::Builder::new()
            .name("pvr-manager".to_string())
            .spawn(move || manager.worker_loop())?;

        *handle_guard = Some(handle);
        Ok(())
    }

    /// Asks the worker to stop and waits for it, unless called from the
    /// worker itself.
    pub(super) fn stop_worker(&self) {
        self.worker_stop_flag.store(true, Ordering::SeqCst);
        self.jobs.wake();

        let handle = self
            .worker_handle
            .lock()
            .expect("Worker handle mutex poisoned")
            .take();

        if let Some(handle) = handle {
            if handle.thread().id() == thread::current().id() {
                // The worker exits on its own once this call returns
                debug!("Worker stop requested from the worker thread");
                return;
            }
            debug!("Stopping PVR manager worker");
            let _ = handle.join();
        }
    }

    fn stop_requested(&self) -> bool {
        self.worker_stop_flag.load(Ordering::SeqCst)
    }

    fn worker_loop(&self) {
        if !self.load() {
            error!("Failed to load PVR data");
            if self.state() == ManagerState::Starting {
                self.set_state(ManagerState::Stopped);
            }
            return;
        }

        let components = self.components();
        let options = self.options();

        components.providers.start();
        components.gui_info.start();
        components.epg.start();

        if !self.stop_requested() && options.start_last != StartLastChannel::Off {
            self.continue_last_channel();
        }

        for group in [
            components.groups.all_radio_group(),
            components.groups.all_tv_group(),
        ]
        .into_iter()
        .flatten()
        {
            group.cache_icons();
        }

        debug!("PVR manager entering main loop");

        while !self.stop_requested() {
            if !components.providers.all_activated() {
                components.providers.try_activate(1);
            }

            if !components.providers.has_active_provider() {
                if self.stop_requested() {
                    break;
                }
                info!("No PVR provider active anymore, restarting the PVR manager");
                self.stop();
                if let Err(err) = self.start() {
                    error!(error = %err, "Failed to restart the PVR manager");
                }
                return;
            }

            self.execute_pending_jobs();
            self.record_playing_channel(&components);

            self.jobs.wait(options.wake_timeout);
        }

        debug!("PVR manager worker exiting");
    }

    /// Waits for a provider, then loads groups, timers and recordings.
    ///
    /// Returns false only if stopped before any provider became active.
    fn load(&self) -> bool {
        if self.is_loaded() {
            return true;
        }

        let components = self.components();
        let retry = self.options().provider_retry;

        while !components.providers.has_active_provider() && !self.stop_requested() {
            if components.providers.try_activate(1) == 0 {
                debug!(?retry, "No PVR provider active yet");
                self.jobs.wait(retry);
            }
        }

        if self.stop_requested() {
            return false;
        }

        debug!("Active PVR provider found, loading data");
        self.show_busy(true);

        if !self.stop_requested() {
            if let Err(err) = components.groups.load() {
                warn!(error = %err, "Failed to load channel groups");
            }
        }

        if !self.stop_requested() {
            if let Err(err) = components.timers.load() {
                warn!(error = %err, "Failed to load timers");
            }
        }

        if !self.stop_requested() {
            if let Err(err) = components.recordings.load() {
                warn!(error = %err, "Failed to load recordings");
            }
        }

        self.show_busy(false);
        self.set_state(ManagerState::Loaded);
        info!("PVR manager loaded");
        true
    }

    /// Runs every queued job in order. Returns how many jobs ran.
    pub(crate) fn execute_pending_jobs(&self) -> usize {
        let components = self.components();

        self.jobs.drain(|job| {
            let kind = job.kind();
            debug!(
                job = %kind,
                waited_ms = job.waited().as_millis() as u64,
                "Running PVR job"
            );

            if let Err(err) = self.run_job(kind, &components) {
                warn!(job = %kind, error = %err, "PVR job failed");
                self.emit_event(PvrEvent::JobFailed {
                    kind,
                    reason: err.to_string(),
                });
            }
        })
    }

    fn run_job(&self, kind: JobKind, components: &PvrComponents) -> Result<(), PvrError> {
        let result = match kind {
            JobKind::RecordingsUpdate => components.recordings.update(),
            JobKind::TimersUpdate => components.timers.update(),
            JobKind::ChannelsUpdate => components.groups.update(true),
            JobKind::ChannelGroupsUpdate => components.groups.update(false),
            JobKind::SaveChannelSettings => {
                let _session = self.lock_session();
                self.save_channel_settings(components)
            }
        };
        result.map_err(|err| PvrError::job_failed(kind, err))
    }

    /// Feeds the channel on screen to the previous-channel history.
    fn record_playing_channel(&self, components: &PvrComponents) {
        let Some(channel) = components.providers.playing_channel() else {
            return;
        };
        let Ok(number) = i32::try_from(channel.number) else {
            debug!(
                channel = %channel.name,
                number = channel.number,
                "Channel number out of range for the history"
            );
            return;
        };

        let mut session = self.lock_session();
        if session.previous.record(number, Instant::now()) {
            debug!(channel = %channel.name, number = channel.number, "Channel added to history");
        }
    }
}
