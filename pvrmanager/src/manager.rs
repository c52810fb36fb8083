//! The PVR manager: lifecycle, background jobs and playback state.
//!
//! A [`PvrManager`] is a cheap cloneable handle. Every clone drives the same
//! coordinator, which owns one worker thread (see `worker`) and two locks
//! that are never held together: the session lock (lifecycle state, playing
//! item, playing groups, previous-channel history) and the job queue's own
//! lock.

mod playback;
mod worker;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::Receiver;
use pvrconfig::Config;
use tracing::{debug, error, info, warn};

use crate::capabilities::{ComponentFactory, PlaybackHost, PresentationHost, PvrComponents};
use crate::config_ext::ManagerOptions;
use crate::errors::PvrError;
use crate::events::PvrEventBus;
use crate::group_selector::PlaybackGroupSelector;
use crate::jobs::{JobKind, JobQueue};
use crate::model::{Channel, ManagerState, PlayingItem, PvrEvent};
use crate::previous_channel::PreviousChannelTracker;

/// State guarded by the session lock.
struct Session {
    state: ManagerState,
    /// Cleared once the last watched channel has been resumed.
    first_start: bool,
    current_item: Option<PlayingItem>,
    groups: PlaybackGroupSelector,
    previous: PreviousChannelTracker,
}

impl Session {
    fn new(channel_entry_timeout: Duration) -> Self {
        Self {
            state: ManagerState::Stopped,
            first_start: true,
            current_item: None,
            groups: PlaybackGroupSelector::new(),
            previous: PreviousChannelTracker::new(channel_entry_timeout),
        }
    }
}

#[derive(Clone)]
pub struct PvrManager {
    factory: Arc<dyn ComponentFactory>,
    components: Arc<RwLock<Arc<PvrComponents>>>,
    playback: Arc<dyn PlaybackHost>,
    presentation: Option<Arc<dyn PresentationHost>>,
    options: Arc<RwLock<ManagerOptions>>,
    session: Arc<Mutex<Session>>,
    jobs: Arc<JobQueue>,
    event_bus: PvrEventBus,
    /// Flag to signal the worker thread to stop.
    worker_stop_flag: Arc<AtomicBool>,
    /// Handle to the worker thread, if running.
    worker_handle: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl std::fmt::Debug for PvrManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PvrManager")
            .field("state", &self.state())
            .field("options", &self.options())
            .field("pending_jobs", &self.jobs.kinds())
            .field("is_running", &self.is_running())
            .finish()
    }
}

impl PvrManager {
    /// Creates a stopped manager. Call [`PvrManager::start`] to load it.
    pub fn new(
        factory: Arc<dyn ComponentFactory>,
        playback: Arc<dyn PlaybackHost>,
        options: ManagerOptions,
    ) -> Self {
        let components = Arc::new(factory.build());
        let session = Session::new(options.channel_entry_timeout);

        Self {
            factory,
            components: Arc::new(RwLock::new(components)),
            playback,
            presentation: None,
            options: Arc::new(RwLock::new(options)),
            session: Arc::new(Mutex::new(session)),
            jobs: Arc::new(JobQueue::new()),
            event_bus: PvrEventBus::new(),
            worker_stop_flag: Arc::new(AtomicBool::new(true)),
            worker_handle: Arc::new(Mutex::new(None)),
        }
    }

    /// Attaches a presentation host for busy indicators, progress and
    /// error notifications.
    pub fn with_presentation(mut self, presentation: Arc<dyn PresentationHost>) -> Self {
        self.presentation = Some(presentation);
        self
    }

    pub fn subscribe(&self) -> Receiver<PvrEvent> {
        self.event_bus.subscribe()
    }

    pub fn options(&self) -> ManagerOptions {
        self.options
            .read()
            .expect("Options lock poisoned")
            .clone()
    }

    /// Components of the current run.
    pub fn components(&self) -> Arc<PvrComponents> {
        Arc::clone(&self.components.read().expect("Components lock poisoned"))
    }

    pub fn state(&self) -> ManagerState {
        self.lock_session().state
    }

    /// True until the worker has been asked to stop.
    pub fn is_running(&self) -> bool {
        !self.worker_stop_flag.load(Ordering::SeqCst)
    }

    fn is_loaded(&self) -> bool {
        self.state() == ManagerState::Loaded
    }

    fn lock_session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().expect("Session mutex poisoned")
    }

    fn emit_event(&self, event: PvrEvent) {
        self.event_bus.broadcast(event);
    }

    fn set_state(&self, state: ManagerState) {
        {
            let mut session = self.lock_session();
            if session.state == state {
                return;
            }
            session.state = state;
        }
        debug!(?state, "PVR manager state changed");
        self.emit_event(PvrEvent::StateChanged { state });
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// (Re)starts the manager.
    ///
    /// Stops a loaded manager and cancels a worker still starting, then, if
    /// the manager is enabled, rebuilds the components and spawns a new
    /// worker. Only fails when the worker thread cannot be spawned.
    pub fn start(&self) -> Result<(), PvrError> {
        self.stop();
        self.cancel_worker();

        let options = self.options();
        if !options.enabled {
            info!("PVR manager is disabled, not starting");
            return Ok(());
        }

        self.reset_properties(&options);
        self.set_state(ManagerState::Starting);
        info!("Starting PVR manager");

        if let Err(err) = self.spawn_worker() {
            error!(error = %err, "Cannot spawn the PVR manager worker");
            self.set_state(ManagerState::Stopped);
            return Err(err);
        }
        Ok(())
    }

    /// Stops a loaded manager and unloads its data. No-op unless loaded.
    pub fn stop(&self) {
        {
            let mut session = self.lock_session();
            if session.state != ManagerState::Loaded {
                return;
            }
            session.state = ManagerState::Stopping;
        }
        self.emit_event(PvrEvent::StateChanged {
            state: ManagerState::Stopping,
        });

        info!("Stopping PVR manager");
        let components = self.components();

        if components.providers.is_playing() {
            info!("Stopping PVR playback");
            self.playback.stop_playing();
        }

        self.stop_update_threads(&components);

        components.recordings.unload();
        components.timers.unload();
        components.epg.unload();
        components.groups.unload();
        components.providers.unload();

        self.jobs.clear();
        self.set_state(ManagerState::Stopped);
    }

    /// Stops the manager for good, including a worker still starting.
    pub fn shutdown(&self) {
        self.stop();
        self.cancel_worker();
        info!("PVR manager shut down");
    }

    /// Re-reads the options from `config` and restarts the manager.
    pub fn reload(&self, config: &Config) -> Result<(), PvrError> {
        let options = ManagerOptions::from_config(config)?;
        info!(?options, "Reloading PVR manager options");
        *self.options.write().expect("Options lock poisoned") = options;
        self.start()
    }

    /// Deletes every cached provider object and channel setting, then
    /// restarts the manager if enabled.
    pub fn reset_database(&self, show_progress: bool) -> Result<(), PvrError> {
        info!("Clearing the PVR database");
        let progress = |percent: u8| {
            if show_progress {
                self.show_progress(percent, "Clearing the PVR database");
            }
        };
        progress(0);

        let components = self.components();
        if components.providers.is_playing() {
            info!("Stopping PVR playback");
            self.playback.stop_playing();
        }
        progress(10);

        let enabled = self.options().enabled;
        if enabled {
            self.stop();
            self.cancel_worker();
        }
        progress(20);

        match components.settings.open() {
            Ok(()) => {
                components.epg.clear(true);
                progress(30);

                if let Err(err) = components.settings.delete_channel_groups() {
                    warn!(error = %err, "Cannot delete channel groups");
                }
                progress(50);

                if let Err(err) = components.settings.delete_channels() {
                    warn!(error = %err, "Cannot delete channels");
                }
                progress(70);

                if let Err(err) = components.settings.delete_channel_settings(None) {
                    warn!(error = %err, "Cannot delete channel settings");
                }
                progress(80);

                if let Err(err) = components.settings.delete_clients() {
                    warn!(error = %err, "Cannot delete clients");
                }
                progress(90);

                components.settings.close();
            }
            Err(err) => error!(error = %err, "Cannot open the PVR database"),
        }
        info!("PVR database cleared");

        let result = if enabled {
            info!("Restarting the PVR manager");
            self.start()
        } else {
            Ok(())
        };

        if show_progress {
            self.show_progress(100, "Clearing the PVR database");
            self.close_progress();
        }
        result
    }

    /// Drops the EPG data and restarts the background updaters.
    pub fn reset_epg(&self) -> Result<(), PvrError> {
        info!("Clearing the EPG database");
        let components = self.components();
        // A worker cancelled while loading leaves the state Stopped
        let previous = self.state();

        self.stop_update_threads(&components);
        components.epg.reset();

        let restart = matches!(previous, ManagerState::Starting | ManagerState::Loaded);
        if restart && self.options().enabled {
            if previous == ManagerState::Starting {
                self.set_state(ManagerState::Starting);
            }
            self.spawn_worker()?;
        }
        Ok(())
    }

    /// Rebuilds the components and forgets every transient state.
    fn reset_properties(&self, options: &ManagerOptions) {
        let components = Arc::new(self.factory.build());
        *self.components.write().expect("Components lock poisoned") = components;

        {
            let mut session = self.lock_session();
            let first_start = session.first_start;
            *session = Session::new(options.channel_entry_timeout);
            session.first_start = first_start;
        }
        self.jobs.clear();
    }

    fn stop_update_threads(&self, components: &PvrComponents) {
        self.stop_worker();
        components.epg.stop();
        components.gui_info.stop();
        components.providers.stop();
    }

    /// Stops the worker and settles the state it leaves behind.
    fn cancel_worker(&self) {
        self.stop_worker();
        match self.state() {
            ManagerState::Loaded => self.stop(),
            ManagerState::Starting => self.set_state(ManagerState::Stopped),
            _ => {}
        }
    }

    // =========================================================================
    // Background jobs
    // =========================================================================

    /// Queues a job of `kind` for the worker. No-op unless loaded or when a
    /// job of that kind is already queued. Returns whether a job was queued.
    ///
    /// The state check and the push take different locks. A `stop` landing
    /// between them either clears the job itself or is seen by the second
    /// check, so no job outlives a stop.
    pub fn trigger(&self, kind: JobKind) -> bool {
        if !self.is_loaded() {
            return false;
        }

        if !self.jobs.push(kind) {
            return false;
        }

        if !self.is_loaded() {
            debug!(job = %kind, "PVR manager stopped while queuing, dropping job");
            self.jobs.clear();
            return false;
        }

        debug!(job = %kind, "PVR job queued");
        true
    }

    pub fn trigger_recordings_update(&self) -> bool {
        self.trigger(JobKind::RecordingsUpdate)
    }

    pub fn trigger_timers_update(&self) -> bool {
        self.trigger(JobKind::TimersUpdate)
    }

    pub fn trigger_channels_update(&self) -> bool {
        self.trigger(JobKind::ChannelsUpdate)
    }

    pub fn trigger_channel_groups_update(&self) -> bool {
        self.trigger(JobKind::ChannelGroupsUpdate)
    }

    pub fn trigger_save_channel_settings(&self) -> bool {
        self.trigger(JobKind::SaveChannelSettings)
    }

    pub fn is_job_pending(&self, kind: JobKind) -> bool {
        self.is_loaded() && self.jobs.is_pending(kind)
    }

    /// Kinds of the queued jobs, oldest first.
    pub fn pending_jobs(&self) -> Vec<JobKind> {
        self.jobs.kinds()
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub fn is_playing(&self) -> bool {
        self.is_loaded() && self.components().providers.is_playing()
    }

    pub fn is_playing_tv(&self) -> bool {
        self.is_loaded() && self.components().providers.is_playing_tv()
    }

    pub fn is_playing_radio(&self) -> bool {
        self.is_loaded() && self.components().providers.is_playing_radio()
    }

    pub fn is_playing_recording(&self) -> bool {
        self.is_loaded() && self.components().providers.is_playing_recording()
    }

    pub fn is_running_channel_scan(&self) -> bool {
        self.is_loaded() && self.components().providers.is_running_channel_scan()
    }

    pub fn has_timers(&self) -> bool {
        self.is_loaded() && self.components().gui_info.has_timers()
    }

    pub fn is_recording(&self) -> bool {
        self.is_loaded() && self.components().gui_info.is_recording()
    }

    /// Length of the playing item, zero unless loaded.
    pub fn total_time(&self) -> Duration {
        if !self.is_loaded() {
            return Duration::ZERO;
        }
        self.components().gui_info.duration()
    }

    pub fn start_time(&self) -> Duration {
        if !self.is_loaded() {
            return Duration::ZERO;
        }
        self.components().gui_info.start_time()
    }

    pub fn current_channel(&self) -> Option<Channel> {
        if !self.is_loaded() {
            return None;
        }
        self.components().providers.playing_channel()
    }

    /// What the manager considers playing.
    pub fn current_item(&self) -> Option<PlayingItem> {
        self.lock_session().current_item.clone()
    }

    pub fn start_channel_scan(&self) {
        if !self.is_loaded() {
            return;
        }
        info!("Starting channel scan");
        self.components().providers.start_channel_scan();
    }

    pub fn search_missing_channel_icons(&self) {
        if !self.is_loaded() {
            return;
        }
        self.components().groups.search_missing_channel_icons();
    }

    /// Lets the "all channels" groups pick up their translated name.
    pub fn localization_changed(&self) {
        if !self.is_loaded() {
            return;
        }
        let components = self.components();
        for group in [
            components.groups.all_radio_group(),
            components.groups.all_tv_group(),
        ]
        .into_iter()
        .flatten()
        {
            group.check_group_name();
        }
    }

    // =========================================================================
    // Presentation
    // =========================================================================

    fn show_busy(&self, busy: bool) {
        match (&self.presentation, busy) {
            (Some(presentation), true) => presentation.show_busy(),
            (Some(presentation), false) => presentation.hide_busy(),
            (None, _) => {}
        }
    }

    fn notify_error(&self, title: &str, message: &str) {
        error!(title, message, "PVR error");
        if let Some(presentation) = &self.presentation {
            presentation.notify_error(title, message);
        }
    }

    fn show_progress(&self, percent: u8, label: &str) {
        debug!(percent, label, "PVR progress");
        if let Some(presentation) = &self.presentation {
            presentation.show_progress(percent, label);
        }
    }

    fn close_progress(&self) {
        if let Some(presentation) = &self.presentation {
            presentation.close_progress();
        }
    }
}
