//! In-memory collaborators recording every call the manager makes.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use crossbeam_channel::Receiver;
use pvrmanager::{
    Channel, ChannelGroup, ChannelId, ComponentFactory, EpgContainer, GroupId, GroupsContainer,
    GuiInfo, ManagerOptions, PlaybackHost, PlayingItem, PresentationHost, ProviderManager,
    PvrComponents, PvrError, PvrManager, Recording, RecordingsStore, SettingsStore, Timer,
    TimersStore, VideoSettings, ViewModeGeometry,
};

pub type Journal = Arc<Mutex<Vec<String>>>;

fn log(journal: &Journal, entry: impl Into<String>) {
    journal.lock().unwrap().push(entry.into());
}

pub fn tv_channel(number: u32, name: &str) -> Channel {
    Channel {
        id: ChannelId(number),
        number,
        name: name.to_string(),
        is_radio: false,
        client_id: 1,
        is_recording: false,
        path: format!("pvr://channels/tv/{}", number),
    }
}

pub fn radio_channel(number: u32, name: &str) -> Channel {
    Channel {
        id: ChannelId(100 + number),
        number,
        name: name.to_string(),
        is_radio: true,
        client_id: 1,
        is_recording: false,
        path: format!("pvr://channels/radio/{}", number),
    }
}

pub fn recording(title: &str) -> Recording {
    Recording {
        id: title.to_lowercase(),
        title: title.to_string(),
        file: format!("pvr://recordings/{}", title.to_lowercase()),
        client_id: 1,
    }
}

/// Fast timings so the worker reacts within a few milliseconds.
pub fn test_options() -> ManagerOptions {
    ManagerOptions {
        wake_timeout: Duration::from_millis(20),
        provider_retry: Duration::from_millis(10),
        channel_entry_timeout: Duration::ZERO,
        ..ManagerOptions::default()
    }
}

pub fn wait_until(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    condition()
}

/// States broadcast on `events` until `last` is seen (or a timeout).
pub fn collect_states_until(
    events: &Receiver<pvrmanager::PvrEvent>,
    last: pvrmanager::ManagerState,
    occurrence: usize,
) -> Vec<pvrmanager::ManagerState> {
    let mut states = Vec::new();
    let mut seen = 0;
    while let Ok(event) = events.recv_timeout(Duration::from_secs(5)) {
        if let pvrmanager::PvrEvent::StateChanged { state } = event {
            states.push(state);
            if state == last {
                seen += 1;
                if seen == occurrence {
                    break;
                }
            }
        }
    }
    states
}

// =============================================================================
// Providers
// =============================================================================

#[derive(Default)]
pub struct FakeProviders {
    pub active: AtomicBool,
    pub activatable: AtomicBool,
    pub reject_switch: AtomicBool,
    pub reading_live: AtomicBool,
    pub timer_support: AtomicBool,
    pub scanning: AtomicBool,
    pub playing: Mutex<Option<Channel>>,
    pub playing_recording: AtomicBool,
    pub switches: Mutex<Vec<ChannelId>>,
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub unloads: AtomicUsize,
    pub closed_streams: AtomicUsize,
    pub scans: AtomicUsize,
    pub activation_attempts: Arc<AtomicUsize>,
}

impl FakeProviders {
    pub fn set_playing(&self, channel: Option<Channel>) {
        *self.playing.lock().unwrap() = channel;
    }

    /// Every provider goes away and cannot come back.
    pub fn lose_all(&self) {
        self.activatable.store(false, Ordering::SeqCst);
        self.active.store(false, Ordering::SeqCst);
    }
}

impl ProviderManager for FakeProviders {
    fn try_activate(&self, _max: usize) -> usize {
        self.activation_attempts.fetch_add(1, Ordering::SeqCst);
        if self.active.load(Ordering::SeqCst) || !self.activatable.load(Ordering::SeqCst) {
            return 0;
        }
        self.active.store(true, Ordering::SeqCst);
        1
    }

    fn has_active_provider(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn all_activated(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    fn switch_channel(&self, channel: &Channel) -> Result<(), PvrError> {
        if self.reject_switch.load(Ordering::SeqCst) {
            return Err(PvrError::provider("switch rejected"));
        }
        self.switches.lock().unwrap().push(channel.id);
        self.set_playing(Some(channel.clone()));
        Ok(())
    }

    fn playing_channel(&self) -> Option<Channel> {
        self.playing.lock().unwrap().clone()
    }

    fn is_playing(&self) -> bool {
        self.playing.lock().unwrap().is_some() || self.is_playing_recording()
    }

    fn is_playing_tv(&self) -> bool {
        self.playing
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|channel| !channel.is_radio)
    }

    fn is_playing_radio(&self) -> bool {
        self.playing
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|channel| channel.is_radio)
    }

    fn is_playing_recording(&self) -> bool {
        self.playing_recording.load(Ordering::SeqCst)
    }

    fn is_reading_live_stream(&self) -> bool {
        self.reading_live.load(Ordering::SeqCst)
    }

    fn open_live_stream(&self, channel: &Channel) -> Result<(), PvrError> {
        if channel.client_id < 0 {
            return Err(PvrError::provider("no client for channel"));
        }
        self.set_playing(Some(channel.clone()));
        self.reading_live.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn open_recorded_stream(&self, _recording: &Recording) -> Result<(), PvrError> {
        self.set_playing(None);
        self.playing_recording.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close_stream(&self) {
        self.closed_streams.fetch_add(1, Ordering::SeqCst);
        self.set_playing(None);
        self.reading_live.store(false, Ordering::SeqCst);
        self.playing_recording.store(false, Ordering::SeqCst);
    }

    fn start_channel_scan(&self) {
        self.scans.fetch_add(1, Ordering::SeqCst);
    }

    fn is_running_channel_scan(&self) -> bool {
        self.scanning.load(Ordering::SeqCst)
    }

    fn has_timer_support(&self, client_id: i32) -> bool {
        client_id >= 0 && self.timer_support.load(Ordering::SeqCst)
    }

    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Groups
// =============================================================================

pub struct FakeGroup {
    pub id: GroupId,
    pub channels: Vec<Channel>,
    pub selected: AtomicUsize,
    pub icons_cached: AtomicUsize,
    pub name_checks: AtomicUsize,
}

impl FakeGroup {
    pub fn new(is_radio: bool, name: &str, channels: Vec<Channel>) -> Arc<Self> {
        Arc::new(Self {
            id: GroupId::new(is_radio, name),
            channels,
            selected: AtomicUsize::new(0),
            icons_cached: AtomicUsize::new(0),
            name_checks: AtomicUsize::new(0),
        })
    }

    fn neighbour(&self, channel: &Channel, step: isize) -> Option<Channel> {
        let position = self.channels.iter().position(|c| c.id == channel.id)?;
        let len = self.channels.len() as isize;
        let next = (position as isize + step).rem_euclid(len) as usize;
        self.channels.get(next).cloned()
    }
}

impl ChannelGroup for FakeGroup {
    fn id(&self) -> GroupId {
        self.id.clone()
    }

    fn channel_by_number(&self, number: u32) -> Option<Channel> {
        self.channels.iter().find(|c| c.number == number).cloned()
    }

    fn channel_up(&self, channel: &Channel) -> Option<Channel> {
        self.neighbour(channel, 1)
    }

    fn channel_down(&self, channel: &Channel) -> Option<Channel> {
        self.neighbour(channel, -1)
    }

    fn set_selected_group(&self) {
        self.selected.fetch_add(1, Ordering::SeqCst);
    }

    fn cache_icons(&self) {
        self.icons_cached.fetch_add(1, Ordering::SeqCst);
    }

    fn check_group_name(&self) {
        self.name_checks.fetch_add(1, Ordering::SeqCst);
    }
}

pub struct FakeGroups {
    pub journal: Journal,
    pub tv: Arc<FakeGroup>,
    pub radio: Arc<FakeGroup>,
    pub loads: AtomicUsize,
    pub unloads: AtomicUsize,
    pub icon_searches: AtomicUsize,
    pub last_played: Mutex<Option<Channel>>,
    pub last_watched: Mutex<Vec<(ChannelId, DateTime<Utc>)>>,
}

impl GroupsContainer for FakeGroups {
    fn load(&self) -> Result<(), PvrError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn all_tv_group(&self) -> Option<Arc<dyn ChannelGroup>> {
        Some(self.tv.clone())
    }

    fn all_radio_group(&self) -> Option<Arc<dyn ChannelGroup>> {
        Some(self.radio.clone())
    }

    fn last_played_channel(&self) -> Option<Channel> {
        self.last_played.lock().unwrap().clone()
    }

    fn update(&self, channels_only: bool) -> Result<(), PvrError> {
        log(
            &self.journal,
            if channels_only { "channels" } else { "groups" },
        );
        Ok(())
    }

    fn search_missing_channel_icons(&self) {
        self.icon_searches.fetch_add(1, Ordering::SeqCst);
    }

    fn set_last_watched(&self, channel: &Channel, at: DateTime<Utc>) {
        self.last_watched.lock().unwrap().push((channel.id, at));
    }
}

// =============================================================================
// Timers, recordings, EPG, GUI info
// =============================================================================

pub struct FakeTimers {
    pub journal: Journal,
    pub loads: AtomicUsize,
    pub unloads: AtomicUsize,
    pub fail_update: AtomicBool,
    pub refuse_instant: AtomicBool,
    pub instant: Mutex<Vec<ChannelId>>,
    pub deleted: Mutex<Vec<(ChannelId, bool, bool)>>,
}

impl TimersStore for FakeTimers {
    fn load(&self) -> Result<(), PvrError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn update(&self) -> Result<(), PvrError> {
        log(&self.journal, "timers");
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(PvrError::store("backend unreachable"));
        }
        Ok(())
    }

    fn create_instant_timer(&self, channel: &Channel) -> Result<Timer, PvrError> {
        if self.refuse_instant.load(Ordering::SeqCst) {
            return Err(PvrError::store("timer refused"));
        }
        let mut instant = self.instant.lock().unwrap();
        instant.push(channel.id);
        Ok(Timer {
            id: instant.len() as u32,
            channel: channel.id,
            title: channel.name.clone(),
        })
    }

    fn delete_timers_on_channel(
        &self,
        channel: &Channel,
        active_only: bool,
        delete_repeating: bool,
    ) -> Result<(), PvrError> {
        self.deleted
            .lock()
            .unwrap()
            .push((channel.id, active_only, delete_repeating));
        Ok(())
    }
}

pub struct FakeRecordings {
    pub journal: Journal,
    pub loads: AtomicUsize,
    pub unloads: AtomicUsize,
    /// While set, `update` blocks until the sender side is dropped.
    pub gate: Mutex<Option<Receiver<()>>>,
}

impl RecordingsStore for FakeRecordings {
    fn load(&self) -> Result<(), PvrError> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn update(&self) -> Result<(), PvrError> {
        log(&self.journal, "recordings");
        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            let _ = gate.recv_timeout(Duration::from_secs(5));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeEpg {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub unloads: AtomicUsize,
    pub resets: AtomicUsize,
    pub clears: Mutex<Vec<bool>>,
}

impl EpgContainer for FakeEpg {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn unload(&self) {
        self.unloads.fetch_add(1, Ordering::SeqCst);
    }

    fn clear(&self, delete_db: bool) {
        self.clears.lock().unwrap().push(delete_db);
    }

    fn reset(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
pub struct FakeGuiInfo {
    pub starts: AtomicUsize,
    pub stops: AtomicUsize,
    pub has_timers: AtomicBool,
    pub recording: AtomicBool,
}

impl GuiInfo for FakeGuiInfo {
    fn start(&self) {
        self.starts.fetch_add(1, Ordering::SeqCst);
    }

    fn stop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn duration(&self) -> Duration {
        Duration::from_secs(3600)
    }

    fn start_time(&self) -> Duration {
        Duration::from_secs(60)
    }

    fn has_timers(&self) -> bool {
        self.has_timers.load(Ordering::SeqCst)
    }

    fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }
}

// =============================================================================
// Settings store
// =============================================================================

#[derive(Default)]
pub struct FakeSettingsStore {
    pub unavailable: AtomicBool,
    pub opens: AtomicUsize,
    pub closes: AtomicUsize,
    pub stored: Mutex<HashMap<ChannelId, VideoSettings>>,
    pub persisted: Mutex<Vec<ChannelId>>,
    pub deleted: Mutex<Vec<Option<ChannelId>>>,
    pub wiped: Mutex<Vec<&'static str>>,
    /// Provider activation attempts, sampled when the wipe starts and ends.
    pub activation_attempts: Arc<AtomicUsize>,
    pub attempts_during_wipe: Mutex<Vec<usize>>,
    /// Time spent deleting channels.
    pub wipe_delay: Mutex<Duration>,
}

impl SettingsStore for FakeSettingsStore {
    fn open(&self) -> Result<(), PvrError> {
        self.opens.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(PvrError::store("database locked"));
        }
        Ok(())
    }

    fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }

    fn channel_settings(&self, channel: &Channel) -> Option<VideoSettings> {
        self.stored.lock().unwrap().get(&channel.id).cloned()
    }

    fn persist_channel_settings(
        &self,
        channel: &Channel,
        settings: &VideoSettings,
    ) -> Result<(), PvrError> {
        self.persisted.lock().unwrap().push(channel.id);
        self.stored
            .lock()
            .unwrap()
            .insert(channel.id, settings.clone());
        Ok(())
    }

    fn delete_channel_settings(&self, channel: Option<&Channel>) -> Result<(), PvrError> {
        self.deleted.lock().unwrap().push(channel.map(|c| c.id));
        if channel.is_none() {
            self.wiped.lock().unwrap().push("channel_settings");
        }
        Ok(())
    }

    fn delete_channels(&self) -> Result<(), PvrError> {
        let delay = *self.wipe_delay.lock().unwrap();
        thread::sleep(delay);
        self.wiped.lock().unwrap().push("channels");
        Ok(())
    }

    fn delete_channel_groups(&self) -> Result<(), PvrError> {
        self.attempts_during_wipe
            .lock()
            .unwrap()
            .push(self.activation_attempts.load(Ordering::SeqCst));
        self.wiped.lock().unwrap().push("channel_groups");
        Ok(())
    }

    fn delete_clients(&self) -> Result<(), PvrError> {
        self.attempts_during_wipe
            .lock()
            .unwrap()
            .push(self.activation_attempts.load(Ordering::SeqCst));
        self.wiped.lock().unwrap().push("clients");
        Ok(())
    }
}

// =============================================================================
// Hosts
// =============================================================================

pub struct FakePlayback {
    pub defaults: VideoSettings,
    pub current: Mutex<VideoSettings>,
    pub audio_stream: Mutex<i32>,
    pub played: Mutex<Vec<(PlayingItem, bool)>>,
    pub stops: AtomicUsize,
    pub current_item: Mutex<Option<PlayingItem>>,
    pub calls: Mutex<Vec<String>>,
}

impl Default for FakePlayback {
    fn default() -> Self {
        Self {
            defaults: VideoSettings::default(),
            current: Mutex::new(VideoSettings::default()),
            audio_stream: Mutex::new(-1),
            played: Mutex::new(Vec::new()),
            stops: AtomicUsize::new(0),
            current_item: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl FakePlayback {
    fn call(&self, entry: String) {
        self.calls.lock().unwrap().push(entry);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl PlaybackHost for FakePlayback {
    fn stop_playing(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }

    fn play_file(&self, item: &PlayingItem, windowed: bool) -> bool {
        self.played.lock().unwrap().push((item.clone(), windowed));
        true
    }

    fn has_player(&self) -> bool {
        true
    }

    fn default_video_settings(&self) -> VideoSettings {
        self.defaults.clone()
    }

    fn current_video_settings(&self) -> VideoSettings {
        self.current.lock().unwrap().clone()
    }

    fn set_current_video_settings(&self, settings: VideoSettings) {
        *self.current.lock().unwrap() = settings;
    }

    fn set_view_mode(&self, view_mode: i32) -> ViewModeGeometry {
        self.call(format!("view_mode={}", view_mode));
        ViewModeGeometry {
            zoom_amount: 1.5,
            pixel_ratio: 1.2,
        }
    }

    fn audio_stream(&self) -> i32 {
        *self.audio_stream.lock().unwrap()
    }

    fn set_audio_stream(&self, stream: i32) {
        self.call(format!("audio_stream={}", stream));
        *self.audio_stream.lock().unwrap() = stream;
    }

    fn set_subtitle_stream(&self, stream: i32) {
        self.call(format!("subtitle_stream={}", stream));
    }

    fn set_av_delay(&self, delay: f32) {
        self.call(format!("av_delay={}", delay));
    }

    fn set_dynamic_range_compression(&self, amount: i64) {
        self.call(format!("drc={}", amount));
    }

    fn set_subtitle_visible(&self, visible: bool) {
        self.call(format!("subtitle_visible={}", visible));
    }

    fn set_subtitle_delay(&self, delay: f32) {
        self.call(format!("subtitle_delay={}", delay));
    }

    fn set_current_item(&self, item: &PlayingItem) {
        *self.current_item.lock().unwrap() = Some(item.clone());
    }
}

#[derive(Default)]
pub struct FakePresentation {
    pub busy_shown: AtomicUsize,
    pub busy_hidden: AtomicUsize,
    pub errors: Mutex<Vec<String>>,
    pub progress: Mutex<Vec<u8>>,
    pub progress_closed: AtomicUsize,
}

impl PresentationHost for FakePresentation {
    fn show_busy(&self) {
        self.busy_shown.fetch_add(1, Ordering::SeqCst);
    }

    fn hide_busy(&self) {
        self.busy_hidden.fetch_add(1, Ordering::SeqCst);
    }

    fn notify_error(&self, title: &str, message: &str) {
        self.errors
            .lock()
            .unwrap()
            .push(format!("{}: {}", title, message));
    }

    fn show_progress(&self, percent: u8, _label: &str) {
        self.progress.lock().unwrap().push(percent);
    }

    fn close_progress(&self) {
        self.progress_closed.fetch_add(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Harness
// =============================================================================

/// One set of fakes, shared by every component aggregate the manager builds.
pub struct Fakes {
    pub journal: Journal,
    pub providers: Arc<FakeProviders>,
    pub groups: Arc<FakeGroups>,
    pub timers: Arc<FakeTimers>,
    pub recordings: Arc<FakeRecordings>,
    pub epg: Arc<FakeEpg>,
    pub gui_info: Arc<FakeGuiInfo>,
    pub settings: Arc<FakeSettingsStore>,
    pub playback: Arc<FakePlayback>,
    pub presentation: Arc<FakePresentation>,
    pub builds: Arc<AtomicUsize>,
}

impl Fakes {
    pub fn new() -> Self {
        let journal: Journal = Arc::new(Mutex::new(Vec::new()));

        let tv = FakeGroup::new(
            false,
            "All channels",
            vec![
                tv_channel(1, "One"),
                tv_channel(2, "Two"),
                tv_channel(3, "Three"),
            ],
        );
        let radio = FakeGroup::new(
            true,
            "All channels",
            vec![radio_channel(1, "Radio One"), radio_channel(2, "Radio Two")],
        );

        let providers = FakeProviders::default();
        providers.activatable.store(true, Ordering::SeqCst);
        providers.timer_support.store(true, Ordering::SeqCst);
        let activation_attempts = Arc::clone(&providers.activation_attempts);

        Self {
            providers: Arc::new(providers),
            groups: Arc::new(FakeGroups {
                journal: Arc::clone(&journal),
                tv,
                radio,
                loads: AtomicUsize::new(0),
                unloads: AtomicUsize::new(0),
                icon_searches: AtomicUsize::new(0),
                last_played: Mutex::new(None),
                last_watched: Mutex::new(Vec::new()),
            }),
            timers: Arc::new(FakeTimers {
                journal: Arc::clone(&journal),
                loads: AtomicUsize::new(0),
                unloads: AtomicUsize::new(0),
                fail_update: AtomicBool::new(false),
                refuse_instant: AtomicBool::new(false),
                instant: Mutex::new(Vec::new()),
                deleted: Mutex::new(Vec::new()),
            }),
            recordings: Arc::new(FakeRecordings {
                journal: Arc::clone(&journal),
                loads: AtomicUsize::new(0),
                unloads: AtomicUsize::new(0),
                gate: Mutex::new(None),
            }),
            epg: Arc::new(FakeEpg::default()),
            gui_info: Arc::new(FakeGuiInfo::default()),
            settings: Arc::new(FakeSettingsStore {
                activation_attempts,
                ..FakeSettingsStore::default()
            }),
            playback: Arc::new(FakePlayback::default()),
            presentation: Arc::new(FakePresentation::default()),
            builds: Arc::new(AtomicUsize::new(0)),
            journal,
        }
    }

    pub fn factory(&self) -> Arc<dyn ComponentFactory> {
        let providers = Arc::clone(&self.providers);
        let groups = Arc::clone(&self.groups);
        let timers = Arc::clone(&self.timers);
        let recordings = Arc::clone(&self.recordings);
        let epg = Arc::clone(&self.epg);
        let gui_info = Arc::clone(&self.gui_info);
        let settings = Arc::clone(&self.settings);
        let builds = Arc::clone(&self.builds);

        Arc::new(move || {
            builds.fetch_add(1, Ordering::SeqCst);
            PvrComponents {
                providers: providers.clone(),
                groups: groups.clone(),
                timers: timers.clone(),
                recordings: recordings.clone(),
                epg: epg.clone(),
                gui_info: gui_info.clone(),
                settings: settings.clone(),
            }
        })
    }

    pub fn manager(&self, options: ManagerOptions) -> PvrManager {
        PvrManager::new(self.factory(), self.playback.clone(), options)
            .with_presentation(self.presentation.clone())
    }

    /// A started manager, already loaded.
    pub fn loaded_manager(&self, options: ManagerOptions) -> PvrManager {
        let manager = self.manager(options);
        manager.start().expect("worker spawn");
        assert!(
            wait_until(Duration::from_secs(5), || manager.state()
                == pvrmanager::ManagerState::Loaded),
            "manager did not load"
        );
        manager
    }

    pub fn journal(&self) -> Vec<String> {
        self.journal.lock().unwrap().clone()
    }
}
