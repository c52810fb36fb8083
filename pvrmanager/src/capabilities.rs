//! Collaborators the PVR manager drives but does not implement.
//!
//! Every trait is object safe and `Send + Sync`: the manager keeps them as
//! `Arc<dyn Trait>` and calls them from its worker thread as well as from
//! caller threads.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::errors::PvrError;
use crate::model::{Channel, GroupId, PlayingItem, Recording, Timer};
use crate::settings::{VideoSettings, ViewModeGeometry};

/// The set of provider backends (PVR clients).
pub trait ProviderManager: Send + Sync {
    /// Tries to activate up to `max` providers that are not yet ready.
    /// Returns how many became active.
    fn try_activate(&self, max: usize) -> usize;

    fn has_active_provider(&self) -> bool;

    /// True once every configured provider is active.
    fn all_activated(&self) -> bool;

    fn switch_channel(&self, channel: &Channel) -> Result<(), PvrError>;

    fn playing_channel(&self) -> Option<Channel>;

    fn is_playing(&self) -> bool;
    fn is_playing_tv(&self) -> bool;
    fn is_playing_radio(&self) -> bool;
    fn is_playing_recording(&self) -> bool;
    fn is_reading_live_stream(&self) -> bool;

    fn open_live_stream(&self, channel: &Channel) -> Result<(), PvrError>;
    fn open_recorded_stream(&self, recording: &Recording) -> Result<(), PvrError>;
    fn close_stream(&self);

    fn start_channel_scan(&self);
    fn is_running_channel_scan(&self) -> bool;

    fn has_timer_support(&self, client_id: i32) -> bool;

    fn start(&self);
    fn stop(&self);
    fn unload(&self);
}

/// A channel group owned by the groups container.
pub trait ChannelGroup: Send + Sync {
    fn id(&self) -> GroupId;

    fn channel_by_number(&self, number: u32) -> Option<Channel>;

    /// Neighbour of `channel` in this group. Wrapping is up to the group.
    fn channel_up(&self, channel: &Channel) -> Option<Channel>;
    fn channel_down(&self, channel: &Channel) -> Option<Channel>;

    /// Called when the group becomes the playing group, so that channel
    /// numbers are recomputed for it.
    fn set_selected_group(&self);

    fn cache_icons(&self);

    /// Refreshes the translated name of a built-in group.
    fn check_group_name(&self) {}
}

pub trait GroupsContainer: Send + Sync {
    fn load(&self) -> Result<(), PvrError>;
    fn unload(&self);

    /// `None` while the container is not loaded.
    fn all_tv_group(&self) -> Option<Arc<dyn ChannelGroup>>;
    fn all_radio_group(&self) -> Option<Arc<dyn ChannelGroup>>;

    fn last_played_channel(&self) -> Option<Channel>;

    /// Refreshes channels only, or channels and groups.
    fn update(&self, channels_only: bool) -> Result<(), PvrError>;

    fn search_missing_channel_icons(&self);

    fn set_last_watched(&self, channel: &Channel, at: DateTime<Utc>);
}

pub trait TimersStore: Send + Sync {
    fn load(&self) -> Result<(), PvrError>;
    fn unload(&self);
    fn update(&self) -> Result<(), PvrError>;

    fn create_instant_timer(&self, channel: &Channel) -> Result<Timer, PvrError>;

    fn delete_timers_on_channel(
        &self,
        channel: &Channel,
        active_only: bool,
        delete_repeating: bool,
    ) -> Result<(), PvrError>;
}

pub trait RecordingsStore: Send + Sync {
    fn load(&self) -> Result<(), PvrError>;
    fn unload(&self);
    fn update(&self) -> Result<(), PvrError>;
}

pub trait EpgContainer: Send + Sync {
    fn start(&self);
    fn stop(&self);
    fn unload(&self);
    fn clear(&self, delete_db: bool);
    fn reset(&self);
}

/// Background updater of the player information shown in the GUI.
pub trait GuiInfo: Send + Sync {
    fn start(&self);
    fn stop(&self);

    /// Length of the playing item.
    fn duration(&self) -> Duration;

    /// Position of the playing item when playback started.
    fn start_time(&self) -> Duration;

    fn has_timers(&self) -> bool;
    fn is_recording(&self) -> bool;
}

/// Database holding per-channel settings and the cached provider data.
pub trait SettingsStore: Send + Sync {
    fn open(&self) -> Result<(), PvrError>;
    fn close(&self);

    fn channel_settings(&self, channel: &Channel) -> Option<VideoSettings>;

    fn persist_channel_settings(
        &self,
        channel: &Channel,
        settings: &VideoSettings,
    ) -> Result<(), PvrError>;

    /// Deletes the settings of `channel`, or of every channel when `None`.
    fn delete_channel_settings(&self, channel: Option<&Channel>) -> Result<(), PvrError>;

    fn delete_channels(&self) -> Result<(), PvrError>;
    fn delete_channel_groups(&self) -> Result<(), PvrError>;
    fn delete_clients(&self) -> Result<(), PvrError>;
}

/// The application player.
pub trait PlaybackHost: Send + Sync {
    fn stop_playing(&self);

    /// Starts playing `item`, in a window when `windowed`. Returns false if
    /// the player refused the item.
    fn play_file(&self, item: &PlayingItem, windowed: bool) -> bool;

    fn has_player(&self) -> bool;

    fn default_video_settings(&self) -> VideoSettings;
    fn current_video_settings(&self) -> VideoSettings;
    fn set_current_video_settings(&self, settings: VideoSettings);

    fn set_view_mode(&self, view_mode: i32) -> ViewModeGeometry;

    fn audio_stream(&self) -> i32;
    fn set_audio_stream(&self, stream: i32);
    fn set_subtitle_stream(&self, stream: i32);
    fn set_av_delay(&self, delay: f32);
    fn set_dynamic_range_compression(&self, amount: i64);
    fn set_subtitle_visible(&self, visible: bool);
    fn set_subtitle_delay(&self, delay: f32);

    /// Replaces the item the GUI shows as playing.
    fn set_current_item(&self, item: &PlayingItem);
}

/// User feedback surface. Optional: without one the manager only logs.
pub trait PresentationHost: Send + Sync {
    fn show_busy(&self);
    fn hide_busy(&self);
    fn notify_error(&self, title: &str, message: &str);
    fn show_progress(&self, percent: u8, label: &str);
    fn close_progress(&self);
}

/// Components rebuilt on every start of the manager.
#[derive(Clone)]
pub struct PvrComponents {
    pub providers: Arc<dyn ProviderManager>,
    pub groups: Arc<dyn GroupsContainer>,
    pub timers: Arc<dyn TimersStore>,
    pub recordings: Arc<dyn RecordingsStore>,
    pub epg: Arc<dyn EpgContainer>,
    pub gui_info: Arc<dyn GuiInfo>,
    pub settings: Arc<dyn SettingsStore>,
}

pub trait ComponentFactory: Send + Sync {
    fn build(&self) -> PvrComponents;
}

impl<F> ComponentFactory for F
where
    F: Fn() -> PvrComponents + Send + Sync,
{
    fn build(&self) -> PvrComponents {
        self()
    }
}
