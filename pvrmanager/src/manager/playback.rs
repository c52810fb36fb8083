//! Channel switching, playing groups, streams and per-channel settings.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use super::{PvrManager, Session};
use crate::capabilities::{ChannelGroup, PvrComponents};
use crate::config_ext::StartLastChannel;
use crate::errors::PvrError;
use crate::model::{Channel, PlayingItem, PvrEvent, Recording, StepDirection};
use crate::previous_channel::NO_CHANNEL;
use crate::settings::apply_channel_settings;

impl PvrManager {
    // =========================================================================
    // Channel switching
    // =========================================================================

    /// Switches to channel `number` of the playing group.
    pub fn switch_to_channel_number(&self, number: u32) -> Result<(), PvrError> {
        let components = self.components();
        let radio = components.providers.is_playing_radio();

        let mut session = self.lock_session();
        let Some(group) = session
            .groups
            .get_playing_group(radio, components.groups.as_ref())
        else {
            error!(radio, "Cannot get the playing group");
            return Err(PvrError::ChannelNotFound(number));
        };

        let Some(channel) = group.channel_by_number(number) else {
            error!(group = %group.id(), number, "Cannot find channel");
            return Err(PvrError::ChannelNotFound(number));
        };

        self.perform_switch_locked(&mut session, &components, &channel, false)
    }

    /// Moves to the next or previous channel of the playing group and
    /// returns its number. Only while a TV or radio channel is playing.
    pub fn step_channel(&self, direction: StepDirection, preview: bool) -> Result<u32, PvrError> {
        if !(self.is_playing_tv() || self.is_playing_radio()) {
            return Err(PvrError::NotPlaying);
        }

        let components = self.components();
        let mut session = self.lock_session();

        let current = session
            .current_item
            .as_ref()
            .and_then(PlayingItem::channel)
            .cloned()
            .or_else(|| components.providers.playing_channel())
            .ok_or(PvrError::NotPlaying)?;

        let group = session
            .groups
            .get_playing_group(current.is_radio, components.groups.as_ref())
            .ok_or(PvrError::NoPlayingGroup)?;

        let next = match direction {
            StepDirection::Up => group.channel_up(&current),
            StepDirection::Down => group.channel_down(&current),
        }
        .ok_or(PvrError::ChannelNotFound(current.number))?;

        self.perform_switch_locked(&mut session, &components, &next, preview)?;
        Ok(next.number)
    }

    /// Makes `channel` the playing item.
    ///
    /// Without `preview` the settings of the channel being left are saved,
    /// the providers switch and the settings of `channel` are applied. A
    /// preview only updates what the manager considers playing.
    pub fn perform_switch(&self, channel: &Channel, preview: bool) -> Result<(), PvrError> {
        let components = self.components();
        let mut session = self.lock_session();
        self.perform_switch_locked(&mut session, &components, channel, preview)
    }

    fn perform_switch_locked(
        &self,
        session: &mut Session,
        components: &PvrComponents,
        channel: &Channel,
        preview: bool,
    ) -> Result<(), PvrError> {
        debug!(channel = %channel.name, preview, "Switching channel");

        if !preview {
            if let Err(err) = self.save_channel_settings(components) {
                warn!(error = %err, "Cannot save the settings of the current channel");
            }
        }

        let previous = session.current_item.take();

        if !preview {
            let switched = if channel.has_provider() {
                components.providers.switch_channel(channel)
            } else {
                Err(PvrError::provider("channel has no provider"))
            };

            if let Err(err) = switched {
                error!(channel = %channel.name, error = %err, "Failed to switch channel");
                session.current_item = previous;
                let failure = PvrError::switch_failed(&channel.name);
                self.notify_error("Channel switch", &failure.to_string());
                return Err(failure);
            }
        }

        session.current_item = Some(PlayingItem::Channel(channel.clone()));

        if !preview {
            if let Err(err) = self.load_channel_settings(components) {
                warn!(error = %err, "Cannot load the settings of the new channel");
            }
            info!(channel = %channel.name, number = channel.number, "Switched channel");
        }

        self.emit_event(PvrEvent::ChannelSwitched {
            channel: channel.id,
            number: channel.number,
            preview,
        });
        Ok(())
    }

    /// Number of the channel to jump back to, toggling the history.
    pub fn previous_channel(&self) -> Option<u32> {
        let channel = self.components().providers.playing_channel()?;
        let number = i32::try_from(channel.number).ok()?;

        let previous = self.lock_session().previous.previous(number);
        if previous == NO_CHANNEL {
            return None;
        }
        u32::try_from(previous).ok()
    }

    /// Called by the GUI with the item it displays. Recordings are left
    /// alone. When a different channel is displayed, the GUI is pointed
    /// back at the current item and the displayed channel goes to the
    /// previous-channel history. Returns true if the GUI was corrected.
    pub fn update_item(&self, displayed: &PlayingItem) -> bool {
        let PlayingItem::Channel(channel) = displayed else {
            return false;
        };

        let mut session = self.lock_session();
        let Some(current) = session.current_item.clone() else {
            return false;
        };
        if current.channel() == Some(channel) {
            return false;
        }

        self.playback.set_current_item(&current);
        if let Ok(number) = i32::try_from(channel.number) {
            session.previous.record(number, Instant::now());
        }
        true
    }

    /// Resumes the last watched channel, once per manager lifetime.
    pub fn continue_last_channel(&self) -> bool {
        {
            let mut session = self.lock_session();
            if !session.first_start {
                return true;
            }
            session.first_start = false;
        }

        let Some(channel) = self.components().groups.last_played_channel() else {
            return false;
        };

        info!(channel = %channel.name, "Continuing playback on the last watched channel");
        let minimized = self.options().start_last == StartLastChannel::Minimized;
        self.start_playback(&channel, minimized)
    }

    /// Asks the player to play `channel`, in a window when `preview`.
    pub fn start_playback(&self, channel: &Channel, preview: bool) -> bool {
        let item = PlayingItem::Channel(channel.clone());
        if self.playback.play_file(&item, preview) {
            info!(channel = %channel.name, "Started playback");
            true
        } else {
            error!(channel = %channel.name, "Failed to start playback");
            false
        }
    }

    // =========================================================================
    // Playing groups
    // =========================================================================

    pub fn get_playing_group(&self, radio: bool) -> Option<Arc<dyn ChannelGroup>> {
        let components = self.components();
        self.lock_session()
            .groups
            .get_playing_group(radio, components.groups.as_ref())
    }

    pub fn set_playing_group(&self, group: Arc<dyn ChannelGroup>) -> bool {
        self.lock_session().groups.set_playing_group(group)
    }

    pub fn is_selected_group(&self, group: &dyn ChannelGroup) -> bool {
        self.lock_session().groups.is_selected_group(group)
    }

    // =========================================================================
    // Streams
    // =========================================================================

    pub fn open_live_stream(&self, channel: &Channel) -> Result<(), PvrError> {
        debug!(channel = %channel.name, "Opening live stream");
        let components = self.components();
        let mut session = self.lock_session();

        components.providers.open_live_stream(channel)?;
        session.current_item = Some(PlayingItem::Channel(channel.clone()));

        if let Err(err) = self.load_channel_settings(&components) {
            warn!(error = %err, "Cannot load the settings of the channel");
        }
        Ok(())
    }

    pub fn open_recorded_stream(&self, recording: &Recording) -> Result<(), PvrError> {
        debug!(file = %recording.file, "Opening recorded stream");
        let components = self.components();
        let mut session = self.lock_session();

        components.providers.open_recorded_stream(recording)?;
        session.current_item = Some(PlayingItem::Recording(recording.clone()));
        Ok(())
    }

    /// Closes the provider stream, remembering when a live channel was last
    /// watched.
    pub fn close_stream(&self) {
        let components = self.components();
        let mut session = self.lock_session();

        if components.providers.is_reading_live_stream() {
            if let Some(channel) = components.providers.playing_channel() {
                components.groups.set_last_watched(&channel, Utc::now());
            }
        }

        components.providers.close_stream();
        session.current_item = None;
    }

    // =========================================================================
    // Channel settings
    // =========================================================================

    /// Persists the player settings of the playing channel, or drops them
    /// when they match the defaults.
    pub fn save_current_channel_settings(&self) -> Result<(), PvrError> {
        let components = self.components();
        let _session = self.lock_session();
        self.save_channel_settings(&components)
    }

    pub fn load_current_channel_settings(&self) -> Result<(), PvrError> {
        let components = self.components();
        self.load_channel_settings(&components)
    }

    pub(super) fn save_channel_settings(&self, components: &PvrComponents) -> Result<(), PvrError> {
        let Some(channel) = components.providers.playing_channel() else {
            return Ok(());
        };

        if let Err(err) = components.settings.open() {
            error!(error = %err, "Could not open the settings store");
            return Err(PvrError::PersistenceUnavailable(err.to_string()));
        }

        let current = self.playback.current_video_settings();
        let result = if current != self.playback.default_video_settings() {
            debug!(channel = %channel.name, "Persisting custom channel settings");
            components
                .settings
                .persist_channel_settings(&channel, &current)
        } else {
            debug!(channel = %channel.name, "No custom channel settings");
            components.settings.delete_channel_settings(Some(&channel))
        };

        components.settings.close();
        result
    }

    fn load_channel_settings(&self, components: &PvrComponents) -> Result<(), PvrError> {
        let Some(channel) = components.providers.playing_channel() else {
            return Ok(());
        };

        if let Err(err) = components.settings.open() {
            error!(error = %err, "Could not open the settings store");
            return Err(PvrError::PersistenceUnavailable(err.to_string()));
        }

        if !self.playback.has_player() {
            components.settings.close();
            return Ok(());
        }

        let loaded = components
            .settings
            .channel_settings(&channel)
            .unwrap_or_else(|| self.playback.default_video_settings());
        components.settings.close();

        apply_channel_settings(self.playback.as_ref(), &loaded);
        Ok(())
    }

    // =========================================================================
    // Recording
    // =========================================================================

    /// Starts or stops an instant recording of the playing channel. Returns
    /// whether a timer was created or deleted.
    pub fn start_recording_on_playing_channel(&self, on: bool) -> Result<bool, PvrError> {
        let components = self.components();
        let Some(channel) = components.providers.playing_channel() else {
            return Ok(false);
        };

        if !components.providers.has_timer_support(channel.client_id) {
            debug!(channel = %channel.name, "Provider has no timer support");
            return Ok(false);
        }

        if on && !channel.is_recording {
            match components.timers.create_instant_timer(&channel) {
                Ok(timer) => {
                    info!(channel = %channel.name, timer = timer.id, "Instant recording started");
                    Ok(true)
                }
                Err(err) => {
                    self.notify_error("Recording", &err.to_string());
                    Err(err)
                }
            }
        } else if !on && channel.is_recording {
            components
                .timers
                .delete_timers_on_channel(&channel, true, false)?;
            info!(channel = %channel.name, "Instant recording stopped");
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
