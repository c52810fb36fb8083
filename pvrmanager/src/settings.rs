//! Per-channel player settings.
//!
//! When a channel starts, its stored settings are laid over the player
//! defaults and pushed to the playback host. Streams and view mode are only
//! touched when they actually change, to avoid needless player resets.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capabilities::PlaybackHost;

/// Geometry computed by the renderer after a view mode change.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ViewModeGeometry {
    pub zoom_amount: f32,
    pub pixel_ratio: f32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VideoSettings {
    pub brightness: f32,
    pub contrast: f32,
    pub gamma: f32,
    pub crop: bool,
    pub crop_left: i32,
    pub crop_right: i32,
    pub crop_top: i32,
    pub crop_bottom: i32,
    pub custom_pixel_ratio: f32,
    pub custom_zoom_amount: f32,
    pub custom_vertical_shift: f32,
    pub custom_non_lin_stretch: bool,
    pub noise_reduction: f32,
    pub sharpness: f32,
    pub interlace_method: i32,
    pub scaling_method: i32,
    pub post_process: bool,
    pub view_mode: i32,
    pub output_to_all_speakers: bool,
    pub audio_delay: f32,
    pub audio_stream: i32,
    pub volume_amplification: f32,
    pub subtitle_on: bool,
    pub subtitle_delay: f32,
    pub subtitle_stream: i32,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            brightness: 50.0,
            contrast: 50.0,
            gamma: 20.0,
            crop: false,
            crop_left: 0,
            crop_right: 0,
            crop_top: 0,
            crop_bottom: 0,
            custom_pixel_ratio: 1.0,
            custom_zoom_amount: 1.0,
            custom_vertical_shift: 0.0,
            custom_non_lin_stretch: false,
            noise_reduction: 0.0,
            sharpness: 0.0,
            interlace_method: 0,
            scaling_method: 0,
            post_process: false,
            view_mode: 0,
            output_to_all_speakers: false,
            audio_delay: 0.0,
            audio_stream: -1,
            volume_amplification: 0.0,
            subtitle_on: true,
            subtitle_delay: 0.0,
            subtitle_stream: -1,
        }
    }
}

impl VideoSettings {
    /// Starts from `defaults` and takes every per-channel field from `loaded`.
    ///
    /// View mode, subtitle stream and volume amplification stay at their
    /// default value: the first two are applied separately because they
    /// require player calls.
    pub fn overlay(defaults: &VideoSettings, loaded: &VideoSettings) -> VideoSettings {
        VideoSettings {
            brightness: loaded.brightness,
            contrast: loaded.contrast,
            gamma: loaded.gamma,
            crop: loaded.crop,
            crop_left: loaded.crop_left,
            crop_right: loaded.crop_right,
            crop_top: loaded.crop_top,
            crop_bottom: loaded.crop_bottom,
            custom_pixel_ratio: loaded.custom_pixel_ratio,
            custom_zoom_amount: loaded.custom_zoom_amount,
            custom_vertical_shift: loaded.custom_vertical_shift,
            custom_non_lin_stretch: loaded.custom_non_lin_stretch,
            noise_reduction: loaded.noise_reduction,
            sharpness: loaded.sharpness,
            interlace_method: loaded.interlace_method,
            scaling_method: loaded.scaling_method,
            post_process: loaded.post_process,
            output_to_all_speakers: loaded.output_to_all_speakers,
            audio_delay: loaded.audio_delay,
            audio_stream: loaded.audio_stream,
            subtitle_on: loaded.subtitle_on,
            subtitle_delay: loaded.subtitle_delay,
            ..defaults.clone()
        }
    }
}

/// Applies `loaded` channel settings to the playback host.
pub fn apply_channel_settings(host: &dyn PlaybackHost, loaded: &VideoSettings) {
    let defaults = host.default_video_settings();
    let mut current = VideoSettings::overlay(&defaults, loaded);

    if current.view_mode != loaded.view_mode {
        current.view_mode = loaded.view_mode;
        let geometry = host.set_view_mode(current.view_mode);
        current.custom_zoom_amount = geometry.zoom_amount;
        current.custom_pixel_ratio = geometry.pixel_ratio;
    }

    let subtitle_changed = current.subtitle_stream != loaded.subtitle_stream;
    if subtitle_changed {
        current.subtitle_stream = loaded.subtitle_stream;
    }

    host.set_current_video_settings(current.clone());

    if subtitle_changed {
        host.set_subtitle_stream(current.subtitle_stream);
    }

    if host.audio_stream() != current.audio_stream {
        host.set_audio_stream(current.audio_stream);
    }

    host.set_av_delay(current.audio_delay);
    host.set_dynamic_range_compression((current.volume_amplification * 100.0) as i64);
    host.set_subtitle_visible(current.subtitle_on);
    host.set_subtitle_delay(current.subtitle_delay);

    debug!(
        view_mode = current.view_mode,
        audio_stream = current.audio_stream,
        subtitle_stream = current.subtitle_stream,
        "Applied channel settings"
    );
}
