use std::fmt;

use crate::jobs::JobKind;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChannelId(pub u32);

/// A PVR channel as exposed by the groups container.
///
/// `number` is the group-local channel number of the group the channel was
/// resolved from; `client_id` is the id of the provider serving it, negative
/// when the channel has no valid provider binding.
#[derive(Clone, Debug, PartialEq)]
pub struct Channel {
    pub id: ChannelId,
    pub number: u32,
    pub name: String,
    pub is_radio: bool,
    pub client_id: i32,
    pub is_recording: bool,
    pub path: String,
}

impl Channel {
    pub fn has_provider(&self) -> bool {
        self.client_id >= 0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recording {
    pub id: String,
    pub title: String,
    pub file: String,
    pub client_id: i32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Timer {
    pub id: u32,
    pub channel: ChannelId,
    pub title: String,
}

/// Identity of a channel group: the radio/TV axis plus the group name.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct GroupId {
    pub is_radio: bool,
    pub name: String,
}

impl GroupId {
    pub fn new(is_radio: bool, name: impl Into<String>) -> Self {
        Self {
            is_radio,
            name: name.into(),
        }
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let axis = if self.is_radio { "radio" } else { "tv" };
        write!(f, "{}/{}", axis, self.name)
    }
}

/// What the manager considers "now playing". A channel and a recording
/// are never playing at the same time.
#[derive(Clone, Debug, PartialEq)]
pub enum PlayingItem {
    Channel(Channel),
    Recording(Recording),
}

impl PlayingItem {
    pub fn channel(&self) -> Option<&Channel> {
        match self {
            PlayingItem::Channel(channel) => Some(channel),
            PlayingItem::Recording(_) => None,
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, PlayingItem::Recording(_))
    }

    pub fn label(&self) -> &str {
        match self {
            PlayingItem::Channel(channel) => &channel.name,
            PlayingItem::Recording(recording) => &recording.title,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ManagerState {
    #[default]
    Stopped,
    Starting,
    Loaded,
    Stopping,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepDirection {
    Up,
    Down,
}

#[derive(Clone, Debug)]
pub enum PvrEvent {
    StateChanged {
        state: ManagerState,
    },
    ChannelSwitched {
        channel: ChannelId,
        number: u32,
        preview: bool,
    },
    JobFailed {
        kind: JobKind,
        reason: String,
    },
}
