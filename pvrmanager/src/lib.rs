//! Personal video recording (PVR) manager.
//!
//! [`PvrManager`] supervises the PVR subsystem: it waits for provider
//! backends, loads channels, timers and recordings, runs deferred refresh
//! jobs on a single worker thread and keeps track of what is playing.
//! Everything it drives (providers, stores, the player) is reached through
//! the traits of [`capabilities`].

mod events;

pub mod capabilities;
pub mod config_ext;
pub mod errors;
pub mod group_selector;
pub mod jobs;
pub mod logging;
pub mod manager;
pub mod model;
pub mod previous_channel;
pub mod settings;

pub use capabilities::{
    ChannelGroup, ComponentFactory, EpgContainer, GroupsContainer, GuiInfo, PlaybackHost,
    PresentationHost, ProviderManager, PvrComponents, RecordingsStore, SettingsStore,
    TimersStore,
};
pub use config_ext::{ManagerOptions, PvrConfigExt, StartLastChannel};
pub use errors::PvrError;
pub use events::PvrEventBus;
pub use group_selector::PlaybackGroupSelector;
pub use jobs::{JobKind, JobQueue, PendingJob};
pub use logging::init_logging;
pub use manager::PvrManager;
pub use model::{
    Channel, ChannelId, GroupId, ManagerState, PlayingItem, PvrEvent, Recording, StepDirection,
    Timer,
};
pub use previous_channel::{NO_CHANNEL, PreviousChannelTracker};
pub use settings::{VideoSettings, ViewModeGeometry, apply_channel_settings};
