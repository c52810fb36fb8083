use std::sync::Arc;

use tracing::debug;

use crate::capabilities::{ChannelGroup, GroupsContainer};

/// Playing channel group, one per radio/TV axis.
///
/// An axis without a selection falls back to the container's "all channels"
/// group the first time it is asked for.
#[derive(Default)]
pub struct PlaybackGroupSelector {
    tv: Option<Arc<dyn ChannelGroup>>,
    radio: Option<Arc<dyn ChannelGroup>>,
}

impl PlaybackGroupSelector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes `group` the playing group of its axis. Returns true if the
    /// selection changed, in which case the group recomputes its channel
    /// numbers.
    pub fn set_playing_group(&mut self, group: Arc<dyn ChannelGroup>) -> bool {
        let id = group.id();
        let slot = if id.is_radio {
            &mut self.radio
        } else {
            &mut self.tv
        };

        if slot.as_ref().is_some_and(|current| current.id() == id) {
            return false;
        }

        debug!(group = %id, "Playing group changed");
        *slot = Some(Arc::clone(&group));
        group.set_selected_group();
        true
    }

    /// Playing group of the radio or TV axis, selecting the matching
    /// "all channels" group if nothing was selected yet. `None` only when
    /// the container has no such group.
    pub fn get_playing_group(
        &mut self,
        radio: bool,
        groups: &dyn GroupsContainer,
    ) -> Option<Arc<dyn ChannelGroup>> {
        if let Some(group) = self.selected(radio) {
            return Some(group);
        }

        let fallback = if radio {
            groups.all_radio_group()
        } else {
            groups.all_tv_group()
        }?;
        self.set_playing_group(Arc::clone(&fallback));
        Some(fallback)
    }

    /// Current selection of an axis, without fallback.
    pub fn selected(&self, radio: bool) -> Option<Arc<dyn ChannelGroup>> {
        if radio {
            self.radio.clone()
        } else {
            self.tv.clone()
        }
    }

    pub fn is_selected_group(&self, group: &dyn ChannelGroup) -> bool {
        let id = group.id();
        self.selected(id.is_radio)
            .is_some_and(|current| current.id() == id)
    }

    pub fn reset(&mut self) {
        self.tv = None;
        self.radio = None;
    }
}
