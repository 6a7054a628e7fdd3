use crate::{
    channel::BannerEventSink,
    types::{PinnedMessagesBannerItem, SavedBannerState},
};

/// Banner view state handed to the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnedMessagesBannerState {
    /// Number of renderable pinned messages.
    pub pinned_messages_count: usize,
    /// Message currently shown, `None` when nothing is pinned.
    pub current_pinned_message: Option<PinnedMessagesBannerItem>,
    /// Position of the shown message, 0 when nothing is pinned.
    pub current_pinned_message_index: usize,
    /// Where the UI sends banner events.
    pub event_sink: BannerEventSink,
}

/// Index clamped into `0..count`, or 0 for an empty list.
pub fn repaired_index(index: usize, count: usize) -> usize {
    if index >= count {
        count.saturating_sub(1)
    } else {
        index
    }
}

/// Pinned items plus the cursor into them.
#[derive(Debug, Clone, Default)]
pub struct BannerModel {
    items: Vec<PinnedMessagesBannerItem>,
    current_index: usize,
    restored_index: Option<usize>,
}

impl BannerModel {
    /// Model that resumes at a saved position once items arrive.
    pub fn restored(saved: SavedBannerState) -> Self {
        Self {
            restored_index: Some(saved.current_pinned_message_index),
            ..Self::default()
        }
    }

    /// Items in pin order.
    pub fn items(&self) -> &[PinnedMessagesBannerItem] {
        &self.items
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Replace the pinned items and repair the cursor.
    pub fn set_items(&mut self, items: Vec<PinnedMessagesBannerItem>) {
        self.items = items;
        if let Some(restored) = self.restored_index.take() {
            self.current_index = restored;
        }
        self.repair_index();
    }

    /// Drop every item, keeping any pending restored position.
    pub fn clear(&mut self) {
        self.items.clear();
        self.repair_index();
    }

    /// Advance the cursor, wrapping to the first item after the last.
    pub fn move_to_next(&mut self) {
        if self.current_index + 1 < self.items.len() {
            self.current_index += 1;
        } else {
            self.current_index = 0;
        }
    }

    /// Clamp the cursor after the list shrank; returns whether it moved.
    pub fn repair_index(&mut self) -> bool {
        let repaired = repaired_index(self.current_index, self.items.len());
        let moved = repaired != self.current_index;
        self.current_index = repaired;
        moved
    }

    /// Position to persist for the UI session.
    pub fn saved_state(&self) -> SavedBannerState {
        SavedBannerState {
            current_pinned_message_index: self.restored_index.unwrap_or(self.current_index),
        }
    }

    /// View state snapshot bound to `sink`.
    pub fn state(&self, sink: &BannerEventSink) -> PinnedMessagesBannerState {
        PinnedMessagesBannerState {
            pinned_messages_count: self.items.len(),
            current_pinned_message: self.items.get(self.current_index).cloned(),
            current_pinned_message_index: self.current_index,
            event_sink: sink.clone(),
        }
    }
}
