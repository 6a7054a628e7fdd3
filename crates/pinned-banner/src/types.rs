use serde::{Deserialize, Serialize};

/// One entry of a room timeline as delivered by the pinned events feed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimelineItem {
    /// A real room event.
    Event(EventTimelineItem),
    /// A client-side marker that has no event behind it.
    Virtual(VirtualTimelineItem),
}

/// Event-backed timeline entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventTimelineItem {
    /// Event ID, `None` while a local echo is not yet acknowledged.
    pub event_id: Option<String>,
    /// Sender user ID.
    pub sender: String,
    /// Sender display name when the room member is known.
    pub sender_display_name: Option<String>,
    /// Event payload.
    pub content: EventContent,
    /// Event timestamp in milliseconds since Unix epoch.
    pub timestamp_ms: u64,
}

/// Event payload kinds the banner knows how to summarize.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventContent {
    /// `m.text`.
    Text { body: String },
    /// `m.notice`.
    Notice { body: String },
    /// `m.emote`.
    Emote { body: String },
    /// `m.image`.
    Image { filename: String },
    /// `m.video`.
    Video { filename: String },
    /// `m.audio`.
    Audio { filename: String },
    /// `m.file`.
    File { filename: String },
    /// `m.location`.
    Location { description: Option<String> },
    /// Poll start event.
    Poll { question: String },
    /// Redacted event.
    Redacted,
    /// Encrypted event we have no keys for.
    UnableToDecrypt,
    /// Room state change (membership, topic...).
    State,
}

/// Client-side timeline markers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum VirtualTimelineItem {
    /// Divider between two days.
    DateDivider,
    /// The user's own read marker.
    ReadMarker,
    /// Start of the room history.
    TimelineStart,
}

/// Display-ready projection of one pinned event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PinnedMessagesBannerItem {
    /// Event ID of the pinned event, used to jump to it.
    pub event_id: String,
    /// One-line summary shown in the banner.
    pub formatted: String,
}

/// User actions on the banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinnedMessagesBannerEvent {
    /// Show the next pinned message, wrapping to the first after the last.
    MoveToNextPinned,
}

/// Banner position kept across presenter instances of the same UI session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SavedBannerState {
    pub current_pinned_message_index: usize,
}

/// Remote-controlled feature toggles the banner depends on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum FeatureFlag {
    /// Pinned events support.
    PinnedEvents,
}

impl FeatureFlag {
    /// Stable key used by flag providers.
    pub fn key(self) -> &'static str {
        match self {
            Self::PinnedEvents => "feature.pinned_events",
        }
    }

    /// Value assumed until the provider reports one.
    pub fn default_enabled(self) -> bool {
        match self {
            Self::PinnedEvents => false,
        }
    }
}
