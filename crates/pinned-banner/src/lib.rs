//! Pinned messages banner for a Matrix room.
//!
//! The presenter follows a room's pinned events feed while the pinned events
//! feature flag is on, debounces bursts of updates, renders each snapshot into
//! banner items and keeps a cyclic cursor on the message currently shown.

/// Event sink and state channels between the presenter and the UI.
pub mod channel;
/// Timer-gated coalescing of bursty updates.
pub mod debounce;
/// Errors raised by room collaborators.
pub mod error;
/// Rendering of raw timeline items into banner items.
pub mod factory;
/// In-memory room and feature flag collaborators.
pub mod memory;
/// Banner items plus cursor, and the view state derived from them.
pub mod model;
/// The presenter task and its UI handle.
pub mod presenter;
/// Seams to the Matrix SDK and feature flag provider.
pub mod room;
/// Timeline, banner and event types.
pub mod types;

pub use channel::{BannerChannelError, BannerEventSink};
pub use debounce::Debouncer;
pub use error::PinnedTimelineError;
pub use factory::{DefaultBannerItemFactory, PinnedMessagesBannerItemFactory};
pub use memory::{InMemoryFeatureFlagService, InMemoryPinnedTimeline, InMemoryRoom};
pub use model::{BannerModel, PinnedMessagesBannerState, repaired_index};
pub use presenter::{DEFAULT_DEBOUNCE, PinnedMessagesBannerHandle, PinnedMessagesBannerPresenter};
pub use room::{FeatureFlagService, MatrixRoom, PinnedEventsTimeline};
pub use types::{
    EventContent, EventTimelineItem, FeatureFlag, PinnedMessagesBannerEvent,
    PinnedMessagesBannerItem, SavedBannerState, TimelineItem, VirtualTimelineItem,
};
