use std::future::Future;

use tokio::sync::watch;

use crate::{
    error::PinnedTimelineError,
    types::{FeatureFlag, TimelineItem},
};

/// Room handle as exposed by the Matrix SDK layer.
pub trait MatrixRoom: Send + Sync + 'static {
    /// Feed type returned by [`MatrixRoom::pinned_events_timeline`].
    type Timeline: PinnedEventsTimeline;

    fn room_id(&self) -> &str;

    /// Open a live feed of the room's pinned events.
    fn pinned_events_timeline(
        &self,
    ) -> impl Future<Output = Result<Self::Timeline, PinnedTimelineError>> + Send;
}

/// Live, closable feed of pinned timeline snapshots.
///
/// Every emission is the full list of pinned items in pin order.
pub trait PinnedEventsTimeline: Send + 'static {
    /// Wait for the next snapshot; `None` once the feed has ended.
    fn next_items(&mut self) -> impl Future<Output = Option<Vec<TimelineItem>>> + Send;

    /// Release the feed and its SDK resources.
    fn close(self);
}

/// Source of feature flag values.
pub trait FeatureFlagService: Send + Sync {
    /// Current value of `flag` plus every later change.
    fn is_feature_enabled_stream(&self, flag: FeatureFlag) -> watch::Receiver<bool>;
}
