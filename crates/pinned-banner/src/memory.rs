//! In-process stand-ins for the SDK room and the feature flag provider.

use std::{
    collections::HashMap,
    future::Future,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{mpsc, watch};
use tracing::debug;

use crate::{
    error::PinnedTimelineError,
    room::{FeatureFlagService, MatrixRoom, PinnedEventsTimeline},
    types::{FeatureFlag, TimelineItem},
};

#[derive(Debug, Default)]
struct RoomState {
    pinned: Vec<TimelineItem>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<TimelineItem>>>,
    unavailable: bool,
    opened: usize,
    closed: usize,
}

/// Room whose pinned events are driven by the caller.
#[derive(Debug, Clone)]
pub struct InMemoryRoom {
    room_id: String,
    state: Arc<Mutex<RoomState>>,
}

impl InMemoryRoom {
    pub fn new(room_id: impl Into<String>) -> Self {
        Self {
            room_id: room_id.into(),
            state: Arc::default(),
        }
    }

    /// Make subsequent `pinned_events_timeline` calls fail.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.lock().unavailable = unavailable;
    }

    /// Replace the pinned events and notify every open feed.
    pub fn publish(&self, items: Vec<TimelineItem>) {
        let mut state = self.lock();
        state
            .subscribers
            .retain(|subscriber| subscriber.send(items.clone()).is_ok());
        debug!(
            room_id = %self.room_id,
            pinned = items.len(),
            feeds = state.subscribers.len(),
            "pinned events published"
        );
        state.pinned = items;
    }

    /// End every open feed after its queued snapshots.
    pub fn end_feeds(&self) {
        self.lock().subscribers.clear();
    }

    /// Number of feeds opened so far.
    pub fn opened_count(&self) -> usize {
        self.lock().opened
    }

    /// Number of feeds released so far.
    pub fn closed_count(&self) -> usize {
        self.lock().closed
    }

    fn lock(&self) -> MutexGuard<'_, RoomState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn open(&self) -> Result<InMemoryPinnedTimeline, PinnedTimelineError> {
        let mut state = self.lock();
        if state.unavailable {
            return Err(PinnedTimelineError::Unavailable {
                room_id: self.room_id.clone(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        // Feeds start with the current pinned list, like the SDK timeline.
        let _ = tx.send(state.pinned.clone());
        state.subscribers.push(tx);
        state.opened += 1;

        Ok(InMemoryPinnedTimeline {
            rx,
            room: Arc::clone(&self.state),
        })
    }
}

impl MatrixRoom for InMemoryRoom {
    type Timeline = InMemoryPinnedTimeline;

    fn room_id(&self) -> &str {
        &self.room_id
    }

    fn pinned_events_timeline(
        &self,
    ) -> impl Future<Output = Result<Self::Timeline, PinnedTimelineError>> + Send {
        std::future::ready(self.open())
    }
}

/// Feed handed out by [`InMemoryRoom`].
#[derive(Debug)]
pub struct InMemoryPinnedTimeline {
    rx: mpsc::UnboundedReceiver<Vec<TimelineItem>>,
    room: Arc<Mutex<RoomState>>,
}

impl PinnedEventsTimeline for InMemoryPinnedTimeline {
    fn next_items(&mut self) -> impl Future<Output = Option<Vec<TimelineItem>>> + Send {
        self.rx.recv()
    }

    fn close(self) {
        self.room
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .closed += 1;
    }
}

/// Feature flags toggled by the caller.
#[derive(Debug, Clone, Default)]
pub struct InMemoryFeatureFlagService {
    flags: Arc<Mutex<HashMap<FeatureFlag, watch::Sender<bool>>>>,
}

impl InMemoryFeatureFlagService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a flag, notifying every stream of it.
    pub fn set_enabled(&self, flag: FeatureFlag, enabled: bool) {
        debug!(flag = flag.key(), enabled, "feature flag changed");
        self.lock()
            .entry(flag)
            .or_insert_with(|| watch::channel(flag.default_enabled()).0)
            .send_replace(enabled);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<FeatureFlag, watch::Sender<bool>>> {
        self.flags.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl FeatureFlagService for InMemoryFeatureFlagService {
    fn is_feature_enabled_stream(&self, flag: FeatureFlag) -> watch::Receiver<bool> {
        self.lock()
            .entry(flag)
            .or_insert_with(|| watch::channel(flag.default_enabled()).0)
            .subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{EventContent, EventTimelineItem};

    fn text(event_id: &str) -> TimelineItem {
        TimelineItem::Event(EventTimelineItem {
            event_id: Some(event_id.to_owned()),
            sender: "@alice:example.org".to_owned(),
            sender_display_name: None,
            content: EventContent::Text {
                body: "hello".to_owned(),
            },
            timestamp_ms: 1_731_000_000,
        })
    }

    #[tokio::test]
    async fn feed_starts_with_current_pins_then_follows_updates() {
        let room = InMemoryRoom::new("!room:example.org");
        room.publish(vec![text("$1")]);

        let mut timeline = room
            .pinned_events_timeline()
            .await
            .expect("timeline should open");
        assert_eq!(timeline.next_items().await, Some(vec![text("$1")]));

        room.publish(vec![text("$1"), text("$2")]);
        assert_eq!(
            timeline.next_items().await.map(|items| items.len()),
            Some(2)
        );

        room.end_feeds();
        assert_eq!(timeline.next_items().await, None);

        timeline.close();
        assert_eq!(room.opened_count(), 1);
        assert_eq!(room.closed_count(), 1);
    }

    #[tokio::test]
    async fn unavailable_room_refuses_feed() {
        let room = InMemoryRoom::new("!room:example.org");
        room.set_unavailable(true);
        let err = room
            .pinned_events_timeline()
            .await
            .expect_err("timeline should be unavailable");
        assert_eq!(err.room_id(), "!room:example.org");
        assert_eq!(room.opened_count(), 0);
    }

    #[test]
    fn feature_flag_streams_follow_updates() {
        let flags = InMemoryFeatureFlagService::new();
        let mut rx = flags.is_feature_enabled_stream(FeatureFlag::PinnedEvents);
        assert!(!*rx.borrow_and_update());

        flags.set_enabled(FeatureFlag::PinnedEvents, true);
        assert!(rx.has_changed().expect("sender alive"));
        assert!(*rx.borrow_and_update());

        let late = flags.is_feature_enabled_stream(FeatureFlag::PinnedEvents);
        assert!(*late.borrow());
    }
}
