use std::{future, time::Duration};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
    time::Instant,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::{
    channel::{BannerChannels, BannerEventSink},
    debounce::Debouncer,
    factory::PinnedMessagesBannerItemFactory,
    model::{BannerModel, PinnedMessagesBannerState},
    room::{FeatureFlagService, MatrixRoom, PinnedEventsTimeline},
    types::{FeatureFlag, PinnedMessagesBannerEvent, SavedBannerState, TimelineItem},
};

/// Quiet period applied to pinned events updates before they are rendered.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Builds the pinned messages banner state for one room.
pub struct PinnedMessagesBannerPresenter<R, F, S> {
    room: R,
    factory: F,
    feature_flags: S,
    debounce: Duration,
}

impl<R, F, S> PinnedMessagesBannerPresenter<R, F, S>
where
    R: MatrixRoom,
    F: PinnedMessagesBannerItemFactory,
    S: FeatureFlagService,
{
    pub fn new(room: R, factory: F, feature_flags: S) -> Self {
        Self {
            room,
            factory,
            feature_flags,
            debounce: DEFAULT_DEBOUNCE,
        }
    }

    /// Override the quiet period applied to feed updates.
    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Spawn the presenter task on the current tokio runtime.
    ///
    /// `saved` resumes the banner at a previously saved position. The task
    /// runs until the returned handle is shut down or dropped.
    pub fn present(self, saved: Option<SavedBannerState>) -> PinnedMessagesBannerHandle {
        let model = saved.map(BannerModel::restored).unwrap_or_default();
        let (channels, event_rx) = BannerChannels::new(&model);
        let state_rx = channels.subscribe();
        let saved_rx = channels.subscribe_saved();
        let sink = channels.event_sink();
        let feature_enabled = self
            .feature_flags
            .is_feature_enabled_stream(FeatureFlag::PinnedEvents);

        let cancel = CancellationToken::new();
        let task = PresenterTask {
            room: self.room,
            factory: self.factory,
            channels,
            event_rx,
            feature_enabled,
            enabled: false,
            model,
            debouncer: Debouncer::new(self.debounce),
            timeline: None,
            cancel: cancel.child_token(),
        };
        let task = tokio::spawn(task.run());

        PinnedMessagesBannerHandle {
            state_rx,
            saved_rx,
            sink,
            cancel,
            task: Some(task),
        }
    }
}

/// UI-side handle on a running banner presenter.
///
/// Dropping the handle stops the presenter and releases its feed.
#[derive(Debug)]
pub struct PinnedMessagesBannerHandle {
    state_rx: watch::Receiver<PinnedMessagesBannerState>,
    saved_rx: watch::Receiver<SavedBannerState>,
    sink: BannerEventSink,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PinnedMessagesBannerHandle {
    /// Latest published state.
    pub fn state(&self) -> PinnedMessagesBannerState {
        self.state_rx.borrow().clone()
    }

    /// Stream of published states.
    pub fn subscribe(&self) -> watch::Receiver<PinnedMessagesBannerState> {
        self.state_rx.clone()
    }

    pub fn event_sink(&self) -> BannerEventSink {
        self.sink.clone()
    }

    /// Position to hand to the next presenter of this UI session.
    pub fn saved_state(&self) -> SavedBannerState {
        *self.saved_rx.borrow()
    }

    /// Stop the presenter and wait for it to release its feed.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take()
            && let Err(err) = task.await
        {
            warn!(error = %err, "pinned messages banner task failed");
        }
    }
}

impl Drop for PinnedMessagesBannerHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

struct PresenterTask<R: MatrixRoom, F> {
    room: R,
    factory: F,
    channels: BannerChannels,
    event_rx: mpsc::UnboundedReceiver<PinnedMessagesBannerEvent>,
    feature_enabled: watch::Receiver<bool>,
    enabled: bool,
    model: BannerModel,
    debouncer: Debouncer<Vec<TimelineItem>>,
    timeline: Option<R::Timeline>,
    cancel: CancellationToken,
}

impl<R, F> PresenterTask<R, F>
where
    R: MatrixRoom,
    F: PinnedMessagesBannerItemFactory,
{
    async fn run(mut self) {
        debug!(room_id = %self.room.room_id(), "pinned messages banner started");
        let initially_enabled = *self.feature_enabled.borrow_and_update();
        self.apply_feature_flag(initially_enabled).await;

        let mut flags_open = true;
        loop {
            let deadline = self.debouncer.deadline();
            tokio::select! {
                _ = self.cancel.cancelled() => break,
                changed = self.feature_enabled.changed(), if flags_open => {
                    if changed.is_err() {
                        debug!("feature flag stream closed, keeping last value");
                        flags_open = false;
                    } else {
                        let enabled = *self.feature_enabled.borrow_and_update();
                        self.apply_feature_flag(enabled).await;
                    }
                }
                Some(event) = self.event_rx.recv() => self.handle_event(event),
                snapshot = next_snapshot(&mut self.timeline) => match snapshot {
                    Some(items) => {
                        trace!(raw = items.len(), "pinned events snapshot queued");
                        self.debouncer.push(items, Instant::now());
                    }
                    None => {
                        debug!("pinned events feed completed");
                        if let Some(items) = self.debouncer.flush() {
                            self.apply_snapshot(&items);
                        }
                        self.close_timeline();
                    }
                },
                _ = sleep_until(deadline) => {
                    if let Some(items) = self.debouncer.take_ready(Instant::now()) {
                        self.apply_snapshot(&items);
                    }
                }
            }
        }

        self.close_timeline();
        debug!(room_id = %self.room.room_id(), "pinned messages banner stopped");
    }

    async fn apply_feature_flag(&mut self, enabled: bool) {
        if enabled == self.enabled {
            return;
        }
        self.enabled = enabled;

        if enabled {
            self.open_timeline().await;
            return;
        }

        self.close_timeline();
        self.debouncer.clear();
        if !self.model.items().is_empty() {
            self.model.clear();
            self.channels.publish(&self.model);
        }
    }

    async fn open_timeline(&mut self) {
        let result = tokio::select! {
            _ = self.cancel.cancelled() => return,
            result = self.room.pinned_events_timeline() => result,
        };

        match result {
            Ok(timeline) => {
                info!(room_id = %self.room.room_id(), "pinned events timeline opened");
                self.timeline = Some(timeline);
            }
            Err(err) => {
                warn!(error = %err, "pinned events timeline unavailable, banner stays empty");
            }
        }
    }

    fn close_timeline(&mut self) {
        if let Some(timeline) = self.timeline.take() {
            timeline.close();
            debug!(room_id = %self.room.room_id(), "pinned events timeline closed");
        }
    }

    fn apply_snapshot(&mut self, raw: &[TimelineItem]) {
        let items: Vec<_> = raw
            .iter()
            .filter_map(|item| self.factory.create(item))
            .collect();
        debug!(
            raw = raw.len(),
            rendered = items.len(),
            "pinned messages updated"
        );
        self.model.set_items(items);
        self.channels.publish(&self.model);
    }

    fn handle_event(&mut self, event: PinnedMessagesBannerEvent) {
        match event {
            PinnedMessagesBannerEvent::MoveToNextPinned => {
                self.model.move_to_next();
                trace!(
                    index = self.model.current_index(),
                    "moved to next pinned message"
                );
            }
        }
        self.channels.publish(&self.model);
    }
}

async fn next_snapshot<T: PinnedEventsTimeline>(
    timeline: &mut Option<T>,
) -> Option<Vec<TimelineItem>> {
    match timeline {
        Some(timeline) => timeline.next_items().await,
        None => future::pending().await,
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        factory::DefaultBannerItemFactory,
        memory::{InMemoryFeatureFlagService, InMemoryRoom},
        types::{EventContent, EventTimelineItem, VirtualTimelineItem},
    };

    const ROOM_ID: &str = "!pinned:agent.dinum.tchap.gouv.fr";
    const WAIT: Duration = Duration::from_secs(5);

    fn text(event_id: &str, body: &str) -> TimelineItem {
        TimelineItem::Event(EventTimelineItem {
            event_id: Some(event_id.to_owned()),
            sender: "@jean.martin-dinum.fr:agent.dinum.tchap.gouv.fr".to_owned(),
            sender_display_name: Some("Jean Martin [DINUM]".to_owned()),
            content: EventContent::Text {
                body: body.to_owned(),
            },
            timestamp_ms: 1_731_000_000,
        })
    }

    fn pinned(count: usize) -> Vec<TimelineItem> {
        (0..count)
            .map(|i| text(&format!("${i}"), &format!("pinned {i}")))
            .collect()
    }

    fn setup(enabled: bool) -> (InMemoryRoom, InMemoryFeatureFlagService) {
        let room = InMemoryRoom::new(ROOM_ID);
        let flags = InMemoryFeatureFlagService::new();
        flags.set_enabled(FeatureFlag::PinnedEvents, enabled);
        (room, flags)
    }

    fn present(
        room: &InMemoryRoom,
        flags: &InMemoryFeatureFlagService,
        saved: Option<SavedBannerState>,
    ) -> PinnedMessagesBannerHandle {
        PinnedMessagesBannerPresenter::new(room.clone(), DefaultBannerItemFactory, flags.clone())
            .present(saved)
    }

    async fn wait_for<P>(
        handle: &PinnedMessagesBannerHandle,
        predicate: P,
    ) -> PinnedMessagesBannerState
    where
        P: FnMut(&PinnedMessagesBannerState) -> bool,
    {
        let mut rx = handle.subscribe();
        let state = tokio::time::timeout(WAIT, rx.wait_for(predicate))
            .await
            .expect("state should be reached before timeout")
            .expect("presenter should still be publishing");
        state.clone()
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_secs(1)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_feature_never_opens_feed() {
        let (room, flags) = setup(false);
        room.publish(pinned(2));
        let handle = present(&room, &flags, None);

        settle().await;

        let state = handle.state();
        assert_eq!(state.pinned_messages_count, 0);
        assert_eq!(state.current_pinned_message, None);
        assert_eq!(state.current_pinned_message_index, 0);
        assert_eq!(room.opened_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn enabled_feature_publishes_items_after_debounce() {
        let (room, flags) = setup(true);
        room.publish(pinned(2));
        let start = Instant::now();
        let handle = present(&room, &flags, None);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(handle.state().pinned_messages_count, 0);

        let state = wait_for(&handle, |state| state.pinned_messages_count == 2).await;
        assert!(start.elapsed() >= DEFAULT_DEBOUNCE);
        assert_eq!(state.current_pinned_message_index, 0);
        let current = state.current_pinned_message.expect("current message");
        assert_eq!(current.event_id, "$0");
        assert_eq!(current.formatted, "pinned 0");
        assert_eq!(room.opened_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn bursts_are_coalesced_into_latest_snapshot() {
        let (room, flags) = setup(true);
        let handle = present(&room, &flags, None);
        let mut rx = handle.subscribe();
        settle().await;
        rx.borrow_and_update();

        room.publish(pinned(1));
        tokio::time::sleep(Duration::from_millis(100)).await;
        room.publish(pinned(2));
        tokio::time::sleep(Duration::from_millis(100)).await;
        room.publish(pinned(3));

        tokio::time::timeout(WAIT, rx.changed())
            .await
            .expect("state should change")
            .expect("presenter alive");
        assert_eq!(rx.borrow_and_update().pinned_messages_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unrenderable_items_are_dropped() {
        let (room, flags) = setup(true);
        let mut items = pinned(2);
        items.insert(1, TimelineItem::Virtual(VirtualTimelineItem::DateDivider));
        items.push(TimelineItem::Event(EventTimelineItem {
            event_id: Some("$state".into()),
            sender: "@a:example.org".into(),
            sender_display_name: None,
            content: EventContent::State,
            timestamp_ms: 0,
        }));
        room.publish(items);

        let handle = present(&room, &flags, None);
        let state = wait_for(&handle, |state| state.pinned_messages_count > 0).await;
        assert_eq!(state.pinned_messages_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn move_to_next_cycles_through_items() {
        let (room, flags) = setup(true);
        room.publish(pinned(3));
        let handle = present(&room, &flags, None);
        let state = wait_for(&handle, |state| state.pinned_messages_count == 3).await;

        state
            .event_sink
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        let state = wait_for(&handle, |state| state.current_pinned_message_index == 1).await;
        assert_eq!(
            state.current_pinned_message.map(|item| item.event_id),
            Some("$1".to_owned())
        );

        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        wait_for(&handle, |state| state.current_pinned_message_index == 2).await;

        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        let state = wait_for(&handle, |state| state.current_pinned_message_index == 0).await;
        assert_eq!(
            state.current_pinned_message.map(|item| item.event_id),
            Some("$0".to_owned())
        );
    }

    #[tokio::test(start_paused = true)]
    async fn shrinking_list_repairs_index() {
        let (room, flags) = setup(true);
        room.publish(pinned(3));
        let handle = present(&room, &flags, None);
        wait_for(&handle, |state| state.pinned_messages_count == 3).await;

        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        wait_for(&handle, |state| state.current_pinned_message_index == 2).await;

        room.publish(pinned(2));
        let state = wait_for(&handle, |state| state.pinned_messages_count == 2).await;
        assert_eq!(state.current_pinned_message_index, 1);

        room.publish(Vec::new());
        let state = wait_for(&handle, |state| state.pinned_messages_count == 0).await;
        assert_eq!(state.current_pinned_message_index, 0);
        assert_eq!(state.current_pinned_message, None);
    }

    #[tokio::test(start_paused = true)]
    async fn disabling_feature_closes_feed_and_clears_items() {
        let (room, flags) = setup(true);
        room.publish(pinned(2));
        let handle = present(&room, &flags, None);
        wait_for(&handle, |state| state.pinned_messages_count == 2).await;

        flags.set_enabled(FeatureFlag::PinnedEvents, false);
        wait_for(&handle, |state| state.pinned_messages_count == 0).await;
        assert_eq!(room.closed_count(), 1);

        flags.set_enabled(FeatureFlag::PinnedEvents, true);
        wait_for(&handle, |state| state.pinned_messages_count == 2).await;
        assert_eq!(room.opened_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn enabling_later_opens_feed() {
        let (room, flags) = setup(false);
        room.publish(pinned(1));
        let handle = present(&room, &flags, None);
        settle().await;
        assert_eq!(room.opened_count(), 0);

        flags.set_enabled(FeatureFlag::PinnedEvents, true);
        wait_for(&handle, |state| state.pinned_messages_count == 1).await;
        assert_eq!(room.opened_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unavailable_feed_leaves_banner_empty() {
        let (room, flags) = setup(true);
        room.set_unavailable(true);
        room.publish(pinned(2));
        let handle = present(&room, &flags, None);

        settle().await;
        assert_eq!(handle.state().pinned_messages_count, 0);
        assert_eq!(room.opened_count(), 0);

        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        settle().await;
        assert_eq!(handle.state().current_pinned_message_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn completed_feed_flushes_pending_snapshot_and_closes() {
        let (room, flags) = setup(true);
        room.publish(pinned(2));
        let start = Instant::now();
        let handle = present(&room, &flags, None);
        while room.opened_count() == 0 {
            tokio::task::yield_now().await;
        }
        room.end_feeds();

        wait_for(&handle, |state| state.pinned_messages_count == 2).await;
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);
        settle().await;
        assert_eq!(room.closed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_releases_feed() {
        let (room, flags) = setup(true);
        room.publish(pinned(1));
        let handle = present(&room, &flags, None);
        let state = wait_for(&handle, |state| state.pinned_messages_count == 1).await;

        handle.shutdown().await;
        assert_eq!(room.closed_count(), 1);

        assert!(
            state
                .event_sink
                .try_send(PinnedMessagesBannerEvent::MoveToNextPinned)
                .is_err()
        );
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_handle_releases_feed() {
        let (room, flags) = setup(true);
        room.publish(pinned(1));
        let handle = present(&room, &flags, None);
        wait_for(&handle, |state| state.pinned_messages_count == 1).await;

        drop(handle);
        settle().await;
        assert_eq!(room.closed_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn saved_position_survives_presenter_restart() {
        let (room, flags) = setup(true);
        room.publish(pinned(3));
        let handle = present(&room, &flags, None);
        wait_for(&handle, |state| state.pinned_messages_count == 3).await;
        handle
            .event_sink()
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        wait_for(&handle, |state| state.current_pinned_message_index == 1).await;

        let saved = handle.saved_state();
        assert_eq!(saved.current_pinned_message_index, 1);
        handle.shutdown().await;

        let handle = present(&room, &flags, Some(saved));
        assert_eq!(handle.saved_state(), saved);
        let state = wait_for(&handle, |state| state.pinned_messages_count == 3).await;
        assert_eq!(state.current_pinned_message_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn custom_debounce_is_honored() {
        let (room, flags) = setup(true);
        room.publish(pinned(1));
        let start = Instant::now();
        let handle =
            PinnedMessagesBannerPresenter::new(room.clone(), DefaultBannerItemFactory, flags)
                .with_debounce(Duration::from_millis(20))
                .present(None);

        wait_for(&handle, |state| state.pinned_messages_count == 1).await;
        assert!(start.elapsed() < DEFAULT_DEBOUNCE);
    }
}
