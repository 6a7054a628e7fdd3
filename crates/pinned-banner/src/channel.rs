use std::fmt;

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::{
    model::{BannerModel, PinnedMessagesBannerState},
    types::{PinnedMessagesBannerEvent, SavedBannerState},
};

/// Errors returned by banner channel operations.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum BannerChannelError {
    /// The presenter task has stopped.
    #[error("banner presenter is no longer running")]
    PresenterStopped,
}

/// Entry point for UI events, handed out with every published state.
#[derive(Clone)]
pub struct BannerEventSink {
    tx: mpsc::UnboundedSender<PinnedMessagesBannerEvent>,
}

impl BannerEventSink {
    /// Forward an event to the presenter, reporting whether it is still running.
    pub fn try_send(&self, event: PinnedMessagesBannerEvent) -> Result<(), BannerChannelError> {
        self.tx
            .send(event)
            .map_err(|_| BannerChannelError::PresenterStopped)
    }

    /// Forward an event to the presenter.
    ///
    /// Events sent after shutdown are dropped.
    pub fn send(&self, event: PinnedMessagesBannerEvent) {
        if self.try_send(event).is_err() {
            trace!(?event, "banner event dropped after presenter shutdown");
        }
    }
}

impl fmt::Debug for BannerEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BannerEventSink")
            .field("closed", &self.tx.is_closed())
            .finish()
    }
}

impl PartialEq for BannerEventSink {
    fn eq(&self, other: &Self) -> bool {
        self.tx.same_channel(&other.tx)
    }
}

impl Eq for BannerEventSink {}

/// Presenter-side ends of the state/event channels.
#[derive(Debug)]
pub(crate) struct BannerChannels {
    sink: BannerEventSink,
    state_tx: watch::Sender<PinnedMessagesBannerState>,
    saved_tx: watch::Sender<SavedBannerState>,
}

impl BannerChannels {
    /// Create the channel set and return it with the event receiver.
    pub(crate) fn new(
        model: &BannerModel,
    ) -> (Self, mpsc::UnboundedReceiver<PinnedMessagesBannerEvent>) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let sink = BannerEventSink { tx: event_tx };
        let (state_tx, _) = watch::channel(model.state(&sink));
        let (saved_tx, _) = watch::channel(model.saved_state());

        (
            Self {
                sink,
                state_tx,
                saved_tx,
            },
            event_rx,
        )
    }

    pub(crate) fn event_sink(&self) -> BannerEventSink {
        self.sink.clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<PinnedMessagesBannerState> {
        self.state_tx.subscribe()
    }

    pub(crate) fn subscribe_saved(&self) -> watch::Receiver<SavedBannerState> {
        self.saved_tx.subscribe()
    }

    /// Publish the model to every state subscriber.
    pub(crate) fn publish(&self, model: &BannerModel) {
        self.state_tx.send_replace(model.state(&self.sink));
        self.saved_tx.send_replace(model.saved_state());
    }
}
