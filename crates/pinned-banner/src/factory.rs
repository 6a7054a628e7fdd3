use tchap_patterns::{name_from_display_name, to_display_name};

use crate::types::{EventContent, EventTimelineItem, PinnedMessagesBannerItem, TimelineItem};

/// Turns raw pinned timeline items into banner items.
pub trait PinnedMessagesBannerItemFactory: Send + 'static {
    /// Banner item for `item`, or `None` when it cannot be shown.
    fn create(&self, item: &TimelineItem) -> Option<PinnedMessagesBannerItem>;
}

impl<F> PinnedMessagesBannerItemFactory for F
where
    F: Fn(&TimelineItem) -> Option<PinnedMessagesBannerItem> + Send + 'static,
{
    fn create(&self, item: &TimelineItem) -> Option<PinnedMessagesBannerItem> {
        self(item)
    }
}

/// One-line summaries of message events.
///
/// Virtual items, local echoes and state events are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultBannerItemFactory;

impl PinnedMessagesBannerItemFactory for DefaultBannerItemFactory {
    fn create(&self, item: &TimelineItem) -> Option<PinnedMessagesBannerItem> {
        let TimelineItem::Event(event) = item else {
            return None;
        };
        let event_id = event.event_id.clone()?;
        let formatted = format_content(event)?;
        Some(PinnedMessagesBannerItem {
            event_id,
            formatted,
        })
    }
}

fn format_content(event: &EventTimelineItem) -> Option<String> {
    let formatted = match &event.content {
        EventContent::Text { body } | EventContent::Notice { body } => body.clone(),
        EventContent::Emote { body } => format!("* {} {body}", sender_name(event)),
        EventContent::Image { filename } => format!("Image: {filename}"),
        EventContent::Video { filename } => format!("Video: {filename}"),
        EventContent::Audio { filename } => format!("Audio: {filename}"),
        EventContent::File { filename } => format!("File: {filename}"),
        EventContent::Location { .. } => "Shared location".to_owned(),
        EventContent::Poll { question } => format!("Poll: {question}"),
        EventContent::Redacted => "Message removed".to_owned(),
        EventContent::UnableToDecrypt => "Waiting for this message".to_owned(),
        EventContent::State => return None,
    };
    Some(formatted)
}

fn sender_name(event: &EventTimelineItem) -> String {
    event
        .sender_display_name
        .as_deref()
        .map(name_from_display_name)
        .filter(|name| !name.is_empty())
        .map_or_else(|| to_display_name(&event.sender), str::to_owned)
}
