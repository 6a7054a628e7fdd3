mod config;
mod logging;

use std::time::Duration;

use config::SmokeConfig;
use lock_screen_config::LockScreenConfig;
use pinned_banner::{
    DefaultBannerItemFactory, EventContent, EventTimelineItem, FeatureFlag,
    InMemoryFeatureFlagService, InMemoryRoom, PinnedMessagesBannerEvent,
    PinnedMessagesBannerPresenter, TimelineItem, VirtualTimelineItem,
};
use tchap_patterns::{
    create_room_alias, homeserver_display_name, homeserver_name, is_external_tchap_user,
    to_display_name,
};
use tracing::{error, info};

const STATE_WAIT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() {
    logging::init();

    let config = match SmokeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            error!(error = %err, "invalid configuration");
            eprintln!("Invalid configuration: {err}");
            std::process::exit(2);
        }
    };

    let lock_screen = LockScreenConfig::default();
    info!(
        pin_mandatory = lock_screen.is_pin_mandatory,
        pin_size = lock_screen.pin_size,
        pin_checked = config.pin.is_some(),
        "lock screen policy loaded"
    );

    let homeserver = homeserver_name(&config.user_id);
    println!("User:        {}", config.user_id);
    println!("Name:        {}", to_display_name(&config.user_id));
    println!("Homeserver:  {}", homeserver_display_name(&config.user_id));
    println!("External:    {}", is_external_tchap_user(&config.user_id));
    println!(
        "Room alias:  {}",
        create_room_alias(&config.user_id, &config.alias_prefix)
    );

    let room = InMemoryRoom::new(format!("!pinned:{homeserver}"));
    room.publish(demo_pins(&config.user_id, config.pinned_count));
    let flags = InMemoryFeatureFlagService::new();
    flags.set_enabled(FeatureFlag::PinnedEvents, true);

    let handle = PinnedMessagesBannerPresenter::new(room.clone(), DefaultBannerItemFactory, flags)
        .with_debounce(config.debounce)
        .present(None);

    let mut states = handle.subscribe();
    let loaded = matches!(
        tokio::time::timeout(
            STATE_WAIT,
            states.wait_for(|state| state.pinned_messages_count == config.pinned_count),
        )
        .await,
        Ok(Ok(_))
    );
    if !loaded {
        error!("pinned messages never reached the banner");
        handle.shutdown().await;
        std::process::exit(1);
    }

    for _ in 0..=config.pinned_count {
        let state = states.borrow_and_update().clone();
        println!(
            "Banner:      {}/{} {}",
            state.current_pinned_message_index + 1,
            state.pinned_messages_count,
            state
                .current_pinned_message
                .map(|item| item.formatted)
                .unwrap_or_default()
        );
        state
            .event_sink
            .send(PinnedMessagesBannerEvent::MoveToNextPinned);
        if tokio::time::timeout(STATE_WAIT, states.changed()).await.is_err() {
            error!("banner did not advance");
            break;
        }
    }

    println!("Saved index: {}", handle.saved_state().current_pinned_message_index);
    handle.shutdown().await;
    info!(closed_feeds = room.closed_count(), "smoke run finished");
}

fn demo_pins(sender: &str, count: usize) -> Vec<TimelineItem> {
    let mut items = vec![TimelineItem::Virtual(VirtualTimelineItem::DateDivider)];
    items.extend((0..count).map(|i| {
        let content = match i % 3 {
            0 => EventContent::Text {
                body: format!("Pinned announcement #{}", i + 1),
            },
            1 => EventContent::File {
                filename: format!("compte-rendu-{}.pdf", i + 1),
            },
            _ => EventContent::Poll {
                question: format!("Question #{}?", i + 1),
            },
        };
        TimelineItem::Event(EventTimelineItem {
            event_id: Some(format!("$pinned{i}")),
            sender: sender.to_owned(),
            sender_display_name: None,
            content,
            timestamp_ms: 1_731_000_000 + i as u64,
        })
    }));
    items
}
