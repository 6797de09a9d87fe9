use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::entities::sell_listing::ListingStatus;
use crate::metrics::LISTING_METRICS;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Sends an event asynchronously
    pub async fn send(&self, event: Event) -> Result<(), String> {
        self.sender
            .send(event)
            .await
            .map_err(|e| format!("Failed to send event: {}", e))
    }

    /// Sends an event, logging instead of failing when the processor is gone.
    /// Events are emitted after commit, so a lost event never affects the
    /// stored outcome.
    pub async fn send_or_log(&self, event: Event) {
        if let Err(e) = self.send(event).await {
            warn!(error = %e, "Dropping activity event");
        }
    }
}

/// Activity that happened in the back office
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    SellListingSubmitted {
        listing_id: i32,
        image_count: usize,
    },
    SellListingApproved {
        listing_id: i32,
        car_id: i32,
        brand_id: i32,
    },
    SellListingRejected {
        listing_id: i32,
        reason: String,
    },
    SellListingStatusChanged {
        listing_id: i32,
        old_status: ListingStatus,
        new_status: ListingStatus,
    },
    SellListingDeleted(i32),
    BrandCreated {
        brand_id: i32,
        name: String,
    },
}

/// Creates the event channel used by the application
pub fn channel(capacity: usize) -> (EventSender, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(capacity);
    (EventSender::new(tx), rx)
}

/// Logs each event and bumps the matching activity counter
pub fn handle_event(event: &Event) {
    match event {
        Event::SellListingSubmitted {
            listing_id,
            image_count,
        } => {
            LISTING_METRICS.listings_submitted.inc();
            info!(listing_id, image_count, "Sell listing submitted");
        }
        Event::SellListingApproved {
            listing_id,
            car_id,
            brand_id,
        } => {
            LISTING_METRICS.listings_approved.inc();
            LISTING_METRICS.cars_published.inc();
            info!(listing_id, car_id, brand_id, "Sell listing approved");
        }
        Event::SellListingRejected { listing_id, reason } => {
            LISTING_METRICS.listings_rejected.inc();
            info!(listing_id, reason = %reason, "Sell listing rejected");
        }
        Event::SellListingStatusChanged {
            listing_id,
            old_status,
            new_status,
        } => {
            LISTING_METRICS.listings_status_changed.inc();
            info!(
                listing_id,
                old_status = %old_status,
                new_status = %new_status,
                "Sell listing status changed"
            );
        }
        Event::SellListingDeleted(listing_id) => {
            LISTING_METRICS.listings_deleted.inc();
            info!(listing_id, "Sell listing deleted");
        }
        Event::BrandCreated { brand_id, name } => {
            LISTING_METRICS.brands_created.inc();
            info!(brand_id, name = %name, "Brand created");
        }
    }
}

pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        handle_event(&event);
    }

    warn!("Event processing loop has ended");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn events_reach_the_receiver_in_order() {
        let (sender, mut rx) = channel(4);
        sender
            .send(Event::SellListingDeleted(1))
            .await
            .unwrap();
        sender
            .send_or_log(Event::BrandCreated {
                brand_id: 2,
                name: "Honda".into(),
            })
            .await;

        assert_eq!(rx.recv().await, Some(Event::SellListingDeleted(1)));
        assert!(matches!(
            rx.recv().await,
            Some(Event::BrandCreated { brand_id: 2, .. })
        ));
    }

    #[tokio::test]
    async fn send_or_log_swallows_closed_channel() {
        let (sender, rx) = channel(1);
        drop(rx);
        assert!(sender.send(Event::SellListingDeleted(3)).await.is_err());
        sender.send_or_log(Event::SellListingDeleted(3)).await;
    }

    #[test]
    fn handled_events_bump_activity_counters() {
        let before = LISTING_METRICS.listings_deleted.get();
        handle_event(&Event::SellListingDeleted(9));
        assert!(LISTING_METRICS.listings_deleted.get() > before);
    }
}
