//! Synthetic booking source.
//!
//! Stands in for a real reservation feed: every tick it fabricates one
//! booking and submits it through the hub's ingestion path.

use chrono::{DateTime, Duration as ChronoDuration, SubsecRound, Utc};
use rand::Rng;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::booking::Booking;
use crate::error::BookcastError;
use crate::hub::HubHandle;

/// Venues the generator picks from.
pub const VENUE_CATALOG: &[&str] = &[
    "Grand Hall",
    "Sunset Lounge",
    "Azure Room",
    "Emerald Suite",
    "Crystal Ballroom",
    "Sapphire Deck",
    "Ruby Quarters",
];

/// Inclusive party size range.
pub const PARTY_SIZE_RANGE: (u32, u32) = (2, 11);

/// Inclusive booking time offset from now, in minutes.
pub const TIME_OFFSET_MINUTES: (i64, i64) = (-30, 29);

const ID_SUFFIX_LEN: usize = 9;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Produce a booking relative to the current time.
pub fn generate_booking() -> Booking {
    generate_booking_with(&mut rand::thread_rng(), Utc::now())
}

/// Produce a booking from an explicit random source and clock reading.
pub fn generate_booking_with<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> Booking {
    let now = now.trunc_subsecs(3);
    let venue = VENUE_CATALOG[rng.gen_range(0..VENUE_CATALOG.len())];
    let party_size = rng.gen_range(PARTY_SIZE_RANGE.0..=PARTY_SIZE_RANGE.1);
    let offset = rng.gen_range(TIME_OFFSET_MINUTES.0..=TIME_OFFSET_MINUTES.1);

    Booking::new(
        generate_id(rng, now),
        venue,
        party_size,
        now + ChronoDuration::minutes(offset),
    )
}

/// Millisecond timestamp plus a random base-36 suffix, e.g. `1704110400000-k3j9x0a1b`.
pub fn generate_id<R: Rng>(rng: &mut R, now: DateTime<Utc>) -> String {
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();
    format!("{}-{}", now.timestamp_millis(), suffix)
}

/// Submit one generated booking every `period` until cancelled.
///
/// The first booking arrives one full period after start.
pub async fn run(hub: HubHandle, period: Duration, shutdown: CancellationToken) {
    info!(period_ms = period.as_millis() as u64, "Booking generator started");

    let mut ticker = tokio::time::interval(period);
    // A stalled save must not be followed by a burst of catch-up bookings.
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                info!("Booking generator stopping");
                break;
            }
            _ = ticker.tick() => {
                let booking = generate_booking();
                if let Err(e) = booking.validate() {
                    warn!(booking_id = %booking.id, error = %e, "Skipping malformed generated booking");
                    continue;
                }

                match hub.submit(booking).await {
                    Ok(booking) => debug!(booking_id = %booking.id, venue = %booking.venue_name, "Generated booking"),
                    Err(BookcastError::HubClosed) => {
                        warn!("Hub closed, booking generator stopping");
                        break;
                    }
                    Err(e) => warn!(error = %e, "Generated booking was not admitted"),
                }
            }
        }
    }
}
