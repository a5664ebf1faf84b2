//! Bounded, newest-first booking store.
//!
//! The store is the only writable copy of the booking list. Every successful
//! mutation is mirrored to the backing file before it returns, so the file
//! trails memory by at most the mutation in flight.

use bookcast_db::{BookingFile, BookingRow};
use std::collections::VecDeque;
use tracing::{debug, error, info, warn};

use crate::booking::Booking;
use crate::error::{BookcastError, BookcastResult};

pub struct BookingStore {
    bookings: VecDeque<Booking>,
    max: usize,
    file: BookingFile,
}

impl BookingStore {
    /// Open a store over `file`, keeping at most `max` bookings.
    ///
    /// Unreadable files start the store empty. Rows that fail validation are
    /// skipped and anything beyond `max` is discarded.
    pub async fn open(file: BookingFile, max: usize) -> Self {
        let rows = file.load().await;
        Self::from_rows(file, rows, max)
    }

    /// Like [`BookingStore::open`], but an unreadable file is an error.
    pub async fn try_open(file: BookingFile, max: usize) -> BookcastResult<Self> {
        let rows = file.try_load().await?;
        Ok(Self::from_rows(file, rows, max))
    }

    fn from_rows(file: BookingFile, rows: Vec<BookingRow>, max: usize) -> Self {
        let max = max.max(1);
        let mut bookings: VecDeque<Booking> = VecDeque::new();

        for row in rows {
            let id = row.id.clone();
            match Booking::try_from_row(row) {
                Ok(booking) if bookings.iter().any(|b| b.id == booking.id) => {
                    warn!(booking_id = %id, "Skipping duplicate stored booking");
                }
                Ok(booking) => bookings.push_back(booking),
                Err(e) => warn!(booking_id = %id, error = %e, "Skipping invalid stored booking"),
            }
        }

        if bookings.len() > max {
            info!(loaded = bookings.len(), max, "Truncating stored bookings to bound");
            bookings.truncate(max);
        }

        Self {
            bookings,
            max,
            file,
        }
    }

    /// Admit a booking at the front, evicting from the back past the bound.
    pub async fn insert_newest(&mut self, booking: Booking) -> BookcastResult<Booking> {
        if let Err(e) = booking.validate() {
            warn!(booking_id = %booking.id, error = %e, "Dropping invalid booking");
            return Err(e);
        }
        if self.find_by_id(&booking.id).is_some() {
            warn!(booking_id = %booking.id, "Dropping booking with duplicate id");
            return Err(BookcastError::validation(format!(
                "duplicate booking id '{}'",
                booking.id
            )));
        }

        self.bookings.push_front(booking.clone());
        while self.bookings.len() > self.max {
            if let Some(evicted) = self.bookings.pop_back() {
                debug!(booking_id = %evicted.id, "Evicted oldest booking");
            }
        }

        self.persist().await;
        Ok(booking)
    }

    pub fn find_by_id(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    /// Mark a booking confirmed and return its new state.
    ///
    /// Confirming an already confirmed booking succeeds and persists again.
    pub async fn confirm(&mut self, id: &str) -> BookcastResult<Booking> {
        let Some(booking) = self.bookings.iter_mut().find(|b| b.id == id) else {
            warn!(booking_id = %id, "Booking not found for confirmation");
            return Err(BookcastError::BookingNotFound(id.to_string()));
        };

        if booking.is_confirmed {
            debug!(booking_id = %id, "Booking already confirmed");
        }
        booking.is_confirmed = true;
        let updated = booking.clone();

        self.persist().await;
        Ok(updated)
    }

    /// Owned copy of the list, newest first.
    pub fn snapshot(&self) -> Vec<Booking> {
        self.bookings.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max
    }

    async fn persist(&self) {
        let rows: Vec<_> = self.bookings.iter().map(Booking::to_row).collect();
        if let Err(e) = self.file.save(&rows, self.max).await {
            error!(path = %self.file.path().display(), error = %e, "Failed to save bookings");
        }
    }
}
