//! Broadcast hub.
//!
//! The hub owns the booking store and the set of connected observers. All
//! mutations and membership changes arrive as commands on one queue and are
//! applied in order by a single task, so no two mutations ever interleave and
//! a new observer's snapshot is always queued ahead of any later event.

use std::collections::HashMap;
use std::fmt;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::booking::Booking;
use crate::error::{BookcastError, BookcastResult};
use crate::event::ServerEvent;
use crate::store::BookingStore;

/// Default command queue capacity.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Connection-scoped observer identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer-{}", self.0)
    }
}

/// A registered observer and its outbound event queue.
#[derive(Debug)]
pub struct Observer {
    pub id: ObserverId,
    pub events: mpsc::UnboundedReceiver<ServerEvent>,
}

enum Command {
    Connect {
        reply: oneshot::Sender<Observer>,
    },
    Disconnect {
        observer: ObserverId,
    },
    Confirm {
        observer: ObserverId,
        booking_id: String,
    },
    Submit {
        booking: Booking,
        reply: oneshot::Sender<BookcastResult<Booking>>,
    },
    List {
        reply: oneshot::Sender<Vec<Booking>>,
    },
}

/// Store plus observer set.
pub struct BroadcastHub {
    store: BookingStore,
    observers: HashMap<ObserverId, mpsc::UnboundedSender<ServerEvent>>,
    next_id: u64,
}

impl BroadcastHub {
    pub fn new(store: BookingStore) -> Self {
        Self {
            store,
            observers: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn store(&self) -> &BookingStore {
        &self.store
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Register an observer and queue its snapshot.
    pub fn connect(&mut self) -> Observer {
        self.next_id += 1;
        let id = ObserverId(self.next_id);
        let (tx, events) = mpsc::unbounded_channel();
        self.observers.insert(id, tx);

        let snapshot = self.store.snapshot();
        info!(observer = %id, bookings = snapshot.len(), observers = self.observers.len(), "Observer connected");
        self.send_to_one(id, ServerEvent::Snapshot(snapshot));

        Observer { id, events }
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        if self.observers.remove(&id).is_some() {
            info!(observer = %id, observers = self.observers.len(), "Observer disconnected");
        }
    }

    /// Deliver to a single observer. Returns whether it was delivered.
    pub fn send_to_one(&mut self, id: ObserverId, event: ServerEvent) -> bool {
        let Some(tx) = self.observers.get(&id) else {
            debug!(observer = %id, kind = event.kind(), "Dropping event for unknown observer");
            return false;
        };

        if tx.send(event).is_err() {
            warn!(observer = %id, "Observer channel closed, removing");
            self.observers.remove(&id);
            return false;
        }
        true
    }

    /// Deliver to every observer. Returns the number reached.
    pub fn send_to_all(&mut self, event: ServerEvent) -> usize {
        let mut closed = Vec::new();
        for (id, tx) in &self.observers {
            if tx.send(event.clone()).is_err() {
                closed.push(*id);
            }
        }

        for id in &closed {
            warn!(observer = %id, "Observer channel closed, removing");
            self.observers.remove(id);
        }

        let delivered = self.observers.len();
        debug!(kind = event.kind(), delivered, "Broadcast event");
        delivered
    }

    /// Ingest a booking and announce it to everyone.
    pub async fn submit(&mut self, booking: Booking) -> BookcastResult<Booking> {
        let booking = self.store.insert_newest(booking).await?;
        info!(booking_id = %booking.id, venue = %booking.venue_name, party_size = booking.party_size, "New booking");
        self.send_to_all(ServerEvent::Created(booking.clone()));
        Ok(booking)
    }

    /// Apply a confirm intent from `observer` and announce the new state.
    ///
    /// Unknown ids are logged by the store and produce no event.
    pub async fn confirm(&mut self, observer: ObserverId, booking_id: &str) -> BookcastResult<Booking> {
        let booking = self.store.confirm(booking_id).await?;
        info!(observer = %observer, booking_id = %booking.id, "Booking confirmed");
        self.send_to_all(ServerEvent::Updated(booking.clone()));
        Ok(booking)
    }

    /// Move the hub onto its own task and return a handle to it.
    ///
    /// The task ends once every handle has been dropped.
    pub fn spawn(self, capacity: usize) -> (HubHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let task = tokio::spawn(self.run(rx));
        (HubHandle { tx }, task)
    }

    async fn run(mut self, mut rx: mpsc::Receiver<Command>) {
        info!(bookings = self.store.len(), max = self.store.capacity(), "Broadcast hub started");

        while let Some(command) = rx.recv().await {
            match command {
                Command::Connect { reply } => {
                    let observer = self.connect();
                    let id = observer.id;
                    if reply.send(observer).is_err() {
                        self.disconnect(id);
                    }
                }
                Command::Disconnect { observer } => self.disconnect(observer),
                Command::Confirm { observer, booking_id } => {
                    // Failures are already logged where they occur.
                    let _ = self.confirm(observer, &booking_id).await;
                }
                Command::Submit { booking, reply } => {
                    let _ = reply.send(self.submit(booking).await);
                }
                Command::List { reply } => {
                    let _ = reply.send(self.store.snapshot());
                }
            }
        }

        info!("Broadcast hub stopped");
    }
}

/// Cloneable handle for talking to a running hub.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<Command>,
}

impl HubHandle {
    /// Join as a new observer. The first event received is the snapshot.
    pub async fn connect(&self) -> BookcastResult<Observer> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Connect { reply }).await?;
        rx.await.map_err(|_| BookcastError::HubClosed)
    }

    pub async fn disconnect(&self, observer: ObserverId) {
        let _ = self.tx.send(Command::Disconnect { observer }).await;
    }

    /// Queue a confirm intent. The outcome arrives as an `updated` event.
    pub async fn confirm(&self, observer: ObserverId, booking_id: impl Into<String>) -> BookcastResult<()> {
        self.send(Command::Confirm {
            observer,
            booking_id: booking_id.into(),
        })
        .await
    }

    /// Ingest a booking from any source.
    pub async fn submit(&self, booking: Booking) -> BookcastResult<Booking> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Submit { booking, reply }).await?;
        rx.await.map_err(|_| BookcastError::HubClosed)?
    }

    /// Current list, newest first.
    pub async fn list(&self) -> BookcastResult<Vec<Booking>> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::List { reply }).await?;
        rx.await.map_err(|_| BookcastError::HubClosed)
    }

    async fn send(&self, command: Command) -> BookcastResult<()> {
        self.tx.send(command).await.map_err(|_| BookcastError::HubClosed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookcast_db::BookingFile;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn booking(id: &str) -> Booking {
        Booking::new(id, "Azure Room", 4, Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap())
    }

    async fn new_hub(dir: &TempDir, max: usize) -> BroadcastHub {
        let file = BookingFile::new(dir.path().join("bookings.json"));
        BroadcastHub::new(BookingStore::open(file, max).await)
    }

    #[tokio::test]
    async fn test_connect_receives_snapshot_only() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        hub.submit(booking("b1")).await.unwrap();

        let mut observer = hub.connect();

        assert_eq!(observer.events.try_recv().unwrap(), ServerEvent::Snapshot(vec![booking("b1")]));
        assert!(observer.events.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_empty_store_sends_empty_snapshot() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;

        let mut observer = hub.connect();

        assert_eq!(observer.events.try_recv().unwrap(), ServerEvent::Snapshot(Vec::new()));
    }

    #[tokio::test]
    async fn test_submit_broadcasts_created_to_all() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        let mut a = hub.connect();
        let mut b = hub.connect();
        a.events.try_recv().unwrap();
        b.events.try_recv().unwrap();

        hub.submit(booking("b1")).await.unwrap();

        assert_eq!(a.events.try_recv().unwrap(), ServerEvent::Created(booking("b1")));
        assert_eq!(b.events.try_recv().unwrap(), ServerEvent::Created(booking("b1")));
    }

    #[tokio::test]
    async fn test_invalid_submit_broadcasts_nothing() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        let mut observer = hub.connect();
        observer.events.try_recv().unwrap();

        let mut invalid = booking("b1");
        invalid.party_size = 0;

        assert!(hub.submit(invalid).await.is_err());
        assert!(observer.events.try_recv().is_err());
        assert!(hub.store().is_empty());
    }

    #[tokio::test]
    async fn test_confirm_broadcasts_updated_and_persists() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        hub.submit(booking("b1")).await.unwrap();
        let mut a = hub.connect();
        let mut b = hub.connect();
        a.events.try_recv().unwrap();
        b.events.try_recv().unwrap();

        hub.confirm(a.id, "b1").await.unwrap();

        let mut confirmed = booking("b1");
        confirmed.is_confirmed = true;
        assert_eq!(a.events.try_recv().unwrap(), ServerEvent::Updated(confirmed.clone()));
        assert_eq!(b.events.try_recv().unwrap(), ServerEvent::Updated(confirmed));

        let rows = BookingFile::new(dir.path().join("bookings.json")).load().await;
        assert!(rows[0].is_confirmed);
    }

    #[tokio::test]
    async fn test_reconfirm_broadcasts_again() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        hub.submit(booking("b1")).await.unwrap();
        let mut observer = hub.connect();
        observer.events.try_recv().unwrap();

        hub.confirm(observer.id, "b1").await.unwrap();
        hub.confirm(observer.id, "b1").await.unwrap();

        assert!(matches!(observer.events.try_recv(), Ok(ServerEvent::Updated(_))));
        assert!(matches!(observer.events.try_recv(), Ok(ServerEvent::Updated(_))));
        assert_eq!(hub.store().len(), 1);
    }

    #[tokio::test]
    async fn test_confirm_unknown_id_broadcasts_nothing() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        hub.submit(booking("b1")).await.unwrap();
        let mut observer = hub.connect();
        observer.events.try_recv().unwrap();

        let result = hub.confirm(observer.id, "nonexistent").await;

        assert!(matches!(result, Err(BookcastError::BookingNotFound(_))));
        assert!(observer.events.try_recv().is_err());
        assert_eq!(hub.store().snapshot(), vec![booking("b1")]);
    }

    #[tokio::test]
    async fn test_closed_observers_are_pruned() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        let gone = hub.connect();
        let mut kept = hub.connect();
        kept.events.try_recv().unwrap();
        drop(gone);

        let delivered = hub.send_to_all(ServerEvent::Created(booking("b1")));

        assert_eq!(delivered, 1);
        assert_eq!(hub.observer_count(), 1);
        assert!(kept.events.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_send_to_one_targets_single_observer() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        let mut a = hub.connect();
        let mut b = hub.connect();
        a.events.try_recv().unwrap();
        b.events.try_recv().unwrap();

        assert!(hub.send_to_one(b.id, ServerEvent::Snapshot(Vec::new())));

        assert!(a.events.try_recv().is_err());
        assert!(b.events.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_disconnect_only_changes_membership() {
        let dir = TempDir::new().unwrap();
        let mut hub = new_hub(&dir, 50).await;
        hub.submit(booking("b1")).await.unwrap();
        let observer = hub.connect();

        hub.disconnect(observer.id);

        assert_eq!(hub.observer_count(), 0);
        assert_eq!(hub.store().len(), 1);
    }

    #[tokio::test]
    async fn test_spawned_hub_serializes_commands() {
        let dir = TempDir::new().unwrap();
        let hub = new_hub(&dir, 50).await;
        let (handle, task) = hub.spawn(DEFAULT_QUEUE_CAPACITY);

        let mut observer = handle.connect().await.unwrap();
        assert_eq!(observer.events.recv().await.unwrap(), ServerEvent::Snapshot(Vec::new()));

        handle.submit(booking("b1")).await.unwrap();
        assert_eq!(observer.events.recv().await.unwrap(), ServerEvent::Created(booking("b1")));

        handle.confirm(observer.id, "nonexistent").await.unwrap();
        handle.confirm(observer.id, "b1").await.unwrap();
        match observer.events.recv().await.unwrap() {
            ServerEvent::Updated(b) => assert!(b.id == "b1" && b.is_confirmed),
            other => panic!("unexpected event {other:?}"),
        }

        assert_eq!(handle.list().await.unwrap().len(), 1);

        handle.disconnect(observer.id).await;
        drop(handle);
        task.await.unwrap();
        assert!(observer.events.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_handle_reports_closed_hub() {
        let dir = TempDir::new().unwrap();
        let hub = new_hub(&dir, 50).await;
        let (handle, task) = hub.spawn(1);
        task.abort();
        let _ = task.await;

        assert!(matches!(handle.list().await, Err(BookcastError::HubClosed)));
    }
}
