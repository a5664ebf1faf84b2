//! Bookcast Core Library
//!
//! Booking model, bounded store, synthetic generator and the broadcast hub
//! that fans booking events out to connected observers.

pub mod booking;
pub mod config;
pub mod error;
pub mod event;
pub mod generator;
pub mod hub;
pub mod store;

pub use booking::Booking;
pub use config::ServerConfig;
pub use error::{BookcastError, BookcastResult};
pub use event::{ClientIntent, ServerEvent};
pub use hub::{BroadcastHub, HubHandle, Observer, ObserverId};
pub use store::BookingStore;
