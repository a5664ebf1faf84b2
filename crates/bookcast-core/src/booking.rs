//! Booking domain model.

use bookcast_db::BookingRow;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{BookcastError, BookcastResult};

/// A single venue reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub venue_name: String,
    pub party_size: u32,
    #[serde(with = "iso_time")]
    pub time: DateTime<Utc>,
    pub is_confirmed: bool,
}

impl Booking {
    /// Create an unconfirmed booking.
    pub fn new(
        id: impl Into<String>,
        venue_name: impl Into<String>,
        party_size: u32,
        time: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            venue_name: venue_name.into(),
            party_size,
            time,
            is_confirmed: false,
        }
    }

    /// Check the admission rules shared by every ingestion path.
    pub fn validate(&self) -> BookcastResult<()> {
        if self.id.trim().is_empty() {
            return Err(BookcastError::validation("id must not be empty"));
        }
        if self.venue_name.trim().is_empty() {
            return Err(BookcastError::validation("venueName must not be empty"));
        }
        if self.party_size < 1 {
            return Err(BookcastError::validation(format!(
                "partySize must be at least 1, got {}",
                self.party_size
            )));
        }
        Ok(())
    }

    /// Build a validated booking from a stored row.
    pub fn try_from_row(row: BookingRow) -> BookcastResult<Self> {
        let party_size = u32::try_from(row.party_size).map_err(|_| {
            BookcastError::validation(format!(
                "partySize must be at least 1, got {}",
                row.party_size
            ))
        })?;

        let time = DateTime::parse_from_rfc3339(&row.time)
            .map_err(|e| BookcastError::validation(format!("invalid time '{}': {}", row.time, e)))?
            .with_timezone(&Utc);

        let booking = Self {
            id: row.id,
            venue_name: row.venue_name,
            party_size,
            time,
            is_confirmed: row.is_confirmed,
        };
        booking.validate()?;
        Ok(booking)
    }

    /// Convert to the on-disk representation.
    pub fn to_row(&self) -> BookingRow {
        BookingRow {
            id: self.id.clone(),
            venue_name: self.venue_name.clone(),
            party_size: i64::from(self.party_size),
            time: format_time(&self.time),
            is_confirmed: self.is_confirmed,
        }
    }
}

/// ISO-8601 UTC with millisecond precision, e.g. `2024-01-01T12:00:00.000Z`.
pub fn format_time(time: &DateTime<Utc>) -> String {
    time.to_rfc3339_opts(SecondsFormat::Millis, true)
}

mod iso_time {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&super::format_time(time))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(party_size: i64, time: &str) -> BookingRow {
        BookingRow {
            id: "b1".to_string(),
            venue_name: "Azure Room".to_string(),
            party_size,
            time: time.to_string(),
            is_confirmed: false,
        }
    }

    #[test]
    fn test_row_conversion_keeps_fields() {
        let booking = Booking::try_from_row(row(4, "2024-01-01T12:00:00Z")).unwrap();
        assert_eq!(booking.party_size, 4);
        assert_eq!(booking.time.to_rfc3339(), "2024-01-01T12:00:00+00:00");

        let back = booking.to_row();
        assert_eq!(back.time, "2024-01-01T12:00:00.000Z");
        assert_eq!(Booking::try_from_row(back).unwrap(), booking);
    }

    #[test]
    fn test_row_with_offset_is_normalized_to_utc() {
        let booking = Booking::try_from_row(row(2, "2024-01-01T14:00:00+02:00")).unwrap();
        assert_eq!(booking.to_row().time, "2024-01-01T12:00:00.000Z");
    }

    #[test]
    fn test_invalid_rows_are_rejected() {
        assert!(Booking::try_from_row(row(0, "2024-01-01T12:00:00Z")).is_err());
        assert!(Booking::try_from_row(row(-3, "2024-01-01T12:00:00Z")).is_err());
        assert!(Booking::try_from_row(row(4, "yesterday")).is_err());

        let mut blank_venue = row(4, "2024-01-01T12:00:00Z");
        blank_venue.venue_name = "   ".to_string();
        assert!(Booking::try_from_row(blank_venue).is_err());
    }

    #[test]
    fn test_wire_format_is_camel_case() {
        let booking = Booking::try_from_row(row(4, "2024-01-01T12:00:00Z")).unwrap();
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["venueName"], "Azure Room");
        assert_eq!(json["partySize"], 4);
        assert_eq!(json["time"], "2024-01-01T12:00:00.000Z");
        assert_eq!(json["isConfirmed"], false);
    }
}
