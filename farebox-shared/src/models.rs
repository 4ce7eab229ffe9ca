use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bus summary as embedded in a booking record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Bus {
    pub bus_name: String,
    pub number: String,
    pub origin: String,
    pub destination: String,
    pub price: f64,
}

/// A single seat on a bus.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Seat {
    pub id: i64,
    pub seat_number: String,
    pub is_booked: bool,
}

/// A reserved seat on a bus, created and owned by the remote booking
/// service. Read-only on this side: the client never mutates a booking.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Booking {
    pub id: i64,
    #[serde(default)]
    pub user: Option<String>,
    pub bus: Bus,
    pub seat: Seat,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    pub booking_time: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booking_wire_shape() {
        let raw = r#"{
            "id": 7,
            "user": "asha",
            "bus": {
                "bus_name": "Garuda Express",
                "number": "KA-01-F-2201",
                "origin": "Bangalore",
                "destination": "Chennai",
                "price": 500.0
            },
            "seat": { "id": 41, "seat_number": "12A", "is_booked": true },
            "origin": null,
            "destination": null,
            "price": null,
            "booking_time": "2024-06-12T09:00:00Z"
        }"#;

        let booking: Booking = serde_json::from_str(raw).unwrap();
        assert_eq!(booking.id, 7);
        assert_eq!(booking.bus.price, 500.0);
        assert_eq!(booking.seat.seat_number, "12A");
        assert!(booking.origin.is_none());
    }
}
