//! Entity definitions for every stored collection.
//!
//! Field names are serialized in camelCase so the stored JSON matches what the
//! front-end reads and writes (`totalCapacity`, `clientName`, `companyName`, ...).
//! Capacities and amounts are JSON numbers and may be fractional or negative
//! (refunds). Whole values are written back without a fractional part.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};

/// Largest magnitude below which every whole `f64` is an exact integer.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Writes whole numbers as integers (`50000`, not `50000.0`).
fn number<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.abs() < MAX_EXACT_INTEGER {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}

/// A storage facility.
///
/// `used_capacity` is expected to stay within `total_capacity`, but nothing
/// enforces it; seeded and stored data are taken as they are.
///
/// ```rust
/// use warehouse_store::models::Warehouse;
///
/// let json = r#"{"id":"1","name":"North Seattle Warehouse","location":"Seattle, WA","totalCapacity":50000,"usedCapacity":35000}"#;
/// let warehouse: Warehouse = serde_json::from_str(json)?;
/// assert_eq!(warehouse.available_capacity(), 15000.0);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Warehouse {
    pub id: String,
    pub name: String,
    pub location: String,
    /// Square feet.
    #[serde(serialize_with = "number")]
    pub total_capacity: f64,
    /// Square feet.
    #[serde(serialize_with = "number")]
    pub used_capacity: f64,
}

impl Warehouse {
    /// Free space in square feet, saturating at zero for over-committed sites.
    pub fn available_capacity(&self) -> f64 {
        (self.total_capacity - self.used_capacity).max(0.0)
    }

    /// Share of the total capacity in use, in percent. Zero when the site has no capacity.
    pub fn usage_percentage(&self) -> f64 {
        if self.total_capacity <= 0.0 {
            return 0.0;
        }
        self.used_capacity / self.total_capacity * 100.0
    }
}

/// Fields supplied by the warehouse-creation form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWarehouse {
    pub name: String,
    pub location: String,
    #[serde(serialize_with = "number")]
    pub total_capacity: f64,
}

/// A customer renting space. `warehouse_id` is a weak reference: it is never
/// checked against the warehouses collection and may dangle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "number")]
    pub allocated_space: f64,
    pub warehouse_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewClient {
    pub name: String,
    pub email: String,
    #[serde(serialize_with = "number")]
    pub allocated_space: f64,
    pub warehouse_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentMode {
    #[serde(rename = "COD")]
    Cod,
    Credit,
    #[serde(rename = "UPI")]
    Upi,
    Refund,
}

/// Lifecycle state of an order. The only order field edited after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    Accepted,
    Ongoing,
    Delivered,
    Rejected,
    Cancelled,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 5] = [
        OrderStatus::Accepted,
        OrderStatus::Ongoing,
        OrderStatus::Delivered,
        OrderStatus::Rejected,
        OrderStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Accepted => "Accepted",
            OrderStatus::Ongoing => "Ongoing",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Rejected => "Rejected",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl Display for OrderStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

/// A customer order. `client_id`/`client_name` and `warehouse_id` are
/// denormalized weak references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub order_number: String,
    /// ISO-8601 timestamp, kept as text so stored values round-trip untouched.
    pub date: String,
    #[serde(serialize_with = "number")]
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub invoice_id: String,
    pub status: OrderStatus,
    pub warehouse_id: String,
}

impl Order {
    pub fn parsed_date(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|d| d.with_timezone(&Utc))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub client_id: String,
    pub client_name: String,
    pub order_number: String,
    pub date: String,
    #[serde(serialize_with = "number")]
    pub amount: f64,
    pub payment_mode: PaymentMode,
    pub invoice_id: String,
    pub status: OrderStatus,
    pub warehouse_id: String,
}

/// An entry of the `users` collection. The password is stored and compared in
/// plain text; this login is a placeholder, not a security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUser {
    pub name: String,
    pub company_name: String,
    pub email: String,
    pub password: String,
}

/// The active login, persisted under the `user` key without credentials.
///
/// Sessions written before expiry tracking existed carry neither timestamp and
/// are treated as never expiring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub name: String,
    pub company_name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }
}

impl From<&RegisteredUser> for Session {
    fn from(user: &RegisteredUser) -> Self {
        Session {
            name: user.name.clone(),
            company_name: user.company_name.clone(),
            email: user.email.clone(),
            issued_at: None,
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn order_serializes_with_front_end_field_names() {
        let order = Order {
            id: "9".to_string(),
            client_id: "1".to_string(),
            client_name: "Acme Corporation".to_string(),
            order_number: "#100009".to_string(),
            date: "2024-01-15T10:30:00.000Z".to_string(),
            amount: 1200.0,
            payment_mode: PaymentMode::Cod,
            invoice_id: "C10000009".to_string(),
            status: OrderStatus::Ongoing,
            warehouse_id: "2".to_string(),
        };

        let value = serde_json::to_value(&order).unwrap();
        assert_eq!(value["clientName"], "Acme Corporation");
        assert_eq!(value["paymentMode"], "COD");
        assert_eq!(value["status"], "Ongoing");
        assert_eq!(value["invoiceId"], "C10000009");
        assert_eq!(value["amount"], 1200);
        assert!(order.parsed_date().is_some());
    }

    #[test]
    fn session_drops_password() {
        let user = RegisteredUser {
            name: "Dana".to_string(),
            company_name: "Dana Freight".to_string(),
            email: "dana@freight.io".to_string(),
            password: "hunter2".to_string(),
        };

        let json = serde_json::to_string(&Session::from(&user)).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("hunter2"));
        assert_eq!(json, r#"{"name":"Dana","companyName":"Dana Freight","email":"dana@freight.io"}"#);
    }

    #[test]
    fn legacy_session_never_expires() {
        let session: Session =
            serde_json::from_str(r#"{"name":"a","companyName":"b","email":"c@d.e"}"#).unwrap();
        assert!(!session.is_expired_at(Utc::now() + Duration::days(3650)));
    }

    #[test]
    fn status_parses_from_its_name() {
        assert_eq!("Delivered".parse::<OrderStatus>().unwrap(), OrderStatus::Delivered);
        assert!("Dispatched".parse::<OrderStatus>().is_err());
    }

    #[test]
    fn warehouse_capacity_helpers() {
        let warehouse = Warehouse {
            id: "3".to_string(),
            name: "Bay Area Facility".to_string(),
            location: "San Francisco, CA".to_string(),
            total_capacity: 100000.0,
            used_capacity: 95000.0,
        };
        assert_eq!(warehouse.available_capacity(), 5000.0);
        assert!((warehouse.usage_percentage() - 95.0).abs() < f64::EPSILON);
    }

    #[test]
    fn fractional_and_negative_numbers_round_trip() {
        let json = r##"{"id":"7","clientId":"1","clientName":"Acme Corporation","orderNumber":"#100007","date":"2024-02-01T00:00:00.000Z","amount":-500,"paymentMode":"Refund","invoiceId":"C10000007","status":"Rejected","warehouseId":"1"}"##;
        let order: Order = serde_json::from_str(json).unwrap();
        assert_eq!(order.amount, -500.0);
        assert_eq!(serde_json::to_string(&order).unwrap(), json);

        let json = r#"{"id":"8","name":"Mezzanine","location":"Tacoma, WA","totalCapacity":1500.5,"usedCapacity":0}"#;
        let warehouse: Warehouse = serde_json::from_str(json).unwrap();
        assert_eq!(warehouse.available_capacity(), 1500.5);
        assert_eq!(serde_json::to_string(&warehouse).unwrap(), json);
    }
}
