//! Storage keys and the binding between each entity type and its collection.

use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;
use crate::models::{Client, Order, RegisteredUser, Warehouse};
use crate::seed;

/// Key holding the active [`Session`](crate::models::Session) object.
pub const SESSION_KEY: &str = "user";

/// A named collection stored as one JSON sequence under one key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Warehouses,
    Clients,
    Orders,
    Users,
}

impl Collection {
    pub const ALL: [Collection; 4] = [
        Collection::Warehouses,
        Collection::Clients,
        Collection::Orders,
        Collection::Users,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Collection::Warehouses => "warehouses",
            Collection::Clients => "clients",
            Collection::Orders => "orders",
            Collection::Users => "users",
        }
    }

    /// Name of the field carrying each record's identity. Users are keyed by email.
    pub fn id_field(&self) -> &'static str {
        match self {
            Collection::Users => "email",
            _ => "id",
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Collection {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Collection::ALL
            .into_iter()
            .find(|c| c.key() == s)
            .ok_or_else(|| StoreError::UnknownCollection(s.to_string()))
    }
}

/// A record type living in exactly one [`Collection`].
pub trait Record: Serialize + DeserializeOwned + Clone {
    const COLLECTION: Collection;

    /// Whether appending assigns a fresh generated id.
    const GENERATED_ID: bool = true;

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// The form of `id` used for lookups and duplicate checks.
    fn index_key(id: &str) -> String {
        id.to_string()
    }

    /// Records written back when the collection key is absent.
    fn seed() -> Vec<Self>;

    /// Whether a stored but empty sequence is treated as absent and reseeded.
    fn reseed_when_empty() -> bool {
        false
    }
}

impl Record for Warehouse {
    const COLLECTION: Collection = Collection::Warehouses;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn seed() -> Vec<Self> {
        seed::warehouses()
    }
}

impl Record for Client {
    const COLLECTION: Collection = Collection::Clients;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn seed() -> Vec<Self> {
        seed::clients()
    }
}

impl Record for Order {
    const COLLECTION: Collection = Collection::Orders;

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }

    fn seed() -> Vec<Self> {
        seed::orders()
    }

    fn reseed_when_empty() -> bool {
        true
    }
}

/// Users have no generated id; the email is their identity, compared without
/// regard to case, and no seed exists.
impl Record for RegisteredUser {
    const COLLECTION: Collection = Collection::Users;
    const GENERATED_ID: bool = false;

    fn id(&self) -> &str {
        &self.email
    }

    fn set_id(&mut self, id: String) {
        self.email = id;
    }

    fn index_key(id: &str) -> String {
        id.to_lowercase()
    }

    fn seed() -> Vec<Self> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_round_trip_through_from_str() {
        for collection in Collection::ALL {
            assert_eq!(collection.key().parse::<Collection>().unwrap(), collection);
        }
        assert!(matches!(
            "inventories".parse::<Collection>(),
            Err(StoreError::UnknownCollection(_))
        ));
    }

    #[test]
    fn only_user_emails_are_case_folded() {
        assert_eq!(RegisteredUser::index_key("Ann@X.com"), "ann@x.com");
        assert_eq!(Order::index_key("ABC"), "ABC");
    }

    #[test]
    fn only_orders_reseed_when_empty() {
        assert!(Order::reseed_when_empty());
        assert!(!Client::reseed_when_empty());
        assert!(!Warehouse::reseed_when_empty());
    }
}
