//! Indexed in-memory table with explicit flush.
//!
//! A [`Table`] holds one collection as an arena of records indexed by
//! [`Record::index_key`], so user emails are looked up without regard to case.
//! Inserts and updates only touch memory and mark the table dirty; nothing is
//! written until [`Table::flush`], which rewrites the collection once and
//! reports failure instead of swallowing it.

use std::collections::HashMap;

use log::{debug, warn};

use crate::collection::Record;
use crate::error::StoreResult;
use crate::storage_medium::KeyValueMedium;
use crate::store::DocumentStore;

#[derive(Debug, Clone)]
pub struct Table<T> {
    records: Vec<T>,
    index: HashMap<String, usize>,
    dirty: bool,
}

impl<T: Record> Table<T> {
    /// Loads (seeding if needed) the collection into memory.
    pub fn load<M: KeyValueMedium>(store: &DocumentStore<M>) -> StoreResult<Self> {
        let records = store.load_collection::<T>()?;
        let mut index = HashMap::with_capacity(records.len());

        for (position, record) in records.iter().enumerate() {
            let key = T::index_key(record.id());
            if index.contains_key(&key) {
                warn!(
                    "Duplicate id '{}' in '{}'; lookups resolve to the first occurrence",
                    record.id(),
                    T::COLLECTION
                );
                continue;
            }
            index.insert(key, position);
        }

        Ok(Self {
            records,
            index,
            dirty: false,
        })
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.index
            .get(&T::index_key(id))
            .map(|&position| &self.records[position])
    }

    /// Records in collection order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.records.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// Adds `record`, assigning a fresh id when its collection generates ids.
    ///
    /// For collections keyed by a natural id (users), an id already present,
    /// in any letter case, is rejected and `None` is returned.
    pub fn insert<M: KeyValueMedium>(&mut self, store: &DocumentStore<M>, mut record: T) -> Option<&T> {
        if T::GENERATED_ID {
            let id = store.next_id(self.index.keys().map(String::as_str));
            record.set_id(id);
        } else if self.index.contains_key(&T::index_key(record.id())) {
            return None;
        }

        let position = self.records.len();
        self.index.insert(T::index_key(record.id()), position);
        self.records.push(record);
        self.dirty = true;
        Some(&self.records[position])
    }

    /// Applies `change` to the record with `id`. Returns `false` when it does not exist.
    ///
    /// The record's id is restored if `change` alters it.
    pub fn update<F>(&mut self, id: &str, change: F) -> bool
    where
        F: FnOnce(&mut T),
    {
        let position = match self.index.get(&T::index_key(id)) {
            Some(&position) => position,
            None => return false,
        };

        let record = &mut self.records[position];
        let original = record.id().to_string();
        change(record);
        if record.id() != original {
            warn!("Ignoring id change on '{}' in '{}'", original, T::COLLECTION);
            record.set_id(original);
        }

        self.dirty = true;
        true
    }

    /// Writes the whole collection if anything changed since the last flush.
    pub fn flush<M: KeyValueMedium>(&mut self, store: &DocumentStore<M>) -> StoreResult<()> {
        if !self.dirty {
            return Ok(());
        }

        store.write_collection(&self.records)?;
        self.dirty = false;
        debug!("Flushed {} records to '{}'", self.records.len(), T::COLLECTION);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::{Order, OrderStatus, RegisteredUser, Warehouse};
    use crate::storage_medium::MemoryMedium;

    #[test]
    fn mutations_stay_in_memory_until_flush() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut orders = Table::<Order>::load(&store).unwrap();
        let persisted = store.medium().get("orders").unwrap();

        assert!(orders.update("3", |order| order.status = OrderStatus::Ongoing));
        assert!(orders.is_dirty());
        assert_eq!(store.medium().get("orders").unwrap(), persisted);

        orders.flush(&store).unwrap();
        assert!(!orders.is_dirty());
        let reloaded: Vec<Order> = store.load_collection().unwrap();
        assert_eq!(reloaded[2].status, OrderStatus::Ongoing);
    }

    #[test]
    fn insert_indexes_new_record() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut warehouses = Table::<Warehouse>::load(&store).unwrap();

        let id = warehouses
            .insert(
                &store,
                Warehouse {
                    id: "1".to_string(),
                    name: "Reno Overflow".to_string(),
                    location: "Reno, NV".to_string(),
                    total_capacity: 30000.0,
                    used_capacity: 0.0,
                },
            )
            .map(|w| w.id.clone())
            .unwrap();

        assert_ne!(id, "1");
        assert_eq!(warehouses.len(), 5);
        assert_eq!(warehouses.get(&id).unwrap().name, "Reno Overflow");
        assert_eq!(warehouses.get("1").unwrap().name, "North Seattle Warehouse");
    }

    #[test]
    fn natural_ids_reject_duplicates() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut users = Table::<RegisteredUser>::load(&store).unwrap();
        let user = RegisteredUser {
            name: "Ines".to_string(),
            company_name: "Ines Cold Chain".to_string(),
            email: "ines@coldchain.eu".to_string(),
            password: "pw".to_string(),
        };

        assert!(users.insert(&store, user.clone()).is_some());
        assert!(users.insert(&store, user).is_none());
        assert_eq!(users.len(), 1);
    }

    #[test]
    fn emails_differing_only_in_case_are_duplicates() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut users = Table::<RegisteredUser>::load(&store).unwrap();
        let ann = RegisteredUser {
            name: "Ann".to_string(),
            company_name: "Ann Cartage".to_string(),
            email: "Ann@X.com".to_string(),
            password: "pw".to_string(),
        };

        assert!(users.insert(&store, ann.clone()).is_some());
        let lowercase = RegisteredUser {
            email: "ann@x.com".to_string(),
            ..ann
        };
        assert!(users.insert(&store, lowercase).is_none());
        assert_eq!(users.len(), 1);
        assert_eq!(users.get("ANN@x.COM").unwrap().email, "Ann@X.com");

        assert!(users.update("ann@x.com", |user| user.email = "bob@x.com".to_string()));
        assert_eq!(users.get("ann@x.com").unwrap().email, "Ann@X.com");
    }

    #[test]
    fn id_changes_are_reverted() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut orders = Table::<Order>::load(&store).unwrap();

        orders.update("1", |order| order.id = "100".to_string());
        assert!(orders.get("1").is_some());
        assert!(orders.get("100").is_none());
    }

    #[test]
    fn unknown_id_update_leaves_table_clean() {
        let store = DocumentStore::new(MemoryMedium::new());
        let mut orders = Table::<Order>::load(&store).unwrap();
        assert!(!orders.update("nope", |order| order.amount = 1.0));
        assert!(!orders.is_dirty());
    }

    #[test]
    fn flush_surfaces_write_failure() {
        let seeded = DocumentStore::new(MemoryMedium::new());
        let _: Vec<Order> = seeded.load_collection().unwrap();
        let raw = seeded.medium().get("orders").unwrap().unwrap();

        let store = DocumentStore::new(MemoryMedium::with_quota(raw.len() + "orders".len()));
        store.medium().set("orders", &raw).unwrap();

        let mut orders = Table::<Order>::load(&store).unwrap();
        orders.update("1", |order| order.invoice_id = "C1000000100000".to_string());

        assert!(matches!(orders.flush(&store), Err(StoreError::QuotaExceeded { .. })));
        assert!(orders.is_dirty());
    }
}
