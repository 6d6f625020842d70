//! The document store: typed collections over a [`KeyValueMedium`].
//!
//! Every collection lives under one key as a JSON sequence and every mutation
//! rewrites the whole sequence. Reads of an absent key produce the collection's
//! seed set and write it back. Writes are best-effort: a failed write is logged
//! and the caller still receives the in-memory result, so persisted state can
//! lag behind until the next successful write. Use [`crate::table::Table`] when
//! mutations should be batched behind an explicit, fallible flush.

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::auth::{Authenticator, LocalAuthenticator};
use crate::collection::{Collection, Record};
use crate::error::{AuthError, StoreError, StoreResult};
use crate::id_gen::IdGenerator;
use crate::models::{
    Client, NewClient, NewOrder, NewWarehouse, Order, OrderStatus, RegisteredUser, Session,
    Warehouse,
};
use crate::storage_medium::KeyValueMedium;

pub struct DocumentStore<M> {
    medium: M,
    ids: IdGenerator,
}

impl<M: KeyValueMedium> DocumentStore<M> {
    pub fn new(medium: M) -> Self {
        Self {
            medium,
            ids: IdGenerator::new(),
        }
    }

    pub fn medium(&self) -> &M {
        &self.medium
    }

    pub fn into_medium(self) -> M {
        self.medium
    }

    pub(crate) fn next_id<'a, I>(&self, taken: I) -> String
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.ids.next_id(taken)
    }

    /// Reads and validates the stored collection without seeding.
    ///
    /// Returns `Ok(None)` when the key is absent, or when it holds an empty
    /// sequence for a collection that reseeds on empty (orders). Stored text that
    /// does not decode as a sequence of `T` yields
    /// [`StoreError::MalformedStoredData`].
    pub fn try_load_collection<T: Record>(&self) -> StoreResult<Option<Vec<T>>> {
        let key = T::COLLECTION.key();
        let raw = match self.medium.get(key)? {
            Some(raw) => raw,
            None => return Ok(None),
        };

        let records: Vec<T> =
            serde_json::from_str(&raw).map_err(|e| StoreError::MalformedStoredData {
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        if records.is_empty() && T::reseed_when_empty() {
            debug!("'{}' is stored empty; treating as absent", key);
            return Ok(None);
        }

        Ok(Some(records))
    }

    /// Returns the stored collection, seeding it first when needed.
    ///
    /// Absent keys, malformed contents and (for orders) empty sequences all
    /// fall back to the seed set, which is written back best-effort. Collections
    /// without a seed set (users) read as empty and nothing is written.
    pub fn load_collection<T: Record>(&self) -> StoreResult<Vec<T>> {
        let key = T::COLLECTION.key();
        match self.try_load_collection::<T>() {
            Ok(Some(records)) => return Ok(records),
            Ok(None) => {}
            Err(StoreError::MalformedStoredData { reason, .. }) => {
                warn!("Discarding malformed '{}' ({}); reseeding", key, reason);
            }
            Err(e) => return Err(e),
        }

        let seed = T::seed();
        if !seed.is_empty() {
            info!("Seeding '{}' with {} records", key, seed.len());
            self.persist(key, &seed);
        }
        Ok(seed)
    }

    /// Appends `record` to its collection and rewrites the collection.
    ///
    /// For collections with generated ids the record's id is replaced by one
    /// distinct from every id already present. The returned record is the one
    /// held in memory, whether or not the write reached the medium.
    pub fn append_record<T: Record>(&self, mut record: T) -> StoreResult<T> {
        let mut records = self.load_collection::<T>()?;

        if T::GENERATED_ID {
            let id = self.next_id(records.iter().map(|r| r.id()));
            record.set_id(id);
        }

        records.push(record.clone());
        self.persist(T::COLLECTION.key(), &records);
        debug!("Appended '{}' to '{}'", record.id(), T::COLLECTION);
        Ok(record)
    }

    /// Replaces `field` on the record identified by `id`.
    ///
    /// Records are handled as raw JSON documents so every other record, and every
    /// other field of the target, is written back exactly as it was stored.
    /// Returns `Ok(false)` without writing when no record has that id. The
    /// identity field cannot be updated, unknown field names are rejected, and the
    /// updated record must still decode as its entity type.
    pub fn update_field(
        &self,
        collection: Collection,
        id: &str,
        field: &str,
        value: Value,
    ) -> StoreResult<bool> {
        match collection {
            Collection::Warehouses => self.update_field_of::<Warehouse>(id, field, value),
            Collection::Clients => self.update_field_of::<Client>(id, field, value),
            Collection::Orders => self.update_field_of::<Order>(id, field, value),
            Collection::Users => self.update_field_of::<RegisteredUser>(id, field, value),
        }
    }

    fn update_field_of<T: Record>(&self, id: &str, field: &str, value: Value) -> StoreResult<bool> {
        let collection = T::COLLECTION;
        let invalid = |reason: &str| StoreError::InvalidFieldValue {
            id: id.to_string(),
            field: field.to_string(),
            reason: reason.to_string(),
        };

        if field == collection.id_field() {
            return Err(invalid("the identity field cannot be changed"));
        }

        let wanted = T::index_key(id);
        let mut documents = self.load_documents::<T>()?;
        let position = documents.iter().position(|doc| {
            doc.get(collection.id_field())
                .and_then(Value::as_str)
                .is_some_and(|stored| T::index_key(stored) == wanted)
        });

        let position = match position {
            Some(position) => position,
            None => {
                debug!("No record '{}' in '{}'; nothing updated", id, collection);
                return Ok(false);
            }
        };

        let mut updated = documents[position].clone();
        match updated.as_object_mut().and_then(|object| object.get_mut(field)) {
            Some(slot) => *slot = value,
            None => return Err(invalid("no such field")),
        }

        if let Err(e) = serde_json::from_value::<T>(updated.clone()) {
            warn!("Rejected update of '{}' on '{}' in '{}': {}", field, id, collection, e);
            return Err(invalid(&e.to_string()));
        }

        documents[position] = updated;
        self.persist(collection.key(), &documents);
        Ok(true)
    }

    /// The collection as raw documents, preserving stored field order and values.
    fn load_documents<T: Record>(&self) -> StoreResult<Vec<Value>> {
        if let Some(raw) = self.medium.get(T::COLLECTION.key())? {
            let usable = match serde_json::from_str::<Vec<T>>(&raw) {
                Ok(records) => !(records.is_empty() && T::reseed_when_empty()),
                Err(_) => false,
            };
            if usable {
                return Ok(serde_json::from_str(&raw)?);
            }
        }

        let records = self.load_collection::<T>()?;
        records
            .iter()
            .map(serde_json::to_value)
            .collect::<Result<Vec<_>, _>>()
            .map_err(StoreError::from)
    }

    /// Looks a record up by id; user emails match regardless of case.
    pub fn find<T: Record>(&self, id: &str) -> StoreResult<Option<T>> {
        let wanted = T::index_key(id);
        Ok(self
            .load_collection::<T>()?
            .into_iter()
            .find(|record| T::index_key(record.id()) == wanted))
    }

    /// Creates a warehouse; new sites start with no used capacity.
    pub fn create_warehouse(&self, draft: NewWarehouse) -> StoreResult<Warehouse> {
        self.append_record(Warehouse {
            id: String::new(),
            name: draft.name,
            location: draft.location,
            total_capacity: draft.total_capacity,
            used_capacity: 0.0,
        })
    }

    pub fn create_client(&self, draft: NewClient) -> StoreResult<Client> {
        self.append_record(Client {
            id: String::new(),
            name: draft.name,
            email: draft.email,
            allocated_space: draft.allocated_space,
            warehouse_id: draft.warehouse_id,
        })
    }

    pub fn create_order(&self, draft: NewOrder) -> StoreResult<Order> {
        self.append_record(Order {
            id: String::new(),
            client_id: draft.client_id,
            client_name: draft.client_name,
            order_number: draft.order_number,
            date: draft.date,
            amount: draft.amount,
            payment_mode: draft.payment_mode,
            invoice_id: draft.invoice_id,
            status: draft.status,
            warehouse_id: draft.warehouse_id,
        })
    }

    pub fn update_order_status(&self, id: &str, status: OrderStatus) -> StoreResult<bool> {
        self.update_field(
            Collection::Orders,
            id,
            "status",
            Value::String(status.as_str().to_string()),
        )
    }

    /// Checks credentials against the registered users.
    pub fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        LocalAuthenticator::new(self).authenticate(email, password)
    }

    /// Rewrites a whole collection, surfacing any write failure.
    pub fn write_collection<T: Record>(&self, records: &[T]) -> StoreResult<()> {
        self.put_document(T::COLLECTION.key(), records)
    }

    /// Reads a single JSON document stored under `key`.
    pub fn get_document<D: DeserializeOwned>(&self, key: &str) -> StoreResult<Option<D>> {
        match self.medium.get(key)? {
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| StoreError::MalformedStoredData {
                    key: key.to_string(),
                    reason: e.to_string(),
                }),
            None => Ok(None),
        }
    }

    pub fn put_document<D: Serialize + ?Sized>(&self, key: &str, document: &D) -> StoreResult<()> {
        let json = serde_json::to_string(document)?;
        self.medium.set(key, &json)
    }

    pub fn remove_document(&self, key: &str) -> StoreResult<()> {
        self.medium.remove(key)
    }

    /// Best-effort write: failures are logged and swallowed.
    fn persist<D: Serialize + ?Sized>(&self, key: &str, document: &D) {
        if let Err(e) = self.put_document(key, document) {
            warn!("Could not persist '{}', keeping in-memory copy only: {}", key, e);
        }
    }
}
