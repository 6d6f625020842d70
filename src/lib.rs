//! # Warehouse Store
//!
//! Embedded key-document store behind a warehouse-management front-end.
//! Warehouses, clients, orders and registered users are kept as JSON sequences,
//! one per key, on a synchronous key-value medium: browser-style local storage
//! in memory ([`storage_medium::MemoryMedium`]) or an LMDB environment on disk
//! ([`lmdb_medium::LmdbMedium`]).
//!
//! ## Behaviour
//!
//! - **Seed on first access**: reading an absent collection writes and returns
//!   its fixed seed records. Orders also reseed when stored empty.
//! - **Whole-collection writes**: appends and field updates rewrite the entire
//!   key. Write failures are logged and swallowed; [`table::Table`] offers an
//!   indexed in-memory alternative with an explicit, fallible flush.
//! - **Validated reads**: stored text that does not decode is reported as
//!   [`error::StoreError::MalformedStoredData`] and recovered by reseeding.
//! - **Sessions**: [`auth::SessionManager`] issues, expires and invalidates the
//!   session persisted under the `user` key.
//! - **View state**: [`view`] derives searches, tab filters and statistics.
//!
//! ## Quick Start
//!
//! ```rust
//! use warehouse_store::models::{Order, OrderStatus};
//! use warehouse_store::storage_medium::MemoryMedium;
//! use warehouse_store::store::DocumentStore;
//! use warehouse_store::view;
//!
//! let store = DocumentStore::new(MemoryMedium::new());
//!
//! let orders: Vec<Order> = store.load_collection()?;
//! assert_eq!(view::filter_by_tab(&orders, "Delivered").len(), 2);
//!
//! store.update_order_status("2", OrderStatus::Delivered)?;
//! let orders: Vec<Order> = store.load_collection()?;
//! assert_eq!(view::OrderStats::from_orders(&orders).growth(3), "60.00%");
//! # Ok::<(), warehouse_store::error::StoreError>(())
//! ```
//!
//! ## FFI Functions
//!
//! Hosts embedding the store through C use the functions in [`ffi`]:
//! `wms_open`, `wms_load_collection`, `wms_append_record`, `wms_update_field`,
//! `wms_login`, `wms_current_session`, `wms_logout`, `wms_register_user`,
//! `wms_close` and `wms_free_string`.

pub mod app_response;
pub mod auth;
pub mod collection;
pub mod config;
pub mod error;
pub mod ffi;
pub mod id_gen;
pub mod lmdb_medium;
pub mod models;
pub mod seed;
pub mod storage_medium;
pub mod store;
pub mod table;
pub mod view;

pub use crate::collection::{Collection, Record};
pub use crate::error::{AuthError, RegisterError, StoreError};
pub use crate::store::DocumentStore;
