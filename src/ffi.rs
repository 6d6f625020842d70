//! C-compatible surface for embedding hosts.
//!
//! Every function returns a heap-allocated, null-terminated JSON
//! [`AppResponse`] that the caller must release with [`wms_free_string`].
//! Payloads of `Ok` responses are themselves JSON text.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::app_response::AppResponse;
use crate::auth::{register_user, LocalAuthenticator, SessionManager};
use crate::collection::Collection;
use crate::config::StoreConfig;
use crate::lmdb_medium::LmdbMedium;
use crate::models::{
    Client, NewClient, NewOrder, NewWarehouse, Order, RegisteredUser, Session, Warehouse,
};
use crate::store::DocumentStore;

/// Store handle owned by the host between [`wms_open`] and [`wms_close`].
pub struct WmsState {
    store: DocumentStore<LmdbMedium>,
    config: StoreConfig,
}

impl WmsState {
    pub fn open(config: StoreConfig) -> Result<Self, AppResponse> {
        let medium = LmdbMedium::open_with_map_size(&config.db_path, config.map_size)?;
        Ok(Self {
            store: DocumentStore::new(medium),
            config,
        })
    }

    pub fn store(&self) -> &DocumentStore<LmdbMedium> {
        &self.store
    }

    fn sessions(&self) -> SessionManager<'_, LmdbMedium, LocalAuthenticator<'_, LmdbMedium>> {
        SessionManager::local(&self.store, self.config.session_ttl())
    }

    fn load(&self, key: &str) -> AppResponse {
        let collection = match key.parse::<Collection>() {
            Ok(collection) => collection,
            Err(e) => return AppResponse::from(e),
        };

        let loaded = match collection {
            Collection::Warehouses => self
                .store
                .load_collection::<Warehouse>()
                .map(|c| AppResponse::json(&c)),
            Collection::Clients => self
                .store
                .load_collection::<Client>()
                .map(|c| AppResponse::json(&c)),
            Collection::Orders => self
                .store
                .load_collection::<Order>()
                .map(|c| AppResponse::json(&c)),
            Collection::Users => {
                return AppResponse::Unauthorized("the users collection is not readable".to_string())
            }
        };
        loaded.unwrap_or_else(AppResponse::from)
    }

    fn append(&self, key: &str, json: &str) -> AppResponse {
        let collection = match key.parse::<Collection>() {
            Ok(collection) => collection,
            Err(e) => return AppResponse::from(e),
        };

        let created = match collection {
            Collection::Warehouses => parse::<NewWarehouse>(json)
                .map(|draft| self.store.create_warehouse(draft).map(|r| AppResponse::json(&r))),
            Collection::Clients => parse::<NewClient>(json)
                .map(|draft| self.store.create_client(draft).map(|r| AppResponse::json(&r))),
            Collection::Orders => parse::<NewOrder>(json)
                .map(|draft| self.store.create_order(draft).map(|r| AppResponse::json(&r))),
            Collection::Users => {
                return AppResponse::BadRequest("use wms_register_user to add users".to_string())
            }
        };

        match created {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => AppResponse::from(e),
            Err(response) => response,
        }
    }

    fn update(&self, key: &str, id: &str, field: &str, value_json: &str) -> AppResponse {
        let collection = match key.parse::<Collection>() {
            Ok(Collection::Users) => {
                return AppResponse::BadRequest("users cannot be edited through this call".to_string())
            }
            Ok(collection) => collection,
            Err(e) => return AppResponse::from(e),
        };

        let value = match parse::<Value>(value_json) {
            Ok(value) => value,
            Err(response) => return response,
        };

        match self.store.update_field(collection, id, field, value) {
            Ok(true) => AppResponse::success(format!("Updated '{field}' on '{id}'")),
            Ok(false) => AppResponse::NotFound(format!("No record found with id: {id}")),
            Err(e) => AppResponse::from(e),
        }
    }
}

fn parse<T: DeserializeOwned>(json: &str) -> Result<T, AppResponse> {
    serde_json::from_str(json)
        .map_err(|e| AppResponse::SerializationError(format!("Invalid JSON: {e}")))
}

/// Opens the store at `<path>.lmdb`.
///
/// A null `path` uses the configured `WMS_DB_PATH`. Returns null on failure.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_open(path: *const c_char) -> *mut WmsState {
    let mut config = StoreConfig::from_env();

    if !path.is_null() {
        match unsafe { CStr::from_ptr(path).to_str() } {
            Ok(s) => config.db_path = s.to_string(),
            Err(e) => {
                warn!("Invalid UTF-8 in path parameter: {e}");
                return std::ptr::null_mut();
            }
        }
    }

    match WmsState::open(config) {
        Ok(state) => {
            info!("Store opened");
            Box::into_raw(Box::new(state))
        }
        Err(e) => {
            warn!("Failed to open store: {e}");
            std::ptr::null_mut()
        }
    }
}

/// Returns a collection (`warehouses`, `clients` or `orders`), seeding it if needed.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_load_collection(state: *mut WmsState, key: *const c_char) -> *const c_char {
    let state = match state_ref(state, "wms_load_collection") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let key = match c_ptr_to_string(key, "key") {
        Ok(key) => key,
        Err(err) => return err,
    };

    response_to_c_string(&state.load(&key))
}

/// Appends a record built from the creation form JSON (no `id`). Returns the stored record.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_append_record(
    state: *mut WmsState,
    key: *const c_char,
    json_ptr: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "wms_append_record") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let key = match c_ptr_to_string(key, "key") {
        Ok(key) => key,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    response_to_c_string(&state.append(&key, &json))
}

/// Replaces one field of one record. `value_json` is the new value as JSON text.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_update_field(
    state: *mut WmsState,
    key: *const c_char,
    id: *const c_char,
    field: *const c_char,
    value_json: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "wms_update_field") {
        Ok(state) => state,
        Err(err) => return err,
    };

    let mut args = Vec::with_capacity(4);
    for (ptr, name) in [(key, "key"), (id, "id"), (field, "field"), (value_json, "value")] {
        match c_ptr_to_string(ptr, name) {
            Ok(arg) => args.push(arg),
            Err(err) => return err,
        }
    }

    response_to_c_string(&state.update(&args[0], &args[1], &args[2], &args[3]))
}

/// Logs in and persists the session. `Unauthorized` carries the field-level message.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_login(
    state: *mut WmsState,
    email: *const c_char,
    password: *const c_char,
) -> *const c_char {
    let state = match state_ref(state, "wms_login") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let email = match c_ptr_to_string(email, "email") {
        Ok(email) => email,
        Err(err) => return err,
    };
    let password = match c_ptr_to_string(password, "password") {
        Ok(password) => password,
        Err(err) => return err,
    };

    let response = match state.sessions().login(&email, &password) {
        Ok(session) => AppResponse::json(&session),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Returns the active session, or `NotFound` when logged out or expired.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_current_session(state: *mut WmsState) -> *const c_char {
    let state = match state_ref(state, "wms_current_session") {
        Ok(state) => state,
        Err(err) => return err,
    };

    let response = match state.sessions().current_session() {
        Ok(Some(session)) => AppResponse::json(&session),
        Ok(None) => AppResponse::NotFound("No active session".to_string()),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_logout(state: *mut WmsState) -> *const c_char {
    let state = match state_ref(state, "wms_logout") {
        Ok(state) => state,
        Err(err) => return err,
    };

    let response = match state.sessions().logout() {
        Ok(()) => AppResponse::success("Logged out"),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Registers an account from `{name, companyName, email, password}`.
/// The response echoes the account without its password.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_register_user(state: *mut WmsState, json_ptr: *const c_char) -> *const c_char {
    let state = match state_ref(state, "wms_register_user") {
        Ok(state) => state,
        Err(err) => return err,
    };
    let json = match c_ptr_to_string(json_ptr, "JSON") {
        Ok(json) => json,
        Err(err) => return err,
    };

    let user = match parse::<RegisteredUser>(&json) {
        Ok(user) => user,
        Err(response) => return response_to_c_string(&response),
    };

    let response = match register_user(state.store(), user) {
        Ok(user) => AppResponse::json(&Session::from(&user)),
        Err(e) => AppResponse::from(e),
    };
    response_to_c_string(&response)
}

/// Syncs and releases the store. The pointer must not be used afterwards.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_close(state: *mut WmsState) -> *const c_char {
    if state.is_null() {
        let error = AppResponse::BadRequest("Null state pointer passed to wms_close".to_string());
        return response_to_c_string(&error);
    }

    let state = unsafe { Box::from_raw(state) };
    let response = match state.store.medium().close() {
        Ok(()) => AppResponse::success("Store closed"),
        Err(e) => AppResponse::from(e),
    };
    drop(state);
    response_to_c_string(&response)
}

/// Releases a string returned by any `wms_*` function.
#[no_mangle]
#[allow(clippy::not_unsafe_ptr_arg_deref)]
pub extern "C" fn wms_free_string(ptr: *const c_char) {
    if ptr.is_null() {
        return;
    }
    drop(unsafe { CString::from_raw(ptr as *mut c_char) });
}

fn state_ref<'a>(state: *mut WmsState, caller: &str) -> Result<&'a WmsState, *const c_char> {
    match unsafe { state.as_ref() } {
        Some(state) => Ok(state),
        None => {
            let error = AppResponse::BadRequest(format!("Null state pointer passed to {caller}"));
            Err(response_to_c_string(&error))
        }
    }
}

fn response_to_c_string(response: &AppResponse) -> *const c_char {
    let json = match serde_json::to_string(response) {
        Ok(j) => j,
        Err(e) => {
            warn!("Error serializing response: {e}");
            return std::ptr::null();
        }
    };

    match CString::new(json) {
        Ok(c_str) => c_str.into_raw(),
        Err(e) => {
            warn!("Error creating CString: {e}");
            std::ptr::null()
        }
    }
}

fn c_ptr_to_string(ptr: *const c_char, field_name: &str) -> Result<String, *const c_char> {
    if ptr.is_null() {
        let error = AppResponse::BadRequest(format!("Null {field_name} pointer"));
        return Err(response_to_c_string(&error));
    }

    match unsafe { CStr::from_ptr(ptr).to_str() } {
        Ok(s) => Ok(s.to_string()),
        Err(e) => {
            let error = AppResponse::BadRequest(format!("Invalid UTF-8 in {field_name}: {e}"));
            Err(response_to_c_string(&error))
        }
    }
}
