//! Login, registration and the persisted session.
//!
//! Credentials are compared in plain text against the `users` collection. This
//! is a placeholder login for a local front-end, not an authentication scheme.
//! What the layer does provide is an explicit [`Session`] lifecycle: sessions are
//! issued with an expiry, checked on every read, and invalidated on logout or
//! once expired.

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};

use crate::collection::{Record, SESSION_KEY};
use crate::error::{AuthError, RegisterError, StoreResult};
use crate::models::{RegisteredUser, Session};
use crate::storage_medium::KeyValueMedium;
use crate::store::DocumentStore;

pub trait Authenticator {
    /// Checks credentials and returns a session stripped of credential fields.
    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError>;
}

/// Authenticates against the `users` collection of a [`DocumentStore`].
pub struct LocalAuthenticator<'a, M> {
    store: &'a DocumentStore<M>,
}

impl<'a, M: KeyValueMedium> LocalAuthenticator<'a, M> {
    pub fn new(store: &'a DocumentStore<M>) -> Self {
        Self { store }
    }
}

impl<M: KeyValueMedium> Authenticator for LocalAuthenticator<'_, M> {
    fn authenticate(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let users = self.store.load_collection::<RegisteredUser>()?;
        let wanted = RegisteredUser::index_key(email);

        let user = users
            .iter()
            .find(|user| RegisteredUser::index_key(&user.email) == wanted)
            .ok_or(AuthError::UnknownEmail)?;

        if user.password != password {
            return Err(AuthError::WrongPassword);
        }

        Ok(Session::from(user))
    }
}

/// Adds an account to the `users` collection.
///
/// Emails are unique regardless of case. The user is appended even if the write
/// to the medium fails, mirroring every other append.
pub fn register_user<M: KeyValueMedium>(
    store: &DocumentStore<M>,
    user: RegisteredUser,
) -> Result<RegisteredUser, RegisterError> {
    let users = store.load_collection::<RegisteredUser>()?;
    let wanted = RegisteredUser::index_key(&user.email);
    if users
        .iter()
        .any(|existing| RegisteredUser::index_key(&existing.email) == wanted)
    {
        return Err(RegisterError::DuplicateEmail(user.email));
    }

    info!("Registering account for {}", user.email);
    Ok(store.append_record(user)?)
}

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

/// Longest session lifetime accepted from configuration: one year.
pub const MAX_SESSION_TTL_HOURS: i64 = 24 * 365;

/// Issues, reads and invalidates the session stored under the `user` key.
pub struct SessionManager<'a, M, A> {
    store: &'a DocumentStore<M>,
    authenticator: A,
    ttl: Duration,
    clock: fn() -> DateTime<Utc>,
}

impl<'a, M: KeyValueMedium> SessionManager<'a, M, LocalAuthenticator<'a, M>> {
    /// A manager authenticating against the same store it persists sessions in.
    pub fn local(store: &'a DocumentStore<M>, ttl: Duration) -> Self {
        Self::new(store, LocalAuthenticator::new(store), ttl)
    }
}

impl<'a, M: KeyValueMedium, A: Authenticator> SessionManager<'a, M, A> {
    pub fn new(store: &'a DocumentStore<M>, authenticator: A, ttl: Duration) -> Self {
        Self {
            store,
            authenticator,
            ttl,
            clock: Utc::now,
        }
    }

    /// Replaces the time source used for issuing and expiring sessions.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Utc>) -> Self {
        self.clock = clock;
        self
    }

    /// Authenticates and persists a fresh session, replacing any previous one.
    ///
    /// The session must reach the medium; a failed write is returned as an error
    /// rather than leaving the caller logged in only in memory. A lifetime that is
    /// not positive, or that runs past the last representable instant, is refused
    /// before any credential check.
    pub fn login(&self, email: &str, password: &str) -> Result<Session, AuthError> {
        let invalid_ttl = || AuthError::InvalidSessionTtl(self.ttl.num_hours());
        if self.ttl <= Duration::zero() {
            return Err(invalid_ttl());
        }

        let now = (self.clock)();
        let expires_at = now.checked_add_signed(self.ttl).ok_or_else(invalid_ttl)?;

        let mut session = self.authenticator.authenticate(email, password)?;
        session.issued_at = Some(now);
        session.expires_at = Some(expires_at);

        self.store.put_document(SESSION_KEY, &session)?;
        info!("Session issued for {}", session.email);
        Ok(session)
    }

    /// The active session, if any. Expired or unreadable sessions are removed.
    pub fn current_session(&self) -> StoreResult<Option<Session>> {
        let session = match self.store.get_document::<Session>(SESSION_KEY) {
            Ok(Some(session)) => session,
            Ok(None) => return Ok(None),
            Err(e) => {
                warn!("Dropping unreadable session: {}", e);
                self.store.remove_document(SESSION_KEY)?;
                return Ok(None);
            }
        };

        if session.is_expired_at((self.clock)()) {
            info!("Session for {} expired", session.email);
            self.store.remove_document(SESSION_KEY)?;
            return Ok(None);
        }

        Ok(Some(session))
    }

    pub fn is_authenticated(&self) -> StoreResult<bool> {
        Ok(self.current_session()?.is_some())
    }

    pub fn logout(&self) -> StoreResult<()> {
        self.store.remove_document(SESSION_KEY)?;
        debug!("Session cleared");
        Ok(())
    }
}
