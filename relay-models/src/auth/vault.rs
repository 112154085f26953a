//! Cached front for the secure credential store.

use std::env;
use std::panic;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use secrecy::{ExposeSecret, SecretString};
use tokio::task::JoinError;
use tracing::{debug, warn};

use super::{ApiKey, CredentialKey, SecretBackend, service_name};
use crate::{Error, Result};

/// A resolved value and where it came from.
struct Cached {
    secret: SecretString,
    /// The value came from the environment, so the backend holds nothing.
    from_env: bool,
}

impl Cached {
    fn stored(value: impl Into<String>) -> Self {
        Self {
            secret: SecretString::from(value.into()),
            from_env: false,
        }
    }

    fn from_env(value: String) -> Self {
        Self {
            secret: SecretString::from(value),
            from_env: true,
        }
    }

    /// Whether the backend already holds exactly `value`.
    fn backend_holds(&self, value: &str) -> bool {
        if self.from_env {
            value.is_empty()
        } else {
            self.secret.expose_secret() == value
        }
    }

    fn present(&self) -> Option<ApiKey> {
        let value = self.secret.expose_secret();
        (!value.is_empty()).then(|| ApiKey::new(value))
    }
}

/// Cache state for one key.
///
/// `None` means the backend was never consulted. An empty cached value means
/// it was consulted and nothing is set.
type Slot = Option<Cached>;

/// Session-scoped credential cache over a [`SecretBackend`].
///
/// Construct one at session start and share it (usually behind an `Arc`);
/// it lives until the process exits and has no teardown.
///
/// # Caching
///
/// - The first [`get_credential`](Self::get_credential) for a key reads the
///   backend once and memoizes the answer, including "nothing set".
/// - [`set_credential`](Self::set_credential) skips the backend when it
///   already holds the value. A value served from the environment is never
///   taken as stored.
/// - [`delete_credential`](Self::delete_credential) consults the backend
///   first for a key that was never read, so a stored entry is always removed.
///
/// # Thread Safety
///
/// Each key has its own lock, held across the backend call. Concurrent
/// access to the same key is serialized; different keys never contend.
pub struct CredentialVault {
    app_id: String,
    backend: Box<dyn SecretBackend>,
    env_fallback: bool,
    slots: [Mutex<Slot>; CredentialKey::COUNT],
}

impl CredentialVault {
    /// Create a vault over `backend`.
    ///
    /// # Arguments
    ///
    /// * `app_id` - Fixed application identifier used to derive service names
    /// * `backend` - The secure store
    pub fn new(app_id: impl Into<String>, backend: impl SecretBackend + 'static) -> Self {
        Self {
            app_id: app_id.into(),
            backend: Box::new(backend),
            env_fallback: false,
            slots: std::array::from_fn(|_| Mutex::new(None)),
        }
    }

    /// Enable environment variable fallback.
    ///
    /// When the backend has nothing for a key, the vault checks the
    /// environment variable named after the key (e.g. `ANTHROPIC_API_KEY`).
    /// Whatever is found is memoized, but remembered as not stored, so
    /// setting the same value later still persists it.
    pub fn with_env_fallback(mut self) -> Self {
        self.env_fallback = true;
        self
    }

    /// The application identifier service names are derived from.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Get the credential for `key`, or `None` if it is not set.
    ///
    /// Blocks on the backend the first time a key is requested. Call it from
    /// a worker thread, or use [`get_in_background`](Self::get_in_background).
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialBackend` if the backend read fails. Failed
    /// reads are not cached.
    pub fn get_credential(&self, key: CredentialKey) -> Result<Option<ApiKey>> {
        let mut slot = self.lock(key);

        if let Some(cached) = slot.as_ref() {
            debug!(key = %key, "credential cache hit");
            return Ok(cached.present());
        }

        let cached = self.load(key)?;
        let result = cached.present();
        debug!(
            key = %key,
            found = result.is_some(),
            from_env = cached.from_env,
            "credential loaded"
        );
        *slot = Some(cached);
        Ok(result)
    }

    /// Store `secret` for `key`. `None` (or an empty string) clears it.
    ///
    /// The backend is only written when it doesn't already hold the value.
    /// The cache is updated before the write, so it reflects the new value
    /// even if the write fails.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialBackend` if the backend write fails.
    pub fn set_credential(&self, key: CredentialKey, secret: Option<&str>) -> Result<()> {
        let mut slot = self.lock(key);
        self.store(key, &mut slot, secret.unwrap_or_default())
    }

    /// Whether a non-empty credential is stored for `key`.
    pub fn is_credential_set(&self, key: CredentialKey) -> Result<bool> {
        Ok(self.get_credential(key)?.is_some())
    }

    /// Remove the credential for `key`.
    ///
    /// A key that was never read is looked up first, so an entry already in
    /// the backend is deleted rather than skipped as unchanged.
    ///
    /// # Errors
    ///
    /// Returns `Error::CredentialBackend` if the lookup or the delete fails.
    pub fn delete_credential(&self, key: CredentialKey) -> Result<()> {
        let mut slot = self.lock(key);
        if slot.is_none() {
            *slot = Some(self.load(key)?);
        }
        self.store(key, &mut slot, "")
    }

    /// Set/unset state of every known key, in declaration order.
    pub fn credential_status(&self) -> Result<Vec<(CredentialKey, bool)>> {
        CredentialKey::ALL
            .into_iter()
            .map(|key| self.is_credential_set(key).map(|set| (key, set)))
            .collect()
    }

    /// Run [`get_credential`](Self::get_credential) on the blocking pool.
    ///
    /// A panic inside the backend is resumed on the caller.
    pub async fn get_in_background(self: &Arc<Self>, key: CredentialKey) -> Result<Option<ApiKey>> {
        let vault = Arc::clone(self);
        tokio::task::spawn_blocking(move || vault.get_credential(key))
            .await
            .map_err(join_failed)?
    }

    /// Run [`set_credential`](Self::set_credential) on the blocking pool.
    pub async fn set_in_background(
        self: &Arc<Self>,
        key: CredentialKey,
        secret: Option<String>,
    ) -> Result<()> {
        let vault = Arc::clone(self);
        tokio::task::spawn_blocking(move || vault.set_credential(key, secret.as_deref()))
            .await
            .map_err(join_failed)?
    }

    /// Run [`delete_credential`](Self::delete_credential) on the blocking pool.
    pub async fn delete_in_background(self: &Arc<Self>, key: CredentialKey) -> Result<()> {
        let vault = Arc::clone(self);
        tokio::task::spawn_blocking(move || vault.delete_credential(key))
            .await
            .map_err(join_failed)?
    }

    fn lock(&self, key: CredentialKey) -> MutexGuard<'_, Slot> {
        // A poisoned slot still holds a whole value; nothing is half-written.
        self.slots[key.index()]
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn store(&self, key: CredentialKey, slot: &mut Slot, incoming: &str) -> Result<()> {
        let unchanged = match slot.as_ref() {
            Some(cached) => cached.backend_holds(incoming),
            None => incoming.is_empty(),
        };
        if unchanged {
            debug!(key = %key, "credential unchanged, skipping backend write");
            // A cleared env value stays cleared for the session.
            if let Some(cached) = slot.as_mut() {
                *cached = Cached::stored(incoming);
            }
            return Ok(());
        }

        *slot = Some(Cached::stored(incoming));

        let service = service_name(&self.app_id, key);
        let value = (!incoming.is_empty()).then_some(incoming);
        self.backend.write(&service, value).inspect_err(|e| {
            warn!(key = %key, error = %e, "failed to write credential");
        })?;

        debug!(key = %key, cleared = value.is_none(), "credential written to backend");
        Ok(())
    }

    fn load(&self, key: CredentialKey) -> Result<Cached> {
        let service = service_name(&self.app_id, key);
        let stored = self.backend.read(&service).inspect_err(|e| {
            warn!(key = %key, error = %e, "failed to read credential");
        })?;

        match stored {
            Some(value) if !value.is_empty() => Ok(Cached::stored(value)),
            _ if self.env_fallback => match env::var(key.name()) {
                Ok(value) if !value.is_empty() => Ok(Cached::from_env(value)),
                _ => Ok(Cached::stored("")),
            },
            _ => Ok(Cached::stored("")),
        }
    }
}

/// Map a failed blocking task to an error, resuming panics on the caller.
fn join_failed(err: JoinError) -> Error {
    match err.try_into_panic() {
        Ok(payload) => panic::resume_unwind(payload),
        Err(err) => Error::TaskCancelled(err.to_string()),
    }
}
