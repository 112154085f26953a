//! Secure storage backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::{Error, Result};

/// Opaque secure store addressed by service name.
///
/// Implementations may block (OS keychains do), so callers must keep these
/// calls off latency-sensitive paths.
pub trait SecretBackend: Send + Sync {
    /// Read the secret stored under `service`, or `None` if nothing is stored.
    fn read(&self, service: &str) -> Result<Option<String>>;

    /// Store `secret` under `service`. `None` removes the entry.
    fn write(&self, service: &str, secret: Option<&str>) -> Result<()>;
}

/// Account name used for every keyring entry.
const DEFAULT_ACCOUNT: &str = "relay";

/// Backend using the system keyring (macOS Keychain, Windows Credential
/// Manager, Linux kernel keyutils).
pub struct KeyringBackend {
    account: String,
}

impl KeyringBackend {
    /// Create a keyring backend using the default account name.
    pub fn new() -> Self {
        Self::with_account(DEFAULT_ACCOUNT)
    }

    /// Create a keyring backend that stores entries under `account`.
    pub fn with_account(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }

    fn entry(&self, service: &str) -> Result<keyring::Entry> {
        keyring::Entry::new(service, &self.account)
            .map_err(|e| Error::CredentialBackend(e.to_string()))
    }
}

impl Default for KeyringBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretBackend for KeyringBackend {
    fn read(&self, service: &str) -> Result<Option<String>> {
        match self.entry(service)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(Error::CredentialBackend(e.to_string())),
        }
    }

    fn write(&self, service: &str, secret: Option<&str>) -> Result<()> {
        let entry = self.entry(service)?;
        let outcome = match secret {
            Some(secret) => entry.set_password(secret),
            None => match entry.delete_credential() {
                Err(keyring::Error::NoEntry) => Ok(()),
                other => other,
            },
        };
        outcome.map_err(|e| Error::CredentialBackend(e.to_string()))
    }
}

/// In-process backend that keeps secrets in a map.
///
/// Counts reads and writes so callers can observe how often the store is
/// actually hit. Nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
    failure: Option<String>,
    reads: AtomicUsize,
    writes: AtomicUsize,
}

impl MemoryBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a backend that fails every operation with `message`.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    /// Seed an entry without counting it as a write.
    pub fn with_entry(self, service: impl Into<String>, secret: impl Into<String>) -> Self {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(service.into(), secret.into());
        self
    }

    /// Number of `read` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of `write` calls served so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Current raw value stored under `service`.
    pub fn stored(&self, service: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(service)
            .cloned()
    }

    fn check(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(Error::CredentialBackend(message.clone())),
            None => Ok(()),
        }
    }
}

impl SecretBackend for MemoryBackend {
    fn read(&self, service: &str) -> Result<Option<String>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        Ok(self.stored(service))
    }

    fn write(&self, service: &str, secret: Option<&str>) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match secret {
            Some(secret) => entries.insert(service.to_string(), secret.to_string()),
            None => entries.remove(service),
        };
        Ok(())
    }
}

impl<B: SecretBackend + ?Sized> SecretBackend for std::sync::Arc<B> {
    fn read(&self, service: &str) -> Result<Option<String>> {
        (**self).read(service)
    }

    fn write(&self, service: &str, secret: Option<&str>) -> Result<()> {
        (**self).write(service, secret)
    }
}
