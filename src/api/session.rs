//! Session: stored bearer token plus unauthorized observers
//!
//! The session is shared by every request (`Arc<Session>`). Only the auth
//! paths mutate it: `sign_in`, `sign_out`, and the transport's 401 handling.
//! Consumers that need to react to an expired login register a callback with
//! [`Session::subscribe`] and drop it with [`Session::unsubscribe`].

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

/// Persistent storage for the bearer token
pub trait TokenStore: Send + Sync {
    /// Load the stored token, if any
    fn load(&self) -> Option<String>;

    /// Persist a token, replacing any previous one
    fn save(&self, token: &str) -> Result<()>;

    /// Remove the stored token
    fn clear(&self) -> Result<()>;
}

/// Token kept in a plain file (e.g. ~/.config/teamtacles/token)
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        (!token.is_empty()).then(|| token.to_string())
    }

    fn save(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        write_private(&self.path, token)
            .with_context(|| format!("Failed to write token to {}", self.path.display()))
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e)
                .with_context(|| format!("Failed to remove token at {}", self.path.display())),
        }
    }
}

/// Write `contents` readable by the owner only
fn write_private(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut options = OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }
    let mut file = options.open(path)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // mode() only applies when the file is created
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(contents.as_bytes())
}

/// In-memory token (demo mode and tests)
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save(&self, token: &str) -> Result<()> {
        *self.slot() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot() = None;
        Ok(())
    }
}

/// Handle returned by [`Session::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type UnauthorizedCallback = Arc<dyn Fn() + Send + Sync>;

/// Shared login state
pub struct Session {
    store: Box<dyn TokenStore>,
    observers: Mutex<Vec<(SubscriptionId, UnauthorizedCallback)>>,
    next_id: AtomicU64,
}

impl Session {
    pub fn new(store: impl TokenStore + 'static) -> Self {
        Self {
            store: Box::new(store),
            observers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// Current bearer token
    pub fn token(&self) -> Option<String> {
        self.store.load()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token().is_some()
    }

    /// Store a new token
    pub fn sign_in(&self, token: &str) -> Result<()> {
        let token = token.trim();
        anyhow::ensure!(!token.is_empty(), "Token must not be empty");
        self.store.save(token)?;
        tracing::info!("Session token stored");
        Ok(())
    }

    /// Forget the token (user-initiated; observers are not notified)
    pub fn sign_out(&self) -> Result<()> {
        self.store.clear()?;
        tracing::info!("Session token cleared");
        Ok(())
    }

    /// Register a callback fired when the server rejects the session
    pub fn subscribe(&self, callback: impl Fn() + Send + Sync + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.observers().push((id, Arc::new(callback)));
        id
    }

    /// Remove a callback. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers();
        let before = observers.len();
        observers.retain(|(sub, _)| *sub != id);
        observers.len() != before
    }

    /// Number of registered observers
    #[cfg(test)]
    pub fn observer_count(&self) -> usize {
        self.observers().len()
    }

    /// Handle a 401 without a domain error code
    ///
    /// Clears the token, then calls each observer once. Callbacks run outside
    /// the observer lock so they may subscribe/unsubscribe themselves.
    pub(crate) fn expire(&self) {
        if let Err(e) = self.store.clear() {
            tracing::error!("Failed to clear expired session token: {:#}", e);
        }

        let callbacks: Vec<UnauthorizedCallback> = self
            .observers()
            .iter()
            .map(|(_, callback)| callback.clone())
            .collect();

        tracing::warn!(
            "Session rejected by server (401), notifying {} observer(s)",
            callbacks.len()
        );

        for callback in callbacks {
            callback();
        }
    }

    fn observers(&self) -> MutexGuard<'_, Vec<(SubscriptionId, UnauthorizedCallback)>> {
        self.observers.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .field("observers", &self.observers().len())
            .finish()
    }
}
