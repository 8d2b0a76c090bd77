// ABOUTME: Durable single-slot persistence for the OAuth token record
// ABOUTME: File-backed JSON storage with atomic replace, plus an in-memory store for tests
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

//! # Token Store
//!
//! Persists exactly one [`TokenRecord`] at a time. The store never interprets
//! expiry: [`TokenStore::load`] returns a stored record unmodified even when
//! its `expiresAt` has passed. Expiry decisions belong to the lifecycle
//! manager.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;

/// The persisted token record.
///
/// Either entirely absent (no successful authorization, or tokens cleared)
/// or fully populated; partial records are never written. `Debug` is
/// manually implemented to redact credentials.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenRecord {
    /// Opaque bearer credential
    pub access_token: String,
    /// Opaque refresh credential
    pub refresh_token: String,
    /// Absolute expiry instant; `None` means unknown expiry, assume valid
    /// until rejected
    pub expires_at: Option<DateTime<Utc>>,
    /// When this record was written; diagnostic only
    pub saved_at: DateTime<Utc>,
}

impl TokenRecord {
    /// Whether the access token must be treated as invalid at `now`.
    ///
    /// An `expires_at` exactly equal to `now` counts as expired. A record
    /// without an expiry never expires here; it stays usable until the
    /// remote API rejects it.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }
}

impl std::fmt::Debug for TokenRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenRecord")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .field("saved_at", &self.saved_at)
            .finish()
    }
}

/// Token store error types
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Persistence medium I/O failure
    #[error("Token store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored record could not be serialized or parsed
    #[error("Token store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Single-slot durable persistence for the token record.
///
/// Side effects are confined to the persistence medium; implementations
/// make no network calls.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Persist `record`, replacing any previous record. Atomic from the
    /// caller's perspective: a concurrent [`TokenStore::load`] sees either
    /// the previous complete record or the new one, never a mix.
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError>;

    /// Load the stored record. `Ok(None)` when nothing has been saved.
    async fn load(&self) -> Result<Option<TokenRecord>, StoreError>;

    /// Delete the stored record. Idempotent: clearing an absent store
    /// succeeds.
    async fn clear(&self) -> Result<(), StoreError>;

    /// Whether a record is currently stored.
    async fn exists(&self) -> bool;
}

/// File-backed token store holding one JSON record.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a store persisting to `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map_or_else(|| "tokens.json".into(), |name| name.to_os_string());
        let mut temp_name = file_name;
        temp_name.push(".tmp");
        self.path.with_file_name(temp_name)
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        // Write-to-temp-then-rename so a concurrent reader never observes a
        // partially written record.
        let json = serde_json::to_string_pretty(record)?;
        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, json.as_bytes()).await?;
        tokio::fs::rename(&temp_path, &self.path).await?;

        debug!("Token record saved to {}", self.path.display());
        Ok(())
    }

    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let record = serde_json::from_str(&raw)?;
        Ok(Some(record))
    }

    async fn clear(&self) -> Result<(), StoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {
                debug!("Token record cleared from {}", self.path.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self) -> bool {
        tokio::fs::try_exists(&self.path).await.unwrap_or(false)
    }
}

/// In-memory token store used by tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    slot: RwLock<Option<TokenRecord>>,
}

impl MemoryTokenStore {
    /// Create an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn save(&self, record: &TokenRecord) -> Result<(), StoreError> {
        *self.slot.write().await = Some(record.clone());
        Ok(())
    }

    async fn load(&self) -> Result<Option<TokenRecord>, StoreError> {
        Ok(self.slot.read().await.clone())
    }

    async fn clear(&self) -> Result<(), StoreError> {
        *self.slot.write().await = None;
        Ok(())
    }

    async fn exists(&self) -> bool {
        self.slot.read().await.is_some()
    }
}
