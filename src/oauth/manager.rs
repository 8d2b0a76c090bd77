// ABOUTME: Token lifecycle management: session restore, exchange, refresh, and logout
// ABOUTME: Sole writer of the token store; serializes refreshes so a single-use refresh token is spent once
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! # Token Lifecycle Manager
//!
//! Owns the in-memory token state and drives every token-mutating
//! operation: the authorization-code exchange, refresh, expiry detection at
//! session load, and logout. Refresh failure clears persisted state; the
//! provider's refresh tokens are single-use, so a rejected one must never
//! be retried or left on disk.

use super::{OAuthClient, OAuthError, SessionState, TokenRecord, TokenResponse, TokenStore};
use chrono::{Duration, Utc};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{error, info, warn};

/// Cap applied to provider-reported token lifetimes to keep the expiry
/// arithmetic in range.
const MAX_EXPIRES_IN_SECS: i64 = 86_400 * 365;

#[derive(Default)]
struct Session {
    record: Option<TokenRecord>,
    state: SessionState,
}

/// Central token lifecycle manager.
///
/// An explicit instance shared by handle; the sole writer of the token
/// store. One instance per process models one authenticated session.
pub struct TokenLifecycle {
    client: OAuthClient,
    store: Arc<dyn TokenStore>,
    session: RwLock<Session>,
    /// Serializes refreshes so concurrent callers never spend the same
    /// single-use refresh token twice.
    refresh_gate: Mutex<()>,
}

impl TokenLifecycle {
    /// Create a manager with no session loaded.
    #[must_use]
    pub fn new(client: OAuthClient, store: Arc<dyn TokenStore>) -> Self {
        Self {
            client,
            store,
            session: RwLock::new(Session::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Build the provider authorization URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured auth URL is malformed.
    pub fn authorization_url(&self) -> Result<String, OAuthError> {
        self.client.authorization_url()
    }

    /// Exchange an authorization code for tokens, persist them, and
    /// transition to `Authenticated`.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ExchangeFailed`] when the provider rejects the
    /// code or the response is malformed; nothing is persisted and the
    /// session state is unchanged.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenRecord, OAuthError> {
        let response = self.client.exchange_code(code).await?;
        let refresh_token = response.refresh_token.clone().ok_or_else(|| {
            OAuthError::ExchangeFailed("response missing refresh_token".into())
        })?;

        let record = build_record(&response, refresh_token);
        self.adopt(record.clone()).await;
        info!("Access token obtained via authorization-code exchange");
        Ok(record)
    }

    /// Mint a new token pair from the held refresh token.
    ///
    /// Concurrent callers are serialized; a caller that waited behind an
    /// in-flight refresh adopts the fresh token instead of spending the
    /// rotated refresh token a second time.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::NoRefreshToken`] when no refresh token is
    /// held. On provider rejection the manager transitions to
    /// `RefreshFailed`, clears the token store, and returns
    /// [`OAuthError::RefreshFailed`]; re-authentication is then required.
    pub async fn refresh(&self) -> Result<TokenRecord, OAuthError> {
        let Some(refresh_before) = self.held_refresh_token().await else {
            return Err(OAuthError::NoRefreshToken);
        };

        let _gate = self.refresh_gate.lock().await;

        // Another caller may have finished a refresh while we waited on the
        // gate. Its response rotated the refresh token; adopt its record.
        {
            let session = self.session.read().await;
            match &session.record {
                Some(record) if record.refresh_token != refresh_before => {
                    return Ok(record.clone());
                }
                Some(_) => {}
                None => return Err(OAuthError::NoRefreshToken),
            }
        }

        match self.client.refresh_token(&refresh_before).await {
            Ok(response) => {
                let refresh_token = response.refresh_token.clone().unwrap_or_else(|| {
                    warn!("No refresh token in refresh response; retaining previous one");
                    refresh_before.clone()
                });
                let record = build_record(&response, refresh_token);
                self.adopt(record.clone()).await;
                info!("Token refreshed successfully");
                Ok(record)
            }
            Err(e) => {
                // The rejected refresh token is presumed consumed. Drop it
                // from memory and disk so it is never retried.
                {
                    let mut session = self.session.write().await;
                    session.record = None;
                    session.state = SessionState::RefreshFailed;
                }
                if let Err(store_err) = self.store.clear().await {
                    warn!("Failed to clear token store after refresh failure: {store_err}");
                }
                error!("Token refresh failed, re-authentication required: {e}");
                Err(e)
            }
        }
    }

    /// Restore a persisted session, refreshing once if it is expired.
    ///
    /// Returns `true` when a usable session was restored. A failed refresh
    /// of an expired session is absorbed: the manager ends in
    /// `RefreshFailed` with the store cleared and `false` is returned.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] when the store cannot be read.
    pub async fn load_persisted_session(&self) -> Result<bool, OAuthError> {
        let Some(record) = self.store.load().await? else {
            let mut session = self.session.write().await;
            session.record = None;
            session.state = SessionState::Unauthenticated;
            return Ok(false);
        };

        let expired = record.is_expired(Utc::now());
        {
            let mut session = self.session.write().await;
            session.state = if expired {
                SessionState::ExpiredPendingRefresh
            } else {
                SessionState::Authenticated
            };
            session.record = Some(record);
        }

        if !expired {
            info!("Restored persisted session");
            return Ok(true);
        }

        info!("Persisted access token expired, attempting refresh");
        match self.refresh().await {
            Ok(_) => Ok(true),
            Err(e) => {
                warn!("Could not refresh expired session: {e}");
                Ok(false)
            }
        }
    }

    /// Clear in-memory state and the token store. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::Storage`] when the store cannot be cleared.
    pub async fn logout(&self) -> Result<(), OAuthError> {
        {
            let mut session = self.session.write().await;
            session.record = None;
            session.state = SessionState::Unauthenticated;
        }
        self.store.clear().await?;
        info!("Tokens cleared");
        Ok(())
    }

    /// The current bearer token, if one is held in memory.
    pub async fn access_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .record
            .as_ref()
            .map(|record| record.access_token.clone())
    }

    /// Whether an access token is currently held.
    ///
    /// Deliberately does not re-validate expiry: expiry is checked at
    /// session load and otherwise handled reactively when the remote API
    /// rejects a request.
    pub async fn is_authenticated(&self) -> bool {
        self.session.read().await.record.is_some()
    }

    /// Current session state.
    pub async fn state(&self) -> SessionState {
        self.session.read().await.state
    }

    async fn held_refresh_token(&self) -> Option<String> {
        self.session
            .read()
            .await
            .record
            .as_ref()
            .map(|record| record.refresh_token.clone())
    }

    async fn adopt(&self, record: TokenRecord) {
        if let Err(e) = self.store.save(&record).await {
            warn!("Failed to persist token record, continuing with in-memory tokens: {e}");
        }
        let mut session = self.session.write().await;
        session.record = Some(record);
        session.state = SessionState::Authenticated;
    }
}

fn build_record(response: &TokenResponse, refresh_token: String) -> TokenRecord {
    let now = Utc::now();
    TokenRecord {
        access_token: response.access_token.clone(),
        refresh_token,
        expires_at: response.expires_in.map(|secs| {
            let secs = i64::try_from(secs).unwrap_or(i64::MAX).min(MAX_EXPIRES_IN_SECS);
            now + Duration::seconds(secs)
        }),
        saved_at: now,
    }
}
