// ABOUTME: Token endpoint calls for the Dexcom OAuth2 surface
// ABOUTME: Handles the authorization-code exchange, refresh-token grant, and auth URL construction
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.
// Copyright ©2025 Async-IO.org

use super::{OAuthError, TokenResponse};
use crate::config::{DexcomApiConfig, OAuthProviderConfig};
use crate::constants::oauth::DEFAULT_SCOPE;
use crate::utils::http_client::oauth_client;
use reqwest::Client;

/// Client for the provider's OAuth endpoints.
///
/// Holds the application's client identity and the endpoint URLs; performs
/// the two token-endpoint grants and builds the authorization URL. Uses the
/// short-timeout OAuth HTTP client, so a hung token endpoint surfaces as a
/// transport failure rather than a stalled request.
pub struct OAuthClient {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: String,
    token_url: String,
}

impl OAuthClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ConfigurationError`] when the client ID or
    /// secret is empty.
    pub fn new(oauth: &OAuthProviderConfig, api: &DexcomApiConfig) -> Result<Self, OAuthError> {
        if oauth.client_id.is_empty() || oauth.client_secret.is_empty() {
            return Err(OAuthError::ConfigurationError(
                "Client credentials not configured".into(),
            ));
        }

        Ok(Self {
            client: oauth_client(),
            client_id: oauth.client_id.clone(),
            client_secret: oauth.client_secret.clone(),
            redirect_uri: oauth.redirect_uri.clone(),
            auth_url: api.auth_url.clone(),
            token_url: api.token_url.clone(),
        })
    }

    /// Build the authorization URL for the OAuth flow.
    ///
    /// Pure function of configuration; no side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured auth URL is malformed and cannot
    /// be parsed.
    pub fn authorization_url(&self) -> Result<String, OAuthError> {
        let mut url = url::Url::parse(&self.auth_url)
            .map_err(|e| OAuthError::ConfigurationError(format!("Invalid auth URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", DEFAULT_SCOPE);

        Ok(url.into())
    }

    /// Exchange an authorization code for an access/refresh token pair.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::ExchangeFailed`] when the request fails in
    /// transport, the provider answers non-2xx (the provider's error payload
    /// is carried in the message), or the response body cannot be parsed.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, OAuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        self.post_token_request(&params, OAuthError::ExchangeFailed)
            .await
    }

    /// Mint a new token pair from a refresh token.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError::RefreshFailed`] under the same conditions as
    /// [`Self::exchange_code`].
    pub async fn refresh_token(&self, refresh_token: &str) -> Result<TokenResponse, OAuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("grant_type", "refresh_token"),
        ];

        self.post_token_request(&params, OAuthError::RefreshFailed)
            .await
    }

    async fn post_token_request(
        &self,
        params: &[(&str, &str)],
        wrap: fn(String) -> OAuthError,
    ) -> Result<TokenResponse, OAuthError> {
        let response = self
            .client
            .post(&self.token_url)
            .form(params)
            .send()
            .await
            .map_err(|e| wrap(e.to_string()))?;

        let status = response.status();
        let body = response.text().await.map_err(|e| wrap(e.to_string()))?;

        if !status.is_success() {
            return Err(wrap(format!("{status}: {body}")));
        }

        serde_json::from_str(&body).map_err(|e| wrap(format!("Parse error: {e}")))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn test_client() -> OAuthClient {
        OAuthClient::new(
            &OAuthProviderConfig {
                client_id: "client-abc".into(),
                client_secret: "secret-xyz".into(),
                redirect_uri: "http://localhost:3000/callback".into(),
            },
            &DexcomApiConfig {
                base_url: "https://sandbox-api.dexcom.com/v3".into(),
                auth_url: "https://sandbox-api.dexcom.com/v2/oauth2/login".into(),
                token_url: "https://sandbox-api.dexcom.com/v2/oauth2/token".into(),
            },
        )
        .unwrap()
    }

    #[test]
    fn authorization_url_carries_fixed_query_parameters() {
        let url = test_client().authorization_url().unwrap();
        let parsed = url::Url::parse(&url).unwrap();

        assert_eq!(parsed.path(), "/v2/oauth2/login");
        let pairs: Vec<(String, String)> = parsed
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("client_id".to_owned(), "client-abc".to_owned()),
                (
                    "redirect_uri".to_owned(),
                    "http://localhost:3000/callback".to_owned()
                ),
                ("response_type".to_owned(), "code".to_owned()),
                ("scope".to_owned(), "offline_access".to_owned()),
            ]
        );
    }

    #[test]
    fn authorization_url_is_deterministic() {
        let client = test_client();
        assert_eq!(
            client.authorization_url().unwrap(),
            client.authorization_url().unwrap()
        );
    }

    #[test]
    fn empty_credentials_rejected_at_construction() {
        let result = OAuthClient::new(
            &OAuthProviderConfig {
                client_id: String::new(),
                client_secret: String::new(),
                redirect_uri: "http://localhost:3000/callback".into(),
            },
            &DexcomApiConfig {
                base_url: String::new(),
                auth_url: String::new(),
                token_url: String::new(),
            },
        );
        assert!(matches!(result, Err(OAuthError::ConfigurationError(_))));
    }
}
