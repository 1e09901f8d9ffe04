use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::calendar::AccountId;
use crate::storage::config::GoogleConfig;

pub const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
pub const REDIRECT_URI: &str = "http://localhost:8080";
pub const CALENDAR_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/calendar.readonly";
pub const EXPIRY_BUFFER_SECS: i64 = 60;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Failed to parse token: {0}")]
    ParseError(#[from] serde_json::Error),
    #[error("No refresh token available")]
    NoRefreshToken,
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("OAuth error: {0}")]
    OAuthError(String),
    #[error("Connection to {0} was cancelled")]
    Cancelled(AccountId),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenInfo {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
    pub token_type: String,
}

impl TokenInfo {
    pub fn new(access_token: String, expires_in_seconds: i64) -> Self {
        Self {
            access_token,
            refresh_token: None,
            expires_at: Utc::now() + chrono::Duration::seconds(expires_in_seconds),
            token_type: "Bearer".to_string(),
        }
    }

    pub fn with_refresh_token(mut self, refresh_token: String) -> Self {
        self.refresh_token = Some(refresh_token);
        self
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now + chrono::Duration::seconds(EXPIRY_BUFFER_SECS)
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid_at(Utc::now())
    }
}

/// Synchronous token lookup consulted before each fetch. `None` means the
/// account is disconnected or its token is inside the expiry buffer.
#[cfg_attr(test, mockall::automock)]
pub trait AuthProvider: Send + Sync {
    fn get_token(&self, account: AccountId) -> Option<String>;
}

#[derive(Debug, Clone, Default)]
pub struct SessionTokens {
    tokens: HashMap<AccountId, TokenInfo>,
}

impl SessionTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, account: AccountId, token: TokenInfo) {
        self.tokens.insert(account, token);
    }

    pub fn remove(&mut self, account: AccountId) -> Option<TokenInfo> {
        self.tokens.remove(&account)
    }

    pub fn get(&self, account: AccountId) -> Option<&TokenInfo> {
        self.tokens.get(&account)
    }

    pub fn is_connected(&self, account: AccountId) -> bool {
        self.get_token(account).is_some()
    }

    pub fn refreshable(&self) -> Vec<AccountId> {
        let mut accounts: Vec<AccountId> = self
            .tokens
            .iter()
            .filter(|(_, token)| !token.is_valid() && token.refresh_token.is_some())
            .map(|(account, _)| *account)
            .collect();
        accounts.sort();
        accounts
    }
}

impl AuthProvider for SessionTokens {
    fn get_token(&self, account: AccountId) -> Option<String> {
        self.tokens
            .get(&account)
            .filter(|token| token.is_valid())
            .map(|token| token.access_token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
    refresh_token: Option<String>,
}

pub struct GoogleAuthenticator {
    client_id: String,
    client_secret: String,
    token_url: String,
    client: reqwest::Client,
}

impl GoogleAuthenticator {
    pub fn new(config: &GoogleConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: TOKEN_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    pub fn with_token_url(mut self, token_url: String) -> Self {
        self.token_url = token_url;
        self
    }

    pub fn auth_url(&self, account: AccountId) -> String {
        let state = format!("{}-{}", account, uuid::Uuid::new_v4());

        format!(
            "https://accounts.google.com/o/oauth2/v2/auth?client_id={}&redirect_uri={}&response_type=code&scope={}&access_type=offline&prompt=consent&state={}",
            urlencoding::encode(&self.client_id),
            urlencoding::encode(REDIRECT_URI),
            urlencoding::encode(CALENDAR_READONLY_SCOPE),
            urlencoding::encode(&state)
        )
    }

    async fn request_token(&self, params: &[(&str, &str)]) -> Result<TokenResponse, AuthError> {
        let response = self.client.post(&self.token_url).form(params).send().await?;

        if !response.status().is_success() {
            let error_text = response.text().await?;
            return Err(AuthError::OAuthError(error_text));
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn exchange_code(&self, code: &str) -> Result<TokenInfo, AuthError> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", REDIRECT_URI),
            ("grant_type", "authorization_code"),
        ];

        let response = self.request_token(&params).await?;
        let token = TokenInfo::new(response.access_token, response.expires_in);

        Ok(match response.refresh_token {
            Some(refresh_token) => token.with_refresh_token(refresh_token),
            None => token,
        })
    }

    pub async fn refresh(&self, token: &TokenInfo) -> Result<TokenInfo, AuthError> {
        let refresh_token = token.refresh_token.as_ref().ok_or(AuthError::NoRefreshToken)?;

        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self.request_token(&params).await?;

        Ok(TokenInfo::new(response.access_token, response.expires_in)
            .with_refresh_token(response.refresh_token.unwrap_or_else(|| refresh_token.clone())))
    }

    pub async fn connect(
        &self,
        tokens: &mut SessionTokens,
        account: AccountId,
        code: Option<&str>,
    ) -> Result<(), AuthError> {
        let Some(code) = code.map(str::trim).filter(|c| !c.is_empty()) else {
            tracing::info!("Connection to {} cancelled", account);
            return Err(AuthError::Cancelled(account));
        };

        let token = self.exchange_code(code).await.map_err(|e| {
            tracing::error!("Failed to connect {}: {}", account, e);
            e
        })?;
        tokens.insert(account, token);
        tracing::info!("Connected {} account", account);
        Ok(())
    }

    pub fn disconnect(&self, tokens: &mut SessionTokens, account: AccountId) {
        if tokens.remove(account).is_some() {
            tracing::info!("Disconnected {} account", account);
        }
    }

    pub async fn refresh_expiring(&self, tokens: &mut SessionTokens) -> Vec<AccountId> {
        let mut failed = Vec::new();

        for account in tokens.refreshable() {
            let Some(current) = tokens.get(account).cloned() else {
                continue;
            };
            match self.refresh(&current).await {
                Ok(renewed) => tokens.insert(account, renewed),
                Err(e) => {
                    tracing::error!("Token refresh for {} failed: {}", account, e);
                    tokens.remove(account);
                    failed.push(account);
                }
            }
        }

        failed
    }
}
