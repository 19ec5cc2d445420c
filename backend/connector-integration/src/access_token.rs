//! Per-terminal credential cache for the payment system's password / refresh-token grants.

use std::collections::HashMap;

use common_utils::{date_time, errors::CustomResult};
use domain_types::{errors::ConnectorError, order::PaymentMethodParams};
use error_stack::ResultExt;
use hyperswitch_masking::{PeekInterface, Secret};
use serde::Deserialize;
use time::{Duration, OffsetDateTime};
use tokio::sync::Mutex;

/// Margin before the absolute expiry at which a token is already treated as expired.
pub const DEFAULT_EXPIRY_SKEW: Duration = Duration::seconds(30);

/// Body of a successful `password` or `refresh_token` grant.
#[derive(Debug, Clone, Deserialize)]
pub struct AccessTokenResponseData {
    pub token_type: String,
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    /// Seconds
    pub expires_in: i64,
    /// Seconds
    pub refresh_expires_in: i64,
}

#[derive(Debug, Clone)]
pub struct Credential {
    pub token_type: String,
    pub access_token: Secret<String>,
    pub refresh_token: Secret<String>,
    pub access_expiry: OffsetDateTime,
    pub refresh_expiry: OffsetDateTime,
}

impl Credential {
    /// Fails with `AuthenticationFailed` when a lifetime does not fit a date.
    pub fn from_response(
        response: AccessTokenResponseData,
        received_at: OffsetDateTime,
    ) -> CustomResult<Self, ConnectorError> {
        let expiry = |seconds: i64| {
            received_at
                .checked_add(Duration::seconds(seconds))
                .ok_or(ConnectorError::AuthenticationFailed)
                .attach_printable_lazy(|| format!("token lifetime of {seconds}s is out of range"))
        };
        Ok(Self {
            access_expiry: expiry(response.expires_in)?,
            refresh_expiry: expiry(response.refresh_expires_in)?,
            token_type: response.token_type,
            access_token: response.access_token,
            refresh_token: response.refresh_token,
        })
    }

    fn is_access_valid(&self, now: OffsetDateTime, skew: Duration) -> bool {
        self.access_expiry
            .checked_sub(skew)
            .is_some_and(|usable_until| usable_until > now)
    }

    fn is_refresh_valid(&self, now: OffsetDateTime, skew: Duration) -> bool {
        self.refresh_expiry
            .checked_sub(skew)
            .is_some_and(|usable_until| usable_until > now)
    }
}

/// `Authorization` header value, e.g. `Bearer <access_token>`.
pub fn create_auth_header(credential: &Credential) -> Secret<String> {
    let mut chars = credential.token_type.chars();
    let token_type = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    };
    Secret::new(format!(
        "{} {}",
        token_type,
        credential.access_token.peek()
    ))
}

#[derive(Debug, Clone)]
pub struct TerminalAuth {
    pub terminal_code: String,
    pub password: Secret<String>,
}

impl TryFrom<&PaymentMethodParams> for TerminalAuth {
    type Error = error_stack::Report<ConnectorError>;
    fn try_from(params: &PaymentMethodParams) -> Result<Self, Self::Error> {
        if params.terminal_id.trim().is_empty() || params.secret.peek().is_empty() {
            return Err(ConnectorError::FailedToObtainAuthType.into());
        }
        Ok(Self {
            terminal_code: params.terminal_id.clone(),
            password: params.secret.clone(),
        })
    }
}

#[derive(Debug, Clone)]
pub enum TokenState {
    Ready(Credential),
    /// No usable entry: the caller has to run a password grant.
    RequiresAuth,
}

/// The two grants the payment system offers.
#[async_trait::async_trait]
pub trait TokenEndpoint: Send + Sync {
    async fn password_grant(
        &self,
        auth: &TerminalAuth,
    ) -> CustomResult<AccessTokenResponseData, ConnectorError>;

    async fn refresh_grant(
        &self,
        terminal_code: &str,
        refresh_token: &Secret<String>,
    ) -> CustomResult<AccessTokenResponseData, ConnectorError>;
}

/// One credential per terminal, guarded by a single lock that is also held across grant calls,
/// so at most one grant per terminal is in flight.
#[derive(Debug)]
pub struct CredentialCache {
    entries: Mutex<HashMap<String, Credential>>,
    expiry_skew: Duration,
}

impl Default for CredentialCache {
    fn default() -> Self {
        Self::new(DEFAULT_EXPIRY_SKEW)
    }
}

impl CredentialCache {
    pub fn new(expiry_skew: Duration) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            expiry_skew,
        }
    }

    pub fn from_skew_secs(expiry_skew_secs: u64) -> Self {
        let skew = i64::try_from(expiry_skew_secs)
            .map(Duration::seconds)
            .unwrap_or(DEFAULT_EXPIRY_SKEW);
        Self::new(skew)
    }

    /// Credential for `terminal_code`, refreshing it first when only the access token expired.
    pub async fn get_token(
        &self,
        terminal_code: &str,
        endpoint: &dyn TokenEndpoint,
    ) -> CustomResult<TokenState, ConnectorError> {
        let mut entries = self.entries.lock().await;
        self.lookup_or_refresh(&mut entries, terminal_code, endpoint)
            .await
    }

    /// Like [Self::get_token], falling through to a password grant when no entry is usable.
    pub async fn ensure_credential(
        &self,
        auth: &TerminalAuth,
        endpoint: &dyn TokenEndpoint,
    ) -> CustomResult<Credential, ConnectorError> {
        let mut entries = self.entries.lock().await;
        match self
            .lookup_or_refresh(&mut entries, &auth.terminal_code, endpoint)
            .await?
        {
            TokenState::Ready(credential) => Ok(credential),
            TokenState::RequiresAuth => {
                tracing::info!(terminal = %auth.terminal_code, "requesting password grant");
                let response = endpoint
                    .password_grant(auth)
                    .await
                    .change_context(ConnectorError::AuthenticationFailed)?;
                let credential = Credential::from_response(response, date_time::now())?;
                entries.insert(auth.terminal_code.clone(), credential.clone());
                Ok(credential)
            }
        }
    }

    /// Replaces the entry of a terminal.
    pub async fn store(&self, terminal_code: &str, credential: Credential) {
        self.entries
            .lock()
            .await
            .insert(terminal_code.to_string(), credential);
    }

    async fn lookup_or_refresh(
        &self,
        entries: &mut HashMap<String, Credential>,
        terminal_code: &str,
        endpoint: &dyn TokenEndpoint,
    ) -> CustomResult<TokenState, ConnectorError> {
        let now = date_time::now();
        let Some(credential) = entries.get(terminal_code) else {
            return Ok(TokenState::RequiresAuth);
        };
        if credential.is_access_valid(now, self.expiry_skew) {
            return Ok(TokenState::Ready(credential.clone()));
        }
        if !credential.is_refresh_valid(now, self.expiry_skew) {
            entries.remove(terminal_code);
            return Ok(TokenState::RequiresAuth);
        }

        tracing::info!(terminal = %terminal_code, "refreshing access token");
        let refresh_token = credential.refresh_token.clone();
        match endpoint.refresh_grant(terminal_code, &refresh_token).await {
            Ok(response) => match Credential::from_response(response, date_time::now()) {
                Ok(refreshed) => {
                    entries.insert(terminal_code.to_string(), refreshed.clone());
                    Ok(TokenState::Ready(refreshed))
                }
                Err(error) => {
                    entries.remove(terminal_code);
                    Err(error)
                }
            },
            Err(error) => {
                entries.remove(terminal_code);
                tracing::warn!(terminal = %terminal_code, ?error, "refresh grant failed");
                Err(error.change_context(ConnectorError::AuthenticationFailed))
            }
        }
    }
}

impl TerminalAuth {
    pub(crate) fn form_fields(self) -> Vec<(String, hyperswitch_masking::Maskable<String>)> {
        use hyperswitch_masking::Mask;
        vec![
            ("grant_type".to_string(), "password".to_string().into()),
            ("terminal_code".to_string(), self.terminal_code.into()),
            ("password".to_string(), self.password.into_masked()),
        ]
    }
}

pub(crate) fn refresh_form_fields(
    terminal_code: &str,
    refresh_token: &Secret<String>,
) -> Vec<(String, hyperswitch_masking::Maskable<String>)> {
    use hyperswitch_masking::Mask;
    vec![
        ("grant_type".to_string(), "refresh_token".to_string().into()),
        ("terminal_code".to_string(), terminal_code.to_string().into()),
        (
            "refresh_token".to_string(),
            refresh_token.clone().into_masked(),
        ),
    ]
}
