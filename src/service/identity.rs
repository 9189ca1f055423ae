// service/identity.rs
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use thiserror::Error;
use uuid::Uuid;

use crate::{
    config::ServiceAccount,
    db::{db::DBClient, userdb::UserExt},
    models::usermodel::UserRole,
    utils::token::{self, IdentityClaims},
};

const ID_TOKEN_TTL_SECS: i64 = 60 * 60;
/// A session cookie can only be created from a sign-in this recent.
const RECENT_SIGN_IN_SECS: i64 = 5 * 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token has expired")]
    Expired,

    #[error("sign-in is too old to create a session")]
    StaleSignIn,

    #[error("session has been revoked")]
    Revoked,

    #[error("identity provider is not configured")]
    NotConfigured,

    #[error("revocation store failure: {0}")]
    Store(String),
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::InvalidToken(err.to_string()),
        }
    }
}

/// Who a freshly minted ID token speaks for.
#[derive(Debug, Clone)]
pub struct Identity {
    pub uid: Uuid,
    pub name: String,
    pub role: UserRole,
}

/// Where the per-user "tokens valid after" mark lives.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    async fn tokens_valid_after(&self, uid: Uuid) -> Result<Option<DateTime<Utc>>, AuthError>;

    async fn revoke(&self, uid: Uuid, at: DateTime<Utc>) -> Result<(), AuthError>;
}

#[async_trait]
impl RevocationStore for DBClient {
    async fn tokens_valid_after(&self, uid: Uuid) -> Result<Option<DateTime<Utc>>, AuthError> {
        self.get_tokens_valid_after(uid)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }

    async fn revoke(&self, uid: Uuid, at: DateTime<Utc>) -> Result<(), AuthError> {
        self.revoke_user_tokens(uid, at)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))
    }
}

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn mint_id_token(&self, identity: &Identity) -> Result<String, AuthError>;

    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims, AuthError>;

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, AuthError>;

    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<IdentityClaims, AuthError>;

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), AuthError>;
}

/// HS256 identity provider keyed by the service-account credential.
pub struct TokenIdentityProvider {
    project_id: String,
    secret: Vec<u8>,
    store: Arc<dyn RevocationStore>,
}

impl TokenIdentityProvider {
    pub fn new(
        project_id: impl Into<String>,
        secret: impl Into<Vec<u8>>,
        store: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            secret: secret.into(),
            store,
        }
    }

    pub fn from_service_account(account: &ServiceAccount, store: Arc<dyn RevocationStore>) -> Self {
        Self::new(
            account.project_id.clone(),
            account.private_key.as_bytes().to_vec(),
            store,
        )
    }

    fn id_issuer(&self) -> String {
        format!("kelarapp-id/{}", self.project_id)
    }

    fn session_issuer(&self) -> String {
        format!("kelarapp-session/{}", self.project_id)
    }

    fn parse_uid(sub: &str) -> Result<Uuid, AuthError> {
        Uuid::parse_str(sub).map_err(|_| AuthError::InvalidToken("subject is not a user id".to_string()))
    }
}

impl std::fmt::Debug for TokenIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIdentityProvider")
            .field("project_id", &self.project_id)
            .finish()
    }
}

#[async_trait]
impl IdentityProvider for TokenIdentityProvider {
    fn mint_id_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = IdentityClaims {
            sub: identity.uid.to_string(),
            name: identity.name.clone(),
            role: Some(identity.role),
            iss: self.id_issuer(),
            aud: self.project_id.clone(),
            iat: now,
            exp: now + ID_TOKEN_TTL_SECS,
            auth_time: now,
        };

        Ok(token::create_token(&claims, &self.secret)?)
    }

    async fn verify_id_token(&self, id_token: &str) -> Result<IdentityClaims, AuthError> {
        Ok(token::decode_token(
            id_token,
            &self.secret,
            &self.id_issuer(),
            &self.project_id,
        )?)
    }

    async fn create_session_cookie(
        &self,
        id_token: &str,
        expires_in: Duration,
    ) -> Result<String, AuthError> {
        let id_claims = self.verify_id_token(id_token).await?;

        let now = Utc::now().timestamp();
        if now - id_claims.auth_time > RECENT_SIGN_IN_SECS {
            return Err(AuthError::StaleSignIn);
        }

        let claims = IdentityClaims {
            iss: self.session_issuer(),
            iat: now,
            exp: now + expires_in.as_secs() as i64,
            ..id_claims
        };

        Ok(token::create_token(&claims, &self.secret)?)
    }

    async fn verify_session_cookie(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<IdentityClaims, AuthError> {
        let claims = token::decode_token(
            cookie,
            &self.secret,
            &self.session_issuer(),
            &self.project_id,
        )?;

        if check_revoked {
            let uid = Self::parse_uid(&claims.sub)?;
            if let Some(valid_after) = self.store.tokens_valid_after(uid).await? {
                if claims.auth_time < valid_after.timestamp() {
                    return Err(AuthError::Revoked);
                }
            }
        }

        Ok(claims)
    }

    async fn revoke_refresh_tokens(&self, uid: &str) -> Result<(), AuthError> {
        let uid = Self::parse_uid(uid)?;
        self.store.revoke(uid, Utc::now()).await
    }
}
