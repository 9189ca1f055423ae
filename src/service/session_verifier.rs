use std::sync::Arc;

use crate::{
    service::identity::{AuthError, IdentityProvider},
    utils::token::IdentityClaims,
};

/// Thin pass-through to the identity provider's session-cookie check.
#[derive(Clone)]
pub struct SessionVerifier {
    identity: Option<Arc<dyn IdentityProvider>>,
}

impl SessionVerifier {
    pub fn new(identity: Option<Arc<dyn IdentityProvider>>) -> Self {
        Self { identity }
    }

    pub async fn verify(
        &self,
        cookie: &str,
        check_revoked: bool,
    ) -> Result<IdentityClaims, AuthError> {
        match &self.identity {
            Some(provider) => provider.verify_session_cookie(cookie, check_revoked).await,
            None => Err(AuthError::NotConfigured),
        }
    }
}

impl std::fmt::Debug for SessionVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionVerifier")
            .field("configured", &self.identity.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::usermodel::UserRole,
        service::identity::{tests::provider, Identity},
    };
    use std::time::Duration;
    use uuid::Uuid;

    #[tokio::test]
    async fn unconfigured_verifier_rejects_everything() {
        let verifier = SessionVerifier::new(None);
        let err = verifier.verify("anything", true).await.unwrap_err();
        assert!(matches!(err, AuthError::NotConfigured));
    }

    #[tokio::test]
    async fn passes_through_to_provider() {
        let provider: Arc<dyn IdentityProvider> = Arc::new(provider());
        let who = Identity {
            uid: Uuid::new_v4(),
            name: "Dewi".to_string(),
            role: UserRole::Penyewa,
        };
        let id_token = provider.mint_id_token(&who).unwrap();
        let cookie = provider
            .create_session_cookie(&id_token, Duration::from_secs(3600))
            .await
            .unwrap();

        let verifier = SessionVerifier::new(Some(provider));
        let claims = verifier.verify(&cookie, true).await.unwrap();
        assert_eq!(claims.name, "Dewi");
    }
}
