//! Bearer token held for the signed-in user.

use async_trait::async_trait;
use citas_core::{BackendError, BackendResult, CredentialProvider};
use tokio::sync::RwLock;

/// Token pushed in by the host app after it signs the user in with the
/// identity provider. The host owns refresh; this only stores the latest.
#[derive(Debug, Default)]
pub struct SessionCredentials {
    token: RwLock<Option<String>>,
}

impl SessionCredentials {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    pub async fn clear(&self) {
        *self.token.write().await = None;
    }

    pub async fn is_signed_in(&self) -> bool {
        self.token.read().await.is_some()
    }
}

#[async_trait]
impl CredentialProvider for SessionCredentials {
    async fn bearer_token(&self) -> BackendResult<String> {
        match self.token.read().await.as_ref() {
            Some(token) if !token.is_empty() => Ok(token.clone()),
            _ => Err(BackendError::Unauthorized),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_token_lifecycle() {
        let creds = SessionCredentials::new();
        assert!(matches!(
            creds.bearer_token().await,
            Err(BackendError::Unauthorized)
        ));

        creds.set("jwt-123".into()).await;
        assert!(creds.is_signed_in().await);
        assert_eq!(creds.bearer_token().await.unwrap(), "jwt-123");

        creds.clear().await;
        assert!(!creds.is_signed_in().await);
        assert!(creds.bearer_token().await.is_err());
    }

    #[tokio::test]
    async fn test_empty_token_is_unauthorized() {
        let creds = SessionCredentials::new();
        creds.set(String::new()).await;
        assert!(matches!(
            creds.bearer_token().await,
            Err(BackendError::Unauthorized)
        ));
    }
}
