use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::{
    Result, ShareLock,
    store::{AuthProvider, Identity, Signer},
};

/// Signs by hashing a local secret together with the message.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    secret: String,
}

impl LocalSigner {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn sign_message(
        &self,
        message: &str,
    ) -> Result<String> {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(message.as_bytes());
        Ok(format!("0x{}", hex::encode(hasher.finalize())))
    }
}

/// Identity held in memory; sign in and out by hand.
#[derive(Clone, Default)]
pub struct StaticAuth {
    identity: ShareLock<Option<Identity>>,
}

impl StaticAuth {
    pub fn new() -> Self {
        Self {
            identity: Arc::new(RwLock::new(None)),
        }
    }

    /// Provider already signed in as `account` with a [`LocalSigner`].
    pub fn signed_in(
        account: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let auth = Self::new();
        let account = account.into();
        auth.sign_in(Identity {
            signer: Arc::new(LocalSigner::new(account.clone())),
            account,
            token: token.into(),
        });
        auth
    }

    pub fn sign_in(
        &self,
        identity: Identity,
    ) {
        info!("auth: signed in as {}", identity.account);
        *self.identity.write().unwrap() = Some(identity);
    }

    pub fn sign_out(&self) {
        if let Some(identity) = self.identity.write().unwrap().take() {
            info!("auth: signed out {}", identity.account);
        }
    }
}

impl AuthProvider for StaticAuth {
    fn identity(&self) -> Option<Identity> {
        self.identity.read().unwrap().clone()
    }
}
