//! AWS Secrets Manager-backed [`SecretStore`].

use aws_config::BehaviorVersion;
use aws_sdk_secretsmanager::config::Region;
use aws_sdk_secretsmanager::error::DisplayErrorContext;
use aws_sdk_secretsmanager::Client;
use tokio::runtime::Runtime;

use agol_core::{SecretStore, SecretStoreError};

use crate::runtime::blocking_runtime;

/// Region the credential secret lives in unless configured otherwise.
pub const DEFAULT_SECRETS_REGION: &str = "us-east-1";

#[derive(Debug)]
pub struct SecretsManagerStore {
    client: Client,
    runtime: Runtime,
    region: String,
}

impl SecretsManagerStore {
    pub fn new(region: impl Into<String>) -> std::io::Result<Self> {
        let region = region.into();
        let runtime = blocking_runtime()?;
        let config = runtime.block_on(
            aws_config::defaults(BehaviorVersion::latest())
                .region(Region::new(region.clone()))
                .load(),
        );
        Ok(Self {
            client: Client::new(&config),
            runtime,
            region,
        })
    }

    pub fn region(&self) -> &str {
        &self.region
    }
}

impl SecretStore for SecretsManagerStore {
    fn secret_string(&self, secret_id: &str) -> Result<String, SecretStoreError> {
        tracing::debug!("get secret {secret_id} in {}", self.region);
        let response = self
            .runtime
            .block_on(self.client.get_secret_value().secret_id(secret_id).send())
            .map_err(|e| SecretStoreError::Store {
                secret_id: secret_id.to_string(),
                message: DisplayErrorContext(&e).to_string(),
            })?;
        secret_text(
            response.secret_string(),
            response.secret_binary().map(|blob| -> &[u8] { blob.as_ref() }),
        )
        .ok_or_else(|| SecretStoreError::Empty {
            secret_id: secret_id.to_string(),
        })
    }
}

/// Prefer the string payload; fall back to a UTF-8 binary payload.
fn secret_text(string: Option<&str>, binary: Option<&[u8]>) -> Option<String> {
    string
        .map(ToString::to_string)
        .or_else(|| binary.map(|b| String::from_utf8_lossy(b).into_owned()))
}
