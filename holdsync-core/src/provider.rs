//! Provider subprocess transport.
//!
//! Calendar access is delegated to external provider binaries (e.g.
//! `holdsync-provider-google`) speaking the JSON protocol from
//! [`crate::protocol`] over stdin/stdout. Providers manage their own
//! credentials, token refresh and retries; holdsync only passes
//! parameters through.

use std::time::Duration;

use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::error::{HoldSyncError, HoldSyncResult};
use crate::protocol::{Command as ProviderCommand, Request, Response};

const PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

/// A provider, identified by name ("google", "caldav", ...).
#[derive(Debug, Clone)]
pub struct Provider(String);

impl Provider {
    pub fn from_name(name: &str) -> Provider {
        Provider(name.to_string())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    fn binary_path(&self) -> HoldSyncResult<std::path::PathBuf> {
        let binary_name = format!("holdsync-provider-{}", self.0);
        which::which(&binary_name)
            .map_err(|_| HoldSyncError::ProviderNotInstalled(binary_name))
    }

    /// Run one provider command: spawn the binary, write the request
    /// line, read the response. Each call is a fresh process.
    pub async fn call<R: DeserializeOwned>(
        &self,
        command: ProviderCommand,
        params: serde_json::Value,
    ) -> HoldSyncResult<R> {
        timeout(PROVIDER_TIMEOUT, self.call_inner(command, params))
            .await
            .map_err(|_| HoldSyncError::ProviderTimeout(PROVIDER_TIMEOUT.as_secs()))?
    }

    async fn call_inner<R: DeserializeOwned>(
        &self,
        command: ProviderCommand,
        params: serde_json::Value,
    ) -> HoldSyncResult<R> {
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| HoldSyncError::Serialization(e.to_string()))?;

        let binary_path = self.binary_path()?;

        let mut child = Command::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .spawn()
            .map_err(|e| {
                HoldSyncError::Provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        // Write request to stdin (unwrap safe: we piped stdin above)
        let mut stdin = child.stdin.take().unwrap();
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await?;
        drop(stdin);

        let output = child.wait_with_output().await?;

        if !output.status.success() {
            return Err(HoldSyncError::Provider(format!(
                "Provider exited with status: {}",
                output.status.code().unwrap_or(-1)
            )));
        }

        let response_str = String::from_utf8_lossy(&output.stdout);
        if response_str.trim().is_empty() {
            return Err(HoldSyncError::Provider(
                "Provider returned no response".into(),
            ));
        }

        let response: Response<R> = serde_json::from_str(&response_str)
            .map_err(|e| HoldSyncError::Provider(format!("Failed to parse response: {}", e)))?;

        match response {
            Response::Success { data } => Ok(data),
            Response::Error { error } => Err(HoldSyncError::Provider(error)),
        }
    }
}
