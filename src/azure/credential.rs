use std::env;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use crate::config::AzureConfig;
use crate::error::{PimError, PimResult};

/// Source of bearer tokens for an Azure resource audience.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn token(&self, resource: &str) -> PimResult<String>;
}

/// Tokens handed in through `PIM_ARM_TOKEN` / `PIM_GRAPH_TOKEN`.
#[derive(Debug, Clone, Default)]
pub struct EnvTokenCredential {
    tokens: Vec<(String, String)>,
    any: Option<String>,
}

impl EnvTokenCredential {
    /// `None` when neither variable is set.
    pub fn from_env(azure: &AzureConfig) -> Option<Self> {
        let mut tokens = Vec::new();
        for (var, resource) in [
            ("PIM_ARM_TOKEN", &azure.arm_resource),
            ("PIM_GRAPH_TOKEN", &azure.graph_resource),
        ] {
            if let Ok(token) = env::var(var) {
                if !token.trim().is_empty() {
                    tokens.push((resource.clone(), token.trim().to_string()));
                }
            }
        }
        if tokens.is_empty() {
            None
        } else {
            Some(Self { tokens, any: None })
        }
    }

    /// One token for every resource.
    pub fn fixed(token: impl Into<String>) -> Self {
        Self {
            tokens: Vec::new(),
            any: Some(token.into()),
        }
    }
}

#[async_trait]
impl TokenProvider for EnvTokenCredential {
    fn name(&self) -> &'static str {
        "environment"
    }

    async fn token(&self, resource: &str) -> PimResult<String> {
        self.tokens
            .iter()
            .find(|(r, _)| r == resource)
            .map(|(_, token)| token.clone())
            .or_else(|| self.any.clone())
            .ok_or_else(|| PimError::credential(format!("no token configured for {}", resource)))
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CliToken {
    access_token: String,
}

/// Delegated tokens from an `az login` session.
#[derive(Debug, Clone, Default)]
pub struct AzureCliCredential {
    tenant_id: Option<String>,
}

impl AzureCliCredential {
    pub fn new(tenant_id: Option<String>) -> Self {
        Self { tenant_id }
    }
}

#[async_trait]
impl TokenProvider for AzureCliCredential {
    fn name(&self) -> &'static str {
        "azure cli"
    }

    async fn token(&self, resource: &str) -> PimResult<String> {
        let mut cmd = Command::new("az");
        cmd.args(["account", "get-access-token", "--resource", resource, "--output", "json"]);
        if let Some(tenant) = &self.tenant_id {
            cmd.arg("--tenant").arg(tenant);
        }

        debug!(resource, "requesting token from az cli");
        let output = cmd
            .output()
            .await
            .map_err(|e| PimError::credential(format!("run az cli: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PimError::credential(format!(
                "az account get-access-token failed: {}",
                stderr.trim()
            )));
        }

        let parsed: CliToken = serde_json::from_slice(&output.stdout)
            .map_err(|e| PimError::credential(format!("parse az cli token: {}", e)))?;
        Ok(parsed.access_token)
    }
}

/// Tries each provider in turn and returns the first token obtained.
pub struct ChainedCredential {
    providers: Vec<Box<dyn TokenProvider>>,
}

impl ChainedCredential {
    pub fn new(providers: Vec<Box<dyn TokenProvider>>) -> Self {
        Self { providers }
    }

    /// Environment tokens when present, then the Azure CLI.
    pub fn default_chain(azure: &AzureConfig) -> Self {
        let mut providers: Vec<Box<dyn TokenProvider>> = Vec::new();
        if let Some(env_cred) = EnvTokenCredential::from_env(azure) {
            providers.push(Box::new(env_cred));
        }
        providers.push(Box::new(AzureCliCredential::new(azure.tenant_id.clone())));
        Self::new(providers)
    }
}

#[async_trait]
impl TokenProvider for ChainedCredential {
    fn name(&self) -> &'static str {
        "chain"
    }

    async fn token(&self, resource: &str) -> PimResult<String> {
        let mut failures = Vec::new();
        for provider in &self.providers {
            match provider.token(resource).await {
                Ok(token) => return Ok(token),
                Err(e) => {
                    debug!(provider = provider.name(), error = %e, "token provider failed");
                    failures.push(format!("{}: {}", provider.name(), e));
                }
            }
        }
        Err(PimError::credential(format!(
            "no supported Azure login found; sign in with 'az login' ({})",
            failures.join("; ")
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl TokenProvider for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        async fn token(&self, _resource: &str) -> PimResult<String> {
            Err(PimError::credential("not signed in"))
        }
    }

    #[tokio::test]
    async fn test_chain_returns_first_success() {
        let chain = ChainedCredential::new(vec![
            Box::new(Failing),
            Box::new(EnvTokenCredential::fixed("abc")),
        ]);
        assert_eq!(chain.token("https://management.azure.com/").await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_chain_reports_every_failure() {
        let chain = ChainedCredential::new(vec![Box::new(Failing)]);
        let err = chain.token("r").await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("az login"));
        assert!(message.contains("failing: credential error: not signed in"));
    }
}
