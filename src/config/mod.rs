use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

use crate::duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub azure: AzureConfig,
    pub http: HttpConfig,
    pub activation: ActivationConfig,
    pub prompt: PromptConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    pub arm_endpoint: String,
    pub graph_endpoint: String,
    pub arm_resource: String,
    pub graph_resource: String,
    pub pim_api_version: String,
    pub management_api_version: String,
    pub resources_api_version: String,
    pub resource_graph_api_version: String,
    pub tenant_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    pub request_timeout_secs: u64,
    /// Budget for every network call of one run, start to exit.
    pub run_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationConfig {
    pub default_minutes: u32,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PromptConfig {
    pub max_display: usize,
    pub search_limit: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_display: 50,
            search_limit: 20,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::defaults().with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Azure overrides
        if let Ok(v) = env::var("PIM_ARM_ENDPOINT") {
            self.azure.arm_endpoint = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PIM_GRAPH_ENDPOINT") {
            self.azure.graph_endpoint = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("PIM_ARM_RESOURCE") {
            self.azure.arm_resource = v;
        }
        if let Ok(v) = env::var("PIM_GRAPH_RESOURCE") {
            self.azure.graph_resource = v;
        }
        if let Ok(v) = env::var("PIM_API_VERSION") {
            self.azure.pim_api_version = v;
        }
        if let Ok(v) = env::var("AZURE_TENANT_ID") {
            if !v.trim().is_empty() {
                self.azure.tenant_id = Some(v.trim().to_string());
            }
        }

        // HTTP overrides
        if let Ok(v) = env::var("PIM_REQUEST_TIMEOUT_SECS") {
            self.http.request_timeout_secs = v.parse().unwrap_or(self.http.request_timeout_secs);
        }
        if let Ok(v) = env::var("PIM_RUN_TIMEOUT_SECS") {
            self.http.run_timeout_secs = v.parse().unwrap_or(self.http.run_timeout_secs);
        }

        // Activation overrides
        if let Ok(v) = env::var("PIM_DEFAULT_DURATION") {
            if let Ok(minutes) = duration::parse_duration(&v) {
                self.activation.default_minutes = duration::normalize_default(minutes);
            }
        }

        // Prompt overrides
        if let Ok(v) = env::var("PIM_MAX_DISPLAY") {
            self.prompt.max_display = v.parse().unwrap_or(self.prompt.max_display).max(1);
        }
        if let Ok(v) = env::var("PIM_SEARCH_LIMIT") {
            self.prompt.search_limit = v.parse().unwrap_or(self.prompt.search_limit).max(1);
        }

        self
    }

    pub fn defaults() -> Self {
        Self {
            azure: AzureConfig {
                arm_endpoint: "https://management.azure.com".to_string(),
                graph_endpoint: "https://graph.microsoft.com/v1.0".to_string(),
                arm_resource: "https://management.azure.com/".to_string(),
                graph_resource: "https://graph.microsoft.com/".to_string(),
                pim_api_version: "2020-10-01".to_string(),
                management_api_version: "2020-05-01".to_string(),
                resources_api_version: "2021-04-01".to_string(),
                resource_graph_api_version: "2021-03-01".to_string(),
                tenant_id: None,
            },
            http: HttpConfig {
                request_timeout_secs: 30,
                run_timeout_secs: 120,
                user_agent: format!("pim-client/{}", env!("CARGO_PKG_VERSION")),
            },
            activation: ActivationConfig {
                default_minutes: duration::DEFAULT_MINUTES,
            },
            prompt: PromptConfig::default(),
        }
    }

    /// Same defaults, pointed at other ARM and Graph hosts.
    pub fn with_endpoints(arm_endpoint: &str, graph_endpoint: &str) -> Self {
        let mut config = Self::defaults();
        config.azure.arm_endpoint = arm_endpoint.trim_end_matches('/').to_string();
        config.azure.graph_endpoint = graph_endpoint.trim_end_matches('/').to_string();
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}
