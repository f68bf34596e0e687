pub mod activate;
pub mod deactivate;
pub mod menu;
pub mod status;

use std::sync::Arc;

use crate::azure::{ChainedCredential, PimClient, PimSource};
use crate::cli::OutputFormat;
use crate::config::config;
use crate::error::PimResult;
use crate::types::Principal;

/// Client for the signed-in operator, bounded by the run deadline.
pub fn connect() -> PimResult<PimClient> {
    let cfg = config();
    let credential = Arc::new(ChainedCredential::default_chain(&cfg.azure));
    PimClient::new(cfg, credential)
}

/// Fetch the signed-in principal and announce it in text mode.
pub async fn sign_in(client: &PimClient, output_format: OutputFormat) -> PimResult<Principal> {
    let principal = client.current_principal().await?;
    if output_format == OutputFormat::Text {
        println!(
            "Authenticated as: {} ({})",
            principal.display_name, principal.user_principal_name
        );
    }
    Ok(principal)
}
