use serde_json::json;

use super::status::split_assignments;
use super::{connect, sign_in};
use crate::azure::PimSource;
use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::error::ResultExt;
use crate::prompt::Prompter;
use crate::types::ActiveAssignment;

pub async fn handle(prompter: &mut Prompter<'_>, output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect()?;
    let principal = sign_in(&client, output_format).await?;
    let assignments = client
        .active_assignments(&principal.id)
        .await
        .context("get active assignments")?;

    // Permanent assignments are admin managed and cannot be self-deactivated.
    let (temporary, _) = split_assignments(assignments);
    if temporary.is_empty() {
        return output_empty_collection(&output_format, "assignments", "No active assignments found.");
    }

    prompter.say("\nActive assignments:");
    let choice = prompter
        .select_option(&temporary, "Select assignment to deactivate", |i, a: &ActiveAssignment| {
            format!("  {:2}) {} @ {}", i, a.role_name, a.scope_display)
        })
        .context("selection")?;
    let chosen = &temporary[choice];

    let response = client
        .submit_deactivation(chosen, &principal.id)
        .await
        .context("deactivate role")?;

    output_success(
        &output_format,
        &format!("Deactivation successful (status: {})", response.status),
        Some(json!({
            "role": chosen.role_name,
            "scope": chosen.scope,
            "request": response.name,
            "status": response.status,
        })),
    )
}
