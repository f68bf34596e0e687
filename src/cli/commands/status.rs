use serde_json::json;

use super::{connect, sign_in};
use crate::azure::PimSource;
use crate::cli::utils::output_empty_collection;
use crate::cli::OutputFormat;
use crate::types::ActiveAssignment;

/// Temporary elevations first, then permanent assignments.
pub fn split_assignments(assignments: Vec<ActiveAssignment>) -> (Vec<ActiveAssignment>, Vec<ActiveAssignment>) {
    assignments.into_iter().partition(|a| !a.is_permanent())
}

pub async fn handle(output_format: OutputFormat) -> anyhow::Result<()> {
    let client = connect()?;
    let principal = sign_in(&client, output_format).await?;
    let assignments = client.active_assignments(&principal.id).await?;

    if assignments.is_empty() {
        return output_empty_collection(&output_format, "assignments", "No active assignments found.");
    }

    let (temporary, permanent) = split_assignments(assignments);
    match output_format {
        OutputFormat::Json => {
            let temporary: Vec<_> = temporary
                .iter()
                .map(|a| {
                    json!({
                        "role": a.role_name,
                        "scope": a.scope,
                        "scope_display": a.scope_display,
                        "end_date_time": a.end_date_time,
                        "expiry": a.expiry_display(),
                    })
                })
                .collect();
            let permanent: Vec<_> = permanent
                .iter()
                .map(|a| {
                    json!({
                        "role": a.role_name,
                        "scope": a.scope,
                        "scope_display": a.scope_display,
                    })
                })
                .collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&json!({ "temporary": temporary, "permanent": permanent }))?
            );
        }
        OutputFormat::Text => {
            let mut index = 1;
            if !temporary.is_empty() {
                println!("\nTemporary elevations ({}):", temporary.len());
                for a in &temporary {
                    println!("  {:2}) {} @ {} ({})", index, a.role_name, a.scope_display, a.expiry_display());
                    index += 1;
                }
            }
            if !permanent.is_empty() {
                println!("\nPermanent assignments ({}):", permanent.len());
                for a in &permanent {
                    println!("  {:2}) {} @ {} (no expiry - admin managed)", index, a.role_name, a.scope_display);
                    index += 1;
                }
            }
        }
    }

    Ok(())
}
