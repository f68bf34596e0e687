// Activation flow: validate, pick roles, resolve scopes, confirm, submit
use serde::Serialize;
use tracing::{info, warn};

use crate::azure::PimSource;
use crate::duration;
use crate::error::{PimError, PimResult, ResultExt};
use crate::filter::{filter_eligible_roles, FilterConfig};
use crate::prompt::inputs::PlannedActivation;
use crate::prompt::Prompter;
use crate::resolver::ScopeResolver;
use crate::types::{ActivationTarget, EligibleRole, ScheduleResponse};

/// What the operator asked for.
#[derive(Debug, Clone, Default)]
pub struct ActivateOptions {
    pub justification: String,
    /// Minutes given explicitly by the operator; `None` takes the default.
    pub minutes: Option<u32>,
    pub filters: FilterConfig,
    pub skip_confirmation: bool,
}

impl ActivateOptions {
    pub fn needs_justification(&self) -> bool {
        self.justification.trim().is_empty()
    }
}

/// One submitted request.
#[derive(Debug, Clone, Serialize)]
pub struct ActivationOutcome {
    pub role: EligibleRole,
    pub target: ActivationTarget,
    pub minutes: u32,
    pub response: ScheduleResponse,
}

/// Run the activation flow for `principal_id`.
///
/// Validation happens before any network call. Roles whose target scope
/// cannot be determined are skipped with a warning; submissions stop at
/// the first failure.
pub async fn activate(
    source: &dyn PimSource,
    prompter: &mut Prompter<'_>,
    principal_id: &str,
    mut options: ActivateOptions,
    default_minutes: u32,
) -> PimResult<Vec<ActivationOutcome>> {
    let minutes = match options.minutes {
        Some(explicit) => explicit,
        None => duration::normalize_default(default_minutes),
    };

    if options.needs_justification() {
        prompter.say("A justification is required before we can submit an activation request.");
        options.justification = prompter.justification()?;
    }

    duration::validate_minutes(minutes)?;
    let justification = options.justification.trim().to_string();
    if justification.is_empty() {
        return Err(PimError::validation("justification cannot be empty"));
    }
    let filters = options.filters;

    print_summary(prompter, &justification, minutes, &filters);

    let roles = source.eligible_roles().await.context("get eligible roles")?;
    let roles = filter_eligible_roles(&roles, &filters);
    if roles.is_empty() {
        return Err(PimError::NoEligibleRoles {
            filtered: filters.has_filters(),
        });
    }

    let selected = if roles.len() == 1 && filters.has_filters() {
        prompter.say(&format!(
            "\nEligible role matched filters: {} @ {}",
            roles[0].role_name, roles[0].scope_display
        ));
        roles
    } else {
        prompter.say(&format!("\nEligible roles ({}):", roles.len()));
        prompter
            .select_many(
                &roles,
                "Select role(s) to activate",
                |i, r: &EligibleRole| format!("  {:2}) {} @ {}", i, r.role_name, r.scope_display),
                |r: &EligibleRole| format!("{} {} {}", r.role_name, r.scope_display, r.scope),
            )
            .context("selection")?
    };

    let mut pairs: Vec<(EligibleRole, ActivationTarget)> = Vec::new();
    let mut first_failure: Option<PimError> = None;
    for role in &selected {
        let resolved = ScopeResolver::new(source, prompter, &filters).resolve(role).await;
        match resolved {
            Ok(targets) => pairs.extend(targets.into_iter().map(|t| (role.clone(), t))),
            Err(e) if e.is_cancelled() => return Err(e),
            Err(e) => {
                let e = e.with_context(format!(
                    "determine target scope for {} @ {}",
                    role.role_name, role.scope_display
                ));
                warn!(role = %role.role_name, error = %e, "skipping role");
                prompter.say(&format!("⚠️  Skipping {} @ {}: {}", role.role_name, role.scope_display, e));
                first_failure.get_or_insert(e);
            }
        }
    }

    if pairs.is_empty() {
        return Err(first_failure.unwrap_or(PimError::NoItems));
    }

    if !options.skip_confirmation {
        let planned: Vec<PlannedActivation> = pairs
            .iter()
            .map(|(role, target)| PlannedActivation {
                role_name: role.role_name.clone(),
                target_display: target.display().to_string(),
            })
            .collect();
        prompter.confirm_activation(&planned, minutes, &justification)?;
    }

    let mut outcomes = Vec::with_capacity(pairs.len());
    for (role, target) in pairs {
        let response = source
            .submit_activation(&role, principal_id, &justification, minutes, target.scope())
            .await
            .with_context(|| format!("activate role {} @ {}", role.role_name, target.display()))?;

        info!(role = %role.role_name, scope = target.scope(), status = %response.status, "activation submitted");
        prompter.say(&format!(
            "✓ Activation submitted for {} @ {} ({}) (status: {})",
            role.role_name,
            target.display(),
            duration::format_minutes(minutes),
            response.status
        ));
        outcomes.push(ActivationOutcome {
            role,
            target,
            minutes,
            response,
        });
    }

    Ok(outcomes)
}

fn print_summary(prompter: &mut Prompter<'_>, justification: &str, minutes: u32, filters: &FilterConfig) {
    prompter.say("\nActivation overview:");
    prompter.say(&format!("  Justification : {}", justification));
    prompter.say(&format!("  Duration      : {}", duration::format_minutes(minutes)));
    if !filters.has_filters() {
        prompter.say("  Filters       : none (all eligible roles will be shown)");
    } else {
        prompter.say("  Filters       :");
        for (label, values) in [
            ("management group", &filters.management_groups),
            ("subscription", &filters.subscriptions),
            ("resource group", &filters.resource_groups),
            ("role", &filters.roles),
            ("scope contains", &filters.scope_contains),
        ] {
            if !values.is_empty() {
                prompter.say(&format!("    {}: {}", label, values.join(", ")));
            }
        }
    }
    prompter.say("");
}
