use clap::Args;
use serde_json::json;

use super::{connect, sign_in};
use crate::activation::{activate, ActivateOptions};
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::duration;
use crate::error::PimResult;
use crate::filter::FilterConfig;
use crate::prompt::Prompter;

#[derive(Args, Debug, Default)]
pub struct ActivateArgs {
    #[arg(short = 'j', long, help = "Reason for the activation (prompted if omitted)")]
    pub justification: Option<String>,

    #[arg(short = 't', long = "time", value_name = "DURATION", help = "Duration such as 1h, 90m or 1h30m (30m steps, 30m-8h)")]
    pub time: Option<String>,

    #[arg(long = "management-group", visible_alias = "mg", value_name = "NAME", help = "Filter roles by management group (repeatable)")]
    pub management_groups: Vec<String>,

    #[arg(long = "subscription", visible_alias = "sub", value_name = "NAME", help = "Filter roles by subscription (repeatable)")]
    pub subscriptions: Vec<String>,

    #[arg(long = "resource-group", visible_alias = "rg", value_name = "NAME", help = "Target resource group hints (repeatable)")]
    pub resource_groups: Vec<String>,

    #[arg(long = "role", value_name = "NAME", help = "Filter roles by name (repeatable)")]
    pub roles: Vec<String>,

    #[arg(long = "scope-contains", visible_alias = "scope", value_name = "TEXT", help = "Advanced scope substring filter (repeatable)")]
    pub scope_contains: Vec<String>,

    #[arg(short = 'y', long, help = "Skip the confirmation prompt")]
    pub yes: bool,
}

impl ActivateArgs {
    /// Parse the duration text; range and step are checked by the flow.
    pub fn into_options(self) -> PimResult<ActivateOptions> {
        let minutes = match self.time.as_deref().map(str::trim) {
            Some(text) if !text.is_empty() => Some(duration::parse_duration(text)?),
            _ => None,
        };

        Ok(ActivateOptions {
            justification: self.justification.unwrap_or_default(),
            minutes,
            filters: FilterConfig {
                management_groups: self.management_groups,
                subscriptions: self.subscriptions,
                resource_groups: self.resource_groups,
                scope_contains: self.scope_contains,
                roles: self.roles,
            }
            .normalized(),
            skip_confirmation: self.yes,
        })
    }
}

pub async fn handle(
    options: ActivateOptions,
    prompter: &mut Prompter<'_>,
    output_format: OutputFormat,
) -> anyhow::Result<()> {
    let client = connect()?;
    let principal = sign_in(&client, output_format).await?;

    let outcomes = activate(
        &client,
        prompter,
        &principal.id,
        options,
        config().activation.default_minutes,
    )
    .await?;

    if output_format == OutputFormat::Json {
        output_success(
            &output_format,
            &format!("{} activation(s) submitted", outcomes.len()),
            Some(json!({ "activations": outcomes })),
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_flag_values_are_ignored() {
        let args = ActivateArgs {
            subscriptions: vec!["".to_string(), " platform ".to_string()],
            time: Some("1h30m".to_string()),
            ..Default::default()
        };
        let options = args.into_options().unwrap();
        assert_eq!(options.filters.subscriptions, vec!["platform"]);
        assert_eq!(options.minutes, Some(90));
        assert!(options.needs_justification());
    }

    #[test]
    fn test_unparseable_duration_is_rejected() {
        let args = ActivateArgs {
            time: Some("soon".to_string()),
            ..Default::default()
        };
        assert!(args.into_options().unwrap_err().is_validation());
    }
}
