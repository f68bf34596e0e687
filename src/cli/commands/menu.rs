use crate::activation::ActivateOptions;
use crate::cli::OutputFormat;
use crate::config::config;
use crate::error::PimResult;
use crate::filter::FilterConfig;
use crate::prompt::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Activate,
    Status,
    Deactivate,
    Version,
    Help,
}

const MENU: [(&str, MenuAction); 5] = [
    ("Activate eligible role(s)", MenuAction::Activate),
    ("View my active assignments", MenuAction::Status),
    ("Deactivate an assignment", MenuAction::Deactivate),
    ("Show version", MenuAction::Version),
    ("Help / flag reference", MenuAction::Help),
];

pub fn choose_action(prompter: &mut Prompter<'_>) -> PimResult<MenuAction> {
    let idx = prompter.select_option(&MENU, "Choose an action", |i, entry: &(&str, MenuAction)| {
        format!("  {:2}) {}", i, entry.0)
    })?;
    Ok(MENU[idx].1)
}

/// Collect activation settings one question at a time.
pub fn collect_activation(prompter: &mut Prompter<'_>, default_minutes: u32) -> PimResult<ActivateOptions> {
    prompter.say("\n--- Activate eligible role(s) ---");
    prompter.say("You can always press 'q' to cancel any prompt.");

    let justification = prompter.justification()?;
    let minutes = prompter.duration(default_minutes)?;

    let mut filters = FilterConfig::default();
    if prompter.yes_no("Add filters (management group, subscription, etc.)?", false)? {
        filters.management_groups = prompter.csv("Management group filter(s)")?;
        filters.subscriptions = prompter.csv("Subscription filter(s)")?;
        filters.resource_groups = prompter.csv("Resource group hint(s)")?;
        filters.roles = prompter.csv("Role name filter(s)")?;
        filters.scope_contains = prompter.csv("Scope contains filter(s)")?;
    }

    prompter.say("\nTip: next time you can run 'pim activate --help' to see the equivalent flags.");
    Ok(ActivateOptions {
        justification,
        minutes: Some(minutes),
        filters: filters.normalized(),
        skip_confirmation: false,
    })
}

pub async fn handle(prompter: &mut Prompter<'_>, output_format: OutputFormat) -> anyhow::Result<()> {
    match choose_action(prompter)? {
        MenuAction::Activate => {
            let options = collect_activation(prompter, config().activation.default_minutes)?;
            super::activate::handle(options, prompter, output_format).await
        }
        MenuAction::Status => super::status::handle(output_format).await,
        MenuAction::Deactivate => super::deactivate::handle(prompter, output_format).await,
        MenuAction::Version => {
            crate::cli::print_version();
            Ok(())
        }
        MenuAction::Help => crate::cli::print_help(),
    }
}
