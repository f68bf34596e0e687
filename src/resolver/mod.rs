//! Scope resolution for eligible roles.
//!
//! A role bound to a subscription or resource group is activated where it
//! is. A role bound to a management group may be narrowed to one or more
//! subscriptions or resource groups beneath it, either from operator hints
//! or interactively.

pub mod matching;

pub use matching::AutoSelect;

use tracing::{info, warn};

use crate::azure::PimSource;
use crate::error::{PimResult, ResultExt};
use crate::filter::FilterConfig;
use crate::prompt::Prompter;
use crate::scope;
use crate::types::{ActivationTarget, EligibleRole, ResourceGroup, Subscription};

use matching::{
    auto_select, find_resource_groups, find_subscriptions, resource_group_matches, resource_groups_from_hints,
    subscription_matches,
};

enum ResourceGroupListing {
    Denied,
    Listed(Vec<ResourceGroup>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScopeOption {
    ManagementGroup,
    Subscriptions,
    ResourceGroups,
}

/// Turns selected roles into concrete activation targets.
pub struct ScopeResolver<'r, 'c> {
    source: &'r dyn PimSource,
    prompter: &'r mut Prompter<'c>,
    filters: &'r FilterConfig,
}

impl<'r, 'c> ScopeResolver<'r, 'c> {
    pub fn new(source: &'r dyn PimSource, prompter: &'r mut Prompter<'c>, filters: &'r FilterConfig) -> Self {
        Self {
            source,
            prompter,
            filters,
        }
    }

    /// Targets to activate `role` against, in selection order. Never empty
    /// on success.
    pub async fn resolve(&mut self, role: &EligibleRole) -> PimResult<Vec<ActivationTarget>> {
        let whole = role.own_target();
        let Some(group_id) = scope::management_group_id(&role.scope) else {
            return Ok(vec![whole]);
        };

        let subs = match self.source.group_subscriptions(group_id).await {
            Ok(subs) => subs,
            Err(e) if e.is_authorization() => {
                warn!(group = group_id, error = %e, "cannot list management group subscriptions");
                self.prompter.say(&format!(
                    "⚠️  Unable to list subscriptions for {} (missing management group read permission). Activating entire management group.",
                    role.scope_display
                ));
                return Ok(vec![whole]);
            }
            Err(e) => return Err(e.with_context(format!("list subscriptions for {}", role.scope_display))),
        };

        if subs.is_empty() {
            info!(group = group_id, "management group has no subscriptions");
            return Ok(vec![whole]);
        }

        let hints = self.filters;
        if !hints.subscriptions.is_empty() && !hints.resource_groups.is_empty() {
            let targets = self.hinted_resource_groups(group_id, &subs).await?;
            if !targets.is_empty() {
                return Ok(targets);
            }
        }

        if hints.has_target_hints() {
            if let Some(targets) = self.auto_select_scope(group_id, role, &subs).await? {
                return Ok(targets);
            }
        }

        self.choose_scope(group_id, role, &subs).await
    }

    /// Resource groups for every subscription matched by the subscription
    /// hints, auto-selected where the resource group hints are unambiguous.
    async fn hinted_resource_groups(
        &mut self,
        group_id: &str,
        subs: &[Subscription],
    ) -> PimResult<Vec<ActivationTarget>> {
        let matched = find_subscriptions(subs, &self.filters.subscriptions);
        let mut targets = Vec::new();
        for (idx, sub) in matched.iter().enumerate() {
            if idx > 0 {
                self.prompter.say("");
            }
            targets.extend(self.pick_resource_groups(group_id, sub, true).await?);
        }
        Ok(targets)
    }

    /// `None` means the hints did not settle on a target and the operator
    /// has to choose.
    async fn auto_select_scope(
        &mut self,
        group_id: &str,
        role: &EligibleRole,
        subs: &[Subscription],
    ) -> PimResult<Option<Vec<ActivationTarget>>> {
        let chosen = match auto_select(subs, |s| subscription_matches(s, &self.filters.subscriptions)) {
            AutoSelect::Resolved(sub) => sub,
            AutoSelect::Ambiguous(count) => {
                self.prompter.say(&format!(
                    "⚠️  Multiple subscriptions match filters ({}). You'll be prompted to choose.",
                    count
                ));
                return Ok(None);
            }
            AutoSelect::NoMatch => return Ok(None),
        };

        if self.filters.resource_groups.is_empty() {
            self.prompter.say(&format!(
                "🔧 Targeting subscription {} ({}) under {}",
                chosen.label(),
                chosen.id,
                role.scope_display
            ));
            info!(subscription = %chosen.id, role = %role.role_name, "subscription selected from hints");
            return Ok(Some(vec![chosen.target()]));
        }

        self.pick_resource_groups(group_id, &chosen, true).await.map(Some)
    }

    /// Resource group targets within one subscription. With `auto`, a
    /// single hint match is taken without asking.
    async fn pick_resource_groups(
        &mut self,
        group_id: &str,
        sub: &Subscription,
        auto: bool,
    ) -> PimResult<Vec<ActivationTarget>> {
        if !auto {
            self.prompter
                .say(&format!("\nFetching resource groups for {} ({})...", sub.label(), sub.id));
        }

        let groups = match self.list_resource_groups(group_id, sub).await? {
            ResourceGroupListing::Listed(groups) => groups,
            ResourceGroupListing::Denied => {
                self.prompter.say(&format!(
                    "⚠️  Unable to list resource groups for {} (insufficient permission). Activating entire subscription scope.",
                    sub.label()
                ));
                return Ok(vec![sub.target()]);
            }
        };

        let filters = self.filters;
        let hints = &filters.resource_groups;
        let candidates = if groups.is_empty() && !hints.is_empty() {
            warn!(subscription = %sub.id, "no resource groups listed, using hint names");
            self.prompter.say(&format!(
                "⚠️  Azure returned no resource groups for {}; using the provided names as-is (existence not confirmed).",
                sub.label()
            ));
            resource_groups_from_hints(sub, hints)
        } else {
            groups
        };

        if auto && !hints.is_empty() {
            match auto_select(&candidates, |g| resource_group_matches(g, hints)) {
                AutoSelect::Resolved(group) => {
                    let target = group.target(sub);
                    self.prompter.say(&format!("🔧 Targeting resource group {}", target.display()));
                    info!(scope = target.scope(), "resource group selected from hints");
                    return Ok(vec![target]);
                }
                AutoSelect::Ambiguous(count) => {
                    self.prompter.say(&format!(
                        "⚠️  Multiple resource groups match filters ({}). You'll be prompted to choose.",
                        count
                    ));
                }
                AutoSelect::NoMatch => {}
            }
        }

        let mut view = candidates;
        if !hints.is_empty() {
            self.prompter
                .say(&format!("Filters hint at resource groups matching {}", hints.join(", ")));
            let matching = find_resource_groups(&view, hints);
            if matching.is_empty() {
                self.prompter.say(&format!(
                    "⚠️  No resource groups matched filters ({}). Showing all available groups.",
                    hints.join(", ")
                ));
            } else {
                self.prompter
                    .say(&format!("Showing {} resource group(s) matching filters.", matching.len()));
                view = matching;
            }
        }

        if view.is_empty() {
            self.prompter.say(&format!(
                "⚠️  No resource groups available under {}. Activating entire subscription scope.",
                sub.label()
            ));
            return Ok(vec![sub.target()]);
        }

        let chosen = self.prompter.select_many(
            &view,
            &format!("Select resource group(s) within {}", sub.label()),
            |i, g: &ResourceGroup| format!("  {:2}) {}", i, g.name),
            |g: &ResourceGroup| format!("{} {}", g.name, g.id),
        )?;
        Ok(chosen.iter().map(|g| g.target(sub)).collect())
    }

    /// Subscription-level listing, then the management group's listing
    /// narrowed to this subscription when the first comes back empty.
    async fn list_resource_groups(&self, group_id: &str, sub: &Subscription) -> PimResult<ResourceGroupListing> {
        let groups = match self.source.subscription_resource_groups(&sub.id).await {
            Ok(groups) => groups,
            Err(e) if e.is_authorization() => {
                warn!(subscription = %sub.id, error = %e, "cannot list resource groups");
                return Ok(ResourceGroupListing::Denied);
            }
            Err(e) => return Err(e.with_context(format!("list resource groups for {}", sub.label()))),
        };
        if !groups.is_empty() {
            return Ok(ResourceGroupListing::Listed(groups));
        }

        match self.source.group_resource_groups(group_id).await {
            Ok(all) => Ok(ResourceGroupListing::Listed(
                all.into_iter()
                    .filter(|g| g.subscription_id.eq_ignore_ascii_case(&sub.id))
                    .collect(),
            )),
            Err(e) => {
                warn!(group = group_id, error = %e, "management group resource group query failed");
                Ok(ResourceGroupListing::Listed(Vec::new()))
            }
        }
    }

    /// Ask whether to activate the whole group, some subscriptions, or some
    /// resource groups.
    async fn choose_scope(
        &mut self,
        group_id: &str,
        role: &EligibleRole,
        subs: &[Subscription],
    ) -> PimResult<Vec<ActivationTarget>> {
        let options = [
            (
                format!("Activate entire management group ({})", role.scope_display),
                ScopeOption::ManagementGroup,
            ),
            ("Scope to subscription(s)".to_string(), ScopeOption::Subscriptions),
            ("Scope to resource group(s)".to_string(), ScopeOption::ResourceGroups),
        ];
        let choice = self
            .prompter
            .select_option(&options, "Choose scope option", |i, opt: &(String, ScopeOption)| {
                format!("  {:2}) {}", i, opt.0)
            })
            .context("scope option")?;

        match options[choice].1 {
            ScopeOption::ManagementGroup => Ok(vec![role.own_target()]),
            ScopeOption::Subscriptions => {
                let selected = self.choose_subscriptions(subs)?;
                Ok(selected.iter().map(Subscription::target).collect())
            }
            ScopeOption::ResourceGroups => {
                let selected = self.choose_subscriptions(subs)?;
                let mut targets = Vec::new();
                for sub in &selected {
                    targets.extend(self.pick_resource_groups(group_id, sub, false).await?);
                }
                Ok(targets)
            }
        }
    }

    fn choose_subscriptions(&mut self, subs: &[Subscription]) -> PimResult<Vec<Subscription>> {
        if !self.filters.subscriptions.is_empty() {
            self.prompter.say(&format!(
                "Filters hint at subscriptions matching {}",
                self.filters.subscriptions.join(", ")
            ));
        }
        self.prompter.select_many(
            subs,
            "Select subscription scope(s)",
            |i, s: &Subscription| format!("  {:2}) {} ({})", i, s.label(), s.id),
            |s: &Subscription| format!("{} {}", s.display_name, s.id),
        )
    }
}
