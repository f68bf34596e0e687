use super::types::FilterConfig;
use crate::scope;
use crate::types::EligibleRole;

/// Narrow eligible roles by the configured hints.
///
/// Categories combine with AND, hints inside one category with OR. Order is
/// preserved; with no hints at all the input is returned unchanged.
pub fn filter_eligible_roles(roles: &[EligibleRole], cfg: &FilterConfig) -> Vec<EligibleRole> {
    if !cfg.has_filters() {
        return roles.to_vec();
    }

    roles
        .iter()
        .filter(|role| {
            matches_management_group(role, &cfg.management_groups)
                && matches_subscription(role, &cfg.subscriptions)
                && matches_resource_group(role, &cfg.resource_groups)
                && matches_scope_contains(role, &cfg.scope_contains)
                && matches_role_name(role, &cfg.roles)
        })
        .cloned()
        .collect()
}

/// True when any hint is a case-insensitive substring of any haystack.
pub fn contains_any(haystacks: &[&str], hints: &[String]) -> bool {
    let haystacks: Vec<String> = haystacks.iter().map(|h| h.to_lowercase()).collect();
    hints.iter().any(|hint| {
        let needle = hint.to_lowercase();
        !needle.is_empty() && haystacks.iter().any(|h| h.contains(&needle))
    })
}

fn matches_management_group(role: &EligibleRole, hints: &[String]) -> bool {
    if hints.is_empty() {
        return true;
    }
    match scope::management_group_id(&role.scope) {
        Some(group_id) => contains_any(&[group_id, role.scope_display.as_str()], hints),
        None => false,
    }
}

// Group-scoped roles pass: the concrete subscription is chosen later.
fn matches_subscription(role: &EligibleRole, hints: &[String]) -> bool {
    if hints.is_empty() || role.is_management_group_scoped() {
        return true;
    }
    match scope::subscription_id(&role.scope) {
        Some(subscription_id) => contains_any(&[subscription_id, role.scope_display.as_str()], hints),
        None => false,
    }
}

fn matches_resource_group(role: &EligibleRole, hints: &[String]) -> bool {
    if hints.is_empty() || role.is_management_group_scoped() {
        return true;
    }
    match scope::resource_group_name(&role.scope) {
        Some(name) => contains_any(&[name], hints),
        None => false,
    }
}

fn matches_scope_contains(role: &EligibleRole, hints: &[String]) -> bool {
    hints.is_empty() || contains_any(&[role.scope.as_str(), role.scope_display.as_str()], hints)
}

fn matches_role_name(role: &EligibleRole, hints: &[String]) -> bool {
    hints.is_empty() || contains_any(&[role.role_name.as_str()], hints)
}
