//! Helpers for ARM scope paths.
//!
//! A scope is one of
//! `/providers/Microsoft.Management/managementGroups/{id}`,
//! `/subscriptions/{id}` or `/subscriptions/{id}/resourceGroups/{name}`.
//! Prefix comparisons are case-insensitive; the returned segments keep
//! their original casing.

const MANAGEMENT_GROUP_PREFIX: &str = "/providers/microsoft.management/managementgroups/";
const SUBSCRIPTION_PREFIX: &str = "/subscriptions/";
const RESOURCE_GROUP_MARKER: &str = "/resourcegroups/";

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        value.get(prefix.len()..)
    } else {
        None
    }
}

fn first_segment(rest: &str) -> Option<&str> {
    rest.split('/').next().filter(|s| !s.is_empty())
}

pub fn is_management_group_scope(scope: &str) -> bool {
    strip_prefix_ignore_case(scope, MANAGEMENT_GROUP_PREFIX).is_some()
}

pub fn management_group_id(scope: &str) -> Option<&str> {
    strip_prefix_ignore_case(scope, MANAGEMENT_GROUP_PREFIX).and_then(first_segment)
}

pub fn subscription_id(scope: &str) -> Option<&str> {
    strip_prefix_ignore_case(scope, SUBSCRIPTION_PREFIX).and_then(first_segment)
}

/// Resource group name when the scope is resource-group scoped or finer.
pub fn resource_group_name(scope: &str) -> Option<&str> {
    let idx = scope.to_ascii_lowercase().find(RESOURCE_GROUP_MARKER)?;
    scope
        .get(idx + RESOURCE_GROUP_MARKER.len()..)
        .and_then(first_segment)
}

/// Human label for a scope: the given display name, else the most specific
/// segment of the path, else the path itself.
pub fn default_scope_display(scope: &str, display: &str) -> String {
    if !display.trim().is_empty() {
        return display.to_string();
    }
    resource_group_name(scope)
        .or_else(|| subscription_id(scope))
        .or_else(|| management_group_id(scope))
        .unwrap_or(scope)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_management_group_detection() {
        assert!(is_management_group_scope(
            "/providers/Microsoft.Management/managementGroups/root"
        ));
        assert!(is_management_group_scope(
            "/PROVIDERS/microsoft.management/MANAGEMENTGROUPS/root"
        ));
        assert!(!is_management_group_scope("/subscriptions/abc"));
        assert_eq!(
            management_group_id("/providers/Microsoft.Management/managementGroups/Platform-MG/extra"),
            Some("Platform-MG")
        );
        assert_eq!(management_group_id("/providers/Microsoft.Management/managementGroups/"), None);
        assert_eq!(management_group_id("/subscriptions/abc"), None);
    }

    #[test]
    fn test_subscription_and_resource_group_extraction() {
        let scope = "/subscriptions/1234/resourceGroups/core-rg/providers/x";
        assert_eq!(subscription_id(scope), Some("1234"));
        assert_eq!(resource_group_name(scope), Some("core-rg"));
        assert_eq!(resource_group_name("/subscriptions/1234"), None);
        assert_eq!(subscription_id("/providers/Microsoft.Management/managementGroups/x"), None);
        assert_eq!(resource_group_name("/subscriptions/1234/RESOURCEGROUPS/Core"), Some("Core"));
    }

    #[test]
    fn test_default_scope_display() {
        assert_eq!(default_scope_display("/subscriptions/abc", "Hub"), "Hub");
        assert_eq!(default_scope_display("/subscriptions/abc", ""), "abc");
        assert_eq!(default_scope_display("/subscriptions/abc/resourceGroups/rg1", ""), "rg1");
        assert_eq!(
            default_scope_display("/providers/Microsoft.Management/managementGroups/mg", " "),
            "mg"
        );
        assert_eq!(default_scope_display("/", ""), "/");
    }
}
