use serde::{Deserialize, Serialize};

/// Operator-supplied hints used to narrow eligible roles and target scopes.
///
/// Each list is ordered and may be empty. Matching is always
/// case-insensitive substring containment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub management_groups: Vec<String>,
    pub subscriptions: Vec<String>,
    pub resource_groups: Vec<String>,
    pub scope_contains: Vec<String>,
    pub roles: Vec<String>,
}

impl FilterConfig {
    /// Trim every hint and drop empty ones.
    pub fn normalized(self) -> Self {
        Self {
            management_groups: clean(self.management_groups),
            subscriptions: clean(self.subscriptions),
            resource_groups: clean(self.resource_groups),
            scope_contains: clean(self.scope_contains),
            roles: clean(self.roles),
        }
    }

    /// Whether any hint list is non-empty.
    pub fn has_filters(&self) -> bool {
        !self.management_groups.is_empty()
            || !self.subscriptions.is_empty()
            || !self.resource_groups.is_empty()
            || !self.scope_contains.is_empty()
            || !self.roles.is_empty()
    }

    /// Whether there are hints that can narrow a management group to a
    /// subscription or resource group.
    pub fn has_target_hints(&self) -> bool {
        !self.subscriptions.is_empty() || !self.resource_groups.is_empty()
    }
}

fn clean(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .collect()
}

/// Split a comma-separated answer into hint values.
pub fn split_csv(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|part| part.trim().to_string())
        .filter(|part| !part.is_empty())
        .collect()
}
