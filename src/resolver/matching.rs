use crate::filter::contains_any;
use crate::types::{ResourceGroup, Subscription};

/// Result of trying to pick a target from hints alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSelect<T> {
    /// Exactly one candidate matched.
    Resolved(T),
    /// More than one matched; the operator has to choose.
    Ambiguous(usize),
    NoMatch,
}

/// Pick the single candidate accepted by `matches`, never guessing between
/// several.
pub fn auto_select<T: Clone>(candidates: &[T], matches: impl Fn(&T) -> bool) -> AutoSelect<T> {
    let mut hits = candidates.iter().filter(|c| matches(*c));
    match (hits.next(), hits.count()) {
        (None, _) => AutoSelect::NoMatch,
        (Some(only), 0) => AutoSelect::Resolved(only.clone()),
        (Some(_), rest) => AutoSelect::Ambiguous(rest + 1),
    }
}

pub fn subscription_matches(sub: &Subscription, hints: &[String]) -> bool {
    contains_any(&[sub.id.as_str(), sub.display_name.as_str()], hints)
}

pub fn resource_group_matches(group: &ResourceGroup, hints: &[String]) -> bool {
    contains_any(&[group.name.as_str()], hints)
}

pub fn find_subscriptions(subs: &[Subscription], hints: &[String]) -> Vec<Subscription> {
    subs.iter()
        .filter(|s| subscription_matches(s, hints))
        .cloned()
        .collect()
}

pub fn find_resource_groups(groups: &[ResourceGroup], hints: &[String]) -> Vec<ResourceGroup> {
    groups
        .iter()
        .filter(|g| resource_group_matches(g, hints))
        .cloned()
        .collect()
}

/// Resource groups named exactly by the hints, one per distinct name
/// (case-insensitive), in hint order.
pub fn resource_groups_from_hints(subscription: &Subscription, hints: &[String]) -> Vec<ResourceGroup> {
    let mut seen: Vec<String> = Vec::new();
    let mut groups = Vec::new();
    for hint in hints {
        let name = hint.trim();
        if name.is_empty() {
            continue;
        }
        let key = name.to_lowercase();
        if seen.contains(&key) {
            continue;
        }
        seen.push(key);
        groups.push(ResourceGroup::named(&subscription.id, name));
    }
    groups
}
