//! Shared types used across the codebase

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope;

/// The signed-in principal as reported by Microsoft Graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Principal {
    pub id: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub user_principal_name: String,
}

/// A dormant privilege the principal may activate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibleRole {
    pub scope: String,
    pub scope_display: String,
    pub role_name: String,
    pub role_definition_id: String,
    pub eligibility_schedule_id: String,
}

impl EligibleRole {
    pub fn is_management_group_scoped(&self) -> bool {
        scope::is_management_group_scope(&self.scope)
    }

    /// The scope the role itself is bound to, as an activation target.
    pub fn own_target(&self) -> ActivationTarget {
        ActivationTarget::new(&self.scope, &self.scope_display)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub display_name: String,
}

impl Subscription {
    pub fn scope(&self) -> String {
        format!("/subscriptions/{}", self.id)
    }

    pub fn label(&self) -> &str {
        if self.display_name.trim().is_empty() {
            &self.id
        } else {
            &self.display_name
        }
    }

    pub fn target(&self) -> ActivationTarget {
        ActivationTarget::new(self.scope(), self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceGroup {
    pub subscription_id: String,
    pub name: String,
    pub id: String,
}

impl ResourceGroup {
    /// Record for a group that is only known by name.
    pub fn named(subscription_id: &str, name: &str) -> Self {
        Self {
            subscription_id: subscription_id.to_string(),
            name: name.to_string(),
            id: format!("/subscriptions/{}/resourceGroups/{}", subscription_id, name),
        }
    }

    pub fn scope(&self) -> String {
        if self.id.trim().is_empty() {
            format!("/subscriptions/{}/resourceGroups/{}", self.subscription_id, self.name)
        } else {
            self.id.clone()
        }
    }

    pub fn target(&self, subscription: &Subscription) -> ActivationTarget {
        ActivationTarget::new(self.scope(), format!("{}/{}", subscription.label(), self.name))
    }
}

/// Concrete scope an activation request is submitted against.
/// Scope and display are never empty; display falls back to the scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivationTarget {
    scope: String,
    display: String,
}

impl ActivationTarget {
    pub fn new(scope: impl Into<String>, display: impl Into<String>) -> Self {
        let scope = scope.into();
        let display = display.into();
        let display = if display.trim().is_empty() {
            scope::default_scope_display(&scope, "")
        } else {
            display
        };
        let display = if display.trim().is_empty() { scope.clone() } else { display };
        Self { scope, display }
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn display(&self) -> &str {
        &self.display
    }
}

/// A currently held, possibly time-limited, role assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveAssignment {
    pub name: String,
    pub scope: String,
    pub scope_display: String,
    pub role_name: String,
    pub role_definition_id: String,
    pub end_date_time: Option<DateTime<Utc>>,
}

impl ActiveAssignment {
    /// Assignments without an end time are managed by an administrator.
    pub fn is_permanent(&self) -> bool {
        self.end_date_time.is_none()
    }

    pub fn expiry_display(&self) -> String {
        self.expiry_display_at(Utc::now())
    }

    pub fn expiry_display_at(&self, now: DateTime<Utc>) -> String {
        let Some(end) = self.end_date_time else {
            return "no expiry".to_string();
        };
        let remaining = end.signed_duration_since(now).num_minutes();
        if remaining <= 0 {
            return "expired".to_string();
        }
        let (hours, minutes) = (remaining / 60, remaining % 60);
        match (hours, minutes) {
            (0, m) => format!("expires in {}m", m),
            (h, 0) => format!("expires in {}h", h),
            (h, m) => format!("expires in {}h {}m", h, m),
        }
    }
}

/// Status returned by a schedule request submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub name: String,
    pub status: String,
}

/// Kind of role assignment schedule request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestType {
    SelfActivate,
    SelfExtend,
    SelfDeactivate,
}
