#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use azure_pim::azure::PimSource;
use azure_pim::error::{PimError, PimResult};
use azure_pim::prompt::LineConsole;
use azure_pim::types::{
    ActiveAssignment, EligibleRole, Principal, ResourceGroup, ScheduleResponse, Subscription,
};

pub type ScriptedConsole = LineConsole<Cursor<String>, Vec<u8>>;

/// Console that answers prompts from `script`, one line per answer.
pub fn scripted(script: &str) -> ScriptedConsole {
    LineConsole::new(Cursor::new(script.to_string()), Vec::new())
}

pub const GROUP_SCOPE: &str = "/providers/Microsoft.Management/managementGroups/corp";

pub fn group_role(role_name: &str) -> EligibleRole {
    EligibleRole {
        scope: GROUP_SCOPE.to_string(),
        scope_display: "Corp".to_string(),
        role_name: role_name.to_string(),
        role_definition_id: format!("/providers/Microsoft.Authorization/roleDefinitions/{}", role_name),
        eligibility_schedule_id: format!("elig-{}", role_name),
    }
}

pub fn subscription_role(role_name: &str, subscription_id: &str, display: &str) -> EligibleRole {
    EligibleRole {
        scope: format!("/subscriptions/{}", subscription_id),
        scope_display: display.to_string(),
        role_name: role_name.to_string(),
        role_definition_id: format!("/providers/Microsoft.Authorization/roleDefinitions/{}", role_name),
        eligibility_schedule_id: format!("elig-{}", role_name),
    }
}

pub fn subscription(id: &str, display_name: &str) -> Subscription {
    Subscription {
        id: id.to_string(),
        display_name: display_name.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub role_name: String,
    pub scope: String,
    pub minutes: u32,
    pub justification: String,
}

/// In-memory stand-in for Azure with canned listings.
#[derive(Default)]
pub struct FakeSource {
    pub roles: Vec<EligibleRole>,
    pub subscriptions: Vec<Subscription>,
    pub resource_groups: Vec<ResourceGroup>,
    /// Only visible through the management group query.
    pub group_only_resource_groups: Vec<ResourceGroup>,
    /// HTTP status returned by the management group subscription listing.
    pub group_listing_status: Option<u16>,
    /// HTTP status returned by every subscription resource group listing.
    pub resource_group_status: Option<u16>,
    /// 1-based submission that fails with HTTP 500.
    pub fail_submission_at: Option<usize>,
    pub eligible_calls: AtomicUsize,
    pub submit_calls: AtomicUsize,
    pub submissions: Mutex<Vec<Submission>>,
}

impl FakeSource {
    pub fn submitted(&self) -> Vec<Submission> {
        self.submissions.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

fn failure(status: u16) -> PimError {
    let code = if status == 403 { "AuthorizationFailed" } else { "InternalServerError" };
    PimError::from_status(status, Some(code.to_string()), "canned failure")
}

#[async_trait]
impl PimSource for FakeSource {
    async fn current_principal(&self) -> PimResult<Principal> {
        Ok(Principal {
            id: "me".to_string(),
            display_name: "Test Operator".to_string(),
            user_principal_name: "operator@example.com".to_string(),
        })
    }

    async fn eligible_roles(&self) -> PimResult<Vec<EligibleRole>> {
        self.eligible_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.roles.clone())
    }

    async fn active_assignments(&self, _principal_id: &str) -> PimResult<Vec<ActiveAssignment>> {
        Ok(Vec::new())
    }

    async fn group_subscriptions(&self, _group_id: &str) -> PimResult<Vec<Subscription>> {
        match self.group_listing_status {
            Some(status) => Err(failure(status)),
            None => Ok(self.subscriptions.clone()),
        }
    }

    async fn subscription_resource_groups(&self, subscription_id: &str) -> PimResult<Vec<ResourceGroup>> {
        if let Some(status) = self.resource_group_status {
            return Err(failure(status));
        }
        Ok(self
            .resource_groups
            .iter()
            .filter(|g| g.subscription_id == subscription_id)
            .cloned()
            .collect())
    }

    async fn group_resource_groups(&self, _group_id: &str) -> PimResult<Vec<ResourceGroup>> {
        Ok(self
            .resource_groups
            .iter()
            .chain(&self.group_only_resource_groups)
            .cloned()
            .collect())
    }

    async fn submit_activation(
        &self,
        role: &EligibleRole,
        _principal_id: &str,
        justification: &str,
        minutes: u32,
        target_scope: &str,
    ) -> PimResult<ScheduleResponse> {
        let call = self.submit_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_submission_at == Some(call) {
            return Err(PimError::from_status(500, None, "boom"));
        }
        let mut submissions = self
            .submissions
            .lock()
            .map_err(|_| PimError::config("submission log poisoned"))?;
        submissions.push(Submission {
            role_name: role.role_name.clone(),
            scope: target_scope.to_string(),
            minutes,
            justification: justification.to_string(),
        });
        Ok(ScheduleResponse {
            name: format!("req-{}", submissions.len()),
            status: "Provisioned".to_string(),
        })
    }

    async fn submit_deactivation(
        &self,
        _assignment: &ActiveAssignment,
        _principal_id: &str,
    ) -> PimResult<ScheduleResponse> {
        Ok(ScheduleResponse {
            name: "req-off".to_string(),
            status: "Revoked".to_string(),
        })
    }

    async fn is_active(&self, _scope: &str, _role_definition_id: &str, _principal_id: &str) -> PimResult<bool> {
        Ok(false)
    }
}
