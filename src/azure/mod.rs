pub mod client;
pub mod credential;
pub mod wire;

pub use client::PimClient;
pub use credential::{AzureCliCredential, ChainedCredential, EnvTokenCredential, TokenProvider};

use async_trait::async_trait;

use crate::error::PimResult;
use crate::types::{ActiveAssignment, EligibleRole, Principal, ResourceGroup, ScheduleResponse, Subscription};

/// Everything the activation flow needs from Azure.
///
/// Failures carry their class in the error variant; callers may only rely
/// on [`crate::error::PimError::is_authorization`] to tell a permission
/// problem from any other failure.
#[async_trait]
pub trait PimSource: Send + Sync {
    async fn current_principal(&self) -> PimResult<Principal>;

    async fn eligible_roles(&self) -> PimResult<Vec<EligibleRole>>;

    async fn active_assignments(&self, principal_id: &str) -> PimResult<Vec<ActiveAssignment>>;

    /// Subscriptions anywhere beneath a management group.
    async fn group_subscriptions(&self, group_id: &str) -> PimResult<Vec<Subscription>>;

    async fn subscription_resource_groups(&self, subscription_id: &str) -> PimResult<Vec<ResourceGroup>>;

    /// Resource groups of every subscription beneath a management group.
    async fn group_resource_groups(&self, group_id: &str) -> PimResult<Vec<ResourceGroup>>;

    async fn submit_activation(
        &self,
        role: &EligibleRole,
        principal_id: &str,
        justification: &str,
        minutes: u32,
        target_scope: &str,
    ) -> PimResult<ScheduleResponse>;

    async fn submit_deactivation(
        &self,
        assignment: &ActiveAssignment,
        principal_id: &str,
    ) -> PimResult<ScheduleResponse>;

    async fn is_active(&self, scope: &str, role_definition_id: &str, principal_id: &str) -> PimResult<bool>;
}
