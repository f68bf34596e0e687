use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use reqwest::header::CONTENT_TYPE;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::OnceCell;
use tokio::time::Instant;
use tracing::{debug, info};
use url::Url;
use uuid::Uuid;

use super::credential::TokenProvider;
use super::wire::{
    Descendant, ErrorEnvelope, Expiration, ListPage, ManagementGroupTree, ResourceGraphOptions,
    ResourceGraphPage, ResourceGraphQuery, ResourceGroupItem, ScheduleInfo, ScheduleItem,
    ScheduleRequest, ScheduleRequestProperties, ScheduleRequestResponse,
};
use super::PimSource;
use crate::config::{AppConfig, AzureConfig};
use crate::duration;
use crate::error::{PimError, PimResult, ResultExt};
use crate::types::{
    ActiveAssignment, EligibleRole, Principal, RequestType, ResourceGroup, ScheduleResponse, Subscription,
};

const RESOURCE_GROUP_QUERY: &str = "ResourceContainers \
    | where type =~ 'microsoft.resources/subscriptions/resourcegroups' \
    | project id, name, subscriptionId";

#[derive(Debug, Clone, Copy)]
enum Api {
    Arm,
    Graph,
}

/// `PimSource` over the ARM and Microsoft Graph REST APIs.
///
/// Every call is bounded by the per-request timeout and by a single run
/// deadline fixed when the client is built.
pub struct PimClient {
    http: reqwest::Client,
    azure: AzureConfig,
    credential: Arc<dyn TokenProvider>,
    arm_token: OnceCell<String>,
    graph_token: OnceCell<String>,
    deadline: Instant,
}

impl PimClient {
    pub fn new(config: &AppConfig, credential: Arc<dyn TokenProvider>) -> PimResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.http.request_timeout_secs))
            .user_agent(config.http.user_agent.clone())
            .build()
            .map_err(|e| PimError::config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http,
            azure: config.azure.clone(),
            credential,
            arm_token: OnceCell::new(),
            graph_token: OnceCell::new(),
            deadline: Instant::now() + Duration::from_secs(config.http.run_timeout_secs),
        })
    }

    /// Replace the run deadline.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = deadline;
        self
    }

    async fn token(&self, api: Api) -> PimResult<String> {
        let (cell, resource) = match api {
            Api::Arm => (&self.arm_token, &self.azure.arm_resource),
            Api::Graph => (&self.graph_token, &self.azure.graph_resource),
        };
        cell.get_or_try_init(|| self.credential.token(resource))
            .await
            .cloned()
            .with_context(|| format!("acquire token for {}", resource))
    }

    fn arm_url(&self, path: &str, params: &[(&str, &str)]) -> PimResult<Url> {
        build_url(&format!("{}{}", self.azure.arm_endpoint, path), params)
    }

    async fn request<T, B>(&self, api: Api, method: Method, url: Url, body: Option<&B>) -> PimResult<T>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let call = async {
            let token = self.token(api).await?;
            debug!(%method, %url, "azure request");

            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .bearer_auth(&token)
                .header(CONTENT_TYPE, "application/json");
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request.send().await?;
            let status = response.status();
            debug!(%method, %url, status = status.as_u16(), "azure response");

            let bytes = response.bytes().await?;
            if !status.is_success() {
                return Err(error_from_body(status.as_u16(), &bytes));
            }
            serde_json::from_slice(&bytes)
                .map_err(|e| PimError::decode(format!("{} {}: {}", method, url.path(), e)))
        };

        match tokio::time::timeout_at(self.deadline, call).await {
            Ok(result) => result,
            Err(_) => Err(PimError::Timeout(format!(
                "{} {} did not complete before the run deadline",
                method,
                url.path()
            ))),
        }
    }

    async fn get<T: DeserializeOwned>(&self, api: Api, url: Url) -> PimResult<T> {
        self.request::<T, ()>(api, Method::GET, url, None).await
    }

    /// Follow `nextLink` until the listing is exhausted.
    async fn get_all<T: DeserializeOwned>(&self, api: Api, url: Url) -> PimResult<Vec<T>> {
        let mut items = Vec::new();
        let mut next = Some(url);
        while let Some(url) = next.take() {
            let page: ListPage<T> = self.get(api, url).await?;
            items.extend(page.value);
            if let Some(link) = page.next_link.filter(|l| !l.is_empty()) {
                next = Some(
                    Url::parse(&link).map_err(|e| PimError::decode(format!("invalid nextLink {:?}: {}", link, e)))?,
                );
            }
        }
        Ok(items)
    }

    async fn descendant_subscriptions(&self, group_id: &str) -> PimResult<Vec<Subscription>> {
        let url = self.arm_url(
            &format!("/providers/Microsoft.Management/managementGroups/{}/descendants", group_id),
            &[("api-version", self.azure.management_api_version.as_str())],
        )?;
        let descendants: Vec<Descendant> = self.get_all(Api::Arm, url).await?;
        Ok(descendants.into_iter().filter_map(Descendant::into_subscription).collect())
    }

    async fn expanded_subscriptions(&self, group_id: &str) -> PimResult<Vec<Subscription>> {
        let url = self.arm_url(
            &format!("/providers/Microsoft.Management/managementGroups/{}", group_id),
            &[
                ("api-version", self.azure.management_api_version.as_str()),
                ("$expand", "children"),
                ("$recurse", "true"),
            ],
        )?;
        let tree: ManagementGroupTree = self.get(Api::Arm, url).await?;
        Ok(tree.subscriptions())
    }

    async fn submit(&self, scope: &str, body: &ScheduleRequest) -> PimResult<ScheduleResponse> {
        let url = self.arm_url(
            &format!(
                "{}/providers/Microsoft.Authorization/roleAssignmentScheduleRequests/{}",
                scope,
                Uuid::new_v4()
            ),
            &[("api-version", self.azure.pim_api_version.as_str())],
        )?;
        let response: ScheduleRequestResponse = self.request(Api::Arm, Method::PUT, url, Some(body)).await?;
        Ok(response.into())
    }
}

fn build_url(base: &str, params: &[(&str, &str)]) -> PimResult<Url> {
    let parsed = if params.is_empty() {
        Url::parse(base)
    } else {
        Url::parse_with_params(base, params)
    };
    parsed.map_err(|e| PimError::config(format!("invalid URL {:?}: {}", base, e)))
}

/// Classify a non-2xx response from its status and ARM error envelope,
/// falling back to the raw body as the message.
fn error_from_body(status: u16, body: &[u8]) -> PimError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        let code = envelope.error.code.filter(|c| !c.is_empty());
        if code.is_some() || envelope.error.message.is_some() {
            return PimError::from_status(status, code, envelope.error.message.unwrap_or_default());
        }
    }
    PimError::from_status(status, None, String::from_utf8_lossy(body).trim().to_string())
}

fn merge_subscriptions(primary: Vec<Subscription>, extra: Vec<Subscription>) -> Vec<Subscription> {
    let mut merged = primary;
    for sub in extra {
        if !merged.iter().any(|s| s.id.eq_ignore_ascii_case(&sub.id)) {
            merged.push(sub);
        }
    }
    merged
}

#[async_trait]
impl PimSource for PimClient {
    async fn current_principal(&self) -> PimResult<Principal> {
        let url = build_url(&format!("{}/me", self.azure.graph_endpoint), &[])?;
        self.get(Api::Graph, url).await.context("get current user")
    }

    async fn eligible_roles(&self) -> PimResult<Vec<EligibleRole>> {
        let url = self.arm_url(
            "/providers/Microsoft.Authorization/roleEligibilitySchedules",
            &[("api-version", self.azure.pim_api_version.as_str()), ("$filter", "asTarget()")],
        )?;
        let items: Vec<ScheduleItem> = self.get_all(Api::Arm, url).await.context("get eligible roles")?;
        Ok(items.into_iter().map(ScheduleItem::into_eligible_role).collect())
    }

    async fn active_assignments(&self, principal_id: &str) -> PimResult<Vec<ActiveAssignment>> {
        let url = self.arm_url(
            "/providers/Microsoft.Authorization/roleAssignmentScheduleInstances",
            &[("api-version", self.azure.pim_api_version.as_str()), ("$filter", "asTarget()")],
        )?;
        let items: Vec<ScheduleItem> = self.get_all(Api::Arm, url).await.context("get active assignments")?;
        Ok(items
            .into_iter()
            .filter(|item| item.properties.principal_id.eq_ignore_ascii_case(principal_id))
            .map(ScheduleItem::into_active_assignment)
            .collect())
    }

    async fn group_subscriptions(&self, group_id: &str) -> PimResult<Vec<Subscription>> {
        let listed = match self.descendant_subscriptions(group_id).await {
            Ok(subs) if !subs.is_empty() => Ok(subs),
            primary => {
                debug!(group_id, "falling back to expanded management group listing");
                match (primary, self.expanded_subscriptions(group_id).await) {
                    (Ok(found), Ok(legacy)) => Ok(merge_subscriptions(found, legacy)),
                    (Err(_), Ok(legacy)) => Ok(legacy),
                    (Ok(found), Err(e)) => {
                        debug!(group_id, error = %e, "expanded listing failed");
                        Ok(found)
                    }
                    (Err(e), Err(_)) => Err(e),
                }
            }
        };
        listed.with_context(|| format!("list subscriptions for management group {}", group_id))
    }

    async fn subscription_resource_groups(&self, subscription_id: &str) -> PimResult<Vec<ResourceGroup>> {
        let url = self.arm_url(
            &format!("/subscriptions/{}/resourcegroups", subscription_id),
            &[("api-version", self.azure.resources_api_version.as_str())],
        )?;
        let items: Vec<ResourceGroupItem> = self
            .get_all(Api::Arm, url)
            .await
            .with_context(|| format!("list resource groups for subscription {}", subscription_id))?;
        Ok(items
            .into_iter()
            .map(|item| item.into_resource_group(subscription_id))
            .collect())
    }

    async fn group_resource_groups(&self, group_id: &str) -> PimResult<Vec<ResourceGroup>> {
        let url = self.arm_url(
            "/providers/Microsoft.ResourceGraph/resources",
            &[("api-version", self.azure.resource_graph_api_version.as_str())],
        )?;

        let mut groups = Vec::new();
        let mut skip_token: Option<String> = None;
        loop {
            let query = ResourceGraphQuery {
                query: RESOURCE_GROUP_QUERY.to_string(),
                management_groups: vec![group_id.to_string()],
                options: ResourceGraphOptions {
                    result_format: "objectArray",
                    skip_token: skip_token.take(),
                },
            };
            let page: ResourceGraphPage = self
                .request(Api::Arm, Method::POST, url.clone(), Some(&query))
                .await
                .with_context(|| format!("query resource groups for management group {}", group_id))?;
            groups.extend(page.data.into_iter().map(ResourceGroup::from));

            match page.skip_token.filter(|t| !t.is_empty()) {
                Some(token) => skip_token = Some(token),
                None => break,
            }
        }
        Ok(groups)
    }

    async fn submit_activation(
        &self,
        role: &EligibleRole,
        principal_id: &str,
        justification: &str,
        minutes: u32,
        target_scope: &str,
    ) -> PimResult<ScheduleResponse> {
        let request_type = if self.is_active(target_scope, &role.role_definition_id, principal_id).await? {
            RequestType::SelfExtend
        } else {
            RequestType::SelfActivate
        };

        let linked = Some(role.eligibility_schedule_id.clone()).filter(|id| !id.is_empty());
        let body = ScheduleRequest {
            properties: ScheduleRequestProperties {
                principal_id: principal_id.to_string(),
                role_definition_id: role.role_definition_id.clone(),
                request_type,
                justification: Some(justification.to_string()),
                linked_role_eligibility_schedule_id: linked,
                schedule_info: Some(ScheduleInfo {
                    start_date_time: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                    expiration: Expiration {
                        kind: "AfterDuration",
                        duration: duration::iso8601(minutes),
                    },
                }),
            },
        };

        info!(role = %role.role_name, scope = target_scope, ?request_type, "submitting activation");
        self.submit(target_scope, &body).await.context("submit activation")
    }

    async fn submit_deactivation(
        &self,
        assignment: &ActiveAssignment,
        principal_id: &str,
    ) -> PimResult<ScheduleResponse> {
        let body = ScheduleRequest {
            properties: ScheduleRequestProperties {
                principal_id: principal_id.to_string(),
                role_definition_id: assignment.role_definition_id.clone(),
                request_type: RequestType::SelfDeactivate,
                justification: None,
                linked_role_eligibility_schedule_id: None,
                schedule_info: None,
            },
        };

        info!(role = %assignment.role_name, scope = %assignment.scope, "submitting deactivation");
        self.submit(&assignment.scope, &body).await.context("submit deactivation")
    }

    async fn is_active(&self, scope: &str, role_definition_id: &str, principal_id: &str) -> PimResult<bool> {
        let filter = format!(
            "principalId eq '{}' and roleDefinitionId eq '{}'",
            principal_id, role_definition_id
        );
        let url = self.arm_url(
            &format!("{}/providers/Microsoft.Authorization/roleAssignmentSchedules", scope),
            &[("api-version", self.azure.pim_api_version.as_str()), ("$filter", filter.as_str())],
        )?;
        let page: ListPage<serde_json::Value> = self.get(Api::Arm, url).await.context("check active status")?;
        Ok(!page.value.is_empty())
    }
}
