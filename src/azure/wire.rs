// Wire shapes for the ARM, Graph and Resource Graph payloads
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scope;
use crate::types::{ActiveAssignment, EligibleRole, RequestType, ResourceGroup, ScheduleResponse, Subscription};

/// ARM/Graph error envelope.
#[derive(Debug, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One page of a list response. ARM uses `nextLink`, Graph `@odata.nextLink`.
#[derive(Debug, Deserialize)]
pub struct ListPage<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", alias = "@odata.nextLink", default)]
    pub next_link: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayName {
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpandedProperties {
    #[serde(default)]
    pub scope: DisplayName,
    #[serde(default)]
    pub role_definition: DisplayName,
}

/// Role eligibility schedule or assignment schedule instance.
#[derive(Debug, Deserialize)]
pub struct ScheduleItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub properties: ScheduleItemProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleItemProperties {
    #[serde(default)]
    pub scope: String,
    #[serde(default)]
    pub role_definition_id: String,
    #[serde(default)]
    pub principal_id: String,
    #[serde(default)]
    pub end_date_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub expanded_properties: ExpandedProperties,
}

impl ScheduleItem {
    pub fn into_eligible_role(self) -> EligibleRole {
        let props = self.properties;
        EligibleRole {
            scope_display: scope::default_scope_display(&props.scope, &props.expanded_properties.scope.display_name),
            scope: props.scope,
            role_name: props.expanded_properties.role_definition.display_name,
            role_definition_id: props.role_definition_id,
            eligibility_schedule_id: self.id,
        }
    }

    pub fn into_active_assignment(self) -> ActiveAssignment {
        let props = self.properties;
        ActiveAssignment {
            name: self.name,
            scope_display: scope::default_scope_display(&props.scope, &props.expanded_properties.scope.display_name),
            scope: props.scope,
            role_name: props.expanded_properties.role_definition.display_name,
            role_definition_id: props.role_definition_id,
            end_date_time: props.end_date_time,
        }
    }
}

const SUBSCRIPTION_TYPES: [&str; 2] = [
    "Microsoft.Management/managementGroups/subscriptions",
    "/subscriptions",
];

fn is_subscription_type(kind: &str) -> bool {
    SUBSCRIPTION_TYPES.iter().any(|t| kind.eq_ignore_ascii_case(t))
}

/// Entry of `managementGroups/{id}/descendants`.
#[derive(Debug, Deserialize)]
pub struct Descendant {
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub properties: DisplayName,
}

impl Descendant {
    pub fn into_subscription(self) -> Option<Subscription> {
        if !is_subscription_type(&self.kind) || self.name.is_empty() {
            return None;
        }
        Some(Subscription {
            id: self.name,
            display_name: self.properties.display_name,
        })
    }
}

/// `managementGroups/{id}?$expand=children&$recurse=true`.
#[derive(Debug, Deserialize)]
pub struct ManagementGroupTree {
    #[serde(default)]
    pub properties: ManagementGroupTreeProperties,
}

#[derive(Debug, Default, Deserialize)]
pub struct ManagementGroupTreeProperties {
    #[serde(default)]
    pub children: Vec<TreeChild>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeChild {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub children: Option<Vec<TreeChild>>,
}

impl ManagementGroupTree {
    /// Every subscription anywhere beneath the group, depth first.
    pub fn subscriptions(self) -> Vec<Subscription> {
        let mut found = Vec::new();
        collect_subscriptions(self.properties.children, &mut found);
        found
    }
}

fn collect_subscriptions(children: Vec<TreeChild>, found: &mut Vec<Subscription>) {
    for child in children {
        if is_subscription_type(&child.kind) && !child.name.is_empty() {
            found.push(Subscription {
                id: child.name,
                display_name: child.display_name,
            });
        } else if let Some(grandchildren) = child.children {
            collect_subscriptions(grandchildren, found);
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ResourceGroupItem {
    #[serde(default)]
    pub id: String,
    pub name: String,
}

impl ResourceGroupItem {
    pub fn into_resource_group(self, subscription_id: &str) -> ResourceGroup {
        ResourceGroup {
            subscription_id: subscription_id.to_string(),
            name: self.name,
            id: self.id,
        }
    }
}

/// Azure Resource Graph query request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraphQuery {
    pub query: String,
    pub management_groups: Vec<String>,
    pub options: ResourceGraphOptions,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraphOptions {
    pub result_format: &'static str,
    #[serde(rename = "$skipToken", skip_serializing_if = "Option::is_none")]
    pub skip_token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResourceGraphPage {
    #[serde(default)]
    pub data: Vec<ResourceGraphRow>,
    #[serde(rename = "$skipToken", default)]
    pub skip_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceGraphRow {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subscription_id: String,
}

impl From<ResourceGraphRow> for ResourceGroup {
    fn from(row: ResourceGraphRow) -> Self {
        ResourceGroup {
            subscription_id: row.subscription_id,
            name: row.name,
            id: row.id,
        }
    }
}

/// Body of a `roleAssignmentScheduleRequests` PUT.
#[derive(Debug, Serialize)]
pub struct ScheduleRequest {
    pub properties: ScheduleRequestProperties,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequestProperties {
    pub principal_id: String,
    pub role_definition_id: String,
    pub request_type: RequestType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub justification: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_role_eligibility_schedule_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_info: Option<ScheduleInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleInfo {
    pub start_date_time: String,
    pub expiration: Expiration,
}

#[derive(Debug, Serialize)]
pub struct Expiration {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub duration: String,
}

#[derive(Debug, Deserialize)]
pub struct ScheduleRequestResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub properties: ScheduleRequestStatus,
}

#[derive(Debug, Default, Deserialize)]
pub struct ScheduleRequestStatus {
    #[serde(default)]
    pub status: String,
}

impl From<ScheduleRequestResponse> for ScheduleResponse {
    fn from(resp: ScheduleRequestResponse) -> Self {
        ScheduleResponse {
            name: resp.name,
            status: resp.properties.status,
        }
    }
}
