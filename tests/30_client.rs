use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use azure_pim::azure::{EnvTokenCredential, PimClient, PimSource};
use azure_pim::config::AppConfig;
use azure_pim::error::PimError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> Result<PimClient> {
    let config = AppConfig::with_endpoints(&server.uri(), &server.uri());
    Ok(PimClient::new(&config, Arc::new(EnvTokenCredential::fixed("test-token")))?)
}

fn eligibility(id: &str, role: &str, scope: &str, scope_name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": id,
        "properties": {
            "scope": scope,
            "roleDefinitionId": format!("/providers/Microsoft.Authorization/roleDefinitions/{}", role),
            "principalId": "me",
            "expandedProperties": {
                "scope": { "displayName": scope_name },
                "roleDefinition": { "displayName": role }
            }
        }
    })
}

#[tokio::test]
async fn current_principal_uses_bearer_token() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "me",
            "displayName": "Test Operator",
            "userPrincipalName": "operator@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let principal = client_for(&server)?.current_principal().await?;
    assert_eq!(principal.id, "me");
    assert_eq!(principal.user_principal_name, "operator@example.com");
    Ok(())
}

#[tokio::test]
async fn eligible_roles_follow_next_link() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers/Microsoft.Authorization/roleEligibilitySchedules"))
        .and(query_param("$filter", "asTarget()"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [eligibility("e1", "Reader", "/subscriptions/s1", "Platform")],
            "nextLink": format!("{}/page2", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/page2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [eligibility(
                "e2",
                "Owner",
                "/providers/Microsoft.Management/managementGroups/corp",
                "Corp"
            )]
        })))
        .mount(&server)
        .await;

    let roles = client_for(&server)?.eligible_roles().await?;
    assert_eq!(roles.len(), 2);
    assert_eq!(roles[0].role_name, "Reader");
    assert_eq!(roles[0].eligibility_schedule_id, "e1");
    assert!(roles[1].is_management_group_scoped());
    assert_eq!(roles[1].scope_display, "Corp");
    Ok(())
}

#[tokio::test]
async fn forbidden_listing_is_an_authorization_error() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/s1/resourcegroups"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": "AuthorizationFailed", "message": "no read access" }
        })))
        .mount(&server)
        .await;

    let err = client_for(&server)?
        .subscription_resource_groups("s1")
        .await
        .unwrap_err();
    assert!(err.is_authorization());
    assert!(err.to_string().contains("AuthorizationFailed - no read access"));
    Ok(())
}

#[tokio::test]
async fn server_errors_are_not_authorization_errors() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/s1/resourcegroups"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = client_for(&server)?
        .subscription_resource_groups("s1")
        .await
        .unwrap_err();
    assert!(!err.is_authorization());
    assert!(matches!(err.root(), PimError::Http { status: 500, .. }));
    Ok(())
}

#[tokio::test]
async fn empty_descendants_fall_back_to_expanded_tree() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/providers/Microsoft.Management/managementGroups/corp/descendants"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/providers/Microsoft.Management/managementGroups/corp"))
        .and(query_param("$expand", "children"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "properties": {
                "children": [
                    {
                        "type": "Microsoft.Management/managementGroups",
                        "name": "child",
                        "children": [
                            { "type": "/subscriptions", "name": "s2", "displayName": "Data" }
                        ]
                    },
                    { "type": "/subscriptions", "name": "s1", "displayName": "Platform" }
                ]
            }
        })))
        .mount(&server)
        .await;

    let subs = client_for(&server)?.group_subscriptions("corp").await?;
    let ids: Vec<&str> = subs.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["s2", "s1"]);
    Ok(())
}

#[tokio::test]
async fn activation_request_body() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/s1/providers/Microsoft.Authorization/roleAssignmentSchedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path_regex(
            r"^/subscriptions/s1/providers/Microsoft.Authorization/roleAssignmentScheduleRequests/[0-9a-f-]{36}$",
        ))
        .and(query_param("api-version", "2020-10-01"))
        .and(body_partial_json(json!({
            "properties": {
                "principalId": "me",
                "requestType": "SelfActivate",
                "justification": "Patch",
                "linkedRoleEligibilityScheduleId": "e1",
                "scheduleInfo": {
                    "expiration": { "type": "AfterDuration", "duration": "PT1H30M" }
                }
            }
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "req-1",
            "properties": { "status": "Provisioned" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server)?;
    let role = azure_pim::types::EligibleRole {
        scope: "/subscriptions/s1".to_string(),
        scope_display: "Platform".to_string(),
        role_name: "Reader".to_string(),
        role_definition_id: "/providers/Microsoft.Authorization/roleDefinitions/reader".to_string(),
        eligibility_schedule_id: "e1".to_string(),
    };
    let response = client
        .submit_activation(&role, "me", "Patch", 90, "/subscriptions/s1")
        .await?;
    assert_eq!(response.name, "req-1");
    assert_eq!(response.status, "Provisioned");
    Ok(())
}

#[tokio::test]
async fn active_schedule_turns_activation_into_extension() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/s1/providers/Microsoft.Authorization/roleAssignmentSchedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [{ "id": "existing" }] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(body_partial_json(json!({ "properties": { "requestType": "SelfExtend" } })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "req-2",
            "properties": { "status": "Provisioned" }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let role = azure_pim::types::EligibleRole {
        scope: "/subscriptions/s1".to_string(),
        scope_display: "Platform".to_string(),
        role_name: "Reader".to_string(),
        role_definition_id: "reader".to_string(),
        eligibility_schedule_id: "e1".to_string(),
    };
    let response = client_for(&server)?
        .submit_activation(&role, "me", "Patch", 60, "/subscriptions/s1")
        .await?;
    assert_eq!(response.name, "req-2");
    Ok(())
}

#[tokio::test]
async fn run_deadline_bounds_every_call() -> Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)).set_body_json(json!({ "id": "me" })))
        .mount(&server)
        .await;

    let client = client_for(&server)?
        .with_deadline(tokio::time::Instant::now() + Duration::from_millis(100));
    let err = client.current_principal().await.unwrap_err();
    assert!(matches!(err.root(), PimError::Timeout(_)));
    Ok(())
}
