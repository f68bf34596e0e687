use std::process::Stdio;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tokio::process::Command;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mock_azure() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "me",
            "displayName": "Test Operator",
            "userPrincipalName": "operator@example.com"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/providers/Microsoft.Authorization/roleEligibilitySchedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "value": [{
                "id": "e1",
                "name": "e1",
                "properties": {
                    "scope": "/subscriptions/s1",
                    "roleDefinitionId": "reader",
                    "principalId": "me",
                    "expandedProperties": {
                        "scope": { "displayName": "Platform" },
                        "roleDefinition": { "displayName": "Reader" }
                    }
                }
            }]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/subscriptions/s1/providers/Microsoft.Authorization/roleAssignmentSchedules"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "value": [] })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "name": "req-1",
            "properties": { "status": "Provisioned" }
        })))
        .expect(1)
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn json_activation_keeps_stdout_machine_readable() -> Result<()> {
    let server = mock_azure().await;

    let output = Command::new(env!("CARGO_BIN_EXE_pim"))
        .args(["--json", "activate", "-y", "-j", "Patch window", "--role", "reader"])
        .env("PIM_ARM_ENDPOINT", server.uri())
        .env("PIM_GRAPH_ENDPOINT", server.uri())
        .env("PIM_ARM_TOKEN", "test-token")
        .env("PIM_GRAPH_TOKEN", "test-token")
        .env_remove("PIM_DEFAULT_DURATION")
        .stdin(Stdio::null())
        .output()
        .await
        .context("failed to run pim binary")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "stderr: {}", stderr);

    let payload: Value = serde_json::from_str(&stdout).with_context(|| format!("stdout was not JSON: {}", stdout))?;
    assert_eq!(payload["success"], json!(true));
    assert_eq!(payload["activations"][0]["response"]["status"], json!("Provisioned"));
    assert_eq!(payload["activations"][0]["minutes"], json!(60));

    assert!(stderr.contains("Activation overview:"));
    assert!(stderr.contains("✓ Activation submitted for Reader @ Platform"));
    Ok(())
}
