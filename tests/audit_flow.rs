mod common;

use anyhow::Result;
use axum::http::StatusCode;
use common::{body_to_vec, SendSmsPayload, TestApp};
use outreach::models::{BroadcastLog, ContactLog, OutreachInstance};

const ORG: &str = "org-lighthouse";
const OTHER_ORG: &str = "org-other";

#[tokio::test]
async fn instances_are_listed_per_organization() -> Result<()> {
    let app = TestApp::new()?;
    let contact = app.seed_contact(ORG, "ada", "+15550000001").await?;

    for message in ["first", "second"] {
        let response = app
            .post_json(
                "/api/outreach/sms",
                ORG,
                &SendSmsPayload::contact(contact.id, message),
            )
            .await?;
        assert_eq!(response.status(), StatusCode::CREATED);
    }
    app.wait_for_contact_logs(ORG, 2).await?;

    let response = app.get("/api/outreach/instances", ORG).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_vec(response.into_body()).await?;
    let instances: Vec<OutreachInstance> = serde_json::from_slice(&body)?;
    assert_eq!(instances.len(), 2);

    let response = app.get("/api/outreach/instances", OTHER_ORG).await?;
    let body = body_to_vec(response.into_body()).await?;
    let instances: Vec<OutreachInstance> = serde_json::from_slice(&body)?;
    assert!(instances.is_empty());

    Ok(())
}

#[tokio::test]
async fn contact_logs_are_scoped_to_contact_and_organization() -> Result<()> {
    let app = TestApp::new()?;
    let ada = app.seed_contact(ORG, "ada", "+15550000001").await?;
    let bob = app.seed_contact(ORG, "bob", "+15550000002").await?;

    let response = app
        .post_json(
            "/api/outreach/sms",
            ORG,
            &SendSmsPayload::contact(ada.id, "for ada"),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.wait_for_contact_logs(ORG, 1).await?;

    let body = body_to_vec(
        app.get(&format!("/api/contact-logs/{}", ada.id), ORG)
            .await?
            .into_body(),
    )
    .await?;
    let ada_logs: Vec<ContactLog> = serde_json::from_slice(&body)?;
    assert_eq!(ada_logs.len(), 1);

    let body = body_to_vec(
        app.get(&format!("/api/contact-logs/{}", bob.id), ORG)
            .await?
            .into_body(),
    )
    .await?;
    let bob_logs: Vec<ContactLog> = serde_json::from_slice(&body)?;
    assert!(bob_logs.is_empty());

    let body = body_to_vec(app.get("/api/contact-logs", OTHER_ORG).await?.into_body()).await?;
    let other_logs: Vec<ContactLog> = serde_json::from_slice(&body)?;
    assert!(other_logs.is_empty());

    Ok(())
}

#[tokio::test]
async fn broadcast_log_filter_matches_only_the_dispatched_group() -> Result<()> {
    let app = TestApp::new()?;
    let ada = app.seed_contact(ORG, "ada", "+15550000001").await?;
    let volunteers = app.seed_group(ORG, "volunteers", &[&ada]).await?;
    let donors = app.seed_group(ORG, "donors", &[&ada]).await?;

    let response = app
        .post_json(
            "/api/outreach/sms",
            ORG,
            &SendSmsPayload::group(volunteers.id, "volunteers only"),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    app.wait_for_contact_logs(ORG, 1).await?;

    let body = body_to_vec(
        app.get(&format!("/api/broadcast-logs/{}", volunteers.id), ORG)
            .await?
            .into_body(),
    )
    .await?;
    let volunteer_broadcasts: Vec<BroadcastLog> = serde_json::from_slice(&body)?;
    assert_eq!(volunteer_broadcasts.len(), 1);

    let body = body_to_vec(
        app.get(&format!("/api/broadcast-logs/{}", donors.id), ORG)
            .await?
            .into_body(),
    )
    .await?;
    let donor_broadcasts: Vec<BroadcastLog> = serde_json::from_slice(&body)?;
    assert!(donor_broadcasts.is_empty());

    let body = body_to_vec(app.get("/api/broadcast-logs", ORG).await?.into_body()).await?;
    let all_broadcasts: Vec<BroadcastLog> = serde_json::from_slice(&body)?;
    assert_eq!(all_broadcasts.len(), 1);

    Ok(())
}

#[tokio::test]
async fn health_endpoint_reports_ok() -> Result<()> {
    let app = TestApp::new()?;
    let response = app.get("/api/health", ORG).await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
