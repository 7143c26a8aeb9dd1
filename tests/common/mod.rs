use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use outreach::config::{AppConfig, SmsMode};
use outreach::db::Database;
use outreach::models::{Contact, Group, NewContact, NewGroup};
use outreach::routes::{self, ORGANIZATION_HEADER};
use outreach::sender::{ChannelSender, SendError};
use outreach::state::AppState;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::sleep;
use tower::util::ServiceExt;
use uuid::Uuid;

#[allow(dead_code)]
#[derive(Clone)]
pub struct SentSms {
    pub to: String,
    pub body: String,
}

/// Scriptable channel sender: records every outbound message and fails for
/// any number registered with `fail_number`.
#[derive(Default)]
pub struct FakeSender {
    sent: Mutex<Vec<SentSms>>,
    failing: Mutex<HashSet<String>>,
}

impl FakeSender {
    #[allow(dead_code)]
    pub async fn fail_number(&self, number: &str) {
        let mut guard = self.failing.lock().await;
        guard.insert(number.to_string());
    }

    #[allow(dead_code)]
    pub async fn sent(&self) -> Vec<SentSms> {
        let guard = self.sent.lock().await;
        guard.clone()
    }
}

#[async_trait]
impl ChannelSender for FakeSender {
    async fn send(&self, to: &str, body: &str) -> Result<String, SendError> {
        {
            let failing = self.failing.lock().await;
            if failing.contains(to) {
                return Err(SendError::new(format!("provider rejected {to}")));
            }
        }
        let mut sent = self.sent.lock().await;
        sent.push(SentSms {
            to: to.to_string(),
            body: body.to_string(),
        });
        Ok(format!("fake-sid-{}", sent.len()))
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    sender: Arc<FakeSender>,
}

impl TestApp {
    pub fn new() -> Result<Self> {
        let config = AppConfig {
            database_path: ":memory:".to_string(),
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
            sms_mode: SmsMode::Log,
            twilio_account_sid: None,
            twilio_auth_token: None,
            twilio_from_number: None,
        };

        let db = Database::open_in_memory()?;
        let sender = Arc::new(FakeSender::default());
        let sender_for_state: Arc<dyn ChannelSender> = sender.clone();
        let state = AppState::new(db, config, sender_for_state);
        let router = routes::create_router(state.clone());

        Ok(Self {
            state,
            router,
            sender,
        })
    }

    #[allow(dead_code)]
    pub fn sender(&self) -> Arc<FakeSender> {
        self.sender.clone()
    }

    pub async fn seed_contact(&self, org: &str, name: &str, phone: &str) -> Result<Contact> {
        self.state
            .contacts
            .create_contact(NewContact {
                organization_id: org.to_string(),
                name: name.to_string(),
                phone: phone.to_string(),
                email: format!("{name}@example.org"),
                notes: String::new(),
            })
            .await
    }

    #[allow(dead_code)]
    pub async fn seed_group(&self, org: &str, name: &str, members: &[&Contact]) -> Result<Group> {
        let group = self
            .state
            .contacts
            .create_group(NewGroup {
                organization_id: org.to_string(),
                name: name.to_string(),
                description: String::new(),
            })
            .await?;
        for member in members {
            self.state
                .contacts
                .add_group_member(group.id, member.id)
                .await?;
        }
        Ok(group)
    }

    /// Delivery pipelines outlive the dispatch response; tests wait for the
    /// trailing contact-log writes before asserting on the audit trail.
    #[allow(dead_code)]
    pub async fn wait_for_contact_logs(&self, org: &str, expected: usize) -> Result<()> {
        for _ in 0..200 {
            let logs = self.state.audit.list_contact_logs(org).await?;
            if logs.len() >= expected {
                return Ok(());
            }
            sleep(Duration::from_millis(10)).await;
        }
        bail!("timed out waiting for {expected} contact logs in {org}");
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        org: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json")
            .header(ORGANIZATION_HEADER, org)
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn get(&self, path: &str, org: &str) -> Result<hyper::Response<Body>> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .header(ORGANIZATION_HEADER, org)
            .body(Body::empty())?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    #[allow(dead_code)]
    pub async fn post_json_without_org<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        let body = serde_json::to_vec(payload)?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header("content-type", "application/json")
            .body(Body::from(body))?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    use http_body_util::BodyExt;

    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendSmsPayload<'a> {
    pub target_type: &'a str,
    pub initiator_email: &'a str,
    pub target_id: String,
    pub message: &'a str,
}

impl<'a> SendSmsPayload<'a> {
    #[allow(dead_code)]
    pub fn contact(contact_id: Uuid, message: &'a str) -> Self {
        Self {
            target_type: "contact",
            initiator_email: "ops@example.org",
            target_id: contact_id.to_string(),
            message,
        }
    }

    #[allow(dead_code)]
    pub fn group(group_id: Uuid, message: &'a str) -> Self {
        Self {
            target_type: "group",
            initiator_email: "ops@example.org",
            target_id: group_id.to_string(),
            message,
        }
    }
}
