use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Delivery medium for an outreach record. Email is reserved for the email
/// pipeline, which only ever creates instance shells today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::Email => "email",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sms" => Some(Channel::Sms),
            "email" => Some(Channel::Email),
            _ => None,
        }
    }
}

/// Message direction. Inbound is reserved for provider webhooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Outbound,
    Inbound,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Outbound => "outbound",
            Direction::Inbound => "inbound",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "outbound" => Some(Direction::Outbound),
            "inbound" => Some(Direction::Inbound),
            _ => None,
        }
    }
}

/// What a dispatch is aimed at: one contact or every member of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchTarget {
    Contact(Uuid),
    Group(Uuid),
}

/// One dispatch request's message content, created before any delivery is
/// attempted and never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutreachInstance {
    pub id: Uuid,
    pub organization_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// One audit row per (instance, recipient) pair. The message body is
/// denormalized so the audit trail survives later edits to the contact or
/// instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryAttempt {
    pub id: Uuid,
    pub organization_id: String,
    pub channel: Channel,
    pub contact_id: Uuid,
    pub body: String,
    pub direction: Direction,
    pub provider_message_id: Option<String>,
    pub successful: bool,
    pub created_at: DateTime<Utc>,
}

/// Cross-channel "did we talk to this person" record, written after the
/// recipient's delivery attempt resolves. `associated_group_id` is set only
/// when the recipient was reached as part of a group broadcast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactLog {
    pub id: Uuid,
    pub organization_id: String,
    pub channel: Channel,
    pub contact_id: Uuid,
    pub instance_id: Uuid,
    pub initiator_email: String,
    pub successful: bool,
    pub associated_group_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// One summary row per group-targeted dispatch, regardless of group size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastLog {
    pub id: Uuid,
    pub organization_id: String,
    pub channel: Channel,
    pub group_id: Uuid,
    pub instance_id: Uuid,
    pub initiator_email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: Uuid,
    pub organization_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub id: Uuid,
    pub organization_id: String,
    pub name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub organization_id: String,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub notes: String,
}

#[derive(Debug, Clone)]
pub struct NewGroup {
    pub organization_id: String,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct NewDeliveryAttempt {
    pub organization_id: String,
    pub channel: Channel,
    pub contact_id: Uuid,
    pub body: String,
    pub direction: Direction,
    pub provider_message_id: Option<String>,
    pub successful: bool,
}

#[derive(Debug, Clone)]
pub struct NewContactLog {
    pub organization_id: String,
    pub channel: Channel,
    pub contact_id: Uuid,
    pub instance_id: Uuid,
    pub initiator_email: String,
    pub successful: bool,
    pub associated_group_id: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewBroadcastLog {
    pub organization_id: String,
    pub channel: Channel,
    pub group_id: Uuid,
    pub instance_id: Uuid,
    pub initiator_email: String,
}
