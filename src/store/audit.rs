use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Row};
use uuid::Uuid;

use crate::db::Database;
use crate::models::{
    BroadcastLog, Channel, ContactLog, DeliveryAttempt, Direction, NewBroadcastLog,
    NewContactLog, NewDeliveryAttempt, OutreachInstance,
};

use super::{
    format_timestamp, invalid_column, parse_optional_uuid, parse_timestamp, parse_uuid,
};

/// Append-only audit collections. Inserts assign a fresh id and timestamp
/// and return the persisted record; there are no update or delete paths.
#[derive(Clone)]
pub struct AuditStore {
    db: Database,
}

impl AuditStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn create_instance(
        &self,
        organization_id: &str,
        body: &str,
    ) -> Result<OutreachInstance> {
        let instance = OutreachInstance {
            id: Uuid::new_v4(),
            organization_id: organization_id.to_string(),
            body: body.to_string(),
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO outreach_instances (id, organization_id, body, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                instance.id.to_string(),
                instance.organization_id,
                instance.body,
                format_timestamp(instance.created_at),
            ],
        )
        .context("failed to insert outreach instance")?;
        Ok(instance)
    }

    pub async fn list_instances(&self, organization_id: &str) -> Result<Vec<OutreachInstance>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, body, created_at
             FROM outreach_instances
             WHERE organization_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![organization_id], instance_from_row)?;
        collect(rows)
    }

    pub async fn record_attempt(&self, new: NewDeliveryAttempt) -> Result<DeliveryAttempt> {
        let attempt = DeliveryAttempt {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            channel: new.channel,
            contact_id: new.contact_id,
            body: new.body,
            direction: new.direction,
            provider_message_id: new.provider_message_id,
            successful: new.successful,
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO delivery_attempts
             (id, organization_id, channel, contact_id, body, direction,
              provider_message_id, successful, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                attempt.id.to_string(),
                attempt.organization_id,
                attempt.channel.as_str(),
                attempt.contact_id.to_string(),
                attempt.body,
                attempt.direction.as_str(),
                attempt.provider_message_id,
                attempt.successful,
                format_timestamp(attempt.created_at),
            ],
        )
        .context("failed to insert delivery attempt")?;
        Ok(attempt)
    }

    pub async fn attempts_for_contact(
        &self,
        organization_id: &str,
        contact_id: Uuid,
    ) -> Result<Vec<DeliveryAttempt>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, channel, contact_id, body, direction,
                    provider_message_id, successful, created_at
             FROM delivery_attempts
             WHERE organization_id = ?1 AND contact_id = ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![organization_id, contact_id.to_string()],
            attempt_from_row,
        )?;
        collect(rows)
    }

    pub async fn record_contact_log(&self, new: NewContactLog) -> Result<ContactLog> {
        let log = ContactLog {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            channel: new.channel,
            contact_id: new.contact_id,
            instance_id: new.instance_id,
            initiator_email: new.initiator_email,
            successful: new.successful,
            associated_group_id: new.associated_group_id,
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO contact_logs
             (id, organization_id, channel, contact_id, instance_id,
              initiator_email, successful, associated_group_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                log.id.to_string(),
                log.organization_id,
                log.channel.as_str(),
                log.contact_id.to_string(),
                log.instance_id.to_string(),
                log.initiator_email,
                log.successful,
                log.associated_group_id.map(|id| id.to_string()),
                format_timestamp(log.created_at),
            ],
        )
        .context("failed to insert contact log")?;
        Ok(log)
    }

    pub async fn list_contact_logs(&self, organization_id: &str) -> Result<Vec<ContactLog>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, channel, contact_id, instance_id,
                    initiator_email, successful, associated_group_id, created_at
             FROM contact_logs
             WHERE organization_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![organization_id], contact_log_from_row)?;
        collect(rows)
    }

    pub async fn contact_logs_for_contact(
        &self,
        organization_id: &str,
        contact_id: Uuid,
    ) -> Result<Vec<ContactLog>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, channel, contact_id, instance_id,
                    initiator_email, successful, associated_group_id, created_at
             FROM contact_logs
             WHERE organization_id = ?1 AND contact_id = ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![organization_id, contact_id.to_string()],
            contact_log_from_row,
        )?;
        collect(rows)
    }

    pub async fn record_broadcast(&self, new: NewBroadcastLog) -> Result<BroadcastLog> {
        let log = BroadcastLog {
            id: Uuid::new_v4(),
            organization_id: new.organization_id,
            channel: new.channel,
            group_id: new.group_id,
            instance_id: new.instance_id,
            initiator_email: new.initiator_email,
            created_at: Utc::now(),
        };

        let db = self.db.lock().await;
        db.execute(
            "INSERT INTO broadcast_logs
             (id, organization_id, channel, group_id, instance_id,
              initiator_email, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                log.id.to_string(),
                log.organization_id,
                log.channel.as_str(),
                log.group_id.to_string(),
                log.instance_id.to_string(),
                log.initiator_email,
                format_timestamp(log.created_at),
            ],
        )
        .context("failed to insert broadcast log")?;
        Ok(log)
    }

    pub async fn list_broadcast_logs(&self, organization_id: &str) -> Result<Vec<BroadcastLog>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, channel, group_id, instance_id,
                    initiator_email, created_at
             FROM broadcast_logs
             WHERE organization_id = ?1
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(params![organization_id], broadcast_log_from_row)?;
        collect(rows)
    }

    pub async fn broadcast_logs_for_group(
        &self,
        organization_id: &str,
        group_id: Uuid,
    ) -> Result<Vec<BroadcastLog>> {
        let db = self.db.lock().await;
        let mut stmt = db.prepare(
            "SELECT id, organization_id, channel, group_id, instance_id,
                    initiator_email, created_at
             FROM broadcast_logs
             WHERE organization_id = ?1 AND group_id = ?2
             ORDER BY created_at DESC",
        )?;
        let rows = stmt.query_map(
            params![organization_id, group_id.to_string()],
            broadcast_log_from_row,
        )?;
        collect(rows)
    }
}

fn collect<T>(rows: impl Iterator<Item = rusqlite::Result<T>>) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for row in rows {
        records.push(row?);
    }
    Ok(records)
}

fn channel_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Channel> {
    let raw: String = row.get(idx)?;
    Channel::parse(&raw).ok_or_else(|| invalid_column("channel", raw, idx))
}

fn direction_from_row(row: &Row<'_>, idx: usize) -> rusqlite::Result<Direction> {
    let raw: String = row.get(idx)?;
    Direction::parse(&raw).ok_or_else(|| invalid_column("direction", raw, idx))
}

fn instance_from_row(row: &Row<'_>) -> rusqlite::Result<OutreachInstance> {
    Ok(OutreachInstance {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        body: row.get(2)?,
        created_at: parse_timestamp(row.get(3)?, 3)?,
    })
}

fn attempt_from_row(row: &Row<'_>) -> rusqlite::Result<DeliveryAttempt> {
    Ok(DeliveryAttempt {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        channel: channel_from_row(row, 2)?,
        contact_id: parse_uuid(row.get(3)?, 3)?,
        body: row.get(4)?,
        direction: direction_from_row(row, 5)?,
        provider_message_id: row.get(6)?,
        successful: row.get(7)?,
        created_at: parse_timestamp(row.get(8)?, 8)?,
    })
}

fn contact_log_from_row(row: &Row<'_>) -> rusqlite::Result<ContactLog> {
    Ok(ContactLog {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        channel: channel_from_row(row, 2)?,
        contact_id: parse_uuid(row.get(3)?, 3)?,
        instance_id: parse_uuid(row.get(4)?, 4)?,
        initiator_email: row.get(5)?,
        successful: row.get(6)?,
        associated_group_id: parse_optional_uuid(row.get(7)?, 7)?,
        created_at: parse_timestamp(row.get(8)?, 8)?,
    })
}

fn broadcast_log_from_row(row: &Row<'_>) -> rusqlite::Result<BroadcastLog> {
    Ok(BroadcastLog {
        id: parse_uuid(row.get(0)?, 0)?,
        organization_id: row.get(1)?,
        channel: channel_from_row(row, 2)?,
        group_id: parse_uuid(row.get(3)?, 3)?,
        instance_id: parse_uuid(row.get(4)?, 4)?,
        initiator_email: row.get(5)?,
        created_at: parse_timestamp(row.get(6)?, 6)?,
    })
}
