use std::sync::Arc;

use tokio_util::task::TaskTracker;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::DispatchError;
use crate::models::{
    Channel, Contact, Direction, DispatchTarget, NewBroadcastLog, NewContactLog,
    NewDeliveryAttempt, OutreachInstance,
};
use crate::resolver::RecipientResolver;
use crate::sender::{ChannelSender, SendError};
use crate::store::AuditStore;

/// Orchestrates one outreach dispatch: creates the instance record, fans out
/// one delivery pipeline per resolved recipient, and writes the broadcast
/// summary for group targets.
///
/// The caller gets the instance back as soon as it (and, for groups, the
/// broadcast log) is persisted. Recipient pipelines run on a process-wide
/// task tracker so they complete even after the response is sent; `drain`
/// waits them out on shutdown.
pub struct Dispatcher {
    audit: AuditStore,
    resolver: RecipientResolver,
    sender: Arc<dyn ChannelSender>,
    deliveries: TaskTracker,
}

impl Dispatcher {
    pub fn new(audit: AuditStore, resolver: RecipientResolver, sender: Arc<dyn ChannelSender>) -> Self {
        Self {
            audit,
            resolver,
            sender,
            deliveries: TaskTracker::new(),
        }
    }

    pub async fn dispatch(
        &self,
        organization_id: &str,
        initiator_email: &str,
        channel: Channel,
        target: DispatchTarget,
        body: &str,
    ) -> Result<OutreachInstance, DispatchError> {
        // The instance exists before any delivery attempt so every record
        // written afterwards has something to reference, even if all sends
        // fail. A resolver failure below leaves it behind as an orphan.
        let instance = self.audit.create_instance(organization_id, body).await?;

        let recipients = self.resolver.resolve(target).await?;

        let associated_group_id = match target {
            DispatchTarget::Contact(_) => None,
            DispatchTarget::Group(group_id) => Some(group_id),
        };

        info!(
            instance_id = %instance.id,
            recipients = recipients.len(),
            group = ?associated_group_id,
            "dispatching outreach"
        );

        for contact in recipients {
            let pipeline = DeliveryPipeline {
                audit: self.audit.clone(),
                sender: self.sender.clone(),
                organization_id: organization_id.to_string(),
                initiator_email: initiator_email.to_string(),
                channel,
                instance_id: instance.id,
                body: body.to_string(),
                associated_group_id,
            };
            self.deliveries.spawn(pipeline.run(contact));
        }

        if let DispatchTarget::Group(group_id) = target {
            self.audit
                .record_broadcast(NewBroadcastLog {
                    organization_id: organization_id.to_string(),
                    channel,
                    group_id,
                    instance_id: instance.id,
                    initiator_email: initiator_email.to_string(),
                })
                .await?;
        }

        Ok(instance)
    }

    /// Waits for every launched delivery pipeline to finish. Called once on
    /// shutdown, after the server has stopped accepting requests.
    pub async fn drain(&self) {
        self.deliveries.close();
        self.deliveries.wait().await;
    }
}

/// One recipient's isolated delivery pipeline: send, then unconditionally
/// record the attempt, then the contact log. Nothing here propagates; a
/// failure becomes `successful = false` or an error log, never an abort of
/// sibling pipelines.
struct DeliveryPipeline {
    audit: AuditStore,
    sender: Arc<dyn ChannelSender>,
    organization_id: String,
    initiator_email: String,
    channel: Channel,
    instance_id: Uuid,
    body: String,
    associated_group_id: Option<Uuid>,
}

impl DeliveryPipeline {
    async fn run(self, contact: Contact) {
        let send_result = self.send_guarded(&contact.phone).await;

        let (successful, provider_message_id) = match send_result {
            Ok(message_id) => (true, Some(message_id)),
            Err(err) => {
                error!(
                    contact_id = %contact.id,
                    instance_id = %self.instance_id,
                    error = %err,
                    "delivery failed"
                );
                (false, None)
            }
        };

        // The attempt row is written on every exit from the send, success or
        // not. A persistence failure here is reported and the pipeline moves
        // on; it must never take sibling recipients down with it.
        if let Err(err) = self
            .audit
            .record_attempt(NewDeliveryAttempt {
                organization_id: self.organization_id.clone(),
                channel: self.channel,
                contact_id: contact.id,
                body: self.body.clone(),
                direction: Direction::Outbound,
                provider_message_id,
                successful,
            })
            .await
        {
            error!(
                contact_id = %contact.id,
                instance_id = %self.instance_id,
                error = %err,
                "failed to record delivery attempt"
            );
        }

        if let Err(err) = self
            .audit
            .record_contact_log(NewContactLog {
                organization_id: self.organization_id.clone(),
                channel: self.channel,
                contact_id: contact.id,
                instance_id: self.instance_id,
                initiator_email: self.initiator_email.clone(),
                successful,
                associated_group_id: self.associated_group_id,
            })
            .await
        {
            error!(
                contact_id = %contact.id,
                instance_id = %self.instance_id,
                error = %err,
                "failed to record contact log"
            );
        }
    }

    /// Runs the provider call on its own task so that even a panicking
    /// sender still yields an outcome for the attempt record.
    async fn send_guarded(&self, to: &str) -> Result<String, SendError> {
        let sender = self.sender.clone();
        let to = to.to_string();
        let body = self.body.clone();
        match tokio::spawn(async move { sender.send(&to, &body).await }).await {
            Ok(result) => result,
            Err(join_err) => Err(SendError::new(format!("sender task failed: {join_err}"))),
        }
    }
}
