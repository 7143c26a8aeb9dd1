use std::sync::Arc;

use crate::{
    config::AppConfig,
    db::Database,
    dispatch::Dispatcher,
    resolver::RecipientResolver,
    sender::ChannelSender,
    store::{AuditStore, ContactStore},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub contacts: ContactStore,
    pub audit: AuditStore,
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig, sender: Arc<dyn ChannelSender>) -> Self {
        let contacts = ContactStore::new(db.clone());
        let audit = AuditStore::new(db);
        let resolver = RecipientResolver::new(contacts.clone());
        let dispatcher = Arc::new(Dispatcher::new(audit.clone(), resolver, sender));
        Self {
            config: Arc::new(config),
            contacts,
            audit,
            dispatcher,
        }
    }
}
