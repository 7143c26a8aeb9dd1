use crate::error::DispatchError;
use crate::models::{Contact, DispatchTarget};
use crate::store::ContactStore;

/// Turns a dispatch target into the concrete, non-empty list of contacts to
/// message. Pure lookup; no side effects.
#[derive(Clone)]
pub struct RecipientResolver {
    contacts: ContactStore,
}

impl RecipientResolver {
    pub fn new(contacts: ContactStore) -> Self {
        Self { contacts }
    }

    pub async fn resolve(&self, target: DispatchTarget) -> Result<Vec<Contact>, DispatchError> {
        match target {
            DispatchTarget::Contact(contact_id) => {
                let contact = self
                    .contacts
                    .get_contact(contact_id)
                    .await?
                    .ok_or(DispatchError::ContactNotFound)?;
                Ok(vec![contact])
            }
            DispatchTarget::Group(group_id) => {
                self.contacts
                    .get_group(group_id)
                    .await?
                    .ok_or(DispatchError::GroupNotFound)?;
                let members = self.contacts.contacts_in_group(group_id).await?;
                if members.is_empty() {
                    return Err(DispatchError::EmptyGroup);
                }
                Ok(members)
            }
        }
    }
}
