//! Ownership rules enforced by the store itself.
//!
//! The client checks authorship before writing; these rules apply the same
//! check on the store side so a misbehaving client cannot bypass it.

use std::collections::HashMap;

use coldhours_core::domain::IdentityId;
use coldhours_core::ports::{BLOGS, Fields, StoreError, USERS};

/// Who owns the documents of a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Owner {
    /// The identity id stored in this field.
    Field(String),
    /// The identity whose id is the document id.
    DocumentId,
}

#[derive(Debug, Clone, Default)]
pub struct AccessRules {
    owners: HashMap<String, Owner>,
}

impl AccessRules {
    /// No rules; every write is allowed.
    pub fn open() -> Self {
        Self::default()
    }

    /// `Blogs` owned by `authorId`, `Users` owned by document id.
    pub fn standard() -> Self {
        Self::open()
            .owned_by_field(BLOGS, "authorId")
            .owned_by_document_id(USERS)
    }

    pub fn owned_by_field(mut self, collection: &str, field: &str) -> Self {
        self.owners
            .insert(collection.to_string(), Owner::Field(field.to_string()));
        self
    }

    pub fn owned_by_document_id(mut self, collection: &str) -> Self {
        self.owners.insert(collection.to_string(), Owner::DocumentId);
        self
    }

    /// A new document must name the caller as its owner.
    pub fn check_create(
        &self,
        collection: &str,
        id: &str,
        fields: &Fields,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        let Some(owner) = self.owners.get(collection) else {
            return Ok(());
        };
        let caller = caller.ok_or(StoreError::PermissionDenied)?;
        let allowed = match owner {
            Owner::Field(field) => field_is(fields, field, caller),
            Owner::DocumentId => id == caller.as_str(),
        };
        deny_unless(allowed, collection, id)
    }

    /// Only the owner may change or delete an existing document, and an
    /// update may not hand it to someone else.
    pub fn check_write(
        &self,
        collection: &str,
        id: &str,
        existing: &Fields,
        incoming: Option<&Fields>,
        caller: Option<&IdentityId>,
    ) -> Result<(), StoreError> {
        let Some(owner) = self.owners.get(collection) else {
            return Ok(());
        };
        let caller = caller.ok_or(StoreError::PermissionDenied)?;
        let allowed = match owner {
            Owner::Field(field) => {
                field_is(existing, field, caller)
                    && incoming.is_none_or(|incoming| {
                        !incoming.contains_key(field) || field_is(incoming, field, caller)
                    })
            }
            Owner::DocumentId => id == caller.as_str(),
        };
        deny_unless(allowed, collection, id)
    }
}

fn field_is(fields: &Fields, field: &str, caller: &IdentityId) -> bool {
    fields.get(field).and_then(|v| v.as_str()) == Some(caller.as_str())
}

fn deny_unless(allowed: bool, collection: &str, id: &str) -> Result<(), StoreError> {
    if allowed {
        return Ok(());
    }
    tracing::warn!(collection = %collection, document_id = %id, "Store rule denied write");
    Err(StoreError::PermissionDenied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn test_create_requires_matching_owner_field() {
        let rules = AccessRules::standard();
        let ada = IdentityId::new("ada");
        let post = fields(json!({ "authorId": "ada" }));

        assert!(rules.check_create(BLOGS, "p1", &post, Some(&ada)).is_ok());
        assert!(matches!(
            rules.check_create(BLOGS, "p1", &post, Some(&IdentityId::new("bob"))),
            Err(StoreError::PermissionDenied)
        ));
        assert!(rules.check_create(BLOGS, "p1", &post, None).is_err());
    }

    #[test]
    fn test_write_by_non_owner_denied() {
        let rules = AccessRules::standard();
        let existing = fields(json!({ "authorId": "ada" }));

        assert!(
            rules
                .check_write(BLOGS, "p1", &existing, None, Some(&IdentityId::new("ada")))
                .is_ok()
        );
        assert!(
            rules
                .check_write(BLOGS, "p1", &existing, None, Some(&IdentityId::new("bob")))
                .is_err()
        );
    }

    #[test]
    fn test_owner_cannot_reassign_post() {
        let rules = AccessRules::standard();
        let existing = fields(json!({ "authorId": "ada" }));
        let incoming = fields(json!({ "authorId": "bob" }));

        assert!(
            rules
                .check_write(BLOGS, "p1", &existing, Some(&incoming), Some(&IdentityId::new("ada")))
                .is_err()
        );
    }

    #[test]
    fn test_users_owned_by_document_id() {
        let rules = AccessRules::standard();
        let ada = IdentityId::new("ada");

        assert!(rules.check_create(USERS, "ada", &Fields::new(), Some(&ada)).is_ok());
        assert!(rules.check_create(USERS, "bob", &Fields::new(), Some(&ada)).is_err());
    }

    #[test]
    fn test_open_rules_allow_everything() {
        let rules = AccessRules::open();
        assert!(rules.check_create(BLOGS, "p1", &Fields::new(), None).is_ok());
    }
}
