//! Domain service for contact submissions (leads).

use serde::Deserialize;
use thiserror::Error;

use crate::db::DbFailure;
use crate::models::lead::{Lead, LeadSummary, NewLead};

#[derive(Debug, Error)]
pub enum ContactError {
    #[error("{0}")]
    Validation(String),

    #[error("Contact not found")]
    NotFound,

    #[error(transparent)]
    Database(DbFailure),
}

impl From<anyhow::Error> for ContactError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(DbFailure::classify(&err))
    }
}

/// Raw contact form body. Validated into a [`NewLead`] before anything is stored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContactSubmission {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub subject: Option<String>,
    pub message: Option<String>,
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ContactSubmission {
    /// Trims every field and maps blank optionals to `None`.
    ///
    /// The email is stored as given. An address the relay refuses only fails
    /// the confirmation mail.
    pub fn validate(self) -> Result<NewLead, ContactError> {
        let (Some(name), Some(email), Some(message)) = (
            trimmed(self.name),
            trimmed(self.email),
            trimmed(self.message),
        ) else {
            return Err(ContactError::Validation(
                "Name, email, and message are required fields".to_string(),
            ));
        };

        Ok(NewLead {
            name,
            email,
            phone: trimmed(self.phone),
            subject: trimmed(self.subject),
            message,
        })
    }
}

#[async_trait::async_trait]
pub trait ContactService: Send + Sync {
    /// Persists a lead and queues its notifications.
    ///
    /// # Errors
    ///
    /// Returns [`ContactError::Validation`] before touching the store. Mail
    /// failures never surface here.
    async fn submit(&self, submission: ContactSubmission) -> Result<LeadSummary, ContactError>;

    /// Newest first.
    async fn list_all(&self) -> Result<Vec<Lead>, ContactError>;

    async fn get_by_id(&self, id: i32) -> Result<Lead, ContactError>;

    /// Returns false when no lead has this id.
    async fn delete(&self, id: i32) -> Result<bool, ContactError>;

    /// Idempotent. Returns false when no lead has this id.
    async fn mark_read(&self, id: i32) -> Result<bool, ContactError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn submission(name: &str, email: &str, message: &str) -> ContactSubmission {
        ContactSubmission {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            message: Some(message.to_string()),
            ..ContactSubmission::default()
        }
    }

    #[test]
    fn test_validate_trims_and_nulls_blank_optionals() {
        let mut input = submission("  Meera ", " meera@example.com ", " Hello ");
        input.phone = Some("   ".to_string());
        input.subject = Some(" Pricing ".to_string());

        let lead = input.validate().unwrap();
        assert_eq!(lead.name, "Meera");
        assert_eq!(lead.email, "meera@example.com");
        assert_eq!(lead.message, "Hello");
        assert_eq!(lead.phone, None);
        assert_eq!(lead.subject.as_deref(), Some("Pricing"));
    }

    #[test]
    fn test_validate_requires_mandatory_fields() {
        for input in [
            submission("", "a@x.com", "hi"),
            submission("A", "   ", "hi"),
            submission("A", "a@x.com", "\n\t"),
            ContactSubmission::default(),
        ] {
            assert!(matches!(input.validate(), Err(ContactError::Validation(_))));
        }
    }

    #[test]
    fn test_validate_keeps_free_form_email() {
        let lead = submission("A", " reach me on whatsapp ", "hi")
            .validate()
            .unwrap();
        assert_eq!(lead.email, "reach me on whatsapp");
    }
}
