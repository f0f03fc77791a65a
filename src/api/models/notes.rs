//! Note API models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::api::models::{check_max, check_required};
use crate::db::models::notes::{NoteCreateDBRequest, NoteDBResponse, NoteUpdateDBRequest};
use crate::errors::Error;
use crate::types::{NoteId, UserId};

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct NoteCreate {
    pub title: String,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub is_public: bool,
}

impl NoteCreate {
    pub fn validate(&self) -> Result<(), Error> {
        check_required("title", &self.title, 32)?;
        check_max("detail", &self.detail, 256)
    }

    /// Attach the owner to form the database request. Ownership always comes
    /// from the authenticated caller, never from the payload.
    pub fn into_db_request(self, user_id: UserId) -> NoteCreateDBRequest {
        NoteCreateDBRequest {
            title: self.title,
            detail: self.detail,
            is_public: self.is_public,
            user_id,
        }
    }
}

/// Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub detail: Option<String>,
    pub is_public: Option<bool>,
    pub is_archived: Option<bool>,
}

impl NoteUpdate {
    pub fn validate(&self) -> Result<(), Error> {
        if let Some(title) = &self.title {
            check_required("title", title, 32)?;
        }
        if let Some(detail) = &self.detail {
            check_max("detail", detail, 256)?;
        }
        Ok(())
    }
}

impl From<NoteUpdate> for NoteUpdateDBRequest {
    fn from(update: NoteUpdate) -> Self {
        Self {
            title: update.title,
            detail: update.detail,
            is_public: update.is_public,
            is_archived: update.is_archived,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NoteResponse {
    pub id: NoteId,
    pub title: String,
    pub detail: String,
    pub is_public: bool,
    pub is_archived: bool,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<NoteDBResponse> for NoteResponse {
    fn from(note: NoteDBResponse) -> Self {
        Self {
            id: note.id,
            title: note.title,
            detail: note.detail,
            is_public: note.is_public,
            is_archived: note.is_archived,
            user_id: note.user_id,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_note_create_defaults() {
        let note: NoteCreate = serde_json::from_value(serde_json::json!({ "title": "shopping" })).unwrap();
        assert_eq!(note.title, "shopping");
        assert_eq!(note.detail, "");
        assert!(!note.is_public);
    }

    #[test]
    fn test_note_create_validation() {
        let empty_title = NoteCreate {
            title: String::new(),
            detail: String::new(),
            is_public: false,
        };
        assert!(empty_title.validate().is_err());

        let long_detail = NoteCreate {
            title: "ok".to_string(),
            detail: "d".repeat(257),
            is_public: false,
        };
        assert!(long_detail.validate().is_err());

        let empty_detail_is_fine = NoteCreate {
            title: "ok".to_string(),
            detail: String::new(),
            is_public: true,
        };
        assert!(empty_detail_is_fine.validate().is_ok());
    }
}
