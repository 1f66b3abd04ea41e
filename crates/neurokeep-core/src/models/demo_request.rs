//! Demo requests left on the landing page.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Contact details from someone asking for a product demo.
///
/// Every field is optional and free text. `role` is whatever the visitor
/// described themselves as, not an account [`Role`](super::Role).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DemoRequest {
    /// Local UUID
    pub id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub created_at: NaiveDateTime,
}

impl DemoRequest {
    pub fn new(created_at: NaiveDateTime) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name: None,
            phone: None,
            email: None,
            role: None,
            created_at,
        }
    }
}
