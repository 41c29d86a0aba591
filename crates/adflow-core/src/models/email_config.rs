use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Per-agency outbound email configuration. Delivery itself is an external
/// collaborator; the core only stores and returns this record. The SMTP
/// password never serializes into a response.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AgencyEmailConfig {
    pub id: Uuid,
    pub agency_id: Uuid,
    pub from_name: String,
    pub from_email: String,
    pub reply_to: Option<String>,
    pub smtp_host: String,
    pub smtp_port: i32,
    pub smtp_username: String,
    #[serde(skip_serializing)]
    pub smtp_password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_smtp_password_never_serialized() {
        let config = AgencyEmailConfig {
            id: Uuid::new_v4(),
            agency_id: Uuid::new_v4(),
            from_name: "Studio".to_string(),
            from_email: "studio@example.com".to_string(),
            reply_to: None,
            smtp_host: "smtp.example.com".to_string(),
            smtp_port: 587,
            smtp_username: "studio".to_string(),
            smtp_password: "s3cret".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&config).expect("serialize");
        assert!(!json.contains("s3cret"));
        assert!(!json.contains("smtp_password"));
    }
}
