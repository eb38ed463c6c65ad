use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A contractor firm whose books are kept in the application.
///
/// Records serialize with the camelCase keys used by the on-disk data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Firm {
    pub id: String,
    pub name: String,
    pub description: String,
    pub gst_number: Option<String>,
    pub permanent_address: String,
    pub present_address: String,
    pub phone: String,
    pub proprietor: String,
    pub account_number: Option<String>,
    pub ifsc_code: Option<String>,
    pub letterhead_type: String,
    pub letterhead_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
