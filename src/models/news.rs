//! Club news model.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// News post stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct NewsItem {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Publication day ("YYYY-MM-DD"), set by the server
    pub date: String,
    /// Display name of the author
    pub author: String,
    #[serde(default)]
    pub image_url: Option<String>,
}
