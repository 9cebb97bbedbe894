use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::de;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub parent: Option<DocParent>,
    #[serde(default, deserialize_with = "de::option_id_string")]
    pub workspace_id: Option<String>,
    #[serde(default, deserialize_with = "de::option_id_string")]
    pub creator: Option<String>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date_created: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date_updated: Option<OffsetDateTime>,
    #[serde(default)]
    pub deleted: bool,
}

/// Where a doc lives. `parent_type` is the numeric container type (4 = space, 5 = folder,
/// 6 = list, 7 = everything, 12 = workspace).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocParent {
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(default, rename = "type")]
    pub parent_type: Option<i64>,
}

pub const DOC_PARENT_SPACE: i64 = 4;

impl Doc {
    pub fn space_id(&self) -> Option<&str> {
        self.parent
            .as_ref()
            .filter(|p| p.parent_type == Some(DOC_PARENT_SPACE))
            .map(|p| p.id.as_str())
    }
}

#[derive(Debug, Deserialize)]
pub struct DocsPage {
    pub docs: Vec<Doc>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}
