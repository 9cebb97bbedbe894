use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::de;
use super::Attachment;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    #[serde(default)]
    pub custom_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub text_content: Option<String>,
    #[serde(default)]
    pub markdown_description: Option<String>,
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<TaskPriority>,
    #[serde(default)]
    pub assignees: Vec<User>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub list: Option<ContainerRef>,
    #[serde(default)]
    pub folder: Option<ContainerRef>,
    #[serde(default)]
    pub space: Option<ContainerRef>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date_created: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date_updated: Option<OffsetDateTime>,
    #[serde(default, deserialize_with = "de::option_millis")]
    pub date_closed: Option<OffsetDateTime>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

impl Task {
    pub fn status_name(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.status.as_str())
    }

    pub fn assignee_names(&self) -> Vec<&str> {
        self.assignees.iter().map(User::display_name).collect()
    }

    pub fn tag_names(&self) -> Vec<&str> {
        self.tags.iter().map(|t| t.name.as_str()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskStatus {
    pub status: String,
    #[serde(default, rename = "type")]
    pub status_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskPriority {
    pub priority: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    pub fn display_name(&self) -> &str {
        self.username
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tag {
    pub name: String,
}

/// A list, folder or space reference embedded in a task. Spaces only carry an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerRef {
    #[serde(deserialize_with = "de::id_string")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TasksPage {
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub last_page: Option<bool>,
}
