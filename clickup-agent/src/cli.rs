use clap::{Args, Parser, Subcommand};

use crate::domain::search::{RecordKind, SearchFilters, SearchRequest};

#[derive(Debug, Parser)]
#[command(name = "clickup-agent")]
#[command(about = "Fuzzy search and image-budgeted content for ClickUp")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search tasks, documents or spaces
    Search(SearchArgs),
    /// Show a task with its images
    Task(TaskArgs),
    /// Print the configuration directory
    ConfigPath,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// task, document or space
    pub kind: RecordKind,
    /// Search terms. Without terms every record matching the filters is listed
    pub terms: Vec<String>,
    #[arg(long = "space-id")]
    pub space_ids: Vec<String>,
    #[arg(long = "folder-id")]
    pub folder_ids: Vec<String>,
    #[arg(long = "list-id")]
    pub list_ids: Vec<String>,
    #[arg(long = "assignee")]
    pub assignees: Vec<String>,
    #[arg(long = "tag")]
    pub tags: Vec<String>,
    #[arg(long = "status")]
    pub statuses: Vec<String>,
    #[arg(long)]
    pub include_closed: bool,
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct TaskArgs {
    pub id: String,
    /// Overrides images.max_count
    #[arg(long)]
    pub max_images: Option<usize>,
    /// Overrides images.max_size_mb
    #[arg(long)]
    pub max_size_mb: Option<f64>,
}

impl SearchArgs {
    pub fn to_request(&self) -> SearchRequest {
        let terms: Vec<String> = self
            .terms
            .iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect();

        SearchRequest {
            kind: self.kind,
            terms: (!terms.is_empty()).then_some(terms),
            filters: SearchFilters {
                space_ids: self.space_ids.clone(),
                folder_ids: self.folder_ids.clone(),
                list_ids: self.list_ids.clone(),
                assignee_ids: self.assignees.clone(),
                tags: self.tags.clone(),
                statuses: self.statuses.clone(),
                include_closed: self.include_closed,
            },
            limit: self.limit,
        }
    }
}
