use crate::ClickUpUrl;

/// Filters understood by the filtered team tasks endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    pub space_ids: Vec<String>,
    pub folder_ids: Vec<String>,
    pub list_ids: Vec<String>,
    pub assignees: Vec<String>,
    pub tags: Vec<String>,
    pub statuses: Vec<String>,
    pub include_closed: bool,
}

impl TaskQuery {
    pub fn is_filtered(&self) -> bool {
        !(self.space_ids.is_empty()
            && self.folder_ids.is_empty()
            && self.list_ids.is_empty()
            && self.assignees.is_empty()
            && self.tags.is_empty()
            && self.statuses.is_empty())
    }

    pub(crate) fn apply(&self, url: ClickUpUrl) -> ClickUpUrl {
        url.with_array("space_ids", &self.space_ids)
            .with_array("project_ids", &self.folder_ids)
            .with_array("list_ids", &self.list_ids)
            .with_array("assignees", &self.assignees)
            .with_array("tags", &self.tags)
            .with_array("statuses", &self.statuses)
            .with_query("include_closed", self.include_closed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_query_is_unfiltered() {
        let query = TaskQuery {
            include_closed: true,
            ..Default::default()
        };
        assert!(!query.is_filtered());
    }

    #[test]
    fn apply_encodes_every_set() {
        let query = TaskQuery {
            space_ids: vec!["s1".to_string()],
            folder_ids: vec!["f1".to_string()],
            assignees: vec!["183".to_string()],
            ..Default::default()
        };
        assert!(query.is_filtered());

        let url = query.apply(ClickUpUrl::new("https://x.test/v2/team/1/task"));
        assert_eq!(
            url.as_ref(),
            "https://x.test/v2/team/1/task?space_ids[]=s1&project_ids[]=f1&assignees[]=183&include_closed=false"
        );
    }
}
