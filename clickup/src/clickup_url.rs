use std::env;

use url::form_urlencoded::byte_serialize;

pub const DEFAULT_API_URL: &str = "https://api.clickup.com/api";

#[derive(Debug, Clone)]
pub struct ClickUpUrl(String);

impl AsRef<str> for ClickUpUrl {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl ClickUpUrl {
    pub fn new(base: impl Into<String>) -> Self {
        Self(base.into())
    }

    /// Creates a new ClickUpUrl from the environment variable `CLICKUP_API_URL`, falling back to
    /// the public API.
    pub fn from_env() -> Self {
        Self(env::var("CLICKUP_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()))
    }

    /// Append the given path to the URL.
    pub fn append_path(&self, path: &str) -> Self {
        let trimmed_url = self.0.trim_end_matches('/');
        let trimmed_path = path.trim_start_matches('/');
        Self(format!("{}/{}", trimmed_url, trimmed_path))
    }

    pub fn with_query(&self, name: &str, value: impl AsRef<str>) -> Self {
        let separator = if self.0.contains('?') { '&' } else { '?' };
        Self(format!(
            "{}{}{}={}",
            self.0,
            separator,
            name,
            encode(value.as_ref())
        ))
    }

    /// Appends `name[]=value` once per value, the array encoding the API expects.
    pub fn with_array<S: AsRef<str>>(&self, name: &str, values: &[S]) -> Self {
        values.iter().fold(self.clone(), |url, value| {
            url.with_query(&format!("{}[]", name), value)
        })
    }
}

fn encode(value: &str) -> String {
    byte_serialize(value.as_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_path_normalizes_slashes() {
        let url = ClickUpUrl::new("https://api.clickup.com/api/").append_path("/v2/task/abc");
        assert_eq!(url.as_ref(), "https://api.clickup.com/api/v2/task/abc");
    }

    #[test]
    fn query_params_are_chained_and_encoded() {
        let url = ClickUpUrl::new("https://x.test")
            .append_path("v2/team/1/task")
            .with_query("page", "2")
            .with_query("order_by", "updated at");
        assert_eq!(
            url.as_ref(),
            "https://x.test/v2/team/1/task?page=2&order_by=updated+at"
        );
    }

    #[test]
    fn arrays_repeat_the_bracketed_name() {
        let url = ClickUpUrl::new("https://x.test").with_array("space_ids", &["s1", "s2"]);
        assert_eq!(url.as_ref(), "https://x.test?space_ids[]=s1&space_ids[]=s2");
    }
}
