//! Fetches published posts from the WordPress.com public REST API (v1.1).

use super::{ContentSource, Error, Result};
use crate::post::Post;
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};
use ureq::Agent;
use url::Url;

/// Default HTTP timeout in seconds.
const DEFAULT_TIMEOUT: u64 = 30;

/// The post fields requested from the API.
const FIELDS: &str = "ID,title,content,excerpt,featured_image,categories,tags,URL,slug,date";

/// A WordPress.com site. Posts are requested `per_request` at a time, walking
/// `offset` forward until the API runs out of posts.
pub struct WordpressSource {
    agent: Agent,

    /// `{api_base}/sites/{site_id}/posts`
    endpoint: Url,

    per_request: usize,

    /// Where the raw API records are saved after a successful fetch.
    snapshot: Option<PathBuf>,
}

/// One page of the `/posts` endpoint's response.
#[derive(Deserialize)]
struct PostsPage {
    /// The total number of posts matching the query.
    #[serde(default)]
    found: usize,

    #[serde(default)]
    posts: Vec<Value>,
}

impl WordpressSource {
    pub fn new(
        api_base: &Url,
        site_id: &str,
        per_request: usize,
        snapshot: Option<PathBuf>,
    ) -> Result<WordpressSource> {
        let agent = Agent::config_builder()
            .timeout_global(Some(Duration::from_secs(DEFAULT_TIMEOUT)))
            .http_status_as_error(false)
            .build()
            .into();

        Ok(WordpressSource {
            agent,
            endpoint: posts_endpoint(api_base, site_id)?,
            per_request: per_request.max(1),
            snapshot,
        })
    }

    /// Requests the page of posts starting at `offset`.
    fn fetch_page(&self, offset: usize) -> Result<PostsPage> {
        let url = page_url(&self.endpoint, self.per_request, offset);
        debug!("GET {}", url);

        let response = self
            .agent
            .get(url.as_str())
            .header("Accept", "application/json")
            .call()?;

        let status = response.status().as_u16();
        let mut body_reader = response.into_body();

        if !(200..300).contains(&status) {
            let body = body_reader
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(Error::HttpStatus { status, body });
        }

        Ok(body_reader.read_json()?)
    }

    /// Writes the raw records to the snapshot file, if one is configured.
    fn save_snapshot(&self, records: &[Value]) -> Result<()> {
        let path = match &self.snapshot {
            Some(path) => path,
            None => return Ok(()),
        };
        let io_error = |err| Error::Io {
            path: path.clone(),
            err,
        };
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).map_err(io_error)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(records)?).map_err(io_error)?;
        info!("saved {} posts to {}", records.len(), path.display());
        Ok(())
    }
}

impl ContentSource for WordpressSource {
    fn fetch(&self) -> Result<Vec<Post>> {
        let mut records: Vec<Value> = Vec::new();
        let mut offset = 0;
        loop {
            let page = self.fetch_page(offset)?;
            let received = page.posts.len();
            records.extend(page.posts);
            if is_last_page(self.per_request, offset, received, page.found) {
                break;
            }
            offset += received;
        }
        info!("fetched {} posts from {}", records.len(), self.endpoint);

        self.save_snapshot(&records)?;
        records
            .into_iter()
            .map(|record| serde_json::from_value(record).map_err(Error::from))
            .collect()
    }
}

fn posts_endpoint(api_base: &Url, site_id: &str) -> Result<Url> {
    // `join` drops the last path segment unless the base ends with a slash.
    let mut base = api_base.clone();
    if !base.path().ends_with('/') {
        base.set_path(&format!("{}/", base.path()));
    }
    Ok(base.join(&format!("sites/{}/posts", site_id))?)
}

fn page_url(endpoint: &Url, per_request: usize, offset: usize) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .append_pair("number", &per_request.to_string())
        .append_pair("offset", &offset.to_string())
        .append_pair("status", "publish")
        .append_pair("fields", FIELDS);
    url
}

/// A short page, or a page that reaches the reported total, ends the walk.
fn is_last_page(per_request: usize, offset: usize, received: usize, found: usize) -> bool {
    received < per_request || offset + received >= found
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_posts_endpoint() -> Result<()> {
        let with_slash = Url::parse("https://public-api.wordpress.com/rest/v1.1/")?;
        let without_slash = Url::parse("https://public-api.wordpress.com/rest/v1.1")?;
        let wanted = "https://public-api.wordpress.com/rest/v1.1/sites/143986468/posts";
        assert_eq!(wanted, posts_endpoint(&with_slash, "143986468")?.as_str());
        assert_eq!(wanted, posts_endpoint(&without_slash, "143986468")?.as_str());
        Ok(())
    }

    #[test]
    fn test_page_url() -> Result<()> {
        let endpoint = Url::parse("https://example.com/sites/1/posts")?;
        let url = page_url(&endpoint, 100, 200);
        let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(pairs.contains(&("number".to_owned(), "100".to_owned())));
        assert!(pairs.contains(&("offset".to_owned(), "200".to_owned())));
        assert!(pairs.contains(&("status".to_owned(), "publish".to_owned())));
        Ok(())
    }

    #[test]
    fn test_is_last_page() {
        assert!(is_last_page(100, 0, 40, 40));
        assert!(!is_last_page(100, 0, 100, 250));
        assert!(!is_last_page(100, 100, 100, 250));
        assert!(is_last_page(100, 200, 50, 250));
        // a full page that reaches the total ends the walk without an extra
        // empty request
        assert!(is_last_page(100, 100, 100, 200));
        assert!(is_last_page(100, 0, 0, 0));
    }

    #[test]
    fn test_snapshot_round_trip_through_json_source() -> std::result::Result<(), Box<dyn std::error::Error>> {
        use crate::source::{ContentSource, JsonSource};

        let dir = tempfile::tempdir()?;
        let path = dir.path().join("data/posts.json");
        let source = WordpressSource::new(
            &Url::parse("https://example.com/")?,
            "1",
            100,
            Some(path.clone()),
        )?;
        let records: Vec<Value> = serde_json::from_str(
            r#"[{"ID": 1, "title": "One", "categories": {"z": {"name": "Z"}, "a": {"name": "A"}}}]"#,
        )?;
        source.save_snapshot(&records)?;

        let saved = std::fs::read_to_string(&path)?;
        assert!(saved.find("\"z\"") < saved.find("\"a\""));

        let posts = JsonSource::new(path).fetch()?;
        assert_eq!("One", posts[0].title);
        assert_eq!(vec!["Z", "A"], posts[0].labels().names().collect::<Vec<_>>());
        Ok(())
    }
}
