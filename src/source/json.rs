//! Reads posts from a JSON snapshot on disk, such as the one
//! [`super::WordpressSource`] saves.

use super::{ContentSource, Error, Result};
use crate::post::Post;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// A JSON file holding either a list of posts or an object with a `posts`
/// list (the shape of a WordPress API response).
pub struct JsonSource {
    path: PathBuf,
}

impl JsonSource {
    pub fn new(path: PathBuf) -> JsonSource {
        JsonSource { path }
    }
}

impl ContentSource for JsonSource {
    fn fetch(&self) -> Result<Vec<Post>> {
        let text = std::fs::read_to_string(&self.path).map_err(|err| Error::Io {
            path: self.path.clone(),
            err,
        })?;
        let posts = parse_posts(&self.path, &text)?;
        info!("read {} posts from {}", posts.len(), self.path.display());
        Ok(posts)
    }
}

/// Decodes `text` as a post list. `path` is only used for error messages.
pub fn parse_posts(path: &Path, text: &str) -> Result<Vec<Post>> {
    let list = match serde_json::from_str::<Value>(text)? {
        list @ Value::Array(_) => list,
        Value::Object(mut object) => match object.remove("posts") {
            Some(list @ Value::Array(_)) => list,
            _ => return Err(Error::UnexpectedJson(path.to_owned())),
        },
        _ => return Err(Error::UnexpectedJson(path.to_owned())),
    };
    serde_json::from_value(list).map_err(|err| {
        Error::Annotated(format!("decoding posts in `{}`", path.display()), Box::new(Error::Json(err)))
    })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_list_and_wrapped() -> Result<()> {
        let path = Path::new("posts.json");
        let list = parse_posts(path, r#"[{"ID": 1, "title": "A"}, {"ID": 2, "title": "B"}]"#)?;
        assert_eq!(vec!["A", "B"], list.iter().map(|p| p.title.as_str()).collect::<Vec<_>>());

        let wrapped = parse_posts(path, r#"{"found": 1, "posts": [{"ID": 3, "title": "C"}]}"#)?;
        assert_eq!("3", wrapped[0].id.as_str());
        Ok(())
    }

    #[test]
    fn test_parse_keeps_label_key_order() -> Result<()> {
        let posts = parse_posts(
            Path::new("posts.json"),
            r#"[{"ID": 1, "title": "A", "categories": {
                "zeta": {"name": "Zeta"},
                "alpha": {"name": "Alpha"},
                "mid": {"name": "Mid"}
            }}]"#,
        )?;
        assert_eq!(
            vec!["Zeta", "Alpha", "Mid"],
            posts[0].labels().names().collect::<Vec<_>>()
        );
        assert_eq!(Some("Zeta"), posts[0].labels().first_name());
        Ok(())
    }

    #[test]
    fn test_parse_unexpected_shape() {
        assert!(matches!(
            parse_posts(Path::new("x.json"), r#"{"found": 0}"#),
            Err(Error::UnexpectedJson(_))
        ));
        assert!(matches!(
            parse_posts(Path::new("x.json"), "not json"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_fetch_missing_file() {
        let source = JsonSource::new(PathBuf::from("/nonexistent/posts.json"));
        assert!(matches!(source.fetch(), Err(Error::Io { .. })));
    }
}
