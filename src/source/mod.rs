//! Content sources: where the [`Post`] collection comes from before a build.
//!
//! A source either returns the complete collection or fails; nothing is
//! rendered from a partial fetch. Retrying a failed fetch is left to whoever
//! runs the build.

pub mod json;
pub mod markdown;
pub mod wordpress;

use crate::config::SourceConfig;
use crate::post::Post;
use std::fmt;
use std::path::PathBuf;

pub use json::JsonSource;
pub use markdown::MarkdownSource;
pub use wordpress::WordpressSource;

/// Supplies the ordered post collection for a build.
pub trait ContentSource {
    /// Returns every post, in the order pages should list them (typically
    /// newest first).
    fn fetch(&self) -> Result<Vec<Post>>;
}

/// Creates the source described by `config`.
pub fn from_config(config: &SourceConfig) -> Result<Box<dyn ContentSource>> {
    Ok(match config {
        SourceConfig::Wordpress {
            site_id,
            api_base,
            per_request,
            snapshot,
        } => Box::new(WordpressSource::new(
            api_base,
            site_id,
            *per_request,
            snapshot.clone(),
        )?),
        SourceConfig::Json { path } => Box::new(JsonSource::new(path.clone())),
        SourceConfig::Markdown { directory } => Box::new(MarkdownSource::new(directory.clone())),
    })
}

/// The result of a fallible fetch.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents a failure to produce the post collection.
#[derive(Debug)]
pub enum Error {
    /// Returned for I/O problems reading or writing a local file.
    Io { path: PathBuf, err: std::io::Error },

    /// Returned when JSON can't be decoded into posts.
    Json(serde_json::Error),

    /// Returned when a JSON snapshot is neither a list of posts nor an object
    /// with a `posts` list.
    UnexpectedJson(PathBuf),

    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned for WalkDir I/O errors.
    WalkDir(walkdir::Error),

    /// Returned when the content API URL can't be built.
    UrlParse(url::ParseError),

    /// Returned when a request to the content API fails in transport.
    Http(ureq::Error),

    /// Returned when the content API answers with an error status.
    HttpStatus { status: u16, body: String },

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io { path, err } => write!(f, "{}: {}", path.display(), err),
            Error::Json(err) => err.fmt(f),
            Error::UnexpectedJson(path) => write!(
                f,
                "{}: expected a list of posts or an object with a `posts` list",
                path.display()
            ),
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Http(err) => err.fmt(f),
            Error::HttpStatus { status, body } => {
                write!(f, "content API returned {}: {}", status, body)
            }
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io { path: _, err } => Some(err),
            Error::Json(err) => Some(err),
            Error::UnexpectedJson(_) => None,
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::UrlParse(err) => Some(err),
            Error::Http(err) => Some(err),
            Error::HttpStatus { .. } => None,
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for Error {
    /// Converts a [`serde_json::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator when decoding posts.
    fn from(err: serde_json::Error) -> Error {
        Error::Json(err)
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts a [`walkdir::Error`] into an [`Error`].
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<ureq::Error> for Error {
    /// Converts a [`ureq::Error`] into an [`Error`]. It allows us to use the
    /// `?` operator on requests.
    fn from(err: ureq::Error) -> Error {
        Error::Http(err)
    }
}
