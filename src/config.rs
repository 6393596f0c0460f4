//! Loads the project configuration from a `sitewright.yaml` file. See
//! [`Config::from_directory`].

use serde::Deserialize;
use std::fmt;
use std::fs::File;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// The name of the project file searched for by [`Config::from_directory`].
pub const PROJECT_FILE: &str = "sitewright.yaml";

/// The thumbnail shown for posts without any image.
pub const NO_THUMBNAIL: &str = "https://pelukjanda.github.io/tema/no-thumbnail.jpg";

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

fn default_output_root() -> PathBuf {
    PathBuf::from("docs")
}

fn default_posts_subdir() -> String {
    "posts".to_owned()
}

fn default_labels_subdir() -> String {
    "labels".to_owned()
}

fn default_site_root() -> String {
    "/".to_owned()
}

fn default_theme() -> PathBuf {
    PathBuf::from("theme")
}

fn default_author() -> String {
    "Admin".to_owned()
}

fn default_read_more() -> String {
    "Read more".to_owned()
}

fn default_related_count() -> usize {
    crate::related::DEFAULT_RELATED_COUNT
}

fn default_snippet_length() -> usize {
    100
}

fn default_no_thumbnail() -> String {
    NO_THUMBNAIL.to_owned()
}

fn default_api_base() -> Url {
    // a constant that always parses
    Url::parse("https://public-api.wordpress.com/rest/v1.1/").unwrap()
}

fn default_per_request() -> usize {
    100
}

fn default_true() -> bool {
    true
}

/// The contents of a project file.
#[derive(Deserialize)]
struct Project {
    #[serde(default)]
    page_size: PageSize,

    #[serde(default = "default_output_root")]
    output_root: PathBuf,

    #[serde(default = "default_posts_subdir")]
    posts_subdir: String,

    #[serde(default = "default_labels_subdir")]
    labels_subdir: String,

    #[serde(default = "default_site_root")]
    site_root: String,

    #[serde(default = "default_theme")]
    theme: PathBuf,

    #[serde(default = "default_author")]
    author: String,

    #[serde(default = "default_read_more")]
    read_more: String,

    #[serde(default = "default_related_count")]
    related_count: usize,

    #[serde(default)]
    related_seed: Option<u64>,

    #[serde(default = "default_snippet_length")]
    snippet_length: usize,

    #[serde(default = "default_no_thumbnail")]
    no_thumbnail: String,

    #[serde(default = "default_true")]
    clean: bool,

    source: Source,
}

/// The `source` section of a project file.
#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum Source {
    Wordpress {
        site_id: String,

        #[serde(default = "default_api_base")]
        api_base: Url,

        #[serde(default = "default_per_request")]
        per_request: usize,

        #[serde(default)]
        snapshot: Option<PathBuf>,
    },
    Json {
        path: PathBuf,
    },
    Markdown {
        directory: PathBuf,
    },
}

/// Settings for page generation. These are everything
/// [`crate::build::SiteBuilder`] needs to know; file locations other than the
/// output root live on [`Config`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteConfig {
    /// The number of posts per index or label page.
    pub page_size: usize,

    /// The directory all pages are written under.
    pub output_root: PathBuf,

    /// The subdirectory of `output_root` for post detail pages.
    pub posts_subdir: String,

    /// The subdirectory of `output_root` for label pages.
    pub labels_subdir: String,

    /// Prefixed onto every generated link, e.g. `/` or `/blog/`.
    pub site_root: String,

    /// The name on the author line of post cards.
    pub author: String,

    /// The text of the "read more" link on post cards.
    pub read_more: String,

    /// The maximum number of related posts per detail page.
    pub related_count: usize,

    /// Seeds related-post sampling. When unset, every build samples afresh.
    pub related_seed: Option<u64>,

    /// The number of characters kept in card snippets.
    pub snippet_length: usize,

    /// The thumbnail for posts without any image.
    pub no_thumbnail: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        SiteConfig {
            page_size: PageSize::default().0,
            output_root: default_output_root(),
            posts_subdir: default_posts_subdir(),
            labels_subdir: default_labels_subdir(),
            site_root: default_site_root(),
            author: default_author(),
            read_more: default_read_more(),
            related_count: default_related_count(),
            related_seed: None,
            snippet_length: default_snippet_length(),
            no_thumbnail: default_no_thumbnail(),
        }
    }
}

/// Where posts come from. Paths are absolute or relative to the working
/// directory once resolved.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SourceConfig {
    /// The WordPress.com public REST API.
    Wordpress {
        site_id: String,
        api_base: Url,
        per_request: usize,

        /// Where to save the fetched posts as JSON, if anywhere.
        snapshot: Option<PathBuf>,
    },

    /// A JSON file holding previously fetched posts.
    Json { path: PathBuf },

    /// A directory of markdown files with YAML frontmatter.
    Markdown { directory: PathBuf },
}

/// The resolved project configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub site: SiteConfig,

    /// The directory holding the page templates.
    pub theme_directory: PathBuf,

    pub source: SourceConfig,

    /// Whether to remove the posts and labels output directories before
    /// writing.
    pub clean: bool,
}

impl Config {
    /// Searches `dir` and then each of its ancestors for a [`PROJECT_FILE`]
    /// and loads the first one found.
    pub fn from_directory(dir: &Path) -> Result<Config> {
        let path = dir.join(PROJECT_FILE);
        if path.exists() {
            Config::from_project_file(&path)
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent),
                None => Err(Error::NotFound),
            }
        }
    }

    /// Loads the project file at `path`. Relative paths inside the file are
    /// resolved against the file's directory.
    pub fn from_project_file(path: &Path) -> Result<Config> {
        let file = File::open(path).map_err(|err| Error::Open {
            path: path.to_owned(),
            err,
        })?;
        let project: Project = serde_yaml::from_reader(file).map_err(|err| Error::Yaml {
            path: path.to_owned(),
            err,
        })?;
        let project_root = path.parent().unwrap_or_else(|| Path::new("."));
        Config::from_project(project, project_root)
    }

    fn from_project(project: Project, project_root: &Path) -> Result<Config> {
        if project.page_size.0 == 0 {
            return Err(Error::InvalidPageSize);
        }
        check_subdir("posts_subdir", &project.posts_subdir)?;
        check_subdir("labels_subdir", &project.labels_subdir)?;
        Ok(Config {
            site: SiteConfig {
                page_size: project.page_size.0,
                output_root: project_root.join(project.output_root),
                posts_subdir: project.posts_subdir,
                labels_subdir: project.labels_subdir,
                site_root: project.site_root,
                author: project.author,
                read_more: project.read_more,
                related_count: project.related_count,
                related_seed: project.related_seed,
                snippet_length: project.snippet_length,
                no_thumbnail: project.no_thumbnail,
            },
            theme_directory: project_root.join(project.theme),
            source: match project.source {
                Source::Wordpress {
                    site_id,
                    api_base,
                    per_request,
                    snapshot,
                } => SourceConfig::Wordpress {
                    site_id,
                    api_base,
                    per_request: per_request.max(1),
                    snapshot: snapshot.map(|p| project_root.join(p)),
                },
                Source::Json { path } => SourceConfig::Json {
                    path: project_root.join(path),
                },
                Source::Markdown { directory } => SourceConfig::Markdown {
                    directory: project_root.join(directory),
                },
            },
            clean: project.clean,
        })
    }
}

/// Output subdirectories are cleaned before every build, so each must name a
/// directory strictly below the output root.
fn check_subdir(field: &'static str, value: &str) -> Result<()> {
    let mut components = Path::new(value).components().peekable();
    let below_root = components.peek().is_some()
        && components.all(|c| matches!(c, Component::Normal(_)));
    match below_root {
        true => Ok(()),
        false => Err(Error::InvalidSubdir {
            field,
            value: value.to_owned(),
        }),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading the configuration.
#[derive(Debug)]
pub enum Error {
    /// Returned when no project file exists in the directory or its ancestors.
    NotFound,

    /// Returned when the project file can't be opened.
    Open { path: PathBuf, err: std::io::Error },

    /// Returned when the project file isn't valid YAML or is missing fields.
    Yaml {
        path: PathBuf,
        err: serde_yaml::Error,
    },

    /// Returned when `page_size` is zero.
    InvalidPageSize,

    /// Returned when `posts_subdir` or `labels_subdir` is empty or leaves
    /// the output root (`.`, `..`, absolute paths).
    InvalidSubdir { field: &'static str, value: String },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::NotFound => write!(
                f,
                "Could not find `{}` in any parent directory",
                PROJECT_FILE
            ),
            Error::Open { path, err } => {
                write!(f, "Opening project file '{}': {}", path.display(), err)
            }
            Error::Yaml { path, err } => {
                write!(f, "Loading project file '{}': {}", path.display(), err)
            }
            Error::InvalidPageSize => write!(f, "`page_size` must be at least 1"),
            Error::InvalidSubdir { field, value } => write!(
                f,
                "`{}` must be a subdirectory of the output root, got '{}'",
                field, value
            ),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::NotFound => None,
            Error::Open { path: _, err } => Some(err),
            Error::Yaml { path: _, err } => Some(err),
            Error::InvalidPageSize => None,
            Error::InvalidSubdir { .. } => None,
        }
    }
}
