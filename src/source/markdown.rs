//! Reads posts from a local corpus of markdown files. Each file looks like:
//!
//! ```md
//! ---
//! Title: Hello, world!
//! Date: 2021-04-16
//! Categories: [Greetings]
//! ---
//! # Hello
//!
//! World
//! ```
//!
//! The frontmatter may also carry `Slug`, `Tags`, `FeaturedImage`, and
//! `Excerpt`. Posts are ordered by date, most recent first.

use super::{ContentSource, Error, Result};
use crate::post::{Labels, Post};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use pulldown_cmark::{html, Options, Parser};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use walkdir::WalkDir;

const MARKDOWN_EXTENSION: &str = "md";

/// A directory of markdown post files, searched recursively. A post's id is
/// its path relative to the directory, without the extension.
pub struct MarkdownSource {
    directory: PathBuf,
}

impl MarkdownSource {
    pub fn new(directory: PathBuf) -> MarkdownSource {
        MarkdownSource { directory }
    }
}

impl ContentSource for MarkdownSource {
    fn fetch(&self) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        for result in WalkDir::new(&self.directory).min_depth(1).sort_by_file_name() {
            let entry = result?;
            let path = entry.path();
            if !entry.file_type().is_file()
                || path.extension().map_or(true, |ext| ext != MARKDOWN_EXTENSION)
            {
                continue;
            }
            // strip_prefix() should never fail; every entry is under `directory`
            let relative = path.strip_prefix(&self.directory).unwrap_or(path);
            posts.push(read_post(path, relative).map_err(|e| {
                Error::Annotated(format!("parsing post `{}`", relative.display()), Box::new(e))
            })?);
        }

        sort_newest_first(&mut posts);
        info!("read {} posts from {}", posts.len(), self.directory.display());
        Ok(posts)
    }
}

#[derive(Deserialize)]
struct Frontmatter {
    #[serde(rename = "Title")]
    title: String,

    #[serde(default, rename = "Date")]
    date: Option<String>,

    #[serde(default, rename = "Slug")]
    slug: Option<String>,

    #[serde(default, rename = "Categories")]
    categories: Vec<String>,

    #[serde(default, rename = "Tags")]
    tags: Vec<String>,

    #[serde(default, rename = "FeaturedImage")]
    featured_image: Option<String>,

    #[serde(default, rename = "Excerpt")]
    excerpt: Option<String>,
}

fn read_post(path: &Path, relative: &Path) -> Result<Post> {
    let input = std::fs::read_to_string(path).map_err(|err| Error::Io {
        path: path.to_owned(),
        err,
    })?;
    let id = relative
        .with_extension("")
        .to_string_lossy()
        .replace('\\', "/");
    parse_post(&id, &input)
}

/// Parses a single post from its `id` and the contents of its source file.
pub fn parse_post(id: &str, input: &str) -> Result<Post> {
    fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
        const FENCE: &str = "---";
        if !input.starts_with(FENCE) {
            return Err(Error::FrontmatterMissingStartFence);
        }
        match input[FENCE.len()..].find(FENCE) {
            None => Err(Error::FrontmatterMissingEndFence),
            Some(offset) => Ok((
                FENCE.len(),                        // yaml_start
                FENCE.len() + offset,               // yaml_stop
                FENCE.len() + offset + FENCE.len(), // body_start
            )),
        }
    }

    let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
    let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

    let mut options = Options::empty();
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    let mut content = String::new();
    html::push_html(&mut content, Parser::new_ext(&input[body_start..], options));

    let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
    Ok(Post {
        id: id.into(),
        title: frontmatter.title,
        slug: non_blank(frontmatter.slug),
        content,
        excerpt: non_blank(frontmatter.excerpt),
        featured_image: non_blank(frontmatter.featured_image),
        categories: Labels::from_names(&frontmatter.categories),
        tags: Labels::from_names(&frontmatter.tags),
        date: non_blank(frontmatter.date),
    })
}

/// Parses `YYYY-MM-DD` dates and RFC 3339 timestamps.
fn parse_date(date: &str) -> Option<NaiveDateTime> {
    DateTime::parse_from_rfc3339(date)
        .map(|d| d.naive_utc())
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Orders posts by date, most recent first. Posts without a readable date go
/// last; ties keep their existing order.
fn sort_newest_first(posts: &mut [Post]) {
    let mut keyed: Vec<(Option<NaiveDateTime>, usize)> = posts
        .iter()
        .enumerate()
        .map(|(i, post)| {
            let date = post.date.as_deref().and_then(parse_date);
            if date.is_none() {
                warn!("post `{}` has no readable date; listing it last", post.id);
            }
            (date, i)
        })
        .collect();
    keyed.sort_by(|(a, ai), (b, bi)| b.cmp(a).then(ai.cmp(bi)));

    let mut sorted: Vec<Post> = keyed
        .into_iter()
        .map(|(_, i)| std::mem::take(&mut posts[i]))
        .collect();
    posts.swap_with_slice(&mut sorted);
}

#[cfg(test)]
mod test {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_post() -> Result<()> {
        let post = parse_post(
            "hello",
            "---\nTitle: Hello\nDate: 2021-04-16\nCategories: [Greetings, News]\nFeaturedImage: ''\n---\n# Hi\n\nSee <a href=\"x\">x</a>.\n",
        )?;
        assert_eq!("hello", post.id.as_str());
        assert_eq!("Hello", post.title);
        assert_eq!(Some("2021-04-16".to_owned()), post.date);
        assert_eq!(None, post.featured_image);
        assert_eq!(vec!["Greetings", "News"], post.labels().names().collect::<Vec<_>>());
        assert!(post.content.starts_with("<h1>Hi</h1>"));
        Ok(())
    }

    #[test]
    fn test_parse_post_missing_fences() {
        assert!(matches!(
            parse_post("x", "Title: nope\n"),
            Err(Error::FrontmatterMissingStartFence)
        ));
        assert!(matches!(
            parse_post("x", "---\nTitle: nope\n"),
            Err(Error::FrontmatterMissingEndFence)
        ));
    }

    #[test]
    fn test_fetch_orders_newest_first() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::create_dir_all(dir.path().join("nested"))?;
        fs::write(dir.path().join("old.md"), "---\nTitle: Old\nDate: 2020-01-01\n---\nold")?;
        fs::write(
            dir.path().join("nested/new.md"),
            "---\nTitle: New\nDate: 2022-03-04T05:06:07+00:00\n---\nnew",
        )?;
        fs::write(dir.path().join("undated.md"), "---\nTitle: Undated\n---\nundated")?;
        fs::write(dir.path().join("notes.txt"), "ignored")?;

        let posts = MarkdownSource::new(dir.path().to_owned()).fetch()?;
        assert_eq!(
            vec!["nested/new", "old", "undated"],
            posts.iter().map(|p| p.id.as_str()).collect::<Vec<_>>()
        );
        Ok(())
    }

    #[test]
    fn test_fetch_annotates_errors() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("broken.md"), "no frontmatter")?;
        match MarkdownSource::new(dir.path().to_owned()).fetch() {
            Err(Error::Annotated(annotation, _)) => assert!(annotation.contains("broken.md")),
            other => panic!("unexpected result: {:?}", other.map(|p| p.len())),
        }
        Ok(())
    }
}
