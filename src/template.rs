//! Placeholder substitution for page templates, and the [`Templates`] store
//! that loads the three page templates from a theme directory.
//!
//! A placeholder is a name wrapped as `{{ name }}`, with exactly one space on
//! each side. [`render`] replaces the placeholders whose names appear in the
//! context and leaves every other placeholder in the output verbatim. That
//! pass-through is part of the contract: themes may carry placeholders that a
//! given page type never fills, and they must render as harmless text rather
//! than fail the build.

use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const OPEN: &str = "{{ ";
const CLOSE: &str = " }}";

/// Values to substitute into a template, keyed by placeholder name.
pub type Context<'a> = HashMap<&'a str, String>;

/// Substitutes the `context` values into `template`.
///
/// The template is scanned once from left to right, so text coming from a
/// substituted value is never itself scanned for placeholders.
pub fn render(template: &str, context: &Context) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find(OPEN) {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + OPEN.len()..];
        let value = after_open
            .find(CLOSE)
            .and_then(|end| context.get(&after_open[..end]).map(|value| (end, value)));
        match value {
            Some((end, value)) => {
                out.push_str(value);
                rest = &after_open[end + CLOSE.len()..];
            }
            // Not a known placeholder: keep the opening braces and resume the
            // scan right after them, so a placeholder nested inside unknown
            // text is still found.
            None => {
                out.push_str(OPEN);
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

/// The kind of page a template renders.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Post,
    Index,
    Label,
}

impl Kind {
    /// The file name of the kind's template inside a theme directory.
    pub fn file_name(self) -> &'static str {
        match self {
            Kind::Post => "post_template.html",
            Kind::Index => "index_template.html",
            Kind::Label => "label_template.html",
        }
    }
}

/// The three page templates.
#[derive(Clone, Debug, Default)]
pub struct Templates {
    /// Fills `title`, `content`, `labels`, and `related`.
    pub post: String,

    /// Fills `items` and `pagination`.
    pub index: String,

    /// Fills `label`, `items`, and `pagination`.
    pub label: String,
}

impl Templates {
    /// Loads `post_template.html`, `index_template.html`, and
    /// `label_template.html` from `theme_directory`.
    pub fn load(theme_directory: &Path) -> Result<Templates> {
        let read = |kind: Kind| {
            let path = theme_directory.join(kind.file_name());
            fs::read_to_string(&path).map_err(|err| Error::OpenTemplateFile { path, err })
        };
        Ok(Templates {
            post: read(Kind::Post)?,
            index: read(Kind::Index)?,
            label: read(Kind::Label)?,
        })
    }

    pub fn get(&self, kind: Kind) -> &str {
        match kind {
            Kind::Post => &self.post,
            Kind::Index => &self.index,
            Kind::Label => &self.label,
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem loading a template.
#[derive(Debug)]
pub enum Error {
    /// Returned when a template file can't be read.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::OpenTemplateFile { path: _, err } => Some(err),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    fn context(pairs: &[(&'static str, &str)]) -> Context<'static> {
        pairs.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_render_replaces_every_occurrence() {
        let ctx = context(&[("title", "Hi"), ("content", "<p>x</p>")]);
        assert_eq!(
            "<title>Hi</title><h1>Hi</h1><p>x</p>",
            render("<title>{{ title }}</title><h1>{{ title }}</h1>{{ content }}", &ctx)
        );
    }

    #[test]
    fn test_render_leaves_unknown_placeholders() {
        let ctx = context(&[("title", "Hi")]);
        assert_eq!(
            "Hi {{ custom_head }} {{title}} {{ ",
            render("{{ title }} {{ custom_head }} {{title}} {{ ", &ctx)
        );
    }

    #[test]
    fn test_render_does_not_rescan_values() {
        let ctx = context(&[("a", "{{ b }}"), ("b", "B")]);
        assert_eq!("{{ b }} B", render("{{ a }} {{ b }}", &ctx));
    }

    #[test]
    fn test_render_finds_placeholder_after_unknown_open() {
        let ctx = context(&[("a", "A")]);
        assert_eq!("{{ {{ x A }}", render("{{ {{ x {{ a }} }}", &ctx));
    }

    #[test]
    fn test_render_is_idempotent_without_placeholder_values() {
        let ctx = context(&[("title", "T"), ("items", "<li>1</li>")]);
        let template = "{{ title }}{{ items }}{{ missing }}";
        let once = render(template, &ctx);
        assert_eq!(once, render(&once, &ctx));
    }

    #[test]
    fn test_load_templates() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let dir = tempfile::tempdir()?;
        for kind in [Kind::Post, Kind::Index, Kind::Label] {
            fs::write(dir.path().join(kind.file_name()), kind.file_name())?;
        }
        let templates = Templates::load(dir.path())?;
        assert_eq!("label_template.html", templates.get(Kind::Label));
        Ok(())
    }

    #[test]
    fn test_load_missing_template() {
        let dir = tempfile::tempdir().unwrap();
        match Templates::load(dir.path()) {
            Err(Error::OpenTemplateFile { path, .. }) => {
                assert!(path.ends_with("post_template.html"))
            }
            Ok(_) => panic!("wanted an error"),
        }
    }
}
