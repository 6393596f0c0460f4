//! Exports [`SiteBuilder`], which turns a post collection into the full set of
//! pages, and [`build_site`], which stitches together the high-level steps of
//! a build: loading templates, fetching posts ([`crate::source`]), rendering
//! pages, and handing them to a [`Sink`].
//!
//! Three families of pages are produced, each paginated on its own:
//!
//! 1. One detail page per post, at `{posts_subdir}/{stem}.html`.
//! 2. The home index over all posts, at `index.html`, `index-2.html`, ...
//! 3. One page set per label, at `{labels_subdir}/{token}-1.html`, ...
//!
//! Rendering is pure; nothing reaches the sink until every page has been
//! rendered, so a failed build leaves no half-written site behind.

use crate::config::{Config, SiteConfig};
use crate::label::LabelIndex;
use crate::paginate::{self, FirstPage, PageLinks, PageNames};
use crate::post::{Post, PostId};
use crate::related;
use crate::sanitize::{snippet, unwrap_links};
use crate::slug::slugify;
use crate::source::{self, Error as SourceError};
use crate::template::{self, render, Context, Error as TemplateError, Templates};
use crate::thumbnail::extract_thumbnail;
use crate::write::{DirSink, Error as WriteError, Sink};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Shown on detail pages when no other post is eligible as a related post.
pub const NO_RELATED_POSTS: &str = "<p>No related posts found.</p>";

/// Builds the site described by `config`: loads the templates, fetches every
/// post, renders all pages, and only then writes them under the output root.
/// Returns the number of pages written.
pub fn build_site(config: &Config) -> Result<usize> {
    let templates = Templates::load(&config.theme_directory)?;
    let posts = source::from_config(&config.source)?.fetch()?;

    let site = SiteBuilder::new(&config.site, &templates).build(&posts)?;

    let mut sink = DirSink::new(&config.site.output_root);
    if config.clean {
        sink.clean(Path::new(&config.site.posts_subdir))?;
        sink.clean(Path::new(&config.site.labels_subdir))?;
    }
    site.emit(&mut sink)?;
    info!(
        "wrote {} pages for {} posts to {}",
        site.pages.len(),
        posts.len(),
        sink.root().display()
    );
    Ok(site.pages.len())
}

/// Fetches the post collection without building anything. Sources that keep
/// a snapshot (see [`crate::source::WordpressSource`]) save it as a side
/// effect. Returns the number of posts fetched.
pub fn fetch_posts(config: &Config) -> Result<usize> {
    Ok(source::from_config(&config.source)?.fetch()?.len())
}

/// A rendered output file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedPage {
    /// The file's path relative to the output root.
    pub path: PathBuf,
    pub content: String,
}

/// Every page of a build, in emission order: post pages, then home index
/// pages, then label pages.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Site {
    pub pages: Vec<RenderedPage>,
}

impl Site {
    /// Hands every page to `sink`. Pages that share a path (see
    /// [`LabelIndex::token_collisions`]) are written in order, so the last one
    /// wins.
    pub fn emit<S: Sink + ?Sized>(&self, sink: &mut S) -> std::result::Result<(), WriteError> {
        for page in &self.pages {
            sink.write(&page.path, &page.content)?;
        }
        Ok(())
    }

    pub fn get(&self, path: impl AsRef<Path>) -> Option<&str> {
        let path = path.as_ref();
        self.pages
            .iter()
            .rev()
            .find(|page| page.path == path)
            .map(|page| page.content.as_str())
    }
}

/// Renders a post collection into a [`Site`].
pub struct SiteBuilder<'a> {
    config: &'a SiteConfig,
    templates: &'a Templates,
}

impl<'a> SiteBuilder<'a> {
    pub fn new(config: &'a SiteConfig, templates: &'a Templates) -> SiteBuilder<'a> {
        SiteBuilder { config, templates }
    }

    /// Renders every page for `posts`. Related posts are sampled from a
    /// generator seeded with [`SiteConfig::related_seed`] when it is set, and
    /// from OS entropy otherwise.
    pub fn build(&self, posts: &[Post]) -> Result<Site> {
        let mut rng = match self.config.related_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        self.build_with_rng(posts, &mut rng)
    }

    /// Like [`SiteBuilder::build`], sampling related posts from `rng`.
    pub fn build_with_rng<R: Rng + ?Sized>(&self, posts: &[Post], rng: &mut R) -> Result<Site> {
        check_unique_ids(posts)?;

        let index = LabelIndex::build(posts);
        for names in index.token_collisions() {
            warn!(
                "labels {:?} share the same page file names; the last one listed wins",
                names
            );
        }

        let mut renderer = Renderer {
            config: self.config,
            templates: self.templates,
            stems: assign_stems(posts),
            cards: HashMap::new(),
        };
        let mut site = Site::default();

        for post in posts {
            let related = related::select(post, posts, self.config.related_count, rng);
            site.pages.push(renderer.post_page(post, &related));
        }

        let home = PageNames::new("index", FirstPage::Bare);
        if posts.is_empty() {
            site.pages.push(renderer.list_page(&home, &[], 1, 0, None));
        } else {
            let refs: Vec<&Post> = posts.iter().collect();
            for page in paginate::pages(&refs, self.config.page_size) {
                site.pages
                    .push(renderer.list_page(&home, page.items, page.number, page.total, None));
            }
        }

        for bucket in index.iter() {
            let names = renderer.label_pages(&bucket.token);
            for page in paginate::pages(&bucket.posts, self.config.page_size) {
                site.pages.push(renderer.list_page(
                    &names,
                    page.items,
                    page.number,
                    page.total,
                    Some(bucket.name),
                ));
            }
        }

        info!(
            "rendered {} pages ({} posts, {} labels)",
            site.pages.len(),
            posts.len(),
            index.len()
        );
        Ok(site)
    }
}

fn check_unique_ids(posts: &[Post]) -> Result<()> {
    let mut seen: HashSet<&PostId> = HashSet::with_capacity(posts.len());
    for post in posts {
        if !seen.insert(&post.id) {
            return Err(Error::DuplicatePostId(post.id.clone()));
        }
    }
    Ok(())
}

/// Chooses the detail-page file stem of every post: the slugified `slug`, or
/// the slugified title when there is no slug. An empty stem becomes
/// `post-{id}`, and a stem already taken by an earlier post gets `-{id}`
/// appended (then `-2`, `-3`, ... should that be taken too).
fn assign_stems(posts: &[Post]) -> HashMap<PostId, String> {
    let mut taken: HashSet<String> = HashSet::with_capacity(posts.len());
    let mut stems = HashMap::with_capacity(posts.len());
    for post in posts {
        let id_token = slugify(post.id.as_str());
        let mut stem = slugify(post.slug.as_deref().unwrap_or(&post.title));
        if stem.is_empty() {
            stem = format!("post-{}", id_token);
        }
        if taken.contains(&stem) {
            let base = format!("{}-{}", stem, id_token);
            let mut candidate = base.clone();
            let mut n = 2;
            while taken.contains(&candidate) {
                candidate = format!("{}-{}", base, n);
                n += 1;
            }
            warn!(
                "post `{}` would overwrite the page of an earlier post named `{}`; using `{}`",
                post.id, stem, candidate
            );
            stem = candidate;
        }
        taken.insert(stem.clone());
        stems.insert(post.id.clone(), stem);
    }
    stems
}

/// Holds everything needed to render pages for one build, including the
/// cache of rendered post cards.
struct Renderer<'a> {
    config: &'a SiteConfig,
    templates: &'a Templates,

    /// Detail-page file stems, by post id.
    stems: HashMap<PostId, String>,

    /// Cards that show the post's own first label, by post id. A post is
    /// listed on several pages, but its card is rendered once.
    cards: HashMap<PostId, String>,
}

impl Renderer<'_> {
    fn post_path(&self, post: &Post) -> String {
        let stem = self
            .stems
            .get(&post.id)
            .map(String::as_str)
            .unwrap_or_default();
        format!("{}/{}.html", self.config.posts_subdir, stem)
    }

    fn post_url(&self, post: &Post) -> String {
        format!("{}{}", self.config.site_root, self.post_path(post))
    }

    fn label_pages(&self, token: &str) -> PageNames {
        PageNames::new(
            format!("{}/{}", self.config.labels_subdir, token),
            FirstPage::Numbered,
        )
    }

    /// The link to the first page of the label called `name`.
    fn label_url(&self, name: &str) -> String {
        format!(
            "{}{}",
            self.config.site_root,
            self.label_pages(&slugify(name)).file_name(1)
        )
    }

    fn chip(&self, name: &str) -> String {
        format!(
            r#"<span class="category"><a href="{}">{}</a></span>"#,
            self.label_url(name),
            name
        )
    }

    fn render_card(&self, post: &Post, label: Option<&str>) -> String {
        let url = self.post_url(post);
        format!(
            r#"
<div class="post-card">
    <img class="post-image" src="{thumbnail}" alt="{title}">
    <div class="post-content">
        <div class="post-meta">{chip}</div>
        <h2 class="post-title"><a href="{url}">{title}</a></h2>
        <p class="post-snippet">{snippet}</p>
        <p class="post-author">By {author} · <a href="{url}">{read_more}</a></p>
    </div>
</div>
"#,
            thumbnail = extract_thumbnail(post, &self.config.no_thumbnail),
            title = post.title,
            chip = label.map(|name| self.chip(name)).unwrap_or_default(),
            url = url,
            snippet = snippet(post.summary_source(), self.config.snippet_length),
            author = self.config.author,
            read_more = self.config.read_more,
        )
    }

    /// Returns the card showing the post's first label (if that label has a
    /// name), rendering it on first use.
    fn card(&mut self, post: &Post) -> &str {
        if !self.cards.contains_key(&post.id) {
            let card = self.render_card(post, post.labels().first_name());
            self.cards.insert(post.id.clone(), card);
        }
        &self.cards[&post.id]
    }

    fn related_html(&mut self, related: &[&Post]) -> String {
        if related.is_empty() {
            return NO_RELATED_POSTS.to_owned();
        }
        let mut html = String::from(r#"<main class="container"><div class="post-list">"#);
        for post in related {
            html.push_str(self.card(post));
        }
        html.push_str("</div></main>");
        html
    }

    fn labels_html(&self, post: &Post) -> String {
        post.labels()
            .names()
            .map(|name| format!(r#"<span><a href="{}">{}</a></span> "#, self.label_url(name), name))
            .collect()
    }

    fn post_page(&mut self, post: &Post, related: &[&Post]) -> RenderedPage {
        let mut context = Context::new();
        context.insert("title", post.title.clone());
        context.insert("content", unwrap_links(&post.content));
        context.insert("labels", self.labels_html(post));
        context.insert("related", self.related_html(related));
        context.insert("site_root", self.config.site_root.clone());

        let path = self.post_path(post);
        debug!("rendering {}", path);
        RenderedPage {
            path: PathBuf::from(path),
            content: render(self.templates.get(template::Kind::Post), &context),
        }
    }

    /// Renders page `number` of `total` of a post listing. Home pages pass no
    /// `label`, and their cards show each post's first label; label pages
    /// show the listed label on every card.
    fn list_page(
        &mut self,
        names: &PageNames,
        posts: &[&Post],
        number: usize,
        total: usize,
        label: Option<&str>,
    ) -> RenderedPage {
        let mut items = String::from(r#"<div class="post-list">"#);
        for post in posts {
            match label {
                None => items.push_str(self.card(post)),
                Some(name) => items.push_str(&self.render_card(post, Some(name))),
            }
        }
        items.push_str("</div>");

        let links: PageLinks = names.links(&self.config.site_root, number, total);
        let mut context = Context::new();
        context.insert("items", items);
        context.insert("pagination", links.to_html());
        context.insert("page", number.to_string());
        context.insert("total_pages", total.to_string());
        context.insert("site_root", self.config.site_root.clone());
        let template = match label {
            None => self.templates.get(template::Kind::Index),
            Some(name) => {
                context.insert("label", name.to_owned());
                self.templates.get(template::Kind::Label)
            }
        };

        let path = names.file_name(number);
        debug!("rendering {}", path);
        RenderedPage {
            path: PathBuf::from(path),
            content: render(template, &context),
        }
    }
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can come from loading
/// templates, fetching posts, validating the collection, and writing pages.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors loading template files.
    Template(TemplateError),

    /// Returned when the content source fails. Nothing has been written when
    /// this is returned.
    Source(SourceError),

    /// Returned when two posts in the collection share an id.
    DuplicatePostId(PostId),

    /// Returned for errors writing pages.
    Write(WriteError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::Source(err) => write!(f, "Fetching posts: {}", err),
            Error::DuplicatePostId(id) => {
                write!(f, "More than one post has the id `{}`", id)
            }
            Error::Write(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(err) => Some(err),
            Error::Source(err) => Some(err),
            Error::DuplicatePostId(_) => None,
            Error::Write(err) => Some(err),
        }
    }
}

impl From<TemplateError> for Error {
    /// Converts [`TemplateError`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: TemplateError) -> Error {
        Error::Template(err)
    }
}

impl From<SourceError> for Error {
    /// Converts [`SourceError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: SourceError) -> Error {
        Error::Source(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}
