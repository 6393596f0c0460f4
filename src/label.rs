//! Groups [`Post`]s by label name. See [`LabelIndex`].

use crate::post::Post;
use crate::slug::slugify;
use std::collections::HashMap;
use tracing::warn;

/// The posts filed under one label, in collection order.
#[derive(Debug)]
pub struct Bucket<'a> {
    /// The label's display name.
    pub name: &'a str,

    /// The sanitized file name token for the label's pages.
    pub token: String,

    pub posts: Vec<&'a Post>,
}

/// Maps each label name to the posts carrying it. Buckets are kept in the
/// order their label was first encountered, and each bucket keeps the input
/// collection's relative post order.
///
/// Each post contributes through [`Post::labels`] only, so a post with
/// categories is never indexed under its tags. Posts without any named label
/// appear in no bucket.
#[derive(Debug, Default)]
pub struct LabelIndex<'a> {
    buckets: Vec<Bucket<'a>>,
    positions: HashMap<&'a str, usize>,
}

impl<'a> LabelIndex<'a> {
    /// Indexes `posts`. Label entries without a name are skipped.
    pub fn build(posts: &'a [Post]) -> LabelIndex<'a> {
        let mut index = LabelIndex::default();
        for post in posts {
            let unnamed = post.labels().iter().filter(|l| l.name().is_none()).count();
            if unnamed > 0 {
                warn!("post `{}` has {} label(s) without a name; skipping them", post.id, unnamed);
            }
            for name in post.labels().names() {
                match index.positions.get(name) {
                    Some(&i) => {
                        let bucket = &mut index.buckets[i];
                        // A post that lists the same label twice is filed once.
                        if !bucket.posts.last().map_or(false, |last| std::ptr::eq(*last, post)) {
                            bucket.posts.push(post);
                        }
                    }
                    None => {
                        index.positions.insert(name, index.buckets.len());
                        index.buckets.push(Bucket {
                            name,
                            token: slugify(name),
                            posts: vec![post],
                        });
                    }
                }
            }
        }
        index
    }

    /// Returns the posts filed under `name`, if any.
    pub fn get(&self, name: &str) -> Option<&[&'a Post]> {
        self.positions
            .get(name)
            .map(|&i| self.buckets[i].posts.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bucket<'a>> {
        self.buckets.iter()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Returns groups of label names whose tokens are identical, e.g.
    /// `["Rust", "rust!"]`. Such labels share page file names; the index does
    /// not merge them.
    pub fn token_collisions(&self) -> Vec<Vec<&'a str>> {
        let mut by_token: HashMap<&str, Vec<&'a str>> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for bucket in &self.buckets {
            let names = by_token.entry(&bucket.token).or_insert_with(|| {
                order.push(&bucket.token);
                Vec::new()
            });
            names.push(bucket.name);
        }
        order
            .into_iter()
            .filter_map(|token| by_token.remove(token))
            .filter(|names| names.len() > 1)
            .collect()
    }
}
