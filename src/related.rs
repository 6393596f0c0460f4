//! Chooses the "related posts" listed on a post's detail page.
//!
//! The choice is a uniform random sample, not a relevance ranking: a rebuild
//! may list different related posts for the same page. The random source is a
//! parameter so that builds can be made reproducible by seeding it (see
//! [`crate::config::SiteConfig::related_seed`]).

use crate::post::Post;
use rand::seq::SliceRandom;
use rand::Rng;

/// The number of related posts listed when the configuration doesn't say.
pub const DEFAULT_RELATED_COUNT: usize = 5;

/// Samples up to `max_count` posts from `all_posts`, without replacement.
/// Candidates are every post other than `post` (compared by id) whose content
/// is non-empty. The order of the result carries no meaning.
pub fn select<'a, R>(post: &Post, all_posts: &'a [Post], max_count: usize, rng: &mut R) -> Vec<&'a Post>
where
    R: Rng + ?Sized,
{
    let eligible: Vec<&'a Post> = all_posts
        .iter()
        .filter(|p| p.id != post.id && !p.content.is_empty())
        .collect();
    let count = max_count.min(eligible.len());
    eligible.choose_multiple(rng, count).copied().collect()
}
