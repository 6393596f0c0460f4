//! The library code for the `sitewright` static site generator. It turns a
//! flat collection of blog posts into a cross-linked, paginated HTML site. The
//! architecture breaks down into three steps:
//!
//! 1. Fetching the posts from a content source ([`crate::source`])
//! 2. Rendering every page from the posts ([`crate::build`])
//! 3. Writing the pages out through a sink ([`crate::write`])
//!
//! The second step is the involved one. It renders one detail page per post,
//! each with a random sample of related posts ([`crate::related`]), and two
//! kinds of listing pages: the home index over all posts and one index per
//! label ([`crate::label`]). Each listing is paginated on its own
//! ([`crate::paginate`]), and every page is produced by substituting generated
//! fragments into a page template ([`crate::template`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod config;
pub mod label;
pub mod paginate;
pub mod post;
pub mod related;
pub mod sanitize;
pub mod slug;
pub mod source;
pub mod template;
pub mod thumbnail;
pub mod write;
