//! Picks the image that represents a [`Post`] on cards.

use crate::post::Post;
use regex::Regex;
use std::sync::LazyLock;

// The `src` attribute must be preceded by whitespace so that e.g. `data-src`
// is not mistaken for it.
static IMG_SRC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<img\b[^>]*?\ssrc\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+))"#).unwrap()
});

/// Returns the `src` of the first `<img>` element in `html` that has one, in
/// document order.
pub fn first_image(html: &str) -> Option<&str> {
    IMG_SRC.captures(html).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .or_else(|| caps.get(3))
            .map(|m| m.as_str())
    })
}

/// Returns the post's featured image if it has one, otherwise the first image
/// in its content, otherwise `fallback`.
pub fn extract_thumbnail<'a>(post: &'a Post, fallback: &'a str) -> &'a str {
    if let Some(featured) = &post.featured_image {
        return featured;
    }
    first_image(&post.content).unwrap_or(fallback)
}

#[cfg(test)]
mod test {
    use super::*;

    const FALLBACK: &str = "https://example.org/no-thumbnail.jpg";

    fn post(content: &str, featured_image: Option<&str>) -> Post {
        Post {
            content: content.to_owned(),
            featured_image: featured_image.map(str::to_owned),
            ..Post::default()
        }
    }

    #[test]
    fn test_featured_image_wins() {
        let p = post("<img src=\"content.jpg\">", Some("featured.jpg"));
        assert_eq!("featured.jpg", extract_thumbnail(&p, FALLBACK));
    }

    #[test]
    fn test_first_image_in_content() {
        let p = post("<p>intro <img src='x.jpg'> more</p>", None);
        assert_eq!("x.jpg", extract_thumbnail(&p, FALLBACK));
    }

    #[test]
    fn test_document_order_and_attribute_forms() {
        assert_eq!(
            Some("a.png"),
            first_image(r#"<IMG class="w" data-src="lazy.png" SRC=a.png><img src="b.png">"#)
        );
        assert_eq!(
            Some("b.png"),
            first_image(r#"<img alt="no source"><img src="b.png">"#)
        );
    }

    #[test]
    fn test_fallback_on_missing_or_malformed_markup() {
        assert_eq!(FALLBACK, extract_thumbnail(&post("<p>no images", None), FALLBACK));
        assert_eq!(FALLBACK, extract_thumbnail(&post("<img src=", None), FALLBACK));
    }
}
