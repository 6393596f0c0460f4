//! Splits ordered sequences of posts into fixed-size pages and computes the
//! file names and previous/next links for each page. Page numbers are
//! 1-based throughout.

/// Returns the number of pages needed for `total_items` items at `page_size`
/// items per page. Zero items need zero pages.
///
/// # Panics
///
/// Panics if `page_size` is zero; configuration loading rejects that value.
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    match total_items % page_size {
        0 => total_items / page_size,
        _ => total_items / page_size + 1,
    }
}

/// Returns the items on page `page_number`. Requests for page 0 or for pages
/// past the end yield an empty slice.
pub fn slice<T>(items: &[T], page_number: usize, page_size: usize) -> &[T] {
    match page_number.checked_sub(1) {
        None => &[],
        Some(i) => items.chunks(page_size).nth(i).unwrap_or(&[]),
    }
}

/// How the first page of a sequence is named.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FirstPage {
    /// Page 1 is `{base}.html` (e.g., `index.html`).
    Bare,

    /// Page 1 is `{base}-1.html`, like every other page.
    Numbered,
}

/// Names the files of a paginated sequence. Page `n > 1` is always
/// `{base}-{n}.html`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageNames {
    /// The path of the sequence relative to the output root, without the page
    /// suffix or extension (e.g., `index` or `labels/rust`).
    pub base: String,

    pub first_page: FirstPage,
}

impl PageNames {
    pub fn new(base: impl Into<String>, first_page: FirstPage) -> PageNames {
        PageNames {
            base: base.into(),
            first_page,
        }
    }

    /// Returns the relative file path for page `page_number`.
    pub fn file_name(&self, page_number: usize) -> String {
        match (page_number, self.first_page) {
            (1, FirstPage::Bare) => format!("{}.html", self.base),
            _ => format!("{}-{}.html", self.base, page_number),
        }
    }

    /// Returns the previous/next links for page `page_number` of `total_pages`.
    /// Each link is `site_root` followed by the target page's file name.
    pub fn links(&self, site_root: &str, page_number: usize, total_pages: usize) -> PageLinks {
        PageLinks {
            prev: match page_number > 1 {
                false => None,
                true => Some(format!("{}{}", site_root, self.file_name(page_number - 1))),
            },
            next: match page_number < total_pages {
                false => None,
                true => Some(format!("{}{}", site_root, self.file_name(page_number + 1))),
            },
        }
    }
}

/// The navigation links of a single page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PageLinks {
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PageLinks {
    /// Renders the links as the pagination block placed into index and label
    /// templates. The container is emitted even when both links are absent.
    pub fn to_html(&self) -> String {
        let mut html = String::from(r#"<div class="pagination-container">"#);
        if let Some(prev) = &self.prev {
            html.push_str(&format!(
                r#"<span class="pagination-link older-posts"><a href="{}">Previous Posts</a></span>"#,
                prev
            ));
        }
        if let Some(next) = &self.next {
            html.push_str(&format!(
                r#"<span class="pagination-link load-more"><a href="{}">Load More</a></span>"#,
                next
            ));
        }
        html.push_str(r#"<span style="clear:both;"></span></div>"#);
        html
    }
}

/// A window of a larger ordered sequence.
#[derive(Debug)]
pub struct Page<'a, T> {
    pub items: &'a [T],

    /// 1-based.
    pub number: usize,

    /// The number of pages in the containing sequence.
    pub total: usize,
}

/// Splits `items` into pages of `page_size`, in order.
pub fn pages<T>(items: &[T], page_size: usize) -> impl Iterator<Item = Page<'_, T>> {
    let total = page_count(items.len(), page_size);
    items
        .chunks(page_size)
        .enumerate()
        .map(move |(i, chunk)| Page {
            items: chunk,
            number: i + 1,
            total,
        })
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_page_count() {
        assert_eq!(0, page_count(0, 10));
        assert_eq!(1, page_count(1, 10));
        assert_eq!(1, page_count(10, 10));
        assert_eq!(2, page_count(11, 10));
        assert_eq!(2, page_count(12, 10));
        for n in 0..50 {
            for k in 1..7 {
                assert_eq!((n + k - 1) / k, page_count(n, k), "n={} k={}", n, k);
            }
        }
    }

    #[test]
    fn test_slice() {
        let items: Vec<usize> = (1..=12).collect();
        assert_eq!(&items[..10], slice(&items, 1, 10));
        assert_eq!(&[11, 12], slice(&items, 2, 10));
        assert!(slice(&items, 0, 10).is_empty());
        assert!(slice(&items, 3, 10).is_empty());
    }

    #[test]
    fn test_pages_concatenate_to_input() {
        for n in 0..30 {
            let items: Vec<usize> = (0..n).collect();
            for k in 1..8 {
                let pages: Vec<_> = pages(&items, k).collect();
                assert_eq!(page_count(n, k), pages.len());
                let joined: Vec<usize> = pages.iter().flat_map(|p| p.items.iter().copied()).collect();
                assert_eq!(items, joined);
                for (i, page) in pages.iter().enumerate() {
                    assert_eq!(i + 1, page.number);
                    assert_eq!(slice(&items, page.number, k), page.items);
                }
            }
        }
    }

    #[test]
    fn test_file_names() {
        let index = PageNames::new("index", FirstPage::Bare);
        assert_eq!("index.html", index.file_name(1));
        assert_eq!("index-2.html", index.file_name(2));

        let label = PageNames::new("labels/rust", FirstPage::Numbered);
        assert_eq!("labels/rust-1.html", label.file_name(1));
        assert_eq!("labels/rust-3.html", label.file_name(3));
    }

    #[test]
    fn test_links_first_middle_last() {
        let index = PageNames::new("index", FirstPage::Bare);
        assert_eq!(
            PageLinks {
                prev: None,
                next: Some("/index-2.html".to_owned())
            },
            index.links("/", 1, 3)
        );
        assert_eq!(
            PageLinks {
                prev: Some("/index.html".to_owned()),
                next: Some("/index-3.html".to_owned())
            },
            index.links("/", 2, 3)
        );
        assert_eq!(
            PageLinks {
                prev: Some("/index-2.html".to_owned()),
                next: None
            },
            index.links("/", 3, 3)
        );
    }

    #[test]
    fn test_links_single_page() {
        let index = PageNames::new("index", FirstPage::Bare);
        assert_eq!(PageLinks::default(), index.links("/", 1, 1));
    }

    #[test]
    fn test_links_numbered_first_page() {
        let label = PageNames::new("labels/rust", FirstPage::Numbered);
        assert_eq!(
            Some("/labels/rust-1.html".to_owned()),
            label.links("/", 2, 2).prev
        );
    }

    #[test]
    fn test_to_html() {
        let links = PageLinks {
            prev: Some("/index.html".to_owned()),
            next: None,
        };
        let html = links.to_html();
        assert!(html.contains(r#"<a href="/index.html">Previous Posts</a>"#));
        assert!(!html.contains("Load More"));
    }
}
