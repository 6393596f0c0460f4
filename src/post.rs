//! Defines the [`Post`] record and its label sets ([`Labels`], [`Label`]).
//! Posts arrive from a [`crate::source::ContentSource`] and are read-only for
//! the rest of a build.
//!
//! The shapes accepted here follow the WordPress.com REST API: the `ID` may be
//! a number or a string, and `categories`/`tags` are JSON objects mapping a
//! label key to a record carrying the label's `name`. Key order in those
//! objects is preserved because the first entry decides which label chip a
//! post card shows.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use std::fmt;

/// Identifies a [`Post`]. Numeric ids are kept in their decimal text form so
/// that `7` and `"7"` name the same post.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PostId(String);

impl PostId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for PostId {
    fn from(s: &str) -> PostId {
        PostId(s.to_owned())
    }
}

impl From<String> for PostId {
    fn from(s: String) -> PostId {
        PostId(s)
    }
}

impl From<u64> for PostId {
    fn from(n: u64) -> PostId {
        PostId(n.to_string())
    }
}

impl<'de> Deserialize<'de> for PostId {
    /// Accepts either a JSON string or an integer.
    fn deserialize<D>(deserializer: D) -> Result<PostId, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Signed(i64),
            Text(String),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(n) => PostId(n.to_string()),
            Raw::Signed(n) => PostId(n.to_string()),
            Raw::Text(s) => PostId(s),
        })
    }
}

/// A single category or tag entry. The `name` is optional because upstream
/// records occasionally omit it; unnamed entries are skipped wherever labels
/// are rendered or indexed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Label {
    /// The key the label was filed under in the source record.
    pub key: String,

    /// The label's display name.
    pub name: Option<String>,
}

impl Label {
    /// Creates a label whose key and display name are both `name`.
    pub fn named(name: &str) -> Label {
        Label {
            key: name.to_owned(),
            name: Some(name.to_owned()),
        }
    }

    /// Returns the display name, treating an empty name as missing.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }
}

/// An ordered set of [`Label`]s, in the order they appeared in the source.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Labels(Vec<Label>);

impl Labels {
    pub fn new(labels: Vec<Label>) -> Labels {
        Labels(labels)
    }

    /// Builds a label set from display names; each name doubles as its key.
    pub fn from_names<I, S>(names: I) -> Labels
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Labels(names.into_iter().map(|n| Label::named(n.as_ref())).collect())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.0.iter()
    }

    /// Iterates over the display names of the labels that have one.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().filter_map(Label::name)
    }

    /// Returns the name of the first entry. If the first entry has no name,
    /// the result is `None` even when later entries are named.
    pub fn first_name(&self) -> Option<&str> {
        self.0.first().and_then(Label::name)
    }
}

impl<'de> Deserialize<'de> for Labels {
    /// Accepts `null`, an object `{key: {name}}` (WordPress), or a list of
    /// names / `{name}` records.
    fn deserialize<D>(deserializer: D) -> Result<Labels, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Record {
            #[serde(default)]
            name: Option<String>,
        }

        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Item {
            Name(String),
            Record(Record),
        }

        struct LabelsVisitor;

        impl<'de> Visitor<'de> for LabelsVisitor {
            type Value = Labels;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of label records or a list of label names")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Labels, E> {
                Ok(Labels::default())
            }

            fn visit_none<E: de::Error>(self) -> Result<Labels, E> {
                Ok(Labels::default())
            }

            fn visit_some<D>(self, deserializer: D) -> Result<Labels, D::Error>
            where
                D: Deserializer<'de>,
            {
                deserializer.deserialize_any(LabelsVisitor)
            }

            fn visit_map<A>(self, mut map: A) -> Result<Labels, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut labels = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, record)) = map.next_entry::<String, Option<Record>>()? {
                    labels.push(Label {
                        key,
                        name: record.and_then(|r| r.name),
                    });
                }
                Ok(Labels(labels))
            }

            fn visit_seq<A>(self, mut seq: A) -> Result<Labels, A::Error>
            where
                A: SeqAccess<'de>,
            {
                let mut labels = Vec::with_capacity(seq.size_hint().unwrap_or(0));
                while let Some(item) = seq.next_element::<Item>()? {
                    labels.push(match item {
                        Item::Name(name) => Label::named(&name),
                        Item::Record(record) => Label {
                            key: record.name.clone().unwrap_or_default(),
                            name: record.name,
                        },
                    });
                }
                Ok(Labels(labels))
            }
        }

        deserializer.deserialize_any(LabelsVisitor)
    }
}

/// Deserializes an optional string, mapping `null` and blank strings to
/// `None`. WordPress sends `""` for a missing featured image.
fn non_blank<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.filter(|s| !s.trim().is_empty()))
}

/// Deserializes a string that may be `null`.
fn nullable<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// A single article.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Unique across the collection being built.
    #[serde(alias = "ID")]
    pub id: PostId,

    #[serde(default, deserialize_with = "nullable")]
    pub title: String,

    /// The URL token suggested by the source. When absent, the detail-page
    /// file name is derived from the title.
    #[serde(default, deserialize_with = "non_blank")]
    pub slug: Option<String>,

    /// The raw markup of the post body.
    #[serde(default, deserialize_with = "nullable")]
    pub content: String,

    /// A precomputed summary, used for card snippets when present.
    #[serde(default, deserialize_with = "non_blank")]
    pub excerpt: Option<String>,

    #[serde(
        default,
        alias = "featuredImage",
        deserialize_with = "non_blank"
    )]
    pub featured_image: Option<String>,

    #[serde(default)]
    pub categories: Labels,

    #[serde(default)]
    pub tags: Labels,

    /// Publication date as ISO-8601 text.
    #[serde(default, deserialize_with = "non_blank")]
    pub date: Option<String>,
}

impl Post {
    /// Returns the label set this post is filed under: its categories when it
    /// has any, otherwise its tags. A post never contributes to both sets.
    pub fn labels(&self) -> &Labels {
        if self.categories.is_empty() {
            &self.tags
        } else {
            &self.categories
        }
    }

    /// Returns the markup that card snippets are cut from.
    pub fn summary_source(&self) -> &str {
        self.excerpt.as_deref().unwrap_or(&self.content)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_deserialize_wordpress_post() -> serde_json::Result<()> {
        let post: Post = serde_json::from_str(
            r#"{
                "ID": 42,
                "title": "Hello",
                "content": "<p>Body</p>",
                "excerpt": "",
                "featured_image": "",
                "URL": "https://example.wordpress.com/hello",
                "categories": {
                    "zeta": {"ID": 3, "name": "Zeta"},
                    "alpha": {"ID": 1, "name": "Alpha"},
                    "nameless": {"ID": 2}
                },
                "tags": {}
            }"#,
        )?;

        assert_eq!(PostId::from(42), post.id);
        assert_eq!(None, post.excerpt);
        assert_eq!(None, post.featured_image);
        assert_eq!(
            vec!["zeta", "alpha", "nameless"],
            post.categories.iter().map(|l| l.key.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(vec!["Zeta", "Alpha"], post.categories.names().collect::<Vec<_>>());
        assert_eq!(Some("Zeta"), post.labels().first_name());
        Ok(())
    }

    #[test]
    fn test_deserialize_string_id_and_label_list() -> serde_json::Result<()> {
        let post: Post = serde_json::from_str(
            r#"{"id": "abc", "featuredImage": "a.png", "tags": ["x", {"name": "y"}], "categories": null}"#,
        )?;
        assert_eq!(PostId::from("abc"), post.id);
        assert_eq!(Some("a.png".to_owned()), post.featured_image);
        assert!(post.categories.is_empty());
        assert_eq!(vec!["x", "y"], post.labels().names().collect::<Vec<_>>());
        Ok(())
    }

    #[test]
    fn test_labels_prefers_categories() {
        let post = Post {
            categories: Labels::from_names(["News"]),
            tags: Labels::from_names(["Ignored"]),
            ..Post::default()
        };
        assert_eq!(vec!["News"], post.labels().names().collect::<Vec<_>>());
    }

    #[test]
    fn test_first_name_does_not_skip_unnamed_entry() {
        let labels = Labels::new(vec![
            Label {
                key: "a".to_owned(),
                name: None,
            },
            Label::named("B"),
        ]);
        assert_eq!(None, labels.first_name());
        assert_eq!(vec!["B"], labels.names().collect::<Vec<_>>());
    }
}
