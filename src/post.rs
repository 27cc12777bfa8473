//! Defines the [`Post`] type and the selection helpers built over a parsed
//! post list: related posts for the detail sidebar and the popular-posts
//! block. See [`Post::to_value`] and [`Post::summarize`] for how posts are
//! converted into template values.

use std::path::PathBuf;

use gtmpl::Value;
use url::Url;

use crate::category::Category;
use crate::format;
use crate::markdown::Heading;
use crate::value;

/// A parsed blog post. The slug is unique across the whole post list and is
/// the key for page file names, related-post exclusion, and prev/next
/// navigation.
#[derive(Clone, Debug)]
pub struct Post {
    pub slug: String,
    pub title: String,

    /// `YYYY-MM-DD`. Kept as a string; lexicographic order is date order and
    /// the long display form is produced at render time.
    pub date: String,

    pub category: Category,

    /// Cover/card image path, relative to the static URL.
    pub image: String,

    /// Card teaser text, also the feed summary.
    pub excerpt: String,

    /// Estimated read time in minutes.
    pub read_time: u32,

    pub views: u64,

    /// Whether the post may appear in the popular-posts sidebar block.
    pub popular: bool,

    /// Freeform tags rendered as inert `#tag` links on the post page.
    pub tags: Vec<String>,

    /// The rendered HTML body.
    pub body: String,

    /// Table of contents collected while rendering the body.
    pub toc: Vec<Heading>,

    /// The post page's URL.
    pub url: Url,

    /// The target location on disk for the post page.
    pub file_path: PathBuf,
}

impl Post {
    /// Converts a [`Post`] into the main item [`Value`] for the post
    /// template: the full body plus formatted metadata, tags, and the table
    /// of contents.
    pub fn to_value(&self) -> Value {
        value::object(vec![
            ("slug", Value::String(self.slug.clone())),
            ("title", Value::String(self.title.clone())),
            ("date", Value::String(format::date(&self.date))),
            ("category", Value::from(&self.category)),
            ("image", Value::String(self.image.clone())),
            ("read_time", Value::from(self.read_time as u64)),
            ("views", Value::String(format::views(self.views))),
            (
                "tags",
                Value::Array(
                    self.tags
                        .iter()
                        .map(|t| Value::String(t.clone()))
                        .collect(),
                ),
            ),
            ("body", Value::String(self.body.clone())),
            (
                "toc",
                Value::Array(
                    self.toc
                        .iter()
                        .map(|h| {
                            value::object(vec![
                                ("id", Value::String(h.id.clone())),
                                ("title", Value::String(h.title.clone())),
                                ("sub", Value::from(h.sub)),
                            ])
                        })
                        .collect(),
                ),
            ),
            ("url", value::url(&self.url)),
        ])
    }

    /// Converts a [`Post`] into the card [`Value`] used on index pages and in
    /// the sidebar blocks.
    pub fn summarize(&self) -> Value {
        value::object(vec![
            ("slug", Value::String(self.slug.clone())),
            ("title", Value::String(self.title.clone())),
            ("date", Value::String(format::date(&self.date))),
            ("category", Value::from(&self.category)),
            ("image", Value::String(self.image.clone())),
            ("excerpt", Value::String(self.excerpt.clone())),
            ("read_time", Value::from(self.read_time as u64)),
            ("views", Value::String(format::views(self.views))),
            ("url", value::url(&self.url)),
        ])
    }
}

/// Selects the related posts shown under a post: same category, the post
/// itself excluded, date order preserved, truncated to `limit`.
pub fn related<'a>(
    posts: &'a [Post],
    slug: &str,
    category: Category,
    limit: usize,
) -> Vec<&'a Post> {
    posts
        .iter()
        .filter(|p| p.slug != slug && p.category == category)
        .take(limit)
        .collect()
}

/// Selects the popular-posts block: posts flagged popular, sorted by view
/// count descending, truncated to `limit`.
pub fn popular(posts: &[Post], limit: usize) -> Vec<&Post> {
    let mut popular: Vec<&Post> = posts.iter().filter(|p| p.popular).collect();
    popular.sort_by(|a, b| b.views.cmp(&a.views));
    popular.truncate(limit);
    popular
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture(slug: &str, category: Category, date: &str, views: u64, popular: bool) -> Post {
        Post {
            slug: slug.to_owned(),
            title: slug.to_owned(),
            date: date.to_owned(),
            category,
            image: format!("images/{}.jpg", slug),
            excerpt: String::from("..."),
            read_time: 5,
            views,
            popular,
            tags: Vec::new(),
            body: String::new(),
            toc: Vec::new(),
            url: Url::parse("https://example.org/posts/")
                .unwrap()
                .join(&format!("{}.html", slug))
                .unwrap(),
            file_path: PathBuf::from(format!("/tmp/posts/{}.html", slug)),
        }
    }

    fn posts() -> Vec<Post> {
        vec![
            fixture("kazbek", Category::Nature, "2026-01-09", 2150, true),
            fixture("ananuri", Category::Culture, "2026-01-08", 1680, true),
            fixture("vardzia", Category::Culture, "2026-01-03", 4100, true),
            fixture("tamada-story", Category::Culture, "2026-01-02", 3890, false),
            fixture("mtskheta", Category::Culture, "2026-01-01", 2650, false),
            fixture("borjomi", Category::Nature, "2025-12-30", 2340, false),
        ]
    }

    #[test]
    fn test_related_same_category_excluding_self() {
        let posts = posts();
        let related = related(&posts, "ananuri", Category::Culture, 3);
        let slugs: Vec<&str> = related.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(vec!["vardzia", "tamada-story", "mtskheta"], slugs);
    }

    #[test]
    fn test_related_respects_limit() {
        let posts = posts();
        assert_eq!(1, related(&posts, "ananuri", Category::Culture, 1).len());
    }

    #[test]
    fn test_related_empty_when_category_has_only_self() {
        let posts = posts();
        assert!(related(&posts, "kazbek", Category::Cities, 3).is_empty());
    }

    #[test]
    fn test_popular_sorted_by_views() {
        let posts = posts();
        let popular = popular(&posts, 3);
        let slugs: Vec<&str> = popular.iter().map(|p| p.slug.as_str()).collect();
        // tamada-story has more views than ananuri but isn't flagged popular
        assert_eq!(vec!["vardzia", "kazbek", "ananuri"], slugs);
    }

    #[test]
    fn test_summarize_formats_metadata() {
        let post = fixture("kazbek", Category::Nature, "2026-01-09", 2150, true);
        match post.summarize() {
            Value::Object(fields) => {
                assert_eq!(&Value::String(String::from("2.1k")), &fields["views"]);
                assert_eq!(
                    &Value::String(String::from("January 9, 2026")),
                    &fields["date"],
                );
            }
            other => panic!("expected object, got {:?}", other),
        }
    }
}
