//! Responsible for indexing, templating, and writing HTML pages to disk from
//! [`Post`] sources and fetched tour catalogs.

use std::collections::HashSet;
use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use gtmpl::{Template, Value};
use url::Url;

use crate::category::{self, Category};
use crate::post::{self, Post};
use crate::tours;
use crate::value;

/// How many related posts a post page shows.
const RELATED_LIMIT: usize = 3;

/// How many posts the popular-posts sidebar block shows.
const POPULAR_LIMIT: usize = 3;

/// Responsible for indexing, templating, and writing HTML pages to disk.
pub struct Writer<'a> {
    /// The template for post pages.
    pub posts_template: &'a Template,

    /// The template for index pages.
    pub index_template: &'a Template,

    /// The template for tour-catalog pages. The same template renders the
    /// catalog's empty state and, via the `error` field, the fetch-failure
    /// page.
    pub tours_template: &'a Template,

    /// The template for the not-found page.
    pub not_found_template: &'a Template,

    /// The site title, made available to every page.
    pub site_title: &'a str,

    /// The base URL for index pages. The main index pages will be located at
    /// `{index_base_url}/index.html`, `{index_base_url}/1.html`, etc. The
    /// category index pages will be located at
    /// `{index_base_url}/{category}/index.html`,
    /// `{index_base_url}/{category}/1.html`, etc. Must end in a trailing
    /// slash.
    pub index_base_url: &'a Url,

    /// The directory in which the index HTML files will be written, laid out
    /// like `index_base_url`.
    pub index_output_directory: &'a Path,

    /// The number of posts per index page.
    pub index_page_size: usize,

    /// The base URL for tour pages (trailing slash) and the directory they
    /// are written to.
    pub tours_url: &'a Url,
    pub tours_output_directory: &'a Path,

    /// The directory in which the not-found page is written.
    pub root_output_directory: &'a Path,

    /// The URL for the site's home page, typically the destination for the
    /// site-header link.
    pub home_page: &'a Url,

    /// The URL for the static assets, typically for the theme's stylesheet
    /// and images.
    pub static_url: &'a Url,

    /// The URL of the Atom feed.
    pub atom_url: &'a Url,

    /// The prebuilt hero block, or `None` when no slides are configured.
    pub hero: Option<Value>,
}

impl Writer<'_> {
    /// Takes a single [`Page`], templates it, and writes it to disk. Every
    /// page gets the site chrome fields (`title`, `home_page`, `static_url`,
    /// `atom_url`) on top of its own item.
    fn write_page(&self, page: &Page) -> Result<()> {
        let mut value = page.to_value();
        if let Value::Object(obj) = &mut value {
            obj.insert(
                "title".to_owned(),
                Value::String(self.site_title.to_owned()),
            );
            obj.insert(
                "home_page".to_owned(),
                Value::String(self.home_page.to_string()),
            );
            obj.insert(
                "static_url".to_owned(),
                Value::String(self.static_url.to_string()),
            );
            obj.insert(
                "atom_url".to_owned(),
                Value::String(self.atom_url.to_string()),
            );
        }
        page.template.execute(
            &mut std::fs::File::create(&page.file_path)?,
            &gtmpl::Context::from(value).unwrap(),
        )?;
        Ok(())
    }

    /// Takes a slice of [`Post`]s (sorted most recent first), indexes it by
    /// category, and writes post and index pages to disk.
    pub fn write_posts(&self, posts: &[Post]) -> Result<()> {
        let popular = Value::Array(
            post::popular(posts, POPULAR_LIMIT)
                .iter()
                .map(|p| p.summarize())
                .collect(),
        );

        let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
        for page in self
            .index_pages(posts, &popular)?
            .into_iter()
            .chain(self.post_pages(posts, &popular))
        {
            // there should always be a dir
            if let Some(dir) = page.file_path.parent() {
                if seen_dirs.insert(dir.to_owned()) {
                    std::fs::create_dir_all(dir)?;
                }
            }
            self.write_page(&page)?;
        }
        Ok(())
    }

    /// Creates all of the post [`Page`]s. Following the original reading
    /// order, "prev" points at the next-older post and "next" at the
    /// next-newer one.
    fn post_pages<'a>(&'a self, posts: &'a [Post], popular: &'a Value) -> Vec<Page<'a>> {
        posts
            .iter()
            .enumerate()
            .map(|(i, post)| {
                let mut item = post.to_value();
                if let Value::Object(obj) = &mut item {
                    obj.insert(
                        "related".to_owned(),
                        Value::Array(
                            post::related(posts, &post.slug, post.category, RELATED_LIMIT)
                                .iter()
                                .map(|p| p.summarize())
                                .collect(),
                        ),
                    );
                    obj.insert("popular".to_owned(), popular.clone());
                }
                Page {
                    item,
                    file_path: post.file_path.clone(),
                    prev: match posts.get(i + 1) {
                        Some(older) => Some(nav_ref(older)),
                        None => None,
                    },
                    next: match i {
                        0 => None,
                        i => posts.get(i - 1).map(nav_ref),
                    },
                    template: self.posts_template,
                }
            })
            .collect()
    }

    /// Creates all of the index [`Page`]s: the main index over all posts plus
    /// one index per category. Categories without posts still get a page so
    /// the filter row never links to a missing file.
    fn index_pages<'a>(&'a self, posts: &'a [Post], popular: &'a Value) -> Result<Vec<Page<'a>>> {
        let mut indices = vec![Index {
            category: None,
            url: self.index_base_url.clone(),
            output_directory: self.index_output_directory.to_owned(),
            posts: posts.iter().collect(),
        }];
        for category in category::ALL.iter() {
            indices.push(Index {
                category: Some(*category),
                url: self
                    .index_base_url
                    .join(&format!("{}/", category.name()))?,
                output_directory: self.index_output_directory.join(category.name()),
                posts: posts.iter().filter(|p| p.category == *category).collect(),
            });
        }

        let mut pages = Vec::new();
        for index in indices {
            pages.extend(self.index_to_pages(index, popular)?);
        }
        Ok(pages)
    }

    /// Converts one [`Index`] into its paginated [`Page`]s.
    fn index_to_pages<'a>(&'a self, index: Index<'a>, popular: &Value) -> Result<Vec<Page<'a>>> {
        let filters = self.filter_row(index.category)?;

        let total_pages = match index.posts.len() % self.index_page_size {
            0 => index.posts.len() / self.index_page_size,
            _ => index.posts.len() / self.index_page_size + 1,
        };

        // An empty index still yields its first page; the template renders
        // the empty-state block for it.
        if index.posts.is_empty() {
            return Ok(vec![Page {
                item: self.index_item(&index, &[], &filters, popular),
                file_path: index.output_directory.join("index.html"),
                prev: None,
                next: None,
                template: self.index_template,
            }]);
        }

        index
            .posts
            .chunks(self.index_page_size)
            .enumerate()
            .map(|(i, chunk)| {
                let file_name = match i > 0 {
                    false => String::from("index.html"),
                    true => format!("{}.html", i),
                };

                Ok(Page {
                    item: self.index_item(&index, chunk, &filters, popular),
                    file_path: index.output_directory.join(&file_name),
                    prev: match i {
                        0 => None,
                        1 => Some(page_ref(index.url.join("index.html")?)),
                        _ => Some(page_ref(index.url.join(&format!("{}.html", i - 1))?)),
                    },
                    next: match i < total_pages - 1 {
                        false => None,
                        true => Some(page_ref(index.url.join(&format!("{}.html", i + 1))?)),
                    },
                    template: self.index_template,
                })
            })
            .collect()
    }

    /// Builds the main item for one index page: the post cards plus the
    /// filter row, hero, and sidebar blocks.
    fn index_item(
        &self,
        index: &Index,
        chunk: &[&Post],
        filters: &Value,
        popular: &Value,
    ) -> Value {
        value::object(vec![
            (
                "posts",
                Value::Array(chunk.iter().map(|p| p.summarize()).collect()),
            ),
            (
                "category",
                value::opt(index.category.as_ref().map(Value::from)),
            ),
            ("categories", filters.clone()),
            ("popular", popular.clone()),
            ("hero", value::opt(self.hero.clone())),
        ])
    }

    /// Builds the category filter row for an index page, marking `active` the
    /// entry whose index is being rendered (or the "all posts" entry for the
    /// main index).
    fn filter_row(&self, active: Option<Category>) -> Result<Value> {
        let mut row = vec![value::object(vec![
            ("name", Value::String(String::from("all"))),
            ("label", Value::String(String::from("All posts"))),
            (
                "url",
                value::url(&self.index_base_url.join("index.html")?),
            ),
            ("active", Value::from(active.is_none())),
        ])];
        for category in category::ALL.iter() {
            row.push(value::object(vec![
                ("name", Value::String(category.name().to_owned())),
                ("label", Value::String(category.label().to_owned())),
                ("url", value::url(&category.index_url(self.index_base_url)?)),
                ("active", Value::from(active == Some(*category))),
            ]));
        }
        Ok(Value::Array(row))
    }

    /// Writes the fetched tour catalog: one page per envelope, named
    /// `index.html`, `2.html`, ... after the API's 1-indexed page numbers.
    pub fn write_tour_pages(&self, catalogs: &[tours::Catalog]) -> Result<()> {
        std::fs::create_dir_all(self.tours_output_directory)?;
        for (i, catalog) in catalogs.iter().enumerate() {
            let page = i as u64 + 1;
            let file_name = match page {
                1 => String::from("index.html"),
                page => format!("{}.html", page),
            };
            let mut item = tours::page_value(catalog, page, self.tours_url);
            if let Value::Object(obj) = &mut item {
                obj.insert("error".to_owned(), Value::Nil);
            }
            self.write_page(&Page {
                item,
                file_path: self.tours_output_directory.join(file_name),
                prev: None,
                next: None,
                template: self.tours_template,
            })?;
        }
        Ok(())
    }

    /// Writes the tour-catalog failure page: the terminal state after a fetch
    /// failure, a static message naming the expected local API server.
    pub fn write_tours_failure(&self) -> Result<()> {
        std::fs::create_dir_all(self.tours_output_directory)?;
        self.write_page(&Page {
            item: value::object(vec![
                ("count", Value::from(0u64)),
                ("tours", Value::Array(Vec::new())),
                ("pagination", Value::Nil),
                (
                    "error",
                    Value::String(String::from(
                        "Failed to load tours. Check that the API server is running at \
                         http://127.0.0.1:8001",
                    )),
                ),
            ]),
            file_path: self.tours_output_directory.join("index.html"),
            prev: None,
            next: None,
            template: self.tours_template,
        })
    }

    /// Writes the not-found page: a static "article not found" message with a
    /// link back to the blog index.
    pub fn write_not_found(&self) -> Result<()> {
        std::fs::create_dir_all(self.root_output_directory)?;
        self.write_page(&Page {
            item: value::object(vec![
                (
                    "message",
                    Value::String(String::from("Article not found")),
                ),
                (
                    "back",
                    value::url(&self.index_base_url.join("index.html")?),
                ),
            ]),
            file_path: self.root_output_directory.join("404.html"),
            prev: None,
            next: None,
            template: self.not_found_template,
        })
    }
}

/// Builds the prev/next navigation ref for a post: its URL and title.
fn nav_ref(post: &Post) -> Value {
    value::object(vec![
        ("url", value::url(&post.url)),
        ("title", Value::String(post.title.clone())),
    ])
}

/// Builds the prev/next ref for an index page: just the URL.
fn page_ref(url: Url) -> Value {
    value::object(vec![("url", value::url(&url))])
}

/// An object representing an output HTML file. A [`Page`] can be converted to
/// a [`Value`] and thus rendered in a template via [`Page::to_value`].
struct Page<'a> {
    /// The main item for the page.
    item: Value,

    /// The target location on disk for the output file.
    file_path: PathBuf,

    /// The navigation ref for the previous page/post, if any.
    prev: Option<Value>,

    /// The navigation ref for the next page/post, if any.
    next: Option<Value>,

    /// The template with which the page will be rendered.
    template: &'a Template,
}

impl Page<'_> {
    /// Converts a [`Page`] into a [`Value`]. The result is a [`Value::Object`]
    /// with fields `item`, `prev`, and `next` (see [`Page`] for descriptions).
    fn to_value(&self) -> Value {
        value::object(vec![
            ("item", self.item.clone()),
            ("prev", value::opt(self.prev.clone())),
            ("next", value::opt(self.next.clone())),
        ])
    }
}

/// `Index` represents a collection of [`Post`]s associated with a category
/// (or with no category, which is the main index containing all posts).
struct Index<'a> {
    /// The category, or `None` for the main index.
    category: Option<Category>,

    /// The base URL for all pages in the index (trailing slash).
    url: Url,

    /// The output directory for all pages in the index.
    output_directory: PathBuf,

    /// The posts associated with the index.
    posts: Vec<&'a Post>,
}

/// The result of a fallible page-writing operation.
type Result<T> = std::result::Result<T, Error>;

/// Represents an error in a page-writing operation.
#[derive(Debug)]
pub enum Error {
    /// An error during templating.
    Template(String),

    /// An error joining page URLs.
    UrlParse(url::ParseError),

    /// An error writing the output files.
    Io(io::Error),
}

impl From<io::Error> for Error {
    /// Converts an [`io::Error`] into an [`Error`]. This allows us to use the
    /// `?` operator for fallible I/O operations.
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<String> for Error {
    /// Converts a template error message ([`String`]) into an [`Error`]. This
    /// allows us to use the `?` operator for fallible template operations.
    fn from(err: String) -> Error {
        Error::Template(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. This allows us to use
    /// the `?` operator when joining page URLs.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as presentable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Template(err) => err.fmt(f),
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Template(_) => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}
