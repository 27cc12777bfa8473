//! Defines the [`Parser`] and [`Error`] types and the logic for parsing
//! [`Post`]s from the file system into memory.

use std::{
    collections::HashSet,
    fmt,
    fs::{read_dir, File},
    path::{Path, PathBuf},
};

use serde::Deserialize;
use url::Url;

use crate::{category::Category, markdown, post::Post};

const MARKDOWN_EXTENSION: &str = ".md";

/// Parses [`Post`] objects from source files.
pub struct Parser<'a> {
    /// `posts_url` is the base URL for post pages. It's used to prefix post
    /// page URLs (i.e., the URL for a post is `{posts_url}/{slug}.html`).
    posts_url: &'a Url,

    /// `posts_directory` is the directory in which post pages will be
    /// rendered.
    posts_directory: &'a Path,
}

impl<'a> Parser<'a> {
    /// Constructs a new parser. See fields on [`Parser`] for argument
    /// descriptions.
    pub fn new(posts_url: &'a Url, posts_directory: &'a Path) -> Parser<'a> {
        Parser {
            posts_url,
            posts_directory,
        }
    }

    /// Searches a provided `source_directory` for post files (extension =
    /// `.md`) and returns a list of [`Post`] objects sorted by date (most
    /// recent first). Each post file must be structured as follows:
    ///
    /// 1. Initial frontmatter fence (`---`)
    /// 2. YAML frontmatter with fields `Title`, `Date`, `Category`, `Image`,
    ///    `Excerpt`, `ReadTime`, and optionally `Views`, `Popular`, `Slug`,
    ///    and `Tags`
    /// 3. Terminal frontmatter fence (`---`)
    /// 4. Post body (markdown)
    ///
    /// For example:
    ///
    /// ```md
    /// ---
    /// Title: Kazbek and the greatness of the mountains
    /// Date: 2026-01-09
    /// Category: nature
    /// Image: images/kazbek.jpg
    /// Excerpt: Standing at 5047 meters...
    /// ReadTime: 7
    /// Views: 2150
    /// Popular: true
    /// ---
    /// ## The road to Gergeti
    ///
    /// ...
    /// ```
    ///
    /// Slugs default to the slugified title and must be unique across the
    /// whole post list; a collision aborts the parse.
    pub fn parse_posts(&self, source_directory: &Path) -> Result<Vec<Post>> {
        let mut posts = Vec::new();
        let mut seen_slugs: HashSet<String> = HashSet::new();

        for result in read_dir(source_directory)? {
            let entry = result?;
            let os_file_name = entry.file_name();
            let file_name = os_file_name.to_string_lossy();
            if file_name.ends_with(MARKDOWN_EXTENSION) {
                let post = self.parse_post(&entry.path())?;
                if !seen_slugs.insert(post.slug.clone()) {
                    return Err(Error::DuplicateSlug {
                        slug: post.slug,
                        path: entry.path(),
                    });
                }
                posts.push(post);
            }
        }

        posts.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.slug.cmp(&b.slug)));
        Ok(posts)
    }

    fn parse_post(&self, path: &Path) -> Result<Post> {
        match self._parse_post(path) {
            Ok(p) => Ok(p),
            Err(e) => Err(Error::Annotated(
                format!("parsing post `{:?}`", path),
                Box::new(e),
            )),
        }
    }

    fn _parse_post(&self, path: &Path) -> Result<Post> {
        fn frontmatter_indices(input: &str) -> Result<(usize, usize, usize)> {
            const FENCE: &str = "---";
            if !input.starts_with(FENCE) {
                return Err(Error::FrontmatterMissingStartFence);
            }
            match input[FENCE.len()..].find("---") {
                None => Err(Error::FrontmatterMissingEndFence),
                Some(offset) => Ok((
                    FENCE.len(),                        // yaml_start
                    FENCE.len() + offset,               // yaml_stop
                    FENCE.len() + offset + FENCE.len(), // body_start
                )),
            }
        }

        use std::io::Read;
        let mut contents = String::new();
        File::open(path)?.read_to_string(&mut contents)?;
        let input: &str = &contents;

        let (yaml_start, yaml_stop, body_start) = frontmatter_indices(input)?;
        let frontmatter: Frontmatter = serde_yaml::from_str(&input[yaml_start..yaml_stop])?;

        // Fail fast on bad dates; render-time formatting assumes they parse.
        chrono::NaiveDate::parse_from_str(&frontmatter.date, "%Y-%m-%d")?;

        let slug = match frontmatter.slug {
            Some(slug) => slug,
            None => slug::slugify(&frontmatter.title),
        };
        let file_name = format!("{}.html", slug);

        let (body, toc) = markdown::to_html(&input[body_start..]);

        Ok(Post {
            url: self.posts_url.join(&file_name)?,
            file_path: self.posts_directory.join(&file_name),
            slug,
            title: frontmatter.title,
            date: frontmatter.date,
            category: frontmatter.category,
            image: frontmatter.image,
            excerpt: frontmatter.excerpt,
            read_time: frontmatter.read_time,
            views: frontmatter.views,
            popular: frontmatter.popular,
            tags: frontmatter.tags,
            body,
            toc,
        })
    }
}

#[derive(Deserialize, Clone)]
struct Frontmatter {
    /// The title of the post.
    #[serde(rename = "Title")]
    pub title: String,

    /// The date of the post, `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: String,

    /// The post's category.
    #[serde(rename = "Category")]
    pub category: Category,

    /// The cover/card image path, relative to the static URL.
    #[serde(rename = "Image")]
    pub image: String,

    /// The card teaser text.
    #[serde(rename = "Excerpt")]
    pub excerpt: String,

    /// Estimated read time in minutes.
    #[serde(rename = "ReadTime")]
    pub read_time: u32,

    /// View count carried over from the site analytics export.
    #[serde(default, rename = "Views")]
    pub views: u64,

    /// Whether the post may appear in the popular-posts block.
    #[serde(default, rename = "Popular")]
    pub popular: bool,

    /// Explicit slug; defaults to the slugified title.
    #[serde(default, rename = "Slug")]
    pub slug: Option<String>,

    /// Freeform tags shown on the post page.
    #[serde(default, rename = "Tags")]
    pub tags: Vec<String>,
}

/// Represents the result of a [`Post`]-parse operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error parsing a [`Post`] object.
#[derive(Debug)]
pub enum Error {
    /// Returned when a post source file is missing its starting frontmatter
    /// fence (`---`).
    FrontmatterMissingStartFence,

    /// Returned when a post source file is missing its terminal frontmatter
    /// fence (`---` i.e., the starting fence was found but the ending one was
    /// missing).
    FrontmatterMissingEndFence,

    /// Returned when there was an error parsing the frontmatter as YAML.
    DeserializeYaml(serde_yaml::Error),

    /// Returned when a post's date isn't `YYYY-MM-DD`.
    InvalidDate(chrono::ParseError),

    /// Returned when two posts resolve to the same slug.
    DuplicateSlug { slug: String, path: PathBuf },

    /// Returned when there is a problem parsing URLs.
    UrlParse(url::ParseError),

    /// Returned for other I/O errors.
    Io(std::io::Error),

    /// An error with an annotation.
    Annotated(String, Box<Error>),
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FrontmatterMissingStartFence => {
                write!(f, "Post must begin with `---`")
            }
            Error::FrontmatterMissingEndFence => {
                write!(f, "Missing closing `---`")
            }
            Error::DeserializeYaml(err) => err.fmt(f),
            Error::InvalidDate(err) => write!(f, "Invalid post date: {}", err),
            Error::DuplicateSlug { slug, path } => {
                write!(f, "Duplicate slug `{}` (from `{:?}`)", slug, path)
            }
            Error::UrlParse(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
            Error::Annotated(annotation, err) => {
                write!(f, "{}: {}", &annotation, err)
            }
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::FrontmatterMissingStartFence => None,
            Error::FrontmatterMissingEndFence => None,
            Error::DeserializeYaml(err) => Some(err),
            Error::InvalidDate(err) => Some(err),
            Error::DuplicateSlug { .. } => None,
            Error::UrlParse(err) => Some(err),
            Error::Io(err) => Some(err),
            Error::Annotated(_, err) => Some(err),
        }
    }
}

impl From<serde_yaml::Error> for Error {
    /// Converts a [`serde_yaml::Error`] into an [`Error`]. It allows us to use
    /// the `?` operator for [`serde_yaml`] deserialization functions.
    fn from(err: serde_yaml::Error) -> Error {
        Error::DeserializeYaml(err)
    }
}

impl From<chrono::ParseError> for Error {
    /// Converts a [`chrono::ParseError`] into an [`Error`]. It allows us to
    /// use the `?` operator when validating post dates.
    fn from(err: chrono::ParseError) -> Error {
        Error::InvalidDate(err)
    }
}

impl From<url::ParseError> for Error {
    /// Converts a [`url::ParseError`] into an [`Error`]. It allows us to use
    /// the `?` operator for URL parsing and joining functions.
    fn from(err: url::ParseError) -> Error {
        Error::UrlParse(err)
    }
}

impl From<std::io::Error> for Error {
    /// Converts a [`std::io::Error`] into an [`Error`]. It allows us to
    /// use the `?` operator for fallible I/O functions.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}
