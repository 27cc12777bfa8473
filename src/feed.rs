//! Support for creating Atom feeds from a list of posts.

use std::fmt;
use std::io::Write;

use atom_syndication::{Entry, Error as AtomError, Feed, Link, Person};
use chrono::{FixedOffset, NaiveDate, ParseError, ParseResult, TimeZone, Utc};
use url::Url;

use crate::config::Author;
use crate::post::Post;

/// Bundled configuration for creating a feed.
pub struct FeedConfig {
    pub title: String,
    pub id: String,
    pub author: Option<Author>,
    pub home_page: Url,
}

/// Creates a feed from some configuration ([`FeedConfig`]) and a list of
/// [`Post`]s and writes the result to a [`std::io::Write`]. This function
/// takes ownership of the provided [`FeedConfig`].
pub fn write_feed<W: Write>(config: FeedConfig, posts: &[Post], w: W) -> Result<()> {
    feed(config, posts)?.write_to(w)?;
    Ok(())
}

fn feed(config: FeedConfig, posts: &[Post]) -> ParseResult<Feed> {
    use std::collections::BTreeMap;
    Ok(Feed {
        entries: feed_entries(&config, posts)?,
        title: config.title.into(),
        id: config.id,
        updated: utc_offset().from_utc_datetime(&Utc::now().naive_utc()),
        authors: author_to_people(config.author),
        categories: Vec::new(),
        contributors: Vec::new(),
        generator: None,
        icon: None,
        logo: None,
        rights: None,
        subtitle: None,
        base: None,
        lang: None,
        extensions: BTreeMap::new(),
        namespaces: BTreeMap::new(),
        links: vec![Link {
            href: config.home_page.to_string(),
            rel: "alternate".to_string(),
            title: None,
            hreflang: None,
            mime_type: None,
            length: None,
        }],
    })
}

fn feed_entries(config: &FeedConfig, posts: &[Post]) -> ParseResult<Vec<Entry>> {
    use std::collections::BTreeMap;
    let mut entries: Vec<Entry> = Vec::with_capacity(posts.len());

    for post in posts {
        // Post dates carry no time or zone; pin them to midnight UTC.
        let naive_date = NaiveDate::parse_from_str(&post.date, "%Y-%m-%d")?;
        let naive_date_time = naive_date.and_hms_opt(0, 0, 0).unwrap(); // midnight is always valid
        let date = utc_offset().from_utc_datetime(&naive_date_time);

        entries.push(Entry {
            id: post.url.to_string(),
            title: post.title.clone().into(),
            updated: date,
            authors: author_to_people(config.author.clone()),
            links: vec![Link {
                href: post.url.to_string(),
                rel: "alternate".to_owned(),
                title: None,
                mime_type: None,
                hreflang: None,
                length: None,
            }],
            rights: None,
            summary: Some(post.excerpt.clone().into()),
            categories: Vec::new(),
            contributors: Vec::new(),
            published: Some(date),
            source: None,
            content: None,
            extensions: BTreeMap::new(),
        })
    }
    Ok(entries)
}

fn utc_offset() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap() // a zero offset is always in range
}

fn author_to_people(author: Option<Author>) -> Vec<Person> {
    match author {
        Some(author) => vec![Person {
            name: author.name,
            email: author.email,
            uri: None,
        }],
        None => Vec::new(),
    }
}

type Result<T> = std::result::Result<T, Error>;

/// Represents a problem creating a feed. Variants include I/O, Atom, and
/// date-time parsing issues.
#[derive(Debug)]
pub enum Error {
    /// Returned when there is a generic I/O error.
    Io(std::io::Error),

    /// Returned when there is an Atom-related error.
    Atom(AtomError),

    /// Returned when there is an issue parsing a post's date.
    DateTimeParse(ParseError),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Io(err) => err.fmt(f),
            Error::Atom(err) => err.fmt(f),
            Error::DateTimeParse(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Atom(err) => Some(err),
            Error::DateTimeParse(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator in fallible feed operations.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<AtomError> for Error {
    /// Converts [`AtomError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: AtomError) -> Error {
        Error::Atom(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator in fallible feed operations.
    fn from(err: ParseError) -> Error {
        Error::DateTimeParse(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::category::Category;
    use std::path::PathBuf;

    #[test]
    fn test_feed_entries_from_posts() -> Result<()> {
        let posts = vec![Post {
            slug: String::from("kazbek"),
            title: String::from("Kazbek"),
            date: String::from("2026-01-09"),
            category: Category::Nature,
            image: String::from("images/kazbek.jpg"),
            excerpt: String::from("Standing at 5047 meters..."),
            read_time: 7,
            views: 2150,
            popular: true,
            tags: Vec::new(),
            body: String::new(),
            toc: Vec::new(),
            url: Url::parse("https://example.org/posts/kazbek.html").unwrap(),
            file_path: PathBuf::from("/tmp/posts/kazbek.html"),
        }];
        let mut out: Vec<u8> = Vec::new();
        write_feed(
            FeedConfig {
                title: String::from("Travel notes"),
                id: String::from("https://example.org/"),
                author: Some(Author {
                    name: String::from("Dobi"),
                    email: None,
                }),
                home_page: Url::parse("https://example.org/").unwrap(),
            },
            &posts,
            &mut out,
        )?;

        let xml = String::from_utf8(out).expect("feed output is UTF-8");
        assert!(xml.contains("Travel notes"));
        assert!(xml.contains("https://example.org/posts/kazbek.html"));
        assert!(xml.contains("2026-01-09T00:00:00"));
        Ok(())
    }

    #[test]
    fn test_bad_date_is_an_error() {
        let posts = vec![Post {
            slug: String::from("bad"),
            title: String::from("Bad"),
            date: String::from("someday"),
            category: Category::Tips,
            image: String::new(),
            excerpt: String::new(),
            read_time: 1,
            views: 0,
            popular: false,
            tags: Vec::new(),
            body: String::new(),
            toc: Vec::new(),
            url: Url::parse("https://example.org/posts/bad.html").unwrap(),
            file_path: PathBuf::from("/tmp/posts/bad.html"),
        }];
        let result = write_feed(
            FeedConfig {
                title: String::new(),
                id: String::new(),
                author: None,
                home_page: Url::parse("https://example.org/").unwrap(),
            },
            &posts,
            Vec::new(),
        );
        assert!(matches!(result, Err(Error::DateTimeParse(_))));
    }
}
