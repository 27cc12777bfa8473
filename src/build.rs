//! Exports the [`build_site`] function which stitches together the high-level
//! steps of building the output static site: parsing the posts
//! ([`crate::parser`]), rendering index, post, tour, and not-found pages
//! ([`crate::write`]), copying the static source directory into the static
//! output directory, and generating the Atom feed.

use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};

use gtmpl::Template;
use tracing::{info, warn};

use crate::config::Config;
use crate::feed::{write_feed, Error as FeedError, FeedConfig};
use crate::parser::{Error as ParseError, Parser as PostParser};
use crate::slider;
use crate::tours::{self, TourFilters};
use crate::write::{Error as WriteError, Writer};

/// Builds the site from a [`Config`] object. This calls into
/// [`PostParser::parse_posts`], [`Writer::write_posts`], and
/// [`write_feed`] which do the heavy-lifting, then fetches and renders the
/// tour catalog. A catalog fetch failure doesn't abort the build: the tours
/// section gets its static failure page and everything else still renders.
pub fn build_site(config: Config, tour_filters: &TourFilters) -> Result<()> {
    let post_parser = PostParser::new(&config.posts_url, &config.posts_output_directory);

    // collect all posts
    let posts = post_parser.parse_posts(&config.posts_source_directory)?;
    info!("parsed {} posts", posts.len());

    // Parse the template files.
    let index_template = parse_template(config.index_template.iter())?;
    let posts_template = parse_template(config.posts_template.iter())?;
    let tours_template = parse_template(config.tours_template.iter())?;
    let not_found_template = parse_template(config.not_found_template.iter())?;

    // Blow away the old output directories so we don't have any collisions.
    // We don't naively delete the whole root output directory in case the
    // user accidentally passes the wrong directory.
    rmdir(&config.posts_output_directory)?;
    rmdir(&config.index_output_directory)?;
    rmdir(&config.tours_output_directory)?;
    rmdir(&config.static_output_directory)?;

    // write the post, index, and not-found pages
    let writer = Writer {
        posts_template: &posts_template,
        index_template: &index_template,
        tours_template: &tours_template,
        not_found_template: &not_found_template,
        site_title: &config.title,
        index_base_url: &config.index_url,
        index_output_directory: &config.index_output_directory,
        index_page_size: config.index_page_size,
        tours_url: &config.tours_url,
        tours_output_directory: &config.tours_output_directory,
        root_output_directory: &config.root_output_directory,
        home_page: &config.home_page,
        static_url: &config.static_url,
        atom_url: &config.atom_url,
        hero: slider::hero_value(
            &config.hero_slides,
            &config.static_url,
            config.hero_interval_ms,
        ),
    };
    writer.write_posts(&posts)?;
    writer.write_not_found()?;
    info!("wrote blog pages");

    // copy static directory
    copy_dir(
        &config.static_source_directory,
        &config.static_output_directory,
    )?;

    // copy /pages/index.html to /index.html
    let _ = std::fs::copy(
        config.index_output_directory.join("index.html"),
        config.root_output_directory.join("index.html"),
    )?;

    // create the atom feed
    write_feed(
        FeedConfig {
            title: config.title.clone(),
            id: config.home_page.to_string(),
            author: config.author.clone(),
            home_page: config.home_page.clone(),
        },
        &posts,
        File::create(config.root_output_directory.join("feed.atom"))?,
    )?;

    // fetch and render the tour catalog; a failure renders the static
    // failure page and the build carries on
    let client = tours::Client::new(config.api_url.clone());
    match client.fetch_catalog(tour_filters) {
        Ok(catalogs) => {
            writer.write_tour_pages(&catalogs)?;
            info!("wrote {} tour pages", catalogs.len());
        }
        Err(err) => {
            warn!("fetching tour catalog: {}", err);
            writer.write_tours_failure()?;
        }
    }

    Ok(())
}

/// Recursively copies `src` into `dst`. A missing `src` is not an error; a
/// project without static assets is fine.
fn copy_dir(src: &Path, dst: &Path) -> Result<()> {
    if !src.exists() {
        return Ok(());
    }
    for result in walkdir::WalkDir::new(src) {
        let entry = result?;
        // strip_prefix can't fail: walkdir only yields descendants of src
        let target = match entry.path().strip_prefix(src) {
            Ok(relative) => dst.join(relative),
            Err(_) => continue,
        };
        if entry.file_type().is_dir() {
            std::fs::create_dir_all(&target)?;
        } else {
            std::fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

// Loads the template file contents, appends them to `base_template`, and
// parses the result into a template.
fn parse_template<P: AsRef<Path>>(template_files: impl Iterator<Item = P>) -> Result<Template> {
    let mut contents = String::new();
    for template_file in template_files {
        use std::io::Read;
        let template_file = template_file.as_ref();
        File::open(template_file)
            .map_err(|e| Error::OpenTemplateFile {
                path: template_file.to_owned(),
                err: e,
            })?
            .read_to_string(&mut contents)?;
        contents.push(' ');
    }

    let mut template = Template::default();
    template.parse(&contents).map_err(Error::ParseTemplate)?;
    Ok(template)
}

type Result<T> = std::result::Result<T, Error>;

/// The error type for building a site. Errors can be during parsing, writing,
/// cleaning output directories, parsing template files, and other I/O.
#[derive(Debug)]
pub enum Error {
    /// Returned for errors during parsing.
    Parse(ParseError),

    /// Returned for errors writing pages to disk as HTML files.
    Write(WriteError),

    /// Returned for I/O problems while cleaning output directories.
    Clean { path: PathBuf, err: std::io::Error },

    /// Returned for I/O problems while opening template files.
    OpenTemplateFile { path: PathBuf, err: std::io::Error },

    /// Returned for errors parsing template files.
    ParseTemplate(String),

    /// Returned for errors writing the feed.
    Feed(FeedError),

    /// Returned for I/O problems while copying the static directory.
    WalkDir(walkdir::Error),

    /// Returned for other I/O errors.
    Io(std::io::Error),
}

impl fmt::Display for Error {
    /// Implements [`fmt::Display`] for [`Error`].
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Parse(err) => err.fmt(f),
            Error::Write(err) => err.fmt(f),
            Error::Clean { path, err } => {
                write!(f, "Cleaning directory '{}': {}", path.display(), err)
            }
            Error::OpenTemplateFile { path, err } => {
                write!(f, "Opening template file '{}': {}", path.display(), err)
            }
            Error::ParseTemplate(err) => err.fmt(f),
            Error::Feed(err) => err.fmt(f),
            Error::WalkDir(err) => err.fmt(f),
            Error::Io(err) => err.fmt(f),
        }
    }
}

impl std::error::Error for Error {
    /// Implements [`std::error::Error`] for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Write(err) => Some(err),
            Error::Clean { path: _, err } => Some(err),
            Error::OpenTemplateFile { path: _, err } => Some(err),
            Error::ParseTemplate(_) => None,
            Error::Feed(err) => Some(err),
            Error::WalkDir(err) => Some(err),
            Error::Io(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    /// Converts [`std::io::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator.
    fn from(err: std::io::Error) -> Error {
        Error::Io(err)
    }
}

impl From<ParseError> for Error {
    /// Converts [`ParseError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: ParseError) -> Error {
        Error::Parse(err)
    }
}

impl From<WriteError> for Error {
    /// Converts [`WriteError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: WriteError) -> Error {
        Error::Write(err)
    }
}

impl From<FeedError> for Error {
    /// Converts [`FeedError`]s into [`Error`]. This allows us to use the `?`
    /// operator.
    fn from(err: FeedError) -> Error {
        Error::Feed(err)
    }
}

impl From<walkdir::Error> for Error {
    /// Converts [`walkdir::Error`]s into [`Error`]. This allows us to use the
    /// `?` operator when copying the static directory.
    fn from(err: walkdir::Error) -> Error {
        Error::WalkDir(err)
    }
}

fn rmdir(dir: &Path) -> Result<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(x) => Ok(x),
        Err(e) => match e.kind() {
            std::io::ErrorKind::NotFound => Ok(()),
            _ => Err(Error::Clean {
                path: dir.to_owned(),
                err: e,
            }),
        },
    }
}
