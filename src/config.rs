//! Loads the project (`tamada.yaml`) and theme (`theme/theme.yaml`)
//! configuration and resolves them into the [`Config`] consumed by
//! [`crate::build::build_site`]: source/output directories, page URLs,
//! template chains, hero settings, and the tour API base URL.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::Deserialize;
use url::Url;

use crate::slider;

#[derive(Deserialize)]
struct PageSize(usize);
impl Default for PageSize {
    fn default() -> Self {
        PageSize(10)
    }
}

/// The feed author, surfaced verbatim in the Atom output.
#[derive(Clone, Deserialize)]
pub struct Author {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Deserialize)]
struct Hero {
    #[serde(default)]
    slides: Vec<String>,

    #[serde(default = "default_interval_ms")]
    interval_ms: u64,
}

impl Default for Hero {
    fn default() -> Self {
        Hero {
            slides: Vec::new(),
            interval_ms: default_interval_ms(),
        }
    }
}

fn default_interval_ms() -> u64 {
    slider::DEFAULT_INTERVAL_MS
}

#[derive(Deserialize)]
struct Project {
    title: String,
    site_root: Url,

    #[serde(default)]
    author: Option<Author>,

    #[serde(default)]
    index_page_size: PageSize,

    #[serde(default)]
    hero: Hero,

    /// The tour API base URL. The default matches the local development
    /// server; deployments configure their own.
    #[serde(default = "default_api_url")]
    api_url: Url,
}

fn default_api_url() -> Url {
    Url::parse("http://127.0.0.1:8001/api").unwrap() // valid literal, always parses
}

#[derive(Deserialize)]
struct Theme {
    index_template: Vec<PathBuf>,
    posts_template: Vec<PathBuf>,
    tours_template: Vec<PathBuf>,
    not_found_template: Vec<PathBuf>,
}

pub struct Config {
    pub title: String,
    pub author: Option<Author>,

    pub posts_source_directory: PathBuf,
    pub static_source_directory: PathBuf,

    pub home_page: Url,
    pub index_url: Url,
    pub posts_url: Url,
    pub tours_url: Url,
    pub static_url: Url,
    pub atom_url: Url,

    pub index_template: Vec<PathBuf>,
    pub posts_template: Vec<PathBuf>,
    pub tours_template: Vec<PathBuf>,
    pub not_found_template: Vec<PathBuf>,

    pub root_output_directory: PathBuf,
    pub index_output_directory: PathBuf,
    pub posts_output_directory: PathBuf,
    pub tours_output_directory: PathBuf,
    pub static_output_directory: PathBuf,

    pub index_page_size: usize,
    pub hero_slides: Vec<String>,
    pub hero_interval_ms: u64,
    pub api_url: Url,
}

impl Config {
    /// Looks for `tamada.yaml` in `dir` or any of its parent directories and
    /// loads the configuration from the first one found.
    pub fn from_directory(
        dir: &Path,
        output_directory: &Path,
        api_url: Option<Url>,
    ) -> Result<Config> {
        let path = dir.join("tamada.yaml");
        if path.exists() {
            match Config::from_project_file(&path, output_directory, api_url) {
                Ok(config) => Ok(config),
                Err(e) => Err(anyhow!("Loading configuration: {:?}", e)),
            }
        } else {
            match dir.parent() {
                Some(parent) => Config::from_directory(parent, output_directory, api_url),
                None => Err(anyhow!(
                    "Could not find `tamada.yaml` in any parent directory"
                )),
            }
        }
    }

    /// Loads the configuration from a specific project file. `api_url`, when
    /// provided, overrides the project file's tour API base URL.
    pub fn from_project_file(
        path: &Path,
        output_directory: &Path,
        api_url: Option<Url>,
    ) -> Result<Config> {
        let project: Project = serde_yaml::from_reader(open(path, "project")?)?;
        match path.parent() {
            None => Err(anyhow!(
                "Can't get parent directory for provided project file path '{:?}'",
                path
            )),
            Some(project_root) => {
                let theme_dir = project_root.join("theme");
                let theme_file = open(&theme_dir.join("theme.yaml"), "theme")?;
                let theme: Theme = serde_yaml::from_reader(theme_file)?;
                let site_root = ensure_trailing_slash(&project.site_root);
                Ok(Config {
                    title: project.title,
                    author: project.author,
                    posts_source_directory: project_root.join("posts"),
                    static_source_directory: project_root.join("static"),
                    home_page: site_root.clone(),
                    index_url: site_root.join("pages/")?,
                    posts_url: site_root.join("posts/")?,
                    tours_url: site_root.join("tours/")?,
                    static_url: site_root.join("static/")?,
                    atom_url: site_root.join("feed.atom")?,
                    index_template: prefix_paths(&theme_dir, &theme.index_template),
                    posts_template: prefix_paths(&theme_dir, &theme.posts_template),
                    tours_template: prefix_paths(&theme_dir, &theme.tours_template),
                    not_found_template: prefix_paths(&theme_dir, &theme.not_found_template),
                    root_output_directory: output_directory.to_owned(),
                    index_output_directory: output_directory.join("pages"),
                    posts_output_directory: output_directory.join("posts"),
                    tours_output_directory: output_directory.join("tours"),
                    static_output_directory: output_directory.join("static"),
                    index_page_size: project.index_page_size.0,
                    hero_slides: project.hero.slides,
                    hero_interval_ms: project.hero.interval_ms,
                    api_url: match api_url {
                        Some(api_url) => api_url,
                        None => project.api_url,
                    },
                })
            }
        }
    }
}

/// Joining relative page URLs onto the site root requires the root to look
/// like a directory.
fn ensure_trailing_slash(url: &Url) -> Url {
    if url.path().ends_with('/') {
        url.clone()
    } else {
        let mut url = url.clone();
        let path = format!("{}/", url.path());
        url.set_path(&path);
        url
    }
}

fn prefix_paths(dir: &Path, paths: &[PathBuf]) -> Vec<PathBuf> {
    paths.iter().map(|relpath| dir.join(relpath)).collect()
}

fn open(path: &Path, kind: &str) -> Result<File> {
    match File::open(path) {
        Err(e) => Err(anyhow!(
            "Opening {} file `{}`: {}",
            kind,
            path.display(),
            e
        )),
        Ok(file) => Ok(file),
    }
}
