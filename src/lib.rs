//! The library code for the `tamada` static site generator. The architecture
//! can be generally broken down into two distinct steps:
//!
//! 1. Parsing blog posts from source files on disk ([`crate::parser`])
//! 2. Converting the posts into output files on disk ([`crate::write`])
//!
//! The second step is the more involved. It builds post pages (each with its
//! table of contents, related posts, and previous/next navigation), and then
//! builds groups of index pages: one group per category plus another group for
//! the main index which contains all posts. A group of index pages is referred
//! to as an "index", and each index is paginated--converted into groups of
//! pages based on a configurable number of posts per index page.
//!
//! Alongside the blog there is a tour catalog ([`crate::tours`]): the
//! generator fetches tour listings from a remote API page by page and renders
//! them as card pages with their own pagination. A fetch failure renders a
//! static failure page instead; the rest of the site still builds.
//!
//! The final substeps are straight-forward: for each page, apply the matching
//! template (post, index, tours, or not-found) and write the result to disk,
//! then copy static assets and emit the Atom feed ([`crate::feed`]).

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]

pub mod build;
pub mod category;
pub mod config;
pub mod feed;
pub mod format;
pub mod markdown;
pub mod parser;
pub mod post;
pub mod slider;
pub mod tours;
pub mod value;
pub mod write;
