//! The tour-catalog client. The catalog lives behind a remote REST API; this
//! module builds the filtered listing URLs, fetches the paginated envelope,
//! and converts each page of results into card values for the tours
//! template. The tour record itself is treated as opaque: deserialization is
//! tolerant (unknown fields ignored, almost everything optional) and nothing
//! is validated beyond what the cards display.

use std::fmt;

use serde::Deserialize;
use url::Url;

use crate::format;
use crate::value;
use gtmpl::Value;

/// Listing page size, fixed server-side.
pub const PAGE_SIZE: u64 = 12;

/// The number of bundled placeholder card images (`images/tour1.jpg` ..
/// `images/tour8.jpg`) cycled for tours without a cover photo.
const PLACEHOLDER_IMAGES: usize = 8;

/// Optional catalog filters. Each set field contributes one query pair to the
/// listing URL; unset fields contribute nothing.
#[derive(Clone, Debug, Default)]
pub struct TourFilters {
    pub min_price: Option<u64>,
    pub max_price: Option<u64>,
    pub duration: Option<u64>,
    pub region: Option<String>,
    pub start_date: Option<String>,
}

/// One page of the listing envelope: `{count, next, previous, results}`.
#[derive(Debug, Deserialize)]
pub struct Catalog {
    pub count: u64,
    pub next: Option<String>,
    pub previous: Option<String>,
    pub results: Vec<Tour>,
}

/// A tour record as the cards consume it. `title` and `slug` are the only
/// fields the client insists on; the API serializes prices as decimal
/// strings, and anything else it sends is ignored.
#[derive(Clone, Debug, Deserialize)]
pub struct Tour {
    pub title: String,
    pub slug: String,
    #[serde(default)]
    pub price_base: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub duration_days: Option<u64>,
    #[serde(default)]
    pub description_short: Option<String>,
    #[serde(default)]
    pub tour_type: Option<String>,
    #[serde(default)]
    pub cover_photo: Option<String>,
    #[serde(default)]
    pub average_rating: Option<f64>,
}

/// Total page count for a listing of `count` tours: `ceil(count / 12)`.
pub fn total_pages(count: u64) -> u64 {
    (count + PAGE_SIZE - 1) / PAGE_SIZE
}

/// A client for the tour API.
pub struct Client {
    http: reqwest::blocking::Client,
    base_url: Url,
}

impl Client {
    /// Constructs a client over `base_url` (e.g.
    /// `http://127.0.0.1:8001/api`).
    pub fn new(base_url: Url) -> Client {
        Client {
            http: reqwest::blocking::Client::new(),
            base_url,
        }
    }

    /// Builds the listing URL for one page:
    /// `{base_url}/tours/?page={page}` plus the set filters.
    pub fn list_url(&self, page: u64, filters: &TourFilters) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::BadBaseUrl)?
            .pop_if_empty()
            .extend(["tours", ""]);

        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("page", &page.to_string());
            if let Some(min_price) = filters.min_price {
                pairs.append_pair("min_price", &min_price.to_string());
            }
            if let Some(max_price) = filters.max_price {
                pairs.append_pair("max_price", &max_price.to_string());
            }
            if let Some(duration) = filters.duration {
                pairs.append_pair("duration", &duration.to_string());
            }
            if let Some(region) = &filters.region {
                pairs.append_pair("region", region);
            }
            if let Some(start_date) = &filters.start_date {
                pairs.append_pair("start_date", start_date);
            }
        }
        Ok(url)
    }

    /// Fetches one listing page. Any transport, HTTP-status, or JSON-parse
    /// failure surfaces as an [`Error`]; there is no retry.
    pub fn list(&self, page: u64, filters: &TourFilters) -> Result<Catalog> {
        let url = self.list_url(page, filters)?;
        tracing::debug!("requesting tour listing: {}", url);
        let response = self.http.get(url.as_str()).send()?;
        tracing::debug!("tour listing response status: {}", response.status());
        Ok(response.error_for_status()?.json()?)
    }

    /// Fetches the whole catalog, page by page, until the envelope reports no
    /// next page. The first envelope's `count` bounds the loop in case a
    /// misbehaving server keeps reporting a next page.
    pub fn fetch_catalog(&self, filters: &TourFilters) -> Result<Vec<Catalog>> {
        let first = self.list(1, filters)?;
        let last_page = total_pages(first.count);
        let mut pages = vec![first];

        while pages
            .last()
            .map(|catalog| catalog.next.is_some())
            .unwrap_or(false)
        {
            let page = pages.len() as u64 + 1;
            if page > last_page {
                break;
            }
            pages.push(self.list(page, filters)?);
        }
        tracing::info!(
            "fetched {} tours across {} pages",
            pages.first().map(|c| c.count).unwrap_or(0),
            pages.len(),
        );
        Ok(pages)
    }
}

/// Converts one catalog page into the main item [`Value`] for the tours
/// template: the found-count, the cards, and the pagination block.
/// `tours_url` is the base URL of the tour pages and must end in a trailing
/// slash; `page` is 1-indexed.
pub fn page_value(catalog: &Catalog, page: u64, tours_url: &Url) -> Value {
    let cards: Vec<Value> = catalog
        .results
        .iter()
        .enumerate()
        .map(|(i, tour)| card_value(tour, i))
        .collect();

    let page_file = |n: u64| -> Value {
        let file = match n {
            1 => String::from("index.html"),
            n => format!("{}.html", n),
        };
        match tours_url.join(&file) {
            Ok(url) => Value::String(url.to_string()),
            Err(_) => Value::String(file),
        }
    };

    value::object(vec![
        ("count", Value::from(catalog.count)),
        ("tours", Value::Array(cards)),
        (
            "pagination",
            value::object(vec![
                (
                    "prev",
                    value::opt(catalog.previous.as_ref().map(|_| page_file(page - 1))),
                ),
                (
                    "next",
                    value::opt(catalog.next.as_ref().map(|_| page_file(page + 1))),
                ),
                ("page", Value::from(page)),
                ("total_pages", Value::from(total_pages(catalog.count))),
            ]),
        ),
    ])
}

/// Converts one tour record into a card [`Value`]. Tours without a cover
/// photo cycle through the bundled placeholder images by card position.
fn card_value(tour: &Tour, index: usize) -> Value {
    let image = match &tour.cover_photo {
        Some(photo) => photo.clone(),
        None => format!("images/tour{}.jpg", index % PLACEHOLDER_IMAGES + 1),
    };

    value::object(vec![
        ("title", Value::String(tour.title.clone())),
        ("slug", Value::String(tour.slug.clone())),
        (
            "detail",
            Value::String(format!("tour-detail.html?slug={}", tour.slug)),
        ),
        ("image", Value::String(image)),
        (
            "price",
            value::opt(
                tour.price_base
                    .as_deref()
                    .map(|p| Value::String(format::price(p))),
            ),
        ),
        (
            "region",
            value::opt(tour.region.as_ref().map(|r| Value::String(r.clone()))),
        ),
        (
            "duration",
            value::opt(
                tour.duration_days
                    .map(|days| Value::String(format::days(days))),
            ),
        ),
        (
            "description",
            value::opt(
                tour.description_short
                    .as_ref()
                    .map(|d| Value::String(d.clone())),
            ),
        ),
        (
            "type_label",
            value::opt(
                tour.tour_type
                    .as_deref()
                    .map(|t| Value::String(format::tour_type(t).to_owned())),
            ),
        ),
        (
            "rating",
            value::opt(tour.average_rating.map(Value::from)),
        ),
    ])
}

/// The result of a catalog operation.
pub type Result<T> = std::result::Result<T, Error>;

/// Represents an error talking to the tour API.
#[derive(Debug)]
pub enum Error {
    /// Returned for transport, HTTP-status, and body-decoding failures.
    Http(reqwest::Error),

    /// Returned when the configured API base URL cannot carry path segments
    /// (e.g. a `mailto:` URL).
    BadBaseUrl,
}

impl fmt::Display for Error {
    /// Displays an [`Error`] as human-readable text.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Http(err) => err.fmt(f),
            Error::BadBaseUrl => write!(f, "API base URL cannot carry path segments"),
        }
    }
}

impl std::error::Error for Error {
    /// Implements the [`std::error::Error`] trait for [`Error`].
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Http(err) => Some(err),
            Error::BadBaseUrl => None,
        }
    }
}

impl From<reqwest::Error> for Error {
    /// Converts a [`reqwest::Error`] into an [`Error`]. This allows us to use
    /// the `?` operator for fallible HTTP operations.
    fn from(err: reqwest::Error) -> Error {
        Error::Http(err)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn fixture_client() -> Client {
        Client::new(Url::parse("http://127.0.0.1:8001/api").unwrap())
    }

    #[test]
    fn test_list_url_no_filters() -> Result<()> {
        let url = fixture_client().list_url(1, &TourFilters::default())?;
        assert_eq!("http://127.0.0.1:8001/api/tours/?page=1", url.as_str());
        Ok(())
    }

    #[test]
    fn test_list_url_with_filters() -> Result<()> {
        let filters = TourFilters {
            min_price: Some(20000),
            max_price: Some(50000),
            duration: None,
            region: Some(String::from("Kakheti")),
            start_date: Some(String::from("2026-05-01")),
        };
        let url = fixture_client().list_url(2, &filters)?;
        assert_eq!(
            "http://127.0.0.1:8001/api/tours/?page=2&min_price=20000&max_price=50000\
             &region=Kakheti&start_date=2026-05-01",
            url.as_str(),
        );
        Ok(())
    }

    #[test]
    fn test_list_url_trailing_slash_base() -> Result<()> {
        let client = Client::new(Url::parse("https://example.org/api/").unwrap());
        let url = client.list_url(1, &TourFilters::default())?;
        assert_eq!("https://example.org/api/tours/?page=1", url.as_str());
        Ok(())
    }

    #[test]
    fn test_total_pages_ceiling() {
        assert_eq!(0, total_pages(0));
        assert_eq!(1, total_pages(1));
        assert_eq!(1, total_pages(12));
        assert_eq!(2, total_pages(13));
        assert_eq!(3, total_pages(25));
    }

    #[test]
    fn test_envelope_deserialization() -> serde_json::Result<()> {
        let catalog: Catalog = serde_json::from_str(include_str!(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/testdata/tours_page.json"
        )))?;
        assert_eq!(25, catalog.count);
        assert!(catalog.next.is_some());
        assert!(catalog.previous.is_none());
        assert_eq!(2, catalog.results.len());

        let tour = &catalog.results[0];
        assert_eq!("golden-kakheti-3aa91f20", tour.slug);
        assert_eq!(Some(String::from("25000.00")), tour.price_base);
        assert_eq!(Some(3), tour.duration_days);
        // fields the cards never read (operator, nearest_date, ...) are
        // silently ignored
        Ok(())
    }

    #[test]
    fn test_page_value_pagination_buttons() {
        let tours_url = Url::parse("https://example.org/tours/").unwrap();
        let catalog = Catalog {
            count: 25,
            next: Some(String::from("http://api/tours/?page=3")),
            previous: Some(String::from("http://api/tours/?page=1")),
            results: Vec::new(),
        };
        match page_value(&catalog, 2, &tours_url) {
            Value::Object(fields) => match &fields["pagination"] {
                Value::Object(pagination) => {
                    assert_eq!(
                        &Value::String(String::from("https://example.org/tours/index.html")),
                        &pagination["prev"],
                    );
                    assert_eq!(
                        &Value::String(String::from("https://example.org/tours/3.html")),
                        &pagination["next"],
                    );
                    assert_eq!(&Value::from(3u64), &pagination["total_pages"]);
                }
                other => panic!("expected pagination object, got {:?}", other),
            },
            other => panic!("expected page object, got {:?}", other),
        }
    }

    #[test]
    fn test_page_value_first_page_has_no_prev() {
        let tours_url = Url::parse("https://example.org/tours/").unwrap();
        let catalog = Catalog {
            count: 25,
            next: Some(String::from("http://api/tours/?page=2")),
            previous: None,
            results: Vec::new(),
        };
        match page_value(&catalog, 1, &tours_url) {
            Value::Object(fields) => match &fields["pagination"] {
                Value::Object(pagination) => {
                    assert_eq!(&Value::Nil, &pagination["prev"]);
                    assert_ne!(&Value::Nil, &pagination["next"]);
                }
                other => panic!("expected pagination object, got {:?}", other),
            },
            other => panic!("expected page object, got {:?}", other),
        }
    }

    #[test]
    fn test_page_value_last_page_has_no_next() {
        let tours_url = Url::parse("https://example.org/tours/").unwrap();
        let catalog = Catalog {
            count: 25,
            next: None,
            previous: Some(String::from("http://api/tours/?page=2")),
            results: Vec::new(),
        };
        match page_value(&catalog, 3, &tours_url) {
            Value::Object(fields) => match &fields["pagination"] {
                Value::Object(pagination) => {
                    assert_eq!(&Value::Nil, &pagination["next"]);
                    assert_eq!(
                        &Value::String(String::from("https://example.org/tours/2.html")),
                        &pagination["prev"],
                    );
                }
                other => panic!("expected pagination object, got {:?}", other),
            },
            other => panic!("expected page object, got {:?}", other),
        }
    }

    #[test]
    fn test_card_placeholder_images_cycle() {
        let tour = Tour {
            title: String::from("Svaneti towers"),
            slug: String::from("svaneti-towers"),
            price_base: None,
            region: None,
            duration_days: None,
            description_short: None,
            tour_type: None,
            cover_photo: None,
            average_rating: None,
        };
        for (index, expected) in [(0, "images/tour1.jpg"), (7, "images/tour8.jpg"), (8, "images/tour1.jpg")] {
            match card_value(&tour, index) {
                Value::Object(fields) => {
                    assert_eq!(&Value::String(String::from(expected)), &fields["image"]);
                }
                other => panic!("expected card object, got {:?}", other),
            }
        }
    }
}
