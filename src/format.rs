//! Display formatting for post metadata and tour cards: view counts, dates,
//! prices, durations, and tour-type labels.

use chrono::NaiveDate;

/// Formats a view count for post cards and sidebars. Counts of a thousand or
/// more collapse to one decimal with a `k` suffix (`1420` becomes `1.4k`);
/// smaller counts pass through unchanged.
pub fn views(views: u64) -> String {
    if views >= 1000 {
        format!("{:.1}k", views as f64 / 1000.0)
    } else {
        views.to_string()
    }
}

/// Formats a `YYYY-MM-DD` post date as long-form text (`January 10, 2026`).
/// Dates are validated at parse time, so an unparseable string here only
/// happens for hand-built values; those pass through unchanged rather than
/// aborting a page render.
pub fn date(date: &str) -> String {
    match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        Ok(parsed) => parsed.format("%B %-d, %Y").to_string(),
        Err(_) => date.to_owned(),
    }
}

/// Formats a decimal price string from the tour API (`"25000.00"`) as grouped
/// whole rubles (`25 000 ₽`). The fractional part is dropped; anything that
/// isn't a plain decimal is shown as-is with the currency suffix.
pub fn price(raw: &str) -> String {
    let whole = match raw.split('.').next() {
        Some(whole) => whole,
        None => raw,
    };
    if whole.is_empty() || !whole.bytes().all(|b| b.is_ascii_digit()) {
        return format!("{} ₽", raw);
    }

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }
    format!("{} ₽", grouped)
}

/// Formats a tour duration in days with English pluralization.
pub fn days(days: u64) -> String {
    if days == 1 {
        String::from("1 day")
    } else {
        format!("{} days", days)
    }
}

/// Maps the API's tour-type identifiers to display labels. Unknown
/// identifiers are shown raw, matching how the catalog treats the tour record
/// as opaque.
pub fn tour_type(raw: &str) -> &str {
    match raw {
        "bus_group" => "Group bus tour",
        "bus_small" => "Small group bus tour",
        "individual" => "Private tour",
        other => other,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_views_under_a_thousand_unchanged() {
        assert_eq!("500", views(500));
        assert_eq!("0", views(0));
        assert_eq!("999", views(999));
    }

    #[test]
    fn test_views_collapse_to_k() {
        assert_eq!("1.4k", views(1420));
        assert_eq!("1.0k", views(1000));
        assert_eq!("3.2k", views(3200));
        assert_eq!("2.9k", views(2890));
    }

    #[test]
    fn test_date_long_form() {
        assert_eq!("January 10, 2026", date("2026-01-10"));
        assert_eq!("December 30, 2025", date("2025-12-30"));
    }

    #[test]
    fn test_date_fallback_on_garbage() {
        assert_eq!("someday", date("someday"));
    }

    #[test]
    fn test_price_grouping() {
        assert_eq!("25 000 ₽", price("25000.00"));
        assert_eq!("900 ₽", price("900"));
        assert_eq!("1 250 000 ₽", price("1250000.50"));
    }

    #[test]
    fn test_price_fallback_on_garbage() {
        assert_eq!("on request ₽", price("on request"));
    }

    #[test]
    fn test_days_pluralization() {
        assert_eq!("1 day", days(1));
        assert_eq!("2 days", days(2));
        assert_eq!("10 days", days(10));
    }

    #[test]
    fn test_tour_type_labels() {
        assert_eq!("Group bus tour", tour_type("bus_group"));
        assert_eq!("Small group bus tour", tour_type("bus_small"));
        assert_eq!("Private tour", tour_type("individual"));
        assert_eq!("helicopter", tour_type("helicopter"));
    }
}
