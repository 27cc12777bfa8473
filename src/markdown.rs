//! Converts post bodies from markdown to HTML while collecting the table of
//! contents. The conversion works by rewriting the [`pulldown_cmark`] event
//! stream before rendering: every `##` and `###` heading is replaced with an
//! anchored equivalent carrying the id `section-{i}`, and its text is
//! captured as a TOC entry. Everything else passes through to the standard
//! HTML renderer untouched.

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// A single table-of-contents entry. `sub` marks `###` headings, which the
/// templates render indented below their `##` parents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Heading {
    pub id: String,
    pub title: String,
    pub sub: bool,
}

/// Renders `markdown` to HTML and returns the rendered body together with the
/// collected table of contents. Headings outside the `##`/`###` range keep
/// their default rendering and never appear in the TOC.
pub fn to_html(markdown: &str) -> (String, Vec<Heading>) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_SMART_PUNCTUATION);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut toc: Vec<Heading> = Vec::new();
    let mut in_heading = false;
    let mut events: Vec<Event> = Vec::new();

    for ev in Parser::new_ext(markdown, options) {
        match ev {
            Event::Start(Tag::Heading(level)) if (2..=3).contains(&level) => {
                let id = format!("section-{}", toc.len());
                events.push(Event::Html(CowStr::from(format!(
                    r#"<h{} id="{}">"#,
                    level, id
                ))));
                toc.push(Heading {
                    id,
                    title: String::new(),
                    sub: level == 3,
                });
                in_heading = true;
            }
            Event::End(Tag::Heading(level)) if (2..=3).contains(&level) => {
                events.push(Event::Html(CowStr::from(format!("</h{}>", level))));
                in_heading = false;
            }
            Event::Text(text) => {
                if in_heading {
                    if let Some(entry) = toc.last_mut() {
                        entry.title.push_str(&text);
                    }
                }
                events.push(Event::Text(text));
            }
            Event::Code(code) => {
                if in_heading {
                    if let Some(entry) = toc.last_mut() {
                        entry.title.push_str(&code);
                    }
                }
                events.push(Event::Code(code));
            }
            Event::SoftBreak => {
                if in_heading {
                    if let Some(entry) = toc.last_mut() {
                        entry.title.push(' ');
                    }
                }
                events.push(Event::SoftBreak);
            }
            other => events.push(other),
        }
    }

    let mut body = String::new();
    html::push_html(&mut body, events.into_iter());
    (body, toc)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_heading_anchors_and_toc() {
        let (body, toc) = to_html("## First stop\n\nsome text\n\n### A detour\n\n## Last stop\n");
        assert!(body.contains(r#"<h2 id="section-0">First stop</h2>"#));
        assert!(body.contains(r#"<h3 id="section-1">A detour</h3>"#));
        assert!(body.contains(r#"<h2 id="section-2">Last stop</h2>"#));
        assert_eq!(
            vec![
                Heading {
                    id: String::from("section-0"),
                    title: String::from("First stop"),
                    sub: false,
                },
                Heading {
                    id: String::from("section-1"),
                    title: String::from("A detour"),
                    sub: true,
                },
                Heading {
                    id: String::from("section-2"),
                    title: String::from("Last stop"),
                    sub: false,
                },
            ],
            toc,
        );
    }

    #[test]
    fn test_top_level_headings_stay_out_of_the_toc() {
        let (body, toc) = to_html("# Title\n\n#### Deep\n");
        assert!(toc.is_empty());
        assert!(body.contains("<h1>Title</h1>"));
        assert!(body.contains("<h4>Deep</h4>"));
    }

    #[test]
    fn test_no_headings_means_empty_toc() {
        let (body, toc) = to_html("Just a paragraph.");
        assert!(toc.is_empty());
        assert!(body.contains("<p>Just a paragraph.</p>"));
    }

    #[test]
    fn test_code_span_in_heading_title() {
        let (_, toc) = to_html("## Using `curl` on the road\n");
        assert_eq!("Using curl on the road", toc[0].title);
    }
}
