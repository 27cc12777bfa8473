//! Hero slider state. The carousel is a single index over a fixed slide list,
//! advanced either by an autoplay interval or by explicit navigation. Manual
//! navigation always restarts the interval, and a restart invalidates every
//! tick scheduled under the previous interval, so only one schedule is ever
//! live. [`hero_value`] renders the slide list for the index templates with
//! slide 0 active.

use gtmpl::Value;
use url::Url;

use crate::value;

/// The autoplay interval the pages default to when the project config doesn't
/// override it.
pub const DEFAULT_INTERVAL_MS: u64 = 5000;

/// A wrap-around cursor over `len` slides.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Carousel {
    current: usize,
    len: usize,
}

impl Carousel {
    /// Creates a carousel starting at slide 0. Returns `None` for an empty
    /// slide list; there is nothing to cycle.
    pub fn new(len: usize) -> Option<Carousel> {
        if len == 0 {
            None
        } else {
            Some(Carousel { current: 0, len })
        }
    }

    pub fn current(&self) -> usize {
        self.current
    }

    /// Advances to the next slide, wrapping from the last slide back to 0.
    pub fn next(&mut self) -> usize {
        self.current = (self.current + 1) % self.len;
        self.current
    }

    /// Retreats to the previous slide, wrapping from slide 0 to the last.
    pub fn prev(&mut self) -> usize {
        self.current = (self.current + self.len - 1) % self.len;
        self.current
    }

    /// Jumps to slide `index`. Out-of-range indices wrap.
    pub fn go_to(&mut self, index: usize) -> usize {
        self.current = index % self.len;
        self.current
    }
}

/// A carousel under autoplay. Each (re)start of the interval bumps an epoch;
/// ticks stamped with an older epoch belong to a cleared interval and are
/// ignored. This encodes the "stop the old timer before starting a new one"
/// convention.
#[derive(Clone, Copy, Debug)]
pub struct Slideshow {
    carousel: Carousel,
    epoch: u64,
    paused: bool,
}

impl Slideshow {
    pub fn new(carousel: Carousel) -> Slideshow {
        Slideshow {
            carousel,
            epoch: 0,
            paused: false,
        }
    }

    pub fn current(&self) -> usize {
        self.carousel.current()
    }

    /// The epoch of the currently live interval. A tick fired under any other
    /// epoch is stale.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// An interval tick. Advances only if the tick belongs to the live
    /// interval and the show isn't paused.
    pub fn tick(&mut self, epoch: u64) {
        if epoch == self.epoch && !self.paused {
            self.carousel.next();
        }
    }

    /// A click on the "next" arrow: advance, then restart the interval.
    /// Returns the new epoch.
    pub fn click_next(&mut self) -> u64 {
        self.carousel.next();
        self.restart()
    }

    /// A click on the "prev" arrow: retreat, then restart the interval.
    pub fn click_prev(&mut self) -> u64 {
        self.carousel.prev();
        self.restart()
    }

    /// A click on an indicator dot: jump, then restart the interval.
    pub fn click_dot(&mut self, index: usize) -> u64 {
        self.carousel.go_to(index);
        self.restart()
    }

    /// Pointer entered the hero section: hold in place until [`resume`].
    ///
    /// [`resume`]: Slideshow::resume
    pub fn pause(&mut self) {
        self.paused = true;
    }

    /// Pointer left the hero section: restart the interval.
    pub fn resume(&mut self) -> u64 {
        self.paused = false;
        self.restart()
    }

    fn restart(&mut self) -> u64 {
        self.epoch += 1;
        self.epoch
    }
}

/// Renders the hero block for index templates: one entry per slide (slide 0
/// active), the indicator count implied by the slide list, and the autoplay
/// interval as page data. Returns `None` when no slides are configured, in
/// which case the templates skip the hero section entirely.
pub fn hero_value(slides: &[String], static_url: &Url, interval_ms: u64) -> Option<Value> {
    let carousel = Carousel::new(slides.len())?;
    let rendered: Vec<Value> = slides
        .iter()
        .enumerate()
        .map(|(i, slide)| {
            value::object(vec![
                (
                    "url",
                    match static_url.join(slide) {
                        Ok(url) => Value::String(url.to_string()),
                        Err(_) => Value::String(slide.clone()),
                    },
                ),
                ("active", Value::from(i == carousel.current())),
            ])
        })
        .collect();
    Some(value::object(vec![
        ("slides", Value::Array(rendered)),
        ("interval_ms", Value::from(interval_ms)),
    ]))
}

#[cfg(test)]
mod test {
    use super::*;

    fn show(len: usize) -> Slideshow {
        Slideshow::new(Carousel::new(len).unwrap())
    }

    #[test]
    fn test_next_wraps_to_zero() {
        let mut carousel = Carousel::new(4).unwrap();
        carousel.go_to(3);
        assert_eq!(0, carousel.next());
    }

    #[test]
    fn test_prev_wraps_to_last() {
        let mut carousel = Carousel::new(4).unwrap();
        assert_eq!(3, carousel.prev());
    }

    #[test]
    fn test_full_cycle_returns_home() {
        let mut carousel = Carousel::new(3).unwrap();
        for _ in 0..3 {
            carousel.next();
        }
        assert_eq!(0, carousel.current());
    }

    #[test]
    fn test_empty_carousel_is_none() {
        assert!(Carousel::new(0).is_none());
    }

    #[test]
    fn test_stale_tick_is_ignored() {
        let mut show = show(4);
        let stale = show.epoch();
        show.click_next();
        show.tick(stale);
        assert_eq!(1, show.current());
    }

    #[test]
    fn test_live_tick_advances() {
        let mut show = show(4);
        let live = show.click_next();
        show.tick(live);
        assert_eq!(2, show.current());
    }

    #[test]
    fn test_pause_holds_resume_restarts() {
        let mut show = show(4);
        let before = show.epoch();
        show.pause();
        show.tick(before);
        assert_eq!(0, show.current());
        let live = show.resume();
        assert!(live > before);
        show.tick(live);
        assert_eq!(1, show.current());
    }

    #[test]
    fn test_dot_click_jumps_and_restarts() {
        let mut show = show(4);
        let before = show.epoch();
        let after = show.click_dot(2);
        assert_eq!(2, show.current());
        assert!(after > before);
    }

    #[test]
    fn test_hero_value_marks_first_slide_active() {
        let static_url = Url::parse("https://example.org/static/").unwrap();
        let hero = hero_value(
            &[String::from("images/hero-1.jpg"), String::from("images/hero-2.jpg")],
            &static_url,
            DEFAULT_INTERVAL_MS,
        )
        .unwrap();
        match hero {
            Value::Object(fields) => match &fields["slides"] {
                Value::Array(slides) => {
                    assert_eq!(2, slides.len());
                    match &slides[0] {
                        Value::Object(slide) => {
                            assert_eq!(&Value::from(true), &slide["active"]);
                            assert_eq!(
                                &Value::String(String::from(
                                    "https://example.org/static/images/hero-1.jpg"
                                )),
                                &slide["url"],
                            );
                        }
                        other => panic!("expected slide object, got {:?}", other),
                    }
                }
                other => panic!("expected slide array, got {:?}", other),
            },
            other => panic!("expected hero object, got {:?}", other),
        }
    }

    #[test]
    fn test_hero_value_empty_slides() {
        let static_url = Url::parse("https://example.org/static/").unwrap();
        assert!(hero_value(&[], &static_url, DEFAULT_INTERVAL_MS).is_none());
    }
}
