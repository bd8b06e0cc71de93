//! Horizontal image carousel.
//!
//! The page scrolls natively; this widget only decides how far one step is
//! and whether the previous/next buttons are usable. The host reports layout
//! through [`ScrollMetrics`] on scroll and on resize.

use crate::dom::{Document, NodeId};
use crate::nav::Key;
use regex::Regex;
use std::sync::LazyLock;

/// Pixels of slack at either end before a button counts as at the edge.
pub const EDGE_TOLERANCE: f64 = 2.0;
/// Step width used when the carousel has no `.slide` to measure.
pub const DEFAULT_SLIDE_WIDTH: f64 = 400.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

impl Direction {
    fn sign(self) -> f64 {
        match self {
            Direction::Previous => -1.0,
            Direction::Next => 1.0,
        }
    }
}

/// Layout facts reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub scroll_left: f64,
    pub scroll_width: f64,
    pub client_width: f64,
    /// Width of the first `.slide`, if there is one.
    pub slide_width: Option<f64>,
    /// Computed CSS `gap`, parsed with [`parse_gap`].
    pub gap: f64,
}

impl ScrollMetrics {
    pub fn max_scroll_left(&self) -> f64 {
        self.scroll_width - self.client_width
    }

    pub fn at_start(&self) -> bool {
        self.scroll_left <= EDGE_TOLERANCE
    }

    pub fn at_end(&self) -> bool {
        self.scroll_left >= self.max_scroll_left() - EDGE_TOLERANCE
    }

    /// One slide plus the gap after it.
    pub fn step(&self) -> f64 {
        self.slide_width.unwrap_or(DEFAULT_SLIDE_WIDTH) + self.gap
    }
}

static LEADING_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").unwrap());

/// Parse a computed CSS gap the way `parseFloat` does: the longest numeric
/// prefix counts, exponent included (`"16px"` → 16, `"1e1px"` → 10), and
/// anything unparsable or non-finite is 0.
pub fn parse_gap(value: &str) -> f64 {
    LEADING_NUMBER_RE
        .find(value.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy)]
pub struct Carousel {
    track: NodeId,
    prev: NodeId,
    next: NodeId,
    metrics: ScrollMetrics,
}

impl Carousel {
    /// Bind to `#galleryCarousel` and its two buttons. `None` if any is
    /// missing.
    pub fn attach(doc: &Document) -> Option<Self> {
        Some(Self {
            track: doc.query("#galleryCarousel")?,
            prev: doc.query("[data-carousel-prev]")?,
            next: doc.query("[data-carousel-next]")?,
            metrics: ScrollMetrics::default(),
        })
    }

    pub fn track(&self) -> NodeId {
        self.track
    }

    pub fn metrics(&self) -> ScrollMetrics {
        self.metrics
    }

    pub fn button(&self, direction: Direction) -> NodeId {
        match direction {
            Direction::Previous => self.prev,
            Direction::Next => self.next,
        }
    }

    /// Which button, if any, `target` belongs to.
    pub fn button_for(&self, doc: &Document, target: NodeId) -> Option<Direction> {
        if doc.contains(self.prev, target) {
            Some(Direction::Previous)
        } else if doc.contains(self.next, target) {
            Some(Direction::Next)
        } else {
            None
        }
    }

    /// Disable the buttons at the scroll extremes.
    pub fn update_buttons(&self, doc: &mut Document) {
        doc.set_flag(self.prev, "disabled", self.metrics.at_start());
        doc.set_flag(self.next, "disabled", self.metrics.at_end());
    }

    /// Replace the layout snapshot and refresh the buttons.
    pub fn set_metrics(&mut self, doc: &mut Document, metrics: ScrollMetrics) {
        self.metrics = metrics;
        self.update_buttons(doc);
    }

    pub fn on_scroll(&mut self, doc: &mut Document, scroll_left: f64) {
        self.metrics.scroll_left = scroll_left;
        self.update_buttons(doc);
    }

    pub fn on_resize(&mut self, doc: &mut Document, scroll_width: f64, client_width: f64) {
        self.metrics.scroll_width = scroll_width;
        self.metrics.client_width = client_width;
        self.update_buttons(doc);
    }

    /// Signed scroll distance for one step in `direction`.
    pub fn scroll_step(&self, direction: Direction) -> f64 {
        direction.sign() * self.metrics.step()
    }

    /// Arrow keys step while the carousel has focus.
    pub fn key_down(&self, key: Key) -> Option<f64> {
        match key {
            Key::ArrowLeft => Some(self.scroll_step(Direction::Previous)),
            Key::ArrowRight => Some(self.scroll_step(Direction::Next)),
            _ => None,
        }
    }
}
