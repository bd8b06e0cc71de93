//! Hero image slider.
//!
//! Cycles through `.heroSlide` elements on a fixed interval. Time is supplied
//! by the host as the elapsed [`Duration`] since page load, so the slider has
//! no clock of its own and is deterministic under test.
//!
//! There is at most one live timer per slider: [`HeroSlider::start`] always
//! clears the previous one before scheduling.

use crate::dom::{Document, NodeId};
use std::time::Duration;

pub const SLIDE_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct HeroSlider {
    slides: Vec<NodeId>,
    index: usize,
    /// Due time of the next advance while the timer is live.
    next_due: Option<Duration>,
    reduced_motion: bool,
}

impl HeroSlider {
    /// Bind to the slides under `[data-hero-slides]`, show the first one and
    /// start cycling. `None` when there are no slides.
    pub fn attach(doc: &mut Document, reduced_motion: bool, now: Duration) -> Option<Self> {
        let root = doc.query("[data-hero-slides]")?;
        let slides = doc.query_all_within(root, ".heroSlide");
        if slides.is_empty() {
            return None;
        }
        let mut slider = Self {
            slides,
            index: 0,
            next_due: None,
            reduced_motion,
        };
        slider.show(doc, 0);
        slider.start(doc, now);
        Some(slider)
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn is_running(&self) -> bool {
        self.next_due.is_some()
    }

    /// Mark slide `i` active and hide the others from assistive tech.
    pub fn show(&self, doc: &mut Document, i: usize) {
        for (idx, &slide) in self.slides.iter().enumerate() {
            let active = idx == i;
            doc.toggle_class(slide, "is-active", active);
            doc.set_attr(slide, "aria-hidden", if active { "false" } else { "true" });
        }
    }

    /// (Re)start cycling. With reduced motion the first slide is shown and
    /// no timer is created.
    pub fn start(&mut self, doc: &mut Document, now: Duration) {
        self.stop();
        if self.slides.len() <= 1 {
            return;
        }
        if self.reduced_motion {
            self.show(doc, 0);
            return;
        }
        self.next_due = Some(now + SLIDE_INTERVAL);
    }

    pub fn stop(&mut self) {
        self.next_due = None;
    }

    /// Hidden documents stop cycling; visible ones resume.
    pub fn visibility_changed(&mut self, doc: &mut Document, hidden: bool, now: Duration) {
        if hidden {
            self.stop();
        } else {
            self.start(doc, now);
        }
    }

    /// Advance once per elapsed interval.
    pub fn tick(&mut self, doc: &mut Document, now: Duration) {
        while let Some(due) = self.next_due {
            if now < due {
                break;
            }
            self.index = (self.index + 1) % self.slides.len();
            self.show(doc, self.index);
            self.next_due = Some(due + SLIDE_INTERVAL);
        }
    }
}
