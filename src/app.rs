//! Page startup and event routing.
//!
//! [`App`] owns the live document and every widget bound to it. A host feeds
//! it [`Event`]s and applies the returned [`Outcome`] where a side effect
//! lives outside the document (scrolling the carousel, for instance).
//!
//! Startup order matters: identity values and theme first, then sections,
//! then the language pass (which re-renders sections once more in its
//! completion callback), and widgets last so they bind to final markup.

use crate::carousel::{Carousel, ScrollMetrics};
use crate::contact::{ContactForm, FormStatus, Transport};
use crate::dom::{Document, NodeId};
use crate::hero::HeroSlider;
use crate::i18n::Localizer;
use crate::localize::apply_language;
use crate::nav::{Key, Nav};
use crate::prefs::{PreferenceStore, save_lang, saved_lang};
use crate::pricing::{PricingConfig, Renderer};
use crate::site_config::{SiteConfig, apply_footer_year, apply_site_config};
use crate::theme::ThemeToggle;
use crate::types::{Lang, PageContext, Theme};
use std::time::Duration;

/// Facts about the browsing environment known at startup.
#[derive(Debug, Clone, Default)]
pub struct Environment {
    /// `prefers-color-scheme: light` matched.
    pub prefers_light: bool,
    /// `prefers-reduced-motion: reduce` matched.
    pub reduced_motion: bool,
    pub page_url: String,
    /// Current calendar year for `[data-year]`; `None` leaves the markup as is.
    pub year: Option<i32>,
}

/// Loaded configuration the page is rendered from.
#[derive(Debug, Clone)]
pub struct Resources {
    pub localizer: Localizer,
    pub pricing: PricingConfig,
    pub site: SiteConfig,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    Click(NodeId),
    KeyDown { target: NodeId, key: Key },
    PointerDown(NodeId),
    CarouselScroll { scroll_left: f64 },
    CarouselResize { scroll_width: f64, client_width: f64 },
    CarouselLayout(ScrollMetrics),
    VisibilityChange { hidden: bool, now: Duration },
    Tick(Duration),
    Submit(NodeId),
}

/// Effects the host has to carry out.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Nothing,
    /// Smoothly scroll the carousel track by this many pixels.
    ScrollCarousel(f64),
    Contact(FormStatus),
}

#[derive(Debug, Clone)]
struct Widgets {
    nav: Option<Nav>,
    lang_toggle: Option<NodeId>,
    theme: ThemeToggle,
    carousel: Option<Carousel>,
    hero: Option<HeroSlider>,
    contact: Option<ContactForm>,
}

pub struct App {
    doc: Document,
    resources: Resources,
    prefs: Box<dyn PreferenceStore>,
    transport: Box<dyn Transport>,
    ctx: PageContext,
    widgets: Widgets,
    page_url: String,
}

fn render_sections(doc: &mut Document, resources: &Resources, lang: Lang) {
    Renderer::new(&resources.pricing, &resources.site, &resources.localizer).render_all(doc, lang);
}

impl App {
    /// Bring a freshly loaded page to its interactive state.
    pub fn init(
        mut doc: Document,
        resources: Resources,
        prefs: Box<dyn PreferenceStore>,
        transport: Box<dyn Transport>,
        env: Environment,
        now: Duration,
    ) -> Self {
        apply_site_config(&mut doc, &resources.site);
        if let Some(year) = env.year {
            apply_footer_year(&mut doc, year);
        }
        let theme = ThemeToggle::init(&mut doc, prefs.as_ref(), env.prefers_light);

        let lang = saved_lang(prefs.as_ref());
        render_sections(&mut doc, &resources, lang);
        apply_language(&mut doc, lang, &resources.localizer, |doc, lang| {
            render_sections(doc, &resources, lang)
        });

        let widgets = Widgets {
            nav: Nav::attach(&doc),
            lang_toggle: doc.query("[data-lang-toggle]"),
            theme,
            carousel: Carousel::attach(&doc),
            hero: HeroSlider::attach(&mut doc, env.reduced_motion, now),
            contact: ContactForm::attach(&doc),
        };
        if let Some(carousel) = &widgets.carousel {
            carousel.update_buttons(&mut doc);
        }
        tracing::debug!(lang = %lang, theme = %theme.theme(), "page initialized");

        Self {
            doc,
            resources,
            prefs,
            transport,
            ctx: PageContext {
                lang,
                theme: theme.theme(),
            },
            widgets,
            page_url: env.page_url,
        }
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn context(&self) -> PageContext {
        self.ctx
    }

    pub fn hero(&self) -> Option<&HeroSlider> {
        self.widgets.hero.as_ref()
    }

    /// Flip the language, persist it and re-localize the page.
    pub fn toggle_language(&mut self) -> Lang {
        let lang = self.ctx.lang.toggled();
        self.set_language(lang);
        lang
    }

    pub fn set_language(&mut self, lang: Lang) {
        save_lang(self.prefs.as_mut(), lang);
        self.ctx.lang = lang;
        let resources = &self.resources;
        apply_language(&mut self.doc, lang, &resources.localizer, |doc, lang| {
            render_sections(doc, resources, lang)
        });
    }

    pub fn toggle_theme(&mut self) -> Theme {
        let theme = self.widgets.theme.toggle(&mut self.doc, self.prefs.as_mut());
        self.ctx.theme = theme;
        theme
    }

    /// Route one event to the widget that owns its target.
    pub fn handle(&mut self, event: Event) -> Outcome {
        match event {
            Event::Click(target) => self.click(target),
            Event::KeyDown { target, key } => self.key_down(target, key),
            Event::PointerDown(target) => {
                if let Some(nav) = self.widgets.nav {
                    nav.pointer_down(&mut self.doc, target);
                }
                Outcome::Nothing
            }
            Event::CarouselScroll { scroll_left } => {
                if let Some(carousel) = &mut self.widgets.carousel {
                    carousel.on_scroll(&mut self.doc, scroll_left);
                }
                Outcome::Nothing
            }
            Event::CarouselResize {
                scroll_width,
                client_width,
            } => {
                if let Some(carousel) = &mut self.widgets.carousel {
                    carousel.on_resize(&mut self.doc, scroll_width, client_width);
                }
                Outcome::Nothing
            }
            Event::CarouselLayout(metrics) => {
                if let Some(carousel) = &mut self.widgets.carousel {
                    carousel.set_metrics(&mut self.doc, metrics);
                }
                Outcome::Nothing
            }
            Event::VisibilityChange { hidden, now } => {
                if let Some(hero) = &mut self.widgets.hero {
                    hero.visibility_changed(&mut self.doc, hidden, now);
                }
                Outcome::Nothing
            }
            Event::Tick(now) => {
                if let Some(hero) = &mut self.widgets.hero {
                    hero.tick(&mut self.doc, now);
                }
                Outcome::Nothing
            }
            Event::Submit(target) => self.submit(target),
        }
    }

    fn within(&self, container: Option<NodeId>, target: NodeId) -> bool {
        container.is_some_and(|c| self.doc.contains(c, target))
    }

    fn click(&mut self, target: NodeId) -> Outcome {
        if self.within(self.widgets.lang_toggle, target) {
            self.toggle_language();
            return Outcome::Nothing;
        }
        if self.within(self.widgets.theme.button(), target) {
            self.toggle_theme();
            return Outcome::Nothing;
        }
        if let Some(nav) = self.widgets.nav {
            if self.doc.contains(nav.toggle_button(), target) {
                nav.toggle(&mut self.doc);
                return Outcome::Nothing;
            }
            if nav.is_menu_link(&self.doc, target) {
                nav.link_clicked(&mut self.doc);
                return Outcome::Nothing;
            }
        }
        if let Some(carousel) = &self.widgets.carousel
            && let Some(direction) = carousel.button_for(&self.doc, target)
        {
            if !self.doc.has_attr(carousel.button(direction), "disabled") {
                return Outcome::ScrollCarousel(carousel.scroll_step(direction));
            }
        }
        Outcome::Nothing
    }

    fn key_down(&mut self, target: NodeId, key: Key) -> Outcome {
        if let Some(nav) = self.widgets.nav {
            nav.key_down(&mut self.doc, key);
        }
        if let Some(carousel) = &self.widgets.carousel
            && self.doc.contains(carousel.track(), target)
            && let Some(delta) = carousel.key_down(key)
        {
            return Outcome::ScrollCarousel(delta);
        }
        Outcome::Nothing
    }

    fn submit(&mut self, target: NodeId) -> Outcome {
        let Some(form) = self.widgets.contact else {
            return Outcome::Nothing;
        };
        if form.form() != target {
            return Outcome::Nothing;
        }
        let status = form.submit(
            &mut self.doc,
            self.ctx.lang,
            &self.resources.localizer,
            &self.resources.site.contact_endpoint,
            &self.page_url,
            self.transport.as_ref(),
        );
        Outcome::Contact(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contact::{ContactPayload, Delivery, TransportError};
    use crate::prefs::{LANG_KEY, MemoryStore};
    use crate::test_helpers::*;

    struct AcceptAll;

    impl Transport for AcceptAll {
        fn post_json(&self, _: &str, _: &ContactPayload) -> Result<Delivery, TransportError> {
            Ok(Delivery::Accepted)
        }
    }

    fn resources() -> Resources {
        Resources {
            localizer: sample_localizer(),
            pricing: sample_pricing(),
            site: sample_site(),
        }
    }

    fn app_with(store: MemoryStore, env: Environment) -> App {
        App::init(
            sample_page(),
            resources(),
            Box::new(store),
            Box::new(AcceptAll),
            env,
            Duration::ZERO,
        )
    }

    fn app() -> App {
        app_with(MemoryStore::new(), Environment::default())
    }

    fn packages_title(app: &App) -> String {
        let doc = app.document();
        let mount = doc.query("[data-pricing]").unwrap();
        let title = doc.query_within(mount, "[data-i18n='pricing.basic.title']").unwrap();
        doc.text(title)
    }

    #[test]
    fn init_renders_sections_in_saved_language() {
        let app = app_with(MemoryStore::new().with(LANG_KEY, "en"), Environment::default());
        assert_eq!(app.context().lang, Lang::En);
        assert_eq!(app.document().attr(app.document().root(), "lang"), Some("en"));
        assert_eq!(packages_title(&app), "Basic wash");
    }

    #[test]
    fn init_defaults_to_swedish_and_dark() {
        let app = app();
        assert_eq!(app.context(), PageContext::default());
        assert_eq!(packages_title(&app), "Bastvätt");
        assert_eq!(app.document().attr(app.document().root(), "data-theme"), Some("dark"));
    }

    #[test]
    fn clicking_language_toggle_rerenders_sections() {
        let mut app = app();
        let toggle = app.document().query("[data-lang-toggle]").unwrap();
        app.handle(Event::Click(toggle));
        assert_eq!(app.context().lang, Lang::En);
        assert_eq!(packages_title(&app), "Basic wash");

        app.handle(Event::Click(toggle));
        assert_eq!(packages_title(&app), "Bastvätt");
    }

    #[test]
    fn clicking_theme_toggle_flips_theme() {
        let mut app = app();
        let icon = app.document().query("[data-theme-icon='sun']").unwrap();
        app.handle(Event::Click(icon));
        assert_eq!(app.context().theme, Theme::Light);
    }

    #[test]
    fn nav_toggle_and_link_clicks() {
        let mut app = app();
        let toggle = app.document().query(".navToggle").unwrap();
        let links = app.document().query(".navLinks").unwrap();
        let link = app.document().query_within(links, "a").unwrap();

        app.handle(Event::Click(toggle));
        assert_eq!(app.document().attr(links, "data-open"), Some("true"));
        app.handle(Event::Click(link));
        assert_eq!(app.document().attr(links, "data-open"), Some("false"));
    }

    #[test]
    fn carousel_buttons_scroll_unless_disabled() {
        let mut app = app();
        app.handle(Event::CarouselLayout(ScrollMetrics {
            scroll_left: 0.0,
            scroll_width: 2000.0,
            client_width: 800.0,
            slide_width: Some(300.0),
            gap: 20.0,
        }));
        let prev = app.document().query("[data-carousel-prev]").unwrap();
        let next = app.document().query("[data-carousel-next]").unwrap();

        assert_eq!(app.handle(Event::Click(prev)), Outcome::Nothing);
        assert_eq!(app.handle(Event::Click(next)), Outcome::ScrollCarousel(320.0));
    }

    #[test]
    fn arrow_keys_only_scroll_when_track_focused() {
        let mut app = app();
        let track = app.document().query("#galleryCarousel").unwrap();
        let elsewhere = app.document().query("[data-pricing]").unwrap();
        assert_eq!(
            app.handle(Event::KeyDown {
                target: elsewhere,
                key: Key::ArrowRight
            }),
            Outcome::Nothing
        );
        assert!(matches!(
            app.handle(Event::KeyDown {
                target: track,
                key: Key::ArrowRight
            }),
            Outcome::ScrollCarousel(_)
        ));
    }

    #[test]
    fn ticks_advance_hero() {
        let mut app = app();
        app.handle(Event::Tick(Duration::from_secs(5)));
        assert_eq!(app.hero().map(HeroSlider::index), Some(1));
    }

    #[test]
    fn reduced_motion_keeps_hero_still() {
        let env = Environment {
            reduced_motion: true,
            ..Environment::default()
        };
        let mut app = app_with(MemoryStore::new(), env);
        app.handle(Event::Tick(Duration::from_secs(60)));
        assert_eq!(app.hero().map(HeroSlider::index), Some(0));
    }

    #[test]
    fn host_year_fills_footer() {
        let app = app_with(
            MemoryStore::new(),
            Environment {
                year: Some(2026),
                ..Environment::default()
            },
        );
        let year = app.document().query("[data-year]").unwrap();
        assert_eq!(app.document().text(year), "2026");

        let untouched = app_with(MemoryStore::new(), Environment::default());
        let year = untouched.document().query("[data-year]").unwrap();
        assert_eq!(untouched.document().text(year), "2024");
    }

    #[test]
    fn submit_goes_through_contact_form() {
        let mut app = app();
        let form = app.document().query("[data-contact-form]").unwrap();
        // Nothing filled in.
        assert_eq!(app.handle(Event::Submit(form)), Outcome::Contact(FormStatus::Missing));
    }
}
