//! Shared test utilities for the store-onepager test suite.
//!
//! Provides a small but complete sample page, matching dictionaries, a
//! pricing config covering every section feature, and form helpers.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut doc = sample_page();
//! let pricing = sample_pricing();
//! let renderer = Renderer::new(&pricing, &sample_site(), &sample_localizer());
//! renderer.render_all(&mut doc, Lang::En);
//! ```

use std::collections::HashMap;

use crate::dom::{Document, el};
use crate::i18n::Localizer;
use crate::pricing::PricingConfig;
use crate::site_config::{SiteConfig, SiteEnv};
use crate::types::Lang;

// =========================================================================
// Configuration
// =========================================================================

/// Identity values with every default applied.
pub fn sample_site() -> SiteConfig {
    SiteConfig::resolve(&SiteEnv::default())
}

const SV: &[(&str, &str)] = &[
    ("sections.packages.title", "Tvättpaket"),
    ("sections.packages.badge", "Populärast"),
    ("sections.tires.badge", "Säsong"),
    ("sections.rekond.disclaimer", "Priset kan variera beroende på bilens skick."),
    ("discount.badge", "-10%"),
    ("discount.text", "Studentrabatt"),
    ("discount.note", "Visa giltig legitimation"),
    ("addons.wax", "Vax"),
    ("pricing.basic.title", "Bastvätt"),
    ("pricing.basic.subtitle", "Snabb och noggrann"),
    ("pricing.basic.l1", "Handtvätt utvändigt"),
    ("pricing.basic.l2", "Fälgrengöring"),
    ("pricing.premium.title", "Premium"),
    ("pricing.premium.subtitle", "Ut- och invändigt"),
    ("pricing.note.from", "från"),
    ("pricing.tires.swap.title", "Däckbyte"),
    ("pricing.tires.swap.subtitle", "Inklusive balansering"),
    ("pricing.rekond.full.title", "Helrekond"),
    ("pricing.rekond.full.subtitle", "Som ny"),
    ("cta.call", "Ring oss"),
    ("cta.book", "Boka"),
    ("form.name", "Ditt namn"),
    ("form.status.bot", "Tack!"),
    ("form.status.missing", "Fyll i alla fält."),
    ("form.status.misconfigured", "Formuläret är inte konfigurerat."),
    ("form.status.sending", "Skickar..."),
    ("form.status.success", "Tack! Vi hör av oss."),
    ("form.status.error", "Något gick fel."),
    ("form.status.network", "Nätverksfel, försök igen."),
];

/// English leaves a few keys out on purpose so fallback is exercised.
const EN: &[(&str, &str)] = &[
    ("sections.packages.title", "Wash packages"),
    ("sections.packages.badge", "Most popular"),
    ("sections.tires.badge", "Seasonal"),
    ("sections.rekond.disclaimer", "Prices may vary with vehicle condition."),
    ("discount.badge", "-10%"),
    ("discount.text", "Student discount"),
    ("addons.wax", "Wax"),
    ("pricing.basic.title", "Basic wash"),
    ("pricing.basic.subtitle", "Quick and thorough"),
    ("pricing.basic.l1", "Exterior hand wash"),
    ("pricing.basic.l2", "Rim cleaning"),
    ("pricing.premium.title", "Premium"),
    ("pricing.premium.subtitle", "Inside and out"),
    ("pricing.note.from", "from"),
    ("pricing.tires.swap.title", "Tire change"),
    ("pricing.tires.swap.subtitle", "Balancing included"),
    ("pricing.rekond.full.title", "Full detailing"),
    ("pricing.rekond.full.subtitle", "Like new"),
    ("cta.call", "Call us"),
    ("cta.book", "Book"),
    ("form.name", "Your name"),
    ("form.status.bot", "Thanks!"),
    ("form.status.missing", "Please fill in all fields."),
    ("form.status.misconfigured", "The form is not configured."),
    ("form.status.sending", "Sending..."),
    ("form.status.success", "Thanks! We will get back to you."),
    ("form.status.error", "Something went wrong."),
    ("form.status.network", "Network error, please try again."),
];

fn dictionary(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

pub fn sample_localizer() -> Localizer {
    Localizer::from_maps(HashMap::from([
        (Lang::Sv, dictionary(SV)),
        (Lang::En, dictionary(EN)),
    ]))
}

const PRICING_JSON: &str = r##"{
    "tagline": "pricing.tagline",
    "discount": {
        "enabled": true,
        "badgeKey": "discount.badge",
        "textKey": "discount.text",
        "noteKey": "discount.note"
    },
    "washPackages": {
        "sectionKey": "sections.packages.title",
        "badgeKey": "sections.packages.badge",
        "cards": [
            {
                "id": "basic",
                "titleKey": "pricing.basic.title",
                "subtitleKey": "pricing.basic.subtitle",
                "price": "299 kr",
                "time": "30 min",
                "listKeys": ["pricing.basic.l1", "pricing.basic.l2"],
                "cta": { "href": "tel:{phone}", "class": "btn btnGhost", "labelKey": "cta.call" }
            },
            {
                "id": "premium",
                "featured": true,
                "titleKey": "pricing.premium.title",
                "subtitleKey": "pricing.premium.subtitle",
                "price": "599 kr",
                "priceNote": "pricing.note.from",
                "listKeys": ["pricing.basic.l1"],
                "cta": { "href": "#contact", "class": "btn btnPrimary", "labelKey": "cta.book" }
            }
        ]
    },
    "addons": [
        { "id": "wax", "titleKey": "addons.wax", "price": "+149 kr" }
    ],
    "tireServices": {
        "sectionKey": "sections.tires.title",
        "badgeKey": "sections.tires.badge",
        "cards": [
            {
                "id": "swap",
                "featured": true,
                "titleKey": "pricing.tires.swap.title",
                "subtitleKey": "pricing.tires.swap.subtitle",
                "price": "499 kr",
                "cta": { "href": "tel:{phone}", "class": "btn", "labelKey": "cta.call" }
            }
        ]
    },
    "rekondServices": {
        "disclaimerKey": "sections.rekond.disclaimer",
        "cards": [
            {
                "id": "full",
                "titleKey": "pricing.rekond.full.title",
                "subtitleKey": "pricing.rekond.full.subtitle",
                "price": "2 495 kr",
                "priceNote": "pricing.note.from",
                "cta": { "href": "tel:{phone}", "class": "btn", "labelKey": "cta.call" }
            }
        ]
    }
}"##;

pub fn sample_pricing() -> PricingConfig {
    PricingConfig::from_json(PRICING_JSON).unwrap()
}

// =========================================================================
// Page
// =========================================================================

/// A page carrying every mount and widget the runtime binds to.
pub fn sample_page() -> Document {
    let header = el("header")
        .child(el("span").flag("data-site-name").text("Old name"))
        .child(
            el("button")
                .class("navToggle")
                .attr("aria-expanded", "false"),
        )
        .child(
            el("ul").class("navLinks").child(
                el("li").child(
                    el("a")
                        .attr("href", "#pricing")
                        .attr("data-i18n", "sections.packages.title"),
                ),
            ),
        )
        .child(
            el("button")
                .flag("data-lang-toggle")
                .child(el("span").attr("data-flag", "se"))
                .child(el("span").attr("data-flag", "gb").flag("hidden")),
        )
        .child(
            el("button")
                .flag("data-theme-toggle")
                .child(el("span").attr("data-theme-icon", "sun"))
                .child(el("span").attr("data-theme-icon", "moon").flag("hidden")),
        );

    let hero = el("section").class("hero").child(
        el("div")
            .flag("data-hero-slides")
            .child(el("div").class("heroSlide"))
            .child(el("div").class("heroSlide"))
            .child(el("div").class("heroSlide")),
    );

    let pricing = el("section")
        .attr("id", "pricing")
        .child(el("h2").attr("data-i18n", "sections.packages.title"))
        .child(el("div").flag("data-pricing"))
        .child(el("div").flag("data-tires"))
        .child(el("div").flag("data-rekond"));

    let gallery = el("section")
        .class("gallery")
        .child(el("button").flag("data-carousel-prev").child(el("span").text("‹")))
        .child(
            el("div")
                .attr("id", "galleryCarousel")
                .attr("tabindex", "0")
                .child(el("div").class("slide"))
                .child(el("div").class("slide")),
        )
        .child(el("button").flag("data-carousel-next").child(el("span").text("›")));

    let contact = el("form")
        .flag("data-contact-form")
        .child(
            el("input")
                .attr("name", "name")
                .attr("value", "")
                .attr("data-i18n-attr", "placeholder:form.name"),
        )
        .child(el("input").attr("name", "email").attr("type", "email").attr("value", ""))
        .child(el("textarea").attr("name", "message"))
        .child(
            el("input")
                .attr("name", "bot-field")
                .attr("value", "")
                .flag("hidden"),
        )
        .child(el("button").attr("type", "submit").text("Skicka"))
        .child(el("p").class("formStatus").flag("hidden"));

    let footer = el("footer")
        .child(el("a").flag("data-phone").attr("href", "tel:000").text("000"))
        .child(el("a").flag("data-email").attr("href", "mailto:old@example.com"))
        .child(el("span").flag("data-address"))
        .child(el("span").flag("data-year").text("2024"));

    Document::from_root(
        el("html").child(
            el("body")
                .child(header)
                .child(hero)
                .child(pricing)
                .child(gallery)
                .child(contact)
                .child(footer),
        ),
    )
}

/// Type into the contact form of [`sample_page`].
pub fn fill_form(doc: &mut Document, name: &str, email: &str, message: &str, bot: &str) {
    let form = doc.query("[data-contact-form]").unwrap();
    for (field, value) in [("name", name), ("email", email), ("bot-field", bot)] {
        let input = doc.query_within(form, &format!("[name='{field}']")).unwrap();
        doc.set_attr(input, "value", value);
    }
    let textarea = doc.query_within(form, "textarea").unwrap();
    doc.set_text(textarea, message);
}
