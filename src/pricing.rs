//! Config-driven pricing sections.
//!
//! The three service sections of the page (wash packages, tire services,
//! interior reconditioning) are described declaratively in
//! `pricing.config.json` and rendered by the same card renderer:
//!
//! ```json
//! {
//!   "discount": { "enabled": true, "badgeKey": "...", "textKey": "...", "noteKey": "..." },
//!   "washPackages": {
//!     "badgeKey": "sections.packages.badge",
//!     "cards": [{
//!       "id": "premium", "featured": true,
//!       "titleKey": "pricing.premium.title", "subtitleKey": "pricing.premium.subtitle",
//!       "price": "599 kr", "time": "45 min", "priceNote": "pricing.note.from",
//!       "listKeys": ["pricing.premium.l1", "pricing.premium.l2"],
//!       "cta": { "href": "tel:{phone}", "class": "btn btnPrimary", "labelKey": "cta.call" }
//!     }]
//!   },
//!   "addons": [{ "id": "wax", "titleKey": "addons.wax", "price": "+149 kr" }],
//!   "tireServices": { "sectionKey": "sections.tires.title", "cards": [] },
//!   "rekondServices": { "disclaimerKey": "sections.rekond.disclaimer", "cards": [] }
//! }
//! ```
//!
//! ## Sections
//!
//! | Section | Mount | Columns | Extras |
//! |---------|-------|---------|--------|
//! | [`SectionKind::Packages`] | `[data-pricing]` | 4 | discount banner, add-ons strip |
//! | [`SectionKind::Tires`] | `[data-tires]` | 4 | none |
//! | [`SectionKind::Rekond`] | `[data-rekond]` | 3 | trailing disclaimer |
//!
//! ## Rendering
//!
//! Every render replaces the mount's children wholesale: no diffing, no
//! retained per-card state. Sections are a few dozen nodes and re-render only
//! on load and on language change. Elements are built with localization
//! markers only; the marker pass in [`crate::localize`] fills in the text
//! right after the subtree is materialized.

use crate::dom::{Document, Element, Node, el};
use crate::i18n::Localizer;
use crate::localize::{TEXT_MARKER, localize_subtree};
use crate::site_config::SiteConfig;
use crate::types::Lang;
use maud::Render;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Badge key used by featured cards when neither the card nor its section
/// names one.
pub const DEFAULT_BADGE_KEY: &str = "sections.packages.badge";

/// Placeholder in CTA href templates replaced by the canonical phone.
pub const PHONE_PLACEHOLDER: &str = "{phone}";

#[derive(Error, Debug)]
pub enum PricingError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CtaConfig {
    /// Destination template; `{phone}` is substituted at render time.
    pub href: String,
    /// Class list of the link element.
    pub class: String,
    pub label_key: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardConfig {
    pub id: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default)]
    pub badge_key: Option<String>,
    pub title_key: String,
    pub subtitle_key: String,
    /// Display price, shown verbatim.
    pub price: String,
    #[serde(default)]
    pub time: Option<String>,
    /// Localization key of the small note under the price.
    #[serde(default)]
    pub price_note: Option<String>,
    #[serde(default)]
    pub list_keys: Vec<String>,
    pub cta: CtaConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddonConfig {
    pub id: String,
    pub title_key: String,
    pub price: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscountConfig {
    pub enabled: bool,
    pub badge_key: String,
    pub text_key: String,
    pub note_key: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSection {
    #[serde(default)]
    pub section_key: Option<String>,
    #[serde(default)]
    pub badge_key: Option<String>,
    #[serde(default)]
    pub disclaimer_key: Option<String>,
    #[serde(default)]
    pub cards: Vec<CardConfig>,
}

/// The whole declarative pricing description. Loaded once, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingConfig {
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub discount: Option<DiscountConfig>,
    pub wash_packages: ServiceSection,
    #[serde(default)]
    pub addons: Option<Vec<AddonConfig>>,
    pub tire_services: ServiceSection,
    pub rekond_services: ServiceSection,
}

impl PricingConfig {
    pub fn from_json(json: &str) -> Result<Self, PricingError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, PricingError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn section(&self, kind: SectionKind) -> &ServiceSection {
        match kind {
            SectionKind::Packages => &self.wash_packages,
            SectionKind::Tires => &self.tire_services,
            SectionKind::Rekond => &self.rekond_services,
        }
    }

    /// Every localization key the rendered sections can display.
    pub fn all_keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        if let Some(d) = &self.discount {
            keys.extend([d.badge_key.as_str(), d.text_key.as_str(), d.note_key.as_str()]);
        }
        for addon in self.addons.iter().flatten() {
            keys.push(addon.title_key.as_str());
        }
        for kind in SectionKind::ALL {
            let section = self.section(kind);
            if let Some(key) = &section.disclaimer_key
                && kind.has_disclaimer()
            {
                keys.push(key);
            }
            for card in &section.cards {
                if card.featured {
                    keys.push(badge_key(card, kind.fallback_badge(section)));
                }
                keys.extend([card.title_key.as_str(), card.subtitle_key.as_str()]);
                keys.extend(card.price_note.as_deref());
                keys.extend(card.list_keys.iter().map(String::as_str));
                keys.push(card.cta.label_key.as_str());
            }
        }
        keys
    }
}

/// The three configured sections, each with its own layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKind {
    Packages,
    Tires,
    Rekond,
}

impl SectionKind {
    pub const ALL: [SectionKind; 3] = [SectionKind::Packages, SectionKind::Tires, SectionKind::Rekond];

    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "packages" | "pricing" => Some(SectionKind::Packages),
            "tires" => Some(SectionKind::Tires),
            "rekond" => Some(SectionKind::Rekond),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SectionKind::Packages => "packages",
            SectionKind::Tires => "tires",
            SectionKind::Rekond => "rekond",
        }
    }

    /// Attribute marking the mount element in the page.
    pub fn mount_attr(self) -> &'static str {
        match self {
            SectionKind::Packages => "data-pricing",
            SectionKind::Tires => "data-tires",
            SectionKind::Rekond => "data-rekond",
        }
    }

    pub fn mount_selector(self) -> String {
        format!("[{}]", self.mount_attr())
    }

    pub fn grid_columns(self) -> u8 {
        match self {
            SectionKind::Packages | SectionKind::Tires => 4,
            SectionKind::Rekond => 3,
        }
    }

    pub fn has_discount(self) -> bool {
        self == SectionKind::Packages
    }

    pub fn has_addons(self) -> bool {
        self == SectionKind::Packages
    }

    pub fn has_disclaimer(self) -> bool {
        self == SectionKind::Rekond
    }

    /// Section-level badge key offered to featured cards without their own.
    pub fn fallback_badge(self, section: &ServiceSection) -> Option<&str> {
        match self {
            SectionKind::Packages => section.badge_key.as_deref(),
            SectionKind::Tires => section.section_key.as_deref(),
            SectionKind::Rekond => None,
        }
    }
}

fn badge_key<'a>(card: &'a CardConfig, section_badge: Option<&'a str>) -> &'a str {
    card.badge_key
        .as_deref()
        .or(section_badge)
        .unwrap_or(DEFAULT_BADGE_KEY)
}

fn marked(tag: &str, key: &str) -> Element {
    el(tag).attr(TEXT_MARKER, key)
}

/// Substitute every `{phone}` in a CTA template.
pub fn cta_href(template: &str, phone_e164: &str) -> String {
    template.replace(PHONE_PLACEHOLDER, phone_e164)
}

/// Describe one pricing card.
pub fn render_card(card: &CardConfig, site: &SiteConfig, section_badge: Option<&str>) -> Node {
    let mut article = el("article").class("priceCard");
    if card.featured {
        article = article
            .class("isFeatured")
            .child(marked("div", badge_key(card, section_badge)).class("badge"));
    }

    let header = el("header")
        .class("priceHeader")
        .child(marked("h3", &card.title_key))
        .child(marked("p", &card.subtitle_key).class("muted"));

    let mut price = el("div").class("priceValue").text(&card.price);
    if let Some(time) = &card.time {
        price = price.child(el("span").class("priceTime").text(&format!("⏱️ {time}")));
    }
    if let Some(note) = &card.price_note {
        price = price.child(marked("span", note).class("priceNote"));
    }

    let list = el("ul")
        .class("priceList")
        .children(card.list_keys.iter().map(|key| marked("li", key).into()));

    let href = cta_href(&card.cta.href, &site.phone_e164);
    let mut cta = marked("a", &card.cta.label_key)
        .class(&card.cta.class)
        .attr("href", &href);
    if href.starts_with("tel:") {
        cta = cta.flag("data-phone");
    }

    article
        .child(header)
        .child(price)
        .child(list)
        .child(cta)
        .into()
}

/// Describe the add-ons strip shown under the wash packages.
pub fn render_addons(addons: &[AddonConfig]) -> Node {
    el("div")
        .class("addonsRow")
        .children(addons.iter().map(|addon| {
            el("div")
                .class("addonItem")
                .child(marked("span", &addon.title_key).class("addonTitle"))
                .child(el("span").class("addonPrice").text(&addon.price))
                .into()
        }))
        .into()
}

/// Describe the discount banner. Callers skip disabled discounts.
pub fn render_discount(discount: &DiscountConfig) -> Node {
    el("div")
        .class("discountBanner")
        .child(marked("span", &discount.badge_key).class("discountBadge"))
        .child(marked("span", &discount.text_key).class("discountText"))
        .child(marked("span", &discount.note_key).class("discountNote"))
        .into()
}

/// Describe every child of a section's mount element, in order.
pub fn section_nodes(kind: SectionKind, pricing: &PricingConfig, site: &SiteConfig) -> Vec<Node> {
    let section = pricing.section(kind);
    let mut nodes = Vec::new();

    if kind.has_discount()
        && let Some(discount) = pricing.discount.as_ref().filter(|d| d.enabled)
    {
        nodes.push(render_discount(discount));
    }

    let section_badge = kind.fallback_badge(section);
    let grid = el("div")
        .class("pricingGrid")
        .class(&format!("pricingGrid--{}", kind.grid_columns()))
        .children(
            section
                .cards
                .iter()
                .map(|card| render_card(card, site, section_badge)),
        );
    nodes.push(grid.into());

    if kind.has_addons()
        && let Some(addons) = pricing.addons.as_deref().filter(|a| !a.is_empty())
    {
        nodes.push(render_addons(addons));
    }

    if kind.has_disclaimer()
        && let Some(key) = &section.disclaimer_key
    {
        nodes.push(marked("p", key).class("muted disclaimer").into());
    }

    nodes
}

/// Renders configured sections into a page.
#[derive(Debug, Clone, Copy)]
pub struct Renderer<'a> {
    pub pricing: &'a PricingConfig,
    pub site: &'a SiteConfig,
    pub localizer: &'a Localizer,
}

impl<'a> Renderer<'a> {
    pub fn new(pricing: &'a PricingConfig, site: &'a SiteConfig, localizer: &'a Localizer) -> Self {
        Self {
            pricing,
            site,
            localizer,
        }
    }

    /// Rebuild one section in place. Returns `false` when the page has no
    /// mount for it, which is not an error.
    pub fn render(&self, doc: &mut Document, kind: SectionKind, lang: Lang) -> bool {
        let Some(mount) = doc.query(&kind.mount_selector()) else {
            tracing::debug!(section = kind.name(), "mount not found, skipping");
            return false;
        };
        doc.replace_children(mount, section_nodes(kind, self.pricing, self.site));
        localize_subtree(doc, mount, lang, self.localizer);
        true
    }

    pub fn render_all(&self, doc: &mut Document, lang: Lang) {
        for kind in SectionKind::ALL {
            self.render(doc, kind, lang);
        }
    }

    /// Inner HTML of a section's mount, localized for `lang`.
    pub fn section_html(&self, kind: SectionKind, lang: Lang) -> String {
        let mut doc = Document::from_root(el("html").child(el("div").flag(kind.mount_attr())));
        self.render(&mut doc, kind, lang);
        match doc.query(&kind.mount_selector()) {
            Some(mount) => doc.inner_html(mount),
            None => String::new(),
        }
    }

    /// Markup of a section with its localization markers left unresolved.
    pub fn describe(&self, kind: SectionKind) -> maud::Markup {
        let mut buffer = String::new();
        for node in section_nodes(kind, self.pricing, self.site) {
            node.render_to(&mut buffer);
        }
        maud::PreEscaped(buffer)
    }
}
