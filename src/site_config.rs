//! Business identity configuration.
//!
//! Every value the page shows about the business (name, phone, address,
//! opening hours, the contact webhook) comes from here. Inputs are layered
//! with [confique](https://docs.rs/confique):
//!
//! 1. `VITE_*` environment variables (highest priority)
//! 2. an optional `site.toml` next to the site sources
//! 3. literal defaults baked into [`SiteConfig::resolve`]
//!
//! ```toml
//! site_name = "FirstClassTvätt"
//! phone_e164 = "+46701234567"
//! # phone_pretty is derived from phone_e164 when omitted
//! email_public = "firstklasswash@gmail.com"
//!
//! hours_mon_fri = "10–19"
//! ```
//!
//! An empty value counts as unset, so `VITE_PHONE_PRETTY=` still derives the
//! display phone. Resolution never fails: a site with no configuration at
//! all renders with the defaults.

use crate::dom::Document;
use confique::Config;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config load error: {0}")]
    Load(#[from] confique::Error),
    #[error("TOML serialize error: {0}")]
    Toml(#[from] toml::ser::Error),
}

/// Raw identity inputs. Every field is optional; see [`SiteConfig::resolve`].
#[derive(Debug, Clone, Default, Config)]
pub struct SiteEnv {
    #[config(env = "VITE_SITE_NAME")]
    pub site_name: Option<String>,
    /// Canonical E.164 phone, e.g. `+46701234567`.
    #[config(env = "VITE_PHONE_E164")]
    pub phone_e164: Option<String>,
    /// Display phone; derived from `phone_e164` when unset.
    #[config(env = "VITE_PHONE_PRETTY")]
    pub phone_pretty: Option<String>,
    #[config(env = "VITE_EMAIL_PUBLIC")]
    pub email_public: Option<String>,
    #[config(env = "VITE_INSTAGRAM_HANDLE")]
    pub instagram_handle: Option<String>,
    #[config(env = "VITE_ADDRESS_LINE")]
    pub address_line: Option<String>,
    /// Google Maps link opened by "directions" buttons.
    #[config(env = "VITE_GMAPS_Q")]
    pub gmaps_q: Option<String>,
    /// Google Maps iframe embed URL.
    #[config(env = "VITE_GMAPS_EMBED")]
    pub gmaps_embed: Option<String>,
    /// Webhook receiving contact form submissions. Empty disables the form.
    #[config(env = "VITE_GOOGLE_SHEET_CONTACT_URL")]
    pub contact_endpoint: Option<String>,
    /// Suffix of the document title, after the site name.
    #[config(env = "VITE_TITLE_TAGLINE")]
    pub title_tagline: Option<String>,
    #[config(env = "VITE_HOURS_MON_FRI")]
    pub hours_mon_fri: Option<String>,
    #[config(env = "VITE_HOURS_SAT")]
    pub hours_sat: Option<String>,
    #[config(env = "VITE_HOURS_SUN")]
    pub hours_sun: Option<String>,
}

impl SiteEnv {
    /// Read the environment, then the optional TOML file.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Self::builder().env();
        let builder = match file {
            Some(path) => builder.file(path),
            None => builder,
        };
        Ok(builder.load()?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OpeningHours {
    pub mon_fri: String,
    pub sat: String,
    pub sun: String,
}

/// Resolved identity values. Read-only once resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteConfig {
    pub site_name: String,
    pub phone_e164: String,
    pub phone_pretty: String,
    pub email_public: String,
    pub instagram_handle: String,
    pub address_line: String,
    pub gmaps_q: String,
    pub gmaps_embed: String,
    pub contact_endpoint: String,
    pub title_tagline: String,
    pub opening_hours: OpeningHours,
}

const DEFAULT_SITE_NAME: &str = "FirstClassTvätt";
const DEFAULT_PHONE_E164: &str = "+46701234567";
const DEFAULT_EMAIL: &str = "firstklasswash@gmail.com";
const DEFAULT_INSTAGRAM: &str = "@store";
const DEFAULT_ADDRESS: &str = "Gamla Flygplatsvägen 10, 423 37 Torslanda";
const DEFAULT_GMAPS_Q: &str = "https://maps.app.goo.gl/4g7cRCaZffvWtQRH8";
const DEFAULT_GMAPS_EMBED: &str = "https://www.google.com/maps/embed?pb=!1m18!1m12!1m3!1d1981.4191844361378!2d11.78014767681938!3d57.71179627387179!2m3!1f0!2f0!3f0!3m2!1i1024!2i768!4f13.1!3m3!1m2!1s0x464f8c1fcd8e5ad7%3A0xcef4eadf1edb33b!2sGamla%20Flygplatsv%C3%A4gen%2010%2C%20423%2037%20Torslanda%2C%20Sverige!5e1!3m2!1ssv!2sus!4v1771194095977!5m2!1ssv!2sus";
const DEFAULT_TAGLINE: &str = "Biltvätt i Partille";
const DEFAULT_HOURS_MON_FRI: &str = "10–19";
const DEFAULT_HOURS_WEEKEND: &str = "10–17";

fn pick(value: &Option<String>, default: &str) -> String {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string()
}

impl SiteConfig {
    /// Apply literal fallbacks to whatever inputs were supplied.
    pub fn resolve(env: &SiteEnv) -> Self {
        let phone_e164 = pick(&env.phone_e164, DEFAULT_PHONE_E164);
        let phone_pretty = env
            .phone_pretty
            .clone()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| format_phone_pretty(&phone_e164));

        Self {
            site_name: pick(&env.site_name, DEFAULT_SITE_NAME),
            phone_e164,
            phone_pretty,
            email_public: pick(&env.email_public, DEFAULT_EMAIL),
            instagram_handle: pick(&env.instagram_handle, DEFAULT_INSTAGRAM),
            address_line: pick(&env.address_line, DEFAULT_ADDRESS),
            gmaps_q: pick(&env.gmaps_q, DEFAULT_GMAPS_Q),
            gmaps_embed: pick(&env.gmaps_embed, DEFAULT_GMAPS_EMBED),
            contact_endpoint: pick(&env.contact_endpoint, ""),
            title_tagline: pick(&env.title_tagline, DEFAULT_TAGLINE),
            opening_hours: OpeningHours {
                mon_fri: pick(&env.hours_mon_fri, DEFAULT_HOURS_MON_FRI),
                sat: pick(&env.hours_sat, DEFAULT_HOURS_WEEKEND),
                sun: pick(&env.hours_sun, DEFAULT_HOURS_WEEKEND),
            },
        }
    }

    /// Instagram handle with a guaranteed leading `@`.
    pub fn instagram_display(&self) -> String {
        if self.instagram_handle.starts_with('@') {
            self.instagram_handle.clone()
        } else {
            format!("@{}", self.instagram_handle)
        }
    }

    pub fn instagram_url(&self) -> String {
        format!(
            "https://instagram.com/{}",
            self.instagram_handle.trim_start_matches('@')
        )
    }

    /// `"<site name> – <tagline>"`, used for `<title>` and Open Graph tags.
    pub fn document_title(&self) -> String {
        format!("{} – {}", self.site_name, self.title_tagline)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Format a Swedish mobile number for display.
///
/// Only the exact shape `+46` + 2 + 3 + 2 + 2 digits is rewritten
/// (`+46701234567` → `+46 70 123 45 67`); any other input is returned as is.
pub fn format_phone_pretty(e164: &str) -> String {
    let Some(digits) = e164.strip_prefix("+46") else {
        return e164.to_string();
    };
    if digits.len() != 9 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return e164.to_string();
    }
    format!(
        "+46 {} {} {} {}",
        &digits[0..2],
        &digits[2..5],
        &digits[5..7],
        &digits[7..9]
    )
}

/// Push identity values into the marked elements of a live page.
pub fn apply_site_config(doc: &mut Document, cfg: &SiteConfig) {
    for id in doc.query_all("[data-site-name]") {
        doc.set_text(id, &cfg.site_name);
    }

    for id in doc.query_all("a[data-phone]") {
        doc.set_attr(id, "href", &format!("tel:{}", cfg.phone_e164));
        if !doc.has_attr(id, "data-i18n") {
            doc.set_text(id, &cfg.phone_pretty);
        }
    }

    for id in doc.query_all("a[data-email]") {
        doc.set_attr(id, "href", &format!("mailto:{}", cfg.email_public));
        doc.set_text(id, &cfg.email_public);
    }

    let handle = cfg.instagram_display();
    let instagram_url = cfg.instagram_url();
    for id in doc.query_all("a[data-instagram]") {
        doc.set_text(id, &handle);
        doc.set_attr(id, "href", &instagram_url);
    }

    for id in doc.query_all("[data-address]") {
        doc.set_text(id, &cfg.address_line);
    }
    for id in doc.query_all("a[data-gmaps]") {
        doc.set_attr(id, "href", &cfg.gmaps_q);
    }
    for id in doc.query_all("iframe[data-gmaps-embed]") {
        doc.set_attr(id, "src", &cfg.gmaps_embed);
    }

    let hours = [
        ("[data-hours-monfri]", &cfg.opening_hours.mon_fri),
        ("[data-hours-sat]", &cfg.opening_hours.sat),
        ("[data-hours-sun]", &cfg.opening_hours.sun),
    ];
    for (selector, value) in hours {
        for id in doc.query_all(selector) {
            doc.set_text(id, value);
        }
    }
}

/// Write the calendar year into every `[data-year]` element. The year comes
/// from the host; the crate keeps no clock of its own.
pub fn apply_footer_year(doc: &mut Document, year: i32) {
    for id in doc.query_all("[data-year]") {
        doc.set_text(id, &year.to_string());
    }
}

/// A fully commented `site.toml` listing every key and its default.
///
/// Used by the `gen-config` CLI command.
pub fn stock_site_toml() -> &'static str {
    r##"# Site identity
# =============
# Every key is optional. Environment variables (VITE_*) override this file,
# and empty values fall back to the defaults shown here.

# VITE_SITE_NAME
site_name = "FirstClassTvätt"

# VITE_TITLE_TAGLINE - appended to the site name in <title> and og:title
title_tagline = "Biltvätt i Partille"

# VITE_PHONE_E164 - canonical number used in tel: links and CTA hrefs
phone_e164 = "+46701234567"

# VITE_PHONE_PRETTY - display form. Derived from phone_e164 when omitted
# (+46 70 123 45 67); numbers outside that shape are shown unchanged.
# phone_pretty = "+46 70 123 45 67"

# VITE_EMAIL_PUBLIC
email_public = "firstklasswash@gmail.com"

# VITE_INSTAGRAM_HANDLE - with or without the leading @
instagram_handle = "@store"

# VITE_ADDRESS_LINE
address_line = "Gamla Flygplatsvägen 10, 423 37 Torslanda"

# VITE_GMAPS_Q - link for "directions" buttons
gmaps_q = "https://maps.app.goo.gl/4g7cRCaZffvWtQRH8"

# VITE_GMAPS_EMBED - iframe src for the embedded map
# gmaps_embed = "https://www.google.com/maps/embed?pb=..."

# VITE_GOOGLE_SHEET_CONTACT_URL - contact form webhook.
# Left empty, the form reports a configuration error instead of sending.
# contact_endpoint = "https://script.google.com/macros/s/.../exec"

# Opening hours (VITE_HOURS_MON_FRI, VITE_HOURS_SAT, VITE_HOURS_SUN)
hours_mon_fri = "10–19"
hours_sat = "10–17"
hours_sun = "10–17"
"##
}
