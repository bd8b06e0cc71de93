//! Static build of the storefront page.
//!
//! Turns a site directory into a deployable output directory:
//!
//! ```text
//! site/                          dist/
//! ├── index.html         ──┐     ├── index.html   (assembled)
//! ├── partials/*.html      ├──►  ├── robots.txt
//! ├── pricing.config.json  │     └── img/...      (copied from public/)
//! ├── locales/{sv,en}.json ┘
//! └── public/            ──────►
//! ```
//!
//! ## Steps
//!
//! 1. Read `index.html` and expand include directives.
//! 2. Stamp identity values into marked elements.
//! 3. Optionally prerender the three pricing sections in one language, so
//!    the page has prices before scripts run. Markers stay on the
//!    prerendered nodes, so the runtime pass can still switch language.
//! 4. Write `<output>/index.html`.
//! 5. Copy `public/` verbatim into the output root.
//!
//! [`check`] runs steps 1 and 2 without writing and reports translation keys
//! that would fall back.

use crate::assemble::{self, AssembleError};
use crate::i18n::{I18nError, Localizer};
use crate::localize::{ATTR_MARKER, TEXT_MARKER, parse_attr_marker};
use crate::pricing::{PricingConfig, PricingError, Renderer, SectionKind};
use crate::site_config::SiteConfig;
use crate::types::Lang;
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use walkdir::WalkDir;

pub const ENTRY_PAGE: &str = "index.html";
pub const PRICING_FILE: &str = "pricing.config.json";
pub const LOCALES_DIR: &str = "locales";
pub const PUBLIC_DIR: &str = "public";

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("entry page not found: {0}")]
    MissingEntry(PathBuf),
    #[error(transparent)]
    Assemble(#[from] AssembleError),
    #[error("pricing config: {0}")]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    I18n(#[from] I18nError),
    #[error("copying assets: {0}")]
    Walk(#[from] walkdir::Error),
}

#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub site_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Language to prerender pricing sections in; `None` leaves mounts empty.
    pub prerender: Option<Lang>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub page: PathBuf,
    pub page_bytes: usize,
    pub prerendered: Vec<SectionKind>,
    /// Paths relative to the output root.
    pub assets: Vec<PathBuf>,
}

fn read_entry(site_dir: &Path) -> Result<String, GenerateError> {
    let entry = site_dir.join(ENTRY_PAGE);
    if !entry.is_file() {
        return Err(GenerateError::MissingEntry(entry));
    }
    Ok(fs::read_to_string(entry)?)
}

/// Expand includes and stamp identity values.
pub fn assemble_page(site_dir: &Path, site: &SiteConfig) -> Result<String, GenerateError> {
    let html = read_entry(site_dir)?;
    let html = assemble::expand_includes(&html, site_dir)?;
    Ok(assemble::apply_replacements(&html, site))
}

pub fn load_pricing(site_dir: &Path) -> Result<PricingConfig, GenerateError> {
    Ok(PricingConfig::load(&site_dir.join(PRICING_FILE))?)
}

pub fn load_localizer(site_dir: &Path) -> Result<Localizer, GenerateError> {
    Ok(Localizer::from_dir(&site_dir.join(LOCALES_DIR))?)
}

pub fn build(options: &BuildOptions, site: &SiteConfig) -> Result<BuildReport, GenerateError> {
    let mut html = assemble_page(&options.site_dir, site)?;
    tracing::info!(site = %options.site_dir.display(), "assembled entry page");

    let mut prerendered = Vec::new();
    if let Some(lang) = options.prerender {
        let pricing = load_pricing(&options.site_dir)?;
        let localizer = load_localizer(&options.site_dir)?;
        let renderer = Renderer::new(&pricing, site, &localizer);
        for kind in SectionKind::ALL {
            let markup = renderer.section_html(kind, lang);
            match assemble::splice_mount(&html, kind.mount_attr(), &markup) {
                Some(spliced) => {
                    html = spliced;
                    prerendered.push(kind);
                }
                None => tracing::debug!(section = kind.name(), "no empty mount to prerender into"),
            }
        }
        tracing::info!(lang = %lang, sections = prerendered.len(), "prerendered pricing");
    }

    fs::create_dir_all(&options.output_dir)?;
    let page = options.output_dir.join(ENTRY_PAGE);
    fs::write(&page, &html)?;

    let assets = copy_public(&options.site_dir.join(PUBLIC_DIR), &options.output_dir)?;
    tracing::info!(count = assets.len(), "copied public assets");

    Ok(BuildReport {
        page,
        page_bytes: html.len(),
        prerendered,
        assets,
    })
}

/// Mirror `src` into `dst`. A missing `src` copies nothing.
fn copy_public(src: &Path, dst: &Path) -> Result<Vec<PathBuf>, GenerateError> {
    let mut copied = Vec::new();
    if !src.is_dir() {
        return Ok(copied);
    }
    for entry in WalkDir::new(src).sort_by_file_name() {
        let entry = entry?;
        let Ok(rel) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dst.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
            copied.push(rel.to_path_buf());
        }
    }
    Ok(copied)
}

// ============================================================================
// Check
// ============================================================================

static TEXT_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r#"\s{TEXT_MARKER}="([^"]*)""#)).unwrap());
static ATTR_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r#"\s{ATTR_MARKER}="([^"]*)""#)).unwrap());

/// Localization keys referenced by markers in raw page markup.
pub fn page_keys(html: &str) -> Vec<String> {
    let mut keys: Vec<String> = TEXT_MARKER_RE
        .captures_iter(html)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();
    for caps in ATTR_MARKER_RE.captures_iter(html) {
        if let Some(marker) = caps.get(1) {
            keys.extend(parse_attr_marker(marker.as_str()).into_iter().map(|(_, k)| k.to_string()));
        }
    }
    keys.sort();
    keys.dedup();
    keys
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    pub keys_checked: usize,
    /// Keys each language would resolve through fallback.
    pub missing: Vec<(Lang, Vec<String>)>,
}

impl CheckReport {
    pub fn is_clean(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Validate a site directory without writing anything. Include problems
/// and unreadable configs are errors; untranslated keys are reported.
pub fn check(site_dir: &Path, site: &SiteConfig) -> Result<CheckReport, GenerateError> {
    let html = assemble_page(site_dir, site)?;
    let pricing = load_pricing(site_dir)?;
    let localizer = load_localizer(site_dir)?;

    let mut keys = page_keys(&html);
    keys.extend(pricing.all_keys().into_iter().map(str::to_string));
    keys.sort();
    keys.dedup();

    let missing = localizer.missing_keys(keys.iter().map(String::as_str));
    Ok(CheckReport {
        keys_checked: keys.len(),
        missing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_keys_collects_both_marker_kinds() {
        let html = concat!(
            r#"<h2 data-i18n="nav.packages">x</h2>"#,
            r#"<input data-i18n-attr="placeholder:form.name; aria-label:form.name">"#,
            r#"<p data-i18n="">empty</p>"#,
            r#"<p data-i18n-other="nope"></p>"#,
        );
        assert_eq!(page_keys(html), vec!["form.name", "nav.packages"]);
    }

    #[test]
    fn missing_entry_is_reported() {
        let tmp = tempfile::TempDir::new().unwrap();
        let err = read_entry(tmp.path()).unwrap_err();
        assert!(matches!(err, GenerateError::MissingEntry(_)));
    }

    #[test]
    fn copy_public_mirrors_tree() {
        let src = tempfile::TempDir::new().unwrap();
        let dst = tempfile::TempDir::new().unwrap();
        fs::create_dir_all(src.path().join("img")).unwrap();
        fs::write(src.path().join("robots.txt"), "User-agent: *").unwrap();
        fs::write(src.path().join("img/hero.webp"), [0u8; 4]).unwrap();

        let copied = copy_public(src.path(), dst.path()).unwrap();
        assert_eq!(
            copied,
            vec![PathBuf::from("img/hero.webp"), PathBuf::from("robots.txt")]
        );
        assert!(dst.path().join("img/hero.webp").is_file());
    }

    #[test]
    fn copy_public_without_dir_is_empty() {
        let dst = tempfile::TempDir::new().unwrap();
        let copied = copy_public(&dst.path().join("nope"), dst.path()).unwrap();
        assert!(copied.is_empty());
    }
}
