//! Build-time HTML assembly.
//!
//! Works on the raw entry page text, before any parsing:
//!
//! 1. [`expand_includes`] inlines `<!--#include file="..."-->` partials.
//! 2. [`apply_replacements`] stamps identity values into marked elements so
//!    the shipped HTML is correct before any script runs.
//! 3. [`splice_mount`] drops prerendered section markup into an empty mount.
//!
//! Substitutions are exact patterns over the markup the site actually uses,
//! not a general HTML rewriter. Attribute order matters (`data-phone` must
//! precede `href`).

use crate::site_config::SiteConfig;
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssembleError {
    #[error("include file not found: {0}")]
    IncludeNotFound(String),
    #[error("circular include detected: {0}")]
    CircularInclude(String),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

static INCLUDE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<!--#include\s+file\s*=\s*"([^"]+)"\s*-->"#).unwrap());

static SITE_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<[^>]*\bdata-site-name\b[^>]*>)(.*?)(</[^>]+>)").unwrap()
});
static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)(<title>)(.*?)(</title>)").unwrap());
static OG_TITLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<meta\s+property="og:title"\s+content=")([^"]*)("\s*/?>)"#).unwrap()
});
static OG_IMAGE_ALT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<meta\s+property="og:image:alt"\s+content=")([^"]*)("\s*/?>)"#).unwrap()
});
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<a[^>]*\bdata-phone\b[^>]*\bhref=")tel:[^"]*("[^>]*>)"#).unwrap()
});
static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)(<a[^>]*\bdata-email\b[^>]*\bhref=")mailto:[^"]*("[^>]*>)(.*?)(</a>)"#).unwrap()
});
static ADDRESS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)(<[^>]*\bdata-address\b[^>]*>)(.*?)(</[^>]+>)").unwrap()
});
static GMAPS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<a[^>]*\bdata-gmaps\b[^>]*\bhref=")[^"]*("[^>]*>)"#).unwrap()
});

/// Escape text for element content and double- or single-quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// Includes
// ============================================================================

/// Inline every include directive, depth-first. Paths are relative to
/// `root`, also inside partials. The same partial may appear many times as
/// long as it never (transitively) includes itself.
pub fn expand_includes(html: &str, root: &Path) -> Result<String, AssembleError> {
    let mut open = HashSet::new();
    expand(html, root, &mut open)
}

fn expand(html: &str, root: &Path, open: &mut HashSet<PathBuf>) -> Result<String, AssembleError> {
    let mut out = String::with_capacity(html.len());
    let mut last = 0;

    for caps in INCLUDE_RE.captures_iter(html) {
        let (Some(whole), Some(rel)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let rel = rel.as_str();
        out.push_str(&html[last..whole.start()]);
        last = whole.end();

        let path = root.join(rel);
        if !path.is_file() {
            return Err(AssembleError::IncludeNotFound(rel.to_string()));
        }
        let key = path.canonicalize().unwrap_or_else(|_| path.clone());
        if !open.insert(key.clone()) {
            return Err(AssembleError::CircularInclude(rel.to_string()));
        }

        let content = std::fs::read_to_string(&path).map_err(|source| AssembleError::Io {
            path: path.clone(),
            source,
        })?;
        tracing::debug!(partial = rel, "expanding include");
        out.push_str(&expand(&content, root, open)?);
        open.remove(&key);
    }

    out.push_str(&html[last..]);
    Ok(out)
}

// ============================================================================
// Identity replacements
// ============================================================================

/// Stamp identity values into the page. Title, `og:title` and
/// `og:image:alt` are replaced once; everything else at every marked site.
pub fn apply_replacements(html: &str, cfg: &SiteConfig) -> String {
    let name = escape_html(&cfg.site_name);
    let title = escape_html(&cfg.document_title());
    let phone = escape_html(&cfg.phone_e164);
    let email = escape_html(&cfg.email_public);
    let address = escape_html(&cfg.address_line);
    let gmaps = escape_html(&cfg.gmaps_q);

    let html = SITE_NAME_RE.replace_all(html, |c: &Captures| format!("{}{name}{}", &c[1], &c[3]));
    let html = TITLE_RE.replacen(&html, 1, |c: &Captures| format!("{}{title}{}", &c[1], &c[3]));
    let html = OG_TITLE_RE.replacen(&html, 1, |c: &Captures| format!("{}{title}{}", &c[1], &c[3]));
    let html =
        OG_IMAGE_ALT_RE.replacen(&html, 1, |c: &Captures| format!("{}{title}{}", &c[1], &c[3]));
    let html = PHONE_RE.replace_all(&html, |c: &Captures| format!("{}tel:{phone}{}", &c[1], &c[2]));
    let html = EMAIL_RE.replace_all(&html, |c: &Captures| {
        format!("{}mailto:{email}{}{email}{}", &c[1], &c[2], &c[4])
    });
    let html = ADDRESS_RE.replace_all(&html, |c: &Captures| format!("{}{address}{}", &c[1], &c[3]));
    let html = GMAPS_RE.replace_all(&html, |c: &Captures| format!("{}{gmaps}{}", &c[1], &c[2]));

    html.into_owned()
}

// ============================================================================
// Prerender splicing
// ============================================================================

/// Put `markup` inside the first empty element carrying the boolean
/// attribute `mount_attr`. `None` when there is no such element; a mount
/// that already has content is left alone.
pub fn splice_mount(html: &str, mount_attr: &str, markup: &str) -> Option<String> {
    let pattern = format!(
        r#"(<[a-zA-Z][a-zA-Z0-9]*\b[^>]*\s{}(?:="[^"]*")?(?:\s[^>]*)?>)\s*(</[a-zA-Z][a-zA-Z0-9]*\s*>)"#,
        regex::escape(mount_attr)
    );
    let re = Regex::new(&pattern).ok()?;
    if !re.is_match(html) {
        return None;
    }
    let spliced = re.replacen(html, 1, |c: &Captures| format!("{}{markup}{}", &c[1], &c[2]));
    Some(spliced.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_site;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, rel: &str, content: &str) {
        let path = dir.path().join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, content).unwrap();
    }

    #[test]
    fn includes_expand_depth_first() {
        let dir = TempDir::new().unwrap();
        write(&dir, "partials/header.html", "<header><!--#include file=\"partials/logo.html\"--></header>");
        write(&dir, "partials/logo.html", "<img alt=\"logo\">");

        let out = expand_includes("<body><!--#include file=\"partials/header.html\" --></body>", dir.path()).unwrap();
        assert_eq!(out, "<body><header><img alt=\"logo\"></header></body>");
    }

    #[test]
    fn repeated_includes_are_not_cycles() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.html", "A");
        let html = r#"<!--#include file="a.html"--><!--#include file="a.html"-->"#;
        assert_eq!(expand_includes(html, dir.path()).unwrap(), "AA");
    }

    #[test]
    fn cycle_is_an_error() {
        let dir = TempDir::new().unwrap();
        write(&dir, "a.html", r#"<!--#include file="b.html"-->"#);
        write(&dir, "b.html", r#"<!--#include file="a.html"-->"#);
        let err = expand_includes(r#"<!--#include file="a.html"-->"#, dir.path()).unwrap_err();
        assert!(matches!(err, AssembleError::CircularInclude(p) if p == "a.html"));
    }

    #[test]
    fn missing_include_is_an_error() {
        let dir = TempDir::new().unwrap();
        let err = expand_includes(r#"<!--#include file="nope.html"-->"#, dir.path()).unwrap_err();
        assert!(matches!(err, AssembleError::IncludeNotFound(p) if p == "nope.html"));
    }

    #[test]
    fn replacements_cover_marked_elements() {
        let mut cfg = sample_site();
        cfg.site_name = "Tvätt & Co".into();
        let html = concat!(
            "<title>Old</title><title>Second</title>",
            r#"<meta property="og:title" content="x">"#,
            r#"<meta property="og:image:alt" content="y" />"#,
            r#"<span data-site-name>Old</span>"#,
            r#"<a class="btn" data-phone href="tel:000">Ring</a>"#,
            r#"<a data-email href="mailto:old@x">old@x</a>"#,
            r#"<p data-address>Somewhere</p>"#,
            r#"<a data-gmaps href="https://old">Map</a>"#,
        );

        let out = apply_replacements(html, &cfg);
        let title = escape_html(&cfg.document_title());
        assert!(out.contains(&format!("<title>{title}</title><title>Second</title>")));
        assert!(out.contains(&format!(r#"<meta property="og:title" content="{title}">"#)));
        assert!(out.contains(&format!(r#"<meta property="og:image:alt" content="{title}" />"#)));
        assert!(out.contains("<span data-site-name>Tvätt &amp; Co</span>"));
        assert!(out.contains(&format!(r#"href="tel:{}">Ring</a>"#, cfg.phone_e164)));
        assert!(out.contains(&format!(
            r#"<a data-email href="mailto:{0}">{0}</a>"#,
            cfg.email_public
        )));
        assert!(out.contains(&format!("<p data-address>{}</p>", cfg.address_line)));
        assert!(out.contains(&format!(r#"<a data-gmaps href="{}">"#, escape_html(&cfg.gmaps_q))));
    }

    #[test]
    fn unmarked_elements_are_untouched() {
        let html = r#"<a href="tel:000">Ring</a><p>Somewhere</p>"#;
        assert_eq!(apply_replacements(html, &sample_site()), html);
    }

    #[test]
    fn dollar_signs_in_values_are_literal() {
        let mut cfg = sample_site();
        cfg.address_line = "Road $1".into();
        let out = apply_replacements("<p data-address>x</p>", &cfg);
        assert_eq!(out, "<p data-address>Road $1</p>");
    }

    #[test]
    fn splice_fills_empty_mount() {
        let html = r#"<section><div class="x" data-pricing></div></section>"#;
        let out = splice_mount(html, "data-pricing", "<p>hi</p>").unwrap();
        assert_eq!(out, r#"<section><div class="x" data-pricing><p>hi</p></div></section>"#);
    }

    #[test]
    fn splice_ignores_prefixed_attributes_and_missing_mounts() {
        let html = r#"<div data-pricing-note></div>"#;
        assert!(splice_mount(html, "data-pricing", "<p>hi</p>").is_none());
        assert!(splice_mount("<div data-tires>kept</div>", "data-tires", "x").is_none());
    }
}
