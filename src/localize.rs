//! Text-application pass.
//!
//! Renderers never write localized strings directly. They leave markers on
//! the elements they build, and this pass resolves them:
//!
//! ```html
//! <h3 data-i18n="pricing.basic.title"></h3>
//! <input data-i18n-attr="placeholder:form.name;aria-label:form.name.label">
//! ```
//!
//! [`localize_subtree`] is the single resolution path; section renderers call
//! it on their freshly built subtree, and [`apply_language`] calls it on the
//! whole document when the language changes.

use crate::dom::{Document, NodeId};
use crate::i18n::Localizer;
use crate::types::Lang;

/// Text marker: the element's text becomes the resolved key.
pub const TEXT_MARKER: &str = "data-i18n";
/// Attribute marker: `attr:key` pairs separated by `;`.
pub const ATTR_MARKER: &str = "data-i18n-attr";

/// Parse an attribute marker into `(attribute, key)` pairs, skipping
/// malformed or empty parts. Only the first two `:`-separated fields of a
/// part count, so `title:a:b` maps `title` to `a`.
pub fn parse_attr_marker(marker: &str) -> Vec<(&str, &str)> {
    marker
        .split(';')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .filter_map(|part| {
            let mut fields = part.split(':').map(str::trim);
            let attr = fields.next()?;
            let key = fields.next()?;
            (!attr.is_empty() && !key.is_empty()).then_some((attr, key))
        })
        .collect()
}

/// Resolve every marker on `root` and below it.
pub fn localize_subtree(doc: &mut Document, root: NodeId, lang: Lang, localizer: &Localizer) {
    let nodes: Vec<NodeId> = std::iter::once(root).chain(doc.descendants(root)).collect();

    for &id in &nodes {
        let Some(key) = doc.attr(id, TEXT_MARKER).filter(|k| !k.is_empty()) else {
            continue;
        };
        let text = localizer.resolve(lang, key);
        doc.set_text(id, &text);
    }

    for &id in &nodes {
        let Some(marker) = doc.attr(id, ATTR_MARKER) else {
            continue;
        };
        let updates: Vec<(String, String)> = parse_attr_marker(marker)
            .into_iter()
            .map(|(attr, key)| (attr.to_string(), localizer.resolve(lang, key)))
            .collect();
        for (attr, value) in updates {
            doc.set_attr(id, &attr, &value);
        }
    }
}

/// Accessible label of the language toggle. Fixed literals, not dictionary
/// entries.
pub fn lang_toggle_label(lang: Lang) -> &'static str {
    match lang {
        Lang::Sv => "Byt språk",
        Lang::En => "Change language",
    }
}

/// Accessible label of the hamburger menu toggle.
pub fn menu_toggle_label(lang: Lang) -> &'static str {
    match lang {
        Lang::Sv => "Öppna meny",
        Lang::En => "Open menu",
    }
}

/// Localize the whole page for `lang`, then call `on_applied` with the
/// document and the now-active language before returning.
pub fn apply_language<F>(doc: &mut Document, lang: Lang, localizer: &Localizer, on_applied: F)
where
    F: FnOnce(&mut Document, Lang),
{
    let root = doc.root();
    doc.set_attr(root, "lang", lang.as_str());

    localize_subtree(doc, root, lang, localizer);

    if let Some(toggle) = doc.query("[data-lang-toggle]") {
        if let Some(se) = doc.query_within(toggle, "[data-flag='se']") {
            doc.set_flag(se, "hidden", lang != Lang::Sv);
        }
        if let Some(gb) = doc.query_within(toggle, "[data-flag='gb']") {
            doc.set_flag(gb, "hidden", lang != Lang::En);
        }
        doc.set_attr(toggle, "aria-label", lang_toggle_label(lang));
    }

    if let Some(nav_toggle) = doc.query(".navToggle") {
        doc.set_attr(nav_toggle, "aria-label", menu_toggle_label(lang));
    }

    on_applied(doc, lang);
}
