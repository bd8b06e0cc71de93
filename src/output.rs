//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Build
//!
//! ```text
//! Page → dist/index.html (18.4 KB)
//! Prerendered
//!     packages
//!     tires
//!     rekond
//! Assets
//!     001 img/hero-1.webp
//!     002 robots.txt
//!
//! Built 1 page, 3 sections, 2 assets
//! ```
//!
//! ## Check
//!
//! ```text
//! Checked 84 keys
//! en: 2 missing
//!     sections.rekond.disclaimer
//!     form.status.network
//! ```

use crate::contact::FormStatus;
use crate::generate::{BuildReport, CheckReport};
use crate::i18n::Localizer;
use crate::pricing::SectionKind;
use crate::types::Lang;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

fn format_size(bytes: usize) -> String {
    if bytes < 1024 {
        format!("{bytes} B")
    } else {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    }
}

// ============================================================================
// build
// ============================================================================

pub fn format_build_report(report: &BuildReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Page → {} ({})",
        report.page.display(),
        format_size(report.page_bytes)
    )];

    if !report.prerendered.is_empty() {
        lines.push("Prerendered".to_string());
        for kind in &report.prerendered {
            lines.push(format!("{}{}", indent(1), kind.name()));
        }
    }

    if !report.assets.is_empty() {
        lines.push("Assets".to_string());
        for (i, asset) in report.assets.iter().enumerate() {
            lines.push(format!(
                "{}{} {}",
                indent(1),
                format_index(i + 1),
                asset.display()
            ));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "Built 1 page, {}, {}",
        plural(report.prerendered.len(), "section"),
        plural(report.assets.len(), "asset")
    ));
    lines
}

pub fn print_build_report(report: &BuildReport) {
    for line in format_build_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// check
// ============================================================================

pub fn format_check_report(report: &CheckReport) -> Vec<String> {
    let mut lines = vec![format!("Checked {}", plural(report.keys_checked, "key"))];
    if report.is_clean() {
        lines.push("All keys translated".to_string());
        return lines;
    }
    for (lang, keys) in &report.missing {
        lines.push(format!("{}: {} missing", lang, keys.len()));
        for key in keys {
            lines.push(format!("{}{}", indent(1), key));
        }
    }
    lines
}

pub fn print_check_report(report: &CheckReport) {
    for line in format_check_report(report) {
        println!("{}", line);
    }
}

// ============================================================================
// render
// ============================================================================

/// A rendered section: a header naming it, then its markup.
pub fn format_section(kind: SectionKind, lang: Lang, html: &str) -> Vec<String> {
    vec![format!("<!-- {} ({}) -->", kind.name(), lang), html.to_string()]
}

pub fn print_section(kind: SectionKind, lang: Lang, html: &str) {
    for line in format_section(kind, lang, html) {
        println!("{}", line);
    }
}

// ============================================================================
// contact
// ============================================================================

pub fn format_contact_status(status: &FormStatus, lang: Lang, localizer: &Localizer) -> Vec<String> {
    vec![
        format!("[{}] {}", status.tone().as_str(), status.message(lang, localizer)),
        format!("{}{}", indent(1), status.key()),
    ]
}

pub fn print_contact_status(status: &FormStatus, lang: Lang, localizer: &Localizer) {
    for line in format_contact_status(status, lang, localizer) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::sample_localizer;
    use std::path::PathBuf;

    #[test]
    fn format_index_pads_to_three() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1000), "1000");
    }

    #[test]
    fn format_size_switches_to_kilobytes() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
    }

    #[test]
    fn build_report_lists_sections_and_assets() {
        let report = BuildReport {
            page: PathBuf::from("dist/index.html"),
            page_bytes: 2048,
            prerendered: vec![SectionKind::Packages, SectionKind::Rekond],
            assets: vec![PathBuf::from("robots.txt")],
        };
        assert_eq!(
            format_build_report(&report),
            vec![
                "Page → dist/index.html (2.0 KB)",
                "Prerendered",
                "    packages",
                "    rekond",
                "Assets",
                "    001 robots.txt",
                "",
                "Built 1 page, 2 sections, 1 asset",
            ]
        );
    }

    #[test]
    fn build_report_without_prerender_or_assets() {
        let report = BuildReport {
            page: PathBuf::from("out/index.html"),
            page_bytes: 10,
            prerendered: vec![],
            assets: vec![],
        };
        let lines = format_build_report(&report);
        assert_eq!(lines.last().unwrap(), "Built 1 page, 0 sections, 0 assets");
        assert!(!lines.iter().any(|l| l == "Prerendered"));
    }

    #[test]
    fn check_report_groups_by_language() {
        let report = CheckReport {
            keys_checked: 3,
            missing: vec![(Lang::En, vec!["a.b".into(), "c.d".into()])],
        };
        assert_eq!(
            format_check_report(&report),
            vec!["Checked 3 keys", "en: 2 missing", "    a.b", "    c.d"]
        );
    }

    #[test]
    fn clean_check_report() {
        let report = CheckReport {
            keys_checked: 1,
            missing: vec![],
        };
        assert_eq!(
            format_check_report(&report),
            vec!["Checked 1 key", "All keys translated"]
        );
    }

    #[test]
    fn contact_status_shows_tone_and_key() {
        let lines = format_contact_status(&FormStatus::Missing, Lang::En, &sample_localizer());
        assert_eq!(lines[0], "[error] Please fill in all fields.");
        assert_eq!(lines[1], "    form.status.missing");
    }
}
