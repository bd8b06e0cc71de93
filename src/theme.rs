//! Light/dark theme toggle.

use crate::dom::{Document, NodeId};
use crate::prefs::{PreferenceStore, preferred_theme, save_theme};
use crate::types::Theme;

/// Accessible label describing what a click on the toggle will do.
pub fn toggle_label(theme: Theme) -> &'static str {
    match theme {
        Theme::Dark => "Switch to light theme",
        Theme::Light => "Switch to dark theme",
    }
}

/// Reflect `theme` on the page: root `data-theme`, the sun icon while dark,
/// the moon icon while light, and the toggle's label.
pub fn apply_theme(doc: &mut Document, theme: Theme) {
    let root = doc.root();
    doc.set_attr(root, "data-theme", theme.as_str());

    let Some(button) = doc.query("[data-theme-toggle]") else {
        return;
    };
    let show_sun = theme == Theme::Dark;
    if let Some(sun) = doc.query_within(button, "[data-theme-icon='sun']") {
        doc.set_flag(sun, "hidden", !show_sun);
    }
    if let Some(moon) = doc.query_within(button, "[data-theme-icon='moon']") {
        doc.set_flag(moon, "hidden", show_sun);
    }
    doc.set_attr(button, "aria-label", toggle_label(theme));
}

#[derive(Debug, Clone, Copy)]
pub struct ThemeToggle {
    button: Option<NodeId>,
    theme: Theme,
}

impl ThemeToggle {
    /// Resolve the starting theme and apply it. The page gets a theme even
    /// when it has no toggle button.
    pub fn init(doc: &mut Document, store: &dyn PreferenceStore, prefers_light: bool) -> Self {
        let theme = preferred_theme(store, prefers_light);
        apply_theme(doc, theme);
        Self {
            button: doc.query("[data-theme-toggle]"),
            theme,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn button(&self) -> Option<NodeId> {
        self.button
    }

    /// Flip, persist and apply. A page without a toggle never calls this.
    pub fn toggle(&mut self, doc: &mut Document, store: &mut dyn PreferenceStore) -> Theme {
        self.theme = self.theme.toggled();
        save_theme(store, self.theme);
        apply_theme(doc, self.theme);
        self.theme
    }
}
