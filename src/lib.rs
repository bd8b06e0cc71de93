//! # Store Onepager
//!
//! Rendering and build tooling for a single-page car-wash storefront. The
//! page is hand-written HTML with marked mount points and localization
//! markers; this crate fills in everything that comes from configuration:
//! prices, identity values, translations and the interactive widgets.
//!
//! # Two Entry Points
//!
//! ```text
//! build time   site/  →  assemble  →  dist/index.html   (store-onepager build)
//! run time     page   →  App::init →  events → Outcome  (any host driving a Document)
//! ```
//!
//! The build side works on raw HTML text. The runtime side works on a
//! [`dom::Document`], a small retained tree that stands in for the browser
//! DOM so every widget can be exercised headlessly.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`dom`] | Retained document tree, element descriptions, simple selectors |
//! | [`types`] | `Lang`, `Theme` and the `PageContext` passed to renderers |
//! | [`i18n`] | Per-language dictionaries with Swedish fallback |
//! | [`localize`] | Resolves `data-i18n` and `data-i18n-attr` markers, applies a language |
//! | [`site_config`] | Identity values from `VITE_*` env and `site.toml`, pushed into the page |
//! | [`pricing`] | Config-driven pricing cards for the three service sections |
//! | [`prefs`] | Persisted language and theme preferences |
//! | [`nav`] | Hamburger menu |
//! | [`theme`] | Light/dark toggle |
//! | [`carousel`] | Gallery carousel buttons and keyboard stepping |
//! | [`hero`] | Timed hero slider |
//! | [`contact`] | Contact form validation and webhook delivery |
//! | [`app`] | Startup order and event routing |
//! | [`assemble`] | Include expansion, identity substitution, prerender splicing |
//! | [`generate`] | The `build` and `check` pipelines |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Descriptions, Then Materialization
//!
//! Renderers never poke at the tree piecemeal. They build an immutable
//! [`dom::Node`] description of a whole section and swap it in with
//! [`dom::Document::replace_children`]. Re-rendering is therefore always a
//! full replacement, and the same description renders to HTML for the
//! prerender step through maud.
//!
//! ## One Localization Path
//!
//! Rendered nodes carry the same markers as hand-written markup, and a single
//! pass resolves them. There is no second code path that writes translated
//! text directly, so switching language is one walk over the page.
//!
//! ## No Ambient State
//!
//! The current language and theme live in a [`types::PageContext`] owned by
//! [`app::App`]. Time is passed in by the host, and the webhook sits behind
//! the [`contact::Transport`] trait.

pub mod app;
pub mod assemble;
pub mod carousel;
pub mod contact;
pub mod dom;
pub mod generate;
pub mod hero;
pub mod i18n;
pub mod localize;
pub mod nav;
pub mod output;
pub mod prefs;
pub mod pricing;
pub mod site_config;
pub mod theme;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
