use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use store_onepager::contact::{self, ContactFields, UreqTransport};
use store_onepager::generate::{self, BuildOptions};
use store_onepager::output;
use store_onepager::pricing::{Renderer, SectionKind};
use store_onepager::site_config::{SiteConfig, SiteEnv, stock_site_toml};
use store_onepager::types::Lang;
use tracing_subscriber::EnvFilter;

/// Identity overlay picked up from the site directory when `--config` is
/// not given.
const DEFAULT_CONFIG_FILE: &str = "site.toml";

fn parse_lang(value: &str) -> Result<Lang, String> {
    Lang::parse(value).ok_or_else(|| format!("unsupported language '{value}' (expected sv or en)"))
}

fn parse_section(value: &str) -> Result<SectionKind, String> {
    SectionKind::parse(value)
        .ok_or_else(|| format!("unknown section '{value}' (expected packages, tires or rekond)"))
}

#[derive(Parser)]
#[command(name = "store-onepager")]
#[command(about = "Build tool for a single-page car-wash storefront")]
#[command(long_about = "\
Build tool for a single-page car-wash storefront

Site layout:

  site/
  ├── index.html              # Entry page with <!--#include file=\"...\"--> directives
  ├── partials/               # Included fragments (paths relative to site/)
  ├── pricing.config.json     # Packages, tire services and rekond cards
  ├── locales/
  │   ├── sv.json             # Swedish dictionary (default and fallback)
  │   └── en.json
  ├── public/                 # Copied verbatim to the output root
  └── site.toml               # Identity overlay (optional)

Identity values come from VITE_* environment variables first, then
site.toml, then built-in defaults. Empty values count as unset.

Run 'store-onepager gen-config' to print a documented site.toml.")]
#[command(version = env!("STORE_ONEPAGER_VERSION"))]
struct Cli {
    /// Site directory
    #[arg(long, default_value = "site", global = true)]
    site: PathBuf,

    /// Identity overlay file (defaults to <site>/site.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log build steps
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Assemble the page and copy public assets
    Build {
        /// Output directory
        #[arg(long, default_value = "dist")]
        output: PathBuf,
        /// Prerender pricing sections in this language (sv or en)
        #[arg(long, value_parser = parse_lang)]
        prerender: Option<Lang>,
    },
    /// Print one rendered pricing section
    Render {
        /// packages, tires or rekond
        #[arg(value_parser = parse_section)]
        section: SectionKind,
        #[arg(long, default_value = "sv", value_parser = parse_lang)]
        lang: Lang,
    },
    /// Validate includes and configs, and list untranslated keys
    Check,
    /// Print the resolved identity values
    Config,
    /// Print a stock site.toml with all options documented
    GenConfig,
    /// Send a message through the configured contact endpoint
    Contact {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
        #[arg(long, default_value = "sv", value_parser = parse_lang)]
        lang: Lang,
        #[arg(long, default_value = "")]
        page_url: String,
    },
}

fn resolve_site(cli: &Cli) -> Result<SiteConfig, Box<dyn std::error::Error>> {
    let fallback = cli.site.join(DEFAULT_CONFIG_FILE);
    let file = match &cli.config {
        Some(path) => Some(path.as_path()),
        None if fallback.is_file() => Some(fallback.as_path()),
        None => None,
    };
    let env = SiteEnv::load(file)?;
    Ok(SiteConfig::resolve(&env))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match &cli.command {
        Command::Build {
            output: output_dir,
            prerender,
        } => {
            let site = resolve_site(&cli)?;
            println!("==> Building {} → {}", cli.site.display(), output_dir.display());
            let options = BuildOptions {
                site_dir: cli.site.clone(),
                output_dir: output_dir.clone(),
                prerender: *prerender,
            };
            let report = generate::build(&options, &site)?;
            output::print_build_report(&report);
        }
        Command::Render { section, lang } => {
            let site = resolve_site(&cli)?;
            let pricing = generate::load_pricing(&cli.site)?;
            let localizer = generate::load_localizer(&cli.site)?;
            let html = Renderer::new(&pricing, &site, &localizer).section_html(*section, *lang);
            output::print_section(*section, *lang, &html);
        }
        Command::Check => {
            let site = resolve_site(&cli)?;
            println!("==> Checking {}", cli.site.display());
            let report = generate::check(&cli.site, &site)?;
            output::print_check_report(&report);
            if report.is_clean() {
                println!("==> Site is valid");
            }
        }
        Command::Config => {
            let site = resolve_site(&cli)?;
            print!("{}", site.to_toml()?);
        }
        Command::GenConfig => {
            print!("{}", stock_site_toml());
        }
        Command::Contact {
            name,
            email,
            message,
            lang,
            page_url,
        } => {
            let site = resolve_site(&cli)?;
            let localizer = load_localizer_or_default(&cli.site);
            let fields = ContactFields {
                name: name.clone(),
                email: email.clone(),
                message: message.clone(),
                bot: String::new(),
            };
            let status = contact::submit(
                &fields,
                &site.contact_endpoint,
                *lang,
                page_url,
                &UreqTransport::new(),
            );
            output::print_contact_status(&status, *lang, &localizer);
            if status.tone() == contact::Tone::Error {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Status messages are best-effort: without dictionaries they print as keys.
fn load_localizer_or_default(site_dir: &Path) -> store_onepager::i18n::Localizer {
    generate::load_localizer(site_dir).unwrap_or_else(|err| {
        tracing::warn!(%err, "dictionaries unavailable");
        Default::default()
    })
}
