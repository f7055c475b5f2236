use anyhow::{bail, Context, Result};
use certscope_asn1::{
    is_accepted_extension, node_path_at, render_der_debug, render_pretty, ByteRange, ByteSource,
    DecodeOutcome, FileSource, HighlightState, Inspector, ReaderSource, RenderOptions,
};
use certscope_chain::{
    load_ca_records, CertificateRecord, ChainResolver, ChainTermination, Issued,
};
use certscope_core::config::{LogFormat, LoggingConfig, SettingsConfig};
use certscope_core::settings::PreferredView;
use certscope_core::{AppConfig, DisplayOptions, JsonFileSettings, MemorySettings, SettingsStore};
use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// certscope - ASN.1/DER inspector and CA chain resolver
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to a YAML configuration file
    #[arg(short, long, global = true, env = "CERTSCOPE_CONFIG")]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode PEM, hex, Base64, or DER input into an ASN.1 tree
    Decode {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,

        /// Tree view to print
        #[arg(long, value_enum)]
        view: Option<View>,

        /// Do not print the hex dump
        #[arg(long)]
        no_hex: bool,

        /// Highlight the byte range START:END (end exclusive) in the hex dump
        #[arg(long, value_parser = parse_range)]
        highlight: Option<ByteRange>,

        /// Print long values in full
        #[arg(long)]
        full: bool,

        /// Store the effective display options as the new defaults
        #[arg(long)]
        save_defaults: bool,
    },

    /// Rank likely content types of the input
    Guess {
        /// Input file; reads stdin when omitted
        file: Option<PathBuf>,
    },

    /// Resolve the CA chain above a leaf certificate
    Chain {
        /// Leaf certificate (PEM)
        #[arg(long)]
        leaf: PathBuf,

        /// Known CAs: JSON CA list or PEM bundle
        #[arg(long)]
        cas: PathBuf,

        /// Print the PEM bundle (leaf first) instead of a summary
        #[arg(long)]
        pem: bool,

        /// Override the configured maximum chain depth
        #[arg(long)]
        max_depth: Option<usize>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum View {
    /// asn1parse-style listing
    Pretty,
    /// Brace notation
    Der,
    /// Full decode result, tree and hex dump rows, as JSON
    TreeJson,
}

fn parse_range(s: &str) -> std::result::Result<ByteRange, String> {
    let (start, end) = s
        .split_once(':')
        .ok_or_else(|| format!("expected START:END, got '{}'", s))?;
    let start: usize = start
        .trim()
        .parse()
        .map_err(|_| format!("invalid start offset '{}'", start))?;
    let end: usize = end
        .trim()
        .parse()
        .map_err(|_| format!("invalid end offset '{}'", end))?;
    if end <= start {
        return Err(format!("end {} must be greater than start {}", end, start));
    }
    Ok(ByteRange::new(start, end))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::from_config_builder(args.config.as_deref())
        .context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging, args.verbose)?;
    if let Some(path) = &args.config {
        debug!("Configuration loaded from {}", path.display());
    }

    match args.command {
        Command::Decode {
            file,
            view,
            no_hex,
            highlight,
            full,
            save_defaults,
        } => {
            let mut store = open_settings(&config.settings)?;
            let mut display = DisplayOptions::load(store.as_ref())
                .context("Failed to read display options")?;
            match view {
                Some(View::Pretty) => display.view = PreferredView::Pretty,
                Some(View::Der) => display.view = PreferredView::Der,
                Some(View::TreeJson) | None => {}
            }
            if no_hex {
                display.show_hex_dump = false;
            }
            if full {
                display.trim_large = false;
            }
            if save_defaults {
                display
                    .save(store.as_mut())
                    .context("Failed to save display options")?;
                info!("Saved display options");
            }

            let source = byte_source(file.as_deref());
            let outcome = Inspector::new(&config)
                .inspect_source(source.as_ref())
                .with_context(|| format!("Failed to decode {}", source.describe()))?;

            if view == Some(View::TreeJson) {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&outcome).context("Failed to serialize tree")?
                );
            } else {
                let options = RenderOptions::new(&config.render, display.trim_large);
                print_outcome(&outcome, &display, &options, highlight);
            }
        }
        Command::Guess { file } => {
            let source = byte_source(file.as_deref());
            let bytes = source
                .read_bytes()
                .with_context(|| format!("Failed to read {}", source.describe()))?;
            let text = String::from_utf8_lossy(&bytes);
            for guess in certscope_asn1::guess_content_type(&text) {
                println!("{:>5.1}%  {}", guess.confidence * 100.0, guess.label);
            }
        }
        Command::Chain {
            leaf,
            cas,
            pem,
            max_depth,
        } => {
            let max_depth = max_depth.unwrap_or(config.chain.max_depth);
            if max_depth == 0 {
                bail!("--max-depth must be at least 1");
            }
            run_chain(&leaf, &cas, pem, ChainResolver::new(max_depth))?;
        }
    }

    Ok(())
}

fn init_logging(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        config.parse_level()?
    };
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match config.format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
    Ok(())
}

fn open_settings(config: &SettingsConfig) -> Result<Box<dyn SettingsStore>> {
    match &config.path {
        Some(path) => {
            let store = JsonFileSettings::open(path)
                .with_context(|| format!("Failed to open settings file {}", path.display()))?;
            Ok(Box::new(store))
        }
        None => Ok(Box::new(MemorySettings::new())),
    }
}

fn byte_source(file: Option<&Path>) -> Box<dyn ByteSource> {
    match file {
        Some(path) => {
            if !is_accepted_extension(path) {
                warn!(
                    "{} does not have a certificate file extension, decoding anyway",
                    path.display()
                );
            }
            Box::new(FileSource::new(path))
        }
        None => Box::new(ReaderSource::stdin()),
    }
}

fn print_outcome(
    outcome: &DecodeOutcome,
    display: &DisplayOptions,
    options: &RenderOptions,
    highlight: Option<ByteRange>,
) {
    println!("Encoding: {}", outcome.encoding);
    if display.show_guesses {
        let guesses: Vec<String> = outcome
            .guesses
            .iter()
            .map(|g| format!("{} ({:.0}%)", g.label, g.confidence * 100.0))
            .collect();
        println!("Guesses: {}", guesses.join(", "));
    }
    println!();

    match display.view {
        PreferredView::Pretty => print!("{}", render_pretty(&outcome.root, options)),
        PreferredView::Der => print!("{}", render_der_debug(&outcome.root, options)),
    }
    if outcome.trailing_bytes > 0 {
        println!(
            "\n{} trailing byte(s) after offset {}",
            outcome.trailing_bytes, outcome.root.byte_range.end
        );
    }

    let mut state = HighlightState::default();
    if let Some(range) = highlight {
        let path: Vec<&str> = node_path_at(&outcome.root, range.start)
            .into_iter()
            .map(|node| node.type_name.as_str())
            .collect();
        println!();
        if path.is_empty() {
            println!("Bytes {}..{} lie outside the decoded tree", range.start, range.end);
        } else {
            println!("Bytes {}..{}: {}", range.start, range.end, path.join(" > "));
        }
        state.highlight(range);
    }

    if display.show_hex_dump {
        println!();
        print!("{}", outcome.hex_dump.render_highlighted(&state));
    }
}

fn run_chain(leaf_path: &Path, cas_path: &Path, pem: bool, resolver: ChainResolver) -> Result<()> {
    let cas = load_ca_records(cas_path)
        .with_context(|| format!("Failed to load CA records from {}", cas_path.display()))?;
    let leaf_pem = fs::read_to_string(leaf_path)
        .with_context(|| format!("Failed to read {}", leaf_path.display()))?;
    let leaf = CertificateRecord::from_certificate_pem(&leaf_pem)
        .with_context(|| format!("Failed to parse leaf certificate {}", leaf_path.display()))?;

    if pem {
        print!("{}", resolver.build_chain_pem(&leaf, &cas));
        return Ok(());
    }

    let chain = resolver.build_chain(&leaf, &cas);
    info!("Resolved {} CA(s) above {}", chain.len(), leaf.id());
    for (depth, ca) in chain.links.iter().enumerate() {
        println!("{:>2}. {} [{:?}]", depth, ca.subject, ca.status);
    }
    println!("    {} (leaf)", leaf.subject);
    println!();

    match &chain.termination {
        ChainTermination::SelfSigned => println!("Complete: ends at a self-signed root"),
        ChainTermination::UnresolvedIssuer { issuer_id } => {
            println!("Incomplete: issuer '{}' is not a known CA", issuer_id)
        }
        ChainTermination::DepthExceeded => println!(
            "Incomplete: stopped at the maximum depth of {}",
            resolver.max_depth()
        ),
    }
    Ok(())
}
