//! Binary entry point for `relay-bot`.
//!
//! This module provides the command-line interface for relay-bot with options
//! for configuration file paths and logging verbosity. It can evaluate the
//! keyword table offline, or replay a captured inbound event and reply to it.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use opentelemetry::trace::TracerProvider;
use opentelemetry_otlp::{Protocol, WithExportConfig};
use relay_bot::{
    ReplyOptions,
    base::{
        config::Config,
        types::{ChannelKind, InboundEvent, Void},
    },
    interaction::keyword::{KeywordMatcher, KeywordTable},
};
use tracing_subscriber::{fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt};

/// Relay-bot: one reply protocol for QQ guild channels and groups.
///
/// Configuration can come from `config.toml` or environment variables
/// prefixed with `RELAY_BOT_`.
#[derive(Parser, Debug)]
#[command(version, author, about, long_about = None)]
struct Args {
    /// Override the config file path (optional).
    ///
    /// By default, the bot will look for a config file at `.hidden/config.toml`
    /// in the current directory.
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Increase log verbosity (-v, -vv, etc.).
    ///
    /// Use multiple times to increase verbosity:
    /// - No flag: INFO level
    /// - -v: DEBUG level
    /// - -vv or more: TRACE level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the keyword reply for some message content.
    Match {
        /// Message content to match against the keyword table.
        content: String,
    },
    /// Reply to a captured inbound event.
    Replay {
        /// Which surface the event came from.
        #[arg(short, long, value_enum)]
        kind: Kind,
        /// JSON file holding the event, bare or as a gateway dispatch.
        #[arg(short, long)]
        event: PathBuf,
        /// Reply text. Defaults to the keyword table's answer.
        #[arg(short, long)]
        text: Option<String>,
        /// Attach a local image.
        #[arg(long, conflicts_with = "image_url")]
        image_path: Option<PathBuf>,
        /// Attach a remote image.
        #[arg(long)]
        image_url: Option<String>,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum Kind {
    Guild,
    Group,
}

impl From<Kind> for ChannelKind {
    fn from(kind: Kind) -> Self {
        match kind {
            Kind::Guild => ChannelKind::Guild,
            Kind::Group => ChannelKind::Group,
        }
    }
}

/// Main entry point for the relay-bot binary.
///
/// Sets up logging based on verbosity, loads configuration, and runs the command.
#[tokio::main]
async fn main() -> Void {
    let args = Args::parse();

    // Construct the level filter.

    let level = match args.verbose {
        0 => tracing::Level::INFO,
        1 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    let level_filter = tracing_subscriber::filter::LevelFilter::from_level(level);

    // Prepare the log layer.

    let stdout = tracing_subscriber::fmt::layer()
        .without_time()
        .with_ansi(true)
        .with_level(true)
        .with_file(false)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_span_events(FmtSpan::NEW | FmtSpan::CLOSE);

    // Prepare the otlp layer.

    let exporter = opentelemetry_otlp::SpanExporter::builder().with_http().with_protocol(Protocol::HttpBinary).build()?;
    let tracer = opentelemetry_sdk::trace::SdkTracerProvider::builder().with_simple_exporter(exporter).build().tracer("relay-bot");
    let otel = tracing_opentelemetry::layer().with_tracer(tracer);

    tracing_subscriber::registry().with(otel).with(level_filter).with(stdout).init();

    let config = Config::load(args.config.as_deref())?;

    match args.command {
        Command::Match { content } => {
            let matcher = KeywordMatcher::new(KeywordTable::from_config(&config)?);
            println!("{}", matcher.match_content(&content));
            Ok(())
        }
        Command::Replay {
            kind,
            event,
            text,
            image_path,
            image_url,
        } => {
            let payload = tokio::fs::read_to_string(&event).await?;
            let event = InboundEvent::from_json(kind.into(), &payload)?;

            relay_bot::replay(config, event, ReplyOptions { text, image_path, image_url }).await
        }
    }
}
