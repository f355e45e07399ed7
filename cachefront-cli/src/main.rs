//! CacheFront CLI
//!
//! Derive cache keys and exercise the read-through cache from the shell.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use cachefront_core::{ArgValue, CacheFrontError, CallArguments, FetchRequest};
use cachefront_fetch::{
    build_key, CacheConfig, CacheSettings, EventKind, EventLogger, FnFetcher, ReadThrough,
    RecordingEventLogger, TracingEventLogger,
};

/// CacheFront - read-through cache for remote lookups
#[derive(Parser)]
#[command(name = "cachefront")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// A lookup as typed on the command line.
#[derive(Args, Clone)]
struct Lookup {
    /// Resource identity (e.g. "Widget" or "Admin::Widget")
    resource: String,
    /// Positional arguments; JSON literals are parsed, anything else is a string
    args: Vec<String>,
    /// Option entries as key=value (repeatable)
    #[arg(short = 'o', long = "option", value_name = "KEY=VALUE")]
    options: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cache key for a lookup
    Key {
        #[command(flatten)]
        lookup: Lookup,
    },

    /// Print the effective cache settings (environment + .env)
    Config,

    /// Run repeated lookups against a simulated remote source
    Simulate {
        #[command(flatten)]
        lookup: Lookup,
        /// Number of lookup rounds
        #[arg(short, long, default_value = "10")]
        calls: usize,
        /// Concurrent lookups per round
        #[arg(short, long, default_value = "1")]
        parallel: usize,
        /// Force a reload every N rounds (0 = never)
        #[arg(long, default_value = "0")]
        reload_every: usize,
        /// Simulated fetch latency in milliseconds
        #[arg(long, default_value = "50")]
        latency_ms: u64,
        /// Entry TTL in seconds (overrides the environment)
        #[arg(long)]
        ttl: Option<u64>,
        /// Disable the cache
        #[arg(long)]
        no_cache: bool,
        /// Coalesce concurrent misses on the same key
        #[arg(long)]
        single_flight: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "cachefront=debug,info"
    } else {
        "cachefront=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match cli.command {
        Commands::Key { lookup } => cmd_key(&lookup),
        Commands::Config => cmd_config(),
        Commands::Simulate {
            lookup,
            calls,
            parallel,
            reload_every,
            latency_ms,
            ttl,
            no_cache,
            single_flight,
        } => {
            let mut settings = CacheSettings::from_env().context("Invalid cache settings")?;
            if let Some(ttl) = ttl {
                settings.cache_time_to_live_seconds = ttl;
            }
            if no_cache {
                settings.cache_enabled = false;
            }
            if single_flight {
                settings.single_flight = true;
            }
            let run = Simulation {
                calls,
                parallel: parallel.max(1),
                reload_every,
                latency: Duration::from_millis(latency_ms),
            };
            cmd_simulate(&lookup, settings, run).await
        }
    }
}

/// Print the cache key for a lookup
fn cmd_key(lookup: &Lookup) -> Result<()> {
    let (request, reload) = lookup.arguments()?.into_request();
    let key = build_key(&lookup.resource, &request);

    println!("{}", key);
    if reload {
        println!("{}", "   (reload is stripped before keying)".dimmed());
    }

    Ok(())
}

/// Print effective settings
fn cmd_config() -> Result<()> {
    let settings = CacheSettings::from_env().context("Invalid cache settings")?;
    println!("{}", "⚙️  Cache settings:".cyan().bold());
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

struct Simulation {
    calls: usize,
    parallel: usize,
    reload_every: usize,
    latency: Duration,
}

/// Run lookups through the cache against a fake remote
async fn cmd_simulate(lookup: &Lookup, settings: CacheSettings, run: Simulation) -> Result<()> {
    let base = lookup.arguments()?;

    println!(
        "{} {} {}",
        "🔁 Simulating".cyan().bold(),
        run.calls * run.parallel,
        "lookups".cyan().bold()
    );
    println!(
        "   {} {}  {} {}s  {} {}",
        "cache:".dimmed(),
        if settings.cache_enabled { "on".green() } else { "off".red() },
        "ttl:".dimmed(),
        settings.cache_time_to_live_seconds,
        "single-flight:".dimmed(),
        settings.single_flight
    );

    let fetches = Arc::new(AtomicUsize::new(0));
    let latency = run.latency;
    let fetcher = {
        let fetches = fetches.clone();
        FnFetcher::new(move |resource: String, request: FetchRequest| {
            let fetches = fetches.clone();
            async move {
                let n = fetches.fetch_add(1, Ordering::SeqCst) + 1;
                tokio::time::sleep(latency).await;
                Ok::<_, CacheFrontError>(serde_json::json!({
                    "resource": resource,
                    "args": request.to_string(),
                    "fetch": n,
                }))
            }
        })
    };

    let recorder = Arc::new(RecordingEventLogger::new());
    let events = Arc::new(Tee {
        recorder: recorder.clone(),
        tracing: TracingEventLogger::colored(),
    });
    let cache = Arc::new(
        ReadThrough::<serde_json::Value>::new(
            Arc::new(fetcher),
            Arc::new(CacheConfig::from_settings(settings)),
        )
        .with_event_logger(events),
    );

    let pb = ProgressBar::new(run.calls as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            .context("Invalid progress template")?
            .progress_chars("#>-"),
    );

    let started = Instant::now();
    for round in 0..run.calls {
        let reload = run.reload_every > 0 && (round + 1) % run.reload_every == 0;
        let handles: Vec<_> = (0..run.parallel)
            .map(|_| {
                let cache = cache.clone();
                let resource = lookup.resource.clone();
                let args = round_arguments(&base, reload);
                tokio::spawn(async move { cache.fetch(&resource, args).await })
            })
            .collect();

        for handle in handles {
            handle
                .await
                .context("Lookup task panicked")?
                .context("Lookup failed")?;
        }
        pb.inc(1);
    }
    pb.finish_and_clear();

    let elapsed = started.elapsed();
    let lookups = run.calls * run.parallel;
    let fetched = fetches.load(Ordering::SeqCst);

    println!("\n{}", "📊 Results:".green().bold());
    println!("   {} {}", "Lookups:".dimmed(), lookups);
    println!("   {} {}", "Remote fetches:".dimmed(), fetched);
    println!("   {} {}", "Cache hits:".dimmed(), recorder.count(EventKind::Read));
    println!("   {} {}", "Cache writes:".dimmed(), recorder.count(EventKind::Write));
    println!("   {} {:.2?}", "Elapsed:".dimmed(), elapsed);

    Ok(())
}

/// Arguments for one simulated round. Forced reloads add the option; other
/// rounds keep whatever the user passed.
fn round_arguments(base: &CallArguments, reload: bool) -> CallArguments {
    if reload {
        base.clone().reload(true)
    } else {
        base.clone()
    }
}

/// Forwards events to a recorder and to the log.
struct Tee {
    recorder: Arc<RecordingEventLogger>,
    tracing: TracingEventLogger,
}

impl EventLogger for Tee {
    fn log(&self, kind: EventKind, message: &str) {
        self.recorder.log(kind, message);
        self.tracing.log(kind, message);
    }
}

impl Lookup {
    /// Builds call arguments from the command line.
    fn arguments(&self) -> Result<CallArguments> {
        let mut args = CallArguments::new();
        for raw in &self.args {
            args = args.arg(parse_value(raw));
        }
        for entry in &self.options {
            let Some((key, value)) = entry.split_once('=') else {
                bail!("Option '{}' must look like key=value", entry);
            };
            let key = key.trim();
            if key.is_empty() {
                bail!("Option '{}' has an empty key", entry);
            }
            args = args.option(key, parse_value(value));
        }
        Ok(args)
    }
}

/// JSON literal if it parses, plain string otherwise.
///
/// Integer literals too large for `u64` stay as their exact text instead of
/// being rounded to a float.
fn parse_value(raw: &str) -> ArgValue {
    match serde_json::from_str::<serde_json::Value>(raw) {
        Ok(serde_json::Value::Number(n)) if n.is_f64() && is_integer_literal(raw) => {
            ArgValue::from(raw.trim())
        }
        Ok(value) => ArgValue::from(value),
        Err(_) => ArgValue::from(raw),
    }
}

fn is_integer_literal(raw: &str) -> bool {
    let digits = raw.trim().trim_start_matches('-');
    !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit())
}
