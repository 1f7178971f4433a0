mod fixtures;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use stashmatch_core::{
    AppConfig, EntityKind, LinkedDetails, LocalEntity, PerformerDetails, RemoteCandidate,
    StudioDetails, TagDetails, TempIdAllocator,
};
use stashmatch_engine::{
    ApplyOptions, CategorizedMatches, ConfidenceThresholds, EntityMatcher, MatchKind,
    MetadataReconciler, NameSearch, PerformerKind, ScrapedMetadata, ScrapedReconciliation,
    StudioKind, StudioReconciliation, TagKind, auto_apply, calculate_match_stats, categorize,
    edit_distance, normalize, similarity,
};

use crate::fixtures::{CatalogFixture, FixtureCatalog, FixtureRegistry, read_json};

// ─── CLI Definition ─────────────────────────────────────────────────────────

#[derive(Parser)]
#[command(
    name = "stashmatch",
    about = "Reconcile local studios, performers and tags against a metadata registry",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output in JSON format (for scripts).
    /// Also enabled by setting STASHMATCH_JSON=1.
    #[arg(long, global = true)]
    json: bool,

    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Match local entities against a registry snapshot.
    Match {
        kind: KindArg,
        /// JSON array of local entities.
        #[arg(long)]
        local: PathBuf,
        /// JSON array of registry records.
        #[arg(long)]
        registry: PathBuf,
        /// Select the top candidate of every high-confidence match and print the updates.
        #[arg(long)]
        auto_apply: bool,
    },

    /// Attach scraped names to existing catalog entities.
    Reconcile {
        /// JSON object with scraped metadata.
        #[arg(long)]
        scraped: PathBuf,
        /// JSON object with `performers`, `tags` and `studios` arrays.
        #[arg(long)]
        catalog: PathBuf,
    },

    /// Score two names the way the matcher does.
    Similarity { a: String, b: String },

    /// Config management.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    #[value(alias = "studios")]
    Studio,
    #[value(alias = "performers")]
    Performer,
    #[value(alias = "tags")]
    Tag,
}

impl From<KindArg> for EntityKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Studio => EntityKind::Studio,
            KindArg::Performer => EntityKind::Performer,
            KindArg::Tag => EntityKind::Tag,
        }
    }
}

// ─── Config Actions ──────────────────────────────────────────────────────────

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Print the config file location.
    Path,
    /// Write a config file with default values.
    Init {
        #[arg(long)]
        force: bool,
    },
}

// ─── Main ────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let start = Instant::now();
    let cli = Cli::parse();

    let json_output = cli.json || std::env::var("STASHMATCH_JSON").as_deref() == Ok("1");

    let config_path = cli.config.clone().unwrap_or_else(AppConfig::config_path);
    let config = AppConfig::load_from(&config_path)?;
    init_tracing(&config, cli.verbose);
    debug!(path = %config_path.display(), "config loaded");

    let ctx = RunContext {
        config: &config,
        json: json_output,
        start,
    };

    match cli.command {
        Commands::Match {
            kind,
            local,
            registry,
            auto_apply,
        } => match EntityKind::from(kind) {
            EntityKind::Studio => {
                run_match::<StudioKind, StudioDetails>(&ctx, &local, &registry, auto_apply).await?
            }
            EntityKind::Performer => {
                run_match::<PerformerKind, PerformerDetails>(&ctx, &local, &registry, auto_apply)
                    .await?
            }
            EntityKind::Tag => {
                run_match::<TagKind, TagDetails>(&ctx, &local, &registry, auto_apply).await?
            }
        },

        Commands::Reconcile { scraped, catalog } => run_reconcile(&ctx, &scraped, &catalog).await?,

        Commands::Similarity { a, b } => {
            let distance = edit_distance(&normalize(&a), &normalize(&b));
            let score = similarity(&a, &b);
            let thresholds = ConfidenceThresholds::from(&config.matching);
            let confidence = thresholds.classify(score);
            let auto_eligible = thresholds.is_auto_match_eligible(score);
            if json_output {
                print_json(&serde_json::json!({
                    "status": "ok",
                    "data": {
                        "a": a,
                        "b": b,
                        "distance": distance,
                        "score": score,
                        "confidence": confidence,
                        "auto_match_eligible": auto_eligible,
                    },
                    "meta": { "duration_ms": start.elapsed().as_millis() }
                }))?;
            } else {
                let auto = if auto_eligible { ", auto-match" } else { "" };
                println!("score {score}  distance {distance}  ({}{auto})", confidence.as_str());
            }
        }

        // ── Config ─────────────────────────────────────────────────────────
        Commands::Config { action } => match action {
            ConfigAction::Show => {
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": &config,
                        "meta": { "duration_ms": start.elapsed().as_millis() }
                    }))?;
                } else {
                    print!("{}", toml::to_string_pretty(&config)?);
                }
            }
            ConfigAction::Path => {
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "path": &config_path, "exists": config_path.exists() },
                        "meta": { "duration_ms": start.elapsed().as_millis() }
                    }))?;
                } else {
                    println!("{}", config_path.display());
                }
            }
            ConfigAction::Init { force } => {
                if config_path.exists() && !force {
                    bail!(
                        "{} already exists; pass --force to overwrite",
                        config_path.display()
                    );
                }
                AppConfig::default().save_to(&config_path)?;
                if json_output {
                    print_json(&serde_json::json!({
                        "status": "ok",
                        "data": { "path": &config_path },
                        "meta": { "duration_ms": start.elapsed().as_millis() }
                    }))?;
                } else {
                    println!("Wrote default config to {}", config_path.display());
                }
            }
        },
    }

    Ok(())
}

struct RunContext<'a> {
    config: &'a AppConfig,
    json: bool,
    start: Instant,
}

// ─── Match ───────────────────────────────────────────────────────────────────

async fn run_match<K, D>(
    ctx: &RunContext<'_>,
    local_path: &Path,
    registry_path: &Path,
    apply: bool,
) -> Result<()>
where
    K: MatchKind<Local = LocalEntity<D>, Remote = RemoteCandidate<D>>,
    D: LinkedDetails + Default + Clone + Serialize + DeserializeOwned + Send + Sync + 'static,
{
    let entities: Vec<LocalEntity<D>> = read_json(local_path)?;
    let registry: Arc<dyn NameSearch<RemoteCandidate<D>>> =
        Arc::new(FixtureRegistry::load(registry_path)?);
    let matcher = EntityMatcher::<K>::try_from_config(registry, &ctx.config.matching)?;

    info!(kind = %K::KIND, entities = entities.len(), "matching");

    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        }
    });
    let batch = matcher.match_batch_until(&entities, &cancel).await;
    ctrl_c.abort();

    if batch.cancelled {
        warn!(
            processed = batch.matches.len(),
            total = entities.len(),
            "interrupted; reporting processed entities only"
        );
    }

    let mut matches = batch.matches;
    let mut applied = 0;
    if apply {
        applied = auto_apply(&mut matches);
        info!(applied, "auto-applied high-confidence matches");
    }

    let options = ApplyOptions::from(&ctx.config.apply);
    let endpoint = ctx.config.matching.registry_endpoint.as_str();
    let updates: Vec<_> = matches
        .iter()
        .filter_map(|m| m.to_update(options, endpoint))
        .collect();
    let stats = calculate_match_stats(&matches);
    let buckets = categorize(&matches);

    if ctx.json {
        print_json(&serde_json::json!({
            "status": "ok",
            "data": {
                "kind": K::KIND,
                "stats": stats,
                "buckets": buckets,
                "updates": updates,
                "cancelled": batch.cancelled,
            },
            "meta": { "duration_ms": ctx.start.elapsed().as_millis() }
        }))?;
        return Ok(());
    }

    print_buckets(&buckets);
    if !updates.is_empty() {
        println!("\nUpdates ({applied} applied):");
        for update in &updates {
            println!(
                "  {:<12} → {}",
                update.id, update.registry_link.remote_id
            );
        }
    }
    println!(
        "\n{} total · {} matched · {} unmatched · {} skipped · {} auto-eligible",
        stats.total, stats.matched, stats.unmatched, stats.skipped, stats.auto_match_eligible
    );
    if batch.cancelled {
        println!("(interrupted after {} of {})", matches.len(), entities.len());
    }
    Ok(())
}

fn print_buckets<D>(buckets: &CategorizedMatches<'_, LocalEntity<D>, RemoteCandidate<D>>) {
    let sections = [
        ("Auto-match", &buckets.auto),
        ("Review", &buckets.review),
        ("No match", &buckets.no_match),
        ("Skipped", &buckets.skipped),
    ];

    for (title, records) in sections {
        if records.is_empty() {
            continue;
        }
        println!("{title} ({}):", records.len());
        for m in records.iter() {
            let local = m.local();
            match (m.top_candidate(), m.error()) {
                (_, Some(error)) => println!("  {:<30}  error: {error}", local.name),
                (Some(top), None) => println!(
                    "  {:<30}  → {} ({})  {}% {}",
                    local.name,
                    top.candidate.name,
                    top.candidate.remote_id,
                    top.score,
                    top.confidence.as_str()
                ),
                (None, None) => println!("  {:<30}  no candidates", local.name),
            }
        }
    }
}

// ─── Reconcile ───────────────────────────────────────────────────────────────

async fn run_reconcile(ctx: &RunContext<'_>, scraped_path: &Path, catalog_path: &Path) -> Result<()> {
    let scraped: ScrapedMetadata = read_json(scraped_path)?;
    let catalog: CatalogFixture = read_json(catalog_path)?;

    let reconciler = MetadataReconciler::new(
        Arc::new(FixtureCatalog::new(catalog.performers)),
        Arc::new(FixtureCatalog::new(catalog.tags)),
        Arc::new(FixtureCatalog::new(catalog.studios)),
    );
    let result = reconciler.reconcile_scraped(&scraped).await;

    let ids = TempIdAllocator::new();
    let new_performers = result.performers.placeholders(&ids);
    let new_tags = result.tags.placeholders(&ids);

    if ctx.json {
        print_json(&serde_json::json!({
            "status": "ok",
            "data": {
                "reconciliation": result,
                "placeholders": { "performers": new_performers, "tags": new_tags },
            },
            "meta": { "duration_ms": ctx.start.elapsed().as_millis() }
        }))?;
        return Ok(());
    }

    print_reconciliation(&result);
    Ok(())
}

fn print_reconciliation(result: &ScrapedReconciliation) {
    match &result.studio {
        StudioReconciliation::Matched { name, entity } => {
            println!("Studio:     {name} → {} ({})", entity.name, entity.id)
        }
        StudioReconciliation::Unmatched { name, error: None } => {
            println!("Studio:     {name} (new)")
        }
        StudioReconciliation::Unmatched {
            name,
            error: Some(error),
        } => println!("Studio:     {name} (lookup failed: {error})"),
        StudioReconciliation::Absent => println!("Studio:     (none)"),
    }

    println!("Performers:");
    for m in &result.performers.matched {
        println!("  {} → {} ({})", m.name, m.entity.name, m.entity.id);
    }
    for name in &result.performers.unmatched {
        println!("  {name} (new)");
    }

    println!("Tags:");
    for m in &result.tags.matched {
        println!("  {} → {} ({})", m.name, m.entity.name, m.entity.id);
    }
    for name in &result.tags.unmatched {
        println!("  {name} (new)");
    }

    for failure in result.performers.errors.iter().chain(&result.tags.errors) {
        eprintln!("lookup failed for {}: {}", failure.name, failure.message);
    }
}

// ─── Helpers ────────────────────────────────────────────────────────────────

/// Logs go to stderr so `--json` output stays parseable.
fn init_tracing(config: &AppConfig, verbose: bool) {
    let fallback = if verbose { "debug" } else { config.logging.level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn print_json(val: &serde_json::Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(val)?);
    Ok(())
}
