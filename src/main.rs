use std::path::PathBuf;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};

use verity_lib::modules::audit::{AuditOptions, ClassificationTable, QualityAuditor};
use verity_lib::modules::batch::{
    AuditProcessor, BatchRunner, EnrichProcessor, RecordProcessor, VerifyProcessor, VerifyScope,
};
use verity_lib::modules::catalog::{VenueFilter, VenueRepository, VenueRepositoryImpl};
use verity_lib::modules::enrichment::{
    AttributeClass, EnrichmentOptions, EnrichmentPolicy, EnrichmentWaterfall,
};
use verity_lib::modules::matcher::{CandidateMatcher, MatchKind, DUPLICATE_THRESHOLD};
use verity_lib::modules::provider::{
    CachedPlaceSearch, CustomImageSearchAdapter, GooglePlacesAdapter, ImageSearchProvider,
    PageMetaAdapter, PageMetadataProvider, PlaceSearchProvider, VideoSearchProvider, YoutubeAdapter,
};
use verity_lib::modules::verification::{GeoOptions, GeoVerifier, VideoOptions, VideoVerifier};
use verity_lib::shared::utils::logger::init_logger;
use verity_lib::shared::utils::Validator;
use verity_lib::shared::{Database, EngineConfig};
use verity_lib::{log_info, log_warn};

#[derive(Parser, Debug)]
#[command(name = "verity")]
#[command(about = "Venue data quality and enrichment engine")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the quality rule set over a slice of the catalog
    Audit {
        #[command(flatten)]
        slice: SliceArgs,

        /// Report without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Infer venue types from name and description where none are set
        #[arg(long)]
        fix_types: bool,

        /// Default missing settings to indoor + outdoor
        #[arg(long)]
        fix_settings: bool,
    },

    /// Fill missing attributes from providers, highest trust first
    Enrich {
        #[command(flatten)]
        slice: SliceArgs,

        /// Report what would be written without writing it
        #[arg(long)]
        dry_run: bool,

        /// Attribute classes to enrich (default: all)
        #[arg(long = "target", value_delimiter = ',')]
        targets: Vec<AttributeClass>,
    },

    /// Check stored coordinates and videos against their providers
    Verify {
        #[command(flatten)]
        slice: SliceArgs,

        /// Apply safe corrections and queue review flags
        #[arg(long)]
        fix: bool,

        /// Meters of divergence still counted as agreement
        #[arg(long, default_value_t = 500.0)]
        threshold: f64,

        /// Meters beyond which coordinates are never auto-corrected
        #[arg(long = "max-dist", default_value_t = 50_000.0)]
        max_dist: f64,

        /// Which verification paths to run
        #[arg(long, value_enum, default_value_t = VerifyScope::All)]
        scope: VerifyScope,
    },

    /// Match candidate names against the catalog to spot duplicates
    Dedup {
        /// File of candidate names, one per line; omit to scan the catalog
        /// against itself
        #[arg(long)]
        names_file: Option<PathBuf>,

        /// Similarity needed to call two names duplicates
        #[arg(long, default_value_t = DUPLICATE_THRESHOLD)]
        threshold: f64,

        /// Only match against records in this region
        #[arg(long)]
        region: Option<String>,

        /// Only match against records in this country
        #[arg(long)]
        country: Option<String>,
    },
}

/// Slice selection shared by the batch commands.
#[derive(Args, Debug, Clone)]
struct SliceArgs {
    /// Maximum records to process
    #[arg(long)]
    limit: Option<i64>,

    /// Only records in this region
    #[arg(long)]
    region: Option<String>,

    /// Only records in this country
    #[arg(long)]
    country: Option<String>,

    /// Only records whose id starts with this prefix
    #[arg(long)]
    prefix: Option<String>,

    /// Offset into the id-ordered slice; an interrupted run prints the
    /// value to resume from
    #[arg(long, default_value_t = 0)]
    start: i64,
}

impl SliceArgs {
    fn to_filter(&self) -> anyhow::Result<VenueFilter> {
        Validator::validate_slice(self.start, self.limit)?;
        Ok(VenueFilter {
            region: self.region.clone(),
            country: self.country.clone(),
            id_prefix: self.prefix.clone(),
            limit: self.limit,
            offset: self.start,
        })
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logger();
    let cli = Cli::parse();

    match cli.command {
        Commands::Audit {
            slice,
            dry_run,
            fix_types,
            fix_settings,
        } => {
            run_audit(
                slice,
                AuditOptions {
                    dry_run,
                    fix_types,
                    fix_settings,
                },
            )
            .await
        }
        Commands::Enrich {
            slice,
            dry_run,
            targets,
        } => run_enrich(slice, dry_run, targets).await,
        Commands::Verify {
            slice,
            fix,
            threshold,
            max_dist,
            scope,
        } => run_verify(slice, fix, threshold, max_dist, scope).await,
        Commands::Dedup {
            names_file,
            threshold,
            region,
            country,
        } => run_dedup(names_file, threshold, region, country).await,
    }
}

fn open_repository(config: &EngineConfig) -> anyhow::Result<Arc<dyn VenueRepository>> {
    let database = Arc::new(Database::new(&config.database_url)?);
    database.run_migrations()?;
    Ok(Arc::new(VenueRepositoryImpl::new(database)))
}

/// Runs the processor over the slice with Ctrl-C stopping after the
/// in-flight record, then prints the summary.
async fn run_batch(
    repository: Arc<dyn VenueRepository>,
    processor: &dyn RecordProcessor,
    filter: VenueFilter,
) -> anyhow::Result<()> {
    let runner = BatchRunner::new(repository);

    let stop = runner.stop_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log_warn!("stop requested, finishing the in-flight record");
            stop.store(true, Ordering::SeqCst);
        }
    });

    let summary = runner.run(processor, &filter).await?;
    print!("{}", summary);
    Ok(())
}

async fn run_audit(slice: SliceArgs, options: AuditOptions) -> anyhow::Result<()> {
    let filter = slice.to_filter()?;
    let config = EngineConfig::from_env()?;
    let repository = open_repository(&config)?;

    let auditor = QualityAuditor::new(Arc::clone(&repository), ClassificationTable::standard()?);
    let processor = AuditProcessor::new(auditor, options);
    run_batch(repository, &processor, filter).await
}

async fn run_enrich(
    slice: SliceArgs,
    dry_run: bool,
    targets: Vec<AttributeClass>,
) -> anyhow::Result<()> {
    let filter = slice.to_filter()?;
    let targets = if targets.is_empty() {
        AttributeClass::ALL.to_vec()
    } else {
        targets
    };

    let config = EngineConfig::from_env()?;

    // Preflight only the credentials the selected classes will use; the
    // others get placeholder adapters that this run can never reach.
    let needs_places = targets
        .iter()
        .any(|t| matches!(t, AttributeClass::Website | AttributeClass::Coordinates));
    let needs_images = targets.contains(&AttributeClass::Images);
    let needs_videos = targets.contains(&AttributeClass::Videos);

    let places_key = if needs_places {
        config.require_places_key()?.to_string()
    } else {
        config.places_api_key.clone().unwrap_or_default()
    };
    let (search_key, engine_id) = if needs_images {
        let (key, cx) = config.require_search_credentials()?;
        (key.to_string(), cx.to_string())
    } else {
        (
            config.search_api_key.clone().unwrap_or_default(),
            config.search_engine_id.clone().unwrap_or_default(),
        )
    };
    let youtube_key = if needs_videos {
        config.require_youtube_key()?.to_string()
    } else {
        config.youtube_api_key.clone().unwrap_or_default()
    };

    let repository = open_repository(&config)?;

    let places: Arc<dyn PlaceSearchProvider> = Arc::new(CachedPlaceSearch::new(Arc::new(
        GooglePlacesAdapter::new(&places_key)?,
    )));
    let images: Arc<dyn ImageSearchProvider> =
        Arc::new(CustomImageSearchAdapter::new(search_key, engine_id)?);
    let videos: Arc<dyn VideoSearchProvider> = Arc::new(YoutubeAdapter::new(youtube_key)?);
    let pages: Arc<dyn PageMetadataProvider> = Arc::new(PageMetaAdapter::new()?);

    let policy = EnrichmentPolicy::standard();
    log_info!("enrichment policy v{}", policy.version);
    let waterfall =
        EnrichmentWaterfall::new(Arc::clone(&repository), places, images, videos, pages, policy)?;

    if dry_run {
        log_info!("dry run: nothing will be written");
    }
    let processor = EnrichProcessor::new(waterfall, EnrichmentOptions { dry_run, targets });
    run_batch(repository, &processor, filter).await
}

async fn run_verify(
    slice: SliceArgs,
    fix: bool,
    threshold: f64,
    max_dist: f64,
    scope: VerifyScope,
) -> anyhow::Result<()> {
    let filter = slice.to_filter()?;
    anyhow::ensure!(
        threshold >= 0.0 && max_dist >= threshold,
        "--max-dist must be at least --threshold, and both non-negative"
    );

    let config = EngineConfig::from_env()?;
    let places_key = if scope.includes_geo() {
        config.require_places_key()?.to_string()
    } else {
        config.places_api_key.clone().unwrap_or_default()
    };
    let youtube_key = if scope.includes_video() {
        config.require_youtube_key()?.to_string()
    } else {
        config.youtube_api_key.clone().unwrap_or_default()
    };

    let repository = open_repository(&config)?;

    let places: Arc<dyn PlaceSearchProvider> = Arc::new(CachedPlaceSearch::new(Arc::new(
        GooglePlacesAdapter::new(&places_key)?,
    )));
    let videos: Arc<dyn VideoSearchProvider> = Arc::new(YoutubeAdapter::new(youtube_key)?);

    let geo = GeoVerifier::new(
        Arc::clone(&repository),
        places,
        EnrichmentPolicy::standard(),
    );
    let video = VideoVerifier::new(
        Arc::clone(&repository),
        videos,
        EnrichmentPolicy::standard(),
    )?;

    let processor = VerifyProcessor::new(
        geo,
        video,
        scope,
        GeoOptions {
            fix,
            threshold_m: threshold,
            max_correction_m: max_dist,
        },
        VideoOptions { fix },
    );
    run_batch(repository, &processor, filter).await
}

async fn run_dedup(
    names_file: Option<PathBuf>,
    threshold: f64,
    region: Option<String>,
    country: Option<String>,
) -> anyhow::Result<()> {
    anyhow::ensure!(
        (0.0..=1.0).contains(&threshold),
        "--threshold must be between 0 and 1"
    );

    let config = EngineConfig::from_env()?;
    let repository = open_repository(&config)?;

    let filter = VenueFilter {
        region,
        country,
        ..VenueFilter::default()
    };
    let existing = repository.list_names(&filter).await?;
    log_info!("dedup scan against {} catalog names", existing.len());

    let matcher = CandidateMatcher::with_threshold(threshold);

    match names_file {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("reading names file {}", path.display()))?;
            let mut duplicates = 0usize;
            let mut checked = 0usize;
            for name in content.lines().map(str::trim).filter(|l| !l.is_empty()) {
                checked += 1;
                match matcher.find_duplicate(name, &existing) {
                    Some(found) => {
                        duplicates += 1;
                        println!(
                            "{} -> {} ({}) [{}]",
                            name,
                            found.venue_name,
                            found.venue_id,
                            describe_match(&found.kind)
                        );
                    }
                    None => println!("{} -> unique", name),
                }
            }
            println!("{} of {} candidate names matched existing records", duplicates, checked);
        }
        None => {
            // Self-scan: each name against the names after it, so a pair is
            // reported once.
            let mut pairs = 0usize;
            for (index, (id, name)) in existing.iter().enumerate() {
                let rest = &existing[index + 1..];
                if let Some(found) = matcher.find_duplicate(name, rest) {
                    pairs += 1;
                    println!(
                        "{} ({}) ~ {} ({}) [{}]",
                        name,
                        id,
                        found.venue_name,
                        found.venue_id,
                        describe_match(&found.kind)
                    );
                }
            }
            println!("{} likely duplicate pairs in {} records", pairs, existing.len());
        }
    }
    Ok(())
}

fn describe_match(kind: &MatchKind) -> String {
    match kind {
        MatchKind::Exact => "exact".to_string(),
        MatchKind::Fuzzy { score } => format!("fuzzy {:.2}", score),
    }
}
