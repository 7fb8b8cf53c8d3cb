use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use churnbook::runner::standard;
use churnbook::{ListingRegistry, ListingRunner, Overrides, RunRequest, RunnerError, Settings};

/// Fighting Churn with Data listing runner
#[derive(Parser, Debug)]
#[command(name = "churnbook")]
#[command(about = "Run Fighting Churn with Data book listings", long_about = None)]
struct Args {
    /// The name of the schema
    #[arg(long, default_value = "socialnet7")]
    schema: String,

    /// The chapter of the listing
    #[arg(long, default_value_t = 2)]
    chapter: u32,

    /// The number(s) of the listing
    #[arg(long, num_args = 0.., default_values_t = vec![1u32])]
    listing: Vec<u32>,

    /// Use the insert version of a metric SQL, if available
    #[arg(long)]
    insert: bool,

    /// Alternative listing parameter versions (optional)
    #[arg(long, num_args = 0..)]
    version: Vec<u32>,

    /// Number of parallel workers for multi-version listings
    #[arg(long, default_value_t = 1)]
    n_parallel: usize,

    /// Run a pre-built sweep instead of the chapter/listing flags
    #[arg(long, value_enum)]
    sweep: Option<Sweep>,

    /// Database name (overrides CHURN_DB)
    #[arg(long)]
    db: Option<String>,

    /// Database host (overrides CHURN_DB_HOST)
    #[arg(long)]
    db_host: Option<String>,

    /// Database user (overrides CHURN_DB_USER)
    #[arg(long)]
    db_user: Option<String>,

    /// Database password (overrides CHURN_DB_PASS)
    #[arg(long)]
    db_pass: Option<String>,

    /// Output directory for saved results (overrides CHURN_OUT_DIR)
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Directory holding the listing templates and configuration (overrides CHURN_LISTING_DIR)
    #[arg(long)]
    listing_dir: Option<PathBuf>,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum Sweep {
    ChurnRates,
    Metrics,
    Dataset,
    All,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "churnbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    if let Err(err) = run(args).await {
        tracing::error!(error = %err, "run failed");
        eprintln!("{err}");
        std::process::exit(err.exit_code());
    }
}

async fn run(args: Args) -> Result<(), RunnerError> {
    let overrides = Overrides {
        db: args.db.clone(),
        db_host: args.db_host.clone(),
        db_user: args.db_user.clone(),
        db_pass: args.db_pass.clone(),
        out_dir: args.out_dir.clone(),
        listing_dir: args.listing_dir.clone(),
    };
    let settings = Settings::load(&overrides)?;

    // Code listings get registered here by embedders; the SQL chapters need
    // none, so the default registry is empty.
    let registry = ListingRegistry::new();
    let runner = ListingRunner::connect(settings, registry, args.n_parallel).await?;

    let requests = match args.sweep {
        Some(Sweep::ChurnRates) => standard::churn_rate_requests(&args.schema),
        Some(Sweep::Metrics) => {
            let mut reqs = standard::metric_qa_requests(&args.schema);
            reqs.extend(standard::metric_insert_requests(&args.schema));
            reqs
        }
        Some(Sweep::Dataset) => standard::dataset_requests(&args.schema),
        Some(Sweep::All) => standard::standard_requests(&args.schema),
        None => {
            let mut req = RunRequest::new(&args.schema, args.chapter, args.listing.clone());
            req.versions = args.version.clone();
            req.insert = args.insert;
            vec![req]
        }
    };

    for mut request in requests {
        request.n_parallel = args.n_parallel;
        runner.run(&request).await?;
    }
    Ok(())
}
