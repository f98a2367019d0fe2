use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use javaxref::{
    Classpath, IndexOptions, IndexProjectUseCase, JsonLinesSink, NameHierarchy, SnapshotFrontend,
};

mod cli;

use cli::{unescape_name, Commands, OutputFormat};

#[derive(Parser)]
#[command(name = "javaxref")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level and dump every visited node
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Index {
            path,
            classpath,
            output,
            jobs,
            format,
        } => {
            let mut options = IndexOptions::default()
                .with_classpath(Classpath::parse(&classpath))
                .with_verbose(cli.verbose);
            if let Some(jobs) = jobs {
                options = options.with_jobs(jobs);
            }

            let sink = Arc::new(JsonLinesSink::open(output.as_deref())?);
            let use_case = IndexProjectUseCase::new(Arc::new(SnapshotFrontend::new()), sink);

            let interrupt = use_case.interrupt();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, finishing files in progress");
                    interrupt.interrupt();
                }
            });

            info!("Indexing {} with {} jobs", path.display(), options.jobs);
            let summary = use_case.execute(&path, &options).await?;

            match format {
                OutputFormat::Text => {
                    eprintln!("Files:       {}", summary.files);
                    eprintln!("Indexed:     {}", summary.indexed);
                    eprintln!("Failed:      {}", summary.parse_failures + summary.aborted + summary.unreadable);
                    eprintln!("Symbols:     {}", summary.counts.symbols);
                    eprintln!("References:  {}", summary.counts.references);
                    eprintln!("Locals:      {}", summary.counts.local_symbols);
                    eprintln!("Errors:      {}", summary.counts.errors);
                    if summary.interrupted {
                        eprintln!("Run was interrupted.");
                    }
                }
                OutputFormat::Json => eprintln!("{}", serde_json::to_string_pretty(&summary)?),
            }
        }

        Commands::Names { serialized, format } => {
            for input in serialized {
                let name = NameHierarchy::deserialize(&unescape_name(&input))?;
                match format {
                    OutputFormat::Text => println!("{}", name),
                    OutputFormat::Json => println!("{}", serde_json::to_string(&name)?),
                }
            }
        }
    }

    Ok(())
}
