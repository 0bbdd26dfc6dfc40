//! importman CLI - import API collections and bulk-edit the resulting requests

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use importman::constants::{APP_NAME, APP_VERSION};
use importman::report::tracing_reporter;
use importman::{
    to_curl, to_raw_http, BatchOutcome, BulkTransformEngine, Config, FindReplace, HeaderUpsert, Importer,
    TransformError, TransformReport, TransformSpec, TransformTarget,
};

#[derive(Parser)]
#[command(name = APP_NAME, version = APP_VERSION)]
#[command(about = "Normalize Postman and Swagger/OpenAPI documents into one request list")]
struct Cli {
    /// Config file (defaults to <config dir>/importman/config.yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log at DEBUG level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import documents and list the resulting requests
    List {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Print the requests as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one imported request
    Show {
        file: PathBuf,
        index: usize,
        /// Print as a cURL command
        #[arg(long, conflicts_with = "raw")]
        curl: bool,
        /// Print as a raw HTTP/1.1 request
        #[arg(long)]
        raw: bool,
    },
    /// Find/replace and header upsert across imported requests
    Transform(TransformArgs),
    /// Write the current settings (defaults plus any loaded file) as YAML
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
struct TransformArgs {
    #[arg(required = true)]
    files: Vec<PathBuf>,
    /// Text (or regex with --regex) to find
    #[arg(long, default_value = "")]
    find: String,
    #[arg(long, default_value = "")]
    replace: String,
    #[arg(long)]
    regex: bool,
    /// Field to search: url, headers or body (repeatable)
    #[arg(long = "target")]
    targets: Vec<TransformTarget>,
    /// Header to add or overwrite on every selected request
    #[arg(long, default_value = "")]
    header_name: String,
    #[arg(long, default_value = "")]
    header_value: String,
    /// Restrict to these request indices (repeatable; default all)
    #[arg(long = "select")]
    selection: Vec<usize>,
    /// Only show what would change
    #[arg(long)]
    dry_run: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;

    // Initialize logging to file
    let (dir, file) = split_log_path(&config.log_file);
    let file_appender = tracing_appender::rolling::never(dir, file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        config.tracing_level()
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_max_level(level)
        .init();

    let importer = Importer::new(tracing_reporter()).with_source_prefix(config.prefix_source_name);

    match cli.command {
        Command::List { files, json } => {
            let batch = importer.import_files(&files);
            if json {
                println!("{}", serde_json::to_string_pretty(&batch.requests)?);
            } else {
                for (index, request) in batch.requests.iter().enumerate() {
                    println!("{:>4}  {}", index, request.display_name());
                }
            }
            print_batch_summary(&batch);
            if batch.all_failed() {
                bail!("No valid requests found in any of the given files");
            }
        }
        Command::Show {
            file,
            index,
            curl,
            raw,
        } => {
            let outcome = importer
                .import_file(&file)
                .with_context(|| format!("Error parsing {}", file.display()))?;
            let Some(request) = outcome.requests.get(index) else {
                bail!("{} has {} requests; index {} is out of range", file.display(), outcome.requests.len(), index);
            };
            if curl {
                println!("{}", to_curl(request));
            } else if raw {
                print!("{}", to_raw_http(request));
            } else {
                print!("{}", request.detailed_summary());
            }
        }
        Command::Transform(args) => run_transform(&importer, &config, args)?,
        Command::InitConfig { force } => {
            let path = match cli.config.clone().or_else(Config::default_path) {
                Some(path) => path,
                None => bail!("No config directory on this platform; pass --config"),
            };
            if path.exists() && !force {
                bail!("{} already exists (use --force to overwrite)", path.display());
            }
            config
                .save_to(&path)
                .with_context(|| format!("Failed to write config {}", path.display()))?;
            println!("Wrote {}", path.display());
        }
    }

    Ok(())
}

fn run_transform(importer: &Importer, config: &Config, args: TransformArgs) -> anyhow::Result<()> {
    let mut batch = importer.import_files(&args.files);
    print_batch_summary(&batch);
    if batch.all_failed() {
        bail!("No valid requests found in any of the given files");
    }

    let targets: BTreeSet<TransformTarget> = if args.targets.is_empty() {
        config.default_targets.iter().copied().collect()
    } else {
        args.targets.iter().copied().collect()
    };
    let spec = TransformSpec {
        find_replace: Some(FindReplace {
            pattern: args.find,
            replacement: args.replace,
            is_regex: args.regex,
            targets,
        }),
        header: Some(HeaderUpsert {
            name: args.header_name,
            value: args.header_value,
        }),
    };

    let selection: Vec<usize> = if args.selection.is_empty() {
        (0..batch.requests.len()).collect()
    } else {
        args.selection
    };

    let engine = BulkTransformEngine::new(tracing_reporter());
    let result = if args.dry_run {
        engine.preview_selected(&spec, &batch.requests, &selection)
    } else {
        engine.apply_selected(&spec, &mut batch.requests, &selection)
    };

    let report = match result {
        Ok(report) => report,
        Err(TransformError::NoOperation) => {
            bail!("No operations defined. Pass --find (with a target) or --header-name.")
        }
        Err(err) => return Err(err.into()),
    };

    print_transform_report(&report, args.dry_run);
    if !args.dry_run {
        println!("{}", serde_json::to_string_pretty(&batch.requests)?);
    }
    Ok(())
}

fn print_batch_summary(batch: &BatchOutcome) {
    eprintln!(
        "Imported {} requests from {}/{} files",
        batch.requests.len(),
        batch.successful_documents(),
        batch.documents.len()
    );
    for document in &batch.documents {
        match &document.result {
            Ok(summary) => {
                for failure in &summary.failures {
                    eprintln!("  {}: skipped {}: {}", document.source, failure.location, failure.error);
                }
            }
            Err(err) => eprintln!("  {}: {}", document.source, err),
        }
    }
}

fn print_transform_report(report: &TransformReport, dry_run: bool) {
    let verb = if dry_run { "would change" } else { "changed" };
    eprintln!("{} of {} selected requests {}", report.affected_count(), report.selected, verb);
    for change in &report.changes {
        eprintln!(
            "  [{}] {} {} ({})",
            change.index,
            change.method,
            change.name,
            change.fields.labels().join(", ")
        );
    }
}

fn split_log_path(path: &Path) -> (PathBuf, PathBuf) {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    let file = path
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(format!("{}.log", APP_NAME)));
    (dir, file)
}
