use std::{fs, path::PathBuf, process::ExitCode, thread};

use clap::Parser;
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ango_compiler::{compile_schema, GeneratedFile, GenerationError, GoOptions, JsOptions, ParseOptions, Target};

mod error;
mod output;

use error::CliError;
use output::{write_files, Overwrite};

#[derive(Parser, Debug)]
#[command(name = "ango", version)]
#[command(about = "Compile an ango schema into wire-compatible Go and JavaScript code", long_about = None)]
struct Cli {
    /// Input `.ango` schema file
    #[arg(short, long)]
    input: PathBuf,

    /// Go output directory
    #[arg(long = "go", value_name = "DIR")]
    go_dir: Option<PathBuf>,

    /// JavaScript output directory
    #[arg(long = "js", value_name = "DIR")]
    js_dir: Option<PathBuf>,

    /// Package identifier for the generated Go code
    #[arg(long, default_value = "main")]
    go_package: String,

    /// Reject 64-bit integers instead of mapping them to BigInt
    #[arg(long)]
    js_no_bigint: bool,

    /// Overwrite existing files without asking
    #[arg(long)]
    force_overwrite: bool,

    /// Report every schema error instead of stopping at the first
    #[arg(long)]
    collect_errors: bool,

    /// Print the resolved schema and its version as JSON
    #[arg(long)]
    dump_schema: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    /// Requested targets and their output directories, Go first.
    fn targets(&self) -> Vec<(Target, PathBuf)> {
        let mut targets = Vec::new();
        if let Some(dir) = &self.go_dir {
            let options = GoOptions { package: self.go_package.clone() };
            targets.push((Target::Go(options), dir.clone()));
        }
        if let Some(dir) = &self.js_dir {
            let options = JsOptions { bigint: !self.js_no_bigint };
            targets.push((Target::JavaScript(options), dir.clone()));
        }
        targets
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .init();
}

fn run(cli: &Cli) -> Result<(), CliError> {
    let text = fs::read_to_string(&cli.input).map_err(|source| CliError::Read {
        path: cli.input.clone(),
        source,
    })?;

    let options = if cli.collect_errors {
        ParseOptions::collect_errors()
    } else {
        ParseOptions::default()
    };
    let compiled = compile_schema(&text, &options)?;
    let schema = &compiled.schema;
    let version = &compiled.fingerprint;
    info!(
        protocol = %schema.name,
        messages = schema.messages.len(),
        enums = schema.enums.len(),
        constants = schema.constants.len(),
        "parsed schema"
    );
    debug!(%version, "calculated protocol version");

    if cli.dump_schema {
        let dump = serde_json::json!({ "version": version, "schema": schema });
        println!("{}", serde_json::to_string_pretty(&dump)?);
    }

    let targets = cli.targets();
    if targets.is_empty() {
        println!("Parsed input file. There were no errors.");
        println!("Use options `--go <dir>` and `--js <dir>` to generate code.");
        println!("Version string is: {}", version);
        return Ok(());
    }

    // Generators share the schema read-only and render fully in memory, so
    // they run side by side. Files are written afterwards, one target at a
    // time, so overwrite prompts never interleave.
    let rendered: Vec<Result<Vec<GeneratedFile>, GenerationError>> = thread::scope(|scope| {
        let handles: Vec<_> = targets
            .iter()
            .map(|(target, _)| scope.spawn(move || target.generate(schema, version)))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    let overwrite = if cli.force_overwrite { Overwrite::Force } else { Overwrite::Ask };
    let mut failed = 0;
    for ((target, dir), result) in targets.iter().zip(rendered) {
        let outcome = result
            .map_err(CliError::from)
            .and_then(|files| write_files(dir, &files, overwrite));
        match outcome {
            Ok(written) => info!(language = %target, files = written.len(), dir = %dir.display(), "generated"),
            Err(err) => {
                eprintln!("{}", err);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        return Err(CliError::TargetsFailed {
            failed,
            total: targets.len(),
        });
    }
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    debug!(version = env!("CARGO_PKG_VERSION"), "ango starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", err);
            ExitCode::FAILURE
        }
    }
}
