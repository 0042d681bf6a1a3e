use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use miette::{Context, IntoDiagnostic};

use shaderlift_translate::TranslateOptions;

/// shaderlift: shader-dialect units to shader IR
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Input unit (JSON produced by the front-end)
    input: PathBuf,

    /// Output path (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only translate these stage entries (repeatable)
    #[arg(short, long = "entry")]
    entries: Vec<String>,

    /// Translate and validate without producing output
    #[arg(long)]
    dry_run: bool,
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> miette::Result<()> {
    let cli = Cli::parse();

    // 1. Read the unit.
    let text = std::fs::read_to_string(&cli.input)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {}", cli.input.display()))?;
    let unit = shaderlift_ast::Unit::from_json(&text)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to load unit {}", cli.input.display()))?;
    log::debug!(
        "loaded {} declarations from {}",
        unit.decls.len(),
        cli.input.display()
    );

    // 2. Translate.
    let options = TranslateOptions {
        entries: cli.entries,
    };
    let module = shaderlift_translate::translate(&unit, &options)
        .into_diagnostic()
        .wrap_err("translation failed")?;

    // 3. Dry-run: stop here.
    if cli.dry_run {
        return Ok(());
    }

    // 4. Write the dump.
    let dump = shaderlift_ir::dump_module(&module);
    match cli.output {
        Some(path) => std::fs::write(&path, dump)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display()))?,
        None => print!("{dump}"),
    }

    Ok(())
}
