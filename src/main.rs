use std::io::IsTerminal;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser};
use tracing_subscriber::EnvFilter;

use gogetset::{Config, GoModuleLookup, ImportOverrides, OutputTarget, build_model};

/// Generate getter and setter methods for the structs in a Go file.
#[derive(Debug, Parser)]
#[command(name = "gogetset", version, about)]
struct Cli {
    /// Go source file to read
    #[arg(value_name = "SOURCE")]
    source: PathBuf,

    /// Comma-separated name=path imports that take precedence over the file's own
    #[arg(short, long, value_name = "PAIRS")]
    imports: Option<String>,

    /// Destination file [default: <stem>_getter_setter.go next to SOURCE]
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Write to stdout instead of a file
    #[arg(long, conflicts_with = "output")]
    stdout: bool,

    /// Print the parsed model as JSON instead of generating
    #[arg(long)]
    dump_model: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .init();
}

fn run(cli: Cli) -> gogetset::Result<()> {
    let imports = match &cli.imports {
        Some(spec) => ImportOverrides::parse(spec)?,
        None => ImportOverrides::default(),
    };
    let output = match (cli.stdout, cli.output) {
        (true, _) => OutputTarget::Stdout,
        (false, Some(path)) => OutputTarget::File(path),
        (false, None) => OutputTarget::Default,
    };
    let config = Config::new(cli.source)
        .with_imports(imports)
        .with_output(output);
    let lookup = GoModuleLookup::from_env();

    if cli.dump_model {
        let model = build_model(&config, &lookup)?;
        println!("{}", serde_json::to_string_pretty(&model)?);
        return Ok(());
    }

    let text = gogetset::generate_file(&config, &lookup)?;
    gogetset::write_output(&config, &text)?;
    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
