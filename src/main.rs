use std::process::ExitCode;

use clap::{error::ErrorKind, Arg, ArgMatches, Command};
use owo_colors::{OwoColorize, Stream};
use tracing::{debug, trace};
use tracing_subscriber::{filter, prelude::*};

use transducers::{table, Kind};

fn cli() -> clap::Command {
    Command::new("transducers")
        .about("Minimizes Mealy and Moore machines given as semicolon separated tables")
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbosity")
                .num_args(0..=1)
                .require_equals(true)
                .value_parser(["info", "debug", "trace"])
                .default_missing_value("info"),
        )
        .arg(
            Arg::new("kind")
                .required(true)
                .value_parser(["mealy", "moore"])
                .help("kind of the machine in the input table"),
        )
        .arg(
            Arg::new("input")
                .required(true)
                .help("table to read the machine from"),
        )
        .arg(
            Arg::new("output")
                .required(true)
                .help("file the minimized machine is written to"),
        )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches
        .try_get_one::<String>("verbosity")
        .ok()
        .flatten()
        .map(|m| m.as_str())
    {
        Some("trace") => filter::LevelFilter::TRACE,
        Some("debug") => filter::LevelFilter::DEBUG,
        Some("info") => filter::LevelFilter::INFO,
        _ => filter::LevelFilter::WARN,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn run(matches: &ArgMatches) -> Result<table::Summary, Box<dyn std::error::Error>> {
    let kind: Kind = matches
        .get_one::<String>("kind")
        .expect("argument is required")
        .parse()?;
    let input = matches
        .get_one::<String>("input")
        .expect("argument is required");
    let output = matches
        .get_one::<String>("output")
        .expect("argument is required");

    debug!("minimizing {kind} machine from {input} into {output}");
    let start = std::time::Instant::now();
    let summary = table::minimize_file(kind, input, output)?;
    debug!("minimization took {}µs", start.elapsed().as_micros());
    Ok(summary)
}

/// The message for an argument error, `None` if clap only wants to show help or version.
fn usage_error(e: &clap::Error) -> Option<String> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
        _ => {
            let rendered = e.render().to_string();
            Some(rendered.trim_start_matches("error:").trim().to_string())
        }
    }
}

fn fail(message: impl std::fmt::Display) -> ExitCode {
    println!(
        "{} {message}",
        "error:".if_supports_color(Stream::Stdout, |t| t.red())
    );
    ExitCode::FAILURE
}

pub fn main() -> ExitCode {
    let matches = match cli().try_get_matches() {
        Ok(matches) => matches,
        Err(e) => match usage_error(&e) {
            Some(message) => return fail(message),
            None => e.exit(),
        },
    };

    setup_logging(&matches);

    match run(&matches) {
        Ok(summary) => {
            println!(
                "{} {} machine, {} -> {} states",
                "done:".if_supports_color(Stream::Stdout, |t| t.green()),
                summary.kind,
                summary.states_before,
                summary.states_after
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(e),
    }
}
