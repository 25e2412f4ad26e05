extern crate minijava_analyzer;

use std::path::Path;
use std::process;

use annotate_snippets::display_list::DisplayList;
use clap::{App, Arg};
use tracing_subscriber::EnvFilter;

use minijava_analyzer::error::LineFault;
use minijava_analyzer::report::Outcome;
use minijava_analyzer::source::{self, SourceLine};
use minijava_analyzer::{lexical, pipeline, semantic, syntax, Analysis, Controls, LoadError, Status};

const STAGES: [&str; 4] = ["lexical", "syntax", "semantic", "run"];

struct Options<'a> {
    stage: &'a str,
    annotate: bool,
    color: bool,
}

fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let matches = App::new("minijava-check")
        .version(env!("CARGO_PKG_VERSION"))
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .arg(Arg::with_name("stage")
            .long("stage")
            .short("s")
            .takes_value(true)
            .possible_values(&STAGES)
            .default_value("run")
            .help("Which analysis to run; `run` chains all three"))
        .arg(Arg::with_name("annotate")
            .long("annotate")
            .help("Show each faulty line with the offending part marked"))
        .arg(Arg::with_name("no-color")
            .long("no-color")
            .help("Disable colored annotations"))
        .arg(Arg::with_name("FILE")
            .required(true)
            .multiple(true)
            .help("Source files, one declaration per line"))
        .get_matches();

    let options = Options {
        stage: matches.value_of("stage").unwrap_or("run"),
        annotate: matches.is_present("annotate"),
        color: !matches.is_present("no-color"),
    };

    let mut exit_code = 0;
    for arg in matches.values_of("FILE").into_iter().flatten() {
        match check_file(Path::new(arg), &options) {
            Ok(Some(Status::Failure)) => exit_code = exit_code.max(1),
            Ok(_) => {}
            Err(error) => {
                eprintln!("{}", error);
                exit_code = 2;
            }
        }
    }
    process::exit(exit_code);
}

fn check_file(path: &Path, options: &Options) -> Result<Option<Status>, LoadError> {
    let text = source::load(path)?;
    let name = path.file_name().map(|name| name.to_string_lossy()).unwrap_or_default();
    tracing::info!("{} opened successfully.", name);

    let origin = path.display().to_string();
    let status = match options.stage {
        "lexical"  => print_analysis(lexical::analyze(&text), &origin, options),
        "syntax"   => print_analysis(syntax::analyze(&text), &origin, options),
        "semantic" => print_analysis(semantic::analyze(&text), &origin, options),
        _ => {
            let report = pipeline::run(&text);
            let controls = Controls::source_loaded().after_run(&report);
            tracing::debug!(?controls, "stages available after run");
            println!("{}", report);
            if options.annotate {
                print_faults(report.faults(), &origin, options.color);
            }
            report.status()
        }
    };

    Ok(status)
}

fn print_analysis<T: Outcome>(analysis: Analysis<T>, origin: &str, options: &Options) -> Option<Status> {
    println!("{}", analysis);
    if let (true, Some(report)) = (options.annotate, analysis.report()) {
        print_faults(report.faults(), origin, options.color);
    }
    analysis.status()
}

fn print_faults(faults: Vec<(&SourceLine, LineFault)>, origin: &str, color: bool) {
    for (line, fault) in &faults {
        let snippet = fault.create_snippet(line, Some(origin), color);
        println!("{}", DisplayList::from(snippet));
    }
}
