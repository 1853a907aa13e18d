use clap::{Arg, ArgAction, Command, value_parser};
use corpus_noise::{Pipeline, PipelineState, ProcessType, Side, TranslationUnit};
use std::io::{self, BufRead, BufWriter, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("corpus-noise")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run a preprocessing pipeline over a tab-separated parallel corpus read from stdin")
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Pipeline configuration (JSON)")
                .required(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .short('s')
                .help("Seed of the random generator, for reproducible noise")
                .value_parser(value_parser!(u64)),
        )
        .arg(
            Arg::new("inference")
                .long("inference")
                .help("Run in inference mode (training-only operators are skipped)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("tokens")
                .long("tokens")
                .short('t')
                .help("Print tokens instead of detokenized text")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("batch-size")
                .long("batch-size")
                .short('b')
                .help("Number of lines processed per batch")
                .default_value("1000")
                .value_parser(value_parser!(usize)),
        )
        .get_matches();

    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(
            &std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default(),
        ))
        .init();

    let config_path = matches
        .get_one::<PathBuf>("config")
        .ok_or("missing --config")?;
    let process_type = if matches.get_flag("inference") {
        ProcessType::Inference
    } else {
        ProcessType::Training
    };
    let print_tokens = matches.get_flag("tokens");
    let batch_size = matches
        .get_one::<usize>("batch-size")
        .copied()
        .unwrap_or(1000)
        .max(1);

    let pipeline = Pipeline::from_file(config_path, process_type)?;
    info!(
        "Running {} pipeline: {}",
        process_type,
        pipeline.operator_names().join(" -> ")
    );

    let mut state = match matches.get_one::<u64>("seed") {
        Some(&seed) => PipelineState::seeded(seed),
        None => PipelineState::from_entropy(),
    };

    let stdin = io::stdin();
    let mut out = BufWriter::new(io::stdout().lock());
    let mut batch = Vec::with_capacity(batch_size);

    for line in stdin.lock().lines() {
        batch.push(parse_line(&line?));
        if batch.len() == batch_size {
            let units = pipeline.run(std::mem::take(&mut batch), &mut state)?;
            write_units(&mut out, &units, print_tokens)?;
        }
    }
    if !batch.is_empty() {
        let units = pipeline.run(batch, &mut state)?;
        write_units(&mut out, &units, print_tokens)?;
    }
    out.flush()?;

    for (operator, counters) in state.counters() {
        info!(
            "{}: {} units in, {} units out",
            operator, counters.input, counters.output
        );
    }

    Ok(())
}

/// Log filter from `RUST_LOG`-style directives, `info` when none are given
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn parse_line(line: &str) -> TranslationUnit {
    match line.split_once('\t') {
        Some((source, target)) => TranslationUnit::with_target(source, target),
        None => TranslationUnit::new(line),
    }
}

fn render(tu: &TranslationUnit, side: Side, print_tokens: bool) -> Option<String> {
    match tu.tokenizer(side) {
        Some(tokenizer) if print_tokens => Some(tokenizer.serialize(tu.tokens(side)).join(" ")),
        _ => tu.detok(side),
    }
}

fn write_units<W: Write>(
    out: &mut W,
    units: &[TranslationUnit],
    print_tokens: bool,
) -> io::Result<()> {
    for tu in units {
        let source = render(tu, Side::Source, print_tokens).unwrap_or_default();
        match render(tu, Side::Target, print_tokens) {
            Some(target) => writeln!(out, "{}\t{}", source, target)?,
            None => writeln!(out, "{}", source)?,
        }
    }
    Ok(())
}
