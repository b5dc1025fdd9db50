//! `topk-autocomplete` CLI: the external query surface described in `§6`,
//! standing in for an embedding HTTP service. `build` ingests a corpus and
//! emits an artifact; `query` loads one and runs a single request.

use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use autocomplete_topk::{Builder, DefaultArtifact, TopKEngine};

#[derive(Parser)]
#[command(name = "topk-autocomplete", about = "Top-k query autocompletion over a frozen corpus")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build an index artifact from a `<score> <completion>` corpus file.
    Build {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
    },
    /// Run one query against a previously built artifact.
    Query {
        #[arg(long)]
        index: PathBuf,
        #[arg(long, value_enum, default_value_t = Mode::Topk)]
        mode: Mode,
        #[arg(long, default_value_t = 10)]
        k: usize,
        /// Print the per-stage timing breakdown to stderr.
        #[arg(long)]
        timing: bool,
        query: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    Prefix,
    Conjunctive,
    Topk,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Command::Build { input, output } => run_build(&input, &output),
        Command::Query {
            index,
            mode,
            k,
            timing,
            query,
        } => run_query(&index, mode, k, timing, &query),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run_build(input: &PathBuf, output: &PathBuf) -> Result<(), autocomplete_topk::AutocompleteError> {
    let span = tracing::info_span!("build", input = %input.display());
    let _enter = span.enter();

    let file = File::open(input)?;
    let lines: Vec<String> = BufReader::new(file)
        .lines()
        .collect::<Result<_, io::Error>>()?;
    let artifact: DefaultArtifact =
        Builder::from_lines(lines.iter().map(String::as_str))?;

    tracing::info!(completions = artifact.num_completions(), bytes = artifact.bytes(), "built index");

    let out = File::create(output)?;
    artifact.save(BufWriter::new(out))?;
    Ok(())
}

fn run_query(
    index: &PathBuf,
    mode: Mode,
    k: usize,
    timing: bool,
    query: &str,
) -> Result<(), autocomplete_topk::AutocompleteError> {
    let file = File::open(index)?;
    let artifact = DefaultArtifact::load(BufReader::new(file))?;
    let mut engine = TopKEngine::new(&artifact);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if timing {
        let (results, timings) = engine.topk_timed(query, k);
        for r in results {
            writeln!(out, "{}\t{}", r.score, r.text).ok();
        }
        eprintln!(
            "parse={:?} lex_range_lookup={:?} topk_retrieval={:?} materialize={:?}",
            timings.parse, timings.lex_range_lookup, timings.topk_retrieval, timings.materialize
        );
        return Ok(());
    }

    let results: Vec<(u32, String)> = match mode {
        Mode::Prefix => engine
            .prefix_topk(query, k)
            .map(|r| (r.score, r.text.to_string()))
            .collect(),
        Mode::Conjunctive => engine
            .conjunctive_topk(query, k)
            .map(|r| (r.score, r.text.to_string()))
            .collect(),
        Mode::Topk => engine
            .topk(query, k)
            .map(|r| (r.score, r.text.to_string()))
            .collect(),
    };
    for (score, text) in results {
        writeln!(out, "{score}\t{text}").ok();
    }
    Ok(())
}
