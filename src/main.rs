use std::error::Error;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use clap::Parser;
use nearby::dispatch::{self, QueryEngine};
use nearby::input::{self, QueryKind};
use nearby::{AdjustedEuclidean, PointStore};

/// Reads a query program from standard input and writes one line of results
/// per query to standard output.
#[derive(Parser)]
struct Cli {
    /// Optional path to write diagnostic logs to instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

pub fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_deref())?;

    let stdin = io::stdin();
    let parsed = input::parse(stdin.lock())?;

    let points = dispatch::build_point_store(parsed.topics, &parsed.questions)?;
    let engine = QueryEngine::new(&points);

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for query in &parsed.queries {
        let line = answer(&engine, &points, query)?;
        writeln!(out, "{}", line)?;
    }
    out.flush()?;
    Ok(())
}

fn answer(
    engine: &QueryEngine<'_, f64>,
    points: &PointStore<f64>,
    query: &input::Query,
) -> Result<String, dispatch::DispatchError> {
    match query.kind {
        QueryKind::Topic => {
            let found = engine.topic::<AdjustedEuclidean>(&query.coords, query.k);
            Ok(found
                .iter()
                .map(|n| points.get(n.point_index).id.to_string())
                .collect::<Vec<_>>()
                .join(" "))
        }
        QueryKind::Question => {
            let found = engine.question::<AdjustedEuclidean>(&query.coords, query.k)?;
            Ok(found
                .iter()
                .map(|h| h.record_id.to_string())
                .collect::<Vec<_>>()
                .join(" "))
        }
    }
}

/// Installs a `tracing-subscriber` `fmt` layer, writing to `log_file` when
/// given or to stderr at a quiet default level otherwise, so stdout stays
/// reserved for query results. Fails, rather than panics, if `log_file`
/// can't be created, so a bad `--log-file` argument is reported through
/// `main`'s ordinary error path like any other fatal condition.
fn init_logging(log_file: Option<&std::path::Path>) -> Result<(), Box<dyn Error>> {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_file {
        Some(path) => {
            let file = File::create(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}
