use std::process::ExitCode;

use clap::Parser;
use gb_backend::BackendRequest;
use gb_bench::{run, BenchParams};

/// Dense single-precision matrix-multiplication micro-benchmark.
#[derive(Debug, Parser)]
#[command(
    name = "gemm-bench",
    version,
    about = "SGEMM micro-benchmark emitting one JSON report per run"
)]
struct Cli {
    /// Output dimension N; M is always set equal to N
    #[arg(default_value_t = 2048, allow_negative_numbers = true)]
    n: i64,

    /// Inner dimension K
    #[arg(default_value_t = 2048, allow_negative_numbers = true)]
    k: i64,

    /// Number of timed multiply iterations
    #[arg(default_value_t = 50, allow_negative_numbers = true)]
    repeats: i64,

    /// Compute backend: auto, cpu, or gpu
    #[arg(long, env = "GEMM_BENCH_BACKEND", default_value = "auto")]
    backend: String,
}

/// One line on stdout per run; everything else goes to stderr.
fn execute(cli: &Cli) -> anyhow::Result<()> {
    log::debug!("parsed arguments: {cli:?}");
    let backend = cli.backend.parse::<BackendRequest>()?;
    let params = BenchParams {
        n: cli.n,
        k: cli.k,
        repeats: cli.repeats,
        backend,
    };
    let report = run(&params)?;
    println!("{}", report.to_json()?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // Usage problems exit 1; --help and --version render and exit 0.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::FAILURE
            } else {
                ExitCode::SUCCESS
            };
        }
    };

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("gemm-bench: {err}");
            eprintln!("usage: gemm-bench [N] [K] [repeats] [--backend auto|cpu|gpu]");
            ExitCode::FAILURE
        }
    }
}
