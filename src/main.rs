use bench_runner::config::{ Command, Config };
use bench_runner::runner::Runner;
use bench_runner::{ export, report };

use std::process::ExitCode;
use tokio::runtime::{ Builder, Runtime };
use tracing::error;

fn main() -> ExitCode {
    bench_runner::init_tracing();

    let config = match Config::parse() {
        Ok(Command::Run(config)) => config,
        Ok(Command::Help) => {
            Config::print_help();
            return ExitCode::SUCCESS;
        }
        Ok(Command::Version) => {
            Config::print_version();
            return ExitCode::SUCCESS;
        }
        Err(err) => {
            eprintln!("{}\nUse --help for more info", err);
            return ExitCode::FAILURE;
        }
    };

    let runner = match Runner::new(config) {
        Ok(runner) => runner,
        Err(err) => {
            error!(error = %err, "cannot start benchmark");
            return ExitCode::FAILURE;
        }
    };
    let runtime = match get_runtime(runner.config().threads) {
        Ok(runtime) => runtime,
        Err(err) => {
            error!(error = %err, "failed to create tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    report::print_banner(runner.config());
    let benchmark = runtime.block_on(runner.benchmark());
    report::print_details(&benchmark.report);

    let Some(summary) = &benchmark.summary else {
        println!("No successful requests.");
        return ExitCode::SUCCESS;
    };
    report::print_table(summary);

    match export::save(&benchmark, &runner.config().export_path()) {
        Ok(Some(path)) => {
            println!("\nData saved to {}", path.display());
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "export failed");
            ExitCode::FAILURE
        }
    }
}

/// Multi-threaded runtime, `threads` overrides the worker thread count
fn get_runtime(threads: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    if let Some(threads) = threads {
        builder.worker_threads(threads);
    }
    builder.enable_all().build()
}
