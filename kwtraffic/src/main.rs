use clap::Parser;
use kwtraffic::{Config, ReportRunner, ReportWriter, ReqwestTrafficEstimator, RunSummary, input, telemetry};
use std::process::ExitCode;

/// Read the input table, estimate every campaign group and stream the report to stdout.
async fn generate(args: &kwtraffic::Args, config: &Config) -> kwtraffic::Result<RunSummary> {
    let table = input::read_table(&args.input)?;
    let estimator = ReqwestTrafficEstimator::new(&config.api)?;
    let runner = ReportRunner::new(estimator, config.estimate.clone());

    let stdout = std::io::stdout();
    let mut report = ReportWriter::new(stdout.lock());
    let mut diag = std::io::stderr();
    runner.run(&table, &mut report, &mut diag).await
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<ExitCode> {
    // Parse CLI args
    let args = kwtraffic::Args::parse();

    // Load configuration
    let config = Config::load(&args)?;

    // If --validate flag is set, exit successfully after config validation
    if args.validate {
        println!("Configuration is valid.");
        return Ok(ExitCode::SUCCESS);
    }

    telemetry::init_telemetry()?;

    tracing::debug!("{:?}", args);

    match generate(&args, &config).await {
        Ok(summary) => {
            tracing::debug!(?summary, "Report written");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            // Fatal errors go to the primary output, after whatever was already reported
            e.log();
            println!("{}", e.user_message());
            Ok(ExitCode::FAILURE)
        }
    }
}
