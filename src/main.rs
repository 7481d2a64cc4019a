use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use flooring_sync::config::Settings;
use flooring_sync::fetch::ReportClient;
use flooring_sync::report::{self, ReportDescriptor};
use flooring_sync::runlog::{Notifier, RunLog};
use flooring_sync::{convert, Result, ToolError};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Sync dealer flooring reports from Smartsheet into standardized workbooks."
)]
struct Cli {
    /// Print the list of configured dealers and exit.
    #[arg(short, long)]
    list: bool,

    /// Dealer to include (can use multiple times).
    #[arg(short, long = "dealer")]
    dealer: Vec<String>,

    /// Dealer to ignore (can use multiple times).
    #[arg(short, long = "ignore")]
    ignore: Vec<String>,

    /// Download spreadsheets unless --no-download.
    #[arg(long, overrides_with = "no_download")]
    download: bool,

    /// Skip the download step.
    #[arg(long)]
    no_download: bool,

    /// Create Excel sheets unless --no-excel.
    #[arg(long, overrides_with = "no_excel")]
    excel: bool,

    /// Skip the conversion step.
    #[arg(long)]
    no_excel: bool,
}

impl Cli {
    fn download_enabled(&self) -> bool {
        self.download || !self.no_download
    }

    fn excel_enabled(&self) -> bool {
        self.excel || !self.no_excel
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        // Startup failures happen before the run log exists; everything
        // afterwards is reported through the log and the digest.
        error!("{err}");
        eprintln!("error: {err}");
    }
    // Errors inside the run are reported via the log and the email digest,
    // never through the exit status.
    std::process::exit(0);
}

fn run(cli: Cli) -> Result<()> {
    init_logging()?;

    if cli.list {
        let source_dir = std::env::var("SOURCE_DIR").ok().map(std::path::PathBuf::from);
        for report in report::configured_reports(source_dir.as_deref())? {
            println!("{}", report.name);
        }
        return Ok(());
    }

    let settings = Settings::from_env()?;
    let mut log = RunLog::new();

    if let Err(err) = execute(&cli, &settings, &mut log) {
        log.error(format!("Uncaught error in main: {err}"));
    }

    if log.has_errors() {
        match &settings.mail {
            Some(mail) => {
                if let Err(err) = Notifier::new(mail).send_digest(&log) {
                    error!("failed to send error digest: {err}");
                }
            }
            None => log.log("errors occurred but no mail transport is configured"),
        }
    }
    Ok(())
}

/// Runs the enabled pipeline stages against the selected dealers.
fn execute(cli: &Cli, settings: &Settings, log: &mut RunLog) -> Result<()> {
    let reports = report::load_reports(&settings.reports_path())?;
    let selected: Vec<ReportDescriptor> = report::select(&reports, &cli.dealer, &cli.ignore);
    debug!(selected = selected.len(), "dealers selected");

    if cli.download_enabled() {
        let client = ReportClient::new(
            settings.api_token.clone(),
            settings.assume_user.clone(),
        )?;
        client.fetch_all(&selected, &settings.staging_dir(), log)?;
    }
    if cli.excel_enabled() {
        convert::convert_all(
            &settings.staging_dir(),
            &settings.template_path(),
            &settings.target_dir,
            log,
        )?;
    }
    Ok(())
}

fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| ToolError::Logging(err.to_string()))
}
