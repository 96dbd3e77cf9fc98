use clap::{Parser, Subcommand};
use geoiplookup_core::{Handler, Options};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "geoiplookup", version, about = "Resolve IP addresses to RIR country codes")]
struct Cli {
    /// Store file
    #[arg(long, env = "GEOIPLOOKUP_DB_PATH", default_value = "geoip.db", global = true)]
    db_path: PathBuf,

    /// Reuse delegation files already in --data-dir instead of downloading
    #[arg(long, env = "GEOIPLOOKUP_NO_DOWNLOAD", global = true)]
    no_download: bool,

    /// Directory for delegation files
    #[arg(long, env = "GEOIPLOOKUP_DATA_DIR", default_value = ".", global = true)]
    data_dir: PathBuf,

    /// Delegation file URL; repeat to replace the five RIR defaults
    #[arg(long = "source", global = true)]
    sources: Vec<String>,

    /// Per-request HTTP timeout
    #[arg(long, default_value_t = 300, global = true)]
    timeout_secs: u64,

    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download RIR delegation files and load them into the store
    Populate,
    /// Print the country code of each address
    Lookup {
        #[arg(required = true)]
        ips: Vec<String>,
    },
}

mod helpers {
    use super::*;

    pub fn init_logging(verbose: bool) {
        let default = if verbose { "debug" } else { "info" };
        let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
            .format_timestamp(None)
            .try_init();
    }

    pub fn options(cli: &Cli) -> Result<Options, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(cli.timeout_secs))
            .build()?;
        let mut opts = Options::new()
            .with_db_path(&cli.db_path)
            .with_data_dir(&cli.data_dir)
            .with_download_rir_files(!cli.no_download)
            .with_http_client(client);
        if !cli.sources.is_empty() {
            opts = opts.with_sources(cli.sources.iter().cloned());
        }
        Ok(opts)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    helpers::init_logging(cli.verbose);

    let opts = match helpers::options(&cli) {
        Ok(o) => o,
        Err(e) => {
            error!("failed to build http client: {e}");
            return ExitCode::FAILURE;
        }
    };
    // The store is the only state we have; without it there is nothing to do.
    let handler = match Handler::open(opts) {
        Ok(h) => h,
        Err(e) => {
            error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let code = match &cli.command {
        Command::Populate => match handler.populate_data().await {
            Ok(report) => {
                println!(
                    "files={} loaded={} skipped={}",
                    report.files, report.loaded, report.skipped
                );
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
        Command::Lookup { ips } => {
            for ip in ips {
                println!("{ip}\t{}", handler.lookup(ip));
            }
            ExitCode::SUCCESS
        }
    };

    handler.close();
    code
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lookup_with_globals() {
        let cli = Cli::parse_from([
            "geoiplookup",
            "--db-path",
            "/tmp/g.db",
            "lookup",
            "1.1.1.1",
            "2001:db8::1",
        ]);
        assert_eq!(cli.db_path, PathBuf::from("/tmp/g.db"));
        match cli.command {
            Command::Lookup { ips } => assert_eq!(ips, vec!["1.1.1.1", "2001:db8::1"]),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn sources_replace_defaults() {
        let cli = Cli::parse_from([
            "geoiplookup",
            "populate",
            "--no-download",
            "--source",
            "https://example.test/delegated-x",
        ]);
        let opts = helpers::options(&cli).unwrap();
        assert!(!opts.download_rir_files);
        assert_eq!(opts.sources, vec!["https://example.test/delegated-x".to_string()]);
    }

    #[test]
    fn lookup_requires_an_address() {
        assert!(Cli::try_parse_from(["geoiplookup", "lookup"]).is_err());
    }
}
