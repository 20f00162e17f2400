use avow::{logging, ConsentRecord, DeployConfig, Verdict, Verifier};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::thread;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "avow", version, about = "Unsubscribe link and consent chain verification")]
struct Cli {
    #[arg(long, global = true, help = "Output machine-readable JSON")]
    json: bool,
    #[arg(
        long,
        global = true,
        default_value_t = 0,
        help = "Pause before showing a result, in milliseconds"
    )]
    delay_ms: u64,
    #[arg(long, global = true, default_value = "warn", help = "Log filter when RUST_LOG is unset")]
    log_level: String,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that an unsubscribe URL parses and uses HTTPS
    Link { url: String },
    /// Check ordering and token strength of a consent record
    Consent {
        #[arg(long, help = "RFC 3339 time of the initial request")]
        initial: DateTime<Utc>,
        #[arg(long, help = "RFC 3339 time of the confirmation")]
        confirmation: DateTime<Utc>,
        #[arg(long)]
        token: String,
    },
    /// Verify the sample consent record relative to now
    DemoConsent,
    /// Validate deployment settings and print the requests they imply
    DeployPlan {
        #[arg(long, env = "CLOUDFLARE_API_TOKEN", hide_env_values = true)]
        api_token: Option<String>,
        #[arg(long, env = "CLOUDFLARE_ACCOUNT_ID")]
        account_id: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init_tracing(&cli.log_level);
    let verifier = Verifier::new();

    match &cli.command {
        Commands::Link { url } => {
            pause(cli.delay_ms);
            let report = verifier.verify_link(url);
            if cli.json {
                print_json(&report);
            } else {
                println!("{}", report.label);
                println!("URL: {}", report.url);
                println!("Checked At: {}", report.checked_at.to_rfc3339());
                println!("Check: {}", report.check);
            }
            exit_for(report.verdict)
        }
        Commands::Consent {
            initial,
            confirmation,
            token,
        } => {
            let record = ConsentRecord::new(*initial, *confirmation, token.clone());
            report_consent(&cli, &verifier, &record)
        }
        Commands::DemoConsent => {
            let record = ConsentRecord::demo(Utc::now());
            report_consent(&cli, &verifier, &record)
        }
        Commands::DeployPlan {
            api_token,
            account_id,
        } => {
            let config = DeployConfig::new(
                api_token.clone().unwrap_or_default(),
                account_id.clone().unwrap_or_default(),
            );
            match config.plan() {
                Ok(requests) => {
                    if cli.json {
                        print_json(&requests);
                    } else {
                        for request in &requests {
                            println!("{}", request);
                        }
                    }
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!(error = %e, "deployment config rejected");
                    eprintln!("error: {}", e);
                    ExitCode::from(2)
                }
            }
        }
    }
}

fn report_consent(cli: &Cli, verifier: &Verifier, record: &ConsentRecord) -> ExitCode {
    pause(cli.delay_ms);
    let report = verifier.verify_consent(record);
    if cli.json {
        print_json(&report);
    } else {
        println!("{}", report.label);
        println!("Initial Request: {}", report.initial_request_time.to_rfc3339());
        println!("Confirmation: {}", report.confirmation_time.to_rfc3339());
        println!("Token: {}", report.token);
        println!("Check: {}", report.check);
        for finding in &report.findings {
            println!("Finding: {:?}", finding);
        }
    }
    exit_for(report.verdict)
}

fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        thread::sleep(Duration::from_millis(delay_ms));
    }
}

fn print_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{}", text),
        Err(e) => eprintln!("error: {}", e),
    }
}

fn exit_for(verdict: Verdict) -> ExitCode {
    if verdict.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
