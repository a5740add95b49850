use clap::Parser;
use std::path::PathBuf;

use unread_mail_export::app;
use unread_mail_export::batch::DEFAULT_MAX_EMAILS;
use unread_mail_export::config::{CLIENT_SECRET_ENV, Config, TOKEN_FILE_ENV};
use unread_mail_export::export::DEFAULT_OUTPUT;

#[derive(Parser)]
#[command(name = "unread_mail_export")]
#[command(about = "Export unread Gmail inbox messages to a spreadsheet", long_about = None)]
struct Cli {
    /// OAuth client secret JSON downloaded from the Google Cloud console
    #[arg(long, env = CLIENT_SECRET_ENV)]
    client_secret: Option<PathBuf>,

    /// Where the OAuth credential is cached between runs
    #[arg(long, env = TOKEN_FILE_ENV)]
    token_file: Option<PathBuf>,

    /// Spreadsheet to write
    #[arg(long, default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Maximum number of unread messages to export
    #[arg(long, default_value_t = DEFAULT_MAX_EMAILS)]
    max_emails: usize,
}

impl From<Cli> for Config {
    fn from(cli: Cli) -> Self {
        Config {
            client_secret_file: cli.client_secret,
            token_file: cli.token_file,
            output: cli.output,
            max_emails: cli.max_emails,
        }
    }
}

fn main() {
    // .env may carry RUST_LOG as well as the credential paths
    let dotenv = dotenvy::dotenv();
    env_logger::init();
    if let Err(e) = dotenv {
        log::debug!("no .env loaded: {e}");
    }

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return;
        }
    };

    match app::run(&Config::from(cli)) {
        Ok(outcome) => {
            println!("{}", outcome.listing_line());
            println!("{outcome}");
        }
        Err(e) => {
            log::debug!("run failed: {e:?}");
            println!("{}", e.user_message());
        }
    }
}
