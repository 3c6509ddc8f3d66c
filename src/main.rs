use std::{fs::File, path::PathBuf};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use env_logger::{Env, Target};
use log::info;
use reqwest::Client;

use rt_sheet_sync::{
    auth::{Authenticator, ServiceAccountKey},
    sheets::parse_column,
    sync::{self, Options},
    GoogleSheet, Site, Spreadsheet,
};

#[derive(Parser)]
#[command(
    name = "rt-sheet-sync",
    version,
    about = "Fill a Google Sheet with Rotten Tomatoes metadata for the urls it lists"
)]
struct Cli {
    /// Service account key file
    #[arg(long, env = "RT_SYNC_CREDENTIALS", default_value = "credentials.json")]
    credentials: PathBuf,
    /// Spreadsheet title, as shared with the service account
    #[arg(long, default_value = "Movies & TV")]
    spreadsheet: String,
    /// Open the spreadsheet by id instead of by title
    #[arg(long)]
    spreadsheet_id: Option<String>,
    /// Worksheet (tab) holding the list
    #[arg(long, default_value = "Show List")]
    worksheet: String,
    /// Column holding the urls, as letters (Q) or a number (17)
    #[arg(long, default_value = "Q", value_parser = parse_column)]
    url_column: u32,
    /// Row holding the field headers
    #[arg(long, default_value_t = 1)]
    header_row: u32,
    /// First url row
    #[arg(long, default_value_t = 2)]
    start_row: u32,
    /// Last url row, inclusive (default: last filled row)
    #[arg(long)]
    end_row: Option<u32>,
    /// Write the log here instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn init_logger(&self) -> Result<()> {
        let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("info"));

        if let Some(path) = &self.log_file {
            let file = File::create(path)
                .with_context(|| format!("cannot create log file {}", path.display()))?;
            builder.target(Target::Pipe(Box::new(file)));
        }

        builder.init();
        Ok(())
    }

    fn options(&self) -> Result<Options> {
        ensure!(self.start_row >= 1, "--start-row must be at least 1");
        ensure!(self.header_row >= 1, "--header-row must be at least 1");
        ensure!(
            self.start_row > self.header_row,
            "--start-row {} must come after --header-row {}",
            self.start_row,
            self.header_row
        );
        if let Some(end_row) = self.end_row {
            ensure!(
                end_row >= self.start_row,
                "--end-row {end_row} is before --start-row {}",
                self.start_row
            );
        }

        Ok(Options {
            url_column: self.url_column,
            header_row: self.header_row,
            start_row: self.start_row,
            end_row: self.end_row,
        })
    }

    fn spreadsheet(&self) -> Spreadsheet {
        match &self.spreadsheet_id {
            Some(id) => Spreadsheet::Id(id.clone()),
            None => Spreadsheet::Title(self.spreadsheet.clone()),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.init_logger()?;
    let options = cli.options()?;

    let key = ServiceAccountKey::from_file(&cli.credentials)?;
    info!("authenticating as {}", key.client_email);

    let client = Client::new();
    let auth = Authenticator::new(client.clone(), key);
    let mut sheet = GoogleSheet::open(client, auth, &cli.spreadsheet(), &cli.worksheet).await?;

    let site = Site::new()?;
    sync::run(&mut sheet, &site, &options).await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(args: &[&str]) -> Result<Options> {
        let cli = Cli::try_parse_from(std::iter::once("rt-sheet-sync").chain(args.iter().copied()))?;
        cli.options()
    }

    #[test]
    fn defaults_read_urls_below_the_header() {
        let options = options(&[]).unwrap();
        assert_eq!(options.url_column, 17);
        assert_eq!(options.header_row, 1);
        assert_eq!(options.start_row, 2);
        assert_eq!(options.end_row, None);
    }

    #[test]
    fn url_rows_must_follow_the_header_row() {
        assert!(options(&["--start-row", "1"]).is_err());
        assert!(options(&["--header-row", "3", "--start-row", "3"]).is_err());
        assert!(options(&["--header-row", "3", "--start-row", "2"]).is_err());
        assert!(options(&["--header-row", "3", "--start-row", "4"]).is_ok());
    }

    #[test]
    fn end_row_must_not_precede_start_row() {
        assert!(options(&["--start-row", "10", "--end-row", "9"]).is_err());
        assert!(options(&["--start-row", "10", "--end-row", "10"]).is_ok());
    }

    #[test]
    fn url_column_accepts_letters_or_numbers() {
        assert_eq!(options(&["--url-column", "AA"]).unwrap().url_column, 27);
        assert_eq!(options(&["--url-column", "3"]).unwrap().url_column, 3);
        assert!(options(&["--url-column", "Q1"]).is_err());
    }
}
