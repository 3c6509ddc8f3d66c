use log::{error, info, warn};
use select::document::Document;

use crate::{
    error::{Result, SheetError},
    fetch::PageSource,
    parse,
    record::{CellValue, Field, Kind, Record},
    sheets::{Sheet, SheetCoordinate},
};

/// Which part of the sheet a run reads and writes.
#[derive(Clone, Debug)]
pub struct Options {
    pub url_column: u32,
    pub header_row: u32,
    pub start_row: u32,
    /// Inclusive; `None` runs to the last filled row.
    pub end_row: Option<u32>,
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Summary {
    pub written: usize,
    pub skipped: usize,
}

/// The column each field is written to, read off the header row.
#[derive(Debug, PartialEq)]
pub struct Columns(Vec<(Field, u32)>);

impl Columns {
    pub fn from_headers(headers: &[String]) -> Result<Self, SheetError> {
        enum_iterator::all::<Field>()
            .map(|field| {
                headers
                    .iter()
                    .position(|header| header.trim() == field.header())
                    .map(|index| (field, index as u32 + 1))
                    .ok_or(SheetError::MissingHeader(field.header()))
            })
            .collect::<Result<_, _>>()
            .map(Self)
    }

    pub fn column(&self, field: Field) -> Option<u32> {
        self.0
            .iter()
            .find(|(f, _)| *f == field)
            .map(|&(_, column)| column)
    }

    pub fn cells(&self, row: u32, record: &Record) -> Vec<(SheetCoordinate, CellValue)> {
        self.0
            .iter()
            .map(|&(field, column)| (SheetCoordinate::new(row, column), record.cell(field)))
            .collect()
    }
}

/// Fetches one page and turns it into a record. TV pages also pull the
/// series page for its premiere year; failing that only loses the year.
pub async fn scrape<P: PageSource>(pages: &P, url: &str) -> Result<Record> {
    let html = pages.fetch(url).await?;
    let document = Document::from(html.as_str());

    let record = match parse::page_kind(&document)? {
        Kind::Movie => parse::movie(&document),
        Kind::TvShow => {
            let series_url = parse::series_url(url);
            let on_series_page = series_url.as_deref() == Some(url.trim().trim_end_matches('/'));

            let fetched = match series_url {
                Some(series_url) if !on_series_page => match pages.fetch(&series_url).await {
                    Ok(html) => Some(Document::from(html.as_str())),
                    Err(e) => {
                        warn!("no series year for {url}: {e}");
                        None
                    }
                },
                _ => None,
            };

            let series = if on_series_page {
                Some(&document)
            } else {
                fetched.as_ref()
            };
            parse::tv_show(&document, url, series)
        }
    };

    Ok(record)
}

/// Reads the url column and fills in one row per url, in order. Rows whose
/// page cannot be fetched or recognised are logged and skipped; sheet and
/// credential failures end the run.
pub async fn run<S: Sheet, P: PageSource>(
    sheet: &mut S,
    pages: &P,
    options: &Options,
) -> Result<Summary> {
    let headers = sheet.read_row(options.header_row).await?;
    let columns = Columns::from_headers(&headers)?;

    let urls = sheet
        .read_column(options.url_column, options.start_row, options.end_row)
        .await?;

    let mut summary = Summary::default();

    for (row, url) in (options.start_row..).zip(urls) {
        let url = url.trim();
        if url.is_empty() {
            continue;
        }

        info!("row {row}: {url}");
        match scrape(pages, url).await {
            Ok(record) => {
                sheet.write_cells(&columns.cells(row, &record)).await?;
                summary.written += 1;
            }
            Err(e) if e.is_row_local() => {
                error!("row {row}: skipping {url}: {e}");
                summary.skipped += 1;
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        "{} rows written, {} skipped",
        summary.written, summary.skipped
    );
    Ok(summary)
}
