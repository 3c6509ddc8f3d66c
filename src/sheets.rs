use log::{debug, info, warn};
use reqwest::{Client, Response};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use url::Url;

use crate::{
    auth::Authenticator,
    error::{Result, SheetError},
    record::CellValue,
};

const SHEETS_API: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const DRIVE_FILES_API: &str = "https://www.googleapis.com/drive/v3/files";
const SPREADSHEET_MIME: &str = "application/vnd.google-apps.spreadsheet";

/// A 1-based `(row, column)` cell address.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetCoordinate {
    pub row: u32,
    pub column: u32,
}

impl SheetCoordinate {
    pub fn new(row: u32, column: u32) -> Self {
        Self { row, column }
    }
}

impl std::fmt::Display for SheetCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", column_letters(self.column), self.row)
    }
}

/// `1 -> A`, `26 -> Z`, `27 -> AA`.
pub fn column_letters(column: u32) -> String {
    let mut letters = Vec::new();
    let mut n = column;

    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        n = (n - 1) / 26;
    }

    letters.iter().rev().collect()
}

/// Accepts a column as letters (`Q`) or as a 1-based number (`17`).
pub fn parse_column(value: &str) -> Result<u32, String> {
    let value = value.trim();
    let invalid = || format!("{value:?} is not a column; use letters like Q or a number like 17");

    let column = if !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit()) {
        value.parse().ok()
    } else if !value.is_empty() && value.bytes().all(|b| b.is_ascii_alphabetic()) {
        value.bytes().try_fold(0u32, |acc, b| {
            acc.checked_mul(26)?
                .checked_add(u32::from(b.to_ascii_uppercase() - b'A' + 1))
        })
    } else {
        None
    };

    column.filter(|&column| column > 0).ok_or_else(invalid)
}

fn quote_worksheet(name: &str) -> String {
    format!("'{}'", name.replace('\'', "''"))
}

fn row_range(worksheet: &str, row: u32) -> String {
    format!("{}!{row}:{row}", quote_worksheet(worksheet))
}

fn column_range(worksheet: &str, column: u32, start_row: u32, end_row: Option<u32>) -> String {
    let letters = column_letters(column);
    let end = end_row.map(|row| row.to_string()).unwrap_or_default();
    format!("{}!{letters}{start_row}:{letters}{end}", quote_worksheet(worksheet))
}

fn cell_range(worksheet: &str, at: SheetCoordinate) -> String {
    format!("{}!{at}", quote_worksheet(worksheet))
}

/// `base` followed by `spreadsheet_id` and `segments`, each percent-encoded
/// as a single path segment.
fn api_url(base: &str, spreadsheet_id: &str, segments: &[&str]) -> Result<Url, SheetError> {
    let mut url = Url::parse(base)?;
    url.path_segments_mut()
        .map_err(|()| SheetError::NotABase(base.to_owned()))?
        .push(spreadsheet_id)
        .extend(segments);
    Ok(url)
}

fn title_query(title: &str) -> String {
    let title = title.replace('\\', "\\\\").replace('\'', "\\'");
    format!("name = '{title}' and mimeType = '{SPREADSHEET_MIME}' and trashed = false")
}

/// Which spreadsheet to open.
#[derive(Clone, Debug)]
pub enum Spreadsheet {
    Id(String),
    Title(String),
}

/// One worksheet of a spreadsheet, addressed by row and column.
#[allow(async_fn_in_trait)]
pub trait Sheet {
    async fn read_row(&mut self, row: u32) -> Result<Vec<String>>;

    /// The first entry is `start_row`; trailing blank cells may be cut off.
    async fn read_column(
        &mut self,
        column: u32,
        start_row: u32,
        end_row: Option<u32>,
    ) -> Result<Vec<String>>;

    async fn write_cells(&mut self, cells: &[(SheetCoordinate, CellValue)]) -> Result<()>;

    async fn write_cell(&mut self, at: SheetCoordinate, value: CellValue) -> Result<()> {
        self.write_cells(&[(at, value)]).await
    }
}

#[derive(Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<DriveFile>,
}

#[derive(Deserialize)]
struct DriveFile {
    id: String,
}

impl FileList {
    fn first_id(self, title: &str) -> Result<String, SheetError> {
        let mut files = self.files.into_iter();
        let file = files
            .next()
            .ok_or_else(|| SheetError::SpreadsheetNotFound(title.to_owned()))?;

        if files.next().is_some() {
            warn!("several spreadsheets are named {title:?}, using {}", file.id);
        }
        Ok(file.id)
    }
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<WorksheetMeta>,
}

#[derive(Deserialize)]
struct WorksheetMeta {
    properties: WorksheetProperties,
}

#[derive(Deserialize)]
struct WorksheetProperties {
    title: String,
}

impl SpreadsheetMeta {
    fn require_worksheet(&self, worksheet: &str) -> Result<(), SheetError> {
        if self
            .sheets
            .iter()
            .any(|sheet| sheet.properties.title == worksheet)
        {
            Ok(())
        } else {
            Err(SheetError::WorksheetNotFound(worksheet.to_owned()))
        }
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

impl ValueRange {
    fn into_first(self) -> Vec<String> {
        self.values
            .into_iter()
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|value| match value {
                serde_json::Value::String(text) => text,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            })
            .collect()
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BatchUpdate<'a> {
    value_input_option: &'static str,
    data: Vec<CellUpdate<'a>>,
}

#[derive(Serialize)]
struct CellUpdate<'a> {
    range: String,
    values: [[&'a CellValue; 1]; 1],
}

async fn check(response: Response) -> Result<Response, SheetError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        Err(SheetError::Status { status, body })
    }
}

/// A worksheet behind the Google Sheets API.
pub struct GoogleSheet {
    client: Client,
    auth: Authenticator,
    spreadsheet_id: String,
    worksheet: String,
}

impl GoogleSheet {
    pub async fn open(
        client: Client,
        auth: Authenticator,
        spreadsheet: &Spreadsheet,
        worksheet: &str,
    ) -> Result<Self> {
        let mut sheet = Self {
            client,
            auth,
            spreadsheet_id: String::new(),
            worksheet: worksheet.to_owned(),
        };

        sheet.spreadsheet_id = match spreadsheet {
            Spreadsheet::Id(id) => id.clone(),
            Spreadsheet::Title(title) => sheet.find_by_title(title).await?,
        };
        sheet.check_worksheet().await?;

        info!(
            "opened worksheet {:?} of spreadsheet {}",
            sheet.worksheet, sheet.spreadsheet_id
        );
        Ok(sheet)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, SheetError> {
        api_url(SHEETS_API, &self.spreadsheet_id, segments)
    }

    async fn get<T: DeserializeOwned>(&mut self, url: Url) -> Result<T> {
        let token = self.auth.token().await?;
        debug!("GET {url}");

        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(SheetError::from)?;

        Ok(check(response).await?.json().await.map_err(SheetError::from)?)
    }

    async fn find_by_title(&mut self, title: &str) -> Result<String> {
        let url = Url::parse_with_params(
            DRIVE_FILES_API,
            &[
                ("q", title_query(title).as_str()),
                ("fields", "files(id)"),
                ("supportsAllDrives", "true"),
                ("includeItemsFromAllDrives", "true"),
            ],
        )
        .map_err(SheetError::from)?;

        let list: FileList = self.get(url).await?;
        Ok(list.first_id(title)?)
    }

    async fn check_worksheet(&mut self) -> Result<()> {
        let mut url = self.endpoint(&[])?;
        url.query_pairs_mut()
            .append_pair("fields", "sheets.properties.title");

        let meta: SpreadsheetMeta = self.get(url).await?;
        Ok(meta.require_worksheet(&self.worksheet)?)
    }

    async fn read_range(&mut self, range: &str, major_dimension: &str) -> Result<Vec<String>> {
        let mut url = self.endpoint(&["values", range])?;
        url.query_pairs_mut()
            .append_pair("majorDimension", major_dimension);

        let values: ValueRange = self.get(url).await?;
        Ok(values.into_first())
    }
}

impl Sheet for GoogleSheet {
    async fn read_row(&mut self, row: u32) -> Result<Vec<String>> {
        let range = row_range(&self.worksheet, row);
        self.read_range(&range, "ROWS").await
    }

    async fn read_column(
        &mut self,
        column: u32,
        start_row: u32,
        end_row: Option<u32>,
    ) -> Result<Vec<String>> {
        let range = column_range(&self.worksheet, column, start_row, end_row);
        self.read_range(&range, "COLUMNS").await
    }

    async fn write_cells(&mut self, cells: &[(SheetCoordinate, CellValue)]) -> Result<()> {
        if cells.is_empty() {
            return Ok(());
        }

        let body = BatchUpdate {
            value_input_option: "USER_ENTERED",
            data: cells
                .iter()
                .map(|(at, value)| CellUpdate {
                    range: cell_range(&self.worksheet, *at),
                    values: [[value]],
                })
                .collect(),
        };

        let url = self.endpoint(&["values:batchUpdate"])?;
        let token = self.auth.token().await?;
        debug!("POST {url} ({} cells)", cells.len());

        let response = self
            .client
            .post(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .map_err(SheetError::from)?;

        check(response).await?;
        Ok(())
    }
}
