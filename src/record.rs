use chrono::{Datelike, NaiveDate};
use enum_iterator::Sequence;
use serde::Serialize;
use thiserror::Error;

use crate::date::SHEET_FORMAT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    Movie,
    TvShow,
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Movie => "Movie",
                Self::TvShow => "TV",
            }
        )
    }
}

/// A score in percent, `87.0` meaning 87%.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Percentage(pub f64);

impl Percentage {
    pub fn fraction(self) -> f64 {
        self.0 / 100.
    }
}

#[derive(Debug, PartialEq, Error)]
pub enum PercentageError {
    #[error(transparent)]
    Number(#[from] std::num::ParseFloatError),
    #[error("{0} is not a finite percentage")]
    NotFinite(f64),
}

impl std::str::FromStr for Percentage {
    type Err = PercentageError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: f64 = s.trim().trim_end_matches('%').trim().parse()?;
        if value.is_finite() {
            Ok(Percentage(value))
        } else {
            Err(PercentageError::NotFinite(value))
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub kind: Kind,
    pub title: String,
    pub year: Option<i32>,
    /// Year the whole series premiered; only set for TV pages.
    pub series_year: Option<i32>,
    pub genre: String,
    pub runtime: String,
    pub tomatometer: Option<Percentage>,
    pub audience_score: Option<Percentage>,
    pub release_date: Option<NaiveDate>,
}

impl Record {
    pub fn empty(kind: Kind) -> Self {
        Self {
            kind,
            title: String::new(),
            year: None,
            series_year: None,
            genre: String::new(),
            runtime: String::new(),
            tomatometer: None,
            audience_score: None,
            release_date: None,
        }
    }

    pub fn cell(&self, field: Field) -> CellValue {
        match field {
            Field::Title => CellValue::text(&self.title),
            Field::Kind => CellValue::Text(self.kind.to_string()),
            Field::Year => match (self.year, self.series_year) {
                (Some(year), Some(series)) => CellValue::Text(format!("{year} ({series})")),
                (Some(year), None) => CellValue::Number(f64::from(year)),
                (None, _) => CellValue::Empty,
            },
            Field::Genre => CellValue::text(&self.genre),
            Field::Runtime => CellValue::text(&self.runtime),
            Field::Tomatometer => self.tomatometer.into(),
            Field::AudienceScore => self.audience_score.into(),
            Field::ReleaseDate => match self.release_date {
                Some(date) => CellValue::Text(date.format(SHEET_FORMAT).to_string()),
                None => CellValue::Empty,
            },
        }
    }

    pub fn release_year(&self) -> Option<i32> {
        self.release_date.map(|date| date.year())
    }
}

/// The columns this tool fills, in sheet order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Sequence)]
pub enum Field {
    Title,
    Kind,
    Year,
    Genre,
    Runtime,
    Tomatometer,
    AudienceScore,
    ReleaseDate,
}

impl Field {
    pub fn header(self) -> &'static str {
        match self {
            Self::Title => "Title",
            Self::Kind => "Movie or TV",
            Self::Year => "Year",
            Self::Genre => "Genre",
            Self::Runtime => "Runtime",
            Self::Tomatometer => "Tomatometer",
            Self::AudienceScore => "Audience Score",
            Self::ReleaseDate => "Release Date",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.header())
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CellValue {
    Empty,
    Text(String),
    Number(f64),
}

impl Serialize for CellValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Empty => serializer.serialize_str(""),
            Self::Text(text) => serializer.serialize_str(text),
            Self::Number(number) => serializer.serialize_f64(*number),
        }
    }
}

impl CellValue {
    fn text(value: &str) -> Self {
        if value.is_empty() {
            Self::Empty
        } else {
            Self::Text(value.to_owned())
        }
    }
}

impl From<Option<Percentage>> for CellValue {
    fn from(score: Option<Percentage>) -> Self {
        score.map_or(Self::Empty, |score| Self::Number(score.fraction()))
    }
}
