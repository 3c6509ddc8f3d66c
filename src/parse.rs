use std::collections::HashMap;
use std::sync::LazyLock;

use itertools::Itertools;
use regex::Regex;
use select::{
    document::Document,
    node::Node,
    predicate::{Attr, Class, Name, Predicate},
};

use crate::{
    date,
    error::ParseError,
    record::{Field, Kind, Record},
};

/// The site publishes no runtime for TV.
const TV_RUNTIME: &str = "N/A";

static SEASON_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Season\s+(\d+)\s*[–—-]\s*(.+)").expect("valid regex"));
static SEASON_PATH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/tv/[^/?#]+/s(\d+)").expect("valid regex"));
static SERIES_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(https?://(?:www\.)?rottentomatoes\.com/tv/[^/?#]+)").expect("valid regex")
});
static YEAR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\b(\d{4})\b").expect("valid regex"));

#[derive(Clone, Copy, Debug)]
pub enum Locator {
    /// `<name>`
    Tag(&'static str),
    /// `<name class="...">`
    Class(&'static str, &'static str),
    /// `<name attr="value">`
    Attr(&'static str, &'static str, &'static str),
}

impl Locator {
    fn find<'a>(self, document: &'a Document) -> Box<dyn Iterator<Item = Node<'a>> + 'a> {
        match self {
            Self::Tag(name) => Box::new(document.find(Name(name))),
            Self::Class(name, class) => Box::new(document.find(Name(name).and(Class(class)))),
            Self::Attr(name, attr, value) => {
                Box::new(document.find(Name(name).and(Attr(attr, value))))
            }
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Source {
    /// Text of the first match.
    Text(Locator),
    /// An attribute of the first match.
    Attr(Locator, &'static str),
    /// Text of every match whose `href` contains the marker, comma-joined.
    Links(Locator, &'static str),
}

/// How one field is pulled out of a page.
#[derive(Clone, Copy)]
pub struct Rule {
    pub field: Field,
    pub source: Source,
    refine: fn(&str) -> Option<String>,
}

impl Rule {
    const fn new(field: Field, source: Source) -> Self {
        Self {
            field,
            source,
            refine: as_is,
        }
    }

    const fn refine(self, refine: fn(&str) -> Option<String>) -> Self {
        Self { refine, ..self }
    }

    /// `None` when the element is missing or holds nothing usable.
    pub fn apply(&self, document: &Document) -> Option<String> {
        let raw = match self.source {
            Source::Text(locator) => locator.find(document).next()?.text(),
            Source::Attr(locator, attr) => locator.find(document).next()?.attr(attr)?.to_owned(),
            Source::Links(locator, marker) => locator
                .find(document)
                .filter(|node| node.attr("href").is_some_and(|href| href.contains(marker)))
                .map(|node| squash(&node.text()))
                .filter(|text| !text.is_empty())
                .join(", "),
        };

        (self.refine)(&squash(&raw)).filter(|value| !value.is_empty())
    }
}

pub const MOVIE_RULES: &[Rule] = &[
    Rule::new(Field::Title, Source::Text(Locator::Class("h1", "title"))),
    Rule::new(Field::Year, Source::Text(Locator::Class("p", "info"))).refine(nth_part::<0>),
    Rule::new(Field::Runtime, Source::Text(Locator::Class("p", "info"))).refine(nth_part::<2>),
    Rule::new(Field::Genre, Source::Text(Locator::Class("span", "genre"))).refine(comma_list),
    Rule::new(
        Field::Tomatometer,
        Source::Attr(Locator::Tag("score-board-deprecated"), "tomatometerscore"),
    ),
    Rule::new(
        Field::AudienceScore,
        Source::Attr(Locator::Tag("score-board-deprecated"), "audiencescore"),
    ),
    Rule::new(Field::ReleaseDate, Source::Text(Locator::Tag("time"))),
];

pub const TV_RULES: &[Rule] = &[
    Rule::new(Field::Title, Source::Text(Locator::Tag("h1"))),
    Rule::new(Field::Genre, Source::Links(Locator::Tag("rt-link"), "genres:")),
    Rule::new(
        Field::Tomatometer,
        Source::Text(Locator::Attr("rt-text", "slot", "criticsScore")),
    ),
    Rule::new(
        Field::AudienceScore,
        Source::Text(Locator::Attr("rt-text", "slot", "audienceScore")),
    ),
    Rule::new(
        Field::ReleaseDate,
        Source::Text(Locator::Attr("rt-text", "slot", "airDate")),
    )
    .refine(aired),
];

/// Read from the series page, which carries the premiere year.
pub const SERIES_YEAR_RULE: Rule = Rule::new(
    Field::Year,
    Source::Text(Locator::Attr("rt-text", "slot", "releaseDate")),
)
.refine(first_year);

fn squash(text: &str) -> String {
    text.split_whitespace().join(" ")
}

fn as_is(value: &str) -> Option<String> {
    Some(value.to_owned())
}

fn nth_part<const N: usize>(value: &str) -> Option<String> {
    value.split(',').nth(N).map(|part| part.trim().to_owned())
}

fn comma_list(value: &str) -> Option<String> {
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .join(", "),
    )
}

fn aired(value: &str) -> Option<String> {
    Some(value.trim_start_matches("Aired").trim().to_owned())
}

fn first_year(value: &str) -> Option<String> {
    YEAR.captures(value).map(|caps| caps[1].to_owned())
}

fn scrape(rules: &[Rule], document: &Document) -> HashMap<Field, String> {
    rules
        .iter()
        .filter_map(|rule| rule.apply(document).map(|value| (rule.field, value)))
        .collect()
}

fn record_from_fields(kind: Kind, mut fields: HashMap<Field, String>) -> Record {
    let mut take = |field: Field| fields.remove(&field);

    Record {
        kind,
        title: take(Field::Title).unwrap_or_default(),
        year: take(Field::Year).and_then(|year| year.parse().ok()),
        series_year: None,
        genre: take(Field::Genre).unwrap_or_default(),
        runtime: take(Field::Runtime).unwrap_or_default(),
        tomatometer: take(Field::Tomatometer).and_then(|score| score.parse().ok()),
        audience_score: take(Field::AudienceScore).and_then(|score| score.parse().ok()),
        release_date: take(Field::ReleaseDate).and_then(|date| date::release_date(&date)),
    }
}

pub fn page_kind(document: &Document) -> Result<Kind, ParseError> {
    let content = document
        .find(Name("meta").and(Attr("property", "og:type")))
        .next()
        .and_then(|meta| meta.attr("content"))
        .ok_or(ParseError::NoPageType)?;

    if content.contains("movie") {
        Ok(Kind::Movie)
    } else if content.contains("tv_show") || content.contains("tv_season") {
        Ok(Kind::TvShow)
    } else {
        Err(ParseError::UnknownPageType(content.to_owned()))
    }
}

pub fn movie(document: &Document) -> Record {
    record_from_fields(Kind::Movie, scrape(MOVIE_RULES, document))
}

/// `url` fills in the season when the heading lacks one; `series` is the
/// parsed series page, if it could be fetched.
pub fn tv_show(document: &Document, url: &str, series: Option<&Document>) -> Record {
    let mut record = record_from_fields(Kind::TvShow, scrape(TV_RULES, document));

    record.title = season_title(&record.title, url);
    record.year = record.release_year();
    record.series_year = series
        .and_then(|series| SERIES_YEAR_RULE.apply(series))
        .and_then(|year| year.parse().ok());
    record.runtime = TV_RUNTIME.to_owned();

    record
}

/// Series page for a TV url, e.g. `.../tv/the_bear/s02` -> `.../tv/the_bear`.
pub fn series_url(url: &str) -> Option<String> {
    SERIES_PATH
        .captures(url.trim())
        .map(|caps| caps[1].to_owned())
}

fn season_from_url(url: &str) -> Option<u32> {
    SEASON_PATH
        .captures(url)
        .and_then(|caps| caps[1].parse().ok())
}

fn season_title(heading: &str, url: &str) -> String {
    let (season, name) = match SEASON_HEADING.captures(heading) {
        Some(caps) => (caps[1].parse::<u32>().ok(), caps[2].trim().to_owned()),
        None => (season_from_url(url), heading.trim().to_owned()),
    };

    match season {
        _ if name.is_empty() => String::new(),
        Some(season) => format!("{name} (Season {season})"),
        None => name,
    }
}
