use chrono::NaiveDate;
use rt_sheet_sync::{parse, CellValue, Field, Kind, Percentage};
use select::document::Document;

const MOVIE: &str = include_str!("fixtures/movie.html");
const TV_SEASON: &str = include_str!("fixtures/tv_season.html");
const TV_SERIES: &str = include_str!("fixtures/tv_series.html");

const SEASON_URL: &str = "https://www.rottentomatoes.com/tv/the_bear/s02";

#[test]
fn movie_page() {
    let document = Document::from(MOVIE);
    assert_eq!(parse::page_kind(&document).unwrap(), Kind::Movie);

    let record = parse::movie(&document);
    assert_eq!(record.kind, Kind::Movie);
    assert_eq!(record.title, "Inception");
    assert_eq!(record.year, Some(2010));
    assert_eq!(record.series_year, None);
    assert_eq!(record.genre, "Mystery & Thriller, Sci-Fi, Action");
    assert_eq!(record.runtime, "2h 28m");
    assert_eq!(record.tomatometer, Some(Percentage(87.)));
    assert_eq!(record.audience_score, Some(Percentage(91.)));
    assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2010, 7, 16));

    assert_eq!(record.cell(Field::ReleaseDate), CellValue::Text("07/16/10".into()));
    assert_eq!(record.cell(Field::Tomatometer), CellValue::Number(0.87));
}

#[test]
fn movie_page_with_missing_fields() {
    let html = MOVIE
        .replace(r#"class="genre""#, r#"class="genres-moved""#)
        .replace("<time", "<span")
        .replace("</time>", "</span>")
        .replace(r#"tomatometerscore="87""#, r#"tomatometerscore="""#);
    let record = parse::movie(&Document::from(html.as_str()));

    assert_eq!(record.title, "Inception");
    assert_eq!(record.genre, "");
    assert_eq!(record.tomatometer, None);
    assert_eq!(record.audience_score, Some(Percentage(91.)));
    assert_eq!(record.release_date, None);
    assert_eq!(record.cell(Field::Genre), CellValue::Empty);
    assert_eq!(record.cell(Field::ReleaseDate), CellValue::Empty);
}

#[test]
fn movie_page_with_unexpected_date() {
    let html = MOVIE.replace("Jul 16, 2010", "2010-07-16");
    let record = parse::movie(&Document::from(html.as_str()));
    assert_eq!(record.release_date, None);
}

#[test]
fn bare_page_yields_an_empty_record() {
    let record = parse::movie(&Document::from("<html><body></body></html>"));
    assert_eq!(record.title, "");
    assert_eq!(record.year, None);
    assert_eq!(record.runtime, "");
}

#[test]
fn tv_season_page() {
    let season = Document::from(TV_SEASON);
    let series = Document::from(TV_SERIES);
    assert_eq!(parse::page_kind(&season).unwrap(), Kind::TvShow);

    let record = parse::tv_show(&season, SEASON_URL, Some(&series));
    assert_eq!(record.kind, Kind::TvShow);
    assert_eq!(record.title, "The Bear (Season 2)");
    assert_eq!(record.year, Some(2023));
    assert_eq!(record.series_year, Some(2022));
    assert_eq!(record.genre, "Comedy, Drama");
    assert_eq!(record.runtime, "N/A");
    assert_eq!(record.tomatometer, Some(Percentage(99.)));
    assert_eq!(record.audience_score, Some(Percentage(88.)));
    assert_eq!(record.release_date, NaiveDate::from_ymd_opt(2023, 6, 22));

    assert_eq!(record.cell(Field::Kind), CellValue::Text("TV".into()));
    assert_eq!(record.cell(Field::Year), CellValue::Text("2023 (2022)".into()));
}

#[test]
fn tv_season_from_url_when_heading_lacks_it() {
    let html = TV_SEASON.replace("Season 2 – The Bear", "The Bear");
    let record = parse::tv_show(
        &Document::from(html.as_str()),
        "https://www.rottentomatoes.com/tv/the_bear/s03",
        None,
    );

    assert_eq!(record.title, "The Bear (Season 3)");
    assert_eq!(record.series_year, None);
    assert_eq!(record.cell(Field::Year), CellValue::Number(2023.));
}

#[test]
fn tv_series_page_has_premiere_year() {
    let series = Document::from(TV_SERIES);
    let year = parse::SERIES_YEAR_RULE.apply(&series);
    assert_eq!(year.as_deref(), Some("2022"));
}
