//! Plain-text helpers: whitespace cleanup, visible-text extraction,
//! script-based language guessing, and publish-date discovery.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};
use scraper::{ElementRef, Html, Selector};

/// Language code returned when the script mix is inconclusive.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

const NON_CONTENT_TAGS: &[&str] = &["script", "style", "noscript", "template"];

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));

static NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)((?:19|20)\d{2})[-/.](\d{1,2})[-/.](\d{1,2})(?-u:\b)")
        .expect("valid numeric date regex")
});

static CJK_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"((?:19|20)\d{2})\s*年\s*(\d{1,2})\s*月\s*(\d{1,2})\s*[日号]")
        .expect("valid CJK date regex")
});

static MONTH_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+((?:19|20)\d{2})(?-u:\b)",
    )
    .expect("valid month-first date regex")
});

static DAY_FIRST_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)(?-u:\b)(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+((?:19|20)\d{2})(?-u:\b)",
    )
    .expect("valid day-first date regex")
});

/// Collapse every whitespace run to a single space and trim the ends.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    WHITESPACE.replace_all(text, " ").trim().to_string()
}

/// First `max_chars` characters of `text`, never splitting a code point.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Visible text of a parsed page with script, style and similar nodes dropped.
#[must_use]
pub fn visible_text(document: &Html) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| NON_CONTENT_TAGS.contains(&el.name()))
        });
        if !hidden {
            parts.push(text);
        }
    }
    normalize_whitespace(&parts.join(" "))
}

/// Normalised text content of a single element.
#[must_use]
pub fn element_text(element: &ElementRef<'_>) -> String {
    normalize_whitespace(&element.text().collect::<Vec<_>>().join(" "))
}

/// `<title>` text, falling back to the `og:title` meta tag.
#[must_use]
pub fn page_title(document: &Html) -> Option<String> {
    let from_title = Selector::parse("title")
        .ok()
        .and_then(|sel| document.select(&sel).next().map(|el| element_text(&el)))
        .filter(|t| !t.is_empty());
    from_title.or_else(|| og_title(document))
}

#[must_use]
pub fn og_title(document: &Html) -> Option<String> {
    let sel = Selector::parse(r#"meta[property="og:title"]"#).ok()?;
    document
        .select(&sel)
        .find_map(|el| el.value().attr("content"))
        .map(normalize_whitespace)
        .filter(|t| !t.is_empty())
}

/// Guess a language code from the dominant writing system.
///
/// Returns `zh`, `ja`, `ko`, `ru`, `en`, or [`UNKNOWN_LANGUAGE`] when fewer
/// than three letters are present or no script dominates.
#[must_use]
pub fn detect_language(text: &str) -> &'static str {
    let mut han = 0_usize;
    let mut kana = 0_usize;
    let mut hangul = 0_usize;
    let mut cyrillic = 0_usize;
    let mut latin = 0_usize;
    let mut letters = 0_usize;

    for c in text.chars().filter(|c| c.is_alphabetic()) {
        letters += 1;
        match c {
            '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' => han += 1,
            '\u{3040}'..='\u{30ff}' => kana += 1,
            '\u{ac00}'..='\u{d7af}' | '\u{1100}'..='\u{11ff}' => hangul += 1,
            '\u{0400}'..='\u{04ff}' => cyrillic += 1,
            'a'..='z' | 'A'..='Z' | '\u{00c0}'..='\u{024f}' => latin += 1,
            _ => {}
        }
    }

    if letters < 3 {
        return UNKNOWN_LANGUAGE;
    }

    // Integer percentage of all letters.
    let share = |count: usize| count * 100 / letters;
    if share(kana) >= 10 {
        "ja"
    } else if share(hangul) >= 20 {
        "ko"
    } else if share(han) >= 20 {
        "zh"
    } else if share(cyrillic) >= 50 {
        "ru"
    } else if share(latin) >= 50 {
        "en"
    } else {
        UNKNOWN_LANGUAGE
    }
}

/// `true` when a detected code names the same language as a target tag such
/// as `zh` or `zh-CN`.
#[must_use]
pub fn same_language(detected: &str, target: &str) -> bool {
    let primary = target.split(['-', '_']).next().unwrap_or(target);
    primary.eq_ignore_ascii_case(detected)
}

/// The earliest recognisable calendar date in `text`, if any.
#[must_use]
pub fn find_publish_date(text: &str) -> Option<NaiveDate> {
    let numeric = first_valid(&NUMERIC_DATE, text, |caps| {
        ymd(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)
    });
    let cjk = first_valid(&CJK_DATE, text, |caps| {
        ymd(num(caps, 1)?, num(caps, 2)?, num(caps, 3)?)
    });
    let month_first = first_valid(&MONTH_FIRST_DATE, text, |caps| {
        ymd(num(caps, 3)?, month(caps.get(1)?.as_str())?, num(caps, 2)?)
    });
    let day_first = first_valid(&DAY_FIRST_DATE, text, |caps| {
        ymd(num(caps, 3)?, month(caps.get(2)?.as_str())?, num(caps, 1)?)
    });

    [numeric, cjk, month_first, day_first]
        .into_iter()
        .flatten()
        .min_by_key(|(start, _)| *start)
        .map(|(_, date)| date)
}

fn first_valid<F>(re: &Regex, text: &str, build: F) -> Option<(usize, NaiveDate)>
where
    F: Fn(&Captures<'_>) -> Option<NaiveDate>,
{
    re.captures_iter(text).find_map(|caps| {
        let start = caps.get(0)?.start();
        build(&caps).map(|date| (start, date))
    })
}

fn num(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx)?.as_str().parse().ok()
}

fn ymd(year: u32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

fn month(name: &str) -> Option<u32> {
    let idx = [
        "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
    ]
    .iter()
    .position(|m| name.get(..3).is_some_and(|prefix| prefix.eq_ignore_ascii_case(m)))?;
    u32::try_from(idx + 1).ok()
}

#[cfg(test)]
#[path = "text_test.rs"]
mod tests;
