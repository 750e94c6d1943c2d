//! Response parser: model text → ordered [`ContentItem`]s.
//!
//! A line-oriented state machine. The parser starts outside any section and
//! moves into a section when a line matches one of the locale's rubric
//! headers; from then on every non-header line is a bullet or a plain line
//! of the current section. Lines before the first header are dropped.
//!
//! Header matching is an ordered rule list:
//!
//! 1. the line starts with `"<header>:"` (case-sensitive); any text after
//!    the colon becomes a plain item,
//! 2. the header appears anywhere in the line, compared case-insensitively,
//!    or verbatim for locales whose script has no case.
//!
//! Rule 1 is tried against every section before rule 2 is tried against any,
//! so an exact colon-prefixed header always beats a looser substring hit on
//! an earlier section. Within a rule, vocabulary order decides.

use crate::locale::{LocaleCatalog, LocaleProfile, SectionEntry, SectionKey};
use crate::output::{ContentItem, ContentKind};
use crate::pipeline::normalize::normalize_response;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

/// What the parser made of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseOutcome {
    /// The response is a "not a contract" sentinel. Nothing to render.
    NotAContract,
    /// Items in reading order. May be empty.
    Items(Vec<ContentItem>),
}

impl ParseOutcome {
    pub fn is_renderable(&self) -> bool {
        matches!(self, ParseOutcome::Items(_))
    }

    pub fn items(&self) -> &[ContentItem] {
        match self {
            ParseOutcome::Items(items) => items,
            ParseOutcome::NotAContract => &[],
        }
    }

    pub fn into_items(self) -> Vec<ContentItem> {
        match self {
            ParseOutcome::Items(items) => items,
            ParseOutcome::NotAContract => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    NoSection,
    InSection(SectionKey),
}

static RE_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-•*]\s*").unwrap());

/// True when the (normalised, trimmed) response is any locale's sentinel.
///
/// All locales are checked: the model does not always answer in the language
/// of the rubric it was given.
pub fn is_sentinel(raw: &str, catalog: &LocaleCatalog) -> bool {
    let normalized = normalize_response(raw);
    let text = normalized.trim();
    catalog.sentinels().any(|s| s.trim() == text)
}

/// Parse a raw model response under `profile`'s vocabulary.
pub fn parse_response(raw: &str, profile: &LocaleProfile, catalog: &LocaleCatalog) -> ParseOutcome {
    if is_sentinel(raw, catalog) {
        debug!("Response is a not-a-contract sentinel");
        return ParseOutcome::NotAContract;
    }

    let text = normalize_response(raw);
    let entries = profile.vocabulary.entries();
    let mut state = State::NoSection;
    let mut items = Vec::new();
    let mut dropped = 0usize;

    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            continue;
        }

        if let Some((entry, rest)) = match_header(line, entries, profile.exact_substring_headers) {
            state = State::InSection(entry.key);
            items.push(ContentItem::header(entry.label.clone()));
            if let Some(rest) = rest {
                items.push(ContentItem::plain(rest));
            }
            continue;
        }

        match state {
            State::NoSection => dropped += 1,
            State::InSection(_) => {
                if let Some(m) = RE_BULLET.find(line) {
                    let bullet = line[m.end()..].trim();
                    if !bullet.is_empty() {
                        items.push(ContentItem::bullet(bullet));
                    }
                } else {
                    items.push(ContentItem::plain(line));
                }
            }
        }
    }

    if dropped > 0 {
        debug!("Dropped {} line(s) before the first section header", dropped);
    }
    ParseOutcome::Items(items)
}

/// Find the section a line opens, plus any same-line content after the colon.
fn match_header<'a>(
    line: &'a str,
    entries: &'a [SectionEntry],
    exact_substring: bool,
) -> Option<(&'a SectionEntry, Option<&'a str>)> {
    // Rule 1: "<header>:" prefix.
    for entry in entries {
        for header in &entry.headers {
            if let Some(rest) = line
                .strip_prefix(header.as_str())
                .and_then(|r| r.strip_prefix(':'))
            {
                let rest = rest.trim();
                return Some((entry, (!rest.is_empty()).then_some(rest)));
            }
        }
    }

    // Rule 2: substring anywhere in the line.
    let folded = line.to_lowercase();
    for entry in entries {
        for header in &entry.headers {
            if folded.contains(&header.to_lowercase())
                || (exact_substring && line.contains(header.as_str()))
            {
                return Some((entry, None));
            }
        }
    }
    None
}

/// Serialise items back to rubric text.
///
/// Headers become `"<label>:"`, bullets `"- <text>"`, plain lines are
/// emitted as-is. A plain item directly after a header shares the header's
/// line, where rule 1 captures it verbatim; on a line of its own a leading
/// marker or a header name inside it would be reclassified. Parsing the
/// result reproduces the same items.
pub fn items_to_text(items: &[ContentItem]) -> String {
    let mut lines = Vec::with_capacity(items.len());
    let mut iter = items.iter().peekable();
    while let Some(item) = iter.next() {
        let line = match item.kind {
            ContentKind::Header => match iter.next_if(|next| next.kind == ContentKind::Plain) {
                Some(rest) => format!("{}: {}", item.text, rest.text),
                None => format!("{}:", item.text),
            },
            ContentKind::Bullet => format!("- {}", item.text),
            ContentKind::Plain => item.text.clone(),
        };
        lines.push(line);
    }
    lines.join("\n")
}
