//! Right-to-left text preparation: Arabic contextual joining and bidi reordering.
//!
//! PDF text objects draw glyphs left to right in the order given and do no
//! shaping of their own. Arabic text therefore goes through two passes
//! before it is drawn:
//!
//! 1. [`reshape_arabic`] replaces each letter with its isolated, final,
//!    initial or medial presentation form (Unicode block FE70–FEFF) and
//!    fuses lam + alef into the mandatory ligature,
//! 2. [`visual_order`] runs the Unicode bidi algorithm with a right-to-left
//!    paragraph level and returns the line in display order.
//!
//! Reshaping happens on logical text, reordering on one already-wrapped
//! line at a time.

use unicode_bidi::{BidiInfo, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Joining {
    /// Joins on both sides.
    Dual,
    /// Joins only to the preceding letter.
    Right,
    /// Tatweel: connects on both sides, has no forms of its own.
    Causing,
}

/// `(base letter, first presentation form, joining type)`.
///
/// Dual-joining letters have four consecutive forms (isolated, final,
/// initial, medial); right-joining letters have two (isolated, final).
const LETTERS: &[(char, u32, Joining)] = &[
    ('\u{0622}', 0xFE81, Joining::Right),
    ('\u{0623}', 0xFE83, Joining::Right),
    ('\u{0624}', 0xFE85, Joining::Right),
    ('\u{0625}', 0xFE87, Joining::Right),
    ('\u{0626}', 0xFE89, Joining::Dual),
    ('\u{0627}', 0xFE8D, Joining::Right),
    ('\u{0628}', 0xFE8F, Joining::Dual),
    ('\u{0629}', 0xFE93, Joining::Right),
    ('\u{062A}', 0xFE95, Joining::Dual),
    ('\u{062B}', 0xFE99, Joining::Dual),
    ('\u{062C}', 0xFE9D, Joining::Dual),
    ('\u{062D}', 0xFEA1, Joining::Dual),
    ('\u{062E}', 0xFEA5, Joining::Dual),
    ('\u{062F}', 0xFEA9, Joining::Right),
    ('\u{0630}', 0xFEAB, Joining::Right),
    ('\u{0631}', 0xFEAD, Joining::Right),
    ('\u{0632}', 0xFEAF, Joining::Right),
    ('\u{0633}', 0xFEB1, Joining::Dual),
    ('\u{0634}', 0xFEB5, Joining::Dual),
    ('\u{0635}', 0xFEB9, Joining::Dual),
    ('\u{0636}', 0xFEBD, Joining::Dual),
    ('\u{0637}', 0xFEC1, Joining::Dual),
    ('\u{0638}', 0xFEC5, Joining::Dual),
    ('\u{0639}', 0xFEC9, Joining::Dual),
    ('\u{063A}', 0xFECD, Joining::Dual),
    ('\u{0640}', 0x0640, Joining::Causing),
    ('\u{0641}', 0xFED1, Joining::Dual),
    ('\u{0642}', 0xFED5, Joining::Dual),
    ('\u{0643}', 0xFED9, Joining::Dual),
    ('\u{0644}', 0xFEDD, Joining::Dual),
    ('\u{0645}', 0xFEE1, Joining::Dual),
    ('\u{0646}', 0xFEE5, Joining::Dual),
    ('\u{0647}', 0xFEE9, Joining::Dual),
    ('\u{0648}', 0xFEED, Joining::Right),
    ('\u{0649}', 0xFEEF, Joining::Right),
    ('\u{064A}', 0xFEF1, Joining::Dual),
];

const LAM: char = '\u{0644}';

/// Lam-alef ligatures: `(alef variant, isolated form)`; final is isolated + 1.
const LAM_ALEF: &[(char, u32)] = &[
    ('\u{0622}', 0xFEF5),
    ('\u{0623}', 0xFEF7),
    ('\u{0625}', 0xFEF9),
    ('\u{0627}', 0xFEFB),
];

fn joining(c: char) -> Option<(u32, Joining)> {
    LETTERS
        .iter()
        .find(|(base, _, _)| *base == c)
        .map(|&(_, first, j)| (first, j))
}

/// Combining marks are skipped when looking for a letter's neighbours.
fn is_transparent(c: char) -> bool {
    matches!(c, '\u{0610}'..='\u{061A}' | '\u{064B}'..='\u{065F}' | '\u{0670}' | '\u{06D6}'..='\u{06ED}')
}

fn joins_forward(c: char) -> bool {
    matches!(joining(c), Some((_, Joining::Dual | Joining::Causing)))
}

fn joins_backward(c: char) -> bool {
    joining(c).is_some()
}

fn lam_alef(alef: char) -> Option<u32> {
    LAM_ALEF.iter().find(|(a, _)| *a == alef).map(|&(_, iso)| iso)
}

/// Replace Arabic letters with their contextual presentation forms.
///
/// Non-Arabic characters pass through untouched, so the function is safe
/// to call on mixed text.
pub fn reshape_arabic(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());

    let prev_letter = |i: usize| chars[..i].iter().rev().find(|c| !is_transparent(**c)).copied();
    let next_index = |i: usize| (i + 1..chars.len()).find(|&j| !is_transparent(chars[j]));

    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        let Some((first, kind)) = joining(c) else {
            out.push(c);
            i += 1;
            continue;
        };

        let joined_before = prev_letter(i).is_some_and(joins_forward);
        let next = next_index(i);

        if c == LAM {
            if let Some(j) = next {
                if let Some(iso) = lam_alef(chars[j]) {
                    let form = if joined_before { iso + 1 } else { iso };
                    out.push(char::from_u32(form).unwrap_or(c));
                    out.extend(&chars[i + 1..j]);
                    i = j + 1;
                    continue;
                }
            }
        }

        let joined_after = joins_forward(c) && next.is_some_and(|j| joins_backward(chars[j]));

        let form = match kind {
            Joining::Causing => first,
            Joining::Right => {
                if joined_before {
                    first + 1
                } else {
                    first
                }
            }
            Joining::Dual => match (joined_before, joined_after) {
                (false, false) => first,
                (true, false) => first + 1,
                (false, true) => first + 2,
                (true, true) => first + 3,
            },
        };
        out.push(char::from_u32(form).unwrap_or(c));
        i += 1;
    }
    out
}

/// Reorder one line into display order under a right-to-left base direction.
///
/// Runs at an odd (right-to-left) level are reversed and their paired
/// brackets mirrored, so `(5)` inside Arabic text still reads `(5)`.
pub fn visual_order(line: &str) -> String {
    if line.is_empty() {
        return String::new();
    }
    let info = BidiInfo::new(line, Some(Level::rtl()));
    info.paragraphs
        .iter()
        .map(|para| {
            let (levels, runs) = info.visual_runs(para, para.range.clone());
            let mut out = String::with_capacity(para.range.len());
            for run in runs {
                let text = &line[run.clone()];
                if levels[run.start].is_rtl() {
                    out.extend(text.chars().rev().map(mirror));
                } else {
                    out.push_str(text);
                }
            }
            out
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Bidi mirrored glyph of a paired punctuation character.
fn mirror(c: char) -> char {
    match c {
        '(' => ')',
        ')' => '(',
        '[' => ']',
        ']' => '[',
        '{' => '}',
        '}' => '{',
        '<' => '>',
        '>' => '<',
        '«' => '»',
        '»' => '«',
        '‹' => '›',
        '›' => '‹',
        _ => c,
    }
}

/// Full preparation of one display line for a right-to-left locale.
pub fn shape_for_display(line: &str) -> String {
    visual_order(&reshape_arabic(line))
}

/// True when the text contains any character from the Arabic blocks.
pub fn contains_arabic(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c, '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{FB50}'..='\u{FDFF}' | '\u{FE70}'..='\u{FEFF}')
    })
}
