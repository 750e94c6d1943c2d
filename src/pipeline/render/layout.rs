//! Page layout for the review document.
//!
//! [`layout_report`] turns parsed items into a [`RenderPlan`]: pages of
//! positioned draw operations in PDF user space (points, origin bottom-left).
//! The plan is pure data, so placement, alignment and pagination are tested
//! without PDFium; a [`ReportWriter`](super::ReportWriter) only paints it.
//!
//! Styling, per block:
//!
//! | Block   | Size | Leading | Colour    | Indent | Spacing            |
//! |---------|------|---------|-----------|--------|--------------------|
//! | title   | 16 b | 20      | `#2c3e50` | –      | boxed, 20 after    |
//! | header  | 14 b | 16      | `#2c3e50` | 10     | 15 before, 10 after |
//! | content | 11   | 14      | `#34495e` | 20     | 5 after            |
//!
//! Indents sit on the reading-start side: left for left-to-right locales,
//! right for right-to-left ones.

use super::shaping::{reshape_arabic, visual_order};
use crate::locale::{LocaleProfile, TextDirection};
use crate::output::{ContentItem, ContentKind};
use image::DynamicImage;

pub const PAGE_WIDTH: f32 = 612.0;
pub const PAGE_HEIGHT: f32 = 792.0;
pub const MARGIN: f32 = 36.0;

const TITLE_SIZE: f32 = 16.0;
const TITLE_LEADING: f32 = 20.0;
const TITLE_PADDING: f32 = 10.0;
const TITLE_SPACE_AFTER: f32 = 20.0;

const HEADER_SIZE: f32 = 14.0;
const HEADER_LEADING: f32 = 16.0;
const HEADER_SPACE_BEFORE: f32 = 15.0;
const HEADER_SPACE_AFTER: f32 = 10.0;
const HEADER_INDENT: f32 = 10.0;

const CONTENT_SIZE: f32 = 11.0;
const CONTENT_LEADING: f32 = 14.0;
const CONTENT_INDENT: f32 = 20.0;
const CONTENT_SPACE_AFTER: f32 = 5.0;

const LOGO_SPACE_BEFORE: f32 = 20.0;
pub const LOGO_SIZE: f32 = 72.0;

const BULLET_PREFIX: &str = "• ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const DARK: Rgb = Rgb(0x2c, 0x3e, 0x50);
    pub const BODY: Rgb = Rgb(0x34, 0x49, 0x5e);
    pub const TITLE_BG: Rgb = Rgb(0xec, 0xf0, 0xf1);
    pub const TITLE_BORDER: Rgb = Rgb(0x34, 0x98, 0xdb);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontRole {
    Body,
    Heading,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    /// One line of text, already in display order. `x`/`y` are the
    /// left end of the baseline.
    Text {
        x: f32,
        y: f32,
        text: String,
        size: f32,
        role: FontRole,
        color: Rgb,
    },
    Rect {
        left: f32,
        bottom: f32,
        width: f32,
        height: f32,
        fill: Option<Rgb>,
        stroke: Option<Rgb>,
    },
    /// The plan's logo image, scaled into this box.
    Logo {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PagePlan {
    pub ops: Vec<DrawOp>,
}

/// A laid-out review, ready to be painted.
#[derive(Debug, Clone)]
pub struct RenderPlan {
    pub title: String,
    pub direction: TextDirection,
    pub width: f32,
    pub height: f32,
    pub pages: Vec<PagePlan>,
    pub logo: Option<DynamicImage>,
}

impl RenderPlan {
    /// Every text op on every page, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().flat_map(|p| {
            p.ops.iter().filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
        })
    }
}

/// Estimated advance width of `text` at `size`, in points.
///
/// Uses coarse per-class em widths close to Helvetica's metrics; good
/// enough for wrapping, never used for glyph placement.
pub fn text_width(text: &str, size: f32) -> f32 {
    text.chars().map(char_em).sum::<f32>() * size
}

fn char_em(c: char) -> f32 {
    match c {
        'i' | 'j' | 'l' | 'I' | '.' | ',' | ';' | ':' | '\'' | '!' | '|' | ' ' | 'f' | 't' | 'r' => {
            0.28
        }
        'm' | 'w' | 'M' | 'W' | '@' => 0.72,
        '0'..='9' => 0.556,
        'A'..='Z' => 0.667,
        // lowercase Latin, Arabic presentation forms, everything else
        _ => 0.5,
    }
}

/// Greedy word wrap on logical text. Words wider than a line are split.
pub fn wrap(text: &str, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if text_width(&candidate, size) <= max_width {
            current = candidate;
            continue;
        }
        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if text_width(word, size) <= max_width {
            current = word.to_string();
        } else {
            for ch in word.chars() {
                current.push(ch);
                if text_width(&current, size) > max_width {
                    current.pop();
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                }
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[derive(Debug, Clone, Copy)]
enum Align {
    Start,
    Center,
}

/// Tracks the cursor and the page being filled.
struct Cursor {
    direction: TextDirection,
    y: f32,
    pages: Vec<PagePlan>,
}

impl Cursor {
    fn new(direction: TextDirection) -> Self {
        Self {
            direction,
            y: PAGE_HEIGHT - MARGIN,
            pages: vec![PagePlan::default()],
        }
    }

    fn page(&mut self) -> &mut PagePlan {
        if self.pages.is_empty() {
            self.pages.push(PagePlan::default());
        }
        let last = self.pages.len() - 1;
        &mut self.pages[last]
    }

    /// Reserve `height` points, breaking the page if they do not fit.
    fn reserve(&mut self, height: f32) {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.pages.push(PagePlan::default());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn space(&mut self, amount: f32) {
        self.y = (self.y - amount).max(MARGIN);
    }

    fn prepare(&self, logical: &str) -> String {
        if self.direction.is_rtl() {
            visual_order(logical)
        } else {
            logical.to_string()
        }
    }

    /// Wrap and emit a block of text.
    #[allow(clippy::too_many_arguments)]
    fn paragraph(
        &mut self,
        text: &str,
        size: f32,
        leading: f32,
        indent: f32,
        role: FontRole,
        color: Rgb,
        align: Align,
    ) {
        let content_width = PAGE_WIDTH - 2.0 * MARGIN - indent;
        for line in wrap(text, size, content_width) {
            self.reserve(leading);
            self.y -= leading;
            let display = self.prepare(&line);
            let w = text_width(&display, size);
            let x = match (align, self.direction.is_rtl()) {
                (Align::Center, _) => MARGIN + (PAGE_WIDTH - 2.0 * MARGIN - w) / 2.0,
                (Align::Start, false) => MARGIN + indent,
                (Align::Start, true) => PAGE_WIDTH - MARGIN - indent - w,
            };
            let y = self.y + (leading - size) / 2.0;
            self.page().ops.push(DrawOp::Text {
                x,
                y,
                text: display,
                size,
                role,
                color,
            });
        }
    }

    fn title(&mut self, title: &str) {
        let inner = PAGE_WIDTH - 2.0 * MARGIN - 2.0 * TITLE_PADDING;
        let lines = wrap(title, TITLE_SIZE, inner);
        let height = 2.0 * TITLE_PADDING + lines.len().max(1) as f32 * TITLE_LEADING;

        self.reserve(height);
        let top = self.y;
        self.page().ops.push(DrawOp::Rect {
            left: MARGIN,
            bottom: top - height,
            width: PAGE_WIDTH - 2.0 * MARGIN,
            height,
            fill: Some(Rgb::TITLE_BG),
            stroke: Some(Rgb::TITLE_BORDER),
        });

        let mut baseline = top - TITLE_PADDING;
        for line in lines {
            baseline -= TITLE_LEADING;
            let display = self.prepare(&line);
            let w = text_width(&display, TITLE_SIZE);
            let x = if self.direction.is_rtl() {
                PAGE_WIDTH - MARGIN - TITLE_PADDING - w
            } else {
                MARGIN + (PAGE_WIDTH - 2.0 * MARGIN - w) / 2.0
            };
            self.page().ops.push(DrawOp::Text {
                x,
                y: baseline + (TITLE_LEADING - TITLE_SIZE) / 2.0,
                text: display,
                size: TITLE_SIZE,
                role: FontRole::Heading,
                color: Rgb::DARK,
            });
        }
        self.y = top - height;
        self.space(TITLE_SPACE_AFTER);
    }

    fn logo(&mut self) {
        self.space(LOGO_SPACE_BEFORE);
        self.reserve(LOGO_SIZE);
        self.y -= LOGO_SIZE;
        let x = (PAGE_WIDTH - LOGO_SIZE) / 2.0;
        let y = self.y;
        self.page().ops.push(DrawOp::Logo {
            x,
            y,
            width: LOGO_SIZE,
            height: LOGO_SIZE,
        });
    }
}

/// Lay out `items` under `profile`'s title and direction.
///
/// For right-to-left locales every string is reshaped before wrapping and
/// reordered per line after it. A logo, when given, closes the document.
pub fn layout_report(
    items: &[ContentItem],
    profile: &LocaleProfile,
    logo: Option<DynamicImage>,
) -> RenderPlan {
    let direction = profile.direction();
    let shape = |s: &str| -> String {
        if direction.is_rtl() {
            reshape_arabic(s)
        } else {
            s.to_string()
        }
    };

    let mut cursor = Cursor::new(direction);
    cursor.title(&shape(&profile.title));

    for item in items {
        match item.kind {
            ContentKind::Header => {
                cursor.space(HEADER_SPACE_BEFORE);
                cursor.paragraph(
                    &shape(&item.text),
                    HEADER_SIZE,
                    HEADER_LEADING,
                    HEADER_INDENT,
                    FontRole::Heading,
                    Rgb::DARK,
                    Align::Start,
                );
                cursor.space(HEADER_SPACE_AFTER);
            }
            ContentKind::Bullet | ContentKind::Plain => {
                let text = if item.kind == ContentKind::Bullet {
                    format!("{BULLET_PREFIX}{}", item.text)
                } else {
                    item.text.clone()
                };
                cursor.paragraph(
                    &shape(&text),
                    CONTENT_SIZE,
                    CONTENT_LEADING,
                    CONTENT_INDENT,
                    FontRole::Body,
                    Rgb::BODY,
                    Align::Start,
                );
                cursor.space(CONTENT_SPACE_AFTER);
            }
        }
    }

    if logo.is_some() {
        cursor.logo();
    }

    RenderPlan {
        title: profile.title.clone(),
        direction,
        width: PAGE_WIDTH,
        height: PAGE_HEIGHT,
        pages: cursor.pages,
        logo,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locale::{Locale, LocaleCatalog};
    use image::RgbaImage;

    fn texts_with_x(plan: &RenderPlan) -> Vec<(String, f32, f32)> {
        plan.pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { text, x, size, .. } => Some((text.clone(), *x, *size)),
                _ => None,
            })
            .collect()
    }

    fn sample() -> Vec<ContentItem> {
        vec![
            ContentItem::header("Recommendation"),
            ContentItem::bullet("Add indemnity clause"),
            ContentItem::plain("Clause 4 is vague"),
        ]
    }

    #[test]
    fn ltr_title_is_centered_and_content_indented_left() {
        let catalog = LocaleCatalog::builtin();
        let plan = layout_report(&sample(), catalog.profile(Locale::En), None);
        let texts = texts_with_x(&plan);

        let (title, x, size) = &texts[0];
        assert_eq!(title, "Contract Analysis");
        let w = text_width(title, *size);
        assert!((x + w / 2.0 - PAGE_WIDTH / 2.0).abs() < 0.01);

        assert_eq!(texts[1].0, "Recommendation");
        assert_eq!(texts[1].1, MARGIN + HEADER_INDENT);
        assert_eq!(texts[2].0, "• Add indemnity clause");
        assert_eq!(texts[2].1, MARGIN + CONTENT_INDENT);
        assert_eq!(texts[3].0, "Clause 4 is vague");
    }

    #[test]
    fn rtl_lines_are_right_aligned_and_shaped() {
        let catalog = LocaleCatalog::builtin();
        let items = vec![
            ContentItem::header("التوصية"),
            ContentItem::bullet("إضافة بند"),
        ];
        let plan = layout_report(&items, catalog.profile(Locale::Ar), None);
        let texts = texts_with_x(&plan);

        for (text, x, size) in &texts[1..] {
            assert!(!text.contains('\u{0627}'), "unshaped text: {text:?}");
            let right = x + text_width(text, *size);
            assert!(right <= PAGE_WIDTH - MARGIN - HEADER_INDENT + 0.01);
            assert!(right >= PAGE_WIDTH - MARGIN - CONTENT_INDENT - 0.01);
        }

        let (title, x, size) = &texts[0];
        let right = x + text_width(title, *size);
        assert!((right - (PAGE_WIDTH - MARGIN - TITLE_PADDING)).abs() < 0.01);

        // Bullet marker opens the line logically, so it ends up on the right.
        assert!(texts[2].0.ends_with('•'), "got: {:?}", texts[2].0);
    }

    #[test]
    fn long_content_wraps_and_paginates() {
        let catalog = LocaleCatalog::builtin();
        let long = "indemnity ".repeat(40);
        let items: Vec<ContentItem> = (0..40).map(|_| ContentItem::plain(long.clone())).collect();
        let plan = layout_report(&items, catalog.profile(Locale::En), None);
        assert!(plan.pages.len() > 1);

        for page in &plan.pages {
            for op in &page.ops {
                if let DrawOp::Text { x, y, text, size, .. } = op {
                    assert!(*y >= MARGIN - 0.01, "below bottom margin: {y}");
                    assert!(x + text_width(text, *size) <= PAGE_WIDTH - MARGIN + 0.01);
                }
            }
        }
    }

    #[test]
    fn logo_is_last_and_centered() {
        let catalog = LocaleCatalog::builtin();
        let logo = DynamicImage::ImageRgba8(RgbaImage::new(4, 4));
        let plan = layout_report(&sample(), catalog.profile(Locale::Fr), Some(logo));
        let last = plan.pages.last().unwrap().ops.last().unwrap();
        match last {
            DrawOp::Logo { x, width, .. } => {
                assert_eq!(*width, LOGO_SIZE);
                assert_eq!(*x, (PAGE_WIDTH - LOGO_SIZE) / 2.0);
            }
            other => panic!("expected logo, got {other:?}"),
        }
    }

    #[test]
    fn no_logo_op_without_asset() {
        let catalog = LocaleCatalog::builtin();
        let plan = layout_report(&sample(), catalog.profile(Locale::En), None);
        let has_logo = plan
            .pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .any(|op| matches!(op, DrawOp::Logo { .. }));
        assert!(!has_logo);
    }

    #[test]
    fn wrap_splits_overlong_words() {
        let lines = wrap("aaaaaaaaaaaaaaaaaaaa", 10.0, 30.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), "aaaaaaaaaaaaaaaaaaaa");
        for l in &lines {
            assert!(text_width(l, 10.0) <= 30.0);
        }
    }

    #[test]
    fn empty_items_still_have_a_title() {
        let catalog = LocaleCatalog::builtin();
        let plan = layout_report(&[], catalog.profile(Locale::En), None);
        assert_eq!(plan.pages.len(), 1);
        assert_eq!(plan.texts().collect::<Vec<_>>(), vec!["Contract Analysis"]);
    }
}
