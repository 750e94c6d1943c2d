//! Supported locales and the per-locale data that drives the pipeline.
//!
//! Everything that differs between English, French and Arabic output lives
//! here as data: the rubric vocabulary the response parser recognises, the
//! prompt template and sentinel, the report title, and the text direction.
//! A [`LocaleCatalog`] is built once at startup, validated, and handed to
//! each component through [`crate::config::AnalysisConfig`].

use crate::prompts;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A supported output language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Fr,
    Ar,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::En, Locale::Fr, Locale::Ar];

    /// ISO 639-1 code.
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Fr => "fr",
            Locale::Ar => "ar",
        }
    }

    /// Parse an ISO 639-1 code, case-insensitively.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Locale::En),
            "fr" => Some(Locale::Fr),
            "ar" => Some(Locale::Ar),
            _ => None,
        }
    }

    pub fn direction(self) -> TextDirection {
        match self {
            Locale::Ar => TextDirection::RightToLeft,
            Locale::En | Locale::Fr => TextDirection::LeftToRight,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextDirection {
    LeftToRight,
    RightToLeft,
}

impl TextDirection {
    pub fn is_rtl(self) -> bool {
        matches!(self, TextDirection::RightToLeft)
    }
}

/// The three fixed rubric categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKey {
    MissingClauses,
    ProblemDescription,
    Recommendation,
}

impl SectionKey {
    pub const ALL: [SectionKey; 3] = [
        SectionKey::MissingClauses,
        SectionKey::ProblemDescription,
        SectionKey::Recommendation,
    ];
}

/// One rubric section as it appears in a locale.
#[derive(Debug, Clone)]
pub struct SectionEntry {
    pub key: SectionKey,
    /// Label emitted for the section header, whatever text matched.
    pub label: String,
    /// Header strings recognised as this section's marker.
    pub headers: Vec<String>,
}

/// Ordered mapping from section key to recognised header strings.
///
/// Declaration order is match priority: when a line could match two
/// sections, the earlier one wins.
#[derive(Debug, Clone, Default)]
pub struct SectionVocabulary {
    entries: Vec<SectionEntry>,
}

impl SectionVocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a section. The label is always recognised as a header too.
    pub fn section(mut self, key: SectionKey, label: &str, aliases: &[&str]) -> Self {
        let mut headers = vec![label.to_string()];
        headers.extend(aliases.iter().map(|a| a.to_string()));
        self.entries.push(SectionEntry {
            key,
            label: label.to_string(),
            headers,
        });
        self
    }

    pub fn entries(&self) -> &[SectionEntry] {
        &self.entries
    }

    pub fn label(&self, key: SectionKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|e| e.key == key)
            .map(|e| e.label.as_str())
    }

    /// Check the vocabulary covers all three rubric sections exactly once
    /// and that no header string can match two different sections.
    pub fn validate(&self) -> Result<(), String> {
        for key in SectionKey::ALL {
            let count = self.entries.iter().filter(|e| e.key == key).count();
            if count != 1 {
                return Err(format!("section {key:?} declared {count} times"));
            }
        }

        for (i, a) in self.entries.iter().enumerate() {
            for b in self.entries.iter().skip(i + 1) {
                for ha in &a.headers {
                    for hb in &b.headers {
                        let (la, lb) = (ha.to_lowercase(), hb.to_lowercase());
                        if la.contains(&lb) || lb.contains(&la) {
                            return Err(format!(
                                "header '{ha}' ({:?}) overlaps '{hb}' ({:?})",
                                a.key, b.key
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// All locale-specific data for one [`Locale`].
#[derive(Debug, Clone)]
pub struct LocaleProfile {
    pub locale: Locale,
    /// Report title.
    pub title: String,
    /// Rubric instruction sent as the system turn.
    pub system_prompt: String,
    /// Exact "not a contract" answer the prompt asks for.
    pub sentinel: String,
    pub vocabulary: SectionVocabulary,
    /// Also accept an exact (case-preserving) substring match on headers.
    /// Set for scripts without case.
    pub exact_substring_headers: bool,
}

impl LocaleProfile {
    pub fn direction(&self) -> TextDirection {
        self.locale.direction()
    }
}

/// Immutable set of locale profiles plus the fallback locale.
#[derive(Debug, Clone)]
pub struct LocaleCatalog {
    profiles: Vec<LocaleProfile>,
    default_locale: Locale,
}

impl LocaleCatalog {
    /// English, French and Arabic, defaulting to English.
    pub fn builtin() -> Self {
        let en = LocaleProfile {
            locale: Locale::En,
            title: "Contract Analysis".into(),
            system_prompt: prompts::SYSTEM_PROMPT_EN.into(),
            sentinel: prompts::SENTINEL_EN.into(),
            vocabulary: SectionVocabulary::new()
                .section(
                    SectionKey::MissingClauses,
                    "Missing Articles/Clauses",
                    &["Missing Clauses"],
                )
                .section(SectionKey::ProblemDescription, "Problem Description", &[])
                .section(SectionKey::Recommendation, "Recommendation", &[]),
            exact_substring_headers: false,
        };

        let fr = LocaleProfile {
            locale: Locale::Fr,
            title: "Analyse du Contrat".into(),
            system_prompt: prompts::SYSTEM_PROMPT_FR.into(),
            sentinel: prompts::SENTINEL_FR.into(),
            vocabulary: SectionVocabulary::new()
                .section(
                    SectionKey::MissingClauses,
                    "Articles/Clauses Manquantes",
                    &["Clauses Manquantes"],
                )
                .section(
                    SectionKey::ProblemDescription,
                    "Description du problème",
                    &[],
                )
                .section(SectionKey::Recommendation, "Recommandation", &[]),
            exact_substring_headers: false,
        };

        let ar = LocaleProfile {
            locale: Locale::Ar,
            title: "تحليل العقد".into(),
            system_prompt: prompts::SYSTEM_PROMPT_AR.into(),
            sentinel: prompts::SENTINEL_AR.into(),
            vocabulary: SectionVocabulary::new()
                .section(
                    SectionKey::MissingClauses,
                    "المواد و البنود المفقودة",
                    &["البنود المفقودة"],
                )
                .section(SectionKey::ProblemDescription, "وصف المشكلة", &[])
                .section(SectionKey::Recommendation, "التوصية", &[]),
            exact_substring_headers: true,
        };

        Self {
            profiles: vec![en, fr, ar],
            default_locale: Locale::En,
        }
    }

    /// Replace the fallback locale.
    pub fn with_default_locale(mut self, locale: Locale) -> Self {
        self.default_locale = locale;
        self
    }

    /// Replace or add a profile.
    pub fn with_profile(mut self, profile: LocaleProfile) -> Self {
        self.profiles.retain(|p| p.locale != profile.locale);
        self.profiles.push(profile);
        self
    }

    pub fn default_locale(&self) -> Locale {
        self.default_locale
    }

    pub fn supports(&self, locale: Locale) -> bool {
        self.profiles.iter().any(|p| p.locale == locale)
    }

    /// Profile for `locale`, or the default profile when it is missing.
    pub fn profile(&self, locale: Locale) -> &LocaleProfile {
        self.profiles
            .iter()
            .find(|p| p.locale == locale)
            .or_else(|| self.profiles.iter().find(|p| p.locale == self.default_locale))
            .unwrap_or(&self.profiles[0])
    }

    pub fn profiles(&self) -> &[LocaleProfile] {
        &self.profiles
    }

    /// Every locale's sentinel string.
    pub fn sentinels(&self) -> impl Iterator<Item = &str> {
        self.profiles.iter().map(|p| p.sentinel.as_str())
    }

    /// Validate every vocabulary and the default locale.
    pub fn validate(&self) -> Result<(), String> {
        if self.profiles.is_empty() {
            return Err("locale catalog is empty".into());
        }
        if !self.supports(self.default_locale) {
            return Err(format!(
                "default locale '{}' has no profile",
                self.default_locale
            ));
        }
        for p in &self.profiles {
            p.vocabulary
                .validate()
                .map_err(|e| format!("locale '{}': {e}", p.locale))?;
            if p.sentinel.trim().is_empty() {
                return Err(format!("locale '{}': empty sentinel", p.locale));
            }
        }
        Ok(())
    }
}

impl Default for LocaleCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_is_valid() {
        LocaleCatalog::builtin().validate().expect("valid catalog");
    }

    #[test]
    fn every_vocabulary_covers_all_sections() {
        let catalog = LocaleCatalog::builtin();
        for locale in Locale::ALL {
            let vocab = &catalog.profile(locale).vocabulary;
            for key in SectionKey::ALL {
                assert!(vocab.label(key).is_some(), "{locale}: missing {key:?}");
            }
        }
    }

    #[test]
    fn overlapping_headers_are_rejected() {
        let vocab = SectionVocabulary::new()
            .section(SectionKey::MissingClauses, "Missing Clauses", &[])
            .section(SectionKey::ProblemDescription, "Clauses", &[])
            .section(SectionKey::Recommendation, "Recommendation", &[]);
        let err = vocab.validate().unwrap_err();
        assert!(err.contains("overlaps"), "got: {err}");
    }

    #[test]
    fn missing_section_is_rejected() {
        let vocab = SectionVocabulary::new()
            .section(SectionKey::MissingClauses, "Missing Clauses", &[])
            .section(SectionKey::Recommendation, "Recommendation", &[]);
        assert!(vocab.validate().is_err());
    }

    #[test]
    fn unknown_locale_falls_back_to_default() {
        let fr = LocaleCatalog::builtin().profile(Locale::Fr).clone();
        let only_fr = LocaleCatalog {
            profiles: vec![fr],
            default_locale: Locale::Fr,
        };
        assert!(!only_fr.supports(Locale::Ar));
        assert_eq!(only_fr.profile(Locale::Ar).locale, Locale::Fr);
    }

    #[test]
    fn locale_codes_round_trip() {
        for locale in Locale::ALL {
            assert_eq!(Locale::from_code(locale.code()), Some(locale));
        }
        assert_eq!(Locale::from_code("DE"), None);
        assert!(Locale::Ar.direction().is_rtl());
        assert!(!Locale::Fr.direction().is_rtl());
    }

    #[test]
    fn prompts_name_every_section_header() {
        let catalog = LocaleCatalog::builtin();
        for p in catalog.profiles() {
            for entry in p.vocabulary.entries() {
                assert!(
                    p.system_prompt.contains(&format!("{}:", entry.label)),
                    "{}: prompt does not name '{}'",
                    p.locale,
                    entry.label
                );
            }
        }
    }
}
