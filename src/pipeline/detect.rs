//! Language detection over extracted text.
//!
//! Never fails: empty input, an inconclusive guess, or a language outside
//! the supported set all resolve to the caller's default locale.

use crate::locale::{Locale, LocaleCatalog};
use tracing::{debug, info};
use whatlang::Lang;

/// Classify `text` into a supported locale, falling back to `default`.
pub fn detect_locale(text: &str, default: Locale) -> Locale {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        debug!("Empty text, using default locale '{}'", default);
        return default;
    }

    let Some(info) = whatlang::detect(trimmed) else {
        info!("Language detection inconclusive, using default locale '{}'", default);
        return default;
    };

    match map_lang(info.lang()) {
        Some(locale) => {
            debug!(
                "Detected '{}' (confidence {:.2})",
                locale,
                info.confidence()
            );
            locale
        }
        None => {
            info!(
                "Detected unsupported language '{}', using default locale '{}'",
                info.lang().code(),
                default
            );
            default
        }
    }
}

/// [`detect_locale`] restricted to the locales `catalog` has profiles for.
pub fn detect_catalog_locale(text: &str, catalog: &LocaleCatalog) -> Locale {
    let default = catalog.default_locale();
    let locale = detect_locale(text, default);
    if catalog.supports(locale) {
        locale
    } else {
        info!("No profile for '{}', using default locale '{}'", locale, default);
        default
    }
}

fn map_lang(lang: Lang) -> Option<Locale> {
    match lang {
        Lang::Eng => Some(Locale::En),
        Lang::Fra => Some(Locale::Fr),
        Lang::Ara => Some(Locale::Ar),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_supported_languages() {
        let en = "This agreement is entered into by and between the landlord and the tenant, \
                  who agree to the following terms and conditions regarding the property.";
        let fr = "Le présent contrat est conclu entre le bailleur et le locataire, qui \
                  conviennent des conditions suivantes concernant le logement et le loyer.";
        let ar = "تم إبرام هذا العقد بين المؤجر والمستأجر، ويتفق الطرفان على الشروط التالية \
                  المتعلقة بالعقار وقيمة الإيجار الشهري.";
        assert_eq!(detect_locale(en, Locale::Fr), Locale::En);
        assert_eq!(detect_locale(fr, Locale::En), Locale::Fr);
        assert_eq!(detect_locale(ar, Locale::En), Locale::Ar);
    }

    #[test]
    fn empty_text_uses_default() {
        assert_eq!(detect_locale("", Locale::Fr), Locale::Fr);
        assert_eq!(detect_locale("   \n", Locale::Ar), Locale::Ar);
    }

    #[test]
    fn unsupported_language_uses_default() {
        let de = "Dieser Vertrag wird zwischen dem Vermieter und dem Mieter geschlossen, \
                  die sich auf die folgenden Bedingungen für die Wohnung einigen.";
        assert_eq!(detect_locale(de, Locale::En), Locale::En);
    }

    #[test]
    fn short_noise_does_not_panic() {
        let _ = detect_locale("1", Locale::En);
        let _ = detect_locale("§§ --", Locale::En);
    }

    #[test]
    fn catalog_default_applies() {
        let catalog = LocaleCatalog::builtin().with_default_locale(Locale::Ar);
        assert_eq!(detect_catalog_locale("", &catalog), Locale::Ar);
    }
}
