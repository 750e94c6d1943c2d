//! Rubric instructions and "not a contract" sentinels, one set per locale.
//!
//! The system prompt tells the model to answer with the three rubric section
//! headers, one item per line, recommendations as bullets. The section headers
//! named here must stay in step with the vocabularies in [`crate::locale`];
//! `prompts_name_every_section_header` guards that.
//!
//! Each prompt ends with an instruction to answer with the locale's sentinel,
//! verbatim, when the supplied text is not a contract.

/// Exact answer the English prompt asks for on non-contract input.
pub const SENTINEL_EN: &str = "The provided document is not a contract.";

/// Exact answer the French prompt asks for on non-contract input.
pub const SENTINEL_FR: &str = "Le document fourni n'est pas un contrat.";

/// Exact answer the Arabic prompt asks for on non-contract input.
pub const SENTINEL_AR: &str = "المستند المقدم ليس عقدًا.";

pub const SYSTEM_PROMPT_EN: &str = r#"You are a specialized legal assistant. Analyze the contract according to the structure:
Missing Articles/Clauses:
Problem Description:
Recommendation:
- Write one item per line, not paragraphs.
- Provide recommendations as a bulleted list.
- Example:
• Recommendation 1
• Recommendation 2

If the text is not a contract, answer exactly with the following sentence and nothing else:
The provided document is not a contract."#;

pub const SYSTEM_PROMPT_FR: &str = r#"Vous êtes un assistant juridique spécialisé. Analysez le contrat selon la structure:
Articles/Clauses Manquantes:
Description du problème:
Recommandation:
- Écrivez un élément par ligne, pas de paragraphes.
- Fournissez les recommandations sous forme de liste à puces.
- Exemple :
• Recommandation 1
• Recommandation 2

Si le texte n'est pas un contrat, répondez exactement par la phrase suivante et rien d'autre :
Le document fourni n'est pas un contrat."#;

pub const SYSTEM_PROMPT_AR: &str = r#"اكتب في شكل اسطر و ليس فقرات. أنت مساعد قانوني متخصص. قم بتحليل العقد وفقاً للهيكل التالي:
المواد و البنود المفقودة:
وصف المشكلة:
التوصية:
- قدم التوصيات في شكل نقاط.
- مثال:
• التوصية 1
• التوصية 2

إذا لم يكن النص عقدًا، أجب بالجملة التالية حرفيًا ولا شيء غيرها:
المستند المقدم ليس عقدًا."#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompts_end_with_their_sentinel() {
        assert!(SYSTEM_PROMPT_EN.ends_with(SENTINEL_EN));
        assert!(SYSTEM_PROMPT_FR.ends_with(SENTINEL_FR));
        assert!(SYSTEM_PROMPT_AR.ends_with(SENTINEL_AR));
    }

    #[test]
    fn sentinels_are_distinct() {
        assert_ne!(SENTINEL_EN, SENTINEL_FR);
        assert_ne!(SENTINEL_FR, SENTINEL_AR);
        assert_ne!(SENTINEL_EN, SENTINEL_AR);
    }
}
