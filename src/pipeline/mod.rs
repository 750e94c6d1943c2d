//! Pipeline stages for contract analysis.
//!
//! Each submodule implements one step; [`crate::analyze`] wires them together.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ extract ──▶ detect ──▶ llm ──▶ normalize ──▶ parse ──▶ render
//! (HEAD/GET) (pdf/word/ocr) (locale) (model)  (cleanup)   (items)   (PDF + store)
//! ```
//!
//! 1. [`input`]     validate the request, classify the declared content type, fetch bytes
//! 2. [`extract`]   turn bytes into text; never errors, empty means "nothing found"
//! 3. [`detect`]    pick the locale whose rubric and styling apply
//! 4. [`llm`]       one bounded completion call; the only stage talking to the model
//! 5. [`normalize`] strip presentation artefacts from the model answer
//! 6. [`parse`]     state machine from answer lines to typed items, or the sentinel outcome
//! 7. [`render`]    lay out, paint, and persist the localized review

pub mod detect;
pub mod extract;
pub mod input;
pub mod llm;
pub mod normalize;
pub mod parse;
pub mod render;
