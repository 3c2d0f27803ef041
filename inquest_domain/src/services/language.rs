// /////////////////////////////////////////////////////////////////////////////
// Inquest
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Language Detection
//!
//! Detection is layered the way every optional capability is layered: a
//! library pass (`whatlang`) first, then a PT/EN stop-word fragment heuristic
//! when the library result is absent or unconvincing. Corpora handled by the
//! engine are predominantly Portuguese and English; the heuristic exists so a
//! run never fails for want of a detector.
//!
//! Codes are ISO-639-1 where one exists (`pt`, `en`, …); `"unknown"` when the
//! text is empty or too short to judge.

/// Fragments with embedded spaces so they match whole words mid-sentence.
const PT_FRAGMENTS: [&str; 11] = [
    " de ", " da ", " do ", " que ", " e ", " o ", " a ", " em ", " para ", " com ", " não ",
];
const EN_FRAGMENTS: [&str; 9] = [
    " the ", " and ", " of ", " to ", " in ", " is ", " for ", " on ", " with ",
];

/// Sample budget for the fragment heuristic.
const SAMPLE_CHARS: usize = 2000;

/// Detected language with the confidence the detector assigns to it.
#[derive(Debug, Clone, PartialEq)]
pub struct LanguageGuess {
    pub code: String,
    pub confidence: f64,
}

impl LanguageGuess {
    fn unknown() -> Self {
        Self {
            code: "unknown".to_string(),
            confidence: 0.0,
        }
    }
}

/// Detects the language of a text.
///
/// Texts shorter than 20 characters return `unknown`. A confident `whatlang`
/// result wins; otherwise the PT/EN fragment ratio decides with confidence
/// 0.7, or `other` with 0.5 when the fragments tie.
pub fn detect(text: &str) -> LanguageGuess {
    let trimmed = text.trim();
    if trimmed.len() < 20 {
        return LanguageGuess::unknown();
    }

    if let Some(info) = whatlang::detect(trimmed) {
        if info.is_reliable() {
            return LanguageGuess {
                code: iso_639_1(info.lang()),
                confidence: 0.9,
            };
        }
    }

    let sample: String = trimmed.chars().take(SAMPLE_CHARS).collect::<String>().to_lowercase();
    let pt = PT_FRAGMENTS.iter().filter(|f| sample.contains(*f)).count();
    let en = EN_FRAGMENTS.iter().filter(|f| sample.contains(*f)).count();
    if pt > en {
        LanguageGuess {
            code: "pt".to_string(),
            confidence: 0.7,
        }
    } else if en > pt {
        LanguageGuess {
            code: "en".to_string(),
            confidence: 0.7,
        }
    } else {
        LanguageGuess {
            code: "other".to_string(),
            confidence: 0.5,
        }
    }
}

/// Maps whatlang's ISO-639-3 codes onto the two-letter codes the state model
/// stores, falling back to the three-letter code for languages without one in
/// the table.
fn iso_639_1(lang: whatlang::Lang) -> String {
    use whatlang::Lang;
    match lang {
        Lang::Por => "pt",
        Lang::Eng => "en",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Ita => "it",
        Lang::Nld => "nl",
        Lang::Rus => "ru",
        _ => return lang.code().to_string(),
    }
    .to_string()
}
