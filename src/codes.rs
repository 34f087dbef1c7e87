//! Structured color-code extraction from document text
//!
//! Recovers `(code, finish)` tuples from a page's raw text, either from
//! the document's own text layer or from OCR output. A token is an
//! alphanumeric prefix (e.g. `RAL`) followed by a fixed-length numeric
//! code, optionally followed by a finish qualifier word. Extraction is
//! order-preserving and de-duplicated; a missing token is not an error,
//! it just yields fewer codes.

use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use image::RgbImage;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CodePatternConfig;
use crate::ocr::OcrEngine;
use crate::{ExtractionError, Result};

/// Finish variant of a swatch, distinct from its color code.
///
/// Qualifier words in the source documents are French (`BRILLANT`,
/// `SABLÉ`, `MAT`, `SPÉCIALE`); an unqualified token defaults to glossy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Finish {
    Glossy,
    Sanded,
    Matte,
    Special,
}

impl Finish {
    /// Filename-safe slug used in post-reconciliation asset names
    pub fn as_str(&self) -> &'static str {
        match self {
            Finish::Glossy => "glossy",
            Finish::Sanded => "sanded",
            Finish::Matte => "matte",
            Finish::Special => "special",
        }
    }

    /// Classify a qualifier word by case- and accent-insensitive prefix
    /// matching. `None` or an unrecognized word means the default finish.
    pub fn from_qualifier(word: Option<&str>) -> Finish {
        let Some(word) = word else {
            return Finish::Glossy;
        };
        let folded: String = word
            .to_uppercase()
            .chars()
            .map(|c| match c {
                'É' | 'È' | 'Ê' => 'E',
                other => other,
            })
            .collect();
        if folded.starts_with("SABL") {
            Finish::Sanded
        } else if folded.starts_with("MAT") {
            Finish::Matte
        } else if folded.starts_with("SP") {
            Finish::Special
        } else {
            Finish::Glossy
        }
    }
}

impl fmt::Display for Finish {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured color record recovered from text.
///
/// Either `code` or `name` is present; named, non-coded swatches come
/// from the hand-maintained [`NamedColorTable`], not from the document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ColorCode {
    /// Numeric code, e.g. `1234`
    pub code: Option<String>,
    /// Finish variant
    pub finish: Finish,
    /// Human-given color name, for swatches the document does not encode
    /// as a structured token
    pub name: Option<String>,
}

impl ColorCode {
    /// Create a coded entry with no name
    pub fn coded(code: impl Into<String>, finish: Finish) -> Self {
        Self {
            code: Some(code.into()),
            finish,
            name: None,
        }
    }

    /// Filename stem for the reconciled asset: `<code>-<finish>`, falling
    /// back to a slug of the name for non-coded entries
    pub fn asset_stem(&self) -> String {
        let label = match (&self.code, &self.name) {
            (Some(code), _) => code.clone(),
            (None, Some(name)) => name.to_lowercase().replace(' ', "-"),
            (None, None) => "unknown".to_string(),
        };
        format!("{}-{}", label, self.finish)
    }
}

/// One hand-maintained named-color entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedColor {
    pub name: String,
    pub code: Option<String>,
    pub finish: Finish,
}

/// Hand-maintained lookup table for named (non-coded) swatches.
///
/// This is external enrichment data tied to one source document, injected
/// into the extractor so the pipeline core stays document-agnostic.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NamedColorTable {
    pub entries: Vec<NamedColor>,
}

impl NamedColorTable {
    /// Load a table from a JSON file
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            ExtractionError::config(format!("invalid named-color table {}", path.display()), e)
        })
    }
}

/// Extracts structured code tokens from page text.
///
/// Two backends share this contract: direct extraction over a text layer
/// already present in the document, and extraction over OCR output from a
/// rendered page image.
pub struct CodeExtractor {
    pattern: Regex,
    known_names: NamedColorTable,
}

impl CodeExtractor {
    /// Build an extractor for the given token shape
    pub fn new(config: &CodePatternConfig) -> Result<Self> {
        let source = format!(
            r"(?i){}\s*(\d{{{}}})(?:\s*(SABL[ÉE]?|MAT|BRILLANT|SP[ÉE]CIALES?))?",
            regex::escape(&config.prefix),
            config.code_length
        );
        let pattern = Regex::new(&source).map_err(|_| ExtractionError::InvalidParameter {
            parameter: "pattern.prefix".to_string(),
            value: config.prefix.clone(),
        })?;
        Ok(Self {
            pattern,
            known_names: NamedColorTable::default(),
        })
    }

    /// Attach a named-color fallback table; its entries are appended after
    /// the tokens extracted from text, then de-duplicated with them
    pub fn with_known_names(mut self, table: NamedColorTable) -> Self {
        self.known_names = table;
        self
    }

    /// Extract every code token from raw page text.
    ///
    /// Returns a de-duplicated, order-preserving sequence; the
    /// de-duplication key is `(code, finish, name)` and the first
    /// occurrence wins.
    pub fn extract_from_text(&self, text: &str) -> Vec<ColorCode> {
        let mut items: Vec<ColorCode> = self
            .pattern
            .captures_iter(text)
            .map(|caps| {
                let code = caps.get(1).map(|m| m.as_str().to_string());
                let finish = Finish::from_qualifier(caps.get(2).map(|m| m.as_str()));
                ColorCode {
                    code,
                    finish,
                    name: None,
                }
            })
            .collect();

        for named in &self.known_names.entries {
            items.push(ColorCode {
                code: named.code.clone(),
                finish: named.finish,
                name: Some(named.name.clone()),
            });
        }

        let deduped = dedup_codes(items);
        debug!(count = deduped.len(), "extracted color codes from text");
        deduped
    }

    /// Extract code tokens from a rendered page image via OCR.
    ///
    /// Markedly less reliable than a text layer; callers should pair this
    /// with a restricted character allow-list and a higher render
    /// resolution.
    pub fn extract_from_image(&self, image: &RgbImage, ocr: &OcrEngine) -> Result<Vec<ColorCode>> {
        let text = ocr.recognize(image)?;
        Ok(self.extract_from_text(&text))
    }
}

/// Drop later exact repeats of `(code, finish, name)`, preserving order
pub fn dedup_codes(items: Vec<ColorCode>) -> Vec<ColorCode> {
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert((item.code.clone(), item.finish, item.name.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> CodeExtractor {
        CodeExtractor::new(&CodePatternConfig::default()).unwrap()
    }

    #[test]
    fn test_extract_with_duplicates() {
        let items = extractor().extract_from_text("RAL 1234 SABLE RAL 1234 SABLE RAL 5678");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0], ColorCode::coded("1234", Finish::Sanded));
        assert_eq!(items[1], ColorCode::coded("5678", Finish::Glossy));
    }

    #[test]
    fn test_qualifier_classification() {
        assert_eq!(Finish::from_qualifier(Some("SABLÉ")), Finish::Sanded);
        assert_eq!(Finish::from_qualifier(Some("sable")), Finish::Sanded);
        assert_eq!(Finish::from_qualifier(Some("MAT")), Finish::Matte);
        assert_eq!(Finish::from_qualifier(Some("SPÉCIALES")), Finish::Special);
        assert_eq!(Finish::from_qualifier(Some("BRILLANT")), Finish::Glossy);
        assert_eq!(Finish::from_qualifier(None), Finish::Glossy);
    }

    #[test]
    fn test_unqualified_token_defaults_to_glossy() {
        let items = extractor().extract_from_text("entête RAL 9016 pied de page");
        assert_eq!(items, vec![ColorCode::coded("9016", Finish::Glossy)]);
    }

    #[test]
    fn test_no_token_yields_empty_not_error() {
        let items = extractor().extract_from_text("aucun code sur cette page");
        assert!(items.is_empty());
    }

    #[test]
    fn test_compact_token_spacing() {
        let items = extractor().extract_from_text("RAL7016 MAT");
        assert_eq!(items, vec![ColorCode::coded("7016", Finish::Matte)]);
    }

    #[test]
    fn test_known_names_appended_and_deduped() {
        let table = NamedColorTable {
            entries: vec![
                NamedColor {
                    name: "Brisbane".to_string(),
                    code: None,
                    finish: Finish::Sanded,
                },
                NamedColor {
                    name: "Brisbane".to_string(),
                    code: None,
                    finish: Finish::Sanded,
                },
            ],
        };
        let items = extractor()
            .with_known_names(table)
            .extract_from_text("RAL 2525 SABLÉ");
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].name.as_deref(), Some("Brisbane"));
    }

    #[test]
    fn test_asset_stem() {
        assert_eq!(
            ColorCode::coded("1234", Finish::Sanded).asset_stem(),
            "1234-sanded"
        );
        let named = ColorCode {
            code: None,
            finish: Finish::Special,
            name: Some("Gold Pearl".to_string()),
        };
        assert_eq!(named.asset_stem(), "gold-pearl-special");
    }

    #[test]
    fn test_custom_prefix_and_length() {
        let config = CodePatternConfig {
            prefix: "NCS".to_string(),
            code_length: 3,
        };
        let extractor = CodeExtractor::new(&config).unwrap();
        let items = extractor.extract_from_text("NCS 123 et NCS 4567");
        // A 4-digit token still matches its first 3 digits; the fixed
        // length bounds the code, not the surrounding text.
        assert_eq!(items[0], ColorCode::coded("123", Finish::Glossy));
    }
}
