use anyhow::{Result, anyhow};
use isolang::Language;
use std::fmt;
use std::str::FromStr;

/// Language utilities for recognition identifiers and translation locales
///
/// The recognition engine speaks its own identifiers (`eng`, `jpn`,
/// `chi_sim`, ...) while the translation service expects ISO 639 locale
/// codes. Everything that crosses between the two goes through this module.
/// Recognition language understood by the extraction engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OcrLanguage {
    English,
    Japanese,
    ChineseSimplified,
    French,
    Spanish,
    Hindi,
    German,
    Korean,
    Russian,
    Arabic,
}

/// Hint used when nothing better is known ("plain text / Latin")
pub const DEFAULT_OCR_LANGUAGE: OcrLanguage = OcrLanguage::English;

/// Locale used for identifiers the mapper does not know
pub const DEFAULT_LOCALE: LocaleCode = LocaleCode::Tag(Language::Eng);

impl OcrLanguage {
    /// Every supported recognition language
    pub const ALL: [OcrLanguage; 10] = [
        OcrLanguage::English,
        OcrLanguage::Japanese,
        OcrLanguage::ChineseSimplified,
        OcrLanguage::French,
        OcrLanguage::Spanish,
        OcrLanguage::Hindi,
        OcrLanguage::German,
        OcrLanguage::Korean,
        OcrLanguage::Russian,
        OcrLanguage::Arabic,
    ];

    /// Engine identifier for this language
    pub fn code(&self) -> &'static str {
        match self {
            Self::English => "eng",
            Self::Japanese => "jpn",
            Self::ChineseSimplified => "chi_sim",
            Self::French => "fra",
            Self::Spanish => "spa",
            Self::Hindi => "hin",
            Self::German => "deu",
            Self::Korean => "kor",
            Self::Russian => "rus",
            Self::Arabic => "ara",
        }
    }

    /// Two-letter locale code the translation service uses for this language
    pub fn locale_code(&self) -> &'static str {
        match self {
            Self::English => "en",
            Self::Japanese => "ja",
            Self::ChineseSimplified => "zh",
            Self::French => "fr",
            Self::Spanish => "es",
            Self::Hindi => "hi",
            Self::German => "de",
            Self::Korean => "ko",
            Self::Russian => "ru",
            Self::Arabic => "ar",
        }
    }

    /// Translation locale for this language
    pub fn locale(&self) -> LocaleCode {
        Language::from_639_1(self.locale_code())
            .map(LocaleCode::Tag)
            .unwrap_or(DEFAULT_LOCALE)
    }
}

impl fmt::Display for OcrLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for OcrLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|lang| lang.code() == normalized)
            .ok_or_else(|| anyhow!("Unknown recognition language: {}", s))
    }
}

/// Writing system reported by the detection engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScriptLabel {
    Latin,
    Japanese,
    Han,
    Hangul,
    Cyrillic,
    Arabic,
    Devanagari,
    /// Anything the table does not know
    Other,
}

impl ScriptLabel {
    /// Classify a raw engine label. Never fails: unknown labels become `Other`.
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "latin" => Self::Latin,
            "japanese" | "katakana" | "hiragana" => Self::Japanese,
            "han" | "hans" | "hant" | "chinese" => Self::Han,
            "hangul" | "korean" => Self::Hangul,
            "cyrillic" => Self::Cyrillic,
            "arabic" => Self::Arabic,
            "devanagari" => Self::Devanagari,
            _ => Self::Other,
        }
    }

    /// Recognition language to use for text written in this script
    pub fn ocr_language(&self) -> OcrLanguage {
        match self {
            Self::Japanese => OcrLanguage::Japanese,
            Self::Han => OcrLanguage::ChineseSimplified,
            Self::Hangul => OcrLanguage::Korean,
            Self::Cyrillic => OcrLanguage::Russian,
            Self::Arabic => OcrLanguage::Arabic,
            Self::Devanagari => OcrLanguage::Hindi,
            Self::Latin | Self::Other => DEFAULT_OCR_LANGUAGE,
        }
    }

    /// Whether the script identifies a single language of the table
    pub fn is_language_specific(&self) -> bool {
        !matches!(self, Self::Latin | Self::Other)
    }
}

impl fmt::Display for ScriptLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Latin => "Latin",
            Self::Japanese => "Japanese",
            Self::Han => "Han",
            Self::Hangul => "Hangul",
            Self::Cyrillic => "Cyrillic",
            Self::Arabic => "Arabic",
            Self::Devanagari => "Devanagari",
            Self::Other => "Other",
        };
        f.write_str(name)
    }
}

/// Source language selection: either explicit or detected from the image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLanguage {
    Auto,
    Explicit(OcrLanguage),
}

impl SourceLanguage {
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for SourceLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auto => f.write_str(LocaleCode::AUTO),
            Self::Explicit(lang) => write!(f, "{}", lang),
        }
    }
}

impl FromStr for SourceLanguage {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case(LocaleCode::AUTO) {
            return Ok(Self::Auto);
        }
        Ok(Self::Explicit(s.parse()?))
    }
}

/// Locale code accepted by the translation service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocaleCode {
    /// Let the translation service infer the language
    Auto,
    /// A concrete ISO 639 language
    Tag(Language),
}

impl LocaleCode {
    /// Wire value of the auto-infer sentinel
    pub const AUTO: &'static str = "auto";

    /// Wire representation: ISO 639-1 when one exists, ISO 639-3 otherwise
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => Self::AUTO,
            Self::Tag(lang) => lang.to_639_1().unwrap_or_else(|| lang.to_639_3()),
        }
    }

    pub fn is_auto(&self) -> bool {
        matches!(self, Self::Auto)
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocaleCode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        if normalized == Self::AUTO {
            return Ok(Self::Auto);
        }

        let language = match normalized.len() {
            2 => Language::from_639_1(&normalized),
            3 => Language::from_639_3(part2b_to_part2t(&normalized)),
            _ => None,
        };

        language
            .map(Self::Tag)
            .ok_or_else(|| anyhow!("Invalid locale code: {}", s))
    }
}

/// Map an ISO 639-2/B code onto its ISO 639-2/T form; other codes pass through
fn part2b_to_part2t(code: &str) -> &str {
    match code {
        "fre" => "fra",
        "ger" => "deu",
        "dut" => "nld",
        "gre" => "ell",
        "chi" => "zho",
        "cze" => "ces",
        "ice" => "isl",
        "alb" => "sqi",
        "arm" => "hye",
        "baq" => "eus",
        "bur" => "mya",
        "per" => "fas",
        "geo" => "kat",
        "may" => "msa",
        "mac" => "mkd",
        "rum" => "ron",
        "slo" => "slk",
        "wel" => "cym",
        _ => code,
    }
}

/// Translation locale for a source selection; `Auto` stays the sentinel
pub fn map_to_locale(source: &SourceLanguage) -> LocaleCode {
    match source {
        SourceLanguage::Auto => LocaleCode::Auto,
        SourceLanguage::Explicit(lang) => lang.locale(),
    }
}

/// Translation locale for a raw recognition identifier.
///
/// Total: `"auto"` yields the sentinel, unknown identifiers yield
/// [`DEFAULT_LOCALE`].
pub fn map_identifier(identifier: &str) -> LocaleCode {
    match identifier.parse::<SourceLanguage>() {
        Ok(source) => map_to_locale(&source),
        Err(_) => DEFAULT_LOCALE,
    }
}

/// Recognition hint for an optional detection result
pub fn extraction_hint(script: Option<ScriptLabel>) -> OcrLanguage {
    script
        .map(|label| label.ocr_language())
        .unwrap_or(DEFAULT_OCR_LANGUAGE)
}

/// Source locale to send along with the extracted text.
///
/// Under auto-detection only a language-specific script resolves to a
/// concrete locale; Latin, unclassified or missing detections send the
/// auto-infer sentinel.
pub fn translation_source(source: &SourceLanguage, detected: Option<ScriptLabel>) -> LocaleCode {
    match (source, detected) {
        (SourceLanguage::Explicit(lang), _) => lang.locale(),
        (SourceLanguage::Auto, Some(script)) if script.is_language_specific() => {
            script.ocr_language().locale()
        }
        (SourceLanguage::Auto, _) => LocaleCode::Auto,
    }
}

/// Get the English language name for a locale or recognition code
pub fn get_language_name(code: &str) -> Result<String> {
    let locale = match code.parse::<OcrLanguage>() {
        Ok(lang) => lang.locale(),
        Err(_) => code.parse::<LocaleCode>()?,
    };

    match locale {
        LocaleCode::Auto => Ok("Auto-detect".to_string()),
        LocaleCode::Tag(lang) => Ok(lang.to_name().to_string()),
    }
}
