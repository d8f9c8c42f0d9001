//! Symbology detection, payload normalization and bar encoding.
//!
//! This module decides *which* linear barcode a piece of text should become and shapes the
//! text into a payload that symbology accepts. The module patterns and check digits are
//! produced by [`barcoders`]; nothing here computes bar widths by hand.
//!
//! The flow is always the same:
//!
//! 1. [`detect`] classifies raw input (or the caller picks a [`Symbology`] explicitly).
//! 2. [`normalize`] trims, pads or validates the input for that symbology.
//! 3. [`encode`] turns the payload into [`Bars`], ready for the [`render`](crate::render) module.
//!
//! # Example
//!
//! ```rust
//! use barust::symbology::{detect, encode, normalize, Symbology};
//!
//! let symbology = detect("5901234123457");
//! assert_eq!(symbology, Symbology::Ean13);
//!
//! let payload = normalize("5901234123457", symbology).unwrap();
//! assert_eq!(payload, "590123412345");
//!
//! let bars = encode(symbology, &payload).unwrap();
//! assert_eq!(bars.len(), 95);
//! ```
use core::fmt;
use core::str::FromStr;

use barcoders::sym::code128::Code128;
use barcoders::sym::code39::Code39;
use barcoders::sym::ean13::EAN13;
use barcoders::sym::ean8::EAN8;

use crate::error::{BarcodeError, Result};

/// Characters Code 39 can carry once the payload is upper-cased.
const CODE39_CHARSET: &str = "0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ-. $/+%";

/// Characters that force Code 128 even when the text is otherwise upper-case.
const CODE128_MARKERS: [char; 4] = ['@', '#', '$', '%'];

/// Character-set B selector understood by the Code 128 encoder.
const CODE128_SET_B: char = '\u{0181}';

/// A linear barcode symbology supported by barust.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Symbology {
    /// Code 128, full printable ASCII.
    Code128,
    /// Code 39, upper-case alphanumerics plus `-. $/+%`.
    Code39,
    /// EAN-13, 12 data digits plus a computed check digit.
    Ean13,
    /// EAN-8, 7 data digits plus a computed check digit.
    Ean8,
    /// UPC-A, 11 data digits plus a computed check digit.
    UpcA,
}

impl Symbology {
    /// Every supported symbology, in menu order.
    pub const ALL: [Symbology; 5] = [
        Symbology::Code128,
        Symbology::Code39,
        Symbology::Ean13,
        Symbology::Ean8,
        Symbology::UpcA,
    ];

    /// The short lowercase identifier used in file names and on the command line.
    pub const fn id(self) -> &'static str {
        match self {
            Symbology::Code128 => "code128",
            Symbology::Code39 => "code39",
            Symbology::Ean13 => "ean13",
            Symbology::Ean8 => "ean8",
            Symbology::UpcA => "upc",
        }
    }

    /// Number of data digits for the numeric symbologies, without the check digit.
    ///
    /// Returns `None` for the alphanumeric symbologies.
    pub const fn payload_digits(self) -> Option<usize> {
        match self {
            Symbology::Ean13 => Some(12),
            Symbology::Ean8 => Some(7),
            Symbology::UpcA => Some(11),
            Symbology::Code128 | Symbology::Code39 => None,
        }
    }
}

impl fmt::Display for Symbology {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Symbology {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase();
        Symbology::ALL
            .into_iter()
            .find(|sym| sym.id() == wanted)
            .ok_or_else(|| BarcodeError::UnsupportedType(s.trim().to_string()))
    }
}

/// The code type a caller asks for: a fixed symbology, or detection from the data.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum CodeType {
    /// Pick the symbology with [`detect`].
    #[default]
    Auto,
    /// Always use the given symbology.
    Fixed(Symbology),
}

impl CodeType {
    /// Resolves `Auto` against `data`; a fixed symbology is returned as-is.
    pub fn resolve(self, data: &str) -> Symbology {
        match self {
            CodeType::Auto => detect(data),
            CodeType::Fixed(sym) => sym,
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CodeType::Auto => f.write_str("auto"),
            CodeType::Fixed(sym) => fmt::Display::fmt(sym, f),
        }
    }
}

impl FromStr for CodeType {
    type Err = BarcodeError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("auto") {
            return Ok(CodeType::Auto);
        }
        s.parse().map(CodeType::Fixed)
    }
}

/// The encoded modules of a barcode, one entry per module (`1` = bar, `0` = space).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Bars {
    symbology: Symbology,
    payload: String,
    modules: Vec<u8>,
}

impl Bars {
    pub fn symbology(&self) -> Symbology {
        self.symbology
    }

    /// The normalized payload the modules were produced from.
    pub fn payload(&self) -> &str {
        &self.payload
    }

    pub fn modules(&self) -> &[u8] {
        &self.modules
    }

    /// Number of modules, quiet zones excluded.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Returns `true` if module `index` is a bar. Out-of-range indices are spaces.
    pub fn is_bar(&self, index: usize) -> bool {
        self.modules.get(index).is_some_and(|&m| m == 1)
    }
}

/// Picks the most suitable symbology for `data`.
///
/// Spaces are ignored. Pure digit strings of length 13, 8 and 12 map to EAN-13, EAN-8 and
/// UPC-A respectively; other digit strings go to Code 128. Text that is entirely upper-case
/// (and free of `@#$%`) goes to Code 39; everything else goes to Code 128.
///
/// # Example
///
/// ```rust
/// use barust::symbology::{detect, Symbology};
///
/// assert_eq!(detect("12345678"), Symbology::Ean8);
/// assert_eq!(detect("PRODUCT-ABC"), Symbology::Code39);
/// assert_eq!(detect("Hello World 2025"), Symbology::Code128);
/// ```
pub fn detect(data: &str) -> Symbology {
    let clean: String = data.chars().filter(|&c| c != ' ').collect();

    if !clean.is_empty() && clean.chars().all(|c| c.is_ascii_digit()) {
        return match clean.len() {
            13 => Symbology::Ean13,
            8 => Symbology::Ean8,
            12 => Symbology::UpcA,
            _ => Symbology::Code128,
        };
    }

    if !is_upper(&clean) || clean.contains(&CODE128_MARKERS[..]) {
        Symbology::Code128
    } else {
        Symbology::Code39
    }
}

/// At least one cased character and no lower-case ones.
fn is_upper(text: &str) -> bool {
    let mut cased = false;
    for c in text.chars() {
        if c.is_lowercase() {
            return false;
        }
        cased |= c.is_uppercase();
    }
    cased
}

/// Prepares `data` as a payload for `symbology`.
///
/// Numeric symbologies keep only the digits of the input, left-padded with zeros or cut to
/// the payload width. Code 39 upper-cases the input and rejects characters outside its set;
/// Code 128 rejects anything that is not printable ASCII.
///
/// # Errors
///
/// [`BarcodeError::EmptyData`] when `data` is blank, and
/// [`BarcodeError::InvalidCharacters`] when the symbology cannot carry the text.
pub fn normalize(data: &str, symbology: Symbology) -> Result<String> {
    let trimmed = data.trim();
    if trimmed.is_empty() {
        return Err(BarcodeError::EmptyData);
    }

    if let Some(width) = symbology.payload_digits() {
        let digits: String = trimmed.chars().filter(|c| c.is_ascii_digit()).collect();
        return Ok(fit_digits(&digits, width));
    }

    match symbology {
        Symbology::Code39 => {
            let upper = trimmed.to_uppercase();
            if upper.chars().all(|c| CODE39_CHARSET.contains(c)) {
                Ok(upper)
            } else {
                Err(BarcodeError::InvalidCharacters {
                    symbology: symbology.id(),
                    data: trimmed.to_string(),
                })
            }
        }
        _ => {
            if trimmed.chars().all(|c| (' '..='~').contains(&c)) {
                Ok(trimmed.to_string())
            } else {
                Err(BarcodeError::InvalidCharacters {
                    symbology: symbology.id(),
                    data: trimmed.to_string(),
                })
            }
        }
    }
}

fn fit_digits(digits: &str, width: usize) -> String {
    if digits.len() >= width {
        digits[..width].to_string()
    } else {
        format!("{:0>width$}", digits, width = width)
    }
}

/// Encodes an already normalized payload into bars.
///
/// UPC-A is emitted as the equivalent EAN-13 symbol with a leading zero, and Code 128 always
/// uses character set B.
///
/// # Errors
///
/// Returns [`BarcodeError::Encode`] when the encoder rejects the payload.
pub fn encode(symbology: Symbology, payload: &str) -> Result<Bars> {
    let modules = match symbology {
        Symbology::Ean13 => EAN13::new(payload).map(|b| b.encode()),
        Symbology::UpcA => EAN13::new(format!("0{}", payload).as_str()).map(|b| b.encode()),
        Symbology::Ean8 => EAN8::new(payload).map(|b| b.encode()),
        Symbology::Code39 => Code39::new(payload).map(|b| b.encode()),
        Symbology::Code128 => {
            Code128::new(format!("{}{}", CODE128_SET_B, payload).as_str()).map(|b| b.encode())
        }
    }
    .map_err(|e| BarcodeError::Encode(format!("{} {:?}: {}", symbology, payload, e)))?;

    Ok(Bars {
        symbology,
        payload: payload.to_string(),
        modules,
    })
}

/// Detects (if needed), normalizes and encodes in one step.
pub fn prepare(data: &str, code_type: CodeType) -> Result<Bars> {
    let symbology = code_type.resolve(data);
    let payload = normalize(data, symbology)?;
    tracing::debug!(%symbology, %payload, "normalized barcode payload");
    encode(symbology, &payload)
}

/// Validates `data` for its detected symbology, then encodes the payload as Code 128.
///
/// Code 128 renders any normalized payload, so this gives a uniform look for display.
pub fn prepare_clean(data: &str) -> Result<Bars> {
    let detected = detect(data);
    let payload = normalize(data, detected)?;
    tracing::debug!(%detected, %payload, "normalized payload for clean rendering");
    encode(Symbology::Code128, &payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_numeric_lengths() {
        assert_eq!(detect("5901234123457"), Symbology::Ean13);
        assert_eq!(detect("12345678"), Symbology::Ean8);
        assert_eq!(detect("036000291452"), Symbology::UpcA);
        assert_eq!(detect("123456789"), Symbology::Code128);
    }

    #[test]
    fn test_detect_ignores_spaces() {
        assert_eq!(detect("1234 5678"), Symbology::Ean8);
        assert_eq!(detect(" 590 1234 123457 "), Symbology::Ean13);
    }

    #[test]
    fn test_detect_text() {
        assert_eq!(detect("PRODUCT-ABC"), Symbology::Code39);
        assert_eq!(detect("Hello World 2025"), Symbology::Code128);
        assert_eq!(detect("ABC#1"), Symbology::Code128);
        assert_eq!(detect("PRICE$5"), Symbology::Code128);
        // No cased character at all.
        assert_eq!(detect("123-456"), Symbology::Code128);
        assert_eq!(detect(""), Symbology::Code128);
    }

    #[test]
    fn test_normalize_pads_and_truncates() {
        assert_eq!(normalize("123", Symbology::Ean13).unwrap(), "000000000123");
        assert_eq!(normalize("5901234123457", Symbology::Ean13).unwrap(), "590123412345");
        assert_eq!(normalize("1234-5678", Symbology::Ean8).unwrap(), "1234567");
        assert_eq!(normalize("036000291452", Symbology::UpcA).unwrap(), "03600029145");
        assert_eq!(normalize("abc", Symbology::Ean8).unwrap(), "0000000");
    }

    #[test]
    fn test_normalize_code39() {
        assert_eq!(normalize("  product-abc ", Symbology::Code39).unwrap(), "PRODUCT-ABC");
        assert!(matches!(
            normalize("ABC!", Symbology::Code39),
            Err(BarcodeError::InvalidCharacters { symbology: "code39", .. })
        ));
    }

    #[test]
    fn test_normalize_code128() {
        assert_eq!(normalize("Hello World", Symbology::Code128).unwrap(), "Hello World");
        assert!(normalize("café", Symbology::Code128).is_err());
    }

    #[test]
    fn test_normalize_empty() {
        assert!(matches!(normalize("   ", Symbology::Code128), Err(BarcodeError::EmptyData)));
    }

    #[test]
    fn test_parse_code_type() {
        assert_eq!("auto".parse::<CodeType>().unwrap(), CodeType::Auto);
        assert_eq!(" EAN13 ".parse::<CodeType>().unwrap(), CodeType::Fixed(Symbology::Ean13));
        assert_eq!("upc".parse::<CodeType>().unwrap(), CodeType::Fixed(Symbology::UpcA));
        assert!(matches!("qr".parse::<CodeType>(), Err(BarcodeError::UnsupportedType(t)) if t == "qr"));
    }

    #[test]
    fn test_encode_ean_family() {
        let ean13 = encode(Symbology::Ean13, "590123412345").unwrap();
        assert_eq!(ean13.len(), 95);
        assert_eq!(&ean13.modules()[..3], &[1, 0, 1]);

        let ean8 = encode(Symbology::Ean8, "1234567").unwrap();
        assert_eq!(ean8.len(), 67);

        let upc = encode(Symbology::UpcA, "03600029145").unwrap();
        assert_eq!(upc.len(), 95);
        assert_eq!(upc.payload(), "03600029145");
    }

    #[test]
    fn test_encode_alphanumeric() {
        let code39 = encode(Symbology::Code39, "PRODUCT-ABC").unwrap();
        assert!(!code39.is_empty());
        assert!(code39.is_bar(0));

        let code128 = encode(Symbology::Code128, "Hello World 2025").unwrap();
        assert!(!code128.is_empty());
        assert!(code128.is_bar(0));
        assert!(!code128.is_bar(code128.len()));
    }

    #[test]
    fn test_prepare_auto() {
        let bars = prepare("5901234123457", CodeType::Auto).unwrap();
        assert_eq!(bars.symbology(), Symbology::Ean13);
        assert_eq!(bars.payload(), "590123412345");
    }
}
