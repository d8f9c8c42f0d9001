//! Property tests for detection and payload normalization.

use barust::symbology::{detect, encode, normalize, Symbology};
use proptest::prelude::*;

const NUMERIC: [Symbology; 3] = [Symbology::Ean13, Symbology::Ean8, Symbology::UpcA];

proptest! {
    #[test]
    fn numeric_payloads_have_exact_width(data in "[0-9a-z -]{1,30}", idx in 0usize..3) {
        let sym = NUMERIC[idx];
        prop_assume!(!data.trim().is_empty());

        let payload = normalize(&data, sym).unwrap();
        prop_assert_eq!(Some(payload.len()), sym.payload_digits());
        prop_assert!(payload.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn normalize_is_idempotent(data in "[ -~]{1,40}") {
        prop_assume!(!data.trim().is_empty());
        let sym = detect(&data);
        if let Ok(once) = normalize(&data, sym) {
            let twice = normalize(&once, sym).unwrap();
            prop_assert_eq!(once, twice);
        }
    }

    #[test]
    fn digit_strings_detect_by_length(digits in "[0-9]{1,20}") {
        let expected = match digits.len() {
            13 => Symbology::Ean13,
            8 => Symbology::Ean8,
            12 => Symbology::UpcA,
            _ => Symbology::Code128,
        };
        prop_assert_eq!(detect(&digits), expected);
    }

    #[test]
    fn normalized_numeric_payloads_encode(digits in "[0-9]{0,15}", idx in 0usize..3) {
        let sym = NUMERIC[idx];
        let data = format!("#{}", digits);
        let payload = normalize(&data, sym).unwrap();
        let bars = encode(sym, &payload).unwrap();
        prop_assert!(!bars.is_empty());
    }
}
