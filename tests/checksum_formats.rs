// tests/checksum_formats.rs
use parcelwatch::checksum::{compute_check_digit, CheckFormat, DHL_12, DHL_20, FORMATS, GLS_12, HERMES_14, POST_AT};
use parcelwatch::{from_barcode, Carrier};

fn flip_last(n: &str) -> String {
    let (body, last) = n.split_at(n.len() - 1);
    let d = last.parse::<u8>().unwrap();
    format!("{}{}", body, (d + 1) % 10)
}

#[test]
fn known_good_numbers() {
    let cases: &[(CheckFormat, &str)] = &[
        (DHL_12, "123456789016"),
        (HERMES_14, "12345678901231"),
        (POST_AT, "1234012345678907"),
        (GLS_12, "123456789011"),
    ];
    for (format, number) in cases {
        assert!(format.validate(number), "{} {}", format.name, number);
        assert!(!format.validate(&flip_last(number)), "{} flipped", format.name);
    }
}

#[test]
fn appended_digit_round_trips_for_every_format() {
    for format in FORMATS {
        for &len in format.lengths {
            let body: String = "31415926535897932384626"[..len - 1].to_string();
            let full = format.complete(&body).unwrap();
            assert!(format.validate(&full), "{} {}", format.name, full);
            assert_eq!(format.complete(&body), Some(full), "deterministic");
        }
    }
}

#[test]
fn twenty_digit_dhl_is_self_consistent() {
    let body = "0034012345678901234";
    let digits: Vec<u8> = body.bytes().map(|b| b - b'0').collect();
    let full = format!("{}{}", body, compute_check_digit(&digits, DHL_20.weights));
    assert!(DHL_20.validate(&full));
}

#[test]
fn lengths_and_non_digits_are_rejected() {
    for format in FORMATS {
        assert!(!format.validate(""), "{}", format.name);
        assert!(!format.validate("12345"), "{}", format.name);
        assert!(!format.validate("12345678901a"), "{}", format.name);
    }
}

#[test]
fn gls_body_gets_its_digit() {
    assert_eq!(GLS_12.accept("12345678901").as_deref(), Some("123456789011"));
    assert_eq!(GLS_12.complete("1234567890"), None);
}

#[test]
fn barcode_detection_order() {
    let cases: &[(&str, Carrier)] = &[
        ("123456789016", Carrier::Dhl),
        ("JJD1234567890123", Carrier::Dhl),
        ("%001234501234567890123101276", Carrier::Dpd),
        ("12345678901", Carrier::Gls),
        ("12345678901231", Carrier::Hermes),
        ("1234012345678907", Carrier::PostAt),
    ];
    for (barcode, carrier) in cases {
        let (found, _) = from_barcode(barcode).unwrap_or_else(|| panic!("{} not recognized", barcode));
        assert_eq!(found, *carrier, "{}", barcode);
    }
    assert!(from_barcode("hello").is_none());
    assert!(from_barcode("").is_none());
}
