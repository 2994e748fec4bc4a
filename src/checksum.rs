// src/checksum.rs
//! Weighted mod-10 check digits.
//!
//! Every numeric tracking-number format is a row of data ([`CheckFormat`]):
//! the accepted lengths, the cyclic weight pair and an optional offset added
//! before the mod-10 reduction. Weights are applied from the left, the first
//! digit taking `w1`, the second `w2`, and so on.

/// How a format relates the check digit to the rest of the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// The last digit checks every digit before it.
    SelfCheck,
    /// Same arithmetic, but the bare body (without check digit) is also
    /// accepted and the digit gets appended.
    Derive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckFormat {
    pub name: &'static str,
    /// Full lengths, check digit included.
    pub lengths: &'static [usize],
    pub weights: (u32, u32),
    pub offset: u32,
    pub coverage: Coverage,
}

pub const DHL_12: CheckFormat = CheckFormat {
    name: "DHL 12-digit",
    lengths: &[12],
    weights: (4, 9),
    offset: 0,
    coverage: Coverage::SelfCheck,
};

pub const DHL_20: CheckFormat = CheckFormat {
    name: "DHL 20-digit",
    lengths: &[20],
    weights: (3, 1),
    offset: 0,
    coverage: Coverage::SelfCheck,
};

pub const HERMES_14: CheckFormat = CheckFormat {
    name: "Hermes 14-digit",
    lengths: &[14],
    weights: (3, 1),
    offset: 0,
    coverage: Coverage::SelfCheck,
};

pub const POST_AT: CheckFormat = CheckFormat {
    name: "Post.AT 16/22-digit",
    lengths: &[16, 22],
    weights: (3, 1),
    offset: 0,
    coverage: Coverage::SelfCheck,
};

pub const GLS_12: CheckFormat = CheckFormat {
    name: "GLS 11+1-digit",
    lengths: &[12],
    weights: (3, 1),
    offset: 1,
    coverage: Coverage::Derive,
};

pub const FORMATS: &[CheckFormat] = &[DHL_12, DHL_20, HERMES_14, POST_AT, GLS_12];

/// ASCII digits to values; `None` on anything else (or empty input).
pub fn digits(s: &str) -> Option<Vec<u8>> {
    if s.is_empty() {
        return None;
    }
    s.bytes()
        .map(|b| b.is_ascii_digit().then(|| b - b'0'))
        .collect()
}

pub fn compute_check_digit(digits: &[u8], weights: (u32, u32)) -> u8 {
    compute_with_offset(digits, weights, 0)
}

pub fn compute_with_offset(digits: &[u8], weights: (u32, u32), offset: u32) -> u8 {
    let sum: u32 = digits
        .iter()
        .zip([weights.0, weights.1].into_iter().cycle())
        .map(|(&d, w)| d as u32 * w)
        .sum();
    ((10 - (sum + offset) % 10) % 10) as u8
}

impl CheckFormat {
    pub fn check_digit(&self, body: &[u8]) -> u8 {
        compute_with_offset(body, self.weights, self.offset)
    }

    /// `true` when `number` has an accepted length and its last digit checks.
    pub fn validate(&self, number: &str) -> bool {
        if !self.lengths.contains(&number.len()) {
            return false;
        }
        match digits(number) {
            Some(ds) => {
                let (body, last) = ds.split_at(ds.len() - 1);
                self.check_digit(body) == last[0]
            }
            None => false,
        }
    }

    /// Append the check digit to a bare body of the right length.
    pub fn complete(&self, body: &str) -> Option<String> {
        if !self.lengths.contains(&(body.len() + 1)) {
            return None;
        }
        let ds = digits(body)?;
        Some(format!("{}{}", body, self.check_digit(&ds)))
    }

    /// Normalized full number if `input` satisfies this format.
    pub fn accept(&self, input: &str) -> Option<String> {
        if self.validate(input) {
            return Some(s!(input));
        }
        match self.coverage {
            Coverage::Derive => self.complete(input),
            Coverage::SelfCheck => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_maps_to_zero() {
        // 5*3 + 5*1 = 20 → 0 → 10 → 0
        assert_eq!(compute_check_digit(&[5, 5], (3, 1)), 0);
    }

    #[test]
    fn dhl_12_digit() {
        assert!(DHL_12.validate("123456789016"));
        assert!(!DHL_12.validate("123456789017"));
        assert!(!DHL_12.validate("123456789012"));
        assert!(!DHL_12.validate("12345678901"));
        assert!(!DHL_12.validate("12345678901x"));
    }

    #[test]
    fn gls_offset_and_derive() {
        assert_eq!(GLS_12.complete("12345678901").as_deref(), Some("123456789011"));
        assert_eq!(GLS_12.accept("12345678901").as_deref(), Some("123456789011"));
        assert_eq!(GLS_12.accept("123456789011").as_deref(), Some("123456789011"));
        assert_eq!(GLS_12.accept("123456789012"), None);
    }

    #[test]
    fn self_check_formats_do_not_derive() {
        assert_eq!(HERMES_14.accept("1234567890123"), None);
        assert_eq!(HERMES_14.accept("12345678901231").as_deref(), Some("12345678901231"));
    }

    #[test]
    fn post_at_lengths() {
        assert!(POST_AT.validate("1234012345678907"));
        let long = POST_AT.complete("123456789012345678901").unwrap();
        assert_eq!(long.len(), 22);
        assert!(POST_AT.validate(&long));
    }
}
