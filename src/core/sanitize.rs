// src/core/sanitize.rs

pub fn normalize_ws(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_space = false;
    for ch in s.chars() {
        if ch.is_whitespace() {
            if !prev_space { out.push(' '); prev_space = true; }
        } else { out.push(ch); prev_space = false; }
    }
    out.trim().to_string()
}

/// Heading text as a lookup key: `" Telefon: "` → `"telefon"`.
pub fn label_key(s: &str) -> String {
    normalize_ws(s)
        .trim_end_matches(':')
        .trim_end()
        .to_lowercase()
}

/// `None` for empty/whitespace-only text, normalized text otherwise.
pub fn non_empty(s: &str) -> Option<String> {
    let t = normalize_ws(s);
    if t.is_empty() { None } else { Some(t) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_whitespace() {
        assert_eq!(normalize_ws("  a \n\t b  "), "a b");
    }

    #[test]
    fn label_keys() {
        assert_eq!(label_key(" E-Mail : "), "e-mail");
        assert_eq!(non_empty("  "), None);
    }
}
