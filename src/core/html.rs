// src/core/html.rs
pub fn to_lower(s: &str) -> String {
    s.chars()
        .map(|c| {
            if c.is_ascii() {
                c.to_ascii_lowercase()
            } else {
                c
            }
        })
        .collect()
}

/// Inner HTML between the first `open_pat` (matched case-insensitively, up to
/// its closing `>`) and the next `close_pat`.
pub fn slice_between_ci<'a>(s: &'a str, open_pat: &str, close_pat: &str) -> Option<&'a str> {
    let lc = to_lower(s);
    let open = to_lower(open_pat);
    let close = to_lower(close_pat);
    let o = lc.find(&open)?;
    let after = s[o..].find('>')? + o + 1;
    let cr = lc[after..].find(&close)?;
    Some(&s[after..after + cr])
}

/// Decode one entity body (`nbsp`, `#228`, `#xE4`). Unknown names yield `None`.
pub fn decode_entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        return char::from_u32(code);
    }
    let ch = match name {
        "nbsp" => ' ',
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "szlig" => 'ß',
        "eacute" => 'é',
        "ndash" => '–',
        _ => return None,
    };
    Some(ch)
}

/// Decode every `&…;` reference in `s`; unknown references are kept verbatim.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s!(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        match tail.find(';').filter(|&semi| semi > 0 && semi <= 32) {
            Some(semi) => match decode_entity(&tail[..semi]) {
                Some(ch) => {
                    out.push(ch);
                    rest = &tail[semi + 1..];
                }
                None => {
                    out.push('&');
                    rest = tail;
                }
            },
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slices_case_insensitively() {
        let doc = r#"<p>x</p><TABLE class="mm_event_table"><tbody></tbody></Table>"#;
        let inner = slice_between_ci(doc, r#"<table class="mm_event_table""#, "</table>");
        assert_eq!(inner, Some("<tbody></tbody>"));
    }

    #[test]
    fn decodes_named_and_numeric() {
        assert_eq!(decode_entities("Stra&szlig;e &amp; Co &#228;&#x2F;"), "Straße & Co ä/");
        assert_eq!(decode_entities("a &bogus; b & c"), "a &bogus; b & c");
    }
}
