// src/core/tokens.rs
// Streaming tokenizer for HTML fragments.
// Walks the byte slice once; quotes are honoured inside tags, comments and
// doctypes are skipped, entities are surfaced as their own token.

use super::html::decode_entities;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    Start { name: String, attrs: Vec<(String, String)> },
    SelfClosing { name: String, attrs: Vec<(String, String)> },
    End(String),
    Text(&'a str),
    /// Entity body without `&` and `;` (e.g. `nbsp`, `#228`, `#x2F`).
    Entity(&'a str),
}

impl Token<'_> {
    /// Attribute value on a start or self-closing tag. Names are lowercase.
    pub fn attr(&self, key: &str) -> Option<&str> {
        match self {
            Token::Start { attrs, .. } | Token::SelfClosing { attrs, .. } => attrs
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    pub fn is_start(&self, tag: &str) -> bool {
        matches!(self, Token::Start { name, .. } if name == tag)
    }

    pub fn is_end(&self, tag: &str) -> bool {
        matches!(self, Token::End(name) if name == tag)
    }
}

pub struct Tokens<'a> {
    s: &'a str,
    b: &'a [u8],
    i: usize,
    n: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, b: s.as_bytes(), i: 0, n: s.len() }
    }

    #[inline]
    fn starts_with(&self, pat: &[u8]) -> bool {
        self.b[self.i..].starts_with(pat)
    }

    /// Skip past `end`, or to EOF if it never shows up.
    fn skip_past(&mut self, end: &str) {
        match self.s[self.i..].find(end) {
            Some(off) => self.i += off + end.len(),
            None => self.i = self.n,
        }
    }

    // called when current byte is '<' and the next byte opens a tag
    fn tag(&mut self) -> Option<Token<'a>> {
        if self.starts_with(b"<!--") {
            self.skip_past("-->");
            return None;
        }
        if self.starts_with(b"<!") || self.starts_with(b"<?") {
            self.skip_past(">");
            return None;
        }

        let open = self.i + 1;
        let mut j = open;
        let mut in_s = false; // '
        let mut in_d = false; // "
        while j < self.n {
            match self.b[j] {
                b'\'' if !in_d => in_s = !in_s,
                b'"' if !in_s => in_d = !in_d,
                b'>' if !in_s && !in_d => break,
                _ => {}
            }
            j += 1;
        }
        let inner = &self.s[open..j];
        self.i = (j + 1).min(self.n);

        if let Some(rest) = inner.strip_prefix('/') {
            return Some(Token::End(tag_name(rest)));
        }

        let trimmed = inner.trim_end();
        let (body, self_closing) = match trimmed.strip_suffix('/') {
            Some(b) => (b, true),
            None => (trimmed, false),
        };
        let name = tag_name(body);
        let attrs = parse_attrs(&body[body.find(char::is_whitespace).unwrap_or(body.len())..]);

        Some(if self_closing {
            Token::SelfClosing { name, attrs }
        } else {
            Token::Start { name, attrs }
        })
    }

    // called when current byte is '&'
    fn entity(&mut self) -> Token<'a> {
        let start = self.i + 1;
        let mut j = start;
        while j < self.n && j - start < 32 {
            match self.b[j] {
                b';' if j > start => {
                    self.i = j + 1;
                    return Token::Entity(&self.s[start..j]);
                }
                c if c.is_ascii_alphanumeric() || c == b'#' => j += 1,
                _ => break,
            }
        }
        // bare ampersand
        self.i += 1;
        Token::Text(&self.s[start - 1..start])
    }

    fn text(&mut self) -> Token<'a> {
        let start = self.i;
        self.i += 1;
        while self.i < self.n && !matches!(self.b[self.i], b'<' | b'&') {
            self.i += 1;
        }
        Token::Text(&self.s[start..self.i])
    }

    fn opens_tag(&self) -> bool {
        match self.b.get(self.i + 1) {
            Some(c) => c.is_ascii_alphabetic() || matches!(c, b'/' | b'!' | b'?'),
            None => false,
        }
    }
}

impl<'a> Iterator for Tokens<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.i < self.n {
            match self.b[self.i] {
                b'<' if self.opens_tag() => {
                    if let Some(tok) = self.tag() {
                        return Some(tok);
                    }
                }
                b'&' => return Some(self.entity()),
                _ => return Some(self.text()),
            }
        }
        None
    }
}

fn tag_name(s: &str) -> String {
    s.trim_start()
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase()
}

/// `data-label="Datum/Uhrzeit" class=x checked` → lowercase names, decoded values.
fn parse_attrs(s: &str) -> Vec<(String, String)> {
    let b = s.as_bytes();
    let n = b.len();
    let mut i = 0usize;
    let mut out = Vec::new();

    while i < n {
        while i < n && b[i].is_ascii_whitespace() { i += 1; }
        if i >= n { break; }

        let ns = i;
        while i < n && !b[i].is_ascii_whitespace() && b[i] != b'=' { i += 1; }
        let name = s[ns..i].to_ascii_lowercase();

        while i < n && b[i].is_ascii_whitespace() { i += 1; }
        if i >= n || b[i] != b'=' {
            if !name.is_empty() { out.push((name, s!())); }
            continue;
        }
        i += 1; // '='
        while i < n && b[i].is_ascii_whitespace() { i += 1; }

        let value = match b.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                let vs = i + 1;
                let ve = s[vs..].find(q as char).map(|o| vs + o).unwrap_or(n);
                i = (ve + 1).min(n);
                &s[vs..ve]
            }
            _ => {
                let vs = i;
                while i < n && !b[i].is_ascii_whitespace() { i += 1; }
                &s[vs..i]
            }
        };
        if !name.is_empty() {
            out.push((name, decode_entities(value)));
        }
    }
    out
}
