use std::borrow::Cow;

use serde_derive::{Deserialize, Serialize};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

// Certain browsers limit URL length to 2083 bytes. A valid robots.txt line
// is never going to be more than a few times that, so bytes past this cap
// are silently dropped from the line.
const MAX_LINE_LEN: usize = 2083 * 8;

/// Handler for directives found in a robots.txt body. The callbacks are
/// invoked by [`Parser`] in the sequence the directives appear in the file,
/// bracketed by `on_robots_start` and `on_robots_end`. Line numbers are
/// 1-based.
///
/// Every callback has a no-op default, so a handler that only cares about
/// one kind of directive stays a one-method impl.
pub trait ParseHandler {
    fn on_robots_start(&mut self) {}
    fn on_robots_end(&mut self) {}
    fn on_user_agent(&mut self, _line: u32, _value: &str) {}
    fn on_allow(&mut self, _line: u32, _value: &str) {}
    fn on_disallow(&mut self, _line: u32, _value: &str) {}
    fn on_sitemap(&mut self, _line: u32, _value: &str) {}
    fn on_unknown(&mut self, _line: u32, _key: &str, _value: &str) {}
}

/// Parser configuration. Kept as plain serializable data so crawlers can
/// carry it inside their own persisted configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Accept frequent misspellings of directive keys, such as `disalow`
    /// for `disallow`.
    pub allow_frequent_typos: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            allow_frequent_typos: true,
        }
    }
}

/// The recognised directive keys. Anything else is `Unknown`; the original
/// key text travels alongside the event instead of inside the variant so
/// the common variants stay plain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Key {
    UserAgent,
    Allow,
    Disallow,
    Sitemap,
    Unknown,
}

impl Key {
    /// Classifies a key by case-insensitive prefix, including common typos
    /// when the options ask for them.
    fn classify(key: &[u8], options: ParseOptions) -> Key {
        const UA_TYPOS: &[&[u8]] = &[b"useragent", b"user agent"];
        const DISALLOW_TYPOS: &[&[u8]] =
            &[b"dissallow", b"dissalow", b"disalow", b"diasllow", b"disallaw"];

        let typo = |candidates: &[&[u8]]| {
            options.allow_frequent_typos
                && candidates
                    .iter()
                    .any(|candidate| starts_with_ignore_case(key, candidate))
        };

        if starts_with_ignore_case(key, b"user-agent") || typo(UA_TYPOS) {
            Key::UserAgent
        } else if starts_with_ignore_case(key, b"allow") {
            Key::Allow
        } else if starts_with_ignore_case(key, b"disallow") || typo(DISALLOW_TYPOS) {
            Key::Disallow
        } else if starts_with_ignore_case(key, b"sitemap")
            || starts_with_ignore_case(key, b"site-map")
        {
            Key::Sitemap
        } else {
            Key::Unknown
        }
    }

    /// User-agent and sitemap values are emitted verbatim; everything else
    /// is a path pattern and goes through [`escape_pattern`] first.
    fn needs_escaping(self) -> bool {
        !matches!(self, Key::UserAgent | Key::Sitemap)
    }
}

fn starts_with_ignore_case(text: &[u8], prefix: &[u8]) -> bool {
    text.len() >= prefix.len() && text[..prefix.len()].eq_ignore_ascii_case(prefix)
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

/// Canonicalizes an allow/disallow path pattern: octets outside the ASCII
/// range are percent-encoded and existing `%xy` escapes have their hex
/// digits upper-cased. For example:
///
/// ```text
/// /SanJoséSellers ==> /SanJos%C3%A9Sellers
/// %aa ==> %AA
/// ```
///
/// The pattern is scanned first; when no rewrite is needed (the common
/// case) the input is returned as-is without allocating.
pub fn escape_pattern(pattern: &[u8]) -> Cow<'_, str> {
    let at = |i: usize| if i < pattern.len() { pattern[i] } else { 0 };

    let mut need_capitalize = false;
    let mut num_to_escape = 0;
    for i in 0..pattern.len() {
        if pattern[i] == b'%' && at(i + 1).is_ascii_hexdigit() && at(i + 2).is_ascii_hexdigit() {
            if at(i + 1).is_ascii_lowercase() || at(i + 2).is_ascii_lowercase() {
                need_capitalize = true;
            }
        } else if pattern[i] >= 0x80 {
            num_to_escape += 1;
        }
    }

    if num_to_escape == 0 && !need_capitalize {
        // No octets above 0x7F, so the pattern is plain ASCII and borrows.
        return String::from_utf8_lossy(pattern);
    }

    let mut dst = String::with_capacity(pattern.len() + num_to_escape * 2);
    let mut i = 0;
    while i < pattern.len() {
        let byte = pattern[i];
        if byte == b'%' && at(i + 1).is_ascii_hexdigit() && at(i + 2).is_ascii_hexdigit() {
            dst.push('%');
            dst.push(at(i + 1).to_ascii_uppercase() as char);
            dst.push(at(i + 2).to_ascii_uppercase() as char);
            i += 3;
        } else if byte >= 0x80 {
            dst.push('%');
            dst.push(HEX_DIGITS[(byte >> 4) as usize] as char);
            dst.push(HEX_DIGITS[(byte & 0xF) as usize] as char);
            i += 1;
        } else {
            dst.push(byte as char);
            i += 1;
        }
    }
    Cow::Owned(dst)
}

/// A raw line split on its separator. Blank and comment-only lines carry
/// nothing; lines whose separator cannot be recovered are malformed but
/// still surface to the handler as unknown directives.
#[derive(Debug, PartialEq)]
enum SplitLine<'a> {
    KeyValue(&'a [u8], &'a [u8]),
    Malformed(&'a [u8]),
    Nothing,
}

/// Splits a raw line into a trimmed key and value.
///
/// Lines must match `<key>[ \t]*:[ \t]*<value>` after comment stripping.
/// When the colon is missing, whitespace is accepted as the separator, but
/// only if the line consists of exactly two whitespace-delimited fields;
/// anything else is malformed, never a parse failure.
fn split_key_value(line: &[u8]) -> SplitLine<'_> {
    // Remove any comment from the current line.
    let line = match line.iter().position(|&b| b == b'#') {
        Some(comment) => &line[..comment],
        None => line,
    };
    let line = line.trim_ascii();

    let mut sep = line.iter().position(|&b| b == b':');
    if sep.is_none() {
        sep = line.iter().position(|&b| b == b' ' || b == b'\t');
        if let Some(i) = sep {
            let value = line[i..].trim_ascii();
            if value.is_empty() || value.iter().any(|&b| b == b' ' || b == b'\t') {
                // More than two fields (trailing whitespace is already
                // gone); the intended key/value pair is not recoverable.
                return SplitLine::Malformed(line);
            }
        }
    }

    let sep = match sep {
        Some(sep) => sep,
        None => return SplitLine::Nothing,
    };
    let key = line[..sep].trim_ascii();
    if key.is_empty() {
        return SplitLine::Nothing;
    }
    let value = line[sep + 1..].trim_ascii();
    SplitLine::KeyValue(key, value)
}

/// A tolerant, streaming robots.txt parser.
///
/// The parser accepts any byte sequence and never fails: lines that do not
/// look like directives are surfaced as unknown events or skipped outright.
/// UTF-8 byte order marks (including partial ones) and all of `\n`, `\r`
/// and `\r\n` line endings are handled.
pub struct Parser<'a, H> {
    body: &'a [u8],
    handler: &'a mut H,
    options: ParseOptions,
}

impl<'a, H: ParseHandler> Parser<'a, H> {
    pub fn new(body: &'a [u8], handler: &'a mut H) -> Self {
        Self::with_options(body, handler, ParseOptions::default())
    }

    pub fn with_options(body: &'a [u8], handler: &'a mut H, options: ParseOptions) -> Self {
        Self {
            body,
            handler,
            options,
        }
    }

    /// Runs the parse to completion, emitting events to the handler.
    pub fn parse(mut self) {
        self.handler.on_robots_start();

        // Skip a BOM if present, including partial BOMs: a mismatch after a
        // partial prefix leaves the prefix consumed, so the first line then
        // starts from the leftover garbage.
        let body = self.body;
        let bom_len = body
            .iter()
            .zip(UTF8_BOM)
            .take_while(|(a, b)| a == b)
            .count();
        let body = &body[bom_len..];

        let mut line_num = 0u32;
        let mut last_was_cr = false;
        let mut line_start = 0usize;
        let mut line_len = 0usize;

        for (pos, &byte) in body.iter().enumerate() {
            if byte != b'\n' && byte != b'\r' {
                // Keep the byte as long as the line cap has room; bytes
                // past the cap are dropped without a diagnostic.
                if line_len < MAX_LINE_LEN - 1 {
                    line_len += 1;
                }
            } else {
                // Only emit an empty line if this is not the second byte of
                // a DOS \r\n ending.
                let is_crlf_continuation = line_len == 0 && last_was_cr && byte == b'\n';
                if !is_crlf_continuation {
                    line_num += 1;
                    self.parse_and_emit(line_num, &body[line_start..line_start + line_len]);
                }
                line_start = pos + 1;
                line_len = 0;
                last_was_cr = byte == b'\r';
            }
        }

        // The final line counts even without a terminator.
        line_num += 1;
        self.parse_and_emit(line_num, &body[line_start..line_start + line_len]);

        self.handler.on_robots_end();
    }

    fn parse_and_emit(&mut self, line_num: u32, line: &[u8]) {
        let (key, value) = match split_key_value(line) {
            SplitLine::KeyValue(key, value) => (key, value),
            SplitLine::Malformed(raw) => {
                // The whole line becomes the key of an unknown directive, so
                // no event is lost between robots_start and robots_end.
                self.handler
                    .on_unknown(line_num, &String::from_utf8_lossy(raw), "");
                return;
            }
            SplitLine::Nothing => return,
        };

        let kind = Key::classify(key, self.options);
        if kind.needs_escaping() {
            let value = escape_pattern(value);
            self.emit(line_num, kind, key, &value);
        } else {
            self.emit(line_num, kind, key, &String::from_utf8_lossy(value));
        }
    }

    fn emit(&mut self, line_num: u32, kind: Key, key: &[u8], value: &str) {
        match kind {
            Key::UserAgent => self.handler.on_user_agent(line_num, value),
            Key::Allow => self.handler.on_allow(line_num, value),
            Key::Disallow => self.handler.on_disallow(line_num, value),
            Key::Sitemap => self.handler.on_sitemap(line_num, value),
            Key::Unknown => self
                .handler
                .on_unknown(line_num, &String::from_utf8_lossy(key), value),
        }
    }
}

/// Parses a robots.txt body and emits parse events to the handler. Typical
/// typos such as `disalow` are accepted.
///
/// Any kind of input is accepted; everything that does not look like a
/// robots.txt directive is skipped.
pub fn parse<H: ParseHandler>(body: &[u8], handler: &mut H) {
    Parser::new(body, handler).parse();
}
