//! Byte-level line scanner for unified diffs.
//!
//! The scanner classifies one line at a time and hands back offsets into the
//! caller's buffer. It never allocates: text only comes into existence through
//! [`Scanner::decode`], which callers invoke explicitly.
//!
//! Classification dispatches on the first byte of the line and then checks
//! progressively more specific markers:
//!
//! | first byte | marker                 | kind                          |
//! |------------|------------------------|-------------------------------|
//! | `d`        | `diff `                | `DiffHeader`, else `Metadata` |
//! | `-`        | `--- ` or bare `---`   | `OldFilePath`, else `Deletion`|
//! | `+`        | `+++ ` or bare `+++`   | `NewFilePath`, else `Addition`|
//! | `@`        | `@@ -`                 | `HunkHeader`, else `Metadata` |
//! | space      |                        | `Context`                     |
//! | (empty)    |                        | `Context` with empty content  |
//! | other      |                        | `Metadata`                    |

use std::borrow::Cow;

use memchr::{memchr, memmem};

/// The sentinel path git uses for the missing side of an added/deleted file.
pub const DEV_NULL: &[u8] = b"/dev/null";

/// An offset/length pair into the source buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ByteRange {
    pub start: usize,
    pub len: usize,
}

impl ByteRange {
    pub const EMPTY: ByteRange = ByteRange { start: 0, len: 0 };

    #[inline]
    pub const fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }

    /// Range covering `start..end`; empty when `end < start`.
    #[inline]
    pub const fn from_bounds(start: usize, end: usize) -> Self {
        Self {
            start,
            len: end.saturating_sub(start),
        }
    }

    #[inline]
    pub const fn end(self) -> usize {
        self.start.saturating_add(self.len)
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.len == 0
    }

    /// True when the whole range lies inside a buffer of `buf_len` bytes.
    #[inline]
    pub const fn is_within(self, buf_len: usize) -> bool {
        self.start <= buf_len && self.len <= buf_len - self.start
    }

    /// Zero-copy view of the range, clamped to the buffer.
    #[inline]
    pub fn slice(self, buf: &[u8]) -> &[u8] {
        let start = self.start.min(buf.len());
        let end = self.end().min(buf.len());
        &buf[start..end]
    }

    /// Shift a range that is relative to `base` into absolute coordinates.
    #[inline]
    const fn offset_by(self, base: usize) -> Self {
        Self {
            start: base + self.start,
            len: self.len,
        }
    }
}

/// Classification of one scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    DiffHeader,
    OldFilePath,
    NewFilePath,
    HunkHeader,
    Addition,
    Deletion,
    Context,
    Metadata,
}

/// Numbers parsed out of a `@@ -a,b +c,d @@` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HunkRange {
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
}

/// One classified line.
///
/// `line` excludes the line terminator (`\n` and a preceding `\r`).
/// `content` is what follows the marker prefix: the text of a change line,
/// the path part of a `---`/`+++` line, the section heading of a hunk
/// header, or the whole line for metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanToken {
    pub kind: TokenKind,
    pub line: ByteRange,
    pub content: ByteRange,
    pub hunk: Option<HunkRange>,
}

impl ScanToken {
    #[inline]
    fn with_prefix(kind: TokenKind, line: ByteRange, prefix: usize) -> Self {
        let prefix = prefix.min(line.len);
        Self {
            kind,
            line,
            content: ByteRange::new(line.start + prefix, line.len - prefix),
            hunk: None,
        }
    }
}

/// A path located inside the buffer, with the `a/`/`b/` prefix already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PathRef {
    pub range: ByteRange,
    pub dev_null: bool,
}

impl PathRef {
    fn new(buf: &[u8], range: ByteRange) -> Self {
        Self {
            range,
            dev_null: range.slice(buf) == DEV_NULL,
        }
    }
}

/// Cursor over a diff buffer.
#[derive(Debug, Clone)]
pub struct Scanner<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Scanner<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn source(&self) -> &'a [u8] {
        self.buf
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.buf.len()
    }

    /// Classify the next line and move past it. `None` at end of input.
    pub fn scan_line(&mut self) -> Option<ScanToken> {
        let line = self.next_line()?;
        Some(classify(self.buf, line))
    }

    /// Move past the current line without classifying it.
    ///
    /// Returns `false` when the cursor was already at the end.
    pub fn skip_line(&mut self) -> bool {
        self.next_line().is_some()
    }

    /// Absolute offset of the next occurrence of `pattern` at or after the
    /// cursor. Does not move the cursor.
    pub fn scan_until(&self, pattern: &[u8]) -> Option<usize> {
        let rest = &self.buf[self.pos..];
        memmem::find(rest, pattern).map(|i| self.pos + i)
    }

    pub fn slice(&self, range: ByteRange) -> &'a [u8] {
        range.slice(self.buf)
    }

    /// Materialize a range as text. Invalid UTF-8 is replaced, never rejected.
    pub fn decode(&self, range: ByteRange) -> Cow<'a, str> {
        String::from_utf8_lossy(range.slice(self.buf))
    }

    /// Provisional old/new paths from the content of a `diff ` header line.
    pub fn extract_diff_paths(&self, content: ByteRange) -> Option<(PathRef, PathRef)> {
        extract_diff_paths(self.buf, content)
    }

    /// Authoritative path from the content of a `---`/`+++` line.
    pub fn extract_file_path(&self, content: ByteRange) -> PathRef {
        extract_file_path(self.buf, content)
    }

    fn next_line(&mut self) -> Option<ByteRange> {
        if self.pos >= self.buf.len() {
            return None;
        }
        let start = self.pos;
        let (mut end, next) = match memchr(b'\n', &self.buf[start..]) {
            Some(i) => (start + i, start + i + 1),
            None => (self.buf.len(), self.buf.len()),
        };
        if end > start && self.buf[end - 1] == b'\r' {
            end -= 1;
        }
        self.pos = next;
        Some(ByteRange::from_bounds(start, end))
    }
}

impl Iterator for Scanner<'_> {
    type Item = ScanToken;

    fn next(&mut self) -> Option<ScanToken> {
        self.scan_line()
    }
}

/// The line after `line`, terminator (and trailing `\r`) excluded.
pub fn line_after(buf: &[u8], line: ByteRange) -> Option<ByteRange> {
    let newline = line.end() + memchr(b'\n', buf.get(line.end()..)?)?;
    let start = newline + 1;
    if start >= buf.len() {
        return None;
    }
    let mut end = memchr(b'\n', &buf[start..]).map_or(buf.len(), |i| start + i);
    if end > start && buf[end - 1] == b'\r' {
        end -= 1;
    }
    Some(ByteRange::from_bounds(start, end))
}

/// Classify a single line (terminator already excluded).
pub fn classify(buf: &[u8], line: ByteRange) -> ScanToken {
    let bytes = line.slice(buf);
    let Some(&first) = bytes.first() else {
        return ScanToken::with_prefix(TokenKind::Context, line, 0);
    };

    match first {
        b'd' if bytes.starts_with(b"diff ") => {
            ScanToken::with_prefix(TokenKind::DiffHeader, line, 5)
        }
        b'-' if bytes.starts_with(b"--- ") => {
            ScanToken::with_prefix(TokenKind::OldFilePath, line, 4)
        }
        b'-' if bytes.starts_with(b"---") => {
            ScanToken::with_prefix(TokenKind::OldFilePath, line, 3)
        }
        b'-' => ScanToken::with_prefix(TokenKind::Deletion, line, 1),
        b'+' if bytes.starts_with(b"+++ ") => {
            ScanToken::with_prefix(TokenKind::NewFilePath, line, 4)
        }
        b'+' if bytes.starts_with(b"+++") => {
            ScanToken::with_prefix(TokenKind::NewFilePath, line, 3)
        }
        b'+' => ScanToken::with_prefix(TokenKind::Addition, line, 1),
        b'@' if bytes.starts_with(b"@@ -") => ScanToken {
            kind: TokenKind::HunkHeader,
            line,
            content: hunk_section(bytes).offset_by(line.start),
            hunk: Some(parse_hunk_header(bytes)),
        },
        b' ' => ScanToken::with_prefix(TokenKind::Context, line, 1),
        _ => ScanToken::with_prefix(TokenKind::Metadata, line, 0),
    }
}

// ============================================================================
// Hunk headers
// ============================================================================

/// Parse `@@ -oldStart[,oldLines] +newStart[,newLines] @@` from raw bytes.
///
/// Never fails: an omitted count defaults to 1, digits that are missing or
/// unparseable read as 0, and oversized numbers saturate at `u32::MAX`.
pub fn parse_hunk_header(line: &[u8]) -> HunkRange {
    let mut range = HunkRange {
        old_start: 0,
        old_lines: 1,
        new_start: 0,
        new_lines: 1,
    };

    let Some(rest) = line.strip_prefix(b"@@ -") else {
        return range;
    };
    let (old, rest) = split_field(rest);
    (range.old_start, range.old_lines) = parse_span(old);

    let start = rest.iter().position(|&b| b != b' ').unwrap_or(rest.len());
    let Some(rest) = rest[start..].strip_prefix(b"+") else {
        return range;
    };
    let (new, _) = split_field(rest);
    (range.new_start, range.new_lines) = parse_span(new);

    range
}

/// Section heading after the closing `@@`, relative to the start of `line`.
///
/// Git writes the enclosing function or class signature here
/// (`@@ -10,3 +10,4 @@ fn main() {`). Empty when absent.
pub fn hunk_section(line: &[u8]) -> ByteRange {
    if line.len() < 2 {
        return ByteRange::new(line.len(), 0);
    }
    let Some(close) = memmem::find(&line[2..], b"@@").map(|i| i + 2) else {
        return ByteRange::new(line.len(), 0);
    };
    let mut start = close + 2;
    while line.get(start) == Some(&b' ') {
        start += 1;
    }
    ByteRange::from_bounds(start.min(line.len()), line.len())
}

#[inline]
fn split_field(bytes: &[u8]) -> (&[u8], &[u8]) {
    let end = memchr(b' ', bytes).unwrap_or(bytes.len());
    bytes.split_at(end)
}

/// `start[,count]`; the count defaults to 1 when the comma is absent.
#[inline]
fn parse_span(field: &[u8]) -> (u32, u32) {
    match memchr(b',', field) {
        Some(comma) => (parse_digits(&field[..comma]), parse_digits(&field[comma + 1..])),
        None => (parse_digits(field), 1),
    }
}

/// Leading ASCII digits as a saturating `u32`; 0 when there are none.
#[inline]
fn parse_digits(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .fold(0u32, |acc, &b| {
            acc.saturating_mul(10).saturating_add(u32::from(b - b'0'))
        })
}

// ============================================================================
// Paths
// ============================================================================

/// Provisional old/new paths from the content of a `diff ` header line
/// (the bytes after `diff `).
///
/// Only `diff --git` headers carry paths. For the common `a/X b/X` shape the
/// line is split exactly in the middle, which stays correct when `X`
/// contains spaces. Otherwise the last ` b/` separator wins. Quoted paths
/// have their quotes removed; escape sequences inside them stay raw.
pub fn extract_diff_paths(buf: &[u8], content: ByteRange) -> Option<(PathRef, PathRef)> {
    let bytes = content.slice(buf);
    let rest = bytes.strip_prefix(b"--git ")?;
    let base = content.start + 6;

    let (old, new) = split_git_header_paths(rest)?;
    let old = strip_side_prefix(buf, old.offset_by(base));
    let new = strip_side_prefix(buf, new.offset_by(base));
    Some((PathRef::new(buf, old), PathRef::new(buf, new)))
}

/// Authoritative path from the content of a `---`/`+++` line.
///
/// Strips one `a/` or `b/` prefix, surrounding quotes, and anything after a
/// tab (timestamps written by `diff -u`). `/dev/null` is reported through
/// [`PathRef::dev_null`] and keeps its full range.
pub fn extract_file_path(buf: &[u8], content: ByteRange) -> PathRef {
    let range = trim_path(buf, content);
    if range.slice(buf) == DEV_NULL {
        return PathRef {
            range,
            dev_null: true,
        };
    }
    PathRef::new(buf, strip_side_prefix(buf, range))
}

/// Path from a `rename from`/`rename to` style line: trimmed and unquoted,
/// but without prefix stripping since git writes these paths bare.
pub fn extract_raw_path(buf: &[u8], content: ByteRange) -> PathRef {
    PathRef::new(buf, trim_path(buf, content))
}

fn trim_path(buf: &[u8], content: ByteRange) -> ByteRange {
    let bytes = content.slice(buf);
    let mut end = memchr(b'\t', bytes).unwrap_or(bytes.len());
    let mut start = 0;
    while start < end && bytes[start] == b' ' {
        start += 1;
    }
    while end > start && bytes[end - 1] == b' ' {
        end -= 1;
    }
    if end - start >= 2 && bytes[start] == b'"' && bytes[end - 1] == b'"' {
        start += 1;
        end -= 1;
    }
    ByteRange::from_bounds(start, end).offset_by(content.start)
}

fn strip_side_prefix(buf: &[u8], range: ByteRange) -> ByteRange {
    let bytes = range.slice(buf);
    if bytes.starts_with(b"a/") || bytes.starts_with(b"b/") {
        ByteRange::new(range.start + 2, range.len - 2)
    } else {
        range
    }
}

/// Split the text after `diff --git ` into its two path tokens (relative
/// ranges, quotes removed, prefixes kept).
fn split_git_header_paths(rest: &[u8]) -> Option<(ByteRange, ByteRange)> {
    if rest.is_empty() {
        return None;
    }

    if rest[0] == b'"' {
        let close = closing_quote(rest, 1)?;
        let old = ByteRange::from_bounds(1, close);
        let mut next = close + 1;
        while rest.get(next) == Some(&b' ') {
            next += 1;
        }
        let new = quoted_or_rest(rest, next)?;
        return Some((old, new));
    }

    // Symmetric `a/X b/X`: same path on both sides, one space in the middle.
    if rest.len() % 2 == 1 {
        let mid = rest.len() / 2;
        if rest[mid] == b' ' {
            let left = &rest[..mid];
            let right = &rest[mid + 1..];
            if left.get(2..) == right.get(2..) && left.get(1) == Some(&b'/') {
                return Some((
                    ByteRange::new(0, mid),
                    ByteRange::from_bounds(mid + 1, rest.len()),
                ));
            }
            if left == right {
                // `--no-prefix` output.
                return Some((
                    ByteRange::new(0, mid),
                    ByteRange::from_bounds(mid + 1, rest.len()),
                ));
            }
        }
    }

    if rest.ends_with(b"\"") {
        if let Some(sep) = memmem::rfind(rest, b" \"") {
            let new = quoted_or_rest(rest, sep + 1)?;
            return Some((ByteRange::new(0, sep), new));
        }
    }

    if let Some(sep) = memmem::rfind(rest, b" b/") {
        return Some((
            ByteRange::new(0, sep),
            ByteRange::from_bounds(sep + 1, rest.len()),
        ));
    }

    let sep = rest.iter().rposition(|&b| b == b' ')?;
    Some((
        ByteRange::new(0, sep),
        ByteRange::from_bounds(sep + 1, rest.len()),
    ))
}

fn quoted_or_rest(rest: &[u8], start: usize) -> Option<ByteRange> {
    if start >= rest.len() {
        return None;
    }
    if rest[start] == b'"' {
        let close = closing_quote(rest, start + 1)?;
        Some(ByteRange::from_bounds(start + 1, close))
    } else {
        Some(ByteRange::from_bounds(start, rest.len()))
    }
}

/// Index of the closing `"` at or after `from`, honoring backslash escapes.
fn closing_quote(bytes: &[u8], from: usize) -> Option<usize> {
    let mut i = from;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b'"' => return Some(i),
            _ => i += 1,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        Scanner::new(input.as_bytes()).map(|t| t.kind).collect()
    }

    fn text<'a>(buf: &'a str, range: ByteRange) -> &'a str {
        std::str::from_utf8(range.slice(buf.as_bytes())).expect("utf8")
    }

    #[test]
    fn classifies_each_line_kind() {
        let input = "diff --git a/x b/x\n\
                     index 123..456 100644\n\
                     --- a/x\n\
                     +++ b/x\n\
                     @@ -1,2 +1,2 @@\n \
                     same\n\
                     -old\n\
                     +new\n\
                     \\ No newline at end of file\n";

        assert_eq!(
            kinds(input),
            vec![
                TokenKind::DiffHeader,
                TokenKind::Metadata,
                TokenKind::OldFilePath,
                TokenKind::NewFilePath,
                TokenKind::HunkHeader,
                TokenKind::Context,
                TokenKind::Deletion,
                TokenKind::Addition,
                TokenKind::Metadata,
            ]
        );
    }

    #[test]
    fn bare_triple_markers_are_path_lines() {
        assert_eq!(kinds("---\n+++\n"), vec![TokenKind::OldFilePath, TokenKind::NewFilePath]);
        assert_eq!(kinds("--\n++\n"), vec![TokenKind::Deletion, TokenKind::Addition]);
    }

    #[test]
    fn near_misses_degrade_to_metadata() {
        assert_eq!(kinds("different\n"), vec![TokenKind::Metadata]);
        assert_eq!(kinds("@@@ -1 +1 @@@\n"), vec![TokenKind::Metadata]);
        assert_eq!(kinds("@ x\n"), vec![TokenKind::Metadata]);
        assert_eq!(kinds("Binary files a/x and b/x differ\n"), vec![TokenKind::Metadata]);
    }

    #[test]
    fn empty_line_is_context_with_empty_content() {
        let input = "\n";
        let mut scanner = Scanner::new(input.as_bytes());
        let token = scanner.scan_line().expect("token");
        assert_eq!(token.kind, TokenKind::Context);
        assert!(token.content.is_empty());
        assert!(scanner.scan_line().is_none());
    }

    #[test]
    fn content_excludes_marker_prefix() {
        let input = "+added text\n-removed\n kept\n--- a/src/lib.rs\n";
        let tokens: Vec<_> = Scanner::new(input.as_bytes()).collect();
        assert_eq!(text(input, tokens[0].content), "added text");
        assert_eq!(text(input, tokens[1].content), "removed");
        assert_eq!(text(input, tokens[2].content), "kept");
        assert_eq!(text(input, tokens[3].content), "a/src/lib.rs");
        assert_eq!(text(input, tokens[0].line), "+added text");
    }

    #[test]
    fn crlf_terminators_are_excluded() {
        let input = "+++ b/x.ts\r\n+line\r\n";
        let tokens: Vec<_> = Scanner::new(input.as_bytes()).collect();
        assert_eq!(text(input, tokens[0].content), "b/x.ts");
        assert_eq!(text(input, tokens[1].content), "line");
    }

    #[test]
    fn last_line_without_newline_is_scanned() {
        let input = "+a\n+b";
        let mut scanner = Scanner::new(input.as_bytes());
        assert!(scanner.scan_line().is_some());
        let last = scanner.scan_line().expect("last line");
        assert_eq!(text(input, last.content), "b");
        assert!(scanner.is_at_end());
        assert_eq!(scanner.remaining(), 0);
        assert!(scanner.scan_line().is_none());
    }

    #[test]
    fn skip_line_and_scan_until() {
        let input = "header\n@@ -1 +1 @@\n+x\n";
        let mut scanner = Scanner::new(input.as_bytes());
        assert_eq!(scanner.scan_until(b"@@"), Some(7));
        assert_eq!(scanner.position(), 0);

        assert!(scanner.skip_line());
        assert_eq!(scanner.position(), 7);
        assert_eq!(scanner.scan_until(b"nope"), None);

        let token = scanner.scan_line().expect("hunk");
        assert_eq!(token.kind, TokenKind::HunkHeader);
        assert!(scanner.skip_line());
        assert!(!scanner.skip_line());
    }

    #[test]
    fn slice_and_decode_are_clamped() {
        let input = "abc";
        let scanner = Scanner::new(input.as_bytes());
        assert_eq!(scanner.slice(ByteRange::new(1, 10)), b"bc");
        assert_eq!(scanner.decode(ByteRange::new(5, 2)), "");
        assert_eq!(scanner.decode(ByteRange::new(0, 3)), "abc");
    }

    #[test]
    fn decode_replaces_invalid_utf8() {
        let input = b"+\xffok\n";
        let scanner = Scanner::new(input);
        assert_eq!(scanner.decode(ByteRange::new(1, 3)), "\u{fffd}ok");
    }

    #[test]
    fn hunk_header_with_counts() {
        let range = parse_hunk_header(b"@@ -10,5 +20,3 @@ fn foo()");
        assert_eq!(
            range,
            HunkRange {
                old_start: 10,
                old_lines: 5,
                new_start: 20,
                new_lines: 3,
            }
        );
    }

    #[test]
    fn hunk_header_without_counts_defaults_to_one() {
        let range = parse_hunk_header(b"@@ -5 +10 @@");
        assert_eq!(
            range,
            HunkRange {
                old_start: 5,
                old_lines: 1,
                new_start: 10,
                new_lines: 1,
            }
        );
    }

    #[test]
    fn hunk_header_garbage_reads_as_zero() {
        let range = parse_hunk_header(b"@@ -x,y +z @@");
        assert_eq!(range.old_start, 0);
        assert_eq!(range.old_lines, 0);
        assert_eq!(range.new_start, 0);
        assert_eq!(range.new_lines, 1);

        let range = parse_hunk_header(b"@@ -3,2");
        assert_eq!(range.old_start, 3);
        assert_eq!(range.old_lines, 2);
        assert_eq!(range.new_start, 0);
        assert_eq!(range.new_lines, 1);
    }

    #[test]
    fn hunk_header_saturates_huge_numbers() {
        let range = parse_hunk_header(b"@@ -99999999999999 +1,2 @@");
        assert_eq!(range.old_start, u32::MAX);
        assert_eq!(range.new_start, 1);
        assert_eq!(range.new_lines, 2);
    }

    #[test]
    fn hunk_section_text() {
        let line = "@@ -10,3 +10,4 @@ fn main() {";
        let section = hunk_section(line.as_bytes());
        assert_eq!(text(line, section), "fn main() {");

        assert!(hunk_section(b"@@ -1 +1 @@").is_empty());
        assert!(hunk_section(b"@@ -1 +1").is_empty());
    }

    #[test]
    fn hunk_token_carries_range_and_section() {
        let input = "@@ -1,2 +3,4 @@ impl Foo\n";
        let token = Scanner::new(input.as_bytes()).scan_line().expect("token");
        assert_eq!(token.kind, TokenKind::HunkHeader);
        assert_eq!(text(input, token.content), "impl Foo");
        let range = token.hunk.expect("range");
        assert_eq!((range.old_start, range.old_lines), (1, 2));
        assert_eq!((range.new_start, range.new_lines), (3, 4));
    }

    #[test]
    fn file_path_strips_prefix_and_timestamp() {
        let input = "--- a/src/lib.rs\t2024-01-01 00:00:00\n";
        let token = Scanner::new(input.as_bytes()).scan_line().expect("token");
        let path = extract_file_path(input.as_bytes(), token.content);
        assert_eq!(text(input, path.range), "src/lib.rs");
        assert!(!path.dev_null);
    }

    #[test]
    fn file_path_recognizes_dev_null() {
        let input = "+++ /dev/null\n";
        let token = Scanner::new(input.as_bytes()).scan_line().expect("token");
        let path = extract_file_path(input.as_bytes(), token.content);
        assert!(path.dev_null);
        assert_eq!(text(input, path.range), "/dev/null");
    }

    #[test]
    fn file_path_unquotes() {
        let input = "+++ \"b/dir/with space.txt\"\n";
        let token = Scanner::new(input.as_bytes()).scan_line().expect("token");
        let path = extract_file_path(input.as_bytes(), token.content);
        assert_eq!(text(input, path.range), "dir/with space.txt");
    }

    #[test]
    fn raw_path_keeps_directory_named_a() {
        let input = "rename from a/inner.rs";
        let path = extract_raw_path(input.as_bytes(), ByteRange::new(12, input.len() - 12));
        assert_eq!(text(input, path.range), "a/inner.rs");
    }

    #[test]
    fn diff_paths_simple() {
        let input = "diff --git a/src/x.ts b/src/x.ts";
        let (old, new) =
            extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).expect("paths");
        assert_eq!(text(input, old.range), "src/x.ts");
        assert_eq!(text(input, new.range), "src/x.ts");
    }

    #[test]
    fn diff_paths_with_spaces_and_b_slash() {
        let input = "diff --git a/my b/file.rs b/my b/file.rs";
        let (old, new) =
            extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).expect("paths");
        assert_eq!(text(input, old.range), "my b/file.rs");
        assert_eq!(text(input, new.range), "my b/file.rs");
    }

    #[test]
    fn diff_paths_rename() {
        let input = "diff --git a/old name.rs b/new.rs";
        let (old, new) =
            extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).expect("paths");
        assert_eq!(text(input, old.range), "old name.rs");
        assert_eq!(text(input, new.range), "new.rs");
    }

    #[test]
    fn diff_paths_quoted() {
        let input = "diff --git \"a/t\\303\\244st.txt\" \"b/t\\303\\244st.txt\"";
        let (old, new) =
            extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).expect("paths");
        assert_eq!(text(input, old.range), "t\\303\\244st.txt");
        assert_eq!(text(input, new.range), "t\\303\\244st.txt");
    }

    #[test]
    fn diff_paths_no_prefix() {
        let input = "diff --git src/a.rs src/a.rs";
        let (old, new) =
            extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).expect("paths");
        assert_eq!(text(input, old.range), "src/a.rs");
        assert_eq!(text(input, new.range), "src/a.rs");
    }

    #[test]
    fn non_git_diff_header_has_no_paths() {
        let input = "diff -u old.txt new.txt";
        assert!(extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).is_none());
        let input = "diff --git ";
        assert!(extract_diff_paths(input.as_bytes(), ByteRange::new(5, input.len() - 5)).is_none());
    }

    #[test]
    fn byte_range_bounds() {
        assert!(ByteRange::new(2, 3).is_within(5));
        assert!(!ByteRange::new(2, 4).is_within(5));
        assert!(!ByteRange::new(6, 0).is_within(5));
        assert!(ByteRange::new(5, 0).is_within(5));
        assert_eq!(ByteRange::from_bounds(4, 2), ByteRange::new(4, 0));
        assert_eq!(ByteRange::new(usize::MAX, 5).end(), usize::MAX);
    }
}
