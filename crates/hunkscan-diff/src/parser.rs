//! Single-pass streaming parser from diff bytes to a [`DiffArena`].
//!
//! The parser walks the scanner's tokens once and drives a three-state
//! machine:
//!
//! ```text
//! Initial      --diff-->          InFileHeader
//! InFileHeader --- / +++-->       InFileHeader  (+++ commits the file)
//! InFileHeader --@@ (file)-->     InHunk
//! InHunk       --+ / - / ' '-->   InHunk        (advances line counters)
//! InHunk       --@@-->            InHunk        (new hunk, same file)
//! any          --diff-->          InFileHeader
//! ```
//!
//! Paths resolve in two stages. `diff --git a/X b/Y` (and `rename from` /
//! `rename to`) give provisional paths; `---` / `+++` overwrite them. When a
//! block ends without a `+++` line, as git does for pure renames, mode-only
//! changes and binary files, the provisional paths are committed instead.
//!
//! Malformed input never fails the parse. Hunks without a file and change
//! lines without a hunk are dropped, everything else is kept as-is.

use std::borrow::{BorrowMut, Cow};
use std::sync::Arc;
use std::time::Instant;

use hunkscan_types::{FileStatus, LineKind, ParseStats, MAX_CAPACITY_HINT};
use tracing::{debug, trace};

use crate::arena::{ArenaCapacity, DiffArena};
use crate::intern::InternPool;
use crate::scanner::{
    extract_diff_paths, extract_file_path, extract_raw_path, line_after, ByteRange, PathRef,
    ScanToken, Scanner, TokenKind,
};

/// Tuning knobs for a parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    /// Expected number of diff lines. Overrides the estimate derived from
    /// the input length.
    pub capacity_hint: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    Initial,
    InFileHeader,
    InHunk,
}

/// Status of a file from its old and new paths, comparing raw bytes only.
pub fn determine_file_status(buf: &[u8], old: PathRef, new: PathRef) -> FileStatus {
    match (old.dev_null, new.dev_null) {
        (true, false) => FileStatus::Added,
        (false, true) => FileStatus::Deleted,
        (false, false) if old.range.slice(buf) != new.range.slice(buf) => FileStatus::Renamed,
        _ => FileStatus::Modified,
    }
}

// ============================================================================
// Results
// ============================================================================

/// The arena, the pool that decodes it, and statistics for one parse.
///
/// `P` is either an owned [`InternPool`] or a mutable borrow of one (for
/// example a locked shared pool).
#[derive(Debug)]
pub struct ParseResult<'a, P = InternPool> {
    arena: DiffArena<'a>,
    pool: P,
    stats: ParseStats,
}

impl<'a, P: BorrowMut<InternPool>> ParseResult<'a, P> {
    pub fn arena(&self) -> &DiffArena<'a> {
        &self.arena
    }

    pub fn pool(&self) -> &InternPool {
        self.pool.borrow()
    }

    pub fn pool_mut(&mut self) -> &mut InternPool {
        self.pool.borrow_mut()
    }

    pub fn stats(&self) -> &ParseStats {
        &self.stats
    }

    pub fn file_count(&self) -> usize {
        self.arena.file_count()
    }

    pub fn hunk_count(&self) -> usize {
        self.arena.hunk_count()
    }

    pub fn line_count(&self) -> usize {
        self.arena.line_count()
    }

    /// No file was found. This is not an error.
    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn decode_file_path(&mut self, file: u32) -> Option<Arc<str>> {
        self.arena.decode_file_path(file, self.pool.borrow_mut())
    }

    pub fn decode_old_file_path(&mut self, file: u32) -> Option<Arc<str>> {
        self.arena.decode_old_file_path(file, self.pool.borrow_mut())
    }

    pub fn line_content(&self, line: u32) -> Option<Cow<'a, str>> {
        self.arena.line_content(line)
    }

    pub fn file_status(&self, file: u32) -> Option<FileStatus> {
        self.arena.file_status(file)
    }

    pub fn into_parts(self) -> (DiffArena<'a>, P, ParseStats) {
        (self.arena, self.pool, self.stats)
    }
}

// ============================================================================
// Entry points
// ============================================================================

/// Parse with a fresh pool.
pub fn parse(buf: &[u8]) -> ParseResult<'_, InternPool> {
    Parser::default().parse(buf, InternPool::new())
}

pub fn parse_str(text: &str) -> ParseResult<'_, InternPool> {
    parse(text.as_bytes())
}

/// Parse, decoding paths through a caller-supplied pool.
pub fn parse_with_pool<P: BorrowMut<InternPool>>(buf: &[u8], pool: P) -> ParseResult<'_, P> {
    Parser::default().parse(buf, pool)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    options: ParseOptions,
}

impl Parser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    pub fn parse<'a, P: BorrowMut<InternPool>>(&self, buf: &'a [u8], pool: P) -> ParseResult<'a, P> {
        let started = Instant::now();

        let capacity = match self.options.capacity_hint {
            Some(lines) => ArenaCapacity::for_lines(lines.min(MAX_CAPACITY_HINT)),
            None => ArenaCapacity::for_len(buf.len()),
        };
        let mut machine = Machine::new(buf, DiffArena::with_capacity(buf, capacity));
        for token in Scanner::new(buf) {
            machine.feed(token);
        }
        let (arena, dropped) = machine.finish();

        let stats = ParseStats {
            total_bytes: buf.len() as u64,
            parse_time_ms: started.elapsed().as_secs_f64() * 1000.0,
            files_found: arena.file_count() as u32,
            hunks_found: arena.hunk_count() as u32,
            lines_found: arena.line_count() as u32,
        };
        debug!(
            "parsed {} bytes: {} files, {} hunks, {} lines ({} hunks and {} lines dropped) in {:.3}ms",
            stats.total_bytes,
            stats.files_found,
            stats.hunks_found,
            stats.lines_found,
            dropped.hunks,
            dropped.lines,
            stats.parse_time_ms
        );

        ParseResult { arena, pool, stats }
    }
}

// ============================================================================
// State machine
// ============================================================================

/// Everything known about the file between two `diff` headers.
#[derive(Debug, Clone, Copy, Default)]
struct FileBlock {
    header_old: Option<PathRef>,
    header_new: Option<PathRef>,
    /// From `---`.
    old: Option<PathRef>,
    status_hint: Option<FileStatus>,
    binary: bool,
    committed: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default)]
struct Dropped {
    hunks: u32,
    lines: u32,
}

struct Machine<'a> {
    buf: &'a [u8],
    arena: DiffArena<'a>,
    state: ParserState,
    block: FileBlock,
    current_file: Option<u32>,
    current_hunk: Option<u32>,
    new_line: u32,
    old_line: u32,
    remaining_old: u32,
    remaining_new: u32,
    dropped: Dropped,
}

impl<'a> Machine<'a> {
    fn new(buf: &'a [u8], arena: DiffArena<'a>) -> Self {
        Self {
            buf,
            arena,
            state: ParserState::Initial,
            block: FileBlock::default(),
            current_file: None,
            current_hunk: None,
            new_line: 0,
            old_line: 0,
            remaining_old: 0,
            remaining_new: 0,
            dropped: Dropped::default(),
        }
    }

    fn feed(&mut self, token: ScanToken) {
        match token.kind {
            TokenKind::DiffHeader => self.on_diff_header(token),
            TokenKind::OldFilePath => {
                if self.state == ParserState::InHunk
                    && self.remaining_old > 0
                    && !self.opens_next_file(token.line)
                {
                    self.on_change_line(LineKind::Deletion, strip_marker(token.line));
                } else {
                    self.on_old_path(token);
                }
            }
            TokenKind::NewFilePath => {
                if self.state == ParserState::InHunk && self.remaining_new > 0 {
                    self.on_change_line(LineKind::Addition, strip_marker(token.line));
                } else {
                    self.on_new_path(token);
                }
            }
            TokenKind::HunkHeader => self.on_hunk_header(token),
            TokenKind::Addition => self.on_change_line(LineKind::Addition, token.content),
            TokenKind::Deletion => self.on_change_line(LineKind::Deletion, token.content),
            TokenKind::Context => {
                // A blank line after an exhausted hunk separates diffs; it is
                // not a context line.
                if token.line.is_empty() && self.remaining_old == 0 && self.remaining_new == 0 {
                    return;
                }
                self.on_change_line(LineKind::Context, token.content);
            }
            TokenKind::Metadata => {
                if self.state == ParserState::InFileHeader {
                    self.on_header_metadata(token);
                }
            }
        }
    }

    fn finish(mut self) -> (DiffArena<'a>, Dropped) {
        self.finish_block();
        (self.arena, self.dropped)
    }

    /// A `---` line followed by `+++` and a hunk header starts the next file
    /// when the current hunk claims more lines than the pair would consume.
    fn opens_next_file(&self, line: ByteRange) -> bool {
        if self.remaining_old == 1 && self.remaining_new == 1 {
            return false;
        }
        let Some(new) = line_after(self.buf, line) else {
            return false;
        };
        if !new.slice(self.buf).starts_with(b"+++ ") {
            return false;
        }
        let opens = line_after(self.buf, new)
            .is_some_and(|next| next.slice(self.buf).starts_with(b"@@ -"));
        if opens {
            trace!(
                "hunk at byte {} ends {} old and {} new lines short",
                line.start,
                self.remaining_old,
                self.remaining_new
            );
        }
        opens
    }

    fn on_diff_header(&mut self, token: ScanToken) {
        self.finish_block();
        let (header_old, header_new) = match extract_diff_paths(self.buf, token.content) {
            Some((old, new)) => (Some(old), Some(new)),
            None => (None, None),
        };
        self.block = FileBlock {
            header_old,
            header_new,
            ..FileBlock::default()
        };
        self.enter_file_header();
    }

    fn on_old_path(&mut self, token: ScanToken) {
        if self.block.committed.is_some() {
            // Plain `diff -u` output: files follow each other without a
            // `diff` line in between.
            self.finish_block();
            self.block = FileBlock::default();
        }
        self.block.old = Some(extract_file_path(self.buf, token.content));
        self.enter_file_header();
    }

    fn on_new_path(&mut self, token: ScanToken) {
        if self.block.committed.is_some() {
            self.finish_block();
            self.block = FileBlock::default();
        }
        let new = extract_file_path(self.buf, token.content);
        let old = self.block.old.or(self.block.header_old).unwrap_or(new);
        self.enter_file_header();
        self.commit(old, new);
    }

    fn on_header_metadata(&mut self, token: ScanToken) {
        let line = token.line.slice(self.buf);
        if let Some(rest) = strip_keyword(token.line, line, b"rename from ") {
            self.block.header_old = Some(extract_raw_path(self.buf, rest));
        } else if let Some(rest) = strip_keyword(token.line, line, b"rename to ") {
            self.block.header_new = Some(extract_raw_path(self.buf, rest));
        } else if line.starts_with(b"new file mode") {
            self.block.status_hint = Some(FileStatus::Added);
        } else if line.starts_with(b"deleted file mode") {
            self.block.status_hint = Some(FileStatus::Deleted);
        } else if line.starts_with(b"Binary files ") || line.starts_with(b"GIT binary patch") {
            self.block.binary = true;
            if let Some(file) = self.block.committed {
                self.arena.mark_binary(file);
            }
        }
    }

    fn on_hunk_header(&mut self, token: ScanToken) {
        let Some(file) = self.current_file else {
            self.dropped.hunks += 1;
            trace!("dropping hunk header at byte {} without a file", token.line.start);
            return;
        };
        let range = token.hunk.unwrap_or_default();
        let Some(hunk) = self.arena.add_hunk(file, range, token.line) else {
            self.dropped.hunks += 1;
            return;
        };

        self.current_hunk = Some(hunk);
        self.new_line = range.new_start;
        self.old_line = range.old_start;
        self.remaining_old = range.old_lines;
        self.remaining_new = range.new_lines;
        self.state = ParserState::InHunk;
    }

    fn on_change_line(&mut self, kind: LineKind, content: ByteRange) {
        let (Some(file), Some(hunk), ParserState::InHunk) =
            (self.current_file, self.current_hunk, self.state)
        else {
            self.dropped.lines += 1;
            return;
        };

        if self
            .arena
            .add_line(kind, content, file, hunk, self.new_line, self.old_line)
            .is_none()
        {
            self.dropped.lines += 1;
            return;
        }

        match kind {
            LineKind::Addition => self.advance_new(),
            LineKind::Deletion => self.advance_old(),
            LineKind::Context => {
                self.advance_new();
                self.advance_old();
            }
        }
    }

    fn advance_new(&mut self) {
        self.new_line = self.new_line.saturating_add(1);
        self.remaining_new = self.remaining_new.saturating_sub(1);
    }

    fn advance_old(&mut self) {
        self.old_line = self.old_line.saturating_add(1);
        self.remaining_old = self.remaining_old.saturating_sub(1);
    }

    fn enter_file_header(&mut self) {
        self.state = ParserState::InFileHeader;
        self.current_file = None;
        self.current_hunk = None;
        self.remaining_old = 0;
        self.remaining_new = 0;
    }

    /// Commit a block that never saw `+++` from its header paths.
    fn finish_block(&mut self) {
        if self.block.committed.is_some() {
            return;
        }
        let Some(new) = self.block.header_new else {
            return;
        };
        let old = self.block.old.or(self.block.header_old).unwrap_or(new);
        trace!(
            "committing file at byte {} from header paths",
            new.range.start
        );
        self.commit(old, new);
    }

    fn commit(&mut self, old: PathRef, new: PathRef) {
        let mut status = determine_file_status(self.buf, old, new);
        if status == FileStatus::Modified {
            status = self.block.status_hint.unwrap_or(status);
        }
        let path = match status {
            FileStatus::Deleted => old.range,
            _ => new.range,
        };
        let old_path = (status == FileStatus::Renamed).then_some(old.range);

        let Some(file) = self.arena.add_file(status, path, old_path) else {
            return;
        };
        if self.block.binary {
            self.arena.mark_binary(file);
        }
        self.block.committed = Some(file);
        self.current_file = Some(file);
    }
}

/// The line without its first byte, for `---`/`+++` lines that are really
/// change lines.
fn strip_marker(line: ByteRange) -> ByteRange {
    if line.is_empty() {
        line
    } else {
        ByteRange::new(line.start + 1, line.len - 1)
    }
}

fn strip_keyword(line: ByteRange, bytes: &[u8], keyword: &[u8]) -> Option<ByteRange> {
    bytes
        .starts_with(keyword)
        .then(|| ByteRange::new(line.start + keyword.len(), line.len - keyword.len()))
}
