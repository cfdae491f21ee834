//! Index-addressed storage for parsed files, hunks and lines.
//!
//! Records are small `Copy` structs in three flat vectors. They point at each
//! other by `u32` index and at their text by [`ByteRange`] into the source
//! buffer, so a parse of any size allocates three vectors plus whatever the
//! intern pool decodes.
//!
//! Every mutator validates its back-references and byte ranges and returns
//! `None` rather than store a record that would dangle.

use std::borrow::Cow;
use std::sync::Arc;

use hunkscan_types::{FileStatus, LineKind};

use crate::intern::{InternPool, LazyStr};
use crate::scanner::{hunk_section, ByteRange, HunkRange};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRecord {
    pub status: FileStatus,
    /// New path; the old path for deleted files.
    pub path: ByteRange,
    /// Only set for renames.
    pub old_path: Option<ByteRange>,
    pub binary: bool,
    pub first_hunk: u32,
    pub hunk_count: u32,
    pub additions: u32,
    pub deletions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HunkRecord {
    pub file: u32,
    pub old_start: u32,
    pub old_lines: u32,
    pub new_start: u32,
    pub new_lines: u32,
    /// The full `@@ ... @@` line.
    pub header: ByteRange,
    pub first_line: u32,
    pub line_count: u32,
}

impl HunkRecord {
    pub fn range(&self) -> HunkRange {
        HunkRange {
            old_start: self.old_start,
            old_lines: self.old_lines,
            new_start: self.new_start,
            new_lines: self.new_lines,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord {
    pub kind: LineKind,
    pub file: u32,
    pub hunk: u32,
    /// Line text without its `+`/`-`/` ` marker.
    pub content: ByteRange,
    pub new_line: u32,
    pub old_line: u32,
}

// ============================================================================
// Capacity estimation
// ============================================================================

const BYTES_PER_LINE: usize = 40;
const LINES_PER_HUNK: usize = 16;
const HUNKS_PER_FILE: usize = 4;

const MIN_LINES: usize = 16;
const MIN_HUNKS: usize = 4;
const MIN_FILES: usize = 2;

const MAX_LINES: usize = 1 << 22;
const MAX_HUNKS: usize = 1 << 18;
const MAX_FILES: usize = 1 << 16;

/// Up-front reservation sizes derived from the input length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaCapacity {
    pub files: usize,
    pub hunks: usize,
    pub lines: usize,
}

impl ArenaCapacity {
    /// Estimate from the buffer size.
    pub fn for_len(bytes: usize) -> Self {
        Self::for_lines(bytes / BYTES_PER_LINE)
    }

    /// Estimate from an expected number of diff lines.
    pub fn for_lines(lines: usize) -> Self {
        let hunks = lines / LINES_PER_HUNK;
        let files = hunks / HUNKS_PER_FILE;
        Self {
            files: files.clamp(MIN_FILES, MAX_FILES),
            hunks: hunks.clamp(MIN_HUNKS, MAX_HUNKS),
            lines: lines.clamp(MIN_LINES, MAX_LINES),
        }
    }
}

// ============================================================================
// Arena
// ============================================================================

#[derive(Debug, Clone)]
pub struct DiffArena<'a> {
    buf: &'a [u8],
    files: Vec<FileRecord>,
    hunks: Vec<HunkRecord>,
    lines: Vec<LineRecord>,
}

impl<'a> DiffArena<'a> {
    /// An arena sized from the length of `buf`.
    pub fn with_capacity_for(buf: &'a [u8]) -> Self {
        Self::with_capacity(buf, ArenaCapacity::for_len(buf.len()))
    }

    pub fn with_capacity(buf: &'a [u8], capacity: ArenaCapacity) -> Self {
        Self {
            buf,
            files: Vec::with_capacity(capacity.files),
            hunks: Vec::with_capacity(capacity.hunks),
            lines: Vec::with_capacity(capacity.lines),
        }
    }

    pub fn source(&self) -> &'a [u8] {
        self.buf
    }

    // ── Mutators ──

    pub fn add_file(
        &mut self,
        status: FileStatus,
        path: ByteRange,
        old_path: Option<ByteRange>,
    ) -> Option<u32> {
        if !path.is_within(self.buf.len()) {
            return None;
        }
        if old_path.is_some_and(|old| !old.is_within(self.buf.len())) {
            return None;
        }
        let index = next_index(self.files.len())?;
        self.files.push(FileRecord {
            status,
            path,
            old_path,
            binary: false,
            first_hunk: next_index(self.hunks.len()).unwrap_or(u32::MAX),
            hunk_count: 0,
            additions: 0,
            deletions: 0,
        });
        Some(index)
    }

    pub fn add_hunk(&mut self, file: u32, range: HunkRange, header: ByteRange) -> Option<u32> {
        if !header.is_within(self.buf.len()) {
            return None;
        }
        let index = next_index(self.hunks.len())?;
        let record = self.files.get_mut(file as usize)?;
        if record.hunk_count == 0 {
            record.first_hunk = index;
        }
        record.hunk_count += 1;

        self.hunks.push(HunkRecord {
            file,
            old_start: range.old_start,
            old_lines: range.old_lines,
            new_start: range.new_start,
            new_lines: range.new_lines,
            header,
            first_line: next_index(self.lines.len()).unwrap_or(u32::MAX),
            line_count: 0,
        });
        Some(index)
    }

    pub fn add_line(
        &mut self,
        kind: LineKind,
        content: ByteRange,
        file: u32,
        hunk: u32,
        new_line: u32,
        old_line: u32,
    ) -> Option<u32> {
        if !content.is_within(self.buf.len()) {
            return None;
        }
        let index = next_index(self.lines.len())?;
        let hunk_record = self.hunks.get_mut(hunk as usize)?;
        if hunk_record.file != file {
            return None;
        }
        let file_record = self.files.get_mut(file as usize)?;

        if hunk_record.line_count == 0 {
            hunk_record.first_line = index;
        }
        hunk_record.line_count += 1;
        match kind {
            LineKind::Addition => file_record.additions += 1,
            LineKind::Deletion => file_record.deletions += 1,
            LineKind::Context => {}
        }

        self.lines.push(LineRecord {
            kind,
            file,
            hunk,
            content,
            new_line,
            old_line,
        });
        Some(index)
    }

    /// Flag a file as binary. Returns `false` when the file does not exist.
    pub fn mark_binary(&mut self, file: u32) -> bool {
        match self.files.get_mut(file as usize) {
            Some(record) => {
                record.binary = true;
                true
            }
            None => false,
        }
    }

    // ── Counts and records ──

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn hunk_count(&self) -> usize {
        self.hunks.len()
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn file(&self, index: u32) -> Option<&FileRecord> {
        self.files.get(index as usize)
    }

    pub fn hunk(&self, index: u32) -> Option<&HunkRecord> {
        self.hunks.get(index as usize)
    }

    pub fn line(&self, index: u32) -> Option<&LineRecord> {
        self.lines.get(index as usize)
    }

    pub fn files(&self) -> &[FileRecord] {
        &self.files
    }

    pub fn hunks(&self) -> &[HunkRecord] {
        &self.hunks
    }

    pub fn lines(&self) -> &[LineRecord] {
        &self.lines
    }

    /// Hunks belonging to `file`, with their indices.
    pub fn hunks_of(&self, file: u32) -> impl Iterator<Item = (u32, &HunkRecord)> + '_ {
        let span = self
            .file(file)
            .map(|f| span_of(f.first_hunk, f.hunk_count, self.hunks.len()))
            .unwrap_or(0..0);
        span.map(move |i| (i as u32, &self.hunks[i]))
    }

    /// Lines belonging to `hunk`, with their indices.
    pub fn lines_of(&self, hunk: u32) -> impl Iterator<Item = (u32, &LineRecord)> + '_ {
        let span = self
            .hunk(hunk)
            .map(|h| span_of(h.first_line, h.line_count, self.lines.len()))
            .unwrap_or(0..0);
        span.map(move |i| (i as u32, &self.lines[i]))
    }

    // ── Text access ──

    pub fn file_status(&self, index: u32) -> Option<FileStatus> {
        self.file(index).map(|f| f.status)
    }

    pub fn file_path_bytes(&self, index: u32) -> Option<&'a [u8]> {
        self.file(index).map(|f| f.path.slice(self.buf))
    }

    pub fn old_file_path_bytes(&self, index: u32) -> Option<&'a [u8]> {
        self.file(index)?.old_path.map(|r| r.slice(self.buf))
    }

    /// Interned path of a file. Repeated calls return the same `Arc`.
    pub fn decode_file_path(&self, index: u32, pool: &mut InternPool) -> Option<Arc<str>> {
        self.file_path_bytes(index).map(|b| pool.intern_bytes(b))
    }

    /// Interned pre-rename path, for renamed files only.
    pub fn decode_old_file_path(&self, index: u32, pool: &mut InternPool) -> Option<Arc<str>> {
        self.old_file_path_bytes(index).map(|b| pool.intern_bytes(b))
    }

    /// Path of a file as a deferred string.
    pub fn lazy_file_path(&self, index: u32) -> Option<LazyStr<'a>> {
        self.file(index).map(|f| LazyStr::new(self.buf, f.path))
    }

    pub fn line_content(&self, index: u32) -> Option<Cow<'a, str>> {
        self.line(index)
            .map(|l| String::from_utf8_lossy(l.content.slice(self.buf)))
    }

    pub fn hunk_header(&self, index: u32) -> Option<Cow<'a, str>> {
        self.hunk(index)
            .map(|h| String::from_utf8_lossy(h.header.slice(self.buf)))
    }

    /// Text after the closing `@@` of a hunk header; empty when absent.
    pub fn hunk_section(&self, index: u32) -> Option<Cow<'a, str>> {
        let header = self.hunk(index)?.header.slice(self.buf);
        let section = hunk_section(header).slice(header);
        Some(String::from_utf8_lossy(section))
    }
}

fn next_index(len: usize) -> Option<u32> {
    u32::try_from(len).ok().filter(|&i| i != u32::MAX)
}

fn span_of(first: u32, count: u32, len: usize) -> std::ops::Range<usize> {
    if count == 0 {
        return 0..0;
    }
    let start = (first as usize).min(len);
    let end = start.saturating_add(count as usize).min(len);
    start..end
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUF: &[u8] = b"src/a.rs\n@@ -1,2 +1,3 @@ fn a()\n+x\n y\n-z\n";

    fn header_range() -> ByteRange {
        ByteRange::new(9, 22)
    }

    fn range() -> HunkRange {
        HunkRange {
            old_start: 1,
            old_lines: 2,
            new_start: 1,
            new_lines: 3,
        }
    }

    #[test]
    fn capacity_scales_and_clamps() {
        let tiny = ArenaCapacity::for_len(0);
        assert_eq!(tiny.files, MIN_FILES);
        assert_eq!(tiny.hunks, MIN_HUNKS);
        assert_eq!(tiny.lines, MIN_LINES);

        let mid = ArenaCapacity::for_len(40 * 6400);
        assert_eq!(mid.lines, 6400);
        assert_eq!(mid.hunks, 400);
        assert_eq!(mid.files, 100);

        let huge = ArenaCapacity::for_len(usize::MAX);
        assert_eq!(huge.lines, MAX_LINES);
        assert_eq!(huge.hunks, MAX_HUNKS);
        assert_eq!(huge.files, MAX_FILES);
    }

    #[test]
    fn indices_are_issued_in_order() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        let f0 = arena.add_file(FileStatus::Modified, ByteRange::new(0, 8), None);
        let f1 = arena.add_file(FileStatus::Added, ByteRange::new(0, 8), None);
        assert_eq!((f0, f1), (Some(0), Some(1)));

        let h0 = arena.add_hunk(1, range(), header_range());
        assert_eq!(h0, Some(0));
        let l0 = arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 1, 0, 1, 1);
        let l1 = arena.add_line(LineKind::Context, ByteRange::new(36, 1), 1, 0, 2, 1);
        assert_eq!((l0, l1), (Some(0), Some(1)));
    }

    #[test]
    fn dangling_references_are_rejected() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        assert_eq!(arena.add_hunk(0, range(), header_range()), None);

        arena.add_file(FileStatus::Modified, ByteRange::new(0, 8), None);
        assert_eq!(arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 0, 0, 1, 1), None);

        arena.add_hunk(0, range(), header_range());
        arena.add_file(FileStatus::Modified, ByteRange::new(0, 8), None);
        // hunk 0 belongs to file 0, not file 1
        assert_eq!(arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 1, 0, 1, 1), None);
        assert_eq!(arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 5, 0, 1, 1), None);

        assert_eq!(arena.line_count(), 0);
        assert_eq!(arena.hunk_count(), 1);
    }

    #[test]
    fn out_of_bounds_ranges_are_rejected() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        let len = BUF.len();
        assert_eq!(arena.add_file(FileStatus::Added, ByteRange::new(len, 1), None), None);
        assert_eq!(
            arena.add_file(
                FileStatus::Renamed,
                ByteRange::new(0, 8),
                Some(ByteRange::new(len - 1, 2))
            ),
            None
        );

        arena.add_file(FileStatus::Modified, ByteRange::new(0, 8), None);
        assert_eq!(arena.add_hunk(0, range(), ByteRange::new(len, 5)), None);
        arena.add_hunk(0, range(), header_range());
        assert_eq!(
            arena.add_line(LineKind::Context, ByteRange::new(len - 1, 3), 0, 0, 1, 1),
            None
        );
        // an empty range at the very end is still inside the buffer
        assert!(arena
            .add_line(LineKind::Context, ByteRange::new(len, 0), 0, 0, 1, 1)
            .is_some());
    }

    #[test]
    fn spans_and_diffstat_track_appends() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        arena.add_file(FileStatus::Modified, ByteRange::new(0, 8), None);
        arena.add_hunk(0, range(), header_range());
        arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 0, 0, 1, 1);
        arena.add_line(LineKind::Context, ByteRange::new(36, 1), 0, 0, 2, 1);
        arena.add_line(LineKind::Deletion, ByteRange::new(39, 1), 0, 0, 3, 2);
        arena.add_hunk(0, range(), header_range());

        let file = arena.file(0).expect("file");
        assert_eq!((file.first_hunk, file.hunk_count), (0, 2));
        assert_eq!((file.additions, file.deletions), (1, 1));

        let hunks: Vec<u32> = arena.hunks_of(0).map(|(i, _)| i).collect();
        assert_eq!(hunks, vec![0, 1]);

        let kinds: Vec<LineKind> = arena.lines_of(0).map(|(_, l)| l.kind).collect();
        assert_eq!(
            kinds,
            vec![LineKind::Addition, LineKind::Context, LineKind::Deletion]
        );
        assert_eq!(arena.lines_of(1).count(), 0);
        assert_eq!(arena.lines_of(9).count(), 0);
        assert_eq!(arena.hunks_of(9).count(), 0);
    }

    #[test]
    fn text_accessors_decode_on_demand() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        arena.add_file(FileStatus::Renamed, ByteRange::new(0, 8), Some(ByteRange::new(4, 4)));
        arena.add_hunk(0, range(), header_range());
        arena.add_line(LineKind::Addition, ByteRange::new(33, 1), 0, 0, 1, 1);

        let mut pool = InternPool::new();
        let first = arena.decode_file_path(0, &mut pool).expect("path");
        let again = arena.decode_file_path(0, &mut pool).expect("path");
        assert_eq!(&*first, "src/a.rs");
        assert!(Arc::ptr_eq(&first, &again));
        assert_eq!(
            arena.decode_old_file_path(0, &mut pool).as_deref(),
            Some("a.rs")
        );

        assert_eq!(arena.hunk_header(0).as_deref(), Some("@@ -1,2 +1,3 @@ fn a()"));
        assert_eq!(arena.hunk_section(0).as_deref(), Some("fn a()"));
        assert_eq!(arena.line_content(0).as_deref(), Some("x"));
        assert_eq!(arena.file_status(0), Some(FileStatus::Renamed));

        let lazy = arena.lazy_file_path(0).expect("lazy");
        assert!(lazy.ends_with(b".rs"));
        assert!(!lazy.is_materialized());

        assert_eq!(arena.decode_file_path(3, &mut pool), None);
        assert_eq!(arena.line_content(3), None);
    }

    #[test]
    fn mark_binary_only_touches_existing_files() {
        let mut arena = DiffArena::with_capacity_for(BUF);
        assert!(!arena.mark_binary(0));
        arena.add_file(FileStatus::Added, ByteRange::new(0, 8), None);
        assert!(arena.mark_binary(0));
        assert!(arena.file(0).expect("file").binary);
    }
}
