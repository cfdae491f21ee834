//! Zero-copy unified diff parsing.
//!
//! `git diff` bytes go in, an index-addressed [`DiffArena`] of files, hunks
//! and lines comes out. Nothing is decoded during the parse; paths and line
//! text are materialized on demand through an [`InternPool`] that hands out
//! one shared `Arc<str>` per distinct path.
//!
//! ```
//! let diff = b"--- a/x.ts\n+++ b/x.ts\n@@ -1 +1 @@\n-old\n+new\n";
//! let mut result = hunkscan_diff::parse(diff);
//! assert_eq!(result.file_count(), 1);
//! assert_eq!(result.decode_file_path(0).as_deref(), Some("x.ts"));
//! ```

pub mod arena;
pub mod intern;
pub mod parser;
pub mod scanner;

pub use arena::{ArenaCapacity, DiffArena, FileRecord, HunkRecord, LineRecord};
pub use hunkscan_types::{FileStatus, InternStats, LineKind, ParseStats};
pub use intern::{
    fnv1a_32, reset_shared_pool, shared_pool, with_shared_pool, InternPool, LazyStr,
    COMMON_PATHS,
};
pub use parser::{
    determine_file_status, parse, parse_str, parse_with_pool, ParseOptions, ParseResult, Parser,
    ParserState,
};
pub use scanner::{
    parse_hunk_header, ByteRange, HunkRange, PathRef, ScanToken, Scanner, TokenKind, DEV_NULL,
};
