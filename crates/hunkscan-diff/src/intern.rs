//! String interning for decoded paths.
//!
//! A diff repeats the same handful of paths across hundreds of hunks. The
//! pool maps byte ranges to one canonical `Arc<str>` per distinct content so
//! each path is decoded and allocated once.
//!
//! Buckets are keyed by a 32-bit FNV-1a hash of the raw bytes, so a lookup
//! never has to decode. Entries within a bucket are compared byte-for-byte;
//! a hash collision between different contents simply lands a second entry
//! in the same bucket.
//!
//! The pool is not synchronized. [`shared_pool`] wraps a process-wide
//! instance in a `Mutex` for callers that want to amortize interning across
//! many parses; everyone else should pass an owned pool.

use std::cell::OnceCell;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use hunkscan_types::InternStats;
use rustc_hash::FxHashMap;
use tracing::trace;

use crate::scanner::ByteRange;

const FNV_OFFSET_BASIS: u32 = 0x811c_9dc5;
const FNV_PRIME: u32 = 0x0100_0193;

/// Paths seeded into every pool so the first diff touching them is a hit.
pub const COMMON_PATHS: &[&str] = &[
    "/dev/null",
    "package.json",
    "package-lock.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "Cargo.toml",
    "Cargo.lock",
    "go.mod",
    "go.sum",
    "requirements.txt",
    "pyproject.toml",
    "poetry.lock",
    "Pipfile.lock",
    "Gemfile",
    "Gemfile.lock",
    "composer.json",
    "composer.lock",
    "pom.xml",
    "build.gradle",
    "tsconfig.json",
    "Dockerfile",
    "README.md",
    ".gitignore",
];

/// 32-bit FNV-1a over raw bytes.
#[inline]
pub fn fnv1a_32(bytes: &[u8]) -> u32 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u32::from(b)).wrapping_mul(FNV_PRIME)
    })
}

#[derive(Debug, Clone)]
pub struct InternPool {
    table: FxHashMap<u32, Vec<Arc<str>>>,
    extra_seeds: Vec<String>,
    unique: usize,
    hits: u64,
    misses: u64,
    collisions: u64,
}

impl Default for InternPool {
    fn default() -> Self {
        Self::new()
    }
}

impl InternPool {
    /// A pool pre-populated with [`COMMON_PATHS`], counters at zero.
    pub fn new() -> Self {
        Self::with_seeds(Vec::<String>::new())
    }

    /// Like [`InternPool::new`] plus project-specific seed paths.
    /// The extra seeds survive [`InternPool::clear`].
    pub fn with_seeds<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut pool = Self {
            table: FxHashMap::with_capacity_and_hasher(
                COMMON_PATHS.len() * 2,
                Default::default(),
            ),
            extra_seeds: extra.into_iter().map(Into::into).collect(),
            unique: 0,
            hits: 0,
            misses: 0,
            collisions: 0,
        };
        pool.seed();
        pool
    }

    /// Canonical string for `buf[start..start + len]` (clamped to the buffer).
    pub fn intern_from_bytes(&mut self, buf: &[u8], start: usize, len: usize) -> Arc<str> {
        self.intern_bytes(ByteRange::new(start, len).slice(buf))
    }

    /// Canonical string for raw bytes. Invalid UTF-8 is decoded lossily.
    pub fn intern_bytes(&mut self, bytes: &[u8]) -> Arc<str> {
        self.intern_hashed(fnv1a_32(bytes), bytes)
    }

    /// Canonical string for already-materialized text.
    pub fn intern(&mut self, s: &str) -> Arc<str> {
        self.intern_bytes(s.as_bytes())
    }

    /// Membership test that never inserts and never touches the counters.
    pub fn has(&self, s: &str) -> bool {
        self.table
            .get(&fnv1a_32(s.as_bytes()))
            .is_some_and(|bucket| bucket.iter().any(|entry| entry.as_ref() == s))
    }

    pub fn stats(&self) -> InternStats {
        InternStats {
            hits: self.hits,
            misses: self.misses,
            collisions: self.collisions,
            buckets: self.table.len() as u64,
            unique: self.unique as u64,
        }
    }

    /// Number of canonical strings stored.
    pub fn len(&self) -> usize {
        self.unique
    }

    pub fn is_empty(&self) -> bool {
        self.unique == 0
    }

    /// Drop every entry and counter, then re-seed.
    pub fn clear(&mut self) {
        trace!(
            "clearing intern pool ({} strings, {} hits, {} misses)",
            self.unique,
            self.hits,
            self.misses
        );
        self.table.clear();
        self.unique = 0;
        self.seed();
    }

    fn intern_hashed(&mut self, hash: u32, bytes: &[u8]) -> Arc<str> {
        let bucket = self.table.entry(hash).or_default();
        if let Some(existing) = find_in_bucket(bucket, bytes) {
            self.hits += 1;
            return Arc::clone(existing);
        }

        let collided = !bucket.is_empty();
        let value: Arc<str> = Arc::from(String::from_utf8_lossy(bytes));
        bucket.push(Arc::clone(&value));

        self.unique += 1;
        self.misses += 1;
        if collided {
            self.collisions += 1;
        }
        value
    }

    fn seed(&mut self) {
        for path in COMMON_PATHS {
            self.intern_bytes(path.as_bytes());
        }
        let extra = std::mem::take(&mut self.extra_seeds);
        for path in &extra {
            self.intern_bytes(path.as_bytes());
        }
        self.extra_seeds = extra;

        self.hits = 0;
        self.misses = 0;
        self.collisions = 0;
    }
}

fn find_in_bucket<'b>(bucket: &'b [Arc<str>], bytes: &[u8]) -> Option<&'b Arc<str>> {
    if let Some(found) = bucket.iter().find(|entry| entry.as_bytes() == bytes) {
        return Some(found);
    }
    // Stored values are lossy decodes; raw bytes that are not UTF-8 can only
    // match through the same decode.
    if std::str::from_utf8(bytes).is_ok() {
        return None;
    }
    let decoded = String::from_utf8_lossy(bytes);
    bucket
        .iter()
        .find(|entry| entry.as_ref() == decoded.as_ref())
}

// ============================================================================
// Deferred materialization
// ============================================================================

/// A borrowed byte range that turns into an interned string on first use.
///
/// Comparisons run on the raw bytes while nothing has been materialized, so
/// filtering (`ends_with(b".ts")`) costs no allocation.
#[derive(Debug, Clone)]
pub struct LazyStr<'a> {
    buf: &'a [u8],
    range: ByteRange,
    cached: OnceCell<Arc<str>>,
}

impl<'a> LazyStr<'a> {
    /// The range is clamped to the buffer.
    pub fn new(buf: &'a [u8], range: ByteRange) -> Self {
        let start = range.start.min(buf.len());
        let end = range.end().min(buf.len());
        Self {
            buf,
            range: ByteRange::from_bounds(start, end),
            cached: OnceCell::new(),
        }
    }

    pub fn range(&self) -> ByteRange {
        self.range
    }

    pub fn len(&self) -> usize {
        self.range.len
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn as_bytes(&self) -> &'a [u8] {
        self.range.slice(self.buf)
    }

    pub fn is_materialized(&self) -> bool {
        self.cached.get().is_some()
    }

    /// The cached value, if [`LazyStr::value`] has run.
    pub fn cached(&self) -> Option<&Arc<str>> {
        self.cached.get()
    }

    /// Intern through `pool` on first call; later calls return the cache.
    pub fn value(&self, pool: &mut InternPool) -> Arc<str> {
        Arc::clone(
            self.cached
                .get_or_init(|| pool.intern_bytes(self.range.slice(self.buf))),
        )
    }

    pub fn equals(&self, other: &[u8]) -> bool {
        self.compared_bytes() == other
    }

    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.compared_bytes().starts_with(prefix)
    }

    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.compared_bytes().ends_with(suffix)
    }

    fn compared_bytes(&self) -> &[u8] {
        match self.cached.get() {
            Some(value) => value.as_bytes(),
            None => self.as_bytes(),
        }
    }
}

// ============================================================================
// Process-wide pool
// ============================================================================

static SHARED_POOL: OnceLock<Mutex<InternPool>> = OnceLock::new();

/// The process-wide pool, built on first use.
pub fn shared_pool() -> &'static Mutex<InternPool> {
    SHARED_POOL.get_or_init(|| Mutex::new(InternPool::new()))
}

/// Run `f` with exclusive access to the process-wide pool.
///
/// A poisoned lock is recovered: the pool holds no invariant a panicking
/// holder could have broken halfway.
pub fn with_shared_pool<R>(f: impl FnOnce(&mut InternPool) -> R) -> R {
    let mut guard = shared_pool()
        .lock()
        .unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

/// Clear the process-wide pool (table and counters).
pub fn reset_shared_pool() {
    with_shared_pool(InternPool::clear);
}
