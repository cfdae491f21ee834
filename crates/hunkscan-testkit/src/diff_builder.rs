//! Unified diff builders for constructing test diffs.
//!
//! The builders write git-shaped diffs and know what a correct parse of
//! their output looks like, so property tests can compare the parser's
//! counts, statuses and paths against [`GeneratedDiff`] expectations.
//!
//! Hunk headers carry the counts of the lines actually added to the hunk
//! unless explicit counts are given.
//!
//! # Bounds
//!
//! To keep tests fast, the following bounds are enforced:
//! - Max files per diff: 5
//! - Max hunks per file: 5
//! - Max lines per hunk: 20
//! - Max line length: 200 bytes
//!
//! # Example
//!
//! ```rust
//! use hunkscan_testkit::diff_builder::DiffBuilder;
//!
//! let diff = DiffBuilder::new()
//!     .file("src/lib.rs")
//!         .hunk_at(1, 1)
//!             .context("fn existing() {}")
//!             .add_line("fn new_function() {}")
//!             .done()
//!         .done()
//!     .build();
//!
//! assert!(diff.contains("@@ -1,1 +1,2 @@"));
//! assert!(diff.contains("+fn new_function() {}"));
//! ```

use hunkscan_types::{FileStatus, LineKind};

use crate::arb::{MAX_FILES, MAX_HUNKS_PER_FILE, MAX_LINE_LENGTH, MAX_LINES_PER_HUNK};

/// A builder for constructing unified diff strings.
#[derive(Debug, Clone, Default)]
pub struct DiffBuilder {
    files: Vec<FileBuilder>,
}

impl DiffBuilder {
    pub fn new() -> Self {
        Self { files: Vec::new() }
    }

    /// Add a file to the diff and return a file builder.
    ///
    /// # Panics
    ///
    /// Panics if MAX_FILES would be exceeded.
    pub fn file(self, path: &str) -> FileBuilderInProgress {
        assert!(
            self.files.len() < MAX_FILES,
            "Cannot add more than {} files to a diff",
            MAX_FILES
        );
        FileBuilderInProgress {
            diff_builder: self,
            file_builder: FileBuilder::new(path),
        }
    }

    /// Add a pre-built file to the diff.
    pub fn add_file(mut self, file: FileBuilder) -> Self {
        assert!(
            self.files.len() < MAX_FILES,
            "Cannot add more than {} files to a diff",
            MAX_FILES
        );
        self.files.push(file);
        self
    }

    pub fn files(&self) -> &[FileBuilder] {
        &self.files
    }

    /// Build the complete diff text.
    pub fn build(&self) -> String {
        self.files.iter().map(FileBuilder::build).collect()
    }

    /// Build the diff text along with what a parser should find in it.
    pub fn generate(&self) -> GeneratedDiff {
        let hunks: Vec<&HunkBuilder> = self.files.iter().flat_map(|f| &f.hunks).collect();
        GeneratedDiff {
            text: self.build(),
            expected_files: self.files.len(),
            expected_hunks: hunks.len(),
            expected_lines: hunks.iter().map(|h| h.lines.len()).sum(),
            expected_additions: hunks.iter().map(|h| h.count(LineKind::Addition)).sum(),
            expected_deletions: hunks.iter().map(|h| h.count(LineKind::Deletion)).sum(),
            file_paths: self.files.iter().map(|f| f.path.clone()).collect(),
            statuses: self.files.iter().map(FileBuilder::expected_status).collect(),
        }
    }
}

/// Helper struct for building a file within a diff.
#[derive(Debug)]
pub struct FileBuilderInProgress {
    diff_builder: DiffBuilder,
    file_builder: FileBuilder,
}

impl FileBuilderInProgress {
    /// Add a hunk with explicit header counts.
    pub fn hunk(
        self,
        old_start: u32,
        old_count: u32,
        new_start: u32,
        new_count: u32,
    ) -> HunkBuilderInProgress {
        HunkBuilderInProgress {
            file_in_progress: self,
            hunk_builder: HunkBuilder::new(old_start, old_count, new_start, new_count),
        }
    }

    /// Add a hunk whose header counts follow its lines.
    pub fn hunk_at(self, old_start: u32, new_start: u32) -> HunkBuilderInProgress {
        HunkBuilderInProgress {
            file_in_progress: self,
            hunk_builder: HunkBuilder::at(old_start, new_start),
        }
    }

    /// Add a pre-built hunk directly.
    pub fn add_hunk(mut self, hunk: HunkBuilder) -> Self {
        self.file_builder = self.file_builder.add_hunk(hunk);
        self
    }

    pub fn binary(mut self) -> Self {
        self.file_builder = self.file_builder.binary();
        self
    }

    pub fn deleted(mut self) -> Self {
        self.file_builder = self.file_builder.deleted();
        self
    }

    pub fn new_file(mut self) -> Self {
        self.file_builder = self.file_builder.new_file();
        self
    }

    pub fn mode_change(mut self, old_mode: &str, new_mode: &str) -> Self {
        self.file_builder = self.file_builder.mode_change(old_mode, new_mode);
        self
    }

    pub fn rename_from(mut self, old_path: &str) -> Self {
        self.file_builder = self.file_builder.rename_from(old_path);
        self
    }

    /// Finish this file and return to the diff builder.
    pub fn done(self) -> DiffBuilder {
        self.diff_builder.add_file(self.file_builder)
    }
}

/// Helper struct for building a hunk within a file.
#[derive(Debug)]
pub struct HunkBuilderInProgress {
    file_in_progress: FileBuilderInProgress,
    hunk_builder: HunkBuilder,
}

impl HunkBuilderInProgress {
    pub fn context(mut self, content: &str) -> Self {
        self.hunk_builder = self.hunk_builder.context(content);
        self
    }

    pub fn add_line(mut self, content: &str) -> Self {
        self.hunk_builder = self.hunk_builder.add_line(content);
        self
    }

    pub fn remove(mut self, content: &str) -> Self {
        self.hunk_builder = self.hunk_builder.remove(content);
        self
    }

    pub fn add_lines(mut self, lines: &[&str]) -> Self {
        self.hunk_builder = self.hunk_builder.add_lines(lines);
        self
    }

    /// Finish this hunk and return to the file builder.
    pub fn done(self) -> FileBuilderInProgress {
        self.file_in_progress.add_hunk(self.hunk_builder)
    }
}

/// A builder for a single file in a diff.
#[derive(Debug, Clone)]
pub struct FileBuilder {
    path: String,
    old_path: Option<String>,
    hunks: Vec<HunkBuilder>,
    is_binary: bool,
    is_deleted: bool,
    is_new_file: bool,
    modes: Option<(String, String)>,
}

impl FileBuilder {
    pub fn new(path: &str) -> Self {
        Self {
            path: path.to_string(),
            old_path: None,
            hunks: Vec::new(),
            is_binary: false,
            is_deleted: false,
            is_new_file: false,
            modes: None,
        }
    }

    pub fn binary(mut self) -> Self {
        self.is_binary = true;
        self
    }

    pub fn deleted(mut self) -> Self {
        self.is_deleted = true;
        self.is_new_file = false;
        self
    }

    pub fn new_file(mut self) -> Self {
        self.is_new_file = true;
        self.is_deleted = false;
        self
    }

    pub fn mode_change(mut self, old_mode: &str, new_mode: &str) -> Self {
        self.modes = Some((old_mode.to_string(), new_mode.to_string()));
        self
    }

    pub fn rename_from(mut self, old_path: &str) -> Self {
        self.old_path = Some(old_path.to_string());
        self
    }

    /// # Panics
    ///
    /// Panics if MAX_HUNKS_PER_FILE would be exceeded.
    pub fn add_hunk(mut self, hunk: HunkBuilder) -> Self {
        assert!(
            self.hunks.len() < MAX_HUNKS_PER_FILE,
            "Cannot add more than {} hunks to a file",
            MAX_HUNKS_PER_FILE
        );
        self.hunks.push(hunk);
        self
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn hunks(&self) -> &[HunkBuilder] {
        &self.hunks
    }

    pub fn is_binary(&self) -> bool {
        self.is_binary
    }

    /// The status a correct parser assigns to this file.
    pub fn expected_status(&self) -> FileStatus {
        if self.is_new_file {
            FileStatus::Added
        } else if self.is_deleted {
            FileStatus::Deleted
        } else if self.old_path.as_deref().is_some_and(|old| old != self.path) {
            FileStatus::Renamed
        } else {
            FileStatus::Modified
        }
    }

    /// Build the diff text for this file, newline-terminated.
    ///
    /// Like git, `---`/`+++` lines are only written when there is textual
    /// content to show.
    pub fn build(&self) -> String {
        let a_path = self.old_path.as_deref().unwrap_or(&self.path);
        let b_path = &self.path;

        let mut lines = vec![format!("diff --git a/{} b/{}", a_path, b_path)];

        if let Some((old_mode, new_mode)) = &self.modes {
            lines.push(format!("old mode {}", old_mode));
            lines.push(format!("new mode {}", new_mode));
        }
        if self.is_new_file {
            lines.push("new file mode 100644".to_string());
            lines.push("index 0000000..1111111".to_string());
        } else if self.is_deleted {
            lines.push("deleted file mode 100644".to_string());
            lines.push("index 1111111..0000000".to_string());
        }
        if let Some(old) = &self.old_path {
            lines.push("similarity index 90%".to_string());
            lines.push(format!("rename from {}", old));
            lines.push(format!("rename to {}", b_path));
        }
        if !self.is_new_file && !self.is_deleted && (self.is_binary || !self.hunks.is_empty()) {
            lines.push("index 1111111..2222222 100644".to_string());
        }

        let old_marker = if self.is_new_file {
            "/dev/null".to_string()
        } else {
            format!("a/{}", a_path)
        };
        let new_marker = if self.is_deleted {
            "/dev/null".to_string()
        } else {
            format!("b/{}", b_path)
        };

        if self.is_binary {
            lines.push(format!("Binary files {} and {} differ", old_marker, new_marker));
        } else if !self.hunks.is_empty() {
            lines.push(format!("--- {}", old_marker));
            lines.push(format!("+++ {}", new_marker));
            lines.extend(self.hunks.iter().map(HunkBuilder::build));
        }

        let mut out = lines.join("\n");
        out.push('\n');
        out
    }
}

/// A builder for a hunk within a file diff.
#[derive(Debug, Clone)]
pub struct HunkBuilder {
    old_start: u32,
    new_start: u32,
    counts: Option<(u32, u32)>,
    lines: Vec<(LineKind, String)>,
}

impl HunkBuilder {
    /// A hunk with explicit header counts.
    pub fn new(old_start: u32, old_count: u32, new_start: u32, new_count: u32) -> Self {
        Self {
            old_start,
            new_start,
            counts: Some((old_count, new_count)),
            lines: Vec::new(),
        }
    }

    /// A hunk whose header counts are derived from its lines.
    pub fn at(old_start: u32, new_start: u32) -> Self {
        Self {
            old_start,
            new_start,
            counts: None,
            lines: Vec::new(),
        }
    }

    /// # Panics
    ///
    /// Panics if MAX_LINES_PER_HUNK or MAX_LINE_LENGTH would be exceeded.
    pub fn line(mut self, kind: LineKind, content: &str) -> Self {
        assert!(
            self.lines.len() < MAX_LINES_PER_HUNK,
            "Cannot add more than {} lines to a hunk",
            MAX_LINES_PER_HUNK
        );
        assert!(
            content.len() <= MAX_LINE_LENGTH,
            "Line content cannot exceed {} bytes",
            MAX_LINE_LENGTH
        );
        assert!(
            !content.contains('\n'),
            "Line content cannot contain a newline"
        );
        self.lines.push((kind, content.to_string()));
        self
    }

    pub fn context(self, content: &str) -> Self {
        self.line(LineKind::Context, content)
    }

    pub fn add_line(self, content: &str) -> Self {
        self.line(LineKind::Addition, content)
    }

    pub fn remove(self, content: &str) -> Self {
        self.line(LineKind::Deletion, content)
    }

    pub fn add_lines(mut self, lines: &[&str]) -> Self {
        for line in lines {
            self = self.add_line(line);
        }
        self
    }

    pub fn remove_lines(mut self, lines: &[&str]) -> Self {
        for line in lines {
            self = self.remove(line);
        }
        self
    }

    pub fn lines(&self) -> &[(LineKind, String)] {
        &self.lines
    }

    pub fn old_start(&self) -> u32 {
        self.old_start
    }

    pub fn new_start(&self) -> u32 {
        self.new_start
    }

    /// Old-side count written in the header.
    pub fn old_count(&self) -> u32 {
        match self.counts {
            Some((old, _)) => old,
            None => (self.count(LineKind::Deletion) + self.count(LineKind::Context)) as u32,
        }
    }

    /// New-side count written in the header.
    pub fn new_count(&self) -> u32 {
        match self.counts {
            Some((_, new)) => new,
            None => (self.count(LineKind::Addition) + self.count(LineKind::Context)) as u32,
        }
    }

    fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|(k, _)| *k == kind).count()
    }

    pub fn build(&self) -> String {
        let mut output = vec![format!(
            "@@ -{},{} +{},{} @@",
            self.old_start,
            self.old_count(),
            self.new_start,
            self.new_count()
        )];
        output.extend(self.lines.iter().map(|(kind, content)| {
            format!("{}{}", char::from(kind.marker()), content)
        }));
        output.join("\n")
    }
}

/// A generated diff with what its parse should produce.
#[derive(Debug, Clone)]
pub struct GeneratedDiff {
    pub text: String,
    pub expected_files: usize,
    pub expected_hunks: usize,
    pub expected_lines: usize,
    pub expected_additions: usize,
    pub expected_deletions: usize,
    /// New path of every file, in order.
    pub file_paths: Vec<String>,
    pub statuses: Vec<FileStatus>,
}

impl GeneratedDiff {
    /// One file with a single hunk of added lines.
    pub fn with_additions(path: &str, lines: &[&str]) -> Self {
        DiffBuilder::new()
            .file(path)
            .hunk_at(0, 1)
            .add_lines(lines)
            .done()
            .done()
            .generate()
    }

    /// One file with a single hunk replacing `removed` with `added`.
    pub fn with_changes(path: &str, removed: &[&str], added: &[&str]) -> Self {
        let hunk = HunkBuilder::at(1, 1).remove_lines(removed).add_lines(added);
        DiffBuilder::new().file(path).add_hunk(hunk).done().generate()
    }

    pub fn binary(path: &str) -> Self {
        DiffBuilder::new().file(path).binary().done().generate()
    }

    pub fn deleted(path: &str, removed_lines: &[&str]) -> Self {
        let file = FileBuilder::new(path)
            .deleted()
            .add_hunk(HunkBuilder::new(1, removed_lines.len() as u32, 0, 0).remove_lines(removed_lines));
        DiffBuilder::new().add_file(file).generate()
    }

    pub fn renamed(old_path: &str, new_path: &str, added_lines: &[&str]) -> Self {
        let mut file = FileBuilder::new(new_path).rename_from(old_path);
        if !added_lines.is_empty() {
            file = file.add_hunk(
                HunkBuilder::at(1, 1)
                    .context("fn existing() {}")
                    .add_lines(added_lines),
            );
        }
        DiffBuilder::new().add_file(file).generate()
    }
}
