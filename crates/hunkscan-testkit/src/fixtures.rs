//! Common test fixtures for hunkscan.
//!
//! Sample configs and diffs shared by unit, property and CLI tests. Every
//! diff mirrors the shape real `git diff` output takes for that case.

use hunkscan_types::{ConfigFile, Defaults, InternConfig, OutputFormat};

// =============================================================================
// Sample Configs
// =============================================================================

pub mod sample_configs {
    use super::*;

    /// An empty configuration with default values.
    pub fn empty() -> ConfigFile {
        ConfigFile::default()
    }

    /// Text output with per-line records and a couple of seeded paths.
    pub fn text_with_lines() -> ConfigFile {
        ConfigFile {
            defaults: Defaults {
                format: Some(OutputFormat::Text),
                include_lines: Some(true),
                shared_pool: Some(false),
                capacity_hint: Some(4096),
            },
            intern: InternConfig {
                seed_paths: vec!["src/main.rs".to_string(), "src/lib.rs".to_string()],
            },
        }
    }

    /// The same configuration as [`text_with_lines`] in TOML form.
    pub fn text_with_lines_toml() -> &'static str {
        r#"[defaults]
format = "text"
include_lines = true
shared_pool = false
capacity_hint = 4096

[intern]
seed_paths = ["src/main.rs", "src/lib.rs"]
"#
    }
}

// =============================================================================
// Sample Diffs
// =============================================================================

pub mod sample_diffs {
    /// One modified file: 1 hunk, 1 context, 1 deletion, 2 additions.
    pub fn single_file() -> &'static str {
        r#"diff --git a/x.ts b/x.ts
--- a/x.ts
+++ b/x.ts
@@ -1,2 +1,3 @@
 unchanged
-removed
+added1
+added2
"#
    }

    /// A diff with multiple files.
    pub fn multiple_files() -> &'static str {
        r#"diff --git a/src/a.rs b/src/a.rs
index 0000000..1111111 100644
--- a/src/a.rs
+++ b/src/a.rs
@@ -1,1 +1,2 @@
 fn a() {}
+fn a_new() {}
diff --git a/src/b.rs b/src/b.rs
index 0000000..1111111 100644
--- a/src/b.rs
+++ b/src/b.rs
@@ -1,1 +1,2 @@
 fn b() {}
+fn b_new() {}
"#
    }

    /// A diff with multiple hunks in one file, with section headings.
    pub fn multiple_hunks() -> &'static str {
        r#"diff --git a/src/lib.rs b/src/lib.rs
index 0000000..1111111 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,2 +1,3 @@ mod first
 fn first() {}
+fn after_first() {}
 fn second() {}
@@ -10,2 +11,3 @@ impl Tenth {
 fn tenth() {}
+fn after_tenth() {}
 fn eleventh() {}
"#
    }

    /// A new file and a deleted file.
    pub fn added_and_deleted() -> &'static str {
        r#"diff --git a/old.rs b/old.rs
deleted file mode 100644
index 1111111..0000000
--- a/old.rs
+++ /dev/null
@@ -1,2 +0,0 @@
-fn old() {}
-fn deprecated() {}
diff --git a/new.rs b/new.rs
new file mode 100644
index 0000000..1111111
--- /dev/null
+++ b/new.rs
@@ -0,0 +1 @@
+fn new() {}
"#
    }

    /// A renamed file with a content change.
    pub fn renamed_file() -> &'static str {
        r#"diff --git a/old/path.rs b/new/path.rs
similarity index 90%
rename from old/path.rs
rename to new/path.rs
index 0000000..1111111 100644
--- a/old/path.rs
+++ b/new/path.rs
@@ -1,1 +1,2 @@
 fn existing() {}
+fn added_after_rename() {}
"#
    }

    /// A pure rename: git writes no `---`/`+++` lines.
    pub fn pure_rename() -> &'static str {
        r#"diff --git a/docs/old guide.md b/docs/new guide.md
similarity index 100%
rename from docs/old guide.md
rename to docs/new guide.md
"#
    }

    /// A binary file followed by a text file.
    pub fn binary_file() -> &'static str {
        r#"diff --git a/image.png b/image.png
index 0000000..1111111 100644
Binary files a/image.png and b/image.png differ
diff --git a/src/lib.rs b/src/lib.rs
index 0000000..1111111 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,1 +1,2 @@
 fn existing() {}
+fn new_function() {}
"#
    }

    /// A mode-only change followed by a text file.
    pub fn mode_change() -> &'static str {
        r#"diff --git a/script.sh b/script.sh
old mode 100644
new mode 100755
diff --git a/src/lib.rs b/src/lib.rs
index 0000000..1111111 100644
--- a/src/lib.rs
+++ b/src/lib.rs
@@ -1,1 +1,2 @@
 fn existing() {}
+fn new_function() {}
"#
    }

    /// A hunk header before any file, then a well-formed file.
    pub fn orphan_hunk() -> &'static str {
        r#"@@ -1,1 +1,1 @@
-lost
+also lost
diff --git a/kept.rs b/kept.rs
--- a/kept.rs
+++ b/kept.rs
@@ -5 +10 @@
-old
+new
"#
    }

    /// SQL comments that look like file markers inside a hunk.
    pub fn sql_comments() -> &'static str {
        r#"diff --git a/migrations/001.sql b/migrations/001.sql
--- a/migrations/001.sql
+++ b/migrations/001.sql
@@ -1,3 +1,3 @@
--- drop the old table
+++ keep the old table
 CREATE TABLE users (id INT);
 -- trailing comment
"#
    }

    /// Plain `diff -u` output with timestamps and no `diff --git` lines.
    pub fn plain_unified() -> &'static str {
        "--- a.txt\t2024-01-01 10:00:00.000000000 +0000\n\
         +++ a.txt\t2024-01-02 10:00:00.000000000 +0000\n\
         @@ -1 +1 @@\n\
         -one\n\
         +two\n"
    }

    /// A diff with Unicode content.
    pub fn unicode_content() -> &'static str {
        r#"diff --git a/src/i18n.rs b/src/i18n.rs
index 0000000..1111111 100644
--- a/src/i18n.rs
+++ b/src/i18n.rs
@@ -1,1 +1,4 @@
 fn greet() {}
+let hello_jp = "こんにちは";
+let hello_cn = "你好";
+let hello_kr = "안녕하세요";
"#
    }

    /// An empty diff (no changes).
    pub fn empty() -> &'static str {
        ""
    }
}
