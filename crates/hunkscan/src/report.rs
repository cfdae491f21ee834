use std::borrow::BorrowMut;
use std::sync::Arc;

use hunkscan_diff::{InternPool, ParseResult};
use hunkscan_types::{
    DiffReport, FileStatus, FileSummary, HunkSummary, LineKind, LineSummary, ToolMeta,
    REPORT_SCHEMA_V1,
};

/// Turn a parse result into an owned report.
///
/// Paths go through the result's intern pool, so the pool statistics in the
/// report include the lookups this function makes.
pub fn build_report<P: BorrowMut<InternPool>>(
    result: &mut ParseResult<'_, P>,
    include_lines: bool,
) -> DiffReport {
    let paths: Vec<(Option<Arc<str>>, Option<Arc<str>>)> = (0..result.file_count() as u32)
        .map(|i| (result.decode_file_path(i), result.decode_old_file_path(i)))
        .collect();

    let arena = result.arena();
    let files = arena
        .files()
        .iter()
        .zip(paths)
        .enumerate()
        .map(|(index, (file, (path, old_path)))| {
            let hunks = arena
                .hunks_of(index as u32)
                .map(|(hunk_index, hunk)| {
                    let lines = if include_lines {
                        arena
                            .lines_of(hunk_index)
                            .map(|(line_index, line)| LineSummary {
                                kind: line.kind,
                                old_line: line.old_line,
                                new_line: line.new_line,
                                content: arena
                                    .line_content(line_index)
                                    .map(|c| c.into_owned())
                                    .unwrap_or_default(),
                            })
                            .collect()
                    } else {
                        Vec::new()
                    };

                    HunkSummary {
                        header: arena
                            .hunk_header(hunk_index)
                            .map(|h| h.into_owned())
                            .unwrap_or_default(),
                        section: arena.hunk_section(hunk_index).map(|s| s.into_owned()),
                        old_start: hunk.old_start,
                        old_lines: hunk.old_lines,
                        new_start: hunk.new_start,
                        new_lines: hunk.new_lines,
                        lines,
                    }
                })
                .collect();

            FileSummary {
                path: path.as_deref().unwrap_or_default().to_string(),
                old_path: old_path.map(|p| p.to_string()),
                status: file.status,
                binary: file.binary,
                additions: file.additions,
                deletions: file.deletions,
                hunks,
            }
        })
        .collect();

    DiffReport {
        schema: REPORT_SCHEMA_V1.to_string(),
        tool: ToolMeta {
            name: "hunkscan".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
        stats: result.stats().clone(),
        intern: result.pool().stats(),
        files,
    }
}

/// Human-readable rendering: one block per file, hunks indented below it.
pub fn render_text(report: &DiffReport) -> String {
    let mut out = String::new();

    if report.files.is_empty() {
        out.push_str("No changes.\n");
    }

    for file in &report.files {
        match &file.old_path {
            Some(old) => out.push_str(&format!(
                "{} {} -> {}",
                file.status.code(),
                old,
                file.path
            )),
            None => out.push_str(&format!("{} {}", file.status.code(), file.path)),
        }
        if file.binary {
            out.push_str(" (binary)");
        } else {
            out.push_str(&format!(" (+{} -{})", file.additions, file.deletions));
        }
        out.push('\n');

        for hunk in &file.hunks {
            out.push_str(&format!("  {}\n", hunk.header));
            for line in &hunk.lines {
                out.push_str(&render_line(line));
            }
        }
    }

    let stats = &report.stats;
    out.push_str(&format!(
        "\n{} file(s), {} hunk(s), {} line(s) in {:.3}ms; intern hit rate {:.1}%\n",
        stats.files_found,
        stats.hunks_found,
        stats.lines_found,
        stats.parse_time_ms,
        report.intern.hit_rate() * 100.0
    ));
    out
}

fn render_line(line: &LineSummary) -> String {
    let number = |n: u32| {
        if n == 0 {
            String::new()
        } else {
            n.to_string()
        }
    };
    let (old, new) = match line.kind {
        LineKind::Addition => (String::new(), number(line.new_line)),
        LineKind::Deletion => (number(line.old_line), String::new()),
        LineKind::Context => (number(line.old_line), number(line.new_line)),
    };
    format!(
        "  {old:>5} {new:>5} {}{}\n",
        line.kind.marker() as char,
        line.content
    )
}

/// `git diff --name-status` style listing.
pub fn render_name_status(report: &DiffReport) -> String {
    let mut out = String::new();
    for file in &report.files {
        match (&file.old_path, file.status) {
            (Some(old), FileStatus::Renamed) => {
                out.push_str(&format!("R\t{}\t{}\n", old, file.path));
            }
            (_, status) => out.push_str(&format!("{}\t{}\n", status.code(), file.path)),
        }
    }
    out
}
