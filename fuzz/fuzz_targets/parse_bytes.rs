#![no_main]

use libfuzzer_sys::fuzz_target;

use hunkscan_diff::{parse, LineKind};

fuzz_target!(|data: &[u8]| {
    let mut result = parse(data);
    let arena = result.arena();

    assert_eq!(result.stats().total_bytes as usize, data.len());

    for line in arena.lines() {
        assert!(line.content.is_within(data.len()));
        assert!((line.hunk as usize) < arena.hunk_count());
    }
    for hunk in arena.hunks() {
        assert!((hunk.file as usize) < arena.file_count());
    }
    for (index, file) in arena.files().iter().enumerate() {
        let additions = arena
            .hunks_of(index as u32)
            .flat_map(|(h, _)| arena.lines_of(h))
            .filter(|(_, l)| l.kind == LineKind::Addition)
            .count();
        assert_eq!(additions as u32, file.additions);
    }

    for i in 0..result.file_count() as u32 {
        let _ = result.decode_file_path(i);
        let _ = result.decode_old_file_path(i);
    }
});
