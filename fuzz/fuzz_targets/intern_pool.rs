#![no_main]

use std::sync::Arc;

use libfuzzer_sys::fuzz_target;

use hunkscan_diff::InternPool;

fuzz_target!(|data: &[u8]| {
    let mut pool = InternPool::new();
    let pieces: Vec<&[u8]> = data.split(|b| *b == b'\n').collect();

    let first: Vec<Arc<str>> = pieces.iter().map(|p| pool.intern_bytes(p)).collect();
    let unique = pool.len();
    let second: Vec<Arc<str>> = pieces.iter().map(|p| pool.intern_bytes(p)).collect();

    assert_eq!(pool.len(), unique);
    for ((a, b), piece) in first.iter().zip(&second).zip(&pieces) {
        assert!(Arc::ptr_eq(a, b));
        assert_eq!(&**a, &*String::from_utf8_lossy(piece));
    }
});
