#![no_main]

use libfuzzer_sys::fuzz_target;
use plyload::{Document, ReadOptions, Reader};

fuzz_target!(|data: &[u8]| {
    // Only panics and worse are interesting here. Returning an error for
    // garbage input is expected, so the result is ignored.
    let _ = Document::from_reader(data);

    // Also force the block decoder onto the thread pool for small elements.
    let _ = Reader::new(data).and_then(|r| {
        r.with_options(ReadOptions { parallel: true, parallel_min_rows: 0 }).read()
    });
});
