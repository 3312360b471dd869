use std::fmt::Write;

/// Opens a file from `src/tests/test_files/` as `io::Read`.
macro_rules! include_test_file {
    ($filename:expr) => {{
        let bytes = include_bytes!(concat!("test_files/", $filename)) as &[u8];
        std::io::Cursor::new(bytes)
    }}
}

/// Asserts that `$res` is an `Err` matching the given pattern and prints the
/// actual result otherwise.
macro_rules! assert_err {
    ($res:expr, $pat:pat) => {
        match $res {
            Err($pat) => {}
            other => panic!(
                "expected `Err({})`, but got:\n{}",
                stringify!($pat),
                crate::test_utils::describe(&other),
            ),
        }
    };
}

pub(crate) fn describe<T: std::fmt::Debug>(res: &Result<T, crate::Error>) -> String {
    let mut out = String::new();
    match res {
        Ok(v) => { let _ = write!(out, "Ok({:?})", v); }
        Err(e) => { let _ = write!(out, "Err({:?}): {}", e, e); }
    }
    out
}

/// Renders bytes as hex rows of 16, used when two encoded files differ.
pub(crate) fn hex_dump(data: &[u8]) -> String {
    let mut msg = String::new();
    for chunk in data.chunks(16) {
        for b in chunk {
            let _ = write!(msg, "{:02x} ", b);
        }
        msg.push('\n');
    }
    msg
}
