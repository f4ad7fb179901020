use mongodb::error::{Error, ErrorKind, WriteFailure};

/// Server error code for unique index violations.
pub const DUPLICATE_KEY_CODE: i32 = 11000;

/// Whether `err` is a unique index violation (E11000).
pub fn is_duplicate_key(err: &Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(we)) => we.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(ce) => ce.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}
