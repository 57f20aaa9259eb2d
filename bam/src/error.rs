use thiserror::Error;

/// The error taxonomy for this crate.
///
/// The core does not retry I/O; every variant is surfaced to the caller
/// as-is. `MalformedField` is only ever raised by the explicit
/// `AlignmentRecord::validate`/`make_alignment_record` call sites — reading
/// a record back off a BGZF stream never re-checks flag validity on its own.
#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unknown tag {tag:?}")]
    UnknownTag { tag: [u8; 2] },

    #[error(
        "malformed flag {flag:#06x} ({explanation}) at {}:{} (read {})",
        reference_id,
        position,
        read_name.as_deref().unwrap_or("?")
    )]
    MalformedField {
        flag: u16,
        read_name: Option<String>,
        position: i32,
        reference_id: i32,
        explanation: &'static str,
    },

    #[error("malformed record: {0}")]
    MalformedRecord(String),

    #[error("BGZF I/O error: {0}")]
    BgzfIo(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
