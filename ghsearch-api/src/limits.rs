use thiserror::Error;

use crate::status::StatusCode;

/// Cap on an inbound proxy request (start line, headers and body together).
/// The proxy only serves GETs, so anything near this size is abuse.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LimitError {
    #[error("request head not terminated within {max} bytes")]
    HeadTooLarge { max: usize },
    #[error("declared body of {declared} bytes exceeds the {remaining} bytes left after the head")]
    BodyTooLarge { declared: usize, remaining: usize },
}

impl LimitError {
    /// Both cases are answered the same way on the wire.
    pub fn status(&self) -> StatusCode {
        StatusCode::RequestEntityTooLarge
    }
}

/// `buffered` is everything read so far while looking for the end of the head.
pub fn check_head(buffered: usize) -> Result<(), LimitError> {
    if buffered > MAX_MESSAGE_BYTES {
        return Err(LimitError::HeadTooLarge { max: MAX_MESSAGE_BYTES });
    }
    Ok(())
}

/// Checked before any body byte is read, against the declared content-length.
pub fn check_body(head_len: usize, declared: usize) -> Result<(), LimitError> {
    let remaining = MAX_MESSAGE_BYTES.saturating_sub(head_len);
    if declared > remaining {
        return Err(LimitError::BodyTooLarge { declared, remaining });
    }
    Ok(())
}
