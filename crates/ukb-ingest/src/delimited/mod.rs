//! Delimited-text reading utilities.

mod detect;
mod reader;

pub use detect::{count_rows, detect_delimiter, read_header};
pub(crate) use reader::{read_frame, read_frame_chunked};
