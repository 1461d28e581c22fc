//! Capture pipeline for live request/response exchanges

mod body;
mod headers;
mod record;

pub use body::{normalize, NormalizedBody};
pub use headers::{canonical_name, flatten};
pub use record::{Record, RequestPart, ResponsePart};
