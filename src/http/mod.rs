//! HTTP protocol layer module
//!
//! Protocol-level helpers shared by the request handlers: MIME detection,
//! Range parsing and response builders. Nothing in here knows about the
//! document root or the SPA fallback rule.

pub mod mime;
pub mod range;
pub mod response;

// Re-export commonly used items
pub use range::parse_range_header;
pub use response::{
    build_404_response, build_405_response, build_416_response, build_500_response,
    build_options_response,
};
