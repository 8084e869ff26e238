//! Request handler module
//!
//! Request dispatch and the SPA fallback decision. Every request is an
//! independent transaction against the read-only document root.

pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
