pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{load_urls_from_file, load_urls_from_source, parse_url_line};

// Re-export batch functionality from agelens-core
pub use agelens_core::crawl::{
    execute_audit, execute_clone, extract_url_path, AuditOptions, AuditProgressCallback,
    CloneOptions, ClonedPage,
};
