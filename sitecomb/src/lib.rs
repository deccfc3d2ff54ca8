// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

// Re-export commonly used handler helpers for convenience
pub use handlers::{normalize_seed_url, parse_extension_list};

// Re-export audit functionality from sitecomb-core
pub use sitecomb_core::audit::{AuditOptions, execute_audit, summarize_audit};
