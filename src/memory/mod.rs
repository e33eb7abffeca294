/*!
 * Memory Module
 * Paged memory allocation
 */

pub mod page_table;
pub mod types;

// Re-export for convenience
pub use page_table::PageTable;
pub use types::*;
