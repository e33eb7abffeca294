/*!
 * Resources Module
 * Exclusive resource arbitration
 */

pub mod table;

pub use table::{ResourceTable, ResourceView};
