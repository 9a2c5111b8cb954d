//! Date-partitioned Markdown vault for Scrivener.
//!
//! Resolves calendar dates to week-bucketed storage partitions, renders
//! frontmatter, and performs the actual Markdown file operations.

pub mod frontmatter;
pub mod partition;
pub mod reader;
pub mod store;

pub use frontmatter::{build_frontmatter, slugify};
pub use partition::{parse_date, Category, Partition};
pub use reader::build_read_context;
pub use store::{VaultError, VaultStore};
