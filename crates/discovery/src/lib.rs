//! Source-library discovery for the skillsync install engine.
//!
//! This crate provides mechanisms for:
//! - Scanning a content library (skills, agents, commands, hooks, rules)
//!   into an ordered list of typed sync items.
//! - Hashing file and directory contents for change detection.
//! - Extracting skill names from SKILL.md frontmatter.
//!
//! # Examples
//!
//! ```
//! use skillsync_discovery::{discover_items, ItemKind};
//! use tempfile::tempdir;
//!
//! let temp = tempdir().unwrap();
//! let skill_dir = temp.path().join("skills/alpha");
//! std::fs::create_dir_all(&skill_dir).unwrap();
//! std::fs::write(skill_dir.join("SKILL.md"), "# Alpha").unwrap();
//!
//! let items = discover_items(temp.path(), &temp.path().join("install")).unwrap();
//! assert_eq!(items.len(), 1);
//! assert_eq!(items[0].kind, ItemKind::Skill);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Error type for discovery operations.
pub type Error = anyhow::Error;
/// Result type for discovery operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Library scanning and content hashing.
pub mod scanner;
/// Item kinds and sync item metadata.
pub mod types;

pub use scanner::{contents_identical, discover_items, hash_content, hash_file, tree_hashes};
pub use types::{skill_name_from_frontmatter, ItemKind, SyncItem};
