use crate::types::{skill_name_from_frontmatter, ItemKind, SyncItem};
use anyhow::Result;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Computes a SHA-256 hash of the given content, returning a lowercase hex string.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    format!("{:x}", hasher.finalize())
}

/// Computes the SHA-256 hash of a file's contents.
pub fn hash_file(path: &Path) -> Result<String> {
    let data = fs::read(path)?;
    Ok(hash_content(&data))
}

/// Returns true if any path component is hidden (starts with a dot).
fn is_hidden_path(path: &Path) -> bool {
    path.components().any(|c| match c {
        std::path::Component::Normal(s) => s.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

/// Maps every file under `root` to its content hash, keyed by relative path.
///
/// Entries are ordered, so two maps compare equal exactly when the trees
/// have the same shape and the same file contents.
pub fn tree_hashes(root: &Path) -> Result<BTreeMap<PathBuf, String>> {
    let mut manifest = BTreeMap::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path.strip_prefix(root).unwrap_or(path).to_path_buf();
        manifest.insert(rel, hash_file(path)?);
    }
    Ok(manifest)
}

/// Compares two paths for byte-for-byte identical content.
///
/// Files compare by content hash; directories compare recursively (same
/// relative file set, same file contents). A file never equals a directory.
pub fn contents_identical(a: &Path, b: &Path) -> Result<bool> {
    if a.is_file() && b.is_file() {
        return Ok(hash_file(a)? == hash_file(b)?);
    }
    if a.is_dir() && b.is_dir() {
        return Ok(tree_hashes(a)? == tree_hashes(b)?);
    }
    Ok(false)
}

/// Lexically sorted entries of a directory, skipping hidden names.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

/// Discovers every installable item in a source library.
///
/// Scans the category directories (`skills/`, `agents/`, `commands/`,
/// `hooks/`, `rules/`) under `source_root` and returns items with their
/// destination paths resolved under `install_root`. Categories are visited
/// in a fixed order and entries within each category are sorted, so repeated
/// runs over unchanged input yield an identical item sequence.
pub fn discover_items(source_root: &Path, install_root: &Path) -> Result<Vec<SyncItem>> {
    let mut items = Vec::new();
    scan_skills(source_root, install_root, &mut items)?;
    scan_files(source_root, install_root, ItemKind::Agent, &mut items)?;
    scan_files(source_root, install_root, ItemKind::Command, &mut items)?;
    scan_hooks(source_root, install_root, &mut items)?;
    scan_rules(source_root, install_root, &mut items)?;
    Ok(items)
}

/// Each directory containing a `SKILL.md` is one skill unit. Nesting is
/// allowed; the unit is always the directory holding the marker file.
fn scan_skills(source_root: &Path, install_root: &Path, items: &mut Vec<SyncItem>) -> Result<()> {
    let skills_root = source_root.join(ItemKind::Skill.category_dir());
    if !skills_root.exists() {
        return Ok(());
    }
    let mut seen: std::collections::HashSet<PathBuf> = std::collections::HashSet::new();
    for entry in WalkDir::new(&skills_root)
        .min_depth(1)
        .max_depth(8)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() || entry.file_name() != "SKILL.md" {
            continue;
        }
        let marker = entry.path();
        let Some(skill_dir) = marker.parent() else {
            continue;
        };
        let rel = skill_dir
            .strip_prefix(&skills_root)
            .unwrap_or(skill_dir)
            .to_path_buf();
        if is_hidden_path(&rel) || !seen.insert(rel.clone()) {
            continue;
        }
        let name = fs::read_to_string(marker)
            .ok()
            .and_then(|content| skill_name_from_frontmatter(&content))
            .unwrap_or_else(|| rel.display().to_string());
        items.push(SyncItem {
            kind: ItemKind::Skill,
            name,
            source_path: skill_dir.to_path_buf(),
            dest_path: install_root
                .join(ItemKind::Skill.category_dir())
                .join(&rel),
            is_directory: true,
        });
    }
    Ok(())
}

/// Scans a category of markdown files (agents, commands), preserving each
/// file's relative path under its category.
fn scan_files(
    source_root: &Path,
    install_root: &Path,
    kind: ItemKind,
    items: &mut Vec<SyncItem>,
) -> Result<()> {
    let category_root = source_root.join(kind.category_dir());
    if !category_root.exists() {
        return Ok(());
    }
    for entry in WalkDir::new(&category_root)
        .min_depth(1)
        .max_depth(4)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().is_none_or(|ext| ext != "md") {
            continue;
        }
        let rel = path
            .strip_prefix(&category_root)
            .unwrap_or(path)
            .to_path_buf();
        if is_hidden_path(&rel) {
            continue;
        }
        let name = rel.with_extension("").display().to_string();
        items.push(SyncItem {
            kind,
            name,
            source_path: path.to_path_buf(),
            dest_path: install_root.join(kind.category_dir()).join(&rel),
            is_directory: false,
        });
    }
    Ok(())
}

/// Hooks are arbitrary files (scripts, JSON configs), not just markdown.
fn scan_hooks(source_root: &Path, install_root: &Path, items: &mut Vec<SyncItem>) -> Result<()> {
    let hooks_root = source_root.join(ItemKind::Hook.category_dir());
    if !hooks_root.exists() {
        return Ok(());
    }
    for entry in WalkDir::new(&hooks_root)
        .min_depth(1)
        .max_depth(4)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let rel = path
            .strip_prefix(&hooks_root)
            .unwrap_or(path)
            .to_path_buf();
        if is_hidden_path(&rel) {
            continue;
        }
        items.push(SyncItem {
            kind: ItemKind::Hook,
            name: rel.display().to_string(),
            source_path: path.to_path_buf(),
            dest_path: install_root.join(ItemKind::Hook.category_dir()).join(&rel),
            is_directory: false,
        });
    }
    Ok(())
}

/// Top-level rule directories are whole units; loose top-level markdown
/// files are individual rule files.
fn scan_rules(source_root: &Path, install_root: &Path, items: &mut Vec<SyncItem>) -> Result<()> {
    let rules_root = source_root.join("rules");
    if !rules_root.exists() {
        return Ok(());
    }
    for path in sorted_entries(&rules_root)? {
        let Some(file_name) = path.file_name().map(|n| n.to_string_lossy().to_string()) else {
            continue;
        };
        if path.is_dir() {
            items.push(SyncItem {
                kind: ItemKind::RuleDirectory,
                name: file_name.clone(),
                source_path: path.clone(),
                dest_path: install_root.join("rules").join(&file_name),
                is_directory: true,
            });
        } else if path.extension().is_some_and(|ext| ext == "md") {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().to_string())
                .unwrap_or_else(|| file_name.clone());
            items.push(SyncItem {
                kind: ItemKind::RuleFile,
                name,
                source_path: path.clone(),
                dest_path: install_root.join("rules").join(&file_name),
                is_directory: false,
            });
        } else {
            tracing::debug!(path = %path.display(), "Skipping non-markdown rules entry");
        }
    }
    Ok(())
}
