use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Category of a unit of installable content.
///
/// Decided once at discovery time; downstream logic switches on this enum
/// rather than re-deriving the category from path strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// A skill directory containing a `SKILL.md` plus supporting files.
    Skill,
    /// A single agent definition file (`agents/*.md`).
    Agent,
    /// A single slash-command file (`commands/**/*.md`).
    Command,
    /// A hook script or config file (`hooks/*`).
    Hook,
    /// A loose rule file at the top of the rules tree (`rules/*.md`).
    RuleFile,
    /// A whole rule category directory (`rules/<category>/`).
    RuleDirectory,
}

impl ItemKind {
    /// Returns a stable label for this kind.
    pub fn label(&self) -> &'static str {
        match self {
            ItemKind::Skill => "skill",
            ItemKind::Agent => "agent",
            ItemKind::Command => "command",
            ItemKind::Hook => "hook",
            ItemKind::RuleFile => "rule",
            ItemKind::RuleDirectory => "rule-dir",
        }
    }

    /// Returns the category directory this kind lives under, in both the
    /// source library and the install root.
    pub fn category_dir(&self) -> &'static str {
        match self {
            ItemKind::Skill => "skills",
            ItemKind::Agent => "agents",
            ItemKind::Command => "commands",
            ItemKind::Hook => "hooks",
            ItemKind::RuleFile | ItemKind::RuleDirectory => "rules",
        }
    }

    /// Skills must be placed as real files regardless of placement mode;
    /// the host tool's discovery mechanism does not follow symlinks.
    pub fn forces_copy(&self) -> bool {
        matches!(self, ItemKind::Skill)
    }
}

/// One unit of content to place at the destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncItem {
    /// Category of the item.
    pub kind: ItemKind,
    /// Display name (frontmatter name for skills, relative path otherwise).
    pub name: String,
    /// Absolute path to the source content (file or directory).
    pub source_path: PathBuf,
    /// Absolute path under the install root.
    pub dest_path: PathBuf,
    /// Whether the item is a whole directory treated as a unit.
    pub is_directory: bool,
}

/// Raw YAML frontmatter for a SKILL.md file.
#[derive(Debug, Default, Deserialize)]
struct SkillFrontmatter {
    name: Option<String>,
}

/// Split content into frontmatter YAML and body content.
fn split_frontmatter(content: &str) -> Option<&str> {
    let trimmed = content.trim_start();
    let after_open = trimmed.strip_prefix("---")?;
    let after_open = after_open.trim_start_matches(['\r', '\n']);
    let end = after_open
        .find("\n---")
        .or_else(|| after_open.find("\r\n---"))?;
    Some(&after_open[..end])
}

/// Extracts the `name:` field from SKILL.md frontmatter, if present.
///
/// Returns `None` when the file has no frontmatter, the frontmatter has no
/// name, or the YAML does not parse. Discovery falls back to the directory
/// name in those cases.
pub fn skill_name_from_frontmatter(content: &str) -> Option<String> {
    let yaml = split_frontmatter(content)?;
    match serde_yaml::from_str::<SkillFrontmatter>(yaml) {
        Ok(front) => front.name.filter(|n| !n.trim().is_empty()),
        Err(err) => {
            tracing::debug!(error = %err, "Unparseable SKILL.md frontmatter");
            None
        }
    }
}

impl SyncItem {
    /// Returns the path of this item relative to its category directory at
    /// the destination, for compact display.
    pub fn rel_display(&self) -> String {
        let category = Path::new(self.kind.category_dir());
        self.dest_path
            .ancestors()
            .find(|p| p.ends_with(category))
            .and_then(|base| self.dest_path.strip_prefix(base).ok())
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| self.dest_path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_kind_forces_copy() {
        assert!(ItemKind::Skill.forces_copy());
        assert!(!ItemKind::Agent.forces_copy());
        assert!(!ItemKind::RuleDirectory.forces_copy());
    }

    #[test]
    fn rule_kinds_share_category_dir() {
        assert_eq!(ItemKind::RuleFile.category_dir(), "rules");
        assert_eq!(ItemKind::RuleDirectory.category_dir(), "rules");
    }

    #[test]
    fn frontmatter_name_extracted() {
        let content = "---\nname: tdd-loop\ndescription: Red/green cycle\n---\n# Body\n";
        assert_eq!(
            skill_name_from_frontmatter(content),
            Some("tdd-loop".to_string())
        );
    }

    #[test]
    fn frontmatter_missing_name_is_none() {
        let content = "---\ndescription: no name here\n---\nBody";
        assert_eq!(skill_name_from_frontmatter(content), None);
    }

    #[test]
    fn no_frontmatter_is_none() {
        assert_eq!(skill_name_from_frontmatter("# Just markdown"), None);
    }

    #[test]
    fn unclosed_frontmatter_is_none() {
        let content = "---\nname: unclosed\n\nbody without closing fence";
        assert_eq!(skill_name_from_frontmatter(content), None);
    }

    #[test]
    fn invalid_yaml_is_none() {
        let content = "---\nname: [broken\n---\nBody";
        assert_eq!(skill_name_from_frontmatter(content), None);
    }

    #[test]
    fn rel_display_strips_category_prefix() {
        let item = SyncItem {
            kind: ItemKind::Command,
            name: "git/branch".into(),
            source_path: PathBuf::from("/src/commands/git/branch.md"),
            dest_path: PathBuf::from("/dest/commands/git/branch.md"),
            is_directory: false,
        };
        assert_eq!(item.rel_display(), "git/branch.md");
    }
}
