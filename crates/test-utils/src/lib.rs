//! Shared test utilities for skillsync crates.
//!
//! Provides a tempdir-backed fixture that lays out a source content library
//! and an install root the way real projects do, plus RAII guards for tests
//! that mutate process-global state.

use std::path::{Path, PathBuf};
use std::sync::{LazyLock, Mutex, MutexGuard};

/// Serialize tests that mutate process-global state (env vars, cwd, etc).
///
/// Acquire this guard at the start of any test that modifies environment
/// variables to prevent race conditions between parallel tests.
pub fn env_guard() -> MutexGuard<'static, ()> {
    static TEST_SERIAL: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));
    TEST_SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

/// RAII guard for environment variables - restores original value on drop.
pub struct EnvVarGuard {
    key: &'static str,
    previous: Option<String>,
}

impl Drop for EnvVarGuard {
    fn drop(&mut self) {
        if let Some(v) = &self.previous {
            std::env::set_var(self.key, v);
        } else {
            std::env::remove_var(self.key);
        }
    }
}

/// Set an environment variable and return a guard that restores the original on drop.
pub fn set_env_var(key: &'static str, value: Option<&str>) -> EnvVarGuard {
    let previous = std::env::var(key).ok();
    if let Some(val) = value {
        std::env::set_var(key, val);
    } else {
        std::env::remove_var(key);
    }
    EnvVarGuard { key, previous }
}

/// Standard test fixture with a source library and an install root.
///
/// The tempdir is automatically cleaned up when this struct is dropped.
pub struct TestFixture {
    /// Owning tempdir; dropped last.
    pub tempdir: tempfile::TempDir,
    /// Root of the source content library.
    pub library: PathBuf,
    /// Install root inside a fake project.
    pub install_root: PathBuf,
}

impl TestFixture {
    /// Creates a fixture with an empty library and a project directory.
    pub fn new() -> std::io::Result<Self> {
        let tempdir = tempfile::tempdir()?;
        let library = tempdir.path().join("library");
        let install_root = tempdir.path().join("project/.tooling");
        std::fs::create_dir_all(&library)?;
        std::fs::create_dir_all(install_root.parent().unwrap())?;
        Ok(Self {
            tempdir,
            library,
            install_root,
        })
    }

    /// Writes a file under the library, creating parents.
    pub fn write_library_file(&self, rel: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.library.join(rel);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Creates a skill directory with a SKILL.md in the library.
    ///
    /// Returns the path to the skill directory.
    pub fn create_skill(&self, name: &str, content: &str) -> std::io::Result<PathBuf> {
        let skill_dir = self.library.join("skills").join(name);
        std::fs::create_dir_all(&skill_dir)?;
        std::fs::write(skill_dir.join("SKILL.md"), content)?;
        Ok(skill_dir)
    }

    /// Creates a skill with standard frontmatter.
    pub fn create_skill_with_frontmatter(
        &self,
        name: &str,
        description: &str,
        body: &str,
    ) -> std::io::Result<PathBuf> {
        let content = format!(
            "---\nname: {}\ndescription: {}\n---\n{}",
            name, description, body
        );
        self.create_skill(name, &content)
    }

    /// Writes a file under the install root, creating parents. Useful for
    /// seeding repo-specific customizations.
    pub fn write_installed_file(&self, rel: &str, content: &str) -> std::io::Result<PathBuf> {
        let path = self.install_root.join(rel);
        std::fs::create_dir_all(path.parent().unwrap())?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Path of an installed file under the install root.
    pub fn installed(&self, rel: &str) -> PathBuf {
        self.install_root.join(rel)
    }

    /// Root of the fake project containing the install root.
    pub fn project_dir(&self) -> &Path {
        self.install_root.parent().unwrap()
    }
}
