//! Command-line interface for the `skillsync` application.
//!
//! This binary is a thin entry point; all behavior lives in the library so
//! integration tests can drive it directly.

fn main() -> anyhow::Result<()> {
    skillsync::run()
}
