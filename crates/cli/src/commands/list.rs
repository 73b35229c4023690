use anyhow::Result;
use std::path::PathBuf;

use skillsync_discovery::discover_items;

/// Handle the `list` command.
pub(crate) fn handle_list_command(source: PathBuf) -> Result<()> {
    // Destination paths are irrelevant for listing; resolve against the
    // source root itself.
    let items = discover_items(&source, &source)?;
    if items.is_empty() {
        println!("(no items discovered)");
        return Ok(());
    }
    for item in &items {
        println!("{:<9} {}  ({})", item.kind.label(), item.name, item.rel_display());
    }
    println!("{} item(s)", items.len());
    Ok(())
}
