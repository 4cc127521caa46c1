//! `portico schema` command implementation

use portico_kernel::manifest::{adapter_schema, manifest_schema};

/// Execute the `portico schema` command
pub fn run(adapter: bool) -> anyhow::Result<()> {
    let schema = if adapter {
        adapter_schema()
    } else {
        manifest_schema()
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}
