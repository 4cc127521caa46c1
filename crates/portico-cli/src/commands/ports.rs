//! `portico ports` command implementation

use comfy_table::{Cell, Color, ContentArrangement, Table};
use portico_kernel::Port;
use serde_json::json;

/// Execute the `portico ports` command
pub fn run(json: bool) -> anyhow::Result<()> {
    if json {
        let contracts: Vec<_> = Port::ALL
            .iter()
            .map(|port| {
                let contract = port.contract();
                json!({
                    "port": port.as_str(),
                    "callbacks": contract.callbacks,
                    "summary": contract.summary,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&contracts)?);
        return Ok(());
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Port").fg(Color::Cyan),
            Cell::new("Callbacks").fg(Color::Cyan),
            Cell::new("Summary").fg(Color::Cyan),
        ]);
    for port in Port::ALL {
        let contract = port.contract();
        table.add_row(vec![
            Cell::new(port.as_str()),
            Cell::new(contract.callbacks.join(", ")),
            Cell::new(contract.summary),
        ]);
    }
    println!("{table}");
    Ok(())
}
