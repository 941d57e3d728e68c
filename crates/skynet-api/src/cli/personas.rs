//! `skynet personas`.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::state::AppState;

pub fn list_personas(state: &AppState, json: bool) -> Result<()> {
    let personas = state.catalog.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&personas)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Domain").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Color").fg(Color::White),
    ]);

    for persona in &personas {
        table.add_row(vec![
            Cell::new(&persona.key).fg(Color::Cyan),
            Cell::new(&persona.name),
            Cell::new(&persona.color).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} persona{}",
        style(personas.len()).bold(),
        if personas.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}
