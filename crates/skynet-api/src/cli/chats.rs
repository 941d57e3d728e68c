//! `skynet chats` subcommands over the durable chat store.

use anyhow::Result;
use chrono::{DateTime, Local, Utc};
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use skynet_types::chat::{ChatId, TurnRole};

use crate::state::AppState;

fn format_local(dt: &DateTime<Utc>) -> String {
    dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

pub async fn list_chats(state: &AppState, json: bool) -> Result<()> {
    let chats = state.chats()?.list_conversations().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&chats)?);
        return Ok(());
    }

    if chats.is_empty() {
        println!();
        println!(
            "  {} No chats yet. Create one with: {}",
            style("i").blue().bold(),
            style("POST /chats").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("ID").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Messages").fg(Color::White),
        Cell::new("Updated").fg(Color::White),
    ]);

    for chat in &chats {
        table.add_row(vec![
            Cell::new(chat.conversation.id).fg(Color::Cyan),
            Cell::new(&chat.conversation.title),
            Cell::new(chat.message_count),
            Cell::new(format_local(&chat.conversation.updated_at)).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} chat{}",
        style(chats.len()).bold(),
        if chats.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

pub async fn show_chat(state: &AppState, id: i64, json: bool) -> Result<()> {
    let (chat, turns) = state.chats()?.transcript(&ChatId(id)).await?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({ "chat": chat, "messages": turns }))?
        );
        return Ok(());
    }

    println!();
    println!(
        "  {} {}",
        style(&chat.title).cyan().bold(),
        style(format!("#{}", chat.id)).dim()
    );
    println!(
        "  {}",
        style(format!("created {}", format_local(&chat.created_at))).dim()
    );
    println!();

    for turn in &turns {
        let speaker = match turn.role {
            TurnRole::User => style("You".to_string()).green().bold(),
            TurnRole::Assistant => style(
                turn.persona_name
                    .clone()
                    .unwrap_or_else(|| "Assistant".to_string()),
            )
            .magenta()
            .bold(),
        };
        println!("  {speaker}: {}", turn.content);
    }

    if turns.is_empty() {
        println!("  {}", style("No messages yet.").dim());
    }
    println!();

    Ok(())
}

pub async fn delete_chat(state: &AppState, id: i64, force: bool, json: bool) -> Result<()> {
    let service = state.chats()?;
    let id = ChatId(id);

    if !force && !json {
        let Some(chat) = service.get_conversation(&id).await? else {
            println!("  No chat #{id}.");
            return Ok(());
        };

        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete chat '{}' and all its messages?",
                style(&chat.title).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    service.delete_conversation(&id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": id }));
    } else {
        println!("  {} Chat #{id} deleted.", style("✓").red().bold());
    }

    Ok(())
}
