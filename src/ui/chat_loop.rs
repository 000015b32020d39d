//! Main chat event loop.
//!
//! The loop owns the terminal, polls input events, dispatches slash commands,
//! and drives the one-at-a-time chat exchange: a submit locks message sends,
//! the request runs on a spawned task, and its outcome comes back over a
//! channel tagged with the originating character id. Slash commands keep
//! working while a request is in flight; only sends are held back. The lock
//! is released on every completion path, so the UI always returns to an
//! interactive state.

use ratatui::crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{error::Error, io, time::Duration};
use tokio::sync::mpsc;

use crate::api::{ApiClient, ConversationRecord};
use crate::commands::{process_input, CommandResult};
use crate::core::app::{App, ChatOutcome, OutboundChat};
use crate::core::character::{join_list, CharacterProfile};
use crate::core::config::Config;
use crate::core::session::SessionStore;
use crate::ui::renderer::{self, ui};
use crate::utils::logging::LoggingState;

/// Start an interactive session against `base_url`.
///
/// The directory is fetched before the terminal is touched so that
/// connection problems surface as plain error output rather than a broken
/// alternate screen.
pub async fn run_chat(
    base_url: String,
    character: Option<String>,
    log_file: Option<String>,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let client = ApiClient::new(base_url);

    let profiles = client
        .list_characters()
        .await
        .map_err(|err| format!("Could not load the character directory: {}", err.user_message()))?;
    if profiles.is_empty() {
        return Err(
            "No characters defined yet. Create one with: charade characters create --help".into(),
        );
    }

    let requested = character.or_else(|| config.default_character.clone());
    let start_id = match requested {
        Some(id) => id,
        None => profiles[0]
            .id
            .clone()
            .ok_or("The server returned a character without an id")?,
    };

    let log_file = log_file.or_else(|| config.log_file.clone());
    let mut app = App::new(
        client,
        SessionStore::new(start_id.clone()),
        LoggingState::new(log_file),
    );
    app.directory.replace(profiles);

    if !app.directory.contains(&start_id) {
        let known: Vec<&str> = app
            .directory
            .profiles()
            .iter()
            .filter_map(|p| p.id.as_deref())
            .collect();
        return Err(format!(
            "Unknown character '{start_id}'. Known characters: {}",
            known.join(", ")
        )
        .into());
    }
    app.switch_character(&start_id)
        .map_err(|err| err.to_string())?;

    // Setup terminal only after successful initialization.
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (tx, mut rx) = mpsc::unbounded_channel::<ChatOutcome>();

    let result = loop {
        let term_height = terminal.size().map(|s| s.height).unwrap_or_default();
        let pane_height = renderer::available_height(term_height);
        if app.auto_scroll {
            app.scroll_offset = renderer::max_scroll_offset(&app, pane_height);
        }
        terminal.draw(|f| ui(f, &mut app))?;

        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        break Ok(());
                    }
                    KeyCode::Enter => {
                        if app.input.trim().is_empty() {
                            continue;
                        }
                        let input = std::mem::take(&mut app.input);
                        dispatch_input(&mut app, &input, &tx).await;
                    }
                    KeyCode::Char(c) => {
                        app.input.push(c);
                    }
                    KeyCode::Backspace => {
                        app.input.pop();
                    }
                    KeyCode::Up => {
                        app.auto_scroll = false;
                        app.scroll_offset = app.scroll_offset.saturating_sub(1);
                    }
                    KeyCode::Down => {
                        let max_scroll = renderer::max_scroll_offset(&app, pane_height);
                        app.scroll_offset = app.scroll_offset.saturating_add(1).min(max_scroll);
                        if app.scroll_offset >= max_scroll {
                            app.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                Event::Mouse(mouse) => match mouse.kind {
                    MouseEventKind::ScrollUp => {
                        app.auto_scroll = false;
                        app.scroll_offset = app.scroll_offset.saturating_sub(3);
                    }
                    MouseEventKind::ScrollDown => {
                        let max_scroll = renderer::max_scroll_offset(&app, pane_height);
                        app.scroll_offset = app.scroll_offset.saturating_add(3).min(max_scroll);
                        if app.scroll_offset >= max_scroll {
                            app.auto_scroll = true;
                        }
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        // Completed requests, in arrival order.
        while let Ok(outcome) = rx.try_recv() {
            app.complete_chat(outcome);
        }
    };

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

/// Route one submitted line. Slash commands run even while a chat request
/// is in flight (so `/switch` works mid-exchange); a message send during an
/// in-flight request is held back with the text restored to the input line.
async fn dispatch_input(app: &mut App, input: &str, tx: &mpsc::UnboundedSender<ChatOutcome>) {
    match process_input(app, input) {
        CommandResult::Continue => {}
        CommandResult::ProcessAsMessage(text) => {
            if app.is_sending {
                app.input = text;
                app.set_notice("Still waiting for the current reply.");
            } else if let Some(outbound) = app.submit_message(&text) {
                spawn_chat(app.client.clone(), outbound, tx.clone());
            }
        }
        CommandResult::RefreshDirectory => {
            if refresh_directory(app).await {
                app.add_info(format_directory(app.directory.profiles()));
            }
        }
        CommandResult::ShowCharacter(id) => {
            show_character(app, &id).await;
        }
        CommandResult::DeleteCharacter(id) => {
            delete_character(app, &id).await;
        }
        CommandResult::ListConversations => {
            list_conversations(app).await;
        }
    }
}

fn spawn_chat(client: ApiClient, outbound: OutboundChat, tx: mpsc::UnboundedSender<ChatOutcome>) {
    tokio::spawn(async move {
        let result = client.chat(&outbound.request).await;
        let _ = tx.send(ChatOutcome {
            character_id: outbound.character_id,
            result,
        });
    });
}

/// Full reload of the directory cache. Returns whether the fetch succeeded;
/// on failure the previous contents stay usable and an error banner is
/// posted.
async fn refresh_directory(app: &mut App) -> bool {
    match app.client.list_characters().await {
        Ok(profiles) => {
            app.directory.replace(profiles);
            true
        }
        Err(err) => {
            app.add_error(err.user_message());
            false
        }
    }
}

async fn show_character(app: &mut App, id: &str) {
    match app.client.fetch_character(id).await {
        Ok(profile) => app.add_info(profile.describe()),
        Err(err) => app.add_error(err.user_message()),
    }
}

/// Confirmed delete: exactly one DELETE, then exactly one full re-fetch on
/// success. Both outcomes surface as transient notices.
async fn delete_character(app: &mut App, id: &str) {
    match app.client.delete_character(id).await {
        Ok(response) => {
            let text = response
                .message
                .unwrap_or_else(|| format!("Character '{id}' deleted"));
            app.set_notice(text);
            refresh_directory(app).await;
        }
        Err(err) => {
            app.set_notice(err.user_message());
        }
    }
}

async fn list_conversations(app: &mut App) {
    match app.client.list_conversations().await {
        Ok(records) => app.add_info(format_conversations(&records)),
        Err(err) => app.add_error(err.user_message()),
    }
}

fn format_directory(profiles: &[CharacterProfile]) -> String {
    let mut out = String::from("Characters:\n");
    for profile in profiles {
        let id = profile.id.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "  {:<20} {} - {}",
            id, profile.name, profile.role
        ));
        if !profile.personality_traits.is_empty() {
            out.push_str(&format!(" ({})", join_list(&profile.personality_traits)));
        }
        out.push('\n');
    }
    out.push_str("Switch with /switch <id>.");
    out
}

fn format_conversations(records: &[ConversationRecord]) -> String {
    if records.is_empty() {
        return "No stored conversations.".to_string();
    }
    let mut out = String::from("Stored conversations:\n");
    for record in records {
        let test_type = record
            .test_type
            .map(|t| t.as_str())
            .unwrap_or("general");
        let created = record.created_at.as_deref().unwrap_or("-");
        out.push_str(&format!(
            "  [{}] {} - {} message(s), {}\n",
            test_type,
            record.title,
            record.messages.len(),
            created
        ));
    }
    out.pop();
    out
}
