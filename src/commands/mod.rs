//! Slash-command parsing and dispatch.
//!
//! User input that starts with `/` is resolved through the command registry;
//! anything else is treated as a chat message. Handlers either mutate the
//! app state directly or return a [`CommandResult`] variant asking the chat
//! loop to perform a network operation on their behalf (the loop owns all
//! remote calls).

mod registry;

pub use registry::{all_commands, CommandInvocation};

use crate::core::app::App;

pub enum CommandResult {
    /// Nothing left to do; keep looping.
    Continue,

    /// Input was not a command; send it as a chat message.
    ProcessAsMessage(String),

    /// Re-fetch the full character directory and list it.
    RefreshDirectory,

    /// Fetch one character's full profile and display it.
    ShowCharacter(String),

    /// Delete confirmed: issue the delete call, then a full re-fetch.
    DeleteCharacter(String),

    /// Fetch and display the stored conversation log.
    ListConversations,
}

pub fn process_input(app: &mut App, input: &str) -> CommandResult {
    let trimmed = input.trim();

    if !trimmed.starts_with('/') {
        app.disarm_delete();
        return CommandResult::ProcessAsMessage(input.to_string());
    }

    let mut parts = trimmed[1..].splitn(2, ' ');
    let command_name = match parts.next() {
        Some(name) if !name.is_empty() => name,
        _ => return CommandResult::ProcessAsMessage(input.to_string()),
    };
    let args = parts.next().unwrap_or("").trim();

    // Any command other than the pending delete withdraws the confirmation.
    if !command_name.eq_ignore_ascii_case("delete") {
        app.disarm_delete();
    }

    if let Some(command) = registry::find_command(command_name) {
        let invocation = CommandInvocation { args };
        (command.handler)(app, invocation)
    } else {
        CommandResult::ProcessAsMessage(input.to_string())
    }
}

pub(super) fn handle_help(app: &mut App, _invocation: CommandInvocation<'_>) -> CommandResult {
    let mut help = String::from("Commands:\n");
    for command in all_commands() {
        help.push_str(&format!("  {:<22} {}\n", command.usage, command.help));
    }
    help.push_str("\nEnter sends a message; Ctrl+C quits.");
    app.add_info(help);
    CommandResult::Continue
}

pub(super) fn handle_characters(
    _app: &mut App,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::RefreshDirectory
}

pub(super) fn handle_switch(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let id = invocation.args;
    if id.is_empty() {
        app.set_notice("Usage: /switch <id>");
        return CommandResult::Continue;
    }
    match app.switch_character(id) {
        Ok(()) => {
            let name = app.speaker_name(id).to_string();
            app.set_notice(format!("Now chatting with {name}"));
        }
        Err(err) => {
            app.set_notice(err.to_string());
        }
    }
    CommandResult::Continue
}

pub(super) fn handle_show(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let id = invocation.args;
    if id.is_empty() {
        app.set_notice("Usage: /show <id>");
        return CommandResult::Continue;
    }
    CommandResult::ShowCharacter(id.to_string())
}

pub(super) fn handle_delete(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let id = invocation.args;
    if id.is_empty() {
        app.disarm_delete();
        app.set_notice("Usage: /delete <id>");
        return CommandResult::Continue;
    }
    if app.arm_delete(id) {
        CommandResult::DeleteCharacter(id.to_string())
    } else {
        app.set_notice(format!("Delete '{id}'? Repeat /delete {id} to confirm."));
        CommandResult::Continue
    }
}

pub(super) fn handle_conversations(
    _app: &mut App,
    _invocation: CommandInvocation<'_>,
) -> CommandResult {
    CommandResult::ListConversations
}

pub(super) fn handle_log(app: &mut App, invocation: CommandInvocation<'_>) -> CommandResult {
    let result = if invocation.args.is_empty() {
        app.logging.toggle_logging()
    } else {
        app.logging.set_log_file(invocation.args.to_string())
    };
    match result {
        Ok(status) => app.set_notice(status),
        Err(err) => app.add_error(err.to_string()),
    }
    CommandResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::core::character::CharacterProfile;
    use crate::core::session::SessionStore;
    use crate::utils::logging::LoggingState;

    fn profile(id: &str, name: &str) -> CharacterProfile {
        CharacterProfile {
            id: Some(id.to_string()),
            name: name.to_string(),
            role: "Test".to_string(),
            personality_traits: vec![],
            tone_of_voice: "neutral".to_string(),
            knowledge_boundaries: vec![],
            intended_use_case: "testing".to_string(),
            origin: None,
            avatar: None,
            background_story: None,
            system_prompt: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn test_app() -> App {
        let mut app = App::new(
            ApiClient::new("http://localhost:8000/api"),
            SessionStore::new("a"),
            LoggingState::new(None),
        );
        app.directory
            .replace(vec![profile("a", "Alice"), profile("b", "Bob")]);
        app
    }

    #[test]
    fn plain_text_passes_through_as_a_message() {
        let mut app = test_app();
        match process_input(&mut app, "hello there") {
            CommandResult::ProcessAsMessage(text) => assert_eq!(text, "hello there"),
            _ => panic!("expected passthrough"),
        }
    }

    #[test]
    fn unknown_commands_fall_through_as_messages() {
        let mut app = test_app();
        assert!(matches!(
            process_input(&mut app, "/definitely-not-a-command"),
            CommandResult::ProcessAsMessage(_)
        ));
    }

    #[test]
    fn switch_to_unknown_id_leaves_active_unchanged() {
        let mut app = test_app();
        assert!(matches!(
            process_input(&mut app, "/switch c"),
            CommandResult::Continue
        ));
        assert_eq!(app.session.active_character_id(), "a");
    }

    #[test]
    fn switch_to_known_id_activates_it() {
        let mut app = test_app();
        process_input(&mut app, "/switch b");
        assert_eq!(app.session.active_character_id(), "b");
    }

    #[test]
    fn delete_requires_a_repeat_to_confirm() {
        let mut app = test_app();

        assert!(matches!(
            process_input(&mut app, "/delete b"),
            CommandResult::Continue
        ));
        assert!(app.has_pending_delete());

        match process_input(&mut app, "/delete b") {
            CommandResult::DeleteCharacter(id) => assert_eq!(id, "b"),
            _ => panic!("expected confirmed delete"),
        }
        assert!(!app.has_pending_delete());
    }

    #[test]
    fn any_other_input_withdraws_the_delete_confirmation() {
        let mut app = test_app();
        process_input(&mut app, "/delete b");
        assert!(app.has_pending_delete());

        // A chat message disarms; the next delete starts over.
        process_input(&mut app, "never mind");
        assert!(!app.has_pending_delete());
        assert!(matches!(
            process_input(&mut app, "/delete b"),
            CommandResult::Continue
        ));
    }

    #[test]
    fn another_command_also_withdraws_the_confirmation() {
        let mut app = test_app();
        process_input(&mut app, "/delete b");
        process_input(&mut app, "/help");
        assert!(!app.has_pending_delete());
    }

    #[test]
    fn characters_asks_for_a_directory_refresh() {
        let mut app = test_app();
        assert!(matches!(
            process_input(&mut app, "/characters"),
            CommandResult::RefreshDirectory
        ));
    }

    #[test]
    fn command_names_are_case_insensitive() {
        let mut app = test_app();
        assert!(matches!(
            process_input(&mut app, "/HELP"),
            CommandResult::Continue
        ));
    }
}
