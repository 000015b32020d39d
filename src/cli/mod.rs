//! Command-line interface parsing and handling
//!
//! This module parses command-line arguments and dispatches either into the
//! interactive chat loop or into the one-shot admin subcommands that manage
//! character profiles and browse stored conversations.

use std::error::Error;
use std::io::{self, BufRead, Write};

use clap::{Args as ClapArgs, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::api::ApiClient;
use crate::core::character::{split_list, CharacterProfile};
use crate::core::config::Config;
use crate::ui::chat_loop::run_chat;

#[derive(Parser)]
#[command(name = "charade")]
#[command(about = "A terminal chat client for persona-driven assistant APIs")]
#[command(
    long_about = "Charade is a full-screen terminal chat client for persona-driven assistant \
APIs. It keeps a separate conversation transcript per character, lets you \
switch characters mid-session, and manages the server's character directory.\n\n\
Configuration:\n\
  The API base URL comes from --base-url, then the CHARADE_BASE_URL \
environment variable, then the config file, then http://localhost:8000/api.\n\n\
Controls (chat mode):\n\
  Type              Enter your message in the input field\n\
  Enter             Send the message\n\
  Up/Down/Mouse     Scroll through chat history\n\
  Ctrl+C            Quit the application\n\n\
Commands (chat mode):\n\
  /help             Show available commands\n\
  /characters       Re-fetch and list the character directory\n\
  /switch <id>      Switch to another character\n\
  /delete <id>      Delete a character (asks for confirmation)"
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Character id to activate at startup
    #[arg(short, long, global = true)]
    pub character: Option<String>,

    /// API base URL (overrides config file and CHARADE_BASE_URL)
    #[arg(short = 'u', long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Enable transcript logging to the specified file
    #[arg(short, long, global = true)]
    pub log: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the chat interface (default)
    Chat,
    /// Create, inspect, update, and delete character profiles
    Characters {
        #[command(subcommand)]
        command: CharacterCommands,
    },
    /// List stored conversations from the server log
    Conversations,
    /// Persist a default setting in the config file
    Set {
        #[command(subcommand)]
        command: SetCommands,
    },
}

#[derive(Subcommand)]
pub enum SetCommands {
    /// Character activated at startup when --character is absent
    DefaultCharacter { id: String },
    /// API base URL used when --base-url and CHARADE_BASE_URL are absent
    BaseUrl { url: String },
    /// Transcript log file enabled at startup
    LogFile { path: String },
}

#[derive(Subcommand)]
pub enum CharacterCommands {
    /// List all characters in the directory
    List,
    /// Show a character's full profile
    Show { id: String },
    /// Create a new character
    Create {
        #[command(flatten)]
        fields: CharacterFields,
    },
    /// Update an existing character
    Update {
        id: String,
        #[command(flatten)]
        fields: CharacterFields,
    },
    /// Delete a character (prompts for confirmation)
    Delete {
        id: String,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Form fields of a character profile. List-valued fields are entered as
/// comma-separated text, exactly like the directory's edit form.
#[derive(ClapArgs)]
pub struct CharacterFields {
    /// Display name
    #[arg(long)]
    pub name: String,

    /// Role description (e.g., "Friendly alien visitor")
    #[arg(long)]
    pub role: String,

    /// Comma-separated personality traits
    #[arg(long, default_value = "")]
    pub traits: String,

    /// Tone of voice
    #[arg(long)]
    pub tone: String,

    /// Comma-separated knowledge boundaries
    #[arg(long, default_value = "")]
    pub boundaries: String,

    /// Intended use case
    #[arg(long = "use-case")]
    pub use_case: String,

    /// Avatar emoji shown next to the name
    #[arg(long)]
    pub avatar: Option<String>,

    /// Background story
    #[arg(long)]
    pub background: Option<String>,

    /// System prompt override
    #[arg(long = "system-prompt")]
    pub system_prompt: Option<String>,
}

impl CharacterFields {
    fn into_profile(self) -> CharacterProfile {
        CharacterProfile {
            id: None,
            name: self.name,
            role: self.role,
            personality_traits: split_list(&self.traits),
            tone_of_voice: self.tone,
            knowledge_boundaries: split_list(&self.boundaries),
            intended_use_case: self.use_case,
            origin: None,
            avatar: self.avatar,
            background_story: self.background,
            system_prompt: self.system_prompt,
            created_at: None,
            updated_at: None,
        }
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    tokio::runtime::Runtime::new()?.block_on(async_main())
}

async fn async_main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = Config::load()?;
    let base_url = config.resolve_base_url(args.base_url.as_deref());

    match args.command.unwrap_or(Commands::Chat) {
        Commands::Chat => {
            if let Err(e) = run_chat(base_url, args.character, args.log, &config).await {
                eprintln!("❌ {e}");
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Characters { command } => {
            init_tracing();
            let client = ApiClient::new(base_url);
            run_character_command(&client, command).await
        }
        Commands::Set { command } => {
            let mut config = config;
            let description = match command {
                SetCommands::DefaultCharacter { id } => {
                    let text = format!("default character set to '{id}'");
                    config.default_character = Some(id);
                    text
                }
                SetCommands::BaseUrl { url } => {
                    let text = format!("base URL set to '{url}'");
                    config.api_base_url = Some(url);
                    text
                }
                SetCommands::LogFile { path } => {
                    let text = format!("log file set to '{path}'");
                    config.log_file = Some(path);
                    text
                }
            };
            config.save()?;
            println!("✅ {description}");
            Ok(())
        }
        Commands::Conversations => {
            init_tracing();
            let client = ApiClient::new(base_url);
            match client.list_conversations().await {
                Ok(records) => {
                    if records.is_empty() {
                        println!("No stored conversations.");
                    }
                    for record in records {
                        let test_type = record
                            .test_type
                            .map(|t| t.as_str())
                            .unwrap_or("general");
                        println!(
                            "[{}] {} ({} message(s), {})",
                            test_type,
                            record.title,
                            record.messages.len(),
                            record.created_at.as_deref().unwrap_or("-")
                        );
                    }
                    Ok(())
                }
                Err(e) => {
                    eprintln!("❌ {}", e.user_message());
                    std::process::exit(1);
                }
            }
        }
    }
}

async fn run_character_command(
    client: &ApiClient,
    command: CharacterCommands,
) -> Result<(), Box<dyn Error>> {
    match command {
        CharacterCommands::List => match client.list_characters().await {
            Ok(profiles) => {
                if profiles.is_empty() {
                    println!("No characters defined.");
                }
                for profile in profiles {
                    println!(
                        "{:<24} {:<20} {}",
                        profile.id.as_deref().unwrap_or("-"),
                        profile.name,
                        profile.role
                    );
                }
                Ok(())
            }
            Err(e) => fail(&e.user_message()),
        },
        CharacterCommands::Show { id } => match client.fetch_character(&id).await {
            Ok(profile) => {
                println!("{}", profile.describe());
                Ok(())
            }
            Err(e) => fail(&e.user_message()),
        },
        CharacterCommands::Create { fields } => {
            let profile = fields.into_profile();
            match client.create_character(&profile).await {
                Ok(created) => {
                    println!(
                        "✅ Created character '{}' ({})",
                        created.name,
                        created.id.as_deref().unwrap_or("-")
                    );
                    Ok(())
                }
                Err(e) => fail(&e.user_message()),
            }
        }
        CharacterCommands::Update { id, fields } => {
            let profile = fields.into_profile();
            match client.update_character(&id, &profile).await {
                Ok(updated) => {
                    println!("✅ Updated character '{}'", updated.name);
                    Ok(())
                }
                Err(e) => fail(&e.user_message()),
            }
        }
        CharacterCommands::Delete { id, yes } => {
            if !yes && !confirm(&format!("Delete character '{id}'? [y/N] "))? {
                println!("Aborted; nothing was deleted.");
                return Ok(());
            }
            match client.delete_character(&id).await {
                Ok(response) => {
                    println!(
                        "✅ {}",
                        response
                            .message
                            .unwrap_or_else(|| format!("Character '{id}' deleted"))
                    );
                    // The admin view reloads the whole directory after any
                    // mutation; mirror that with a fresh listing.
                    match client.list_characters().await {
                        Ok(profiles) => println!("{} character(s) remaining.", profiles.len()),
                        Err(e) => eprintln!("⚠️  Could not re-fetch the directory: {}", e.user_message()),
                    }
                    Ok(())
                }
                Err(e) => fail(&e.user_message()),
            }
        }
    }
}

fn fail(message: &str) -> Result<(), Box<dyn Error>> {
    eprintln!("❌ {message}");
    std::process::exit(1);
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init();
}

/// Ask a yes/no question on stdin. Anything but an explicit yes declines.
fn confirm(prompt: &str) -> Result<bool, Box<dyn Error>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(is_affirmative(&line))
}

fn is_affirmative(input: &str) -> bool {
    let trimmed = input.trim();
    trimmed.eq_ignore_ascii_case("y") || trimmed.eq_ignore_ascii_case("yes")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_explicit_yes_confirms() {
        assert!(is_affirmative("y\n"));
        assert!(is_affirmative("YES"));
        assert!(!is_affirmative(""));
        assert!(!is_affirmative("n"));
        assert!(!is_affirmative("yep"));
    }

    #[test]
    fn form_fields_split_comma_lists() {
        let fields = CharacterFields {
            name: "Zara".to_string(),
            role: "Friendly alien".to_string(),
            traits: "curious, warm,playful".to_string(),
            tone: "playful".to_string(),
            boundaries: "".to_string(),
            use_case: "casual conversation".to_string(),
            avatar: None,
            background: None,
            system_prompt: Some("You are Zara.".to_string()),
        };
        let profile = fields.into_profile();
        assert_eq!(
            profile.personality_traits,
            vec!["curious", "warm", "playful"]
        );
        assert!(profile.knowledge_boundaries.is_empty());
        assert!(profile.id.is_none());
    }

    #[test]
    fn cli_parses_a_create_invocation() {
        let args = Args::try_parse_from([
            "charade",
            "characters",
            "create",
            "--name",
            "Zara",
            "--role",
            "Friendly alien",
            "--tone",
            "playful",
            "--use-case",
            "casual conversation",
            "--traits",
            "curious, warm",
        ])
        .unwrap();
        match args.command {
            Some(Commands::Characters {
                command: CharacterCommands::Create { fields },
            }) => {
                assert_eq!(fields.name, "Zara");
                assert_eq!(split_list(&fields.traits).len(), 2);
            }
            _ => panic!("expected characters create"),
        }
    }

    #[test]
    fn cli_parses_a_set_invocation() {
        let args =
            Args::try_parse_from(["charade", "set", "default-character", "alien_friend"]).unwrap();
        match args.command {
            Some(Commands::Set {
                command: SetCommands::DefaultCharacter { id },
            }) => assert_eq!(id, "alien_friend"),
            _ => panic!("expected set default-character"),
        }
    }

    #[test]
    fn chat_is_the_default_subcommand() {
        let args = Args::try_parse_from(["charade", "-c", "alien_friend"]).unwrap();
        assert!(args.command.is_none());
        assert_eq!(args.character.as_deref(), Some("alien_friend"));
    }
}
