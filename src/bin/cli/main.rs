mod app;
mod commands;
mod render;
#[cfg(feature = "tui")]
mod tui;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use flashcard_ai_lib::gateways::generation::DEFAULT_FLASHCARDS;
use flashcard_ai_lib::gateways::TextLength;
use flashcard_ai_lib::settings::VoiceSource;

#[derive(Parser)]
#[command(name = "flashcard-cli", about = "Generate and study AI flashcard sets", version)]
struct Cli {
    /// Config file (default: ~/.config/flashcard-ai/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Keep all data in memory for this run only
    #[arg(long, global = true)]
    ephemeral: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a new flashcard set with the AI
    Generate {
        /// Set name; also the topic unless --content is given
        name: String,
        /// Source text to generate from (use "-" to read from stdin)
        #[arg(long)]
        content: Option<String>,
        /// Number of flashcards (5-100)
        #[arg(long, default_value_t = DEFAULT_FLASHCARDS)]
        count: u32,
        /// Length of the front text
        #[arg(long, default_value = "short")]
        front: TextLength,
        /// Length of the back text
        #[arg(long, default_value = "medium")]
        back: TextLength,
    },

    /// List flashcard sets, newest first
    List,

    /// Show the cards of a set (default: the active set)
    Show {
        /// Set name or id (case-insensitive prefix match)
        set: Option<String>,
    },

    /// Choose the active set
    Use {
        /// Set name or id
        #[arg(required_unless_present = "none")]
        set: Option<String>,
        /// Clear the active set
        #[arg(long, conflicts_with = "set")]
        none: bool,
    },

    /// Delete a set and all its cards
    Delete {
        /// Set name or id
        set: String,
    },

    /// Add, edit or delete single cards
    #[command(subcommand)]
    Card(CardCommand),

    /// Read text aloud into an audio file
    Speak {
        /// Text to speak (reads stdin when omitted)
        text: Option<String>,
        /// Voice from the catalog (default: saved voice)
        #[arg(long)]
        voice: Option<String>,
        /// Output file; the extension is added when missing
        #[arg(long, short)]
        output: PathBuf,
    },

    /// Show or change text-to-speech settings
    Voice {
        /// browser or ai
        #[arg(long)]
        source: Option<VoiceSource>,
        /// AI voice name
        #[arg(long)]
        voice: Option<String>,
    },

    /// Study a set interactively
    #[cfg(feature = "tui")]
    Study {
        /// Set name or id (default: the active set)
        set: Option<String>,
    },
}

#[derive(Subcommand)]
enum CardCommand {
    /// Append a card
    Add {
        front: String,
        back: String,
        /// Set name or id (default: the active set)
        #[arg(long)]
        set: Option<String>,
    },

    /// Change one or both sides of a card
    Edit {
        /// Card number (1-based) or id prefix
        card: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        #[arg(long)]
        set: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card number (1-based) or id prefix
        card: String,
        #[arg(long)]
        set: Option<String>,
    },
}

/// Read content from stdin if piped, or resolve "-" as stdin
fn resolve_content(content: Option<String>) -> Option<String> {
    match content.as_deref() {
        Some("-") => {
            let mut buf = String::new();
            std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
            Some(buf)
        }
        Some(_) => content,
        None => {
            // Auto-detect piped stdin
            if !stdin_is_tty() {
                let mut buf = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buf).ok();
                if buf.trim().is_empty() { None } else { Some(buf) }
            } else {
                None
            }
        }
    }
}

/// Check if stdin is a terminal (not piped)
fn stdin_is_tty() -> bool {
    unsafe { libc_isatty(0) != 0 }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && atty_check();
    let mut app = app::App::new(cli.config.as_deref(), cli.ephemeral)?;

    match cli.command {
        None => {
            // No subcommand → study the active set
            #[cfg(feature = "tui")]
            {
                tui::run(app, None)?;
            }
            #[cfg(not(feature = "tui"))]
            {
                commands::list::run(&app, &cli.format, use_color)?;
            }
        }
        Some(Command::Generate { name, content, count, front, back }) => {
            let content = resolve_content(content);
            let form = commands::generate::GenerateForm {
                name,
                content,
                count,
                front,
                back,
            };
            commands::generate::run(&mut app, form, &cli.format, use_color)?;
        }
        Some(Command::List) => {
            commands::list::run(&app, &cli.format, use_color)?;
        }
        Some(Command::Show { set }) => {
            commands::show::run(&app, set.as_deref(), &cli.format, use_color)?;
        }
        Some(Command::Use { set, none }) => {
            let target = if none { None } else { set.as_deref() };
            commands::set::run_use(&mut app, target, use_color)?;
        }
        Some(Command::Delete { set }) => {
            commands::set::run_delete(&mut app, &set, use_color)?;
        }
        Some(Command::Card(subcmd)) => match subcmd {
            CardCommand::Add { front, back, set } => {
                commands::card::run_add(&mut app, set.as_deref(), &front, &back, &cli.format)?;
            }
            CardCommand::Edit { card, front, back, set } => {
                commands::card::run_edit(
                    &mut app,
                    set.as_deref(),
                    &card,
                    front.as_deref(),
                    back.as_deref(),
                )?;
            }
            CardCommand::Delete { card, set } => {
                commands::card::run_delete(&mut app, set.as_deref(), &card)?;
            }
        },
        Some(Command::Speak { text, voice, output }) => {
            let text = text.or_else(|| resolve_content(None)).unwrap_or_default();
            commands::speak::run_speak(&app, &text, voice.as_deref(), &output)?;
        }
        Some(Command::Voice { source, voice }) => {
            commands::speak::run_voice(&mut app, source, voice.as_deref(), &cli.format)?;
        }
        #[cfg(feature = "tui")]
        Some(Command::Study { set }) => {
            tui::run(app, set.as_deref())?;
        }
    }

    Ok(())
}

/// Check if stdout is a terminal (for color support)
fn atty_check() -> bool {
    unsafe { libc_isatty(1) != 0 }
}

extern "C" {
    #[link_name = "isatty"]
    fn libc_isatty(fd: i32) -> i32;
}
