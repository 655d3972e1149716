//! CLI interface for storyloom.

pub mod handlers;
pub mod output;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use output::OutputMode;

/// storyloom - story-handler runtime for live chat stories
#[derive(Parser)]
#[command(name = "storyloom", version, about, long_about = None)]
pub struct Cli {
    /// Override data directory (default: ~/.storyloom)
    #[arg(long, env = "STORYLOOM_DATA_PATH", global = true)]
    pub data_path: Option<PathBuf>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    pub json: bool,

    /// Output as Markdown
    #[arg(long, global = true)]
    pub md: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Which story a command acts on.
#[derive(clap::Args, Debug, Clone)]
pub struct StoryArgs {
    /// Story ID
    #[arg(long)]
    pub story: String,
    /// Owning user ID
    #[arg(long, default_value = "local")]
    pub user: String,
    /// Model/embedding provider chosen for the story
    #[arg(long, default_value = "local")]
    pub provider: String,
    /// Handler name (default: runtime config's default_handler)
    #[arg(long)]
    pub handler: Option<String>,
    /// Handler config as a JSON object
    #[arg(long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect registered handlers
    #[command(subcommand)]
    Handlers(HandlerCommands),

    /// Render the prompt a handler would send for an input (nothing is saved)
    Prompt {
        #[command(flatten)]
        story: StoryArgs,
        /// Free text, or a JSON payload (e.g. '{"type":"user_chat","data":{...}}')
        input: String,
    },

    /// Run a full turn against a scripted model response and save it
    Turn {
        #[command(flatten)]
        story: StoryArgs,
        /// Free text, or a JSON payload
        input: String,
        /// The model's response, streamed back in chunks
        #[arg(long, default_value = r#"{"clips":[{"speech":"收到！"}]}"#)]
        response: String,
        /// Characters per streamed chunk
        #[arg(long, default_value = "8")]
        chunk_chars: usize,
    },

    /// Show a story's recent messages
    History {
        /// Story ID
        story: String,
        /// Maximum messages
        #[arg(long, default_value = "20")]
        limit: usize,
    },

    /// Store a memory for a user (seeding; extraction normally does this)
    Remember {
        /// User ID
        #[arg(long)]
        user: String,
        /// Memory text
        content: String,
        /// Category label
        #[arg(long, default_value = "fact")]
        category: String,
        /// Importance 0.0 - 1.0
        #[arg(long, default_value = "0.5")]
        importance: f32,
        /// Provider used to embed the memory
        #[arg(long, default_value = "local")]
        provider: String,
    },

    /// Replay the clips of the last reply (hotkey action)
    Replay {
        /// Replay the last live-event reply instead of the last spoken reply
        #[arg(long)]
        live: bool,
    },
}

#[derive(Subcommand)]
pub enum HandlerCommands {
    /// List registered handler names
    List,
    /// Show a handler's metadata
    Describe {
        /// Handler name
        name: String,
    },
}

/// Execute a CLI command.
pub async fn execute(
    command: &Commands,
    ctx: &crate::init::AppContext,
    mode: OutputMode,
) -> anyhow::Result<()> {
    match command {
        Commands::Handlers(HandlerCommands::List) => handlers::handler::handle_list(ctx, mode)?,
        Commands::Handlers(HandlerCommands::Describe { name }) => {
            handlers::handler::handle_describe(ctx, name, mode)?
        }
        Commands::Prompt { story, input } => {
            handlers::turn::handle_prompt(ctx, story, input, mode).await?
        }
        Commands::Turn {
            story,
            input,
            response,
            chunk_chars,
        } => handlers::turn::handle_turn(ctx, story, input, response, *chunk_chars, mode).await?,
        Commands::History { story, limit } => {
            handlers::history::handle_history(ctx, story, *limit, mode).await?
        }
        Commands::Remember {
            user,
            content,
            category,
            importance,
            provider,
        } => {
            handlers::history::handle_remember(
                ctx,
                user,
                content,
                category,
                *importance,
                provider,
                mode,
            )
            .await?
        }
        Commands::Replay { live } => handlers::turn::handle_replay(ctx, *live, mode).await?,
    }

    Ok(())
}
