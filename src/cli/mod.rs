use clap::{Parser, Subcommand};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "blogscribe",
    about = "Blogscribe - turn a video link into a written blog article",
    version,
    long_about = "Resolves a video's title, extracts and transcribes its audio, and asks a text-generation service to write a blog article from the transcript. Articles are saved locally per user."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a blog article from a video link
    Generate {
        /// Video link (youtube.com/watch?v=... or youtu.be/...)
        #[arg(value_name = "URL")]
        link: String,

        /// User the article is saved under
        #[arg(short, long, env = "BLOGSCRIBE_USER", default_value = "local")]
        user: String,
    },

    /// List saved blog articles
    List {
        /// User whose articles to list
        #[arg(short, long, env = "BLOGSCRIBE_USER", default_value = "local")]
        user: String,
    },

    /// Show one saved blog article
    Show {
        /// Article id
        #[arg(value_name = "ID")]
        id: Uuid,

        /// User the article must belong to
        #[arg(short, long, env = "BLOGSCRIBE_USER", default_value = "local")]
        user: String,
    },

    /// Show current configuration
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
