use crate::feedback::FeedbackKind;
use clap::{Parser, Subcommand};

/// `classpulse` - offline-tolerant class feedback queue.
#[derive(Parser, Debug)]
#[command(name = "classpulse")]
#[command(version = "0.1.0")]
#[command(about = "Send lightweight class feedback; queued offline, synced in the background.", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Queue one piece of feedback (understand, question, confused, repeat)
    Send {
        /// Feedback kind
        kind: FeedbackKind,

        /// Optional free-form text (max 500 characters)
        #[arg(short, long, default_value = "")]
        text: String,
    },

    /// Show the feedback history, newest first
    History,

    /// Run exactly one sync cycle now
    Sync,

    /// Run the recurring background sync until interrupted
    Daemon,
}
