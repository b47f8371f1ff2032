use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "swarmgate", version, about = "Admission control for remote agent swarms")]
pub struct Cli {
    /// Backend base URL (e.g., "http://127.0.0.1:3000")
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run one admission round: spawn workers for ready children up to the policy limit
    Spawn {
        /// Epic to admit work for
        epic_id: String,
    },
    /// Show the epic's children partitioned by status
    Status {
        epic_id: String,
    },
    /// Poll the epic periodically; optionally admit work after each refresh
    Watch {
        epic_id: String,

        /// Run an admission round after every refresh
        #[arg(long)]
        admit: bool,
    },
    /// Tell the backend to stop admitting new work (running workers continue)
    Stop {
        epic_id: String,
    },
}
