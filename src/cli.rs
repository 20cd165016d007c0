use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "github-h-index")]
#[command(about = "GitHub H-Index - Scores a user by the stars on their own and their organizations' repositories")]
#[command(version = "0.1.0")]
pub struct Cli {
    /// GitHub REST API base URL
    #[arg(long, env = "GITHUB_API_URL", default_value = "https://api.github.com", global = true)]
    pub api_url: String,

    /// Per-request timeout in seconds
    #[arg(long, env = "GITHUB_TIMEOUT_SECS", default_value_t = 30, global = true)]
    pub timeout_secs: u64,

    /// User agent sent to the API
    #[arg(long, env = "GITHUB_USER_AGENT", default_value = "GitHub H-Index/0.1.0", global = true)]
    pub user_agent: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Look up a single user and print the report
    Lookup {
        /// GitHub username
        username: String,

        /// Print the result as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Read usernames from stdin, one lookup per line
    Interactive,

    /// Serve the lookup over HTTP
    Serve {
        /// Port to listen on
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
}
