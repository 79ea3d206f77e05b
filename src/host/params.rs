use std::path::PathBuf;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "chatcore")]
pub struct Params {
    /// Optional TOML file with broker settings.
    #[arg(long, env = "CHATCORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Subscribers registered at startup.
    #[arg(long, env = "CHATCORE_USERS", value_delimiter = ',', default_value = "alice,bob,carol")]
    pub users: Vec<String>,

    /// Capacity of each subscriber's mailbox.
    #[arg(long, env = "CHATCORE_MAILBOX_CAPACITY", default_value_t = 16)]
    pub mailbox_capacity: usize,

    #[arg(long, env = "CHATCORE_LOG_LEVEL", default_value_t = tracing::Level::INFO)]
    pub log_level: tracing::Level,
}
