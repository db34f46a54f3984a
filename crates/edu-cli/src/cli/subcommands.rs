use clap::{Args, Subcommand};

use crate::cli::root_commands::{ActorArgs, FormArgs};

/// Proxy commands.
#[derive(Clone, Debug, Subcommand)]
pub enum ProxyCommands {
    /// Save form values on behalf of a school.
    Save(ProxySaveArgs),
    /// Submit on behalf of a school, optionally auto-approving.
    Submit(ProxySubmitArgs),
}

#[derive(Clone, Debug, Args)]
pub struct ProxySaveArgs {
    #[command(flatten)]
    pub form: FormArgs,
    #[arg(long)]
    pub reason: String,
    /// Entity the data originally belongs to (defaults to the school)
    #[arg(long)]
    pub original: Option<String>,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ProxySubmitArgs {
    #[arg(long)]
    pub school: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub reason: String,
    #[arg(long)]
    pub original: Option<String>,
    /// Move entries straight to approved if the actor holds final approval
    #[arg(long)]
    pub auto_approve: bool,
    #[command(flatten)]
    pub actor: ActorArgs,
}

/// Notification inbox commands.
#[derive(Clone, Debug, Subcommand)]
pub enum NotificationCommands {
    /// List notifications.
    List {
        #[arg(long)]
        recipient: Option<String>,
        #[arg(long)]
        unread: bool,
    },
    /// Mark a notification read.
    Read { id: String },
}
