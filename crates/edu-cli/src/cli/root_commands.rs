use clap::{Args, Subcommand};

use crate::cli::subcommands::{NotificationCommands, ProxyCommands};

/// Top-level command tree.
#[derive(Clone, Debug, Subcommand)]
pub enum Commands {
    /// Create the .edu project directory, config, and database.
    Init(InitArgs),
    /// Load regions, sectors, schools, categories, and columns from JSON.
    Seed(SeedArgs),
    /// Save form values for a school.
    Save(SaveArgs),
    /// Submit a school's draft and returned entries for approval.
    Submit(SubmitArgs),
    /// Save or submit on behalf of a school.
    Proxy {
        #[command(subcommand)]
        action: ProxyCommands,
    },
    /// Move one entry to a new status.
    Transition(TransitionArgs),
    /// Reopen a locked entry (superadmin only).
    Reopen(ReopenArgs),
    /// Validate form values against a category without saving.
    Validate(ValidateArgs),
    /// Check whether an actor may move an entry between two statuses.
    #[command(name = "can-transition")]
    CanTransition(CanTransitionArgs),
    /// Query the audit log.
    Audit(AuditArgs),
    /// Notification inbox.
    Notifications {
        #[command(subcommand)]
        action: NotificationCommands,
    },
}

/// The acting user. `final_approval` comes from `approval.final_approvers`.
#[derive(Clone, Debug, Args)]
pub struct ActorArgs {
    #[arg(long)]
    pub actor_id: String,
    /// schooladmin, sectoradmin, regionadmin, superadmin
    #[arg(long)]
    pub role: String,
    /// School, sector, or region id matching the role
    #[arg(long)]
    pub org: Option<String>,
}

/// A school's form for one category.
#[derive(Clone, Debug, Args)]
pub struct FormArgs {
    #[arg(long)]
    pub school: String,
    #[arg(long)]
    pub category: String,
    /// Column value as COLUMN=VALUE (repeatable)
    #[arg(long)]
    pub set: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Clone, Debug, Args)]
pub struct SeedArgs {
    /// Reference data JSON file
    #[arg(long)]
    pub file: String,
}

#[derive(Clone, Debug, Args)]
pub struct SaveArgs {
    #[command(flatten)]
    pub form: FormArgs,
    /// Save straight into pending instead of draft
    #[arg(long)]
    pub submit: bool,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct SubmitArgs {
    #[arg(long)]
    pub school: String,
    #[arg(long)]
    pub category: String,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct EntryKeyArgs {
    #[arg(long)]
    pub school: String,
    #[arg(long)]
    pub category: String,
    #[arg(long)]
    pub column: String,
}

#[derive(Clone, Debug, Args)]
pub struct TransitionArgs {
    #[command(flatten)]
    pub key: EntryKeyArgs,
    /// Target status (e.g. sector_approved, returned)
    #[arg(long)]
    pub to: String,
    /// Required for rejected
    #[arg(long)]
    pub reason: Option<String>,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ReopenArgs {
    #[command(flatten)]
    pub key: EntryKeyArgs,
    #[arg(long)]
    pub reason: Option<String>,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct ValidateArgs {
    #[arg(long)]
    pub category: String,
    /// School used for the sector uniqueness check
    #[arg(long)]
    pub school: Option<String>,
    /// Column value as COLUMN=VALUE (repeatable)
    #[arg(long)]
    pub set: Vec<String>,
}

#[derive(Clone, Debug, Args)]
pub struct CanTransitionArgs {
    #[arg(long)]
    pub school: String,
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
    #[command(flatten)]
    pub actor: ActorArgs,
}

#[derive(Clone, Debug, Args)]
pub struct AuditArgs {
    #[arg(long)]
    pub entity_type: Option<String>,
    #[arg(long)]
    pub entity_id: Option<String>,
    #[arg(long)]
    pub action: Option<String>,
    #[arg(long)]
    pub actor: Option<String>,
}
