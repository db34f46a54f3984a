use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(command: Commands, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    match command {
        Commands::Seed(args) => commands::seed::handle(&args, ctx, flags).await,
        Commands::Save(args) => commands::save::handle(&args, ctx, flags).await,
        Commands::Submit(args) => commands::submit::handle(&args, ctx, flags).await,
        Commands::Proxy { action } => commands::proxy::handle(&action, ctx, flags).await,
        Commands::Transition(args) => commands::transition::handle(&args, ctx, flags).await,
        Commands::Reopen(args) => commands::reopen::handle(&args, ctx, flags).await,
        Commands::Validate(args) => commands::validate::handle(&args, ctx, flags).await,
        Commands::CanTransition(args) => commands::can_transition::handle(&args, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Notifications { action } => {
            commands::notifications::handle(&action, ctx, flags).await
        }
        Commands::Init(_) => anyhow::bail!("init is handled before the context is opened"),
    }
}
