use muster_config::MusterConfig;
use muster_store::RecoveryMode;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
///
/// Every command except `recover` opens the runtime directory in strict mode;
/// pending snapshot writes are drained before returning, even on failure.
pub async fn dispatch(
    command: Commands,
    config: MusterConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if let Commands::Recover(args) = &command {
        return commands::recover::handle(args, config, flags).await;
    }

    let (ctx, _) = AppContext::init(config, flags, RecoveryMode::Strict).await?;
    let result = match command {
        Commands::Load(args) => commands::load::handle(&args, &ctx, flags).await,
        Commands::Sign(args) => commands::sign::handle(&args, &ctx, flags).await,
        Commands::Status(args) => commands::status::handle(&args, &ctx, flags).await,
        Commands::Schedule(args) => commands::schedule::handle(&args, &ctx, flags).await,
        Commands::Recent(args) => commands::recent::handle(&args, &ctx, flags).await,
        Commands::Drill(args) => commands::drill::handle(&args, &ctx, flags).await,
        Commands::Notify(args) => commands::notify::handle(&args, &ctx, flags).await,
        Commands::Settings { action } => commands::settings::handle(&action, &ctx, flags).await,
        Commands::Archive => commands::archive::handle(&ctx, flags).await,
        Commands::Health => commands::health::handle(&ctx, flags).await,
        Commands::Recover(_) => unreachable!("recover is pre-dispatched"),
    };
    let closed = ctx.close().await;
    result?;
    closed
}
