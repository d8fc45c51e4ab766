use anyhow::Context;
use muster_config::MusterConfig;
use muster_store::RecoveryMode;
use muster_store::snapshot::archive::list_archives;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::RecoverArgs;
use crate::context::AppContext;
use crate::output::output;

/// Handle `muster recover`: open the runtime directory with an explicit
/// recovery choice and report what was replayed.
pub async fn handle(
    args: &RecoverArgs,
    config: MusterConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mode = if args.clean_slate {
        RecoveryMode::CleanSlate
    } else if let Some(path) = &args.from_archive {
        RecoveryMode::FromArchive(path.clone())
    } else {
        let runtime = AppContext::runtime_dir(&config, flags);
        let newest = list_archives(&runtime.archive_dir())?
            .pop()
            .with_context(|| {
                format!(
                    "no archived snapshots in {}",
                    runtime.archive_dir().display()
                )
            })?;
        RecoveryMode::FromArchive(newest)
    };

    let (ctx, report) = AppContext::init(config, flags, mode).await?;
    ctx.close().await?;
    output(&report, flags.format)
}
