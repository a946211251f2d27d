use axial_config::AxialConfig;

use crate::cli::{Commands, GlobalFlags};

pub mod classify;
pub mod summary;
pub mod trends;

mod shared;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    config: AxialConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Classify(args) => classify::handle(&args, config, flags).await,
        Commands::Trends(args) => trends::handle(&args, config, flags).await,
        Commands::Summary(args) => summary::handle(&args, config, flags),
    }
}
