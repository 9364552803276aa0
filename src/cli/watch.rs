use super::common::CommandContext;
use crate::upgrade::UpdateDecider;
use anyhow::{Result, bail};
use clap::Args;
use std::time::Duration;
use tracing::info;

/// Check for updates periodically until interrupted.
///
/// The first check runs one interval after start. With restarts enabled a
/// successful install replaces this process, which then keeps watching.
#[derive(Args, Debug)]
pub struct WatchCommand {
    /// Seconds between checks. Defaults to `update.check_interval`.
    #[arg(long, value_name = "SECONDS")]
    pub interval: Option<u64>,
}

impl WatchCommand {
    /// Resolve the interval from the flag or the config file.
    pub fn interval(&self, context: &CommandContext) -> Option<Duration> {
        match self.interval {
            Some(0) => None,
            Some(secs) => Some(Duration::from_secs(secs)),
            None => context.update_config().periodic_interval(),
        }
    }

    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let Some(interval) = self.interval(context) else {
            bail!("No check interval: pass --interval or set update.check_interval");
        };

        let decider = UpdateDecider::new(context.prepared_executor().await?);
        info!("Checking for updates every {}s", interval.as_secs());
        let task = decider.spawn_periodic(interval);

        tokio::signal::ctrl_c().await?;
        task.abort();
        info!("Stopped watching for updates");
        Ok(())
    }
}
