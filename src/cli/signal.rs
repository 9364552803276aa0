use super::common::{CommandContext, print_outcome};
use crate::upgrade::UpdateDecider;
use anyhow::Result;
use clap::Args;

/// Report the version a peer runs.
///
/// Applies the same filter as peer signals inside a long-running host:
/// unknown peers (empty revision), peers on the same revision and peers
/// built at or before this binary are ignored. Otherwise a full check runs.
/// Unlike the library entry point the check runs in the foreground, since
/// the process would exit before a background check finished.
#[derive(Args, Debug)]
pub struct SignalCommand {
    /// Revision tag the peer runs. Empty means unknown.
    #[arg(value_name = "REVISION")]
    pub revision: String,

    /// Build timestamp of the peer's binary.
    #[arg(value_name = "BUILD")]
    pub build: String,
}

impl SignalCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let decider = UpdateDecider::new(context.executor()?);
        if !decider.should_check(&self.revision, &self.build) {
            println!(
                "Peer version {}/{} ignored (local {})",
                self.build,
                self.revision,
                decider.local_version()
            );
            return Ok(());
        }

        if context.update_config().sweep_residue_on_start {
            decider.executor().sweep_residue().await;
        }
        let outcome = decider.executor().run_check().await;
        print_outcome(&outcome);
        Ok(())
    }
}
