use super::common::{CommandContext, print_outcome};
use anyhow::Result;
use clap::Args;

/// Run one update check now.
///
/// The outcome is printed and the command succeeds whatever it was, unless
/// `--strict` is given. On a successful install the process restarts into the
/// new executable unless `restart_after_install` is off.
#[derive(Args, Debug)]
pub struct CheckCommand {
    /// Fail unless the check completed (up to date or installed).
    #[arg(long)]
    pub strict: bool,
}

impl CheckCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let executor = context.prepared_executor().await?;
        let outcome = executor.run_check().await;
        print_outcome(&outcome);

        if self.strict {
            outcome.into_result()?;
        }
        Ok(())
    }
}
