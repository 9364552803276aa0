use super::common::CommandContext;
use anyhow::Result;
use clap::Args;

/// Remove `.new`/`.old` files left next to the executable by earlier
/// update attempts.
#[derive(Args, Debug)]
pub struct CleanupCommand {}

impl CleanupCommand {
    pub async fn execute(self, context: &CommandContext) -> Result<()> {
        let executor = context.executor()?;
        let removed = executor.sweep_residue().await;
        if removed == 0 {
            println!("No update leftovers found");
        } else {
            println!("Removed {removed} update leftover(s)");
        }
        Ok(())
    }
}
