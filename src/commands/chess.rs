use super::{Command, CommandContext, CommandResult};
use crate::game::Session;
use async_trait::async_trait;
use shared::ChatMessage;
use tracing::{info, warn};

/// `chess [@opponent]`: set up a match and play it to the end
pub struct ChessCommand;

#[async_trait]
impl Command for ChessCommand {
    fn names(&self) -> &[&'static str] {
        &["chess", "xadrez"]
    }

    fn help(&self, prefix: &str) -> String {
        format!("Use {prefix}chess and your move.")
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        message: &ChatMessage,
        _args: &[String],
    ) -> CommandResult<()> {
        let mut session = match Session::establish(&ctx.sessions, message).await {
            Ok(session) => session,
            Err(err) => {
                warn!("[SETUP] Match requested by {} aborted: {}", message.author, err);
                if let Some(notice) = err.notice() {
                    ctx.transport()
                        .send_message(message.channel, notice.into())
                        .await?;
                }
                return Err(err.into());
            }
        };

        let outcome = session.play().await?;
        info!("[BOT] Session {} ended with {:?}", session.id(), outcome);
        Ok(())
    }
}
