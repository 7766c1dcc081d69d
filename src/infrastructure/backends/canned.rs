#[cfg(test)]
#[path = "canned_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::time;

use crate::domain::models::Backend;
use crate::domain::models::BackendName;
use crate::domain::models::BackendPrompt;
use crate::domain::models::BackendResponse;
use crate::domain::models::Event;
use crate::domain::models::Role;
use crate::domain::services::responses::select_response;
use crate::domain::services::responses::select_topic;

/// Offline assistant answering from the canned campus replies after a short
/// pause that mimics typing.
pub struct Canned {
    typing_delay: Duration,
}

impl Canned {
    pub fn new(typing_delay: Duration) -> Canned {
        return Canned { typing_delay };
    }
}

#[async_trait]
impl Backend for Canned {
    fn name(&self) -> BackendName {
        return BackendName::Canned;
    }

    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<()> {
        return Ok(());
    }

    #[allow(clippy::implicit_return)]
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<()> {
        time::sleep(self.typing_delay).await;

        tracing::debug!(topic = %select_topic(&prompt.text), "Canned reply");
        tx.send(Event::BackendPromptResponse(BackendResponse {
            role: Role::Assistant,
            text: select_response(&prompt.text).to_string(),
            done: true,
        }))?;

        return Ok(());
    }
}
