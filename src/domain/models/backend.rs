#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use anyhow::Result;
use async_trait::async_trait;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::sync::mpsc;

use super::Event;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum BackendName {
    Canned,
}

impl BackendName {
    pub fn parse(text: &str) -> Option<BackendName> {
        return BackendName::iter().find(|e| return e.to_string() == text);
    }
}

pub struct BackendPrompt {
    pub text: String,
}

impl BackendPrompt {
    pub fn new(text: &str) -> BackendPrompt {
        return BackendPrompt {
            text: text.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BackendResponse {
    pub role: Role,
    pub text: String,
    pub done: bool,
}

#[async_trait]
pub trait Backend {
    fn name(&self) -> BackendName;

    /// Used at startup to verify the assistant is able to answer.
    async fn health_check(&self) -> Result<()>;

    /// Answers a prompt. Replies may be streamed back through the channel,
    /// with `done` set on the final part.
    async fn get_completion<'a>(
        &self,
        prompt: BackendPrompt,
        tx: &'a mpsc::UnboundedSender<Event>,
    ) -> Result<()>;
}

pub type BackendBox = Box<dyn Backend + Send + Sync>;
