#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use crate::domain::models::ChatMessage;
use crate::domain::models::Role;
use crate::domain::models::User;

pub fn greeting(user: &User) -> String {
    return format!(
        "👋 Hi {}! I'm your CampusFlow AI assistant. I can help you navigate your entire onboarding process — from documents to courses. How can I help?",
        user.first_name()
    );
}

/// Append-only chat history for one portal session.
#[derive(Default)]
pub struct ChatSession {
    messages: Vec<ChatMessage>,
}

impl ChatSession {
    pub fn new(user: &User) -> ChatSession {
        let mut session = ChatSession::default();
        session.push_assistant(&greeting(user));

        return session;
    }

    pub fn messages(&self) -> &[ChatMessage] {
        return &self.messages;
    }

    /// Blank input never becomes a message.
    pub fn push_user(&mut self, text: &str) -> Option<&ChatMessage> {
        if text.trim().is_empty() {
            return None;
        }

        self.messages.push(ChatMessage::new(Role::User, text));
        return self.messages.last();
    }

    pub fn push_assistant(&mut self, text: &str) -> &ChatMessage {
        self.messages.push(ChatMessage::new(Role::Assistant, text));
        return &self.messages[self.messages.len() - 1];
    }
}
