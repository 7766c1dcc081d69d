#[cfg(test)]
#[path = "portal_test.rs"]
mod tests;

use super::ChatSession;
use super::DocumentStore;
use crate::domain::models::completed_count;
use crate::domain::models::onboarding_progress;
use crate::domain::models::seed_notifications;
use crate::domain::models::seed_onboarding_tasks;
use crate::domain::models::seed_upcoming_events;
use crate::domain::models::unread_count;
use crate::domain::models::Notification;
use crate::domain::models::OnboardingTask;
use crate::domain::models::UpcomingEvent;
use crate::domain::models::User;

/// Everything a logged in user sees: who they are, their conversation with
/// the assistant, their documents, their onboarding tasks and their
/// notification feed.
pub struct PortalSession {
    pub user: User,
    pub chat: ChatSession,
    pub documents: DocumentStore,
    pub notifications: Vec<Notification>,
    pub tasks: Vec<OnboardingTask>,
    pub events: Vec<UpcomingEvent>,
}

impl PortalSession {
    pub fn new(user: User, documents: DocumentStore) -> PortalSession {
        let chat = ChatSession::new(&user);

        return PortalSession {
            user,
            chat,
            documents,
            notifications: seed_notifications(),
            tasks: seed_onboarding_tasks(),
            events: seed_upcoming_events(),
        };
    }

    pub fn can_reject(&self) -> bool {
        return self.user.is_admin();
    }

    pub fn unread_notifications(&self) -> usize {
        return unread_count(&self.notifications);
    }

    pub fn completed_tasks(&self) -> usize {
        return completed_count(&self.tasks);
    }

    pub fn task_progress(&self) -> u32 {
        return onboarding_progress(&self.tasks);
    }

    pub fn mark_notifications_read(&mut self) {
        for notification in self.notifications.iter_mut() {
            notification.read = true;
        }
    }
}
