#[cfg(test)]
#[path = "auth_services_test.rs"]
mod tests;

use crate::domain::models::User;
use crate::domain::models::UserRole;

struct MockAccount {
    password: &'static str,
    user: User,
}

/// Hard-coded portal accounts standing in for a real identity service.
pub struct AuthService {
    accounts: Vec<MockAccount>,
}

impl Default for AuthService {
    fn default() -> AuthService {
        return AuthService {
            accounts: vec![
                MockAccount {
                    password: "student123",
                    user: User {
                        id: "STU-2025-001".to_string(),
                        name: "Arjun Reddy".to_string(),
                        email: "student@campus.edu".to_string(),
                        role: UserRole::Student,
                        batch: Some("2025".to_string()),
                        department: Some("B.Tech CSE".to_string()),
                    },
                },
                MockAccount {
                    password: "admin123",
                    user: User {
                        id: "ADM-001".to_string(),
                        name: "Dr. Priya Menon".to_string(),
                        email: "admin@campus.edu".to_string(),
                        role: UserRole::Admin,
                        batch: None,
                        department: None,
                    },
                },
            ],
        };
    }
}

impl AuthService {
    /// Email, password and role must all match one account.
    pub fn login(&self, email: &str, password: &str, role: &str) -> Option<User> {
        let role = UserRole::parse(role)?;
        let account = self
            .accounts
            .iter()
            .find(|account| return account.user.role == role)?;

        if account.user.email != email || account.password != password {
            tracing::warn!(email, role = %role, "Login failed");
            return None;
        }

        tracing::info!(user_id = account.user.id.as_str(), role = %role, "Logged in");
        return Some(account.user.clone());
    }
}
