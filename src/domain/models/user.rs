use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum UserRole {
    Student,
    Admin,
}

impl UserRole {
    pub fn parse(text: &str) -> Option<UserRole> {
        return UserRole::iter().find(|e| return e.to_string() == text);
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub batch: Option<String>,
    pub department: Option<String>,
}

impl User {
    /// First name with honorifics such as "Dr." skipped.
    pub fn first_name(&self) -> &str {
        return self
            .name
            .split_whitespace()
            .find(|part| return !part.ends_with('.'))
            .unwrap_or(&self.name);
    }

    pub fn is_admin(&self) -> bool {
        return self.role == UserRole::Admin;
    }
}
