use std::collections::HashMap;

use crate::domain::{Actor, Role};

/// Accounts known to the mock authentication. Keyed by email.
#[derive(Debug, Clone, Default)]
pub struct AccountDirectory {
    accounts: HashMap<String, Actor>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The two demo accounts: a customer and a worker with a finished profile.
    pub fn with_demo_accounts() -> Self {
        let mut directory = Self::new();

        let mut customer = Actor::register("1", "John Doe", "user@example.com", Role::Customer);
        customer.location = Some("New York, NY".to_string());
        directory.register(customer);

        let mut worker = Actor::register("2", "Jane Smith", "worker@example.com", Role::Worker);
        worker.profile_complete = true;
        worker.profile_picture = Some(
            "https://images.unsplash.com/photo-1472099645785-5658abf4ff4e?w=300&h=300".to_string(),
        );
        worker.location = Some("Brooklyn, NY".to_string());
        worker.skills = Some(vec![
            "Plumbing".to_string(),
            "Electrical".to_string(),
            "Painting".to_string(),
        ]);
        directory.register(worker);

        directory
    }

    pub fn find_by_email(&self, email: &str) -> Option<&Actor> {
        self.accounts.get(&normalize(email))
    }

    /// Inserts or replaces the account registered under the actor's email.
    pub fn register(&mut self, actor: Actor) {
        self.accounts.insert(normalize(&actor.email), actor);
    }

    /// Writes back a changed profile, dropping the entry under its old email if it moved.
    pub fn update(&mut self, actor: &Actor) {
        self.accounts.retain(|_, existing| existing.id != actor.id);
        self.register(actor.clone());
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case_and_whitespace() {
        let directory = AccountDirectory::with_demo_accounts();
        assert_eq!(directory.len(), 2);
        assert_eq!(directory.find_by_email(" Worker@Example.com ").map(|a| a.id.as_str()), Some("2"));
        assert!(directory.find_by_email("nobody@example.com").is_none());
    }

    #[test]
    fn test_update_follows_email_change() {
        let mut directory = AccountDirectory::with_demo_accounts();
        let mut customer = directory.find_by_email("user@example.com").cloned().unwrap();
        customer.email = "john@example.com".to_string();

        directory.update(&customer);

        assert!(directory.find_by_email("user@example.com").is_none());
        assert_eq!(directory.find_by_email("john@example.com"), Some(&customer));
        assert_eq!(directory.len(), 2);
    }
}
