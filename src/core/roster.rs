//! Local copy of the session's user list.

use std::collections::BTreeMap;

use crate::core::event::User;

/// The most recent roster snapshot, keyed by lowercased nick.
///
/// The session owns the authoritative roster; this cache is replaced
/// wholesale from a fresh snapshot after every presence event so it never
/// drifts from what the session reports.
#[derive(Debug, Clone, Default)]
pub struct RosterCache {
    users: BTreeMap<String, User>,
}

impl RosterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cache with `snapshot`. Duplicate nicks keep the last entry.
    pub fn refresh<I>(&mut self, snapshot: I)
    where
        I: IntoIterator<Item = User>,
    {
        self.users = snapshot
            .into_iter()
            .map(|user| (user.nick.to_lowercase(), user))
            .collect();
    }

    pub fn contains(&self, nick: &str) -> bool {
        self.users.contains_key(&nick.to_lowercase())
    }

    pub fn get(&self, nick: &str) -> Option<&User> {
        self.users.get(&nick.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    /// Users ordered by role, then case-insensitively by nick.
    pub fn sorted(&self) -> Vec<User> {
        let mut users: Vec<User> = self.users.values().cloned().collect();
        sort_users(&mut users);
        users
    }
}

/// Order users by role rank, then case-insensitively by nick.
pub fn sort_users(users: &mut [User]) {
    users.sort_by(|a, b| {
        a.role()
            .cmp(&b.role())
            .then_with(|| a.nick.to_lowercase().cmp(&b.nick.to_lowercase()))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_replaces_previous_snapshot() {
        let mut roster = RosterCache::new();
        roster.refresh(vec![User::new("alice"), User::new("bob")]);
        assert_eq!(roster.len(), 2);

        roster.refresh(vec![User::new("carol")]);
        assert_eq!(roster.len(), 1);
        assert!(roster.contains("Carol"));
        assert!(!roster.contains("alice"));
    }

    #[test]
    fn sorted_groups_by_role_then_nick() {
        let mut roster = RosterCache::new();
        roster.refresh(vec![
            User::new("zed"),
            User::with_features("Bob", ["subscriber"]),
            User::with_features("mod", ["moderator"]),
            User::new("amy"),
        ]);

        let nicks: Vec<String> = roster.sorted().into_iter().map(|u| u.nick).collect();
        assert_eq!(nicks, vec!["mod", "Bob", "amy", "zed"]);
    }

    #[test]
    fn duplicate_nicks_collapse() {
        let mut roster = RosterCache::new();
        roster.refresh(vec![
            User::new("alice"),
            User::with_features("Alice", ["subscriber"]),
        ]);
        assert_eq!(roster.len(), 1);
        assert!(roster.get("alice").unwrap().has_feature("subscriber"));
    }
}
