//! Known users and groups

use crate::Recipient;
use serde::{Deserialize, Serialize};

/// A group the current user belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: String,
    pub name: String,
}

impl GroupInfo {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// An entry in the forward recipient list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardCandidate {
    pub recipient: Recipient,
    /// Text shown in the list
    pub label: String,
}

/// Directory of users and groups visible to this session
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Roster {
    /// Name of the local user
    #[serde(default)]
    pub self_name: String,
    #[serde(default)]
    pub users: Vec<String>,
    #[serde(default)]
    pub groups: Vec<GroupInfo>,
}

impl Roster {
    pub fn new(self_name: impl Into<String>) -> Self {
        Self {
            self_name: self_name.into(),
            users: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Add a user if not already known
    pub fn upsert_user(&mut self, name: impl Into<String>) {
        let name = name.into();
        if !self.users.contains(&name) {
            self.users.push(name);
        }
    }

    pub fn remove_user(&mut self, name: &str) {
        self.users.retain(|u| u != name);
    }

    /// Add a group, or rename it if the id is already known
    pub fn upsert_group(&mut self, group: GroupInfo) {
        match self.groups.iter_mut().find(|g| g.id == group.id) {
            Some(existing) => existing.name = group.name,
            None => self.groups.push(group),
        }
    }

    /// Users (minus ourselves) followed by groups, in roster order
    pub fn forward_candidates(&self) -> Vec<ForwardCandidate> {
        let users = self
            .users
            .iter()
            .filter(|u| **u != self.self_name)
            .map(|u| ForwardCandidate {
                recipient: Recipient::User(u.clone()),
                label: u.clone(),
            });

        let groups = self.groups.iter().map(|g| ForwardCandidate {
            recipient: Recipient::Group(g.id.clone()),
            label: format!("{} (group)", g.name),
        });

        users.chain(groups).collect()
    }
}
