//! Users, groups, and the peer list built from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, GroupId, UserId};

/// Public profile details of a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub education: Option<String>,
}

/// A registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub profile: Option<Profile>,
}

impl User {
    /// Display name if the profile sets a non-empty one, else the username.
    pub fn display_name(&self) -> &str {
        self.profile
            .as_ref()
            .and_then(|p| p.display_name.as_deref())
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.username)
    }
}

/// A study group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    pub name: String,
    #[serde(default)]
    pub members: Vec<UserId>,
}

/// What kind of entry a peer is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PeerKind {
    Friend,
    Group,
    Person,
}

/// An entry in the peer browser: either a person or a group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Peer {
    pub id: String,
    pub name: String,
    pub education: Option<String>,
    /// Member count, groups only.
    pub members: Option<usize>,
    pub kind: PeerKind,
}

impl From<&User> for Peer {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.display_name().to_string(),
            education: user.profile.as_ref().and_then(|p| p.education.clone()),
            members: None,
            kind: PeerKind::Person,
        }
    }
}

impl From<&Group> for Peer {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id.to_string(),
            name: group.name.clone(),
            education: None,
            members: Some(group.members.len()),
            kind: PeerKind::Group,
        }
    }
}

/// Filter for the peer browser.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PeerFilter {
    #[default]
    All,
    Friend,
    Group,
    Person,
}

impl PeerFilter {
    /// There are no friendships yet, so `Friend` matches people.
    pub fn matches(&self, peer: &Peer) -> bool {
        match self {
            Self::All => true,
            Self::Friend | Self::Person => {
                matches!(peer.kind, PeerKind::Person | PeerKind::Friend)
            }
            Self::Group => peer.kind == PeerKind::Group,
        }
    }
}

impl fmt::Display for PeerFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::All => "all",
            Self::Friend => "friend",
            Self::Group => "group",
            Self::Person => "person",
        };
        f.write_str(s)
    }
}

impl FromStr for PeerFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "all" => Ok(Self::All),
            "friend" | "friends" => Ok(Self::Friend),
            "group" | "groups" => Ok(Self::Group),
            "person" | "people" => Ok(Self::Person),
            _ => Err(CoreError::InvalidInput(format!("unknown peer filter '{}'", s))),
        }
    }
}

/// Merge users and groups into one peer list (people first) and filter it.
pub fn peers(users: &[User], groups: &[Group], filter: PeerFilter) -> Vec<Peer> {
    users
        .iter()
        .map(Peer::from)
        .chain(groups.iter().map(Peer::from))
        .filter(|p| filter.matches(p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str, username: &str, display: Option<&str>) -> User {
        User {
            id: UserId::new(id),
            username: username.to_string(),
            profile: Some(Profile {
                display_name: display.map(str::to_string),
                education: Some("Applied Informatics".to_string()),
            }),
        }
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(user("1", "jdoe", Some("Jo Doe")).display_name(), "Jo Doe");
        assert_eq!(user("1", "jdoe", None).display_name(), "jdoe");
        assert_eq!(user("1", "jdoe", Some("")).display_name(), "jdoe");
    }

    #[test]
    fn test_user_deserializes_without_profile() {
        let u: User = serde_json::from_str(r#"{"id":"u1","username":"sam"}"#).unwrap();
        assert_eq!(u.profile, None);
        assert_eq!(Peer::from(&u).name, "sam");
    }

    #[test]
    fn test_peers_merge_and_filter() {
        let users = vec![user("u1", "a", None), user("u2", "b", Some("Bea"))];
        let groups = vec![Group {
            id: GroupId::new("g1"),
            name: "Databases".to_string(),
            members: vec![UserId::new("u1"), UserId::new("u2")],
        }];

        let all = peers(&users, &groups, PeerFilter::All);
        assert_eq!(all.len(), 3);
        assert_eq!(all[2].members, Some(2));
        assert_eq!(all[1].education.as_deref(), Some("Applied Informatics"));

        let friends = peers(&users, &groups, PeerFilter::Friend);
        assert_eq!(friends.len(), 2);
        assert!(friends.iter().all(|p| p.kind == PeerKind::Person));

        let only_groups = peers(&users, &groups, PeerFilter::Group);
        assert_eq!(only_groups.len(), 1);
        assert_eq!(only_groups[0].name, "Databases");
    }

    #[test]
    fn test_filter_parse() {
        assert_eq!("Groups".parse::<PeerFilter>().unwrap(), PeerFilter::Group);
        assert!("enemies".parse::<PeerFilter>().is_err());
    }
}
