//! Hub directory models used for author and author-group lookups.

use serde::Deserialize;

/// Represents a Hub user account: ring id, display name, login and profile avatar.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HubUser {
    pub id: Option<String>,
    pub name: Option<String>,
    pub login: Option<String>,
    #[serde(default)]
    pub profile: Option<HubProfile>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubProfile {
    #[serde(default)]
    pub avatar: Option<HubAvatar>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubAvatar {
    pub url: Option<String>,
}

impl HubUser {
    /// Returns the avatar URL when the profile carries one.
    pub fn avatar_url(&self) -> Option<String> {
        self.profile
            .as_ref()
            .and_then(|profile| profile.avatar.as_ref())
            .and_then(|avatar| avatar.url.clone())
    }

    /// Display name, falling back to the login.
    pub fn display_name(&self) -> Option<String> {
        self.name.clone().or_else(|| self.login.clone())
    }
}

/// Represents a Hub user group: ring id and name.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct HubUserGroup {
    pub id: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UserPage {
    #[serde(default)]
    pub users: Vec<HubUser>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct UserGroupPage {
    #[serde(default)]
    pub usergroups: Vec<HubUserGroup>,
}
