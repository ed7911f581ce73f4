use serde::{Deserialize, Serialize};

/// Role names as the user API reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Role {
    Admin,
    SiteUser,
    Other(String),
}

impl Role {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "Admin" => Role::Admin,
            "Site User" => Role::SiteUser,
            other => Role::Other(other.to_string()),
        }
    }

    /// The one capability check: may this role advance a component through
    /// any forward step?
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Site users only see the projects they are assigned to.
    pub fn is_project_scoped(&self) -> bool {
        matches!(self, Role::SiteUser)
    }
}

/// What the lifecycle rules know about the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Elevated,
    Restricted,
}

impl Actor {
    pub fn is_elevated(self) -> bool {
        matches!(self, Actor::Elevated)
    }
}

impl From<&Role> for Actor {
    fn from(role: &Role) -> Self {
        if role.is_elevated() {
            Actor::Elevated
        } else {
            Actor::Restricted
        }
    }
}

/// Response of the username check endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCheck {
    pub is_valid: bool,
    #[serde(default)]
    pub role: Option<String>,
}

/// A verified user. Only built from a successful username check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    username: String,
    role: Role,
}

impl Session {
    pub(crate) fn verified(username: impl Into<String>, role: Role) -> Self {
        Self {
            username: username.into(),
            role,
        }
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn actor(&self) -> Actor {
        Actor::from(&self.role)
    }
}
