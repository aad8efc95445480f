//! Users, roles and permissions.

use serde::{Deserialize, Serialize};

/// A named permission on a resource.
///
/// A resource of `*` grants every permission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub resource: String,
    #[serde(default)]
    pub action: String,
}

impl Permission {
    /// A permission with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Permission {
            id: name.clone(),
            name,
            resource: String::new(),
            action: String::new(),
        }
    }

    pub fn on(mut self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.resource = resource.into();
        self.action = action.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Role {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<Permission>,
}

impl Role {
    pub fn named(name: impl Into<String>) -> Self {
        let name = name.into();
        Role {
            id: name.to_lowercase(),
            name,
            ..Role::default()
        }
    }
}

fn default_active() -> bool {
    true
}

/// A signed-in user.
///
/// Access checks read the user's own permission list; the role contributes
/// only its name (for the admin shortcut).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: Vec<Permission>,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl User {
    pub fn new(id: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        User {
            id: id.into(),
            email: email.into(),
            first_name: String::new(),
            last_name: String::new(),
            role,
            permissions: Vec::new(),
            is_active: true,
        }
    }

    pub fn named(mut self, first: impl Into<String>, last: impl Into<String>) -> Self {
        self.first_name = first.into();
        self.last_name = last.into();
        self
    }

    pub fn permission(mut self, permission: Permission) -> Self {
        self.permissions.push(permission);
        self
    }

    pub fn active(mut self, is_active: bool) -> Self {
        self.is_active = is_active;
        self
    }

    /// "First Last", falling back to the email when both are empty.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.clone()
        } else {
            full.to_string()
        }
    }
}
