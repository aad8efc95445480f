//! Module access policy.
//!
//! A single [`AccessPolicy`] value holds the module to permission table.
//! Every component that gates on access receives the policy explicitly.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::user::User;

/// Top-level application areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Module {
    Dashboard,
    Hrms,
    Invoice,
    Quiz,
    Jobs,
    Crud,
}

impl Module {
    pub const ALL: [Module; 6] = [
        Module::Dashboard,
        Module::Hrms,
        Module::Invoice,
        Module::Quiz,
        Module::Jobs,
        Module::Crud,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Module::Dashboard => "DASHBOARD",
            Module::Hrms => "HRMS",
            Module::Invoice => "INVOICE",
            Module::Quiz => "QUIZ",
            Module::Jobs => "JOBS",
            Module::Crud => "CRUD",
        }
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Module {
    type Err = AccessError;

    /// Case-insensitive.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Module::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| AccessError::UnknownModule(s.to_string()))
    }
}

fn default_admin() -> String {
    "admin".to_string()
}

fn default_wildcard() -> String {
    "*".to_string()
}

/// Which permissions open which module, plus the admin shortcuts.
///
/// ```
/// use tabulon_access::{AccessPolicy, Module, Permission, Role, User};
///
/// let policy = AccessPolicy::default();
/// let clerk = User::new("1", "clerk@example.com", Role::named("Clerk"))
///     .permission(Permission::named("invoice_read"));
///
/// assert!(policy.has_module_access(Some(&clerk), Module::Invoice));
/// assert!(!policy.has_module_access(Some(&clerk), Module::Hrms));
/// assert!(!policy.has_module_access(None, Module::Invoice));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessPolicy {
    /// Role name (case-insensitive) that passes every check.
    #[serde(default = "default_admin")]
    pub admin_role: String,
    /// Permission name that implies every other permission.
    #[serde(default = "default_admin")]
    pub admin_permission: String,
    /// Resource value that implies every permission.
    #[serde(default = "default_wildcard")]
    pub wildcard_resource: String,
    /// Permissions that open each module; any one suffices.
    #[serde(default)]
    pub modules: BTreeMap<Module, Vec<String>>,
}

impl Default for AccessPolicy {
    fn default() -> Self {
        let table: [(Module, &[&str]); 6] = [
            (Module::Dashboard, &["dashboard_read"]),
            (Module::Hrms, &["hrms_read", "employee_read"]),
            (Module::Invoice, &["invoice_read"]),
            (Module::Quiz, &["quiz_read", "training_read"]),
            (Module::Jobs, &["jobs_read", "recruitment_read"]),
            (Module::Crud, &["crud_read", "admin"]),
        ];
        AccessPolicy {
            admin_role: default_admin(),
            admin_permission: default_admin(),
            wildcard_resource: default_wildcard(),
            modules: table
                .into_iter()
                .map(|(module, perms)| (module, perms.iter().map(|p| p.to_string()).collect()))
                .collect(),
        }
    }
}

impl AccessPolicy {
    pub fn from_yaml_str(text: &str) -> Result<Self, AccessError> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, AccessError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Loads a policy file; `.json` files are read as JSON, anything else as
    /// YAML.
    pub fn load(path: &Path) -> Result<Self, AccessError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AccessError::read(path.display().to_string(), e))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json_str(&text)
        } else {
            Self::from_yaml_str(&text)
        }
    }

    /// Permissions that open `module`. Modules missing from the table have
    /// none, so only admins reach them.
    pub fn required_permissions(&self, module: Module) -> &[String] {
        self.modules.get(&module).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_admin(&self, user: &User) -> bool {
        user.role.name.eq_ignore_ascii_case(&self.admin_role)
    }

    /// Returns `true` if the user holds `permission`.
    ///
    /// Admins hold everything, as does anyone with the admin permission or a
    /// permission on the wildcard resource. Nobody holds anything when no
    /// user is signed in.
    pub fn has_permission(&self, user: Option<&User>, permission: &str) -> bool {
        let Some(user) = user else {
            return false;
        };
        if self.is_admin(user) {
            return true;
        }
        user.permissions.iter().any(|p| {
            p.name == permission
                || p.name == self.admin_permission
                || p.resource == self.wildcard_resource
        })
    }

    /// Returns `true` if the user may open `module`.
    pub fn has_module_access(&self, user: Option<&User>, module: Module) -> bool {
        let Some(user) = user else {
            return false;
        };
        if self.is_admin(user) {
            return true;
        }
        self.required_permissions(module)
            .iter()
            .any(|p| self.has_permission(Some(user), p))
    }

    /// Modules the user may open, in declaration order.
    pub fn accessible_modules(&self, user: Option<&User>) -> Vec<Module> {
        Module::ALL
            .into_iter()
            .filter(|m| self.has_module_access(user, *m))
            .collect()
    }
}
