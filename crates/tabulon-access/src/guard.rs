//! Route guards.

use serde::{Deserialize, Serialize};

use crate::policy::{AccessPolicy, Module};
use crate::session::SessionState;

fn default_fallback() -> String {
    "/dashboard".to_string()
}

/// Requirements for opening a page.
///
/// Checks run in a fixed order and the first failing one decides the
/// outcome: session loading, session error, not signed in, inactive
/// account, module, single permission, permission list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteGuard {
    #[serde(default)]
    pub module: Option<Module>,
    #[serde(default)]
    pub permission: Option<String>,
    /// Any one suffices unless `require_all` is set.
    #[serde(default)]
    pub permissions: Vec<String>,
    #[serde(default)]
    pub require_all: bool,
    /// Where denied users are sent.
    #[serde(default = "default_fallback")]
    pub fallback_path: String,
}

impl Default for RouteGuard {
    fn default() -> Self {
        RouteGuard {
            module: None,
            permission: None,
            permissions: Vec::new(),
            require_all: false,
            fallback_path: default_fallback(),
        }
    }
}

impl RouteGuard {
    /// A guard that only requires a signed-in, active user.
    pub fn new() -> Self {
        RouteGuard::default()
    }

    pub fn module(mut self, module: Module) -> Self {
        self.module = Some(module);
        self
    }

    pub fn permission(mut self, permission: impl Into<String>) -> Self {
        self.permission = Some(permission.into());
        self
    }

    pub fn any_of<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self.require_all = false;
        self
    }

    pub fn all_of<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self.require_all = true;
        self
    }

    pub fn evaluate(&self, state: &SessionState, policy: &AccessPolicy) -> AccessDecision {
        let user = match state {
            SessionState::Authenticating => return AccessDecision::Loading,
            SessionState::Error(msg) => return AccessDecision::AuthError(msg.clone()),
            SessionState::Anonymous => return AccessDecision::Unauthenticated,
            SessionState::Authenticated(user) => user,
        };

        if !user.is_active {
            return AccessDecision::Suspended;
        }
        if let Some(module) = self.module {
            if !policy.has_module_access(Some(user), module) {
                return AccessDecision::ModuleDenied(module);
            }
        }
        if let Some(permission) = &self.permission {
            if !policy.has_permission(Some(user), permission) {
                return AccessDecision::PermissionDenied(permission.clone());
            }
        }
        if !self.permissions.is_empty() {
            let held = |p: &String| policy.has_permission(Some(user), p);
            let ok = if self.require_all {
                self.permissions.iter().all(held)
            } else {
                self.permissions.iter().any(held)
            };
            if !ok {
                return AccessDecision::PermissionsDenied(self.permissions.clone());
            }
        }
        AccessDecision::Granted
    }

    /// Path to send the user to for a decision, if the page is not shown.
    pub fn redirect_for(&self, decision: &AccessDecision) -> Option<&str> {
        match decision {
            AccessDecision::Granted | AccessDecision::Loading => None,
            AccessDecision::AuthError(_)
            | AccessDecision::Unauthenticated
            | AccessDecision::Suspended => Some("/login"),
            AccessDecision::ModuleDenied(_)
            | AccessDecision::PermissionDenied(_)
            | AccessDecision::PermissionsDenied(_) => Some(&self.fallback_path),
        }
    }
}

/// Outcome of a route guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "decision", content = "detail", rename_all = "snake_case")]
pub enum AccessDecision {
    /// The session is still signing in.
    Loading,
    AuthError(String),
    Unauthenticated,
    /// The account is inactive.
    Suspended,
    ModuleDenied(Module),
    PermissionDenied(String),
    PermissionsDenied(Vec<String>),
    Granted,
}

impl AccessDecision {
    pub fn is_granted(&self) -> bool {
        matches!(self, AccessDecision::Granted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::{Permission, Role, User};

    fn clerk() -> User {
        User::new("1", "clerk@example.com", Role::named("Clerk"))
            .permission(Permission::named("invoice_read"))
            .permission(Permission::named("invoice_write"))
    }

    #[test]
    fn session_states_come_first() {
        let policy = AccessPolicy::default();
        let guard = RouteGuard::new().module(Module::Invoice);

        assert_eq!(
            guard.evaluate(&SessionState::Authenticating, &policy),
            AccessDecision::Loading
        );
        assert_eq!(
            guard.evaluate(&SessionState::Error("expired".into()), &policy),
            AccessDecision::AuthError("expired".into())
        );
        assert_eq!(
            guard.evaluate(&SessionState::Anonymous, &policy),
            AccessDecision::Unauthenticated
        );
    }

    #[test]
    fn inactive_account_is_suspended_before_module_check() {
        let policy = AccessPolicy::default();
        let guard = RouteGuard::new().module(Module::Hrms);
        let state = SessionState::Authenticated(clerk().active(false));
        assert_eq!(guard.evaluate(&state, &policy), AccessDecision::Suspended);
    }

    #[test]
    fn module_then_permission_then_list() {
        let policy = AccessPolicy::default();
        let state = SessionState::Authenticated(clerk());

        let guard = RouteGuard::new().module(Module::Hrms).permission("hrms_write");
        assert_eq!(
            guard.evaluate(&state, &policy),
            AccessDecision::ModuleDenied(Module::Hrms)
        );

        let guard = RouteGuard::new().module(Module::Invoice).permission("invoice_delete");
        assert_eq!(
            guard.evaluate(&state, &policy),
            AccessDecision::PermissionDenied("invoice_delete".into())
        );

        let guard = RouteGuard::new().any_of(["invoice_delete", "invoice_write"]);
        assert!(guard.evaluate(&state, &policy).is_granted());

        let guard = RouteGuard::new().all_of(["invoice_delete", "invoice_write"]);
        assert!(matches!(
            guard.evaluate(&state, &policy),
            AccessDecision::PermissionsDenied(_)
        ));
    }

    #[test]
    fn redirects() {
        let guard = RouteGuard::new();
        assert_eq!(guard.redirect_for(&AccessDecision::Unauthenticated), Some("/login"));
        assert_eq!(
            guard.redirect_for(&AccessDecision::ModuleDenied(Module::Crud)),
            Some("/dashboard")
        );
        assert_eq!(guard.redirect_for(&AccessDecision::Granted), None);
    }
}
