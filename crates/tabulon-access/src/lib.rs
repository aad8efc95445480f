//! Tabulon access - module access policy and auth sessions.
//!
//! Access checks here are advisory UI gates: they decide what to show, not
//! what a backend allows. The crate provides:
//!
//! - [`AccessPolicy`]: the module to permission table, passed explicitly to
//!   every check
//! - [`RouteGuard`]: ordered page checks producing an [`AccessDecision`]
//! - [`Session`]: an explicit auth state machine over an injected
//!   [`AuthProvider`]
//! - A navigation tree filtered by module access
//!
//! # Example
//!
//! ```rust
//! use tabulon_access::{
//!     AccessPolicy, Credentials, Module, Permission, Role, RouteGuard, Session,
//!     StaticProvider, User,
//! };
//!
//! let clerk = User::new("1", "clerk@example.com", Role::named("Clerk"))
//!     .permission(Permission::named("invoice_read"));
//! let mut session = Session::new(StaticProvider::new().account("pw", clerk));
//! session.login(&Credentials::new("clerk@example.com", "pw")).unwrap();
//!
//! let policy = AccessPolicy::default();
//! let invoices = RouteGuard::new().module(Module::Invoice);
//! let payroll = RouteGuard::new().module(Module::Hrms);
//!
//! assert!(invoices.evaluate(session.state(), &policy).is_granted());
//! assert!(!payroll.evaluate(session.state(), &policy).is_granted());
//! ```

mod error;
mod guard;
pub mod nav;
mod policy;
mod session;
mod user;

pub use error::{AccessError, SessionError};
pub use guard::{AccessDecision, RouteGuard};
pub use nav::NavItem;
pub use policy::{AccessPolicy, Module};
pub use session::{
    Account, AuthProvider, Credentials, Session, SessionEvent, SessionState, StaticProvider,
};
pub use user::{Permission, Role, User};
