//! Auth session lifecycle.
//!
//! The session is an explicit state machine driven by an injected
//! [`AuthProvider`]:
//!
//! ```text
//! Anonymous      --SignInStarted-->  Authenticating
//! Error          --SignInStarted-->  Authenticating
//! Authenticating --SignedIn------->  Authenticated
//! Authenticating --SignInFailed--->  Error
//! Authenticated  --SignedIn------->  Authenticated   (refresh)
//! Authenticated  --RefreshFailed-->  Error
//! Error          --RefreshFailed-->  Error
//! any            --SignedOut------>  Anonymous
//! ```
//!
//! Every other pair is rejected with [`SessionError::InvalidTransition`].

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AccessError, SessionError};
use crate::user::User;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", content = "detail", rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Anonymous,
    Authenticating,
    Authenticated(User),
    /// The last sign-in or refresh failed.
    Error(String),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            SessionState::Anonymous => "anonymous",
            SessionState::Authenticating => "authenticating",
            SessionState::Authenticated(_) => "authenticated",
            SessionState::Error(_) => "error",
        }
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            SessionState::Authenticated(user) => Some(user),
            _ => None,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, SessionState::Authenticated(_))
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Authenticating)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            SessionState::Error(msg) => Some(msg),
            _ => None,
        }
    }

    /// Computes the state after `event`, or rejects the event.
    pub fn next(&self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionEvent as E;
        use SessionState as S;

        match (self, event) {
            (_, E::SignedOut) => Ok(S::Anonymous),
            (S::Anonymous | S::Error(_), E::SignInStarted) => Ok(S::Authenticating),
            (S::Authenticating | S::Authenticated(_), E::SignedIn(user)) => {
                Ok(S::Authenticated(user))
            }
            (S::Authenticating, E::SignInFailed(msg)) => Ok(S::Error(msg)),
            (S::Authenticated(_) | S::Error(_), E::RefreshFailed(msg)) => Ok(S::Error(msg)),
            (state, event) => Err(SessionError::InvalidTransition {
                state: state.name(),
                event: event.name(),
            }),
        }
    }
}

/// Something that happened to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignInStarted,
    SignedIn(User),
    SignInFailed(String),
    SignedOut,
    RefreshFailed(String),
}

impl SessionEvent {
    pub fn name(&self) -> &'static str {
        match self {
            SessionEvent::SignInStarted => "sign_in_started",
            SessionEvent::SignedIn(_) => "signed_in",
            SessionEvent::SignInFailed(_) => "sign_in_failed",
            SessionEvent::SignedOut => "signed_out",
            SessionEvent::RefreshFailed(_) => "refresh_failed",
        }
    }
}

/// Email and password.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Backend that authenticates users.
pub trait AuthProvider {
    /// Verifies credentials and returns the user's profile.
    fn sign_in(&mut self, credentials: &Credentials) -> Result<User, SessionError>;

    fn sign_out(&mut self) -> Result<(), SessionError>;

    /// Re-validates the current sign-in and returns a fresh profile.
    fn refresh(&mut self) -> Result<User, SessionError>;

    /// The user of a still-valid earlier sign-in, if any.
    fn current_user(&self) -> Option<User>;
}

/// A session bound to one provider.
///
/// ```
/// use tabulon_access::{Credentials, Role, Session, StaticProvider, User};
///
/// let user = User::new("1", "al@example.com", Role::named("Staff"));
/// let provider = StaticProvider::new().account("secret", user);
///
/// let mut session = Session::new(provider);
/// session.login(&Credentials::new("al@example.com", "secret")).unwrap();
/// assert!(session.state().is_authenticated());
///
/// session.logout().unwrap();
/// assert!(!session.state().is_authenticated());
/// ```
#[derive(Debug)]
pub struct Session<P: AuthProvider> {
    provider: P,
    state: SessionState,
}

impl<P: AuthProvider> Session<P> {
    pub fn new(provider: P) -> Self {
        Session {
            provider,
            state: SessionState::Anonymous,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn user(&self) -> Option<&User> {
        self.state.user()
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Applies an event to the state machine.
    pub fn apply(&mut self, event: SessionEvent) -> Result<&SessionState, SessionError> {
        let event_name = event.name();
        let next = self.state.next(event)?;
        log::debug!(
            "session {} --{}--> {}",
            self.state.name(),
            event_name,
            next.name()
        );
        self.state = next;
        Ok(&self.state)
    }

    /// Picks up an earlier sign-in from the provider. A session that is
    /// already signed in is left alone.
    pub fn restore(&mut self) -> Result<&SessionState, SessionError> {
        if self.state.is_authenticated() || self.state.is_loading() {
            return Ok(&self.state);
        }
        if let Some(user) = self.provider.current_user() {
            self.apply(SessionEvent::SignInStarted)?;
            self.apply(SessionEvent::SignedIn(user))?;
        }
        Ok(&self.state)
    }

    /// Signs in. On failure the session ends in `Error` and the provider's
    /// error is returned.
    pub fn login(&mut self, credentials: &Credentials) -> Result<&User, SessionError> {
        self.apply(SessionEvent::SignInStarted)?;
        match self.provider.sign_in(credentials) {
            Ok(user) => {
                log::info!("signed in as {}", user.email);
                self.apply(SessionEvent::SignedIn(user))?;
                self.user().ok_or(SessionError::NotSignedIn)
            }
            Err(err) => {
                log::warn!("sign-in failed: {err}");
                self.apply(SessionEvent::SignInFailed(err.to_string()))?;
                Err(err)
            }
        }
    }

    /// Signs out. The session is anonymous afterwards even when the
    /// provider reports an error.
    pub fn logout(&mut self) -> Result<(), SessionError> {
        let result = self.provider.sign_out();
        if let Err(err) = &result {
            log::warn!("sign-out failed: {err}");
        }
        self.apply(SessionEvent::SignedOut)?;
        result
    }

    /// Refreshes an authenticated session, or retries after an error.
    pub fn refresh(&mut self) -> Result<&User, SessionError> {
        let retrying = match &self.state {
            SessionState::Authenticated(_) => false,
            SessionState::Error(_) => true,
            other => {
                return Err(SessionError::InvalidTransition {
                    state: other.name(),
                    event: "refresh",
                })
            }
        };
        if retrying {
            self.apply(SessionEvent::SignInStarted)?;
        }
        match self.provider.refresh() {
            Ok(user) => {
                self.apply(SessionEvent::SignedIn(user))?;
                self.user().ok_or(SessionError::NotSignedIn)
            }
            Err(err) => {
                let event = if retrying {
                    SessionEvent::SignInFailed(err.to_string())
                } else {
                    SessionEvent::RefreshFailed(err.to_string())
                };
                self.apply(event)?;
                Err(err)
            }
        }
    }
}

/// One sign-in account of a [`StaticProvider`].
#[derive(Debug, Clone, Deserialize)]
pub struct Account {
    pub password: String,
    pub user: User,
}

/// In-memory credential directory.
///
/// Directories load from YAML or JSON as a list of accounts:
///
/// ```yaml
/// - password: secret
///   user:
///     id: "1"
///     email: al@example.com
///     role: { name: Admin }
/// ```
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    accounts: BTreeMap<String, Account>,
    current: Option<String>,
}

impl StaticProvider {
    pub fn new() -> Self {
        StaticProvider::default()
    }

    /// Adds an account keyed by the user's email.
    pub fn account(mut self, password: impl Into<String>, user: User) -> Self {
        self.insert(Account {
            password: password.into(),
            user,
        });
        self
    }

    pub fn insert(&mut self, account: Account) {
        self.accounts
            .insert(account.user.email.to_lowercase(), account);
    }

    pub fn from_accounts(accounts: impl IntoIterator<Item = Account>) -> Self {
        let mut provider = StaticProvider::new();
        for account in accounts {
            provider.insert(account);
        }
        provider
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, AccessError> {
        let accounts: Vec<Account> = serde_yaml::from_str(text)?;
        Ok(Self::from_accounts(accounts))
    }

    /// Loads a directory file; `.json` files are read as JSON, anything else
    /// as YAML.
    pub fn load(path: &Path) -> Result<Self, AccessError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AccessError::read(path.display().to_string(), e))?;
        if path.extension().is_some_and(|ext| ext == "json") {
            let accounts: Vec<Account> = serde_json::from_str(&text)?;
            Ok(Self::from_accounts(accounts))
        } else {
            Self::from_yaml_str(&text)
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }
}

impl AuthProvider for StaticProvider {
    /// Emails match case-insensitively; passwords exactly.
    fn sign_in(&mut self, credentials: &Credentials) -> Result<User, SessionError> {
        let key = credentials.email.trim().to_lowercase();
        match self.accounts.get(&key) {
            Some(account) if account.password == credentials.password => {
                self.current = Some(key);
                Ok(account.user.clone())
            }
            _ => Err(SessionError::InvalidCredentials),
        }
    }

    fn sign_out(&mut self) -> Result<(), SessionError> {
        self.current = None;
        Ok(())
    }

    fn refresh(&mut self) -> Result<User, SessionError> {
        self.current_user().ok_or(SessionError::NotSignedIn)
    }

    fn current_user(&self) -> Option<User> {
        self.current
            .as_ref()
            .and_then(|key| self.accounts.get(key))
            .map(|account| account.user.clone())
    }
}
