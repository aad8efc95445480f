//! `tabulon access`: sign in and report what the user may open.

use anyhow::{anyhow, bail, Context, Result};
use serde::Serialize;
use tabulon_access::nav::{active_item, default_tree, visible_items};
use tabulon_access::{
    AccessDecision, AccessPolicy, Credentials, Module, NavItem, RouteGuard, Session,
    SessionState, StaticProvider,
};

use crate::cli::AccessArgs;
use crate::config::{Settings, ENV_PASSWORD};
use crate::env::Environment;
use crate::output::OutputMode;

/// Structured output of `access`.
#[derive(Debug, Serialize)]
pub struct AccessReport {
    pub session: SessionState,
    pub modules: Vec<Module>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nav: Option<Vec<NavItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<PageCheck>,
}

/// Route guard outcome for one page.
#[derive(Debug, Serialize)]
pub struct PageCheck {
    pub path: Option<String>,
    /// Id of the deepest navigation entry matching `path`.
    pub active: Option<String>,
    #[serde(flatten)]
    pub decision: AccessDecision,
    pub redirect: Option<String>,
}

fn load_policy(args: &AccessArgs, settings: &Settings) -> Result<AccessPolicy> {
    match args.policy.as_ref().or(settings.policy.as_ref()) {
        Some(path) => Ok(AccessPolicy::load(path)?),
        None => Ok(AccessPolicy::default()),
    }
}

/// Guard for the requested page. The module defaults to the one owning the
/// navigation entry at `--path`.
fn page_guard(args: &AccessArgs, tree: &[NavItem]) -> Result<Option<RouteGuard>> {
    if args.path.is_none() && args.module.is_none() && args.permissions.is_empty() {
        return Ok(None);
    }
    let mut guard = RouteGuard::new();
    let module = match &args.module {
        Some(name) => Some(name.parse::<Module>()?),
        None => args
            .path
            .as_deref()
            .and_then(|path| active_item(tree, path))
            .map(|item| item.module),
    };
    if let Some(module) = module {
        guard = guard.module(module);
    }
    if !args.permissions.is_empty() {
        guard = if args.require_all {
            guard.all_of(args.permissions.iter().cloned())
        } else {
            guard.any_of(args.permissions.iter().cloned())
        };
    }
    Ok(Some(guard))
}

pub fn report(args: &AccessArgs, settings: &Settings, env: &Environment) -> Result<AccessReport> {
    let users = args
        .users
        .as_ref()
        .or(settings.users.as_ref())
        .ok_or_else(|| anyhow!("no credential directory; pass --users FILE"))?;
    let provider = StaticProvider::load(users)?;
    log::debug!("{} accounts in {}", provider.len(), users.display());
    let policy = load_policy(args, settings)?;

    let mut session = Session::new(provider);
    if let Some(email) = &args.email {
        let password = match args.password.clone().or_else(|| env.env.var(ENV_PASSWORD)) {
            Some(password) => password,
            None => bail!("no password given; pass --password or set {ENV_PASSWORD}"),
        };
        session
            .login(&Credentials::new(email.as_str(), password))
            .with_context(|| format!("sign-in as {email} failed"))?;
    }

    let user = session.user();
    let tree = default_tree();
    let check = page_guard(args, &tree)?.map(|guard| {
        let decision = guard.evaluate(session.state(), &policy);
        let redirect = guard.redirect_for(&decision).map(str::to_string);
        PageCheck {
            path: args.path.clone(),
            active: args
                .path
                .as_deref()
                .and_then(|path| active_item(&tree, path))
                .map(|item| item.id.clone()),
            decision,
            redirect,
        }
    });

    Ok(AccessReport {
        modules: policy.accessible_modules(user),
        nav: args.nav.then(|| visible_items(&tree, user, &policy)),
        check,
        session: session.state().clone(),
    })
}

pub fn run(
    args: &AccessArgs,
    settings: &Settings,
    mode: OutputMode,
    env: &Environment,
) -> Result<String> {
    let report = report(args, settings, env)?;
    Ok(super::emit(mode, &report, render_report)?)
}

fn render_report(report: &AccessReport) -> String {
    let mut lines = Vec::new();
    match &report.session {
        SessionState::Authenticated(user) => {
            let mut line = format!(
                "Signed in as {} <{}> ({})",
                user.display_name(),
                user.email,
                user.role.name
            );
            if !user.is_active {
                line.push_str(", inactive");
            }
            lines.push(line);
        }
        other => lines.push(format!("Not signed in ({})", other.name())),
    }

    let modules: Vec<&str> = report.modules.iter().map(|m| m.as_str()).collect();
    if modules.is_empty() {
        lines.push("Modules: none".to_string());
    } else {
        lines.push(format!("Modules: {}", modules.join(", ")));
    }

    if let Some(nav) = &report.nav {
        lines.push("Navigation:".to_string());
        push_nav(&mut lines, nav, 1);
    }

    if let Some(check) = &report.check {
        let target = check.path.as_deref().unwrap_or("page");
        let mut line = format!("Check {target}: {}", describe(&check.decision));
        if let Some(redirect) = &check.redirect {
            line.push_str(&format!(" -> {redirect}"));
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn push_nav(lines: &mut Vec<String>, items: &[NavItem], depth: usize) {
    for item in items {
        lines.push(format!("{}{}  {}", "  ".repeat(depth), item.label, item.path));
        push_nav(lines, &item.children, depth + 1);
    }
}

fn describe(decision: &AccessDecision) -> String {
    match decision {
        AccessDecision::Granted => "granted".to_string(),
        AccessDecision::Loading => "loading".to_string(),
        AccessDecision::AuthError(msg) => format!("auth error ({msg})"),
        AccessDecision::Unauthenticated => "not signed in".to_string(),
        AccessDecision::Suspended => "account inactive".to_string(),
        AccessDecision::ModuleDenied(module) => format!("no access to {module}"),
        AccessDecision::PermissionDenied(p) => format!("missing permission {p}"),
        AccessDecision::PermissionsDenied(ps) => {
            format!("missing permissions {}", ps.join(", "))
        }
    }
}
