//! Navigation tree filtered by module access.

use serde::{Deserialize, Serialize};

use crate::policy::{AccessPolicy, Module};
use crate::user::User;

/// One sidebar entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavItem {
    pub id: String,
    pub label: String,
    pub path: String,
    pub module: Module,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_permissions: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavItem>,
}

impl NavItem {
    pub fn new(id: &str, label: &str, path: &str, module: Module, permission: &str) -> Self {
        NavItem {
            id: id.to_string(),
            label: label.to_string(),
            path: path.to_string(),
            module,
            required_permissions: vec![permission.to_string()],
            children: Vec::new(),
        }
    }

    pub fn child(mut self, child: NavItem) -> Self {
        self.children.push(child);
        self
    }
}

/// The application's sidebar.
pub fn default_tree() -> Vec<NavItem> {
    use Module::*;

    vec![
        NavItem::new("dashboard", "Dashboard", "/dashboard", Dashboard, "dashboard_read"),
        NavItem::new("hrms", "Human Resources", "/hrms", Hrms, "hrms_read")
            .child(NavItem::new("employees", "Employees", "/hrms/employees", Hrms, "employee_read"))
            .child(NavItem::new("departments", "Departments", "/hrms/departments", Hrms, "department_read"))
            .child(NavItem::new("roles", "Roles & Permissions", "/hrms/roles", Hrms, "role_read")),
        NavItem::new("invoice", "Invoice Management", "/invoice", Invoice, "invoice_read")
            .child(NavItem::new("invoices", "All Invoices", "/invoice/list", Invoice, "invoice_read"))
            .child(NavItem::new("create-invoice", "Create Invoice", "/invoice/create", Invoice, "invoice_write"))
            .child(NavItem::new("invoice-reports", "Reports", "/invoice/reports", Invoice, "invoice_read")),
        NavItem::new("training", "Training & Quizzes", "/training", Quiz, "training_read")
            .child(NavItem::new("quizzes", "All Quizzes", "/training/quizzes", Quiz, "quiz_read"))
            .child(NavItem::new("training-assignments", "Assignments", "/training/assignments", Quiz, "training_read"))
            .child(NavItem::new("training-progress", "Progress Tracking", "/training/progress", Quiz, "training_read")),
        NavItem::new("recruitment", "Recruitment", "/recruitment", Jobs, "recruitment_read")
            .child(NavItem::new("job-board", "Job Board", "/recruitment/jobs", Jobs, "jobs_read"))
            .child(NavItem::new("applications", "Applications", "/recruitment/applications", Jobs, "application_read"))
            .child(NavItem::new("candidates", "Candidates", "/recruitment/candidates", Jobs, "candidate_read")),
        NavItem::new("admin", "Administration", "/admin", Crud, "admin")
            .child(NavItem::new("system-config", "System Configuration", "/admin/config", Crud, "admin"))
            .child(NavItem::new("data-management", "Data Management", "/admin/data", Crud, "admin"))
            .child(NavItem::new("audit-logs", "Audit Logs", "/admin/logs", Crud, "admin")),
    ]
}

/// Items (and, recursively, children) whose module the user may open.
///
/// Item permission lists are informational; only module access hides
/// entries.
pub fn visible_items(items: &[NavItem], user: Option<&User>, policy: &AccessPolicy) -> Vec<NavItem> {
    items
        .iter()
        .filter(|item| policy.has_module_access(user, item.module))
        .map(|item| NavItem {
            children: visible_items(&item.children, user, policy),
            ..item.clone()
        })
        .collect()
}

/// Returns `true` when `current` is `path` or lies below it.
pub fn is_active(path: &str, current: &str) -> bool {
    current == path
        || current
            .strip_prefix(path)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Depth-first search for the deepest item matching `current`.
pub fn active_item<'a>(items: &'a [NavItem], current: &str) -> Option<&'a NavItem> {
    items
        .iter()
        .find(|item| is_active(&item.path, current))
        .map(|item| active_item(&item.children, current).unwrap_or(item))
}
