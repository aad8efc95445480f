//! Filter catalog: the fields and operators a filter panel offers.

use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnKind, SelectOption};
use crate::op::FilterOp;
use crate::predicate::Predicate;

/// One entry of an operator menu.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorChoice {
    pub operator: FilterOp,
    pub label: String,
}

impl OperatorChoice {
    pub fn new(operator: FilterOp, label: impl Into<String>) -> Self {
        OperatorChoice {
            operator,
            label: label.into(),
        }
    }
}

/// Default operator menu for a column kind.
pub fn operators_for(kind: ColumnKind) -> Vec<OperatorChoice> {
    let menu: &[(FilterOp, &str)] = match kind {
        ColumnKind::Text => &[
            (FilterOp::Contains, "Contains"),
            (FilterOp::Equals, "Equals"),
            (FilterOp::StartsWith, "Starts with"),
            (FilterOp::EndsWith, "Ends with"),
        ],
        ColumnKind::Number => &[
            (FilterOp::Equals, "Equals"),
            (FilterOp::GreaterThan, "Greater than"),
            (FilterOp::LessThan, "Less than"),
        ],
        ColumnKind::Date => &[
            (FilterOp::Equals, "On"),
            (FilterOp::GreaterThan, "After"),
            (FilterOp::LessThan, "Before"),
        ],
        ColumnKind::Select | ColumnKind::Boolean => &[(FilterOp::Equals, "Is")],
    };
    menu.iter()
        .map(|(op, label)| OperatorChoice::new(op.clone(), *label))
        .collect()
}

/// A field that can be filtered on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterField {
    pub id: String,
    pub label: String,
    pub kind: ColumnKind,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Operator menu; empty means the kind's default menu.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub operators: Vec<OperatorChoice>,
}

impl FilterField {
    pub fn from_column(column: &Column) -> Self {
        FilterField {
            id: column.id.clone(),
            label: column.label.clone(),
            kind: column.kind,
            options: column.options.clone(),
            operators: Vec::new(),
        }
    }

    /// The field's operator menu.
    pub fn operators(&self) -> Vec<OperatorChoice> {
        if self.operators.is_empty() {
            operators_for(self.kind)
        } else {
            self.operators.clone()
        }
    }
}

/// Every filterable field of a table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterCatalog {
    fields: Vec<FilterField>,
}

impl FilterCatalog {
    /// Builds the catalog from the filterable columns.
    pub fn from_columns(columns: &[Column]) -> Self {
        FilterCatalog {
            fields: columns
                .iter()
                .filter(|c| c.filterable)
                .map(FilterField::from_column)
                .collect(),
        }
    }

    pub fn fields(&self) -> &[FilterField] {
        &self.fields
    }

    pub fn field(&self, id: &str) -> Option<&FilterField> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Human-readable label of an active filter, e.g. `Status Is On leave`.
    ///
    /// Unknown fields and operators fall back to their raw names; select
    /// values are shown by option label.
    pub fn label_for(&self, predicate: &Predicate) -> String {
        let field = self.field(&predicate.field);

        let field_label = field.map_or(predicate.field.as_str(), |f| f.label.as_str());
        let operator_label = field
            .and_then(|f| {
                f.operators()
                    .into_iter()
                    .find(|choice| choice.operator == predicate.operator)
                    .map(|choice| choice.label)
            })
            .unwrap_or_else(|| predicate.operator.to_string());
        let value_label = field
            .filter(|f| f.kind == ColumnKind::Select)
            .and_then(|f| {
                f.options
                    .iter()
                    .find(|o| o.value.strict_eq(&predicate.value))
                    .map(|o| o.label.clone())
            })
            .or_else(|| predicate.value.to_text())
            .unwrap_or_default();

        format!("{field_label} {operator_label} {value_label}")
            .trim()
            .to_string()
    }
}
