//! Form field descriptors derived from table metadata.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{InputKind, TableSchema, input_kind_for};

/// Which form is being rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum FormAction {
    /// New row; every insertable column.
    Insert,
    /// Existing row; non-key columns, blank meaning unchanged.
    Update,
}

/// One input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Column the field writes.
    pub column: String,
    /// Declared column type.
    pub data_type: String,
    /// Widget to render.
    pub input_kind: InputKind,
    /// Whether the store rejects a null for this column.
    pub required: bool,
}

impl FormAction {
    /// Fields for this action over `schema`, in ordinal order.
    ///
    /// Update fields are never required since blank input keeps the stored
    /// value.
    #[must_use]
    pub fn fields(self, schema: &TableSchema) -> Vec<FormField> {
        let columns: Vec<_> = match self {
            Self::Insert => schema.insertable_columns().collect(),
            Self::Update => schema.updatable_columns().collect(),
        };
        columns
            .into_iter()
            .map(|column| FormField {
                column: column.name.clone(),
                data_type: column.data_type.clone(),
                input_kind: input_kind_for(&column.data_type),
                required: self == Self::Insert && !column.is_nullable,
            })
            .collect()
    }
}
