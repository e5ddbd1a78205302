//! Table schema description for persisting runs.
//!
//! The storage layer is handed an explicit list of column descriptors built
//! from a template run: instrument channels first (NI, then VN, in recording
//! order), then parameters sorted by name.

use std::collections::HashSet;
use std::fmt;

use contracts::SignalSource;
use serde::Serialize;

use crate::error::{IngestionError, Result};
use crate::params::ParValue;
use crate::run::RunRecord;

/// Fixed width of text parameter columns
pub const TEXT_ITEMSIZE: usize = 50;

/// Storage type of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnKind {
    /// One recorded channel
    Float32Array { len: usize },
    Int64,
    Float64,
    Text { itemsize: usize },
    Float64Array { len: usize },
}

impl ColumnKind {
    /// Column kind storing parameter `value`
    pub fn for_parameter(value: &ParValue) -> Self {
        match value {
            ParValue::Int(_) => Self::Int64,
            ParValue::Float(_) => Self::Float64,
            ParValue::Text(_) => Self::Text {
                itemsize: TEXT_ITEMSIZE,
            },
            ParValue::Array(values) => Self::Float64Array { len: values.len() },
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Float32Array { len } => write!(f, "float32[{len}]"),
            Self::Int64 => write!(f, "int64"),
            Self::Float64 => write!(f, "float64"),
            Self::Text { itemsize } => write!(f, "string({itemsize})"),
            Self::Float64Array { len } => write!(f, "float64[{len}]"),
        }
    }
}

/// `(name, type, shape, position)` of one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub kind: ColumnKind,
    pub position: usize,
}

/// Ordered column list
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub columns: Vec<ColumnDescriptor>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl fmt::Display for TableSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for column in &self.columns {
            writeln!(f, "{:>4}  {:<32} {}", column.position, column.name, column.kind)?;
        }
        Ok(())
    }
}

/// Builds a [`TableSchema`] column by column.
#[derive(Debug, Default)]
pub struct SchemaBuilder {
    columns: Vec<ColumnDescriptor>,
    names: HashSet<String>,
}

impl SchemaBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column at the next position
    pub fn push(&mut self, name: &str, kind: ColumnKind) -> Result<&mut Self> {
        let name = clean_column_name(name);
        if !self.names.insert(name.clone()) {
            return Err(IngestionError::DuplicateColumn { name });
        }
        let position = self.columns.len();
        self.columns.push(ColumnDescriptor {
            name,
            kind,
            position,
        });
        Ok(self)
    }

    pub fn build(self) -> TableSchema {
        TableSchema {
            columns: self.columns,
        }
    }

    /// Schema of `run`: NI channels, VN channels, then decoded parameters.
    pub fn for_run(run: &RunRecord) -> Result<TableSchema> {
        let len = run.samples_per_channel();
        let mut builder = Self::new();
        for role in [SignalSource::Reference, SignalSource::Aligned] {
            for channel in run.channels_for(role) {
                builder.push(&channel.name, ColumnKind::Float32Array { len })?;
            }
        }
        for (name, value) in run.decoded_parameters()? {
            builder.push(&name, ColumnKind::for_parameter(&value))?;
        }
        Ok(builder.build())
    }
}

/// Column-safe name: ASCII alphanumerics and `_` only.
///
/// Serial channel headers may carry spaces or control bytes.
pub fn clean_column_name(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}
