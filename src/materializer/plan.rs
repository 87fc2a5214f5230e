//! # Parser Plans
//!
//! A plan is the result of walking a target type once against a column
//! window. Executing it against a positioned cursor reads only the bound
//! columns and never re-inspects the type.
//!
//! ## Composite Binding
//!
//! Members are visited in declaration order. For each member:
//!
//! 1. A column whose name equals the member name (ignoring case) binds the
//!    member directly. For a composite member this column holds serializer
//!    text and is decoded by the reference converter.
//! 2. Otherwise, a composite member collects the columns named
//!    `<member>_<child>` or `<member>.<child>` and binds them recursively
//!    with the same rules.
//! 3. Otherwise the member keeps its default.
//!
//! Columns that no member claims are skipped. When two columns carry the same
//! name the first one in the window wins.

use std::sync::Arc;

use eyre::{bail, Result, WrapErr};
use smallvec::SmallVec;

use crate::config::INLINE_BINDINGS;
use crate::converters::ConverterRegistry;
use crate::cursor::ResultCursor;
use crate::error::ConvertError;
use crate::types::{FieldType, FieldValue, TypeDescriptor};

/// Compiled reader for one target type and column window.
#[derive(Debug)]
pub(crate) enum Plan {
    Scalar(ColumnBinding),
    Composite(CompositePlan),
}

#[derive(Debug)]
pub(crate) struct ColumnBinding {
    column: usize,
    column_name: String,
    field_type: FieldType,
}

#[derive(Debug)]
pub(crate) struct CompositePlan {
    descriptor: Arc<TypeDescriptor>,
    bindings: SmallVec<[Binding; INLINE_BINDINGS]>,
}

#[derive(Debug)]
enum Binding {
    Column { member: usize, column: ColumnBinding },
    Nested { member: usize, plan: Box<CompositePlan> },
}

impl ColumnBinding {
    fn new(column: usize, column_name: &str, field_type: FieldType) -> Self {
        Self {
            column,
            column_name: column_name.to_string(),
            field_type,
        }
    }

    fn read<C: ResultCursor + ?Sized>(
        &self,
        registry: &ConverterRegistry,
        cursor: &C,
    ) -> Result<FieldValue> {
        let raw = cursor.value_at(self.column)?.clone();
        registry
            .from_storage_value(&self.field_type, raw)
            .wrap_err_with(|| {
                format!(
                    "failed to read column {} ('{}') as {}",
                    self.column, self.column_name, self.field_type
                )
            })
    }
}

fn strip_member_prefix<'a>(column: &'a str, member: &str) -> Option<&'a str> {
    let head = column.get(..member.len())?;
    if !head.eq_ignore_ascii_case(member) {
        return None;
    }
    let rest = &column[member.len()..];
    let child = rest.strip_prefix('_').or_else(|| rest.strip_prefix('.'))?;
    (!child.is_empty()).then_some(child)
}

impl CompositePlan {
    pub(crate) fn compile(descriptor: &Arc<TypeDescriptor>, columns: &[(usize, &str)]) -> Self {
        let mut bindings = SmallVec::new();
        for (index, member) in descriptor.members().iter().enumerate() {
            let direct = columns
                .iter()
                .find(|(_, name)| name.eq_ignore_ascii_case(member.name()));
            if let Some((column, name)) = direct {
                bindings.push(Binding::Column {
                    member: index,
                    column: ColumnBinding::new(*column, name, member.field_type().clone()),
                });
                continue;
            }

            let FieldType::Composite(child) = member.field_type() else {
                continue;
            };
            let prefixed: Vec<(usize, &str)> = columns
                .iter()
                .filter_map(|(column, name)| {
                    strip_member_prefix(name, member.name()).map(|rest| (*column, rest))
                })
                .collect();
            if prefixed.is_empty() {
                continue;
            }
            let plan = CompositePlan::compile(child, &prefixed);
            if !plan.bindings.is_empty() {
                bindings.push(Binding::Nested {
                    member: index,
                    plan: Box::new(plan),
                });
            }
        }
        Self {
            descriptor: Arc::clone(descriptor),
            bindings,
        }
    }

    /// Bound column count, nested members included.
    pub(crate) fn bound_columns(&self) -> usize {
        self.bindings
            .iter()
            .map(|binding| match binding {
                Binding::Column { .. } => 1,
                Binding::Nested { plan, .. } => plan.bound_columns(),
            })
            .sum()
    }

    fn execute<C: ResultCursor + ?Sized>(
        &self,
        registry: &ConverterRegistry,
        cursor: &C,
    ) -> Result<FieldValue> {
        let mut record = self.descriptor.default_record();
        for binding in &self.bindings {
            let (member, value) = match binding {
                Binding::Column { member, column } => (*member, column.read(registry, cursor)?),
                Binding::Nested { member, plan } => (*member, plan.execute(registry, cursor)?),
            };
            if !value.is_null() {
                record.set_at(member, value);
            }
        }
        Ok(FieldValue::Record(record))
    }
}

impl Plan {
    pub(crate) fn compile(field_type: &FieldType, columns: &[(usize, &str)]) -> Result<Self> {
        if let FieldType::Composite(descriptor) = field_type {
            return Ok(Plan::Composite(CompositePlan::compile(descriptor, columns)));
        }
        match columns.first() {
            Some((column, name)) => Ok(Plan::Scalar(ColumnBinding::new(
                *column,
                name,
                field_type.clone(),
            ))),
            None => bail!(ConvertError::MissingColumn {
                column: "#0".to_string(),
                target: field_type.name(),
            }),
        }
    }

    pub(crate) fn bound_columns(&self) -> usize {
        match self {
            Plan::Scalar(_) => 1,
            Plan::Composite(plan) => plan.bound_columns(),
        }
    }

    pub(crate) fn execute<C: ResultCursor + ?Sized>(
        &self,
        registry: &ConverterRegistry,
        cursor: &C,
    ) -> Result<FieldValue> {
        match self {
            Plan::Scalar(column) => column.read(registry, cursor),
            Plan::Composite(plan) => plan.execute(registry, cursor),
        }
    }
}
