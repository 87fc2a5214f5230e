//! Error types for conversion and materialization.
//!
//! Public APIs return `eyre::Result`; the typed kinds below travel inside the
//! report so callers can still tell a schema defect from bad data.

use thiserror::Error;

/// Typed conversion failures.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// Raw column shape cannot be coerced to the declared target shape
    #[error("type mismatch: {found} cannot be read as {target}: {reason}")]
    TypeMismatch {
        found: String,
        target: String,
        reason: String,
    },

    /// Text or integer with no corresponding enumeration member
    #[error("invalid value '{value}' for enum {enum_name}")]
    InvalidEnumValue { enum_name: String, value: String },

    /// Expected column absent from the row window
    #[error("missing column '{column}' for {target}")]
    MissingColumn { column: String, target: String },

    /// Structured serializer rejected the input
    #[error("serializer error for {target}: {reason}")]
    Serializer { target: String, reason: String },
}

impl ConvertError {
    pub fn type_mismatch(
        found: impl Into<String>,
        target: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        ConvertError::TypeMismatch {
            found: found.into(),
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_enum(enum_name: impl Into<String>, value: impl ToString) -> Self {
        ConvertError::InvalidEnumValue {
            enum_name: enum_name.into(),
            value: value.to_string(),
        }
    }
}

/// Finds the typed conversion error carried by `report`, looking through
/// any context added while materializing a row.
pub fn convert_error(report: &eyre::Report) -> Option<&ConvertError> {
    report
        .chain()
        .find_map(|cause| cause.downcast_ref::<ConvertError>())
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::WrapErr;

    #[test]
    fn convert_error_is_found_beneath_context() {
        let result: eyre::Result<()> = Err(eyre::Report::new(ConvertError::invalid_enum(
            "Color", "Purple",
        )))
        .wrap_err("column 2 'Color' of Widget");

        let report = result.unwrap_err();
        assert_eq!(
            convert_error(&report),
            Some(&ConvertError::InvalidEnumValue {
                enum_name: "Color".into(),
                value: "Purple".into()
            })
        );
        assert!(report.to_string().contains("column 2"));
    }

    #[test]
    fn plain_reports_have_no_convert_error() {
        let report = eyre::eyre!("something else");
        assert!(convert_error(&report).is_none());
    }
}
