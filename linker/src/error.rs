use crate::object_file::UnitId;
use crate::opcode::Label;
use thiserror::Error;

/// Error type for link operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LinkError {
    #[error("Duplicate label {label}: defined at {first} and {second}")]
    DuplicateLabel {
        label: Label,
        first: usize,
        second: usize,
    },

    #[error("Unresolved label {label} referenced at {index}")]
    UnresolvedLabel { label: Label, index: usize },

    #[error("Entry instruction of unit {unit} has no label")]
    UnlabeledEntryPoint { unit: UnitId },

    #[error("Unknown unit: {0}")]
    UnknownUnit(UnitId),
}

/// Result type for link operations
pub type LinkResult<T> = Result<T, LinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_label_display() {
        let error = LinkError::DuplicateLabel {
            label: Label::new("@0004"),
            first: 4,
            second: 19,
        };
        assert_eq!(error.to_string(), "Duplicate label @0004: defined at 4 and 19");
    }

    #[test]
    fn test_unresolved_label_display() {
        let error = LinkError::UnresolvedLabel {
            label: Label::new("@missing"),
            index: 7,
        };
        assert_eq!(error.to_string(), "Unresolved label @missing referenced at 7");
    }

    #[test]
    fn test_unknown_unit_display_contains_id() {
        let unit = UnitId::new();
        let error = LinkError::UnknownUnit(unit);
        assert!(error.to_string().contains(&unit.to_string()));
    }

    #[test]
    fn test_link_result_error() {
        let unit = UnitId::new();
        let result: LinkResult<usize> = Err(LinkError::UnlabeledEntryPoint { unit });

        match result.unwrap_err() {
            LinkError::UnlabeledEntryPoint { unit: reported } => assert_eq!(reported, unit),
            other => panic!("Expected UnlabeledEntryPoint, got {:?}", other),
        }
    }
}
