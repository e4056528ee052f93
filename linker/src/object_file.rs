use crate::code_part::CodePart;
use crate::opcode::Label;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of a compiled unit registered with a `ProgramBuilder`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UnitId(Uuid);

impl UnitId {
    pub(crate) fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A compiled unit: the code parts emitted for one source artifact
#[derive(Debug, Clone)]
pub(crate) struct ObjectFile {
    pub id: UnitId,
    pub parts: Vec<CodePart>,
    /// Label of the first instruction run on entry, set while linking
    pub entry_label: Option<Label>,
}

impl ObjectFile {
    pub fn new(parts: impl IntoIterator<Item = CodePart>) -> Self {
        Self {
            id: UnitId::new(),
            parts: parts.into_iter().collect(),
            entry_label: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_ids_are_unique() {
        let a = ObjectFile::new(Vec::<CodePart>::new());
        let b = ObjectFile::new(Vec::<CodePart>::new());
        assert_ne!(a.id, b.id);
        assert!(a.entry_label.is_none());
    }

    #[test]
    fn test_unit_id_serializes_as_uuid_string() {
        let id = UnitId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", id.as_uuid()));

        let parsed: UnitId = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, id);
    }
}
