use crate::opcode::Label;
use serde::{Deserialize, Serialize};

/// Control-transfer operand: symbolic until the linker relocates it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target<T> {
    Symbolic(Label),
    Resolved(T),
}

impl<T: Copy> Target<T> {
    /// The destination label, if the target has not been relocated yet
    pub fn label(&self) -> Option<&Label> {
        match self {
            Target::Symbolic(label) => Some(label),
            Target::Resolved(_) => None,
        }
    }

    pub fn resolved(&self) -> Option<T> {
        match self {
            Target::Symbolic(_) => None,
            Target::Resolved(value) => Some(*value),
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, Target::Resolved(_))
    }
}

impl<T> From<Label> for Target<T> {
    fn from(label: Label) -> Self {
        Target::Symbolic(label)
    }
}
