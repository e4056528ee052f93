use crate::opcode::Opcode;
use serde::{Deserialize, Serialize};

/// The three instruction sections the frontend emits per compiled fragment.
///
/// Instruction order inside a section is fixed by the compiler; the linker
/// only ever appends whole sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CodePart {
    /// Bodies of user-defined functions, never entered by fall-through
    #[serde(default)]
    pub functions: Vec<Opcode>,
    /// Top-level declarations and initializers
    #[serde(default)]
    pub initialization: Vec<Opcode>,
    /// Top-level executable statements
    #[serde(default)]
    pub main: Vec<Opcode>,
}

impl CodePart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_functions(mut self, code: Vec<Opcode>) -> Self {
        self.functions = code;
        self
    }

    pub fn with_initialization(mut self, code: Vec<Opcode>) -> Self {
        self.initialization = code;
        self
    }

    pub fn with_main(mut self, code: Vec<Opcode>) -> Self {
        self.main = code;
        self
    }

    pub fn len(&self) -> usize {
        self.functions.len() + self.initialization.len() + self.main.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// First instruction that runs when the part is entered: the head of
    /// Initialization, or of Main when there is no initialization code.
    pub fn entry_point(&self) -> Option<&Opcode> {
        self.initialization.first().or_else(|| self.main.first())
    }

    /// Concatenate the sections in execution layout order: Functions,
    /// Initialization, Main.
    pub fn merge_sections(self) -> Vec<Opcode> {
        let mut merged = Vec::with_capacity(self.len());
        merged.extend(self.functions);
        merged.extend(self.initialization);
        merged.extend(self.main);
        merged
    }
}
