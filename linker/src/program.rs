use crate::builder::SymbolTable;
use crate::error::{LinkError, LinkResult};
use crate::object_file::UnitId;
use crate::opcode::{Label, Opcode};
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Where execution of one linked unit begins
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryPoint {
    pub unit: UnitId,
    pub label: Option<Label>,
    /// Absolute index; zero when the unit has no entry label
    pub address: usize,
}

/// Fully linked program, ready for indexed execution from address 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Program {
    instructions: Vec<Opcode>,
    entry_points: Vec<EntryPoint>,
}

impl Program {
    pub(crate) fn new(instructions: Vec<Opcode>, entry_points: Vec<EntryPoint>) -> Self {
        Self {
            instructions,
            entry_points,
        }
    }

    pub fn instructions(&self) -> &[Opcode] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<Opcode> {
        self.instructions
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Entry points of every unit, in registration order
    pub fn entry_points(&self) -> &[EntryPoint] {
        &self.entry_points
    }

    /// Absolute entry address of a linked unit
    pub fn entry_address(&self, unit: UnitId) -> LinkResult<usize> {
        self.entry_points
            .iter()
            .find(|entry| entry.unit == unit)
            .map(|entry| entry.address)
            .ok_or(LinkError::UnknownUnit(unit))
    }

    /// Like [`Program::entry_address`], but yields 0 for unknown units.
    ///
    /// Address 0 is also a legitimate entry address, so callers must know
    /// the unit was linked before trusting the result.
    pub fn entry_address_or_default(&self, unit: UnitId) -> usize {
        self.entry_address(unit).unwrap_or(0)
    }

    /// Re-run symbol collection and relocation over the linked program.
    ///
    /// Resolved instructions carry no destination labels, so this only
    /// checks that labels are still unique and leaves the code unchanged.
    pub fn relink(&mut self) -> LinkResult<()> {
        SymbolTable::build(&self.instructions)?.relocate(&mut self.instructions)
    }

    /// Human-readable listing, one instruction per line
    pub fn listing(&self) -> String {
        let mut out = String::new();
        for (index, opcode) in self.instructions.iter().enumerate() {
            let _ = write!(out, "{:04}  {}", index, opcode);
            let entries: Vec<String> = self
                .entry_points
                .iter()
                .enumerate()
                .filter(|(_, entry)| entry.label.is_some() && entry.address == index)
                .map(|(position, _)| format!("#{}", position))
                .collect();
            if !entries.is_empty() {
                let _ = write!(out, "    ; entry {}", entries.join(", "));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Op;

    fn sample() -> (Program, UnitId) {
        let unit = UnitId::new();
        let program = Program::new(
            vec![
                Opcode::new(Op::Nop).with_label("@0"),
                Opcode::push(1i64).with_label("@1"),
                Opcode::end_of_program(),
            ],
            vec![EntryPoint {
                unit,
                label: Some(Label::new("@1")),
                address: 1,
            }],
        );
        (program, unit)
    }

    #[test]
    fn test_entry_address_known_unit() {
        let (program, unit) = sample();
        assert_eq!(program.entry_address(unit), Ok(1));
        assert_eq!(program.entry_address_or_default(unit), 1);
    }

    #[test]
    fn test_entry_address_unknown_unit() {
        let (program, _) = sample();
        let stranger = UnitId::new();
        assert_eq!(
            program.entry_address(stranger),
            Err(LinkError::UnknownUnit(stranger))
        );
        assert_eq!(program.entry_address_or_default(stranger), 0);
    }

    #[test]
    fn test_listing_marks_entry_points() {
        let (program, _) = sample();
        let listing = program.listing();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "0000  @0: nop");
        assert_eq!(lines[1], "0001  @1: push 1    ; entry #0");
        assert_eq!(lines[2], "0002  eop");
    }

    #[test]
    fn test_program_json_round_trip_keeps_entry_points() {
        let (program, unit) = sample();
        let json = serde_json::to_string(&program).unwrap();
        let parsed: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.entry_address(unit), Ok(1));
        assert_eq!(parsed.len(), 3);
    }
}
