//! Instruction model shared by the compiler frontend, the linker and the VM

mod label;
mod target;
mod value;

pub use label::Label;
pub use target::Target;
pub use value::Value;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Condition under which a branch is taken
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchKind {
    Jump,    // Unconditional
    IfTrue,  // Pop a value, branch when it is true
    IfFalse, // Pop a value, branch when it is false
}

/// Operand of a push instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operand {
    Value(Value),
    /// Absolute address of a labelled instruction, pushed as a literal
    Address(Target<usize>),
}

/// Destination of a call instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallTarget {
    Builtin(String),         // Host-provided function, called by name
    Address(Target<usize>),  // Absolute address inside the program
    Indirect,                // Address popped from the stack
}

/// Operation performed by an instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Op {
    Nop,

    // Stack manipulation
    Push(Operand),
    Pop,
    Dup,
    Swap,

    // Arithmetic and logic
    Add,
    Sub,
    Mul,
    Div,
    Neg,
    Not,
    And,
    Or,

    // Comparison
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,

    // Variables
    Store(String),
    Load(String),

    // Control flow
    Branch {
        kind: BranchKind,
        distance: Target<isize>, // Relative to the branch's own index
    },
    Call {
        destination: CallTarget,
    },
    Return,       // Return to the caller of a subprogram
    EndOfProgram, // Halt the main program
}

/// A single instruction, optionally labelled so others can refer to its address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opcode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<Label>,
    pub op: Op,
}

impl Opcode {
    pub fn new(op: Op) -> Self {
        Self { label: None, op }
    }

    pub fn with_label(mut self, label: impl Into<Label>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn jump_to(destination: impl Into<Label>) -> Self {
        Self::branch(BranchKind::Jump, destination.into())
    }

    pub fn branch_if_true_to(destination: impl Into<Label>) -> Self {
        Self::branch(BranchKind::IfTrue, destination.into())
    }

    pub fn branch_if_false_to(destination: impl Into<Label>) -> Self {
        Self::branch(BranchKind::IfFalse, destination.into())
    }

    fn branch(kind: BranchKind, destination: Label) -> Self {
        Self::new(Op::Branch {
            kind,
            distance: Target::Symbolic(destination),
        })
    }

    pub fn call_to(destination: impl Into<Label>) -> Self {
        Self::new(Op::Call {
            destination: CallTarget::Address(Target::Symbolic(destination.into())),
        })
    }

    pub fn call_builtin(name: impl Into<String>) -> Self {
        Self::new(Op::Call {
            destination: CallTarget::Builtin(name.into()),
        })
    }

    /// Push the absolute address of `destination`, e.g. for a later indirect call
    pub fn push_address_of(destination: impl Into<Label>) -> Self {
        Self::new(Op::Push(Operand::Address(Target::Symbolic(
            destination.into(),
        ))))
    }

    pub fn push(value: impl Into<Value>) -> Self {
        Self::new(Op::Push(Operand::Value(value.into())))
    }

    pub fn ret() -> Self {
        Self::new(Op::Return)
    }

    pub fn end_of_program() -> Self {
        Self::new(Op::EndOfProgram)
    }

    pub fn label(&self) -> Option<&Label> {
        self.label.as_ref()
    }

    /// Label this instruction refers to, if it still needs relocation
    pub fn destination_label(&self) -> Option<&Label> {
        match &self.op {
            Op::Branch { distance, .. } => distance.label(),
            Op::Push(Operand::Address(target))
            | Op::Call {
                destination: CallTarget::Address(target),
            } => target.label(),
            _ => None,
        }
    }

    /// Replace the symbolic destination with its resolved form.
    ///
    /// `index` is this instruction's own absolute position and `target` the
    /// absolute position of the destination label. Branches store the
    /// relative distance, pushes and calls the absolute address.
    pub(crate) fn relocate(&mut self, index: usize, target: usize) {
        match &mut self.op {
            Op::Branch { distance, .. } => {
                *distance = Target::Resolved(target as isize - index as isize);
            }
            Op::Push(Operand::Address(address))
            | Op::Call {
                destination: CallTarget::Address(address),
            } => {
                *address = Target::Resolved(target);
            }
            _ => {}
        }
    }

    pub fn mnemonic(&self) -> &'static str {
        match &self.op {
            Op::Nop => "nop",
            Op::Push(_) => "push",
            Op::Pop => "pop",
            Op::Dup => "dup",
            Op::Swap => "swap",
            Op::Add => "add",
            Op::Sub => "sub",
            Op::Mul => "mul",
            Op::Div => "div",
            Op::Neg => "neg",
            Op::Not => "not",
            Op::And => "and",
            Op::Or => "or",
            Op::Eq => "eq",
            Op::Neq => "neq",
            Op::Lt => "lt",
            Op::Lte => "lte",
            Op::Gt => "gt",
            Op::Gte => "gte",
            Op::Store(_) => "store",
            Op::Load(_) => "load",
            Op::Branch { kind, .. } => match kind {
                BranchKind::Jump => "jump",
                BranchKind::IfTrue => "br.true",
                BranchKind::IfFalse => "br.false",
            },
            Op::Call { .. } => "call",
            Op::Return => "return",
            Op::EndOfProgram => "eop",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(label) = &self.label {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{}", self.mnemonic())?;

        match &self.op {
            Op::Push(Operand::Value(value)) => write!(f, " {}", value),
            Op::Push(Operand::Address(target))
            | Op::Call {
                destination: CallTarget::Address(target),
            } => match target {
                Target::Symbolic(label) => write!(f, " {}", label),
                Target::Resolved(address) => write!(f, " {}", address),
            },
            Op::Call {
                destination: CallTarget::Builtin(name),
            } => write!(f, " {}()", name),
            Op::Call {
                destination: CallTarget::Indirect,
            } => write!(f, " <stack>"),
            Op::Store(name) | Op::Load(name) => write!(f, " ${}", name),
            Op::Branch { distance, .. } => match distance {
                Target::Symbolic(label) => write!(f, " {}", label),
                Target::Resolved(offset) => write!(f, " {:+}", offset),
            },
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_label_per_kind() {
        assert_eq!(
            Opcode::jump_to("@a").destination_label(),
            Some(&Label::new("@a"))
        );
        assert_eq!(
            Opcode::call_to("@b").destination_label(),
            Some(&Label::new("@b"))
        );
        assert_eq!(
            Opcode::push_address_of("@c").destination_label(),
            Some(&Label::new("@c"))
        );
        assert_eq!(Opcode::push(3i64).destination_label(), None);
        assert_eq!(Opcode::call_builtin("print").destination_label(), None);
        assert_eq!(Opcode::new(Op::Add).destination_label(), None);
    }

    #[test]
    fn test_relocate_branch_stores_relative_distance() {
        let mut forward = Opcode::branch_if_false_to("@end");
        forward.relocate(4, 10);
        assert_eq!(
            forward.op,
            Op::Branch {
                kind: BranchKind::IfFalse,
                distance: Target::Resolved(6),
            }
        );

        let mut backward = Opcode::jump_to("@loop");
        backward.relocate(10, 4);
        assert_eq!(
            backward.op,
            Op::Branch {
                kind: BranchKind::Jump,
                distance: Target::Resolved(-6),
            }
        );
    }

    #[test]
    fn test_relocate_push_and_call_store_absolute_address() {
        let mut push = Opcode::push_address_of("@fn");
        push.relocate(30, 2);
        assert_eq!(push.op, Op::Push(Operand::Address(Target::Resolved(2))));

        let mut call = Opcode::call_to("@fn");
        call.relocate(30, 2);
        assert_eq!(
            call.op,
            Op::Call {
                destination: CallTarget::Address(Target::Resolved(2)),
            }
        );
        assert_eq!(call.destination_label(), None);
    }

    #[test]
    fn test_relocate_ignores_other_kinds() {
        let mut add = Opcode::new(Op::Add).with_label("@x");
        add.relocate(0, 5);
        assert_eq!(add, Opcode::new(Op::Add).with_label("@x"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Opcode::jump_to("@0003").to_string(), "jump @0003");
        assert_eq!(
            Opcode::push(7i64).with_label("@0001").to_string(),
            "@0001: push 7"
        );
        assert_eq!(Opcode::call_builtin("print").to_string(), "call print()");
        assert_eq!(
            Opcode::new(Op::Store("alt".to_string())).to_string(),
            "store $alt"
        );

        let mut jump = Opcode::jump_to("@0003");
        jump.relocate(0, 3);
        assert_eq!(jump.to_string(), "jump +3");

        let mut back = Opcode::branch_if_true_to("@0000");
        back.relocate(2, 0);
        assert_eq!(back.to_string(), "br.true -2");
    }

    #[test]
    fn test_unlabelled_opcode_omits_label_in_json() {
        let json = serde_json::to_string(&Opcode::new(Op::Pop)).unwrap();
        assert_eq!(json, r#"{"op":"Pop"}"#);

        let parsed: Opcode = serde_json::from_str(r#"{"label":"@0002","op":"Return"}"#).unwrap();
        assert_eq!(parsed, Opcode::ret().with_label("@0002"));
    }
}
