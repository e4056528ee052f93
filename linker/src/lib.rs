// kerbo-link - merges compiled kerboscript units into a flat, relocated program

pub mod builder;
pub mod cli;
pub mod code_part;
pub mod error;
pub mod object_file;
pub mod opcode;
pub mod program;

pub use builder::{Concatenate, InitMerge, LinkerConfig, ProgramBuilder};
pub use code_part::CodePart;
pub use error::{LinkError, LinkResult};
pub use object_file::UnitId;
pub use opcode::{BranchKind, CallTarget, Label, Op, Opcode, Operand, Target, Value};
pub use program::{EntryPoint, Program};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
