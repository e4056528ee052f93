//! Merges registered compiled units into one relocated program

mod config;
mod merge;
mod symbols;

pub use config::LinkerConfig;
pub use merge::{Concatenate, InitMerge};
pub(crate) use symbols::SymbolTable;

use crate::code_part::CodePart;
use crate::error::{LinkError, LinkResult};
use crate::object_file::{ObjectFile, UnitId};
use crate::opcode::{Label, Opcode};
use crate::program::{EntryPoint, Program};
use log::{debug, info};
use rustc_hash::FxHashMap;

/// Collects compiled units and links them into a single [`Program`].
///
/// The first registered unit is the main program, entered at address 0.
/// Every later unit is a subprogram, entered by calling its entry address.
/// A builder is consumed by [`ProgramBuilder::build`].
pub struct ProgramBuilder<M = Concatenate> {
    units: Vec<ObjectFile>,
    positions: FxHashMap<UnitId, usize>,
    config: LinkerConfig,
    merge: M,
}

impl ProgramBuilder<Concatenate> {
    /// Create a builder with default configuration
    pub fn new() -> Self {
        Self::with_config(LinkerConfig::default())
    }

    /// Create a builder with custom configuration
    pub fn with_config(config: LinkerConfig) -> Self {
        Self::with_merge(config, Concatenate)
    }
}

impl Default for ProgramBuilder<Concatenate> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: InitMerge> ProgramBuilder<M> {
    /// Create a builder that folds initialization code with `merge`
    pub fn with_merge(config: LinkerConfig, merge: M) -> Self {
        Self {
            units: Vec::new(),
            positions: FxHashMap::default(),
            config,
            merge,
        }
    }

    pub fn config(&self) -> &LinkerConfig {
        &self.config
    }

    /// Register a new compiled unit made of `parts`
    pub fn add_object_file(&mut self, parts: impl IntoIterator<Item = CodePart>) -> UnitId {
        let object_file = ObjectFile::new(parts);
        let id = object_file.id;
        self.positions.insert(id, self.units.len());
        self.units.push(object_file);
        id
    }

    /// Append `parts` to the main program, registering it if needed
    pub fn add_range(&mut self, parts: impl IntoIterator<Item = CodePart>) -> UnitId {
        match self.units.first_mut() {
            Some(main) => {
                main.parts.extend(parts);
                main.id
            }
            None => self.add_object_file(parts),
        }
    }

    pub fn contains(&self, unit: UnitId) -> bool {
        self.positions.contains_key(&unit)
    }

    /// Registered unit identities, main program first
    pub fn unit_ids(&self) -> impl Iterator<Item = UnitId> + '_ {
        self.units.iter().map(|unit| unit.id)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Link every registered unit into a flat program.
    ///
    /// Fails without producing any program on duplicate labels, dangling
    /// destination labels or an unlabelled entry instruction.
    pub fn build(self) -> LinkResult<Program> {
        let Self {
            mut units,
            config,
            mut merge,
            ..
        } = self;
        let mut instructions = Vec::new();

        for (position, unit) in units.iter_mut().enumerate() {
            let is_main_program = position == 0;
            let mut linked = CodePart::new();

            for part in unit.parts.drain(..) {
                merge.merge(unit.id, &mut linked.initialization, &part.initialization);
                linked.functions.extend(part.functions);
                linked.main.extend(part.main);
            }

            let entry_label = entry_label(unit.id, &linked)?;

            // Execution starts at address 0, which is the first function body
            if is_main_program && config.skip_jump && !linked.main.is_empty() {
                if let Some(label) = &entry_label {
                    linked.functions.insert(0, Opcode::jump_to(label));
                }
            }

            linked.main.push(if is_main_program {
                Opcode::end_of_program()
            } else {
                Opcode::ret()
            });

            debug!(
                "linking {} unit {}: {} function, {} initialization, {} main instructions",
                if is_main_program { "main" } else { "sub" },
                unit.id,
                linked.functions.len(),
                linked.initialization.len(),
                linked.main.len()
            );

            unit.entry_label = entry_label;
            instructions.extend(linked.merge_sections());
        }

        let symbols = SymbolTable::build(&instructions)?;
        debug!("symbol table holds {} labels", symbols.len());
        if config.debug_mode {
            for (label, index) in symbols.sorted() {
                debug!("  {:>6}  {}", index, label);
            }
        }
        symbols.relocate(&mut instructions)?;

        let mut entry_points = Vec::with_capacity(units.len());
        for unit in units {
            let address = unit
                .entry_label
                .as_ref()
                .and_then(|label| symbols.resolve(label))
                .unwrap_or(0);
            entry_points.push(EntryPoint {
                unit: unit.id,
                label: unit.entry_label,
                address,
            });
        }

        info!(
            "linked {} unit(s) into {} instructions",
            entry_points.len(),
            instructions.len()
        );
        Ok(Program::new(instructions, entry_points))
    }
}

/// Label of the unit's first Initialization instruction, or of its first
/// Main instruction when there is no initialization code.
fn entry_label(unit: UnitId, linked: &CodePart) -> LinkResult<Option<Label>> {
    match linked.entry_point() {
        Some(opcode) => opcode
            .label()
            .cloned()
            .map(Some)
            .ok_or(LinkError::UnlabeledEntryPoint { unit }),
        None => Ok(None),
    }
}
