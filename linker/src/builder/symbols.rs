use crate::error::{LinkError, LinkResult};
use crate::opcode::{Label, Opcode};
use log::trace;
use rustc_hash::FxHashMap;
use std::collections::hash_map::Entry;

/// Absolute index of every labelled instruction in a flat program
#[derive(Debug, Default)]
pub(crate) struct SymbolTable {
    labels: FxHashMap<Label, usize>,
}

impl SymbolTable {
    /// Record the index of every label, rejecting duplicates
    pub fn build(program: &[Opcode]) -> LinkResult<Self> {
        let mut labels = FxHashMap::default();

        for (index, opcode) in program.iter().enumerate() {
            let Some(label) = opcode.label() else {
                continue;
            };
            match labels.entry(label.clone()) {
                Entry::Occupied(existing) => {
                    return Err(LinkError::DuplicateLabel {
                        label: label.clone(),
                        first: *existing.get(),
                        second: index,
                    });
                }
                Entry::Vacant(slot) => {
                    slot.insert(index);
                }
            }
        }

        Ok(Self { labels })
    }

    pub fn resolve(&self, label: &Label) -> Option<usize> {
        self.labels.get(label).copied()
    }

    /// Replace every destination label in `program` with its resolved address
    pub fn relocate(&self, program: &mut [Opcode]) -> LinkResult<()> {
        for (index, opcode) in program.iter_mut().enumerate() {
            let Some(destination) = opcode.destination_label() else {
                continue;
            };
            let target = self
                .resolve(destination)
                .ok_or_else(|| LinkError::UnresolvedLabel {
                    label: destination.clone(),
                    index,
                })?;
            trace!("relocating {} at {} -> {}", destination, index, target);
            opcode.relocate(index, target);
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Entries ordered by address, for diagnostics
    pub fn sorted(&self) -> Vec<(&Label, usize)> {
        let mut entries: Vec<_> = self.labels.iter().map(|(l, &i)| (l, i)).collect();
        entries.sort_by_key(|&(_, index)| index);
        entries
    }
}
