use crate::object_file::UnitId;
use crate::opcode::Opcode;

/// Strategy for folding each code part's Initialization section into the
/// unit being linked.
///
/// Called once per part, in registration order. `linked` is the unit's
/// accumulated Initialization section so far.
pub trait InitMerge {
    fn merge(&mut self, unit: UnitId, linked: &mut Vec<Opcode>, part: &[Opcode]);
}

/// Appends every part's initialization code unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Concatenate;

impl InitMerge for Concatenate {
    fn merge(&mut self, _unit: UnitId, linked: &mut Vec<Opcode>, part: &[Opcode]) {
        linked.extend_from_slice(part);
    }
}

impl<F> InitMerge for F
where
    F: FnMut(UnitId, &mut Vec<Opcode>, &[Opcode]),
{
    fn merge(&mut self, unit: UnitId, linked: &mut Vec<Opcode>, part: &[Opcode]) {
        self(unit, linked, part)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opcode::Op;

    #[test]
    fn test_concatenate_appends_in_order() {
        let unit = UnitId::new();
        let mut linked = vec![Opcode::new(Op::Nop).with_label("a")];
        Concatenate.merge(unit, &mut linked, &[Opcode::new(Op::Pop).with_label("b")]);
        Concatenate.merge(unit, &mut linked, &[]);

        let labels: Vec<_> = linked.iter().filter_map(|op| op.label()).collect();
        assert_eq!(labels.len(), 2);
        assert_eq!(labels[0].as_str(), "a");
        assert_eq!(labels[1].as_str(), "b");
    }

    #[test]
    fn test_closure_is_a_merge_strategy() {
        let mut calls = 0;
        let mut strategy = |_: UnitId, linked: &mut Vec<Opcode>, part: &[Opcode]| {
            calls += 1;
            linked.extend(part.iter().rev().cloned());
        };

        let mut linked = Vec::new();
        let part = [Opcode::push(1i64), Opcode::push(2i64)];
        strategy.merge(UnitId::new(), &mut linked, &part);

        assert_eq!(linked, vec![Opcode::push(2i64), Opcode::push(1i64)]);
        drop(strategy);
        assert_eq!(calls, 1);
    }
}
