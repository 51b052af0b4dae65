//! Two-pass witness evaluation: first the caller populates sample
//! input/witness values, then the queue is replayed in insertion order to
//! fill in every remaining wire.

use crate::error::{CircuitError, Result};
use crate::field::FieldElement;
use crate::generator::CircuitGenerator;
use crate::ops::Instruction;
use crate::wire::{Wire, WireId};

/// Holds one assignment in progress: a dense `wire id -> value` table sized
/// to the generator's `currentWireId`, `None` until assigned.
pub struct Evaluator<'g> {
    generator: &'g CircuitGenerator,
    values: Vec<Option<FieldElement>>,
}

impl<'g> Evaluator<'g> {
    pub fn new(generator: &'g CircuitGenerator) -> Self {
        let mut values = vec![None; generator.current_wire_id()];
        // Wire id 0 never refers to a real wire (id 1 is the one-wire); seed
        // it so the completeness check at the end of `evaluate` doesn't
        // treat the unused slot as a missing assignment.
        values[0] = Some(FieldElement::zero());
        Evaluator { generator, values }
    }

    /// Assigns a sample value to an input or witness wire. Must be called
    /// before `evaluate`.
    pub fn set_wire(&mut self, wire: &Wire, value: FieldElement) -> Result<()> {
        let id = wire
            .id()
            .ok_or_else(|| CircuitError::construction("cannot assign a value to an unpacked linear combination"))?;
        self.set_raw(id, value)
    }

    fn set_raw(&mut self, id: WireId, value: FieldElement) -> Result<()> {
        if self.values[id].is_some() {
            return Err(CircuitError::already_assigned(id));
        }
        self.values[id] = Some(value);
        Ok(())
    }

    fn get(&self, id: WireId) -> Result<FieldElement> {
        self.values
            .get(id)
            .copied()
            .flatten()
            .ok_or_else(|| CircuitError::unassigned_wire(id))
    }

    /// Runs the queue to completion. `assign` is handed `&mut self` first so
    /// the caller can populate inputs/witnesses via `set_wire` before any
    /// instruction reads them; the one-wire is seeded automatically.
    pub fn evaluate(mut self, assign: impl FnOnce(&mut Evaluator<'g>) -> Result<()>) -> Result<Vec<FieldElement>> {
        let one_id = self
            .generator
            .one_wire()
            .id()
            .expect("one-wire always has an id");
        self.set_raw(one_id, FieldElement::one())?;

        assign(&mut self)?;

        for instruction in self.generator.queue() {
            match instruction {
                Instruction::Basic { op, outputs, .. } => {
                    let inputs: Vec<FieldElement> = op
                        .inputs()
                        .into_iter()
                        .map(|id| self.get(id))
                        .collect::<Result<_>>()?;
                    let results = op.compute(&inputs)?;
                    for (&id, value) in outputs.iter().zip(results) {
                        self.set_raw(id, value)?;
                    }
                }
                Instruction::Witness(generator) => {
                    let deps: Vec<FieldElement> = generator
                        .dependencies()
                        .into_iter()
                        .map(|id| self.get(id))
                        .collect::<Result<_>>()?;
                    let results = generator.generate(&deps)?;
                    for (id, value) in generator.outputs().into_iter().zip(results) {
                        self.set_raw(id, value)?;
                    }
                }
                Instruction::Label(_) => {}
            }
        }

        let mut out = Vec::with_capacity(self.values.len());
        for (id, v) in self.values.into_iter().enumerate() {
            out.push(v.ok_or_else(|| CircuitError::unassigned_wire(id))?);
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitConfig;

    #[test]
    fn dot_product_evaluates_to_671() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a: Vec<Wire> = (0..3).map(|i| gen.create_input(Some(&format!("a{i}")))).collect();
        let b: Vec<Wire> = (0..3).map(|i| gen.create_input(Some(&format!("b{i}")))).collect();
        let mut sum = gen.zero_wire();
        for i in 0..3 {
            let p = gen.mul(&a[i], &b[i]);
            sum = gen.add(&sum, &p);
        }
        let out = gen.make_output(&sum, Some("dot")).unwrap();

        let avals = [FieldElement::from_u64(1), FieldElement::from_u64(2), FieldElement::from_u64(3)];
        let bvals = [FieldElement::from_u64(100), FieldElement::from_u64(200), FieldElement::from_u64(157)];
        let values = Evaluator::new(&gen)
            .evaluate(|ev| {
                for (w, v) in a.iter().zip(avals) {
                    ev.set_wire(w, v)?;
                }
                for (w, v) in b.iter().zip(bvals) {
                    ev.set_wire(w, v)?;
                }
                Ok(())
            })
            .unwrap();
        let expected = avals[0].mul(&bvals[0]).add(&avals[1].mul(&bvals[1])).add(&avals[2].mul(&bvals[2]));
        assert_eq!(values[out.id().unwrap()], expected);
    }

    #[test]
    fn unassigned_input_is_an_error() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        gen.make_output(&a, None).unwrap();
        let result = Evaluator::new(&gen).evaluate(|_ev| Ok(()));
        assert!(result.is_err());
    }

    #[test]
    fn double_assignment_is_an_error() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        gen.make_output(&a, None).unwrap();
        let result = Evaluator::new(&gen).evaluate(|ev| {
            ev.set_wire(&a, FieldElement::from_u64(1))?;
            ev.set_wire(&a, FieldElement::from_u64(2))?;
            Ok(())
        });
        assert!(result.is_err());
    }

    #[test]
    fn split_pack_round_trip() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let x = gen.create_input(Some("x"));
        let bits = gen.split(&x, 32);
        let packed = gen.pack(&bits);
        let out = gen.make_output(&packed, None).unwrap();

        let v = FieldElement::from_u64(0xDEADBEEF);
        let values = Evaluator::new(&gen)
            .evaluate(|ev| ev.set_wire(&x, v))
            .unwrap();
        assert_eq!(values[out.id().unwrap()], v);
    }
}
