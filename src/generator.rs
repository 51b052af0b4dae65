//! `CircuitGenerator`: owns wire-id allocation, the instruction queue with
//! CSE, and the wire-algebra operations gadgets are built from. A single
//! mutable builder threaded explicitly through gadget code, rather than an
//! ambient-singleton-by-default design; see `crate::ambient` for the thin
//! convenience layer that restores ambient lookup for callers who want it.

use std::collections::HashMap;

use log::{debug, warn};

use crate::config::CircuitConfig;
use crate::error::{CircuitError, Result};
use crate::field::FieldElement;
use crate::ops::{BasicOp, Instruction, LabelOp, WitnessGenerator};
use crate::wire::{BitWire, LinearCombination, Wire, WireId};

/// Builds up a circuit's instruction queue. Nothing here runs a witness;
/// that's `crate::evaluator::Evaluator`'s job, over the finished queue.
pub struct CircuitGenerator {
    config: CircuitConfig,
    next_wire_id: WireId,
    queue: Vec<Instruction>,
    cse_index: HashMap<BasicOp, Vec<WireId>>,
    constants: HashMap<FieldElement, Wire>,
    input_ids: Vec<WireId>,
    witness_ids: Vec<WireId>,
    output_ids: Vec<WireId>,
    num_mul_gates: usize,
    one_wire: Wire,
}

impl CircuitGenerator {
    pub fn new(config: CircuitConfig) -> Self {
        let mut gen = CircuitGenerator {
            config,
            next_wire_id: 1,
            queue: Vec::new(),
            cse_index: HashMap::new(),
            constants: HashMap::new(),
            input_ids: Vec::new(),
            witness_ids: Vec::new(),
            output_ids: Vec::new(),
            num_mul_gates: 0,
            // Placeholder, replaced immediately below; `Wire` has no default.
            one_wire: Wire::Variable { id: 0 },
        };
        let one_id = gen.alloc_id();
        debug_assert_eq!(one_id, 1, "wire id 1 must be the canonical one-wire");
        gen.input_ids.push(one_id);
        gen.queue.push(Instruction::Label(LabelOp::Input {
            id: one_id,
            description: Some("one-wire".to_string()),
        }));
        let one = Wire::Constant {
            id: one_id,
            value: FieldElement::one(),
        };
        gen.constants.insert(FieldElement::one(), one.clone());
        gen.one_wire = one;

        // The zero-wire is established here, alongside the one-wire, rather
        // than lazily on first use: it is `one_id * 0`, a zero-gate
        // const-mul, and every generator needs a concrete wire backing the
        // value 0 for assertions like `assert_zero` regardless of whether
        // the caller ever calls `zero_wire` directly. Caching it up front
        // means no later call allocates a fresh id for it.
        let zero_outputs = gen.emit(BasicOp::ConstMul(FieldElement::zero(), one_id));
        let zero = Wire::Constant {
            id: zero_outputs[0],
            value: FieldElement::zero(),
        };
        gen.constants.insert(FieldElement::zero(), zero);

        debug!("circuit generator initialized, one-wire = {one_id}");
        gen
    }

    fn alloc_id(&mut self) -> WireId {
        let id = self.next_wire_id;
        self.next_wire_id += 1;
        id
    }

    /// Appends `op` to the queue unless an identical op (by `cse_key`) is
    /// already present, in which case its existing outputs are reused.
    fn emit(&mut self, op: BasicOp) -> Vec<WireId> {
        let key = op.cse_key();
        if let Some(existing) = self.cse_index.get(&key) {
            return existing.clone();
        }
        let outputs: Vec<WireId> = (0..op.num_outputs()).map(|_| self.alloc_id()).collect();
        self.num_mul_gates += op.num_mul_gates();
        self.cse_index.insert(key, outputs.clone());
        self.queue.push(Instruction::Basic {
            op,
            outputs: outputs.clone(),
            description: None,
        });
        outputs
    }

    // -- construction ----------------------------------------------------

    pub fn one_wire(&self) -> Wire {
        self.one_wire.clone()
    }

    /// `one · 0`, constant-folded and established at construction time
    /// alongside the one-wire; never allocates a new id.
    pub fn zero_wire(&mut self) -> Wire {
        self.create_constant(FieldElement::zero())
    }

    pub fn create_input(&mut self, description: Option<&str>) -> Wire {
        let id = self.alloc_id();
        self.input_ids.push(id);
        self.queue.push(Instruction::Label(LabelOp::Input {
            id,
            description: description.map(str::to_string),
        }));
        Wire::Variable { id }
    }

    pub fn create_prover_witness(&mut self, description: Option<&str>) -> Wire {
        let id = self.alloc_id();
        self.witness_ids.push(id);
        let _ = description; // the .arith format has no witness-description line
        self.queue
            .push(Instruction::Label(LabelOp::Witness { id }));
        Wire::Variable { id }
    }

    /// Returns the cached wire for `c`, creating it (via `one · c`, a
    /// zero-gate `const-mul`) if this is the first time `c` is seen.
    pub fn create_constant(&mut self, c: FieldElement) -> Wire {
        if let Some(existing) = self.constants.get(&c) {
            return existing.clone();
        }
        let one_id = self.one_wire.id().expect("one-wire always has an id");
        let outputs = self.emit(BasicOp::ConstMul(c, one_id));
        let wire = Wire::Constant {
            id: outputs[0],
            value: c,
        };
        self.constants.insert(c, wire.clone());
        wire
    }

    /// Forces a fresh variable whose value equals wire `id`'s, via an actual
    /// `mul`-by-the-one-wire gate. Unlike calling `mul` with the one-wire
    /// directly, this never takes the constant-folding shortcut (the
    /// one-wire is itself a cached `Constant`, so a generic `mul` against it
    /// would just return `id` relabeled as a linear combination, emitting
    /// nothing).
    fn materialize(&mut self, id: WireId) -> WireId {
        let one_id = self.one_wire.id().expect("one-wire always has an id");
        self.emit(BasicOp::Mul(id, one_id))[0]
    }

    /// Registers `w` as a circuit output. Input and witness wires are never
    /// reused directly as outputs (that would conflate the wire's role);
    /// a `mul`-by-one materializes a fresh output variable instead.
    pub fn make_output(&mut self, w: &Wire, description: Option<&str>) -> Result<Wire> {
        let packed = self.pack_if_needed(w);
        let id = packed
            .id()
            .expect("pack_if_needed always returns an id-bearing wire");

        let final_wire = if self.input_ids.contains(&id) {
            warn!("makeOutput called on input wire {id}; introducing a redundant mul-by-one constraint");
            Wire::Variable { id: self.materialize(id) }
        } else if self.witness_ids.contains(&id) {
            Wire::Variable { id: self.materialize(id) }
        } else {
            packed
        };
        let out_id = final_wire
            .id()
            .expect("mul/pack always return an id-bearing wire");
        let _ = description; // the .arith format has no output-description line
        self.queue
            .push(Instruction::Label(LabelOp::Output { id: out_id }));
        self.output_ids.push(out_id);
        Ok(final_wire)
    }

    pub fn specify_prover_witness_computation(&mut self, generator: Box<dyn WitnessGenerator>) {
        self.queue.push(Instruction::Witness(generator));
    }

    // -- arithmetic --------------------------------------------------------

    /// Merges two terms lists into one, summing coefficients for shared wire
    /// ids and dropping any that cancel to zero. Terms keep the order they
    /// were first seen in (`a`'s order, then any new ids from `b`): a plain
    /// `HashMap` iteration order would make the resulting wire-id allocation
    /// and `.arith` line order in `pack_if_needed` vary from run to run for
    /// the same program, which a deterministic circuit builder can't allow.
    fn merge_terms(
        a: &[(FieldElement, WireId)],
        b: &[(FieldElement, WireId)],
        subtract: bool,
    ) -> Vec<(FieldElement, WireId)> {
        let mut order: Vec<WireId> = Vec::new();
        let mut coeffs: HashMap<WireId, FieldElement> = HashMap::new();
        for &(coeff, id) in a {
            let entry = coeffs.entry(id).or_insert_with(|| {
                order.push(id);
                FieldElement::zero()
            });
            *entry = entry.add(&coeff);
        }
        for &(coeff, id) in b {
            let signed = if subtract { coeff.neg() } else { coeff };
            let entry = coeffs.entry(id).or_insert_with(|| {
                order.push(id);
                FieldElement::zero()
            });
            *entry = entry.add(&signed);
        }
        order
            .into_iter()
            .filter_map(|id| {
                let c = coeffs[&id];
                if c.is_zero() { None } else { Some((c, id)) }
            })
            .collect()
    }

    pub fn add(&mut self, a: &Wire, b: &Wire) -> Wire {
        if let (Some(av), Some(bv)) = (a.as_constant(), b.as_constant()) {
            return self.create_constant(av.add(&bv));
        }
        let (la, lb) = (a.as_linear_combination(), b.as_linear_combination());
        Wire::LinearCombination(LinearCombination {
            terms: Self::merge_terms(&la.terms, &lb.terms, false),
            constant: la.constant.add(&lb.constant),
        })
    }

    pub fn sub(&mut self, a: &Wire, b: &Wire) -> Wire {
        if let (Some(av), Some(bv)) = (a.as_constant(), b.as_constant()) {
            return self.create_constant(av.sub(&bv));
        }
        let (la, lb) = (a.as_linear_combination(), b.as_linear_combination());
        Wire::LinearCombination(LinearCombination {
            terms: Self::merge_terms(&la.terms, &lb.terms, true),
            constant: la.constant.sub(&lb.constant),
        })
    }

    pub fn neg(&mut self, a: &Wire) -> Wire {
        let zero = self.zero_wire();
        self.sub(&zero, a)
    }

    /// Scalar multiplication by a compile-time constant: folds into the
    /// linear combination's coefficients/offset with no gate emitted. The
    /// actual `const-mul` instruction only appears later, inside
    /// `pack_if_needed`, once (if ever) this wire must collapse to a single
    /// id.
    pub fn mul_const(&mut self, a: &Wire, c: FieldElement) -> Wire {
        if let Some(av) = a.as_constant() {
            return self.create_constant(av.mul(&c));
        }
        let la = a.as_linear_combination();
        Wire::LinearCombination(LinearCombination {
            terms: la.terms.iter().map(|(coeff, id)| (coeff.mul(&c), *id)).collect(),
            constant: la.constant.mul(&c),
        })
    }

    /// Genuine wire-times-wire multiplication. Constant operands are
    /// redirected to `mul_const` (free); otherwise both operands are packed
    /// and a real `mul` gate is emitted.
    pub fn mul(&mut self, a: &Wire, b: &Wire) -> Wire {
        if let Some(av) = a.as_constant() {
            return self.mul_const(b, av);
        }
        if let Some(bv) = b.as_constant() {
            return self.mul_const(a, bv);
        }
        let pa = self.pack_if_needed(a);
        let pb = self.pack_if_needed(b);
        let outputs = self.emit(BasicOp::Mul(
            pa.id().expect("packed"),
            pb.id().expect("packed"),
        ));
        Wire::Variable { id: outputs[0] }
    }

    /// Collapses a `LinearCombination` into a single `Variable` wire.
    /// Non-unit-coefficient terms are scaled with zero-gate `const-mul`s,
    /// the scaled terms are folded together with zero-gate `add`s, and the
    /// accumulated sum is materialized with one `mul`-by-the-one-wire gate.
    pub fn pack_if_needed(&mut self, w: &Wire) -> Wire {
        let lc = match w {
            Wire::Constant { .. } | Wire::Variable { .. } => return w.clone(),
            Wire::LinearCombination(lc) => lc.clone(),
        };
        if lc.terms.is_empty() {
            return self.create_constant(lc.constant);
        }

        let mut acc: Option<WireId> = None;
        for (coeff, id) in &lc.terms {
            let scaled_id = if coeff.is_one() {
                *id
            } else {
                self.emit(BasicOp::ConstMul(*coeff, *id))[0]
            };
            acc = Some(match acc {
                None => scaled_id,
                Some(prev) => self.emit(BasicOp::Add(prev, scaled_id))[0],
            });
        }
        let mut acc_id = acc.expect("non-empty terms");
        if !lc.constant.is_zero() {
            let const_id = self
                .create_constant(lc.constant)
                .id()
                .expect("constants always have an id");
            acc_id = self.emit(BasicOp::Add(acc_id, const_id))[0];
        }
        let one_id = self.one_wire.id().expect("one-wire always has an id");
        let packed_id = self.emit(BasicOp::Mul(acc_id, one_id))[0];
        Wire::Variable { id: packed_id }
    }

    // -- boolean / bitwise ---------------------------------------------------

    pub fn and(&mut self, a: &BitWire, b: &BitWire) -> BitWire {
        BitWire::new_unchecked(self.mul(&a.wire(), &b.wire()))
    }

    pub fn or(&mut self, a: &BitWire, b: &BitWire) -> BitWire {
        let pa = self.pack_if_needed(&a.wire());
        let pb = self.pack_if_needed(&b.wire());
        let outputs = self.emit(BasicOp::Or(
            pa.id().expect("packed"),
            pb.id().expect("packed"),
        ));
        BitWire::new_unchecked(Wire::Variable { id: outputs[0] })
    }

    pub fn xor(&mut self, a: &BitWire, b: &BitWire) -> BitWire {
        let pa = self.pack_if_needed(&a.wire());
        let pb = self.pack_if_needed(&b.wire());
        let outputs = self.emit(BasicOp::Xor(
            pa.id().expect("packed"),
            pb.id().expect("packed"),
        ));
        BitWire::new_unchecked(Wire::Variable { id: outputs[0] })
    }

    /// `1 - a`, purely symbolic (a linear combination): no gate is emitted
    /// until something downstream needs `not(a)` packed to a single wire.
    pub fn not(&mut self, a: &BitWire) -> BitWire {
        let one = self.one_wire();
        BitWire::new_unchecked(self.sub(&one, &a.wire()))
    }

    /// `zerop`: the primitive that yields 1 iff `x ≠ 0`. `is_equal` is built
    /// from this by negating.
    pub fn zerop(&mut self, x: &Wire) -> BitWire {
        let px = self.pack_if_needed(x);
        let outputs = self.emit(BasicOp::Zerop(px.id().expect("packed")));
        BitWire::new_unchecked(Wire::Variable { id: outputs[1] })
    }

    pub fn is_equal(&mut self, a: &Wire, b: &Wire) -> BitWire {
        let diff = self.sub(a, b);
        let nonzero = self.zerop(&diff);
        self.not(&nonzero)
    }

    pub fn is_equal_to_constant(&mut self, a: &Wire, c: FieldElement) -> BitWire {
        let cw = self.create_constant(c);
        self.is_equal(a, &cw)
    }

    /// `cond ? t : f`, built from two `mul`s and a zero-gate `add`.
    pub fn select(&mut self, cond: &BitWire, t: &Wire, f: &Wire) -> Wire {
        let on_true = self.mul(&cond.wire(), t);
        let not_cond = self.not(cond);
        let on_false = self.mul(&not_cond.wire(), f);
        self.add(&on_true, &on_false)
    }

    // -- split / pack ------------------------------------------------------

    pub fn split(&mut self, w: &Wire, n: usize) -> Vec<BitWire> {
        let pw = self.pack_if_needed(w);
        let outputs = self.emit(BasicOp::Split(pw.id().expect("packed"), n));
        outputs
            .into_iter()
            .map(|id| BitWire::new_unchecked(Wire::Variable { id }))
            .collect()
    }

    /// `Σ 2ⁱbᵢ`: emitted as a zero-gate `pack` instruction (it is a linear
    /// combination, so the gate cost is zero, but the serializer still
    /// needs a concrete instruction to compute and emit it).
    pub fn pack(&mut self, bits: &[BitWire]) -> Wire {
        let ids: Vec<WireId> = bits
            .iter()
            .map(|b| self.pack_if_needed(&b.wire()).id().expect("packed"))
            .collect();
        let outputs = self.emit(BasicOp::Pack(ids));
        Wire::Variable { id: outputs[0] }
    }

    // -- assertions ----------------------------------------------------------

    pub fn add_assertion(&mut self, a: &Wire, b: &Wire, c: &Wire) -> Result<()> {
        if let (Some(av), Some(bv), Some(cv)) = (a.as_constant(), b.as_constant(), c.as_constant())
        {
            if av.mul(&bv) != cv {
                return Err(CircuitError::construction(format!(
                    "constant assertion failed: {av:?} * {bv:?} != {cv:?}"
                )));
            }
            return Ok(());
        }
        let pa = self.pack_if_needed(a);
        let pb = self.pack_if_needed(b);
        let pc = self.pack_if_needed(c);
        self.emit(BasicOp::Assert(
            pa.id().expect("packed"),
            pb.id().expect("packed"),
            pc.id().expect("packed"),
        ));
        Ok(())
    }

    pub fn assert_zero(&mut self, w: &Wire) -> Result<()> {
        let one = self.one_wire();
        let zero = self.zero_wire();
        self.add_assertion(w, &one, &zero)
    }

    pub fn assert_one(&mut self, w: &Wire) -> Result<()> {
        let one = self.one_wire();
        self.add_assertion(w, &one, &one)
    }

    pub fn assert_eq(&mut self, w: &Wire, v: FieldElement) -> Result<()> {
        let one = self.one_wire();
        let c = self.create_constant(v);
        self.add_assertion(w, &one, &c)
    }

    /// `w * (1 - w) = 0`. Returns a `BitWire` proof once the constraint has
    /// been added.
    pub fn assert_boolean(&mut self, w: &Wire) -> Result<BitWire> {
        let one = self.one_wire();
        let not_w = self.sub(&one, w);
        let zero = self.zero_wire();
        self.add_assertion(w, &not_w, &zero)?;
        Ok(BitWire::new_unchecked(w.clone()))
    }

    // -- accessors -----------------------------------------------------------

    pub fn config(&self) -> &CircuitConfig {
        &self.config
    }

    pub fn current_wire_id(&self) -> WireId {
        self.next_wire_id
    }

    pub fn num_constraints(&self) -> usize {
        self.num_mul_gates
    }

    pub fn inputs(&self) -> &[WireId] {
        &self.input_ids
    }

    pub fn witnesses(&self) -> &[WireId] {
        &self.witness_ids
    }

    pub fn outputs(&self) -> &[WireId] {
        &self.output_ids
    }

    pub fn queue(&self) -> &[Instruction] {
        &self.queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_wire_is_id_one_and_declared_as_first_input() {
        let gen = CircuitGenerator::new(CircuitConfig::default());
        assert_eq!(gen.one_wire().id(), Some(1));
        assert_eq!(gen.inputs(), &[1]);
    }

    #[test]
    fn zero_wire_is_cached_across_calls() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let z1 = gen.zero_wire();
        let z2 = gen.zero_wire();
        assert_eq!(z1.id(), z2.id());
    }

    #[test]
    fn duplicate_mul_is_deduplicated() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        let b = gen.create_input(Some("b"));
        let p1 = gen.mul(&a, &b);
        let p2 = gen.mul(&b, &a); // commutative, should hit the same cache entry
        assert_eq!(p1.id(), p2.id());
        assert_eq!(gen.num_constraints(), 1);
    }

    #[test]
    fn dot_product_of_three_costs_four_constraints() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a: Vec<Wire> = (0..3).map(|i| gen.create_input(Some(&format!("a{i}")))).collect();
        let b: Vec<Wire> = (0..3).map(|i| gen.create_input(Some(&format!("b{i}")))).collect();
        let mut sum = gen.zero_wire();
        for i in 0..3 {
            let p = gen.mul(&a[i], &b[i]);
            sum = gen.add(&sum, &p);
        }
        gen.make_output(&sum, Some("dot")).unwrap();
        assert_eq!(gen.num_constraints(), 4);
    }

    #[test]
    fn constant_assertion_mismatch_fails_at_construction() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let two = gen.create_constant(FieldElement::from_u64(2));
        let three = gen.create_constant(FieldElement::from_u64(3));
        let seven = gen.create_constant(FieldElement::from_u64(7));
        assert!(gen.add_assertion(&two, &three, &seven).is_err());
    }

    #[test]
    fn pack_if_needed_is_idempotent() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        let b = gen.create_input(Some("b"));
        let sum = gen.add(&a, &b); // a LinearCombination
        let p1 = gen.pack_if_needed(&sum);
        let p2 = gen.pack_if_needed(&p1);
        assert_eq!(p1.id(), p2.id());
    }

    #[test]
    fn is_equal_to_constant_matches_only_the_target_value() {
        use crate::evaluator::Evaluator;

        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let w = gen.create_input(Some("w"));
        let indicator = gen.is_equal_to_constant(&w, FieldElement::from_u64(7));
        let out = gen.make_output(&indicator.wire(), Some("is_seven")).unwrap();

        for candidate in 0u64..9 {
            let values = Evaluator::new(&gen)
                .evaluate(|ev| ev.set_wire(&w, FieldElement::from_u64(candidate)))
                .unwrap();
            let expected = if candidate == 7 { FieldElement::one() } else { FieldElement::zero() };
            assert_eq!(values[out.id().unwrap()], expected, "candidate {candidate}");
        }
    }

    #[test]
    fn makeoutput_on_input_wire_materializes_a_fresh_variable() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        let out = gen.make_output(&a, None).unwrap();
        assert_ne!(out.id(), a.id());
    }

    #[test]
    fn zero_wire_never_allocates_beyond_construction() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let before = gen.current_wire_id();
        gen.zero_wire();
        gen.zero_wire();
        assert_eq!(gen.current_wire_id(), before);
    }

    #[test]
    fn pack_if_needed_emits_add_chain_in_term_insertion_order() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        let b = gen.create_input(Some("b"));
        let c = gen.create_input(Some("c"));
        let ab = gen.add(&a, &b);
        let sum = gen.add(&ab, &c);
        let packed = gen.pack_if_needed(&sum);

        let add_ops: Vec<(WireId, WireId)> = gen
            .queue()
            .iter()
            .filter_map(|instr| match instr {
                Instruction::Basic { op: BasicOp::Add(x, y), .. } => Some((*x, *y)),
                _ => None,
            })
            .collect();
        assert_eq!(add_ops.len(), 2, "expected exactly one two-step add chain");
        assert_eq!(
            add_ops[0],
            (a.id().unwrap(), b.id().unwrap()),
            "first add must combine the first two terms in insertion order"
        );
        assert_eq!(
            add_ops[1].1,
            c.id().unwrap(),
            "second add must fold in the third term last, following insertion order"
        );
        assert!(packed.id().is_some());
    }
}
