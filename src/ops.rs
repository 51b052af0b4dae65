//! Primitive operations: the closed set of R1CS-emittable operations, their
//! multiplication-gate cost, their structural-equality key for CSE, and
//! their witness `compute` routines.

use std::fmt::Debug;

use crate::error::{CircuitError, Result};
use crate::field::FieldElement;
use crate::wire::WireId;

/// A basic operation the generator can append to the queue. Equality (used
/// for CSE) hashes the opcode together with its input ids; `Mul`/`Add`/`Or`/
/// `Xor` treat their two operands as an unordered pair since they commute,
/// everything else is order-sensitive. Output ids are never part of
/// identity, that's the whole point of CSE.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BasicOp {
    Mul(WireId, WireId),
    ConstMul(FieldElementKey, WireId),
    Add(WireId, WireId),
    Or(WireId, WireId),
    Xor(WireId, WireId),
    Zerop(WireId),
    Split(WireId, usize),
    Pack(Vec<WireId>),
    Assert(WireId, WireId, WireId),
}

/// `FieldElement` wraps an arkworks field element, which hashes by its
/// Montgomery-form limbs; that's a fine `Eq`/`Hash` impl for a CSE key, so
/// this is just a newtype to keep `BasicOp`'s derive straightforward without
/// depending on `ark_bn254::Fr`'s trait impls staying in this exact shape.
pub type FieldElementKey = FieldElement;

impl BasicOp {
    /// The key used for structural deduplication: identical to `self` except
    /// that commutative ops have their operands sorted, so `Mul(a, b)` and
    /// `Mul(b, a)` produce the same key.
    pub fn cse_key(&self) -> BasicOp {
        match *self {
            BasicOp::Mul(a, b) => BasicOp::Mul(a.min(b), a.max(b)),
            BasicOp::Add(a, b) => BasicOp::Add(a.min(b), a.max(b)),
            BasicOp::Or(a, b) => BasicOp::Or(a.min(b), a.max(b)),
            BasicOp::Xor(a, b) => BasicOp::Xor(a.min(b), a.max(b)),
            ref other => other.clone(),
        }
    }

    /// Opcode name as it appears in the `.arith` format.
    pub fn mnemonic(&self) -> String {
        match self {
            BasicOp::Mul(..) => "mul".to_string(),
            BasicOp::ConstMul(c, _) => format!("const-mul-{}", c.to_hex()),
            BasicOp::Add(..) => "add".to_string(),
            BasicOp::Or(..) => "or".to_string(),
            BasicOp::Xor(..) => "xor".to_string(),
            BasicOp::Zerop(..) => "zerop".to_string(),
            BasicOp::Split(..) => "split".to_string(),
            BasicOp::Pack(..) => "pack".to_string(),
            BasicOp::Assert(..) => "assert".to_string(),
        }
    }

    /// Ordered input wire ids, as they appear in the `.arith` line.
    pub fn inputs(&self) -> Vec<WireId> {
        match self {
            BasicOp::Mul(a, b) | BasicOp::Add(a, b) | BasicOp::Or(a, b) | BasicOp::Xor(a, b) => {
                vec![*a, *b]
            }
            BasicOp::ConstMul(_, a) | BasicOp::Zerop(a) | BasicOp::Split(a, _) => vec![*a],
            BasicOp::Pack(bits) => bits.clone(),
            BasicOp::Assert(a, b, c) => vec![*a, *b, *c],
        }
    }

    /// Number of outputs this op allocates.
    pub fn num_outputs(&self) -> usize {
        match self {
            BasicOp::Mul(..)
            | BasicOp::Add(..)
            | BasicOp::ConstMul(..)
            | BasicOp::Or(..)
            | BasicOp::Xor(..)
            | BasicOp::Pack(..) => 1,
            BasicOp::Zerop(..) => 2,
            BasicOp::Split(_, n) => *n,
            BasicOp::Assert(..) => 0,
        }
    }

    /// Multiplication-gate cost of this op.
    pub fn num_mul_gates(&self) -> usize {
        match self {
            BasicOp::Mul(..) | BasicOp::Or(..) | BasicOp::Xor(..) | BasicOp::Assert(..) => 1,
            BasicOp::Zerop(..) => 2,
            BasicOp::Split(_, n) => *n,
            BasicOp::ConstMul(..) | BasicOp::Add(..) | BasicOp::Pack(..) => 0,
        }
    }

    /// Whether every boolean-only input must actually hold a boolean value.
    /// `checkInputs` in the spec's terms.
    pub fn check_inputs(&self, inputs: &[FieldElement]) -> Result<()> {
        let assert_boolean = |v: &FieldElement, id: WireId| -> Result<()> {
            if v.is_boolean() {
                Ok(())
            } else {
                Err(CircuitError::not_boolean(id))
            }
        };
        match self {
            BasicOp::Or(a, b) | BasicOp::Xor(a, b) => {
                assert_boolean(&inputs[0], *a)?;
                assert_boolean(&inputs[1], *b)?;
                Ok(())
            }
            BasicOp::Pack(bits) => {
                for (v, &id) in inputs.iter().zip(bits) {
                    assert_boolean(v, id)?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Evaluates the op given its inputs' concrete values, producing output
    /// values in order. `Zerop` additionally needs the prover-supplied
    /// inverse witness, computed inline (it's part of this op's own
    /// definition, not the generic witness-computation mechanism in
    /// `generator::WitnessGenerator`).
    pub fn compute(&self, inputs: &[FieldElement]) -> Result<Vec<FieldElement>> {
        self.check_inputs(inputs)?;
        match self {
            BasicOp::Mul(..) => Ok(vec![inputs[0].mul(&inputs[1])]),
            BasicOp::ConstMul(c, _) => Ok(vec![c.mul(&inputs[0])]),
            BasicOp::Add(..) => Ok(vec![inputs[0].add(&inputs[1])]),
            BasicOp::Or(..) => {
                let (a, b) = (inputs[0], inputs[1]);
                // a | b = a + b - a*b, valid since both are boolean.
                Ok(vec![a.add(&b).sub(&a.mul(&b))])
            }
            BasicOp::Xor(..) => {
                let (a, b) = (inputs[0], inputs[1]);
                // a ^ b = a + b - 2*a*b.
                let two_ab = a.mul(&b).add(&a.mul(&b));
                Ok(vec![a.add(&b).sub(&two_ab)])
            }
            BasicOp::Zerop(x) => {
                let x_val = inputs[0];
                if x_val.is_zero() {
                    Ok(vec![FieldElement::zero(), FieldElement::zero()])
                } else {
                    let m = x_val
                        .inverse()
                        .ok_or_else(|| CircuitError::evaluation(format!(
                            "zerop on wire {x}: non-zero value had no inverse, which cannot happen in a prime field"
                        )))?;
                    Ok(vec![m, FieldElement::one()])
                }
            }
            BasicOp::Split(x, n) => {
                let x_val = inputs[0];
                if !x_val.fits_in_bits(*n) {
                    return Err(CircuitError::evaluation(format!(
                        "split on wire {x}: value does not fit in {n} bits"
                    )));
                }
                Ok(x_val
                    .to_bits_le(*n)
                    .into_iter()
                    .map(|b| if b { FieldElement::one() } else { FieldElement::zero() })
                    .collect())
            }
            BasicOp::Pack(_) => {
                let bits: Vec<bool> = inputs.iter().map(|v| v.is_one()).collect();
                Ok(vec![FieldElement::from_bits_le(&bits)])
            }
            BasicOp::Assert(a, b, c) => {
                let (av, bv, cv) = (inputs[0], inputs[1], inputs[2]);
                if av.mul(&bv) != cv {
                    return Err(CircuitError::evaluation(format!(
                        "assert failed: wire {a} * wire {b} != wire {c}"
                    )));
                }
                Ok(vec![])
            }
        }
    }
}

/// A label op: never emitted as a gate, only marks a wire's role for the
/// serializer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LabelOp {
    Input { id: WireId, description: Option<String> },
    Witness { id: WireId },
    Output { id: WireId },
}

/// A witness-only computation queued by `specify_prover_witness_computation`:
/// it fills in wire values during evaluation (e.g. a division gadget's
/// quotient/remainder) but is invisible to the serializer. A small trait
/// object with explicit dependencies and outputs, rather than a second
/// queue.
pub trait WitnessGenerator: Debug {
    /// Wires this generator reads.
    fn dependencies(&self) -> Vec<WireId>;

    /// Wires this generator assigns, in the order `generate` returns values.
    fn outputs(&self) -> Vec<WireId>;

    /// Computes output values from already-assigned dependency values, in
    /// `dependencies()` order.
    fn generate(&self, inputs: &[FieldElement]) -> Result<Vec<FieldElement>>;
}

/// A node in the evaluation queue.
pub enum Instruction {
    Basic { op: BasicOp, outputs: Vec<WireId>, description: Option<String> },
    Label(LabelOp),
    Witness(Box<dyn WitnessGenerator>),
}

impl Instruction {
    /// Whether this instruction is emitted into the `.arith` file. Basic ops
    /// with a non-empty mnemonic and label ops for input/output/witness are;
    /// witness-computation instructions never are.
    pub fn done_within_circuit(&self) -> bool {
        !matches!(self, Instruction::Witness(_))
    }
}

impl Debug for Instruction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Instruction::Basic { op, outputs, .. } => {
                write!(f, "Basic({:?} -> {:?})", op, outputs)
            }
            Instruction::Label(l) => write!(f, "Label({l:?})"),
            Instruction::Witness(w) => write!(f, "Witness({:?} -> {:?})", w.dependencies(), w.outputs()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mul_cse_key_is_commutative() {
        assert_eq!(BasicOp::Mul(2, 5).cse_key(), BasicOp::Mul(5, 2).cse_key());
    }

    #[test]
    fn assert_cse_key_is_not_commutative() {
        assert_ne!(
            BasicOp::Assert(2, 5, 9).cse_key(),
            BasicOp::Assert(5, 2, 9).cse_key()
        );
    }

    #[test]
    fn gate_cost_table_matches_spec() {
        assert_eq!(BasicOp::Mul(1, 2).num_mul_gates(), 1);
        assert_eq!(BasicOp::Add(1, 2).num_mul_gates(), 0);
        assert_eq!(BasicOp::ConstMul(FieldElement::from_u64(3), 1).num_mul_gates(), 0);
        assert_eq!(BasicOp::Or(1, 2).num_mul_gates(), 1);
        assert_eq!(BasicOp::Xor(1, 2).num_mul_gates(), 1);
        assert_eq!(BasicOp::Zerop(1).num_mul_gates(), 2);
        assert_eq!(BasicOp::Split(1, 8).num_mul_gates(), 8);
        assert_eq!(BasicOp::Pack(vec![1, 2, 3]).num_mul_gates(), 0);
        assert_eq!(BasicOp::Assert(1, 2, 3).num_mul_gates(), 1);
    }

    #[test]
    fn or_rejects_non_boolean_input() {
        let op = BasicOp::Or(1, 2);
        let err = op.compute(&[FieldElement::from_u64(2), FieldElement::zero()]);
        assert!(err.is_err());
    }

    #[test]
    fn zerop_on_zero_yields_zero_indicator() {
        let results = BasicOp::Zerop(1).compute(&[FieldElement::zero()]).unwrap();
        assert_eq!(results, vec![FieldElement::zero(), FieldElement::zero()]);
    }

    #[test]
    fn zerop_on_nonzero_yields_one_indicator_and_inverse() {
        let x = FieldElement::from_u64(7);
        let results = BasicOp::Zerop(1).compute(&[x]).unwrap();
        assert_eq!(results[1], FieldElement::one());
        assert_eq!(x.mul(&results[0]), FieldElement::one());
    }

    #[test]
    fn assert_detects_mismatch() {
        let a = FieldElement::from_u64(2);
        let b = FieldElement::from_u64(3);
        let c = FieldElement::from_u64(7);
        assert!(BasicOp::Assert(1, 2, 3).compute(&[a, b, c]).is_err());
    }
}
