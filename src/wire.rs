//! The `Wire` abstraction: a tagged union carrying variant-specific payload
//! (a constant value, or a linear combination's terms) rather than a class
//! hierarchy of wire subtypes. Boolean-ness is not a separate set of wire
//! variants but a wrapper, `BitWire`: a `Wire` plus a private field that
//! forces construction through a path that has already proven the value is
//! boolean.

use crate::field::FieldElement;

pub type WireId = usize;

/// A linear combination `Σ aᵢ·xᵢ + b` over existing wire ids, kept symbolic
/// until a gate requires a single-wire operand.
#[derive(Clone, Debug, PartialEq)]
pub struct LinearCombination {
    pub terms: Vec<(FieldElement, WireId)>,
    pub constant: FieldElement,
}

impl LinearCombination {
    pub fn from_constant(c: FieldElement) -> Self {
        LinearCombination {
            terms: Vec::new(),
            constant: c,
        }
    }

    pub fn from_term(coeff: FieldElement, wire: WireId) -> Self {
        LinearCombination {
            terms: vec![(coeff, wire)],
            constant: FieldElement::zero(),
        }
    }

    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|(c, _)| c.is_zero())
    }
}

/// A handle identifying a field-valued quantity in the circuit.
#[derive(Clone, Debug, PartialEq)]
pub enum Wire {
    /// A known compile-time value, backed by a cached wire id (never
    /// reallocated for a value already seen).
    Constant { id: WireId, value: FieldElement },
    /// An ordinary circuit wire backed by an id, with no special lowering
    /// policy.
    Variable { id: WireId },
    /// A formal sum over existing wire ids; has no id of its own until
    /// `pack_if_needed` materializes it.
    LinearCombination(LinearCombination),
}

impl Wire {
    /// The wire's id, if it already has one (constants and variables do;
    /// linear combinations don't until packed).
    pub fn id(&self) -> Option<WireId> {
        match self {
            Wire::Constant { id, .. } | Wire::Variable { id } => Some(*id),
            Wire::LinearCombination(_) => None,
        }
    }

    /// The wire's compile-time value, if statically known.
    pub fn as_constant(&self) -> Option<FieldElement> {
        match self {
            Wire::Constant { value, .. } => Some(*value),
            Wire::Variable { .. } => None,
            Wire::LinearCombination(lc) if lc.is_constant() => Some(lc.constant),
            Wire::LinearCombination(_) => None,
        }
    }

    pub fn is_linear_combination(&self) -> bool {
        matches!(self, Wire::LinearCombination(_))
    }

    /// Views any wire as a linear combination (`1·id + 0`, or the constant
    /// itself for `Constant`/already-linear wires), the representation
    /// `+`/`-` fold into before deciding whether a gate is needed.
    pub fn as_linear_combination(&self) -> LinearCombination {
        match self {
            Wire::Constant { value, .. } => LinearCombination::from_constant(*value),
            Wire::Variable { id } => LinearCombination::from_term(FieldElement::one(), *id),
            Wire::LinearCombination(lc) => lc.clone(),
        }
    }
}

/// A `Wire` that has already been constrained to `{0, 1}`.
///
/// The private field forces every instantiation through a constructor that
/// has itself proven booleanity (a `split` output, an `and`/`or`/`xor`
/// result, an explicit `assert_boolean`, etc).
#[derive(Clone, Debug, PartialEq)]
#[allow(clippy::manual_non_exhaustive)]
pub struct BitWire {
    pub wire: Wire,
    _private: (),
}

impl BitWire {
    /// Callers must have already arranged for `wire` to be boolean-valued in
    /// every satisfying assignment.
    pub fn new_unchecked(wire: Wire) -> Self {
        BitWire { wire, _private: () }
    }

    pub fn wire(&self) -> Wire {
        self.wire.clone()
    }
}
