//! A wire/instruction graph builder for R1CS arithmetic circuits.
//!
//! A [`generator::CircuitGenerator`] accumulates [`wire::Wire`]s and
//! [`ops::BasicOp`] instructions as a caller builds up a circuit with the
//! arithmetic and boolean operations on `CircuitGenerator` itself (`add`,
//! `mul`, `split`, `assert_boolean`, …). Structurally identical instructions
//! are deduplicated as they're queued (common subexpression elimination),
//! so building the same sub-circuit twice never costs a second constraint.
//!
//! Once construction is done, [`evaluator::Evaluator`] replays the queue
//! against concrete input values to produce a full witness, and
//! [`serializer`] writes that circuit and witness out in the `.arith`/`.in`
//! text formats an external prover consumes.
//!
//! ```
//! use r1cs_circuit_builder::config::CircuitConfig;
//! use r1cs_circuit_builder::evaluator::Evaluator;
//! use r1cs_circuit_builder::field::FieldElement;
//! use r1cs_circuit_builder::generator::CircuitGenerator;
//!
//! let mut gen = CircuitGenerator::new(CircuitConfig::default());
//! let a = gen.create_input(Some("a"));
//! let b = gen.create_input(Some("b"));
//! let sum = gen.add(&a, &b);
//! let out = gen.make_output(&sum, Some("sum")).unwrap();
//!
//! let values = Evaluator::new(&gen)
//!     .evaluate(|ev| {
//!         ev.set_wire(&a, FieldElement::from_u64(2))?;
//!         ev.set_wire(&b, FieldElement::from_u64(3))
//!     })
//!     .unwrap();
//! assert_eq!(values[out.id().unwrap()], FieldElement::from_u64(5));
//! ```

pub mod ambient;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod field;
pub mod generator;
pub mod ops;
pub mod serializer;
pub mod wire;
