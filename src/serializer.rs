//! `.arith`/`.in` text serialization.

use std::fmt::Write as _;
use std::path::Path;

use crate::error::Result;
use crate::field::FieldElement;
use crate::generator::CircuitGenerator;
use crate::ops::{Instruction, LabelOp};

fn join(ids: &[usize]) -> String {
    ids.iter().map(|i| i.to_string()).collect::<Vec<_>>().join(" ")
}

/// Writes the circuit description: a `total <n>` header, one line per
/// input/witness/output label, and one line per primitive gate, in the
/// order instructions were queued.
pub fn write_arith(path: impl AsRef<Path>, generator: &CircuitGenerator) -> Result<()> {
    let mut out = String::new();
    writeln!(out, "total {}", generator.current_wire_id()).unwrap();

    for instruction in generator.queue() {
        match instruction {
            Instruction::Label(LabelOp::Input { id, description }) => match description {
                Some(d) => writeln!(out, "input {id} # {d}").unwrap(),
                None => writeln!(out, "input {id}").unwrap(),
            },
            Instruction::Label(LabelOp::Witness { id }) => {
                writeln!(out, "nizkinput {id}").unwrap()
            }
            Instruction::Label(LabelOp::Output { id }) => writeln!(out, "output {id}").unwrap(),
            Instruction::Basic { op, outputs, .. } => {
                let inputs = op.inputs();
                writeln!(
                    out,
                    "{} in {} {} out {} {}",
                    op.mnemonic(),
                    inputs.len(),
                    join(&inputs),
                    outputs.len(),
                    join(outputs)
                )
                .unwrap();
            }
            Instruction::Witness(_) => {
                // doneWithinCircuit = false: never appears in the .arith file.
            }
        }
    }

    std::fs::write(path, out)?;
    Ok(())
}

/// Writes the witness file: one `<id> <hex value>` line per input and
/// witness wire (including the one-wire, declared first by construction).
pub fn write_witness(
    path: impl AsRef<Path>,
    generator: &CircuitGenerator,
    values: &[FieldElement],
) -> Result<()> {
    let mut out = String::new();
    for &id in generator.inputs().iter().chain(generator.witnesses()) {
        writeln!(out, "{id} {}", values[id].to_hex()).unwrap();
    }
    std::fs::write(path, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CircuitConfig;
    use crate::evaluator::Evaluator;

    #[test]
    fn arith_file_starts_with_total_and_one_wire_input() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        gen.make_output(&a, None).unwrap();

        let dir = std::env::temp_dir().join("r1cs-circuit-builder-test-arith");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.arith");
        write_arith(&path, &gen).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert!(lines.next().unwrap().starts_with("total "));
        assert_eq!(lines.next().unwrap(), "input 1 # one-wire");
    }

    #[test]
    fn witness_file_has_one_line_per_input() {
        let mut gen = CircuitGenerator::new(CircuitConfig::default());
        let a = gen.create_input(Some("a"));
        gen.make_output(&a, None).unwrap();

        let values = Evaluator::new(&gen)
            .evaluate(|ev| ev.set_wire(&a, FieldElement::from_u64(42)))
            .unwrap();

        let dir = std::env::temp_dir().join("r1cs-circuit-builder-test-witness");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("sample.in");
        write_witness(&path, &gen, &values).unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), gen.inputs().len());
        assert!(content.lines().next().unwrap().starts_with("1 "));
    }
}
