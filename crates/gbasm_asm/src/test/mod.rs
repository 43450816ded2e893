mod errors;
mod families;
mod range;
mod resolve;
mod round_trip;

use crate::{assemble, Error, Program};

use gbasm_isa::Instruction;

pub fn assemble_ok(input: &str) -> Program {
    match assemble(input, 0) {
        Ok(program) => program,
        Err(diagnostic) => panic!("{diagnostic}"),
    }
}

pub fn assemble_err(input: &str) -> Error {
    match assemble(input, 0) {
        Ok(program) => panic!("expected an error, got {:?}", program.instructions()),
        Err(diagnostic) => diagnostic.error().clone(),
    }
}

pub fn instructions(input: &str) -> Vec<Instruction> {
    assemble_ok(input)
        .instructions()
        .iter()
        .map(|ins| ins.instruction)
        .collect()
}

pub fn single(input: &str) -> Instruction {
    match instructions(input).as_slice() {
        [ins] => *ins,
        other => panic!("expected a single instruction from {input:?}, got {other:?}"),
    }
}
