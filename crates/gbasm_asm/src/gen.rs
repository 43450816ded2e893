//! The second pass.

use crate::grammar::{self, Values};
use crate::ir::Pending;
use crate::symbol::SymbolTable;
use crate::{Assembled, Error};

fn gen<'a>(ins: &Pending<'a>, values: &Values<'_, 'a>) -> Result<Assembled, Error> {
    let instruction = grammar::build(ins, values)?;
    trace!("{:#06x}: {instruction}", ins.address);
    Ok(Assembled { address: ins.address, instruction })
}

/// Resolve every pending instruction, stopping at the first error.
pub(crate) fn gen_ins<'a>(
    pending: &[Pending<'a>],
    symbols: &SymbolTable<'a>,
) -> Result<Vec<Assembled>, Error> {
    let values = Values::Resolve(symbols);
    pending.iter().map(|ins| gen(ins, &values)).collect()
}

/// Resolve every pending instruction. Returns the instructions that resolved and the errors of
/// those that didn't.
pub(crate) fn gen_all<'a>(
    pending: &[Pending<'a>],
    symbols: &SymbolTable<'a>,
) -> (Vec<Assembled>, Vec<Error>) {
    let values = Values::Resolve(symbols);
    let mut instructions = Vec::with_capacity(pending.len());
    let mut errors = Vec::new();
    for ins in pending {
        match gen(ins, &values) {
            Ok(ins) => instructions.push(ins),
            Err(err) => errors.push(err),
        }
    }
    (instructions, errors)
}
