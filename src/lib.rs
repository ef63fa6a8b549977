//! Public entry-points for use by the CLI **and** the test-harness.

pub mod compiler;

use compiler::builder::Builder;
use compiler::emitter::Emitter;
use compiler::lexer::tokenize;
use compiler::ops::Op;

/// Lexes and builds Worth source into a resolved program.
pub fn compile(source: &str) -> Result<Vec<Op>, String> {
    Builder::new(tokenize(source)).run()
}

/// Compiles Worth source and returns the complete FASM listing as text.
pub fn compile_to_fasm(source: &str) -> Result<String, String> {
    let program = compile(source)?;
    let mut out: Vec<u8> = Vec::new();
    Emitter::new(&mut out)
        .run(&program)
        .map_err(|err| err.to_string())?;
    String::from_utf8(out).map_err(|err| err.to_string())
}
