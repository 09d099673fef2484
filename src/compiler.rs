//! Compile SRL source text all the way to a regex string.

use log::debug;

use crate::context::Context;
use crate::error::CompileError;
use crate::grammar::parse;

/// Compile `source`, resolving references against the built-in names.
pub fn compile(source: &str) -> Result<String, CompileError> {
    compile_with(source, &Context::with_builtins())
}

/// Compile `source`, resolving references through `ctx`.
pub fn compile_with(source: &str, ctx: &Context) -> Result<String, CompileError> {
    let pattern = parse(source)?;
    debug!("parsed {source:?} as: {pattern}");
    let regex = pattern.translate(ctx)?;
    debug!("compiled to {regex:?}");
    Ok(regex)
}
