use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, DESTINATION},
    CompilerError,
};

use super::sized_operand;

#[derive(Debug, Clone, Copy)]
pub struct IncrementDecrement;

impl Emitter for IncrementDecrement {
    fn name(&self) -> &'static str {
        "increment-decrement"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[DESTINATION, Match::Text("++")],
            &[DESTINATION, Match::Text("--")],
            &[
                DESTINATION,
                Match::Text("="),
                Match::Same(0),
                Match::Text("+"),
                Match::Text("1"),
            ],
            &[
                DESTINATION,
                Match::Text("="),
                Match::Same(0),
                Match::Text("-"),
                Match::Text("1"),
            ],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let increment = points
            .iter()
            .any(|p| matches!(p.get_value(), "++" | "+"));
        let dst = sized_operand(ctx.state, &points[0])?;

        ctx.asm.instr(if increment { "inc" } else { "dec" }, &[dst]);
        Ok(())
    }
}
