use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, OPERAND},
    tokenizer::TokenKind,
    CompilerError,
};

use super::{sized_operand, EmitError};

#[derive(Debug, Clone, Copy)]
pub struct PushPop;

impl Emitter for PushPop {
    fn name(&self) -> &'static str {
        "push-pop"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[&[Match::Text("+"), OPERAND], &[Match::Text("-"), OPERAND]]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let op = &points[1];

        if points[0].get_value() == "+" {
            ctx.asm.instr("push", &[sized_operand(ctx.state, op)?]);
        } else if op.get_kind() == TokenKind::Integer {
            return Err(EmitError::InvalidOperands(format!(
                "cannot pop into immediate \"{}\"",
                op.get_value()
            ))
            .into());
        } else {
            ctx.asm.instr("pop", &[sized_operand(ctx.state, op)?]);
        }

        Ok(())
    }
}
