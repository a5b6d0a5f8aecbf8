use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, OPERAND},
    CompilerError,
};

use super::operand_pair;

/// `a ?= b` compares, `a ?& b` tests bits. Both only set flags.
#[derive(Debug, Clone, Copy)]
pub struct Comparisons;

impl Emitter for Comparisons {
    fn name(&self) -> &'static str {
        "comparisons"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[&[OPERAND, Match::OneOf(&["?=", "?&"]), OPERAND]]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let ops = operand_pair(ctx.state, &points[0], &points[2])?;
        let mnemonic = if points[1].get_value() == "?=" {
            "cmp"
        } else {
            "test"
        };

        ctx.asm.instr(mnemonic, &ops);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::emitters::compile_quiet;

    #[test]
    fn compare_and_test() {
        let out = compile_quiet("namespace Demo\nEAX ?= 0\nAL ?& 0x80\nflags ?= 1").unwrap();
        assert_eq!(out, ["cmp EAX, 0", "test AL, 0x80", "cmp dword [Demo_flags], 1"]);
    }

    #[test]
    fn immediate_first() {
        assert!(compile_quiet("4 ?= EAX").is_err());
    }
}
