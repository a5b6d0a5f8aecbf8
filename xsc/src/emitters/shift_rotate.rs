use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, DESTINATION},
    tokenizer::TokenKind,
    CompilerError,
};

use super::{sized_operand, EmitError};

#[derive(Debug, Clone, Copy)]
pub struct ShiftRotate;

impl Emitter for ShiftRotate {
    fn name(&self) -> &'static str {
        "shift-rotate"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[&[
            DESTINATION,
            Match::OneOf(&["<<", ">>", "<~", "~>"]),
            Match::Kinds(&[TokenKind::Integer, TokenKind::Register]),
        ]]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let count = &points[2];
        if count.get_kind() == TokenKind::Register && !count.get_value().eq_ignore_ascii_case("CL")
        {
            return Err(EmitError::InvalidOperands(format!(
                "shift count must be CL or an immediate, found \"{}\"",
                count.get_value()
            ))
            .into());
        }

        let mnemonic = match points[1].get_value() {
            "<<" => "shl",
            ">>" => "shr",
            "<~" => "rol",
            _ => "ror",
        };

        let dst = sized_operand(ctx.state, &points[0])?;
        ctx.asm.instr(mnemonic, &[dst.as_str(), count.get_value()]);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::emitters::compile_quiet;

    #[test]
    fn shifts_and_rotates() {
        let out = compile_quiet("EAX << 2\nEBX >> CL\nAL <~ 1\n[ESI] ~> 4").unwrap();
        assert_eq!(
            out,
            ["shl EAX, 2", "shr EBX, CL", "rol AL, 1", "ror dword [ESI], 4"]
        );
    }

    #[test]
    fn count_register() {
        assert!(compile_quiet("EAX << EBX").is_err());
    }
}
