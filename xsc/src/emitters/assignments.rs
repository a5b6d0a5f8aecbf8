use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, DESTINATION, OPERAND},
    CompilerError,
};

use super::operand_pair;

#[derive(Debug, Clone, Copy)]
pub struct Assignments;

impl Emitter for Assignments {
    fn name(&self) -> &'static str {
        "assignments"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[&[DESTINATION, Match::Text("="), OPERAND]]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let ops = operand_pair(ctx.state, &points[0], &points[2])?;
        ctx.asm.instr("mov", &ops);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{emitters::compile_quiet, CompilerError};

    #[test]
    fn moves() {
        let src = "namespace Demo\nEAX = 5\nEBX = EAX\n[EDI + 4] = 0x10\nlimit = ECX\nESI = limit";
        let out = compile_quiet(src).unwrap();
        assert_eq!(
            out,
            [
                "mov EAX, 5",
                "mov EBX, EAX",
                "mov dword [EDI + 4], 0x10",
                "mov [Demo_limit], ECX",
                "mov ESI, [Demo_limit]"
            ]
        );
    }

    #[test]
    fn memory_to_memory() {
        let err = compile_quiet("namespace Demo\n[EAX] = other").unwrap_err();
        assert_eq!(err.line, 2);
        assert!(matches!(err.err, CompilerError::Emit(_)));
    }
}
