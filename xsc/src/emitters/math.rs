use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, DESTINATION, OPERAND},
    CompilerError,
};

use super::{is_memory, operand_pair, sized_operand, unexpected, EmitError};

const MATH_OPS: Match = Match::OneOf(&["+", "-", "&", "|", "^"]);

#[derive(Debug, Clone, Copy)]
pub struct Math;

impl Math {
    fn mnemonic(op: &str) -> &'static str {
        match op {
            "+" => "add",
            "-" => "sub",
            "&" => "and",
            "|" => "or",
            _ => "xor",
        }
    }

    fn same(a: &CodePoint, b: &CodePoint) -> bool {
        a.get_kind() == b.get_kind() && a.get_value() == b.get_value()
    }
}

impl Emitter for Math {
    fn name(&self) -> &'static str {
        "math"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[DESTINATION, MATH_OPS, OPERAND],
            &[DESTINATION, Match::Text("="), OPERAND, MATH_OPS, OPERAND],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        match points {
            [dst, op, src] => {
                let ops = operand_pair(ctx.state, dst, src)?;
                ctx.asm.instr(Self::mnemonic(op.get_value()), &ops);
            }
            [dst, _, lhs, op, src] if Self::same(dst, lhs) => {
                let ops = operand_pair(ctx.state, dst, src)?;
                ctx.asm.instr(Self::mnemonic(op.get_value()), &ops);
            }
            // dst is also the right operand, so it cannot be loaded first
            [dst, _, lhs, op, src] if Self::same(dst, src) => {
                let ops = operand_pair(ctx.state, dst, lhs)?;
                if op.get_value() == "-" {
                    ctx.asm.instr("neg", &[sized_operand(ctx.state, dst)?]);
                    ctx.asm.instr("add", &ops);
                } else {
                    ctx.asm.instr(Self::mnemonic(op.get_value()), &ops);
                }
            }
            [dst, _, lhs, op, src] => {
                if is_memory(dst) && (is_memory(lhs) || is_memory(src)) {
                    return Err(EmitError::InvalidOperands(format!(
                        "\"{}\" needs a register to combine \"{}\" and \"{}\"",
                        dst.get_value(),
                        lhs.get_value(),
                        src.get_value()
                    ))
                    .into());
                }

                let load = operand_pair(ctx.state, dst, lhs)?;
                let ops = operand_pair(ctx.state, dst, src)?;
                ctx.asm.instr("mov", &load);
                ctx.asm.instr(Self::mnemonic(op.get_value()), &ops);
            }
            _ => return Err(unexpected(points)),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{emitters::compile_quiet, CompilerError};

    #[test]
    fn in_place() {
        let src = "namespace Demo\nEAX + 4\nEBX - ECX\nAL & 0x0F\nAH | BL\ntotal ^ EDX";
        let out = compile_quiet(src).unwrap();
        assert_eq!(
            out,
            [
                "add EAX, 4",
                "sub EBX, ECX",
                "and AL, 0x0F",
                "or AH, BL",
                "xor [Demo_total], EDX"
            ]
        );
    }

    #[test]
    fn three_operand() {
        let src = "namespace Demo\nEAX = EAX - 8\nECX = EBX + size\ncount = count + 3";
        let out = compile_quiet(src).unwrap();
        assert_eq!(
            out,
            [
                "sub EAX, 8",
                "mov ECX, EBX",
                "add ECX, [Demo_size]",
                "add dword [Demo_count], 3"
            ]
        );
    }

    #[test]
    fn destination_on_the_right() {
        let src = "namespace Demo\nEAX = EBX - EAX\nECX = EDX + ECX\nAL = 0x0F & AL\ncount = 5 - count";
        let out = compile_quiet(src).unwrap();
        assert_eq!(
            out,
            [
                "neg EAX",
                "add EAX, EBX",
                "add ECX, EDX",
                "and AL, 0x0F",
                "neg dword [Demo_count]",
                "add dword [Demo_count], 5"
            ]
        );
    }

    #[test]
    fn memory_destination_needs_register() {
        let err = compile_quiet("namespace Demo\ncount = EAX + other").unwrap_err();
        assert!(matches!(err.err, CompilerError::Emit(_)));
    }
}
