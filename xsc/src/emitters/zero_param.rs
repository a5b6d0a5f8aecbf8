use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern},
    CompilerError,
};

use super::unexpected;

#[derive(Debug, Clone, Copy)]
pub struct ZeroParamOps;

impl Emitter for ZeroParamOps {
    fn name(&self) -> &'static str {
        "zero-param-ops"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[Match::Text("+"), Match::Text("All")],
            &[Match::Text("-"), Match::Text("All")],
            &[Match::OneOf(&["NOP", "CLI", "STI", "HLT", "IRet"])],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let mnemonic = match points {
            [sign, _] if sign.get_value() == "+" => "pushad".to_string(),
            [_, _] => "popad".to_string(),
            [op] if op.get_value() == "IRet" => "iret".to_string(),
            [op] => op.get_value().to_lowercase(),
            _ => return Err(unexpected(points)),
        };

        ctx.asm.line(mnemonic);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::emitters::compile_quiet;

    #[test]
    fn zero_operand_instructions() {
        let out = compile_quiet("+All\n-All\nNOP\nCLI\nIRet").unwrap();
        assert_eq!(out, ["pushad", "popad", "nop", "cli", "iret"]);
    }
}
