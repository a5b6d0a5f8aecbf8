use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern},
    tokenizer::TokenKind,
    CompilerError,
};

use super::{unexpected, EmitError};

#[derive(Debug, Clone, Copy)]
pub struct Ports;

impl Ports {
    fn port(p: &CodePoint) -> Result<String, EmitError> {
        let inner = p
            .get_value()
            .trim_start_matches('[')
            .trim_end_matches(']')
            .trim();

        let is_imm8 = if let Some(hex) = inner.strip_prefix("0x").or(inner.strip_prefix("0X")) {
            u8::from_str_radix(hex, 16).is_ok()
        } else {
            inner.parse::<u8>().is_ok()
        };

        if inner.eq_ignore_ascii_case("DX") || is_imm8 {
            Ok(inner.to_string())
        } else {
            Err(EmitError::InvalidOperands(format!(
                "port must be DX or an 8-bit immediate, found \"{inner}\""
            )))
        }
    }
}

impl Emitter for Ports {
    fn name(&self) -> &'static str {
        "ports"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[
                Match::Text("Port"),
                Match::Kind(TokenKind::Memory),
                Match::Text("="),
                Match::Kind(TokenKind::Register),
            ],
            &[
                Match::Kind(TokenKind::Register),
                Match::Text("="),
                Match::Text("Port"),
                Match::Kind(TokenKind::Memory),
            ],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        match points {
            [_, port, _, reg] if points[0].get_value() == "Port" => {
                ctx.asm.instr("out", &[Self::port(port)?.as_str(), reg.get_value()]);
            }
            [reg, _, _, port] => {
                ctx.asm.instr("in", &[reg.get_value(), Self::port(port)?.as_str()]);
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
    fn in_and_out() {
        let out = compile_quiet("Port[DX] = AL\nAL = Port[ DX ]\nPort[0x60] = AL").unwrap();
        assert_eq!(out, ["out DX, AL", "in AL, DX", "out 0x60, AL"]);
    }

    #[test]
    fn bad_port() {
        let err = compile_quiet("Port[EAX] = AL").unwrap_err();
        assert!(matches!(err.err, CompilerError::Emit(_)));
        assert!(compile_quiet("Port[300] = AL").is_err());
    }
}
