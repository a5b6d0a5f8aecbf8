use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern},
    tokenizer::TokenKind,
    CompilerError,
};

/// `// text` becomes an assembly comment, `//! text` is copied out verbatim.
#[derive(Debug, Clone, Copy)]
pub struct Comments;

impl Emitter for Comments {
    fn name(&self) -> &'static str {
        "comments"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[Match::Kind(TokenKind::Comment)],
            &[Match::Kind(TokenKind::Literal)],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let p = &points[0];
        match p.get_kind() {
            TokenKind::Literal => ctx.asm.line(p.get_value()),
            _ if !ctx.state.get_options().emit_user_comments => (),
            _ if p.get_value().is_empty() => ctx.asm.line(";"),
            _ => ctx.asm.comment(p.get_value()),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{compile_text, CompilerOptions};

    #[test]
    fn comment_lines() {
        let src = "// first\n//\n//! mov eax, cr0";
        let out = compile_text(src, CompilerOptions::default()).unwrap();
        assert_eq!(out, "; first\n;\n; //! mov eax, cr0\nmov eax, cr0\n");

        let options = CompilerOptions {
            emit_source: false,
            emit_user_comments: false,
        };
        let out = compile_text(src, options).unwrap();
        assert_eq!(out, "mov eax, cr0\n");
    }
}
