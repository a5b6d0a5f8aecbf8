use crate::{
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern},
    tokenizer::TokenKind,
    CompilerError,
};

#[derive(Debug, Clone, Copy)]
pub struct Namespace;

impl Emitter for Namespace {
    fn name(&self) -> &'static str {
        "namespace"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[&[Match::Text("namespace"), Match::Kind(TokenKind::Identifier)]]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        ctx.state.set_namespace(points[1].get_value());
        Ok(())
    }
}
