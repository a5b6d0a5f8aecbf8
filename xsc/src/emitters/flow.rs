use crate::{
    blocks::{Block, BlockError, BlockKind},
    compiler::EmitContext,
    dispatch::{CodePoint, Emitter, Match, Pattern, OPERAND},
    tokenizer::TokenKind,
    CompilerError,
};

use super::{block_label, current_function, operand_pair, unexpected, user_label, EmitError};

const CONDITIONS: Match = Match::OneOf(&["=", "!=", "<", ">", "<=", ">="]);

/// Functions, blocks, labels, jumps and variable declarations.
#[derive(Debug, Clone, Copy)]
pub struct Flow;

impl Flow {
    /// Jump taken when the condition does not hold.
    fn inverse_jump(cond: &str) -> &'static str {
        match cond {
            "=" => "jne",
            "!=" => "je",
            "<" => "jae",
            ">" => "jbe",
            "<=" => "ja",
            _ => "jb",
        }
    }

    fn compare(
        ctx: &mut EmitContext<'_>,
        lhs: &CodePoint,
        rhs: &CodePoint,
    ) -> Result<(), CompilerError> {
        let ops = operand_pair(ctx.state, lhs, rhs)?;
        ctx.asm.instr("cmp", &ops);
        Ok(())
    }

    fn start_function(ctx: &mut EmitContext<'_>, name: &str) -> Result<(), CompilerError> {
        if let Some(f) = &ctx.state.function {
            return Err(EmitError::NestedFunction(f.clone()).into());
        }

        let label = format!("{}_{name}", ctx.state.namespace()?);
        log::debug!("starting function {label}");

        ctx.state.function = Some(name.to_string());
        ctx.state.label = None;
        ctx.state.blocks.reset();
        ctx.asm.label(label);
        Ok(())
    }

    fn close(ctx: &mut EmitContext<'_>) -> Result<(), CompilerError> {
        if ctx.state.blocks.current().is_some() {
            let block = ctx.state.blocks.end()?;
            return Self::close_block(ctx, block);
        }

        let Some(func) = ctx.state.function.take() else {
            return Err(BlockError::Underflow.into());
        };

        let exit = format!("{}_{func}_Exit", ctx.state.namespace()?);
        log::debug!("ending function {func}");

        ctx.state.label = None;
        ctx.asm.label(exit);
        ctx.asm.instr::<&str>("ret", &[]);
        Ok(())
    }

    fn close_block(ctx: &mut EmitContext<'_>, block: Block) -> Result<(), CompilerError> {
        let begin = block_label(ctx.state, block.label_id, "Begin")?;
        let end = block_label(ctx.state, block.label_id, "End")?;

        match block.kind {
            BlockKind::While => ctx.asm.instr("jmp", &[begin]),
            BlockKind::Repeat => ctx.asm.instr("loop", &[begin]),
            BlockKind::If | BlockKind::Label | BlockKind::None => (),
        }

        ctx.asm.label(end);
        Ok(())
    }

    fn declare(
        ctx: &mut EmitContext<'_>,
        name: &str,
        init: Option<&CodePoint>,
    ) -> Result<(), CompilerError> {
        let label = format!("{}_{name}", ctx.state.namespace()?);

        match init {
            Some(t) if t.get_kind() == TokenKind::Text => {
                ctx.asm.line(format!("{label} db {}, 0", t.get_value()))
            }
            Some(v) => ctx.asm.line(format!("{label} dd {}", v.get_value())),
            None => ctx.asm.line(format!("{label} dd 0")),
        }

        Ok(())
    }
}

impl Emitter for Flow {
    fn name(&self) -> &'static str {
        "flow"
    }

    fn patterns(&self) -> &'static [Pattern] {
        &[
            &[
                Match::Text("function"),
                Match::Kind(TokenKind::Identifier),
                Match::Text("{"),
            ],
            &[Match::Text("}")],
            &[Match::Text("{")],
            &[Match::Text("return")],
            &[Match::Text("break")],
            &[Match::Text("if"), OPERAND, CONDITIONS, OPERAND, Match::Text("{")],
            &[Match::Text("while"), OPERAND, CONDITIONS, OPERAND, Match::Text("{")],
            &[
                Match::Text("repeat"),
                Match::Kinds(&[TokenKind::Integer, TokenKind::Register]),
                Match::Text("times"),
                Match::Text("{"),
            ],
            &[
                Match::Kind(TokenKind::Identifier),
                Match::Text(":"),
                Match::Text("{"),
            ],
            &[Match::Kind(TokenKind::Identifier), Match::Text(":")],
            &[Match::Text("goto"), Match::Kind(TokenKind::Identifier)],
            &[Match::Text("call"), Match::Kind(TokenKind::Identifier)],
            &[Match::Text("var"), Match::Kind(TokenKind::Identifier)],
            &[
                Match::Text("var"),
                Match::Kind(TokenKind::Identifier),
                Match::Text("="),
                Match::Kinds(&[TokenKind::Integer, TokenKind::Text]),
            ],
        ]
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
        let words = points.iter().map(|p| p.get_value()).collect::<Vec<_>>();

        match words.as_slice() {
            ["function", name, "{"] => Self::start_function(ctx, name)?,
            ["}"] => Self::close(ctx)?,
            ["{"] => {
                current_function(ctx.state, "{")?;
                ctx.state.blocks.start(BlockKind::None);
            }
            ["return"] => {
                let exit = format!("{}_Exit", current_function(ctx.state, "return")?);
                ctx.asm.instr("jmp", &[exit]);
            }
            ["break"] => {
                let Some(block) = ctx.state.blocks.current() else {
                    return Err(EmitError::NoOpenBlock("break").into());
                };
                let end = block_label(ctx.state, block.label_id, "End")?;
                ctx.asm.instr("jmp", &[end]);
            }
            ["if", _, cond, _, "{"] => {
                current_function(ctx.state, "if")?;
                Self::compare(ctx, &points[1], &points[3])?;

                let block = ctx.state.blocks.start(BlockKind::If);
                let end = block_label(ctx.state, block.label_id, "End")?;
                ctx.asm.instr(Self::inverse_jump(cond), &[end]);
            }
            ["while", _, cond, _, "{"] => {
                current_function(ctx.state, "while")?;

                let block = ctx.state.blocks.start(BlockKind::While);
                let begin = block_label(ctx.state, block.label_id, "Begin")?;
                let end = block_label(ctx.state, block.label_id, "End")?;

                ctx.asm.label(begin);
                Self::compare(ctx, &points[1], &points[3])?;
                ctx.asm.instr(Self::inverse_jump(cond), &[end]);
            }
            ["repeat", count, "times", "{"] => {
                current_function(ctx.state, "repeat")?;

                let block = ctx.state.blocks.start(BlockKind::Repeat);
                let begin = block_label(ctx.state, block.label_id, "Begin")?;

                if !count.eq_ignore_ascii_case("ECX") {
                    ctx.asm.instr("mov", &["ECX", *count]);
                }
                ctx.asm.label(begin);
            }
            [name, ":", "{"] => {
                current_function(ctx.state, "label block")?;

                let label = user_label(ctx.state, name)?;
                ctx.state.label = Some(name.to_string());
                ctx.state.blocks.start(BlockKind::Label);
                ctx.asm.label(label);
            }
            [name, ":"] => {
                let label = user_label(ctx.state, name)?;
                ctx.state.label = Some(name.to_string());
                ctx.asm.label(label);
            }
            ["goto", name] => {
                let label = user_label(ctx.state, name)?;
                ctx.asm.instr("jmp", &[label]);
            }
            ["call", name] => {
                let target = format!("{}_{name}", ctx.state.namespace()?);
                ctx.asm.instr("call", &[target]);
            }
            ["var", name] => Self::declare(ctx, name, None)?,
            ["var", name, "=", _] => Self::declare(ctx, name, Some(&points[3]))?,
            _ => return Err(unexpected(points)),
        }

        Ok(())
    }
}
