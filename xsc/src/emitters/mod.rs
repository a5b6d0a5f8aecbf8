mod assignments;
mod comments;
mod compare;
mod flow;
mod inc_dec;
mod math;
mod namespace;
mod ports;
mod push_pop;
mod shift_rotate;
mod zero_param;

use core::fmt;

pub use assignments::Assignments;
pub use comments::Comments;
pub use compare::Comparisons;
pub use flow::Flow;
pub use inc_dec::IncrementDecrement;
pub use math::Math;
pub use namespace::Namespace;
pub use ports::Ports;
pub use push_pop::PushPop;
pub use shift_rotate::ShiftRotate;
pub use zero_param::ZeroParamOps;

use crate::{
    compiler::CompilerState,
    dispatch::{CodePoint, DialectError, DispatchTable},
    tokenizer::TokenKind,
    CompilerError,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitError {
    InvalidOperands(String),
    OutsideFunction(&'static str),
    NestedFunction(String),
    NoOpenBlock(&'static str),
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidOperands(s) => write!(f, "Invalid Operands - {s}"),
            Self::OutsideFunction(s) => write!(f, "\"{s}\" is only allowed inside a function"),
            Self::NestedFunction(s) => {
                write!(f, "function \"{s}\" started before the previous one ended")
            }
            Self::NoOpenBlock(s) => write!(f, "\"{s}\" used without an open block"),
        }
    }
}

/// The emitters of the dialect, in dispatch priority order.
pub fn standard_table() -> DispatchTable {
    let mut table = DispatchTable::new();
    table.add_emitter(Namespace);
    table.add_emitter(Comments);
    table.add_emitter(Ports);
    // Must stay ahead of PushPop, "+All" also reads as a push
    table.add_emitter(ZeroParamOps);
    // Must stay ahead of Math, "x = x + 1" also reads as an add
    table.add_emitter(IncrementDecrement);
    table.add_emitter(PushPop);
    table.add_emitter(Assignments);
    table.add_emitter(Comparisons);
    table.add_emitter(Math);
    table.add_emitter(ShiftRotate);
    table.add_emitter(Flow);
    table
}

/// For a line whose shape none of the emitter's own patterns describe.
pub(crate) fn unexpected(points: &[CodePoint]) -> CompilerError {
    let text = points
        .iter()
        .map(|p| p.get_value())
        .collect::<Vec<_>>()
        .join(" ");
    DialectError::Unrecognized(text).into()
}

pub(crate) fn is_memory(p: &CodePoint) -> bool {
    matches!(p.get_kind(), TokenKind::Memory | TokenKind::Identifier)
}

/// Identifiers are variables of the current namespace.
pub(crate) fn operand(state: &CompilerState, p: &CodePoint) -> Result<String, CompilerError> {
    match p.get_kind() {
        TokenKind::Identifier => Ok(format!("[{}_{}]", state.namespace()?, p.get_value())),
        TokenKind::Register | TokenKind::Integer | TokenKind::Memory => {
            Ok(p.get_value().to_string())
        }
        _ => Err(EmitError::InvalidOperands(format!(
            "\"{}\" is not an operand",
            p.get_value()
        ))
        .into()),
    }
}

pub(crate) fn sized_operand(state: &CompilerState, p: &CodePoint) -> Result<String, CompilerError> {
    let op = operand(state, p)?;
    if is_memory(p) || p.get_kind() == TokenKind::Integer {
        Ok(format!("dword {op}"))
    } else {
        Ok(op)
    }
}

/// Operands for a two-operand instruction writing to `dst`.
pub(crate) fn operand_pair(
    state: &CompilerState,
    dst: &CodePoint,
    src: &CodePoint,
) -> Result<[String; 2], CompilerError> {
    if dst.get_kind() == TokenKind::Integer {
        return Err(EmitError::InvalidOperands(format!(
            "immediate \"{}\" cannot be a destination",
            dst.get_value()
        ))
        .into());
    } else if is_memory(dst) && is_memory(src) {
        return Err(EmitError::InvalidOperands(format!(
            "\"{}\" and \"{}\" are both memory",
            dst.get_value(),
            src.get_value()
        ))
        .into());
    }

    let d = if is_memory(dst) && src.get_kind() == TokenKind::Integer {
        sized_operand(state, dst)?
    } else {
        operand(state, dst)?
    };

    Ok([d, operand(state, src)?])
}

pub(crate) fn current_function(
    state: &CompilerState,
    construct: &'static str,
) -> Result<String, CompilerError> {
    match &state.function {
        Some(f) => Ok(format!("{}_{}", state.namespace()?, f)),
        None => Err(EmitError::OutsideFunction(construct).into()),
    }
}

/// User labels live in the enclosing function when there is one.
pub(crate) fn user_label(state: &CompilerState, name: &str) -> Result<String, CompilerError> {
    let ns = state.namespace()?;
    match &state.function {
        Some(f) => Ok(format!("{ns}_{f}_{name}")),
        None => Ok(format!("{ns}_{name}")),
    }
}

pub(crate) fn block_label(
    state: &CompilerState,
    label_id: usize,
    suffix: &str,
) -> Result<String, CompilerError> {
    let base = current_function(state, "block")?;
    Ok(format!("{base}_Block{label_id}_{suffix}"))
}

#[cfg(test)]
pub(crate) fn compile_quiet(src: &str) -> Result<Vec<String>, crate::CompilerErrorLoc> {
    let options = crate::CompilerOptions {
        emit_source: false,
        emit_user_comments: true,
    };

    Ok(crate::compile_text(src, options)?
        .lines()
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .collect())
}
