pub mod blocks;
pub mod compiler;
pub mod dispatch;
pub mod emitters;
pub mod nasm;
pub mod tokenizer;

use core::fmt;
use std::rc::Rc;

use blocks::BlockError;
use dispatch::DialectError;
use emitters::EmitError;

pub use compiler::{Compiler, CompilerOptions, ConfigError};

#[derive(Debug, Clone)]
pub enum CompilerError {
    Config(ConfigError),
    Dialect(DialectError),
    Emit(EmitError),
    Structural(BlockError),
    Io(String),
}

impl fmt::Display for CompilerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "Configuration Error => {e}"),
            Self::Dialect(e) => write!(f, "Dialect Error => {e}"),
            Self::Emit(e) => write!(f, "Emission Error => {e}"),
            Self::Structural(e) => write!(f, "Structural Error => {e}"),
            Self::Io(e) => write!(f, "IO Error => {e}"),
        }
    }
}

impl std::error::Error for CompilerError {}

impl From<ConfigError> for CompilerError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<DialectError> for CompilerError {
    fn from(value: DialectError) -> Self {
        Self::Dialect(value)
    }
}

impl From<EmitError> for CompilerError {
    fn from(value: EmitError) -> Self {
        Self::Emit(value)
    }
}

impl From<BlockError> for CompilerError {
    fn from(value: BlockError) -> Self {
        Self::Structural(value)
    }
}

impl From<std::io::Error> for CompilerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

/// A compilation failure tied to the 1-based source line it happened on.
#[derive(Debug, Clone)]
pub struct CompilerErrorLoc {
    pub err: CompilerError,
    pub line: usize,
    pub text: Option<Rc<str>>,
}

impl fmt::Display for CompilerErrorLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "compilation failed at line {} - {}", self.line, self.err)?;
        if let Some(s) = self.text.as_ref() {
            write!(f, " - \"{}\"", s.trim())?;
        }

        Ok(())
    }
}

impl std::error::Error for CompilerErrorLoc {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.err)
    }
}

pub fn compile_text(txt: &str, options: CompilerOptions) -> Result<String, CompilerErrorLoc> {
    let mut out = Vec::new();
    Compiler::new(options).compile(txt.as_bytes(), &mut out)?;

    String::from_utf8(out).map_err(|e| CompilerErrorLoc {
        err: CompilerError::Io(e.to_string()),
        line: txt.lines().count(),
        text: None,
    })
}
