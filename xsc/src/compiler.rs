use std::{
    fmt,
    io::{BufRead, Write},
    rc::Rc,
};

use crate::{
    blocks::BlockStack,
    dispatch::{trailing_emitter, DispatchTable},
    emitters,
    nasm::Nasm,
    tokenizer::TokenKind,
    CompilerError, CompilerErrorLoc,
};

/// Line that stops compilation when it is all a line contains.
pub const END_SENTINEL: &str = "//END";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilerOptions {
    /// Echo each source line as a comment before its assembly.
    pub emit_source: bool,
    /// Pass user comment lines through to the output.
    pub emit_user_comments: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            emit_source: true,
            emit_user_comments: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigError {
    NamespaceUnavailable,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NamespaceUnavailable => write!(
                f,
                "namespace not available - source must begin with a namespace declaration"
            ),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompilerState {
    namespace: Option<String>,
    pub function: Option<String>,
    pub label: Option<String>,
    pub blocks: BlockStack,
    indent: String,
    line: usize,
    options: CompilerOptions,
}

impl CompilerState {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            namespace: None,
            function: None,
            label: None,
            blocks: BlockStack::new(),
            indent: String::new(),
            line: 1,
            options,
        }
    }

    pub fn namespace(&self) -> Result<&str, ConfigError> {
        match self.namespace.as_deref() {
            Some(ns) if !ns.is_empty() => Ok(ns),
            _ => Err(ConfigError::NamespaceUnavailable),
        }
    }

    pub fn set_namespace(&mut self, ns: &str) {
        log::debug!("entering namespace {ns}");
        self.namespace = Some(ns.to_string());
    }

    pub fn get_indent(&self) -> &str {
        &self.indent
    }

    pub fn get_line(&self) -> usize {
        self.line
    }

    pub fn get_options(&self) -> &CompilerOptions {
        &self.options
    }
}

/// Everything an emitter may touch while writing one line.
pub struct EmitContext<'a> {
    pub state: &'a mut CompilerState,
    pub asm: &'a mut Nasm,
}

enum LineStep {
    Continue,
    Stop,
}

pub struct Compiler {
    state: CompilerState,
    table: DispatchTable,
    asm: Nasm,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        let table = emitters::standard_table();
        debug_assert!(table.verify_order().is_ok());
        Self::with_table(options, table)
    }

    pub fn with_table(options: CompilerOptions, table: DispatchTable) -> Self {
        Self {
            state: CompilerState::new(options),
            table,
            asm: Nasm::new(),
        }
    }

    pub fn state(&self) -> &CompilerState {
        &self.state
    }

    pub fn compile<R: BufRead, W: Write>(
        &mut self,
        input: R,
        output: &mut W,
    ) -> Result<(), CompilerErrorLoc> {
        self.state.line = 1;

        for read in input.lines() {
            let mut text: Option<Rc<str>> = None;

            let step = read.map_err(CompilerError::from).and_then(|raw| {
                let raw = raw.strip_suffix('\r').unwrap_or(&raw);
                text = Some(raw.into());
                self.process_line(raw)
            });

            let step = step.and_then(|s| {
                for l in self.asm.take_lines() {
                    writeln!(output, "{l}")?;
                }
                Ok(s)
            });

            match step {
                Ok(LineStep::Continue) => self.state.line += 1,
                Ok(LineStep::Stop) => {
                    log::debug!("end marker reached on line {}", self.state.line);
                    self.state.line += 1;
                    break;
                }
                Err(err) => {
                    self.asm.discard();
                    return Err(CompilerErrorLoc {
                        err,
                        line: self.state.line,
                        text,
                    });
                }
            }
        }

        Ok(())
    }

    fn process_line(&mut self, text: &str) -> Result<LineStep, CompilerError> {
        if text.trim().is_empty() {
            self.asm.blank();
            return Ok(LineStep::Continue);
        } else if text.trim() == END_SENTINEL {
            return Ok(LineStep::Stop);
        }

        let indent = &text[..text.len() - text.trim_start().len()];
        self.state.indent = indent.to_string();
        self.asm.set_indent(indent);

        let points = self.table.parse(text)?;
        let emitter = trailing_emitter(&points)?;
        log::trace!(
            "line {} dispatched to {} ({} tokens)",
            self.state.line,
            emitter.name(),
            points.len()
        );

        if self.state.options.emit_source && points[0].get_kind() != TokenKind::Comment {
            self.asm.comment(text.trim());
        }

        let mut ctx = EmitContext {
            state: &mut self.state,
            asm: &mut self.asm,
        };
        emitter.emit(&mut ctx, &points)?;

        Ok(LineStep::Continue)
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::{Compiler, CompilerOptions, ConfigError};
    use crate::{
        compiler::EmitContext,
        dispatch::{CodePoint, DispatchTable, Emitter, Match, Pattern},
        tokenizer::Token,
        CompilerError,
    };

    fn run(compiler: &mut Compiler, src: &str) -> Result<Vec<String>, crate::CompilerErrorLoc> {
        let mut out = Vec::new();
        compiler.compile(src.as_bytes(), &mut out)?;
        Ok(String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| l.to_string())
            .collect())
    }

    #[derive(Debug)]
    struct Counting {
        recognized: Rc<Cell<usize>>,
    }

    impl Emitter for Counting {
        fn name(&self) -> &'static str {
            "counting"
        }

        fn patterns(&self) -> &'static [Pattern] {
            &[&[Match::Any]]
        }

        fn recognize(&self, line: &[Token], index: usize) -> bool {
            self.recognized.set(self.recognized.get() + 1);
            line.len() == index + 1
        }

        fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError> {
            ctx.asm.line(format!("tokens {}", points.len()));
            Ok(())
        }
    }

    fn counting_compiler(options: CompilerOptions) -> (Compiler, Rc<Cell<usize>>) {
        let recognized = Rc::new(Cell::new(0));
        let mut table = DispatchTable::new();
        table.add_emitter(Counting {
            recognized: recognized.clone(),
        });
        (Compiler::with_table(options, table), recognized)
    }

    #[test]
    fn blank_lines_skip_tokenizing() {
        let (mut compiler, recognized) = counting_compiler(CompilerOptions::default());
        let out = run(&mut compiler, "\n   \n\t\n").unwrap();

        assert_eq!(out, ["", "", ""]);
        assert_eq!(recognized.get(), 0);
        assert_eq!(compiler.state().get_line(), 4);
    }

    #[test]
    fn sentinel_stops_reading() {
        let (mut compiler, recognized) = counting_compiler(CompilerOptions::default());
        let out = run(&mut compiler, "a b\n//END\nc d e\n!!! not even valid").unwrap();

        assert_eq!(out, ["; a b", "tokens 2"]);
        assert_eq!(recognized.get(), 2);
    }

    #[test]
    fn indentation_follows_normal_lines() {
        let (mut compiler, _) = counting_compiler(CompilerOptions::default());
        let out = run(&mut compiler, "  a\n\n\tb c").unwrap();

        assert_eq!(out, ["  ; a", "  tokens 1", "  ", "\t; b c", "\ttokens 2"]);
        assert_eq!(compiler.state().get_indent(), "\t");
    }

    #[test]
    fn failing_line_is_attributed() {
        let (mut compiler, _) = counting_compiler(CompilerOptions::default());
        let mut out = Vec::new();
        let err = compiler
            .compile("a\n\nb # c\nd".as_bytes(), &mut out)
            .unwrap_err();

        assert_eq!(err.line, 3);
        assert_eq!(err.text.as_deref(), Some("b # c"));
        assert!(matches!(err.err, CompilerError::Dialect(_)));
        assert!(err.to_string().starts_with("compilation failed at line 3"));
        assert_eq!(String::from_utf8(out).unwrap(), "; a\ntokens 1\n\n");
    }

    #[test]
    fn namespace_before_declaration() {
        let compiler = Compiler::new(CompilerOptions::default());
        assert_eq!(
            compiler.state().namespace(),
            Err(ConfigError::NamespaceUnavailable)
        );
    }

    #[test]
    fn carriage_returns_stripped() {
        let (mut compiler, _) = counting_compiler(CompilerOptions::default());
        let out = run(&mut compiler, "a b\r\n\r\n//END\r\nc").unwrap();
        assert_eq!(out, ["; a b", "tokens 2", ""]);
    }
}
