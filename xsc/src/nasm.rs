/// Builds NASM source text for the line being compiled.
///
/// Output is held until the driver takes it, so a line that fails part way
/// through leaves nothing behind.
#[derive(Debug, Default, Clone)]
pub struct Nasm {
    indent: String,
    lines: Vec<String>,
}

impl Nasm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_indent(&mut self, indent: &str) {
        self.indent = indent.to_string();
    }

    pub fn line<T: AsRef<str>>(&mut self, text: T) {
        self.lines.push(format!("{}{}", self.indent, text.as_ref()));
    }

    /// Blank lines keep the indentation of the last normal line.
    pub fn blank(&mut self) {
        self.lines.push(self.indent.clone());
    }

    pub fn comment<T: AsRef<str>>(&mut self, text: T) {
        self.line(format!("; {}", text.as_ref()));
    }

    pub fn label<T: AsRef<str>>(&mut self, name: T) {
        self.line(format!("{}:", name.as_ref()));
    }

    pub fn instr<S: AsRef<str>>(&mut self, mnemonic: &str, operands: &[S]) {
        if operands.is_empty() {
            self.line(mnemonic);
        } else {
            let args = operands
                .iter()
                .map(|o| o.as_ref())
                .collect::<Vec<_>>()
                .join(", ");
            self.line(format!("{mnemonic} {args}"));
        }
    }

    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }

    pub fn discard(&mut self) {
        self.lines.clear();
    }
}
