use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    None,
    If,
    Label,
    Repeat,
    While,
}

impl fmt::Display for BlockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "block",
            Self::If => "if",
            Self::Label => "label",
            Self::Repeat => "repeat",
            Self::While => "while",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    pub label_id: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockError {
    Underflow,
}

impl fmt::Display for BlockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Underflow => write!(f, "block end without a matching block start"),
        }
    }
}

impl std::error::Error for BlockError {}

/// Control blocks open within the current function.
///
/// Every block gets its label id from one counter shared by all block kinds, so
/// ids stay unique within a function no matter how constructs interleave. The
/// counter only goes back to zero on `reset`, which happens at function entry.
#[derive(Debug, Default, Clone)]
pub struct BlockStack {
    blocks: Vec<Block>,
    label_counter: usize,
}

impl BlockStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.blocks.clear();
        self.label_counter = 0;
    }

    pub fn start(&mut self, kind: BlockKind) -> Block {
        self.label_counter += 1;
        let block = Block {
            kind,
            label_id: self.label_counter,
        };

        log::debug!("opening {kind} block {}", block.label_id);
        self.blocks.push(block);
        block
    }

    pub fn end(&mut self) -> Result<Block, BlockError> {
        if let Some(b) = self.blocks.pop() {
            log::debug!("closing {} block {}", b.kind, b.label_id);
            Ok(b)
        } else {
            Err(BlockError::Underflow)
        }
    }

    pub fn current(&self) -> Option<Block> {
        self.blocks.last().copied()
    }

    pub fn depth(&self) -> usize {
        self.blocks.len()
    }
}
