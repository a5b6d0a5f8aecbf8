use std::{fmt, rc::Rc};

use crate::{
    compiler::EmitContext,
    tokenizer::{classify, tokenize, Token, TokenError, TokenKind},
    CompilerError,
};

/// One element of an emitter pattern, matched against a single token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Match {
    Any,
    Text(&'static str),
    OneOf(&'static [&'static str]),
    Kind(TokenKind),
    Kinds(&'static [TokenKind]),
    /// Same text as the token at an earlier position.
    Same(usize),
}

impl Match {
    fn matches(&self, line: &[Token], index: usize) -> bool {
        let t = &line[index];
        let is_word = !matches!(t.get_kind(), TokenKind::Comment | TokenKind::Literal);

        match self {
            Self::Any => true,
            Self::Text(s) => is_word && t.get_value() == *s,
            Self::OneOf(set) => is_word && set.contains(&t.get_value()),
            Self::Kind(k) => t.get_kind() == *k,
            Self::Kinds(ks) => ks.contains(&t.get_kind()),
            Self::Same(j) => {
                *j < index
                    && line[*j].get_kind() == t.get_kind()
                    && line[*j].get_value() == t.get_value()
            }
        }
    }

    fn accepts_text(&self, s: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Text(t) => *t == s,
            Self::OneOf(set) => set.contains(&s),
            Self::Kind(k) => classify(s) == Some(*k),
            Self::Kinds(ks) => classify(s).is_some_and(|k| ks.contains(&k)),
            Self::Same(_) => false,
        }
    }

    fn accepts_kind(&self, kind: TokenKind) -> bool {
        match self {
            Self::Any => true,
            Self::Kind(k) => *k == kind,
            Self::Kinds(ks) => ks.contains(&kind),
            _ => false,
        }
    }
}

pub type Pattern = &'static [Match];

/// Tokens from `Register`, `Integer`, `Identifier` or `Memory`.
pub const OPERAND: Match = Match::Kinds(&[
    TokenKind::Register,
    TokenKind::Integer,
    TokenKind::Identifier,
    TokenKind::Memory,
]);

/// Operands that can be written to.
pub const DESTINATION: Match = Match::Kinds(&[
    TokenKind::Register,
    TokenKind::Identifier,
    TokenKind::Memory,
]);

fn matches_prefix(pattern: Pattern, line: &[Token], index: usize) -> bool {
    pattern.len() == index + 1
        && pattern
            .iter()
            .enumerate()
            .all(|(i, m)| m.matches(line, i))
}

/// True when element `pi` of `p` accepts everything element `qi` of `q` does.
fn covers_at(p: Pattern, pi: usize, q: Pattern, qi: usize) -> bool {
    match (p[pi], q[qi]) {
        (Match::Any, _) => true,
        (Match::Same(a), Match::Same(b)) => a == b,
        (Match::Same(a), Match::Text(t)) => q.get(a) == Some(&Match::Text(t)),
        (Match::Same(_), _) => false,
        (_, Match::Same(b)) => covers_at(p, pi, q, b),
        (_, Match::Any) => false,
        (pe, Match::Text(t)) => pe.accepts_text(t),
        (pe, Match::OneOf(set)) => set.iter().all(|t| pe.accepts_text(t)),
        (pe, Match::Kind(k)) => pe.accepts_kind(k),
        (pe, Match::Kinds(ks)) => ks.iter().all(|k| pe.accepts_kind(*k)),
    }
}

/// True when every line matched by `q` is also matched by `p`.
pub fn covers(p: Pattern, q: Pattern) -> bool {
    p.len() == q.len() && (0..p.len()).all(|i| covers_at(p, i, q, i))
}

/// An instruction family able to claim tokens and write assembly for a line.
pub trait Emitter: fmt::Debug {
    fn name(&self) -> &'static str;

    fn patterns(&self) -> &'static [Pattern];

    /// Claims `line[index]` when one of the patterns ends exactly there.
    fn recognize(&self, line: &[Token], index: usize) -> bool {
        self.patterns()
            .iter()
            .any(|p| matches_prefix(*p, line, index))
    }

    fn emit(&self, ctx: &mut EmitContext<'_>, points: &[CodePoint]) -> Result<(), CompilerError>;
}

#[derive(Debug, Clone)]
pub struct CodePoint {
    pub token: Token,
    pub emitter: Option<Rc<dyn Emitter>>,
}

impl CodePoint {
    pub fn get_value(&self) -> &str {
        self.token.get_value()
    }

    pub fn get_kind(&self) -> TokenKind {
        self.token.get_kind()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DialectError {
    Malformed(TokenError),
    Empty,
    Unrecognized(String),
}

impl fmt::Display for DialectError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed(e) => write!(f, "Malformed Line => {e}"),
            Self::Empty => write!(f, "No tokens found"),
            Self::Unrecognized(s) => write!(f, "Unrecognized Construct \"{s}\""),
        }
    }
}

impl From<TokenError> for DialectError {
    fn from(value: TokenError) -> Self {
        Self::Malformed(value)
    }
}

/// A pattern that can never win because an earlier emitter claims all of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shadowing {
    pub earlier: &'static str,
    pub later: &'static str,
    pub pattern: usize,
}

impl fmt::Display for Shadowing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pattern {} of {} is shadowed by {}",
            self.pattern, self.later, self.earlier
        )
    }
}

/// Emitters in priority order. The first emitter to recognize a token owns it.
#[derive(Debug, Default, Clone)]
pub struct DispatchTable {
    emitters: Vec<Rc<dyn Emitter>>,
}

impl DispatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_emitter<E: Emitter + 'static>(&mut self, emitter: E) {
        self.emitters.push(Rc::new(emitter));
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.emitters.iter().map(|e| e.name()).collect()
    }

    pub fn parse(&self, line: &str) -> Result<Vec<CodePoint>, DialectError> {
        let tokens = tokenize(line)?;
        if tokens.is_empty() {
            return Err(DialectError::Empty);
        }

        let points = tokens
            .iter()
            .enumerate()
            .map(|(i, t)| CodePoint {
                token: t.clone(),
                emitter: self
                    .emitters
                    .iter()
                    .find(|e| e.recognize(&tokens, i))
                    .cloned(),
            })
            .collect::<Vec<_>>();

        trailing_emitter(&points)?;
        Ok(points)
    }

    pub fn verify_order(&self) -> Result<(), Vec<Shadowing>> {
        let mut shadowed = Vec::new();

        for (i, later) in self.emitters.iter().enumerate() {
            for (pi, q) in later.patterns().iter().copied().enumerate() {
                let hit = self.emitters[..i]
                    .iter()
                    .find(|earlier| earlier.patterns().iter().any(|p| covers(*p, q)));

                if let Some(earlier) = hit {
                    shadowed.push(Shadowing {
                        earlier: earlier.name(),
                        later: later.name(),
                        pattern: pi,
                    });
                }
            }
        }

        if shadowed.is_empty() {
            Ok(())
        } else {
            Err(shadowed)
        }
    }
}

/// The emitter owning the last token decides how the whole line is emitted.
pub fn trailing_emitter(points: &[CodePoint]) -> Result<Rc<dyn Emitter>, DialectError> {
    match points.last() {
        Some(CodePoint {
            emitter: Some(e), ..
        }) => Ok(e.clone()),
        Some(p) => Err(DialectError::Unrecognized(p.get_value().to_string())),
        None => Err(DialectError::Empty),
    }
}

#[cfg(test)]
mod tests {
    use super::{
        covers, trailing_emitter, CodePoint, DialectError, DispatchTable, Emitter, Match,
        Pattern, DESTINATION, OPERAND,
    };
    use crate::{compiler::EmitContext, tokenizer::TokenKind, CompilerError};

    #[derive(Debug)]
    struct Named(&'static str, &'static [Pattern]);

    impl Emitter for Named {
        fn name(&self) -> &'static str {
            self.0
        }

        fn patterns(&self) -> &'static [Pattern] {
            self.1
        }

        fn emit(&self, ctx: &mut EmitContext<'_>, _: &[CodePoint]) -> Result<(), CompilerError> {
            ctx.asm.line(self.0);
            Ok(())
        }
    }

    const INCREMENT: &[Pattern] = &[&[
        DESTINATION,
        Match::Text("="),
        Match::Same(0),
        Match::Text("+"),
        Match::Text("1"),
    ]];

    const ADD: &[Pattern] = &[&[
        DESTINATION,
        Match::Text("="),
        OPERAND,
        Match::OneOf(&["+", "-"]),
        OPERAND,
    ]];

    const ASSIGN: &[Pattern] = &[&[DESTINATION, Match::Text("="), OPERAND]];

    fn owner(table: &DispatchTable, line: &str) -> &'static str {
        let points = table.parse(line).unwrap();
        trailing_emitter(&points).unwrap().name()
    }

    #[test]
    fn narrow_first_claims_ambiguous_lines() {
        let mut table = DispatchTable::new();
        table.add_emitter(Named("increment", INCREMENT));
        table.add_emitter(Named("add", ADD));

        assert_eq!(owner(&table, "x = x + 1"), "increment");
        assert_eq!(owner(&table, "x = y + 1"), "add");
        assert_eq!(owner(&table, "x = x + 2"), "add");
        assert!(table.verify_order().is_ok());
    }

    #[test]
    fn reversed_order_changes_owner() {
        let mut table = DispatchTable::new();
        table.add_emitter(Named("add", ADD));
        table.add_emitter(Named("increment", INCREMENT));

        assert_eq!(owner(&table, "x = x + 1"), "add");

        let shadowed = table.verify_order().unwrap_err();
        assert_eq!(shadowed.len(), 1);
        assert_eq!(shadowed[0].earlier, "add");
        assert_eq!(shadowed[0].later, "increment");
    }

    #[test]
    fn earlier_tokens_keep_their_own_owner() {
        let mut table = DispatchTable::new();
        table.add_emitter(Named("increment", INCREMENT));
        table.add_emitter(Named("assign", ASSIGN));

        let points = table.parse("EAX = EAX + 1").unwrap();
        assert_eq!(points.len(), 5);
        assert_eq!(points[2].emitter.as_ref().unwrap().name(), "assign");
        assert!(points[0].emitter.is_none());
        assert_eq!(trailing_emitter(&points).unwrap().name(), "increment");
    }

    #[test]
    fn unrecognized_trailing_token() {
        let mut table = DispatchTable::new();
        table.add_emitter(Named("assign", ASSIGN));

        assert_eq!(
            table.parse("EAX = EBX EBX").unwrap_err(),
            DialectError::Unrecognized("EBX".to_string())
        );
        assert!(matches!(
            table.parse("EAX = $").unwrap_err(),
            DialectError::Malformed(_)
        ));
        assert_eq!(table.parse("   ").unwrap_err(), DialectError::Empty);
    }

    #[test]
    fn pattern_coverage() {
        assert!(covers(ADD[0], INCREMENT[0]));
        assert!(!covers(INCREMENT[0], ADD[0]));
        assert!(covers(ASSIGN[0], ASSIGN[0]));
        assert!(!covers(ASSIGN[0], ADD[0]));

        let push: Pattern = &[Match::Text("+"), OPERAND];
        let push_all: Pattern = &[Match::Text("+"), Match::Text("All")];
        let push_reg: Pattern = &[Match::Text("+"), Match::Kind(TokenKind::Register)];
        assert!(covers(push, push_all));
        assert!(covers(push, push_reg));
        assert!(!covers(push_reg, push_all));
        assert!(!covers(push_all, push));
    }
}
