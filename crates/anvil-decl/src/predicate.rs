//! Applicability predicates
//!
//! A predicate is a small boolean expression over the closed build-context
//! vocabulary, e.g. `platform == win64 and not target == server`. Predicates
//! are parsed into a typed AST once and evaluated against a [`BuildContext`]
//! as a pure, total function. Referencing a token outside the vocabulary is
//! a hard parse failure, never a silent non-match.

use crate::context::{BuildContext, BuildEnvironment, Platform, TargetKind};
use crate::error::{DeclError, DeclResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Typed applicability predicate AST
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Predicate {
    /// Matches every context (the default for unconditional declarations)
    Always,
    /// Context platform equals the given platform
    Platform(Platform),
    /// Context target kind equals the given kind
    TargetKind(TargetKind),
    /// Context build environment equals the given mode
    Env(BuildEnvironment),
    Not(Box<Predicate>),
    All(Vec<Predicate>),
    Any(Vec<Predicate>),
}

impl Predicate {
    /// Parse a predicate from its text form
    pub fn parse(input: &str) -> DeclResult<Self> {
        let mut parser = Parser::new(input);
        let expr = parser.expr()?;
        parser.expect_end()?;
        Ok(expr)
    }

    /// Evaluate against a concrete build context
    pub fn evaluate(&self, ctx: &BuildContext) -> bool {
        match self {
            Self::Always => true,
            Self::Platform(p) => ctx.platform == *p,
            Self::TargetKind(k) => ctx.target_kind == *k,
            Self::Env(e) => ctx.build_env == *e,
            Self::Not(inner) => !inner.evaluate(ctx),
            Self::All(parts) => parts.iter().all(|p| p.evaluate(ctx)),
            Self::Any(parts) => parts.iter().any(|p| p.evaluate(ctx)),
        }
    }

    /// Whether this predicate mentions the platform axis anywhere
    pub fn mentions_platform(&self) -> bool {
        match self {
            Self::Platform(_) => true,
            Self::Not(inner) => inner.mentions_platform(),
            Self::All(parts) | Self::Any(parts) => parts.iter().any(|p| p.mentions_platform()),
            _ => false,
        }
    }

    /// Whether this predicate mentions the target-kind axis anywhere
    pub fn mentions_target_kind(&self) -> bool {
        match self {
            Self::TargetKind(_) => true,
            Self::Not(inner) => inner.mentions_target_kind(),
            Self::All(parts) | Self::Any(parts) => parts.iter().any(|p| p.mentions_target_kind()),
            _ => false,
        }
    }
}

impl Default for Predicate {
    fn default() -> Self {
        Self::Always
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => write!(f, "always"),
            Self::Platform(p) => write!(f, "platform == {}", p),
            Self::TargetKind(k) => write!(f, "target == {}", k),
            Self::Env(e) => write!(f, "env == {}", e),
            Self::Not(inner) => write!(f, "not ({})", inner),
            Self::All(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p)).collect();
                write!(f, "{}", rendered.join(" and "))
            }
            Self::Any(parts) => {
                let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p)).collect();
                write!(f, "{}", rendered.join(" or "))
            }
        }
    }
}

impl FromStr for Predicate {
    type Err = DeclError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Predicate {
    type Error = DeclError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Predicate> for String {
    fn from(value: Predicate) -> Self {
        value.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Ident(String),
    Eq,
    NotEq,
    LParen,
    RParen,
}

/// Recursive-descent parser over the predicate grammar:
///
/// ```text
/// expr   := term ("or" term)*
/// term   := factor ("and" factor)*
/// factor := "not" factor | "(" expr ")" | atom
/// atom   := "always" | key "==" ident | key "!=" ident
/// key    := "platform" | "target" | "env"
/// ```
struct Parser {
    tokens: Vec<(usize, Token)>,
    pos: usize,
    input_len: usize,
}

impl Parser {
    fn new(input: &str) -> Self {
        let mut tokens = Vec::new();
        // `i` always sits on a char boundary; every branch advances by the
        // full width of what it consumed.
        let mut i = 0;
        while let Some(c) = input[i..].chars().next() {
            if c.is_ascii_whitespace() {
                i += 1;
            } else if c == '(' {
                tokens.push((i, Token::LParen));
                i += 1;
            } else if c == ')' {
                tokens.push((i, Token::RParen));
                i += 1;
            } else if input[i..].starts_with("==") {
                tokens.push((i, Token::Eq));
                i += 2;
            } else if input[i..].starts_with("!=") {
                tokens.push((i, Token::NotEq));
                i += 2;
            } else if c.is_alphanumeric() || c == '_' {
                let start = i;
                i += input[i..]
                    .find(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
                    .unwrap_or(input.len() - i);
                tokens.push((start, Token::Ident(input[start..i].to_string())));
            } else {
                // Unrecognized character; record it as an ident so the parser
                // reports it at the right offset.
                tokens.push((i, Token::Ident(c.to_string())));
                i += c.len_utf8();
            }
        }
        Self {
            tokens,
            pos: 0,
            input_len: input.len(),
        }
    }

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|(_, t)| t)
    }

    fn offset(&self) -> usize {
        self.tokens
            .get(self.pos)
            .map(|(o, _)| *o)
            .unwrap_or(self.input_len)
    }

    fn bump(&mut self) -> Option<Token> {
        let tok = self.tokens.get(self.pos).map(|(_, t)| t.clone());
        self.pos += 1;
        tok
    }

    fn expr(&mut self) -> DeclResult<Predicate> {
        let mut parts = vec![self.term()?];
        while matches!(self.peek(), Some(Token::Ident(w)) if w == "or") {
            self.bump();
            parts.push(self.term()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Predicate::Any(parts)
        })
    }

    fn term(&mut self) -> DeclResult<Predicate> {
        let mut parts = vec![self.factor()?];
        while matches!(self.peek(), Some(Token::Ident(w)) if w == "and") {
            self.bump();
            parts.push(self.factor()?);
        }
        Ok(if parts.len() == 1 {
            parts.pop().unwrap()
        } else {
            Predicate::All(parts)
        })
    }

    fn factor(&mut self) -> DeclResult<Predicate> {
        let offset = self.offset();
        match self.bump() {
            Some(Token::Ident(word)) if word == "not" => {
                Ok(Predicate::Not(Box::new(self.factor()?)))
            }
            Some(Token::LParen) => {
                let inner = self.expr()?;
                match self.bump() {
                    Some(Token::RParen) => Ok(inner),
                    _ => Err(DeclError::syntax(self.offset(), "expected ')'")),
                }
            }
            Some(Token::Ident(word)) if word == "always" => Ok(Predicate::Always),
            Some(Token::Ident(key))
                if key == "platform" || key == "target" || key == "env" =>
            {
                self.comparison(&key)
            }
            Some(Token::Ident(other)) => Err(DeclError::syntax(
                offset,
                format!("expected 'platform', 'target', 'env', 'not', 'always', or '(' but found '{}'", other),
            )),
            _ => Err(DeclError::syntax(offset, "expected a predicate")),
        }
    }

    fn comparison(&mut self, key: &str) -> DeclResult<Predicate> {
        let negated = match self.bump() {
            Some(Token::Eq) => false,
            Some(Token::NotEq) => true,
            _ => {
                return Err(DeclError::syntax(
                    self.offset(),
                    format!("expected '==' or '!=' after '{}'", key),
                ))
            }
        };
        let offset = self.offset();
        let value = match self.bump() {
            Some(Token::Ident(value)) => value,
            _ => return Err(DeclError::syntax(offset, "expected a value")),
        };
        let atom = match key {
            "platform" => Predicate::Platform(value.parse()?),
            "target" => Predicate::TargetKind(value.parse()?),
            "env" => Predicate::Env(value.parse()?),
            _ => unreachable!("caller checked the key"),
        };
        Ok(if negated {
            Predicate::Not(Box::new(atom))
        } else {
            atom
        })
    }

    fn expect_end(&mut self) -> DeclResult<()> {
        if self.pos == self.tokens.len() {
            Ok(())
        } else {
            Err(DeclError::syntax(self.offset(), "unexpected trailing input"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn ctx(platform: Platform, kind: TargetKind, env: BuildEnvironment) -> BuildContext {
        BuildContext::new(platform, kind, env)
    }

    #[test]
    fn test_parse_always() {
        assert_eq!(Predicate::parse("always").unwrap(), Predicate::Always);
    }

    #[test]
    fn test_parse_platform_atom() {
        assert_eq!(
            Predicate::parse("platform == win64").unwrap(),
            Predicate::Platform(Platform::Win64)
        );
    }

    #[test]
    fn test_parse_not_equal_desugars() {
        assert_eq!(
            Predicate::parse("target != server").unwrap(),
            Predicate::Not(Box::new(Predicate::TargetKind(TargetKind::Server)))
        );
    }

    #[test]
    fn test_parse_and_or_precedence() {
        // "and" binds tighter than "or"
        let p = Predicate::parse("platform == win64 or platform == mac and target == editor")
            .unwrap();
        assert_eq!(
            p,
            Predicate::Any(vec![
                Predicate::Platform(Platform::Win64),
                Predicate::All(vec![
                    Predicate::Platform(Platform::Mac),
                    Predicate::TargetKind(TargetKind::Editor),
                ]),
            ])
        );
    }

    #[test]
    fn test_parse_parentheses() {
        let p = Predicate::parse("(platform == win64 or platform == mac) and env == shared")
            .unwrap();
        assert!(p.evaluate(&ctx(
            Platform::Mac,
            TargetKind::Game,
            BuildEnvironment::Shared
        )));
        assert!(!p.evaluate(&ctx(
            Platform::Mac,
            TargetKind::Game,
            BuildEnvironment::Unique
        )));
    }

    #[rstest]
    #[case("platform == amiga", "amiga")]
    #[case("target == plugin", "plugin")]
    #[case("env == mixed", "mixed")]
    #[case("platform == wín64", "wín64")]
    fn test_unknown_token_is_hard_error(#[case] input: &str, #[case] token: &str) {
        let err = Predicate::parse(input).unwrap_err();
        assert_eq!(
            err,
            DeclError::UnknownContextValue {
                token: token.to_string()
            }
        );
    }

    #[test]
    fn test_non_ascii_symbol_is_syntax_error() {
        // Multi-byte characters must surface as structured errors, never
        // split the tokenizer off a char boundary.
        assert!(matches!(
            Predicate::parse("platform == win64 → target == game").unwrap_err(),
            DeclError::PredicateSyntax { .. }
        ));
        assert!(matches!(
            Predicate::parse("§").unwrap_err(),
            DeclError::PredicateSyntax { .. }
        ));
    }

    #[test]
    fn test_unknown_key_is_syntax_error() {
        assert!(matches!(
            Predicate::parse("compiler == msvc").unwrap_err(),
            DeclError::PredicateSyntax { .. }
        ));
    }

    #[test]
    fn test_trailing_input_rejected() {
        assert!(matches!(
            Predicate::parse("always always").unwrap_err(),
            DeclError::PredicateSyntax { .. }
        ));
    }

    #[test]
    fn test_evaluate_not() {
        let p = Predicate::parse("not platform == linux").unwrap();
        assert!(!p.evaluate(&ctx(
            Platform::Linux,
            TargetKind::Game,
            BuildEnvironment::Shared
        )));
        assert!(p.evaluate(&ctx(
            Platform::Win64,
            TargetKind::Game,
            BuildEnvironment::Shared
        )));
    }

    #[test]
    fn test_display_roundtrip() {
        let cases = [
            "always",
            "platform == win64",
            "not (target == server)",
            "(platform == win64) and (env == shared)",
            "(platform == linux) or (platform == mac)",
        ];
        for case in cases {
            let parsed = Predicate::parse(case).unwrap();
            let reparsed = Predicate::parse(&parsed.to_string()).unwrap();
            assert_eq!(parsed, reparsed);
        }
    }

    #[test]
    fn test_mentions_axes() {
        let p = Predicate::parse("platform == win64 and not target == editor").unwrap();
        assert!(p.mentions_platform());
        assert!(p.mentions_target_kind());
        assert!(!Predicate::Always.mentions_platform());
    }

    #[test]
    fn test_serde_string_form() {
        let p: Predicate = serde_json::from_str("\"platform == win64\"").unwrap();
        assert_eq!(p, Predicate::Platform(Platform::Win64));
        let json = serde_json::to_string(&p).unwrap();
        assert_eq!(json, "\"platform == win64\"");
    }
}
