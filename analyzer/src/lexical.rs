//! The lexical stage: does each line have the shape of a declaration?
//!
//! A line may hold, in this order and each of them optional, a declared
//! type, an identifier, `=`, a literal value and `;`. Classification walks
//! the line's tokens through a small state machine:
//!
//! ```text
//! ExpectType -> ExpectIdentifier -> ExpectAssign -> ExpectValue -> ExpectDelimiter -> Done
//! ```
//!
//! A token may fill the slot of the current state or of any later one;
//! skipping ahead leaves the skipped slots empty. Once a slot is passed it
//! cannot be filled any more, so order is strict. A token no remaining slot
//! accepts makes the whole line [`LexicalOutcome::Unknown`].
//!
//! ```
//! # use minijava_analyzer::lexical::{classify, LexicalOutcome};
//! assert!(matches!(classify("int x = 5;"), LexicalOutcome::Recognized(_)));
//! assert!(matches!(classify("x ="), LexicalOutcome::Recognized(_)));
//! assert!(matches!(classify("int x += 5;"), LexicalOutcome::Unknown { .. }));
//! ```

use std::fmt::{self, Formatter};

use crate::error::LineFault;
use crate::lexer::{Lexer, Span, Token, TokenType, TypeName};
use crate::report::{Analysis, Outcome, Report, Stage};
use crate::source::{SourceLine, SourceLines};

/// The fields found on a recognized line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    pub data_type: Option<TypeName>,
    pub identifier: Option<String>,
    pub assignment: bool,
    pub value: Option<String>,
    pub delimiter: bool,
}

impl TokenSet {
    /// Present fields as `(label, text)` pairs, in line order.
    pub fn fields(&self) -> Vec<(&'static str, &str)> {
        let mut fields = Vec::new();
        if let Some(data_type) = &self.data_type {
            fields.push(("Data Type", data_type.keyword()));
        }
        if let Some(identifier) = &self.identifier {
            fields.push(("Identifier", identifier.as_str()));
        }
        if self.assignment {
            fields.push(("Assignment Operator", "="));
        }
        if let Some(value) = &self.value {
            fields.push(("Value", value.as_str()));
        }
        if self.delimiter {
            fields.push(("Delimiter", ";"));
        }
        fields
    }

    fn fill(&mut self, state: State, token: &Token) {
        match state {
            State::ExpectType       => self.data_type = token.type_name(),
            State::ExpectIdentifier => self.identifier = Some(token.src.to_string()),
            State::ExpectAssign     => self.assignment = true,
            State::ExpectValue      => self.value = Some(token.src.to_string()),
            State::ExpectDelimiter  => self.delimiter = true,
            State::Done             => {}
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexicalOutcome {
    Recognized(TokenSet),
    /// `at` is the first token that fits nowhere.
    Unknown { line: String, at: Span },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum State {
    ExpectType,
    ExpectIdentifier,
    ExpectAssign,
    ExpectValue,
    ExpectDelimiter,
    Done,
}

impl State {
    const SLOTS: [State; 5] = [
        State::ExpectType,
        State::ExpectIdentifier,
        State::ExpectAssign,
        State::ExpectValue,
        State::ExpectDelimiter,
    ];

    fn accepts(self, token: &Token) -> bool {
        match self {
            State::ExpectType       => token.type_name().is_some(),
            State::ExpectIdentifier => token.ty == TokenType::Word,
            State::ExpectAssign     => token.ty == TokenType::Assign,
            State::ExpectValue      => token.is_literal(),
            State::ExpectDelimiter  => token.ty == TokenType::Delimiter,
            State::Done             => false,
        }
    }

    fn next(self) -> State {
        match self {
            State::ExpectType       => State::ExpectIdentifier,
            State::ExpectIdentifier => State::ExpectAssign,
            State::ExpectAssign     => State::ExpectValue,
            State::ExpectValue      => State::ExpectDelimiter,
            State::ExpectDelimiter  => State::Done,
            State::Done             => State::Done,
        }
    }
}

/// Splits a word that runs straight into a decimal, as in `x5.5`.
///
/// Words are lexed greedily, so `x5` swallows the integer part and leaves
/// `.5` behind. Giving the word's last digit back lets it join `.5` as the
/// number `5.5`.
fn split_decimal<'a>(line: &'a str, word: &Token<'a>, dot: &Token<'a>, fraction: &Token<'a>) -> Option<(Token<'a>, Token<'a>)> {
    let touching = word.end == dot.start && dot.end == fraction.start;
    let shaped = word.ty == TokenType::Word
        && word.src.ends_with(|c: char| c.is_ascii_digit())
        && dot.ty == TokenType::Unknown
        && dot.src == "."
        && fraction.ty == TokenType::Number
        && !fraction.src.contains('.');
    if !(touching && shaped) {
        return None;
    }

    // Words start with a letter or `_`, so the head is never empty.
    let cut = word.end - 1;
    let head = Token { src: &line[word.start..cut], start: word.start, end: cut, ty: TokenType::Word };
    let number = Token { src: &line[cut..fraction.end], start: cut, end: fraction.end, ty: TokenType::Number };
    Some((head, number))
}

/// Significant tokens, each flagged with whether it was split off the
/// front of a decimal. Such a head has nothing separating it from the
/// value, so it cannot be a declared type.
fn tokens(line: &str) -> Vec<(Token<'_>, bool)> {
    let tokens = Lexer::significant(line).collect::<Vec<_>>();
    let mut regrouped = Vec::with_capacity(tokens.len());

    let mut index = 0;
    while index < tokens.len() {
        let split = match &tokens[index..] {
            [word, dot, fraction, ..] => split_decimal(line, word, dot, fraction),
            _ => None,
        };
        match split {
            Some((head, number)) => {
                regrouped.push((head, true));
                regrouped.push((number, false));
                index += 3;
            }
            None => {
                regrouped.push((tokens[index], false));
                index += 1;
            }
        }
    }

    regrouped
}

pub fn classify(line: &str) -> LexicalOutcome {
    let mut state = State::ExpectType;
    let mut fields = TokenSet::default();

    for (token, glued) in tokens(line) {
        let slot = State::SLOTS.iter()
            .copied()
            .filter(|slot| *slot >= state)
            .filter(|slot| !(glued && *slot == State::ExpectType))
            .find(|slot| slot.accepts(&token));
        match slot {
            Some(slot) => {
                fields.fill(slot, &token);
                state = slot.next();
            }
            None => {
                return LexicalOutcome::Unknown { line: line.to_string(), at: token.span() };
            }
        }
    }

    LexicalOutcome::Recognized(fields)
}

#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn analyze(source: &str) -> Analysis<LexicalOutcome> {
    Analysis::of(source, report)
}

/// Runs the stage over lines that were already split and numbered.
pub fn report(lines: SourceLines) -> Report<LexicalOutcome> {
    Report::build(Stage::Lexical, lines, |line| classify(&line.text))
}

impl Outcome for LexicalOutcome {
    fn fault(&self, line: &SourceLine) -> Option<LineFault> {
        match self {
            LexicalOutcome::Recognized(_) => None,
            LexicalOutcome::Unknown { at, .. } => Some(LineFault::unknown_token(line.number, *at)),
        }
    }

    fn render(&self, _line: &SourceLine, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            LexicalOutcome::Recognized(fields) => {
                for (label, text) in fields.fields() {
                    writeln!(f, "{}: {}", label, text)?;
                }
                writeln!(f)
            }
            LexicalOutcome::Unknown { line, .. } => writeln!(f, "Unknown Token: {}", line),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::report::Status;

    fn recognized(line: &str) -> TokenSet {
        match classify(line) {
            LexicalOutcome::Recognized(fields) => fields,
            unknown => panic!("expected {:?} to be recognized, got {:?}", line, unknown),
        }
    }

    fn unknown_at(line: &str) -> Span {
        match classify(line) {
            LexicalOutcome::Unknown { at, .. } => at,
            recognized => panic!("expected {:?} to be unknown, got {:?}", line, recognized),
        }
    }

    #[test]
    fn full_declaration_fills_all_five_fields() {
        assert_eq!(recognized("int x = 5;"), TokenSet {
            data_type: Some(TypeName::Int),
            identifier: Some("x".to_string()),
            assignment: true,
            value: Some("5".to_string()),
            delimiter: true,
        });
    }

    #[test]
    fn every_group_is_optional() {
        assert_eq!(recognized(""), TokenSet::default());
        assert_eq!(recognized("x").identifier, Some("x".to_string()));
        assert_eq!(recognized("double d").data_type, Some(TypeName::Double));
        assert_eq!(recognized("= 4.5").value, Some("4.5".to_string()));
        assert!(recognized(";").delimiter);
        assert_eq!(recognized(r#"String"hi";"#).fields(), vec![
            ("Data Type", "String"),
            ("Value", "\"hi\""),
            ("Delimiter", ";"),
        ]);
    }

    #[test]
    fn keywords_fill_whichever_slot_is_still_open() {
        // `true` is identifier-shaped, so with the identifier slot open it is one.
        assert_eq!(recognized("true").identifier, Some("true".to_string()));
        assert_eq!(recognized("flag true").value, Some("true".to_string()));
        assert_eq!(recognized("int int").identifier, Some("int".to_string()));
    }

    #[test]
    fn out_of_order_or_foreign_tokens_are_unknown() {
        assert_eq!(unknown_at("int x += 5;"), (6, 7));
        assert_eq!(unknown_at("int x = 5; int y = 6;"), (11, 14));
        assert_eq!(unknown_at("int x = -5;"), (8, 9));
        assert_eq!(unknown_at("x = \"open;"), (4, 5));
        assert_eq!(unknown_at("5 x"), (2, 3));
        assert_eq!(unknown_at("int x = y;"), (8, 9));
        assert_eq!(unknown_at("Object o"), (7, 8));
    }

    #[test]
    fn identifiers_give_back_digits_to_a_following_decimal() {
        assert_eq!(recognized("x5.5").fields(), vec![("Identifier", "x"), ("Value", "5.5")]);
        assert_eq!(recognized("count12.5;").fields(), vec![
            ("Identifier", "count1"),
            ("Value", "2.5"),
            ("Delimiter", ";"),
        ]);
        assert_eq!(recognized("int a1.25;").fields(), vec![
            ("Data Type", "int"),
            ("Identifier", "a"),
            ("Value", "1.25"),
            ("Delimiter", ";"),
        ]);
        // No boundary after `int`, so it is the identifier here.
        assert_eq!(recognized("int5.5").fields(), vec![("Identifier", "int"), ("Value", "5.5")]);
    }

    #[test]
    fn only_touching_decimals_are_split() {
        assert_eq!(unknown_at("x5 .5"), (3, 4));
        assert_eq!(unknown_at("x5.5.5"), (2, 3));
        assert_eq!(unknown_at("int x x5.5"), (6, 7));
    }

    #[test]
    fn report_text() {
        let analysis = analyze("int x = 5;\nint x += 5;");
        assert_eq!(analysis.status(), Some(Status::Failure));
        assert_eq!(
            analysis.to_string(),
            "Data Type: int\n\
             Identifier: x\n\
             Assignment Operator: =\n\
             Value: 5\n\
             Delimiter: ;\n\
             \n\
             Unknown Token: int x += 5;\n\
             \n\
             Unknown token(s) detected. Lexical analysis failed.\n"
        );
    }

    #[test]
    fn success_report_text() {
        let analysis = analyze("boolean ok = true;");
        assert_eq!(analysis.status(), Some(Status::Success));
        assert!(analysis.to_string().ends_with("Delimiter: ;\n\nLexical Analysis completed successfully.\n"));
    }
}
