//! The syntax stage: is each line a well-formed statement?
//!
//! The lexical stage lets every part of a declaration go missing. Here the
//! line must be empty or follow
//!
//! ```text
//! statement := [type] identifier [ "=" value ] ";"
//! ```
//!
//! using the same literal grammar for `value` as the lexer. Type keywords,
//! `true`, `false` and `null` cannot be identifiers. Nothing may follow
//! the `;`.

use std::fmt::{self, Formatter};
use std::iter::Peekable;
use std::vec;

use crate::error::{Expected, LineFault, SyntaxError};
use crate::lexer::{Lexer, Span, Token, TokenType, TypeName};
use crate::report::{Analysis, Outcome, Report, Stage};
use crate::source::{SourceLine, SourceLines};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub data_type: Option<TypeName>,
    pub identifier: String,
    pub initializer: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxOutcome {
    Empty,
    Statement(Statement),
    Invalid(SyntaxError),
}

struct Parser<'input> {
    tokens: Peekable<vec::IntoIter<Token<'input>>>,
    // Where end-of-line errors point: the last token consumed.
    last_span: Span,
}

impl<'input> Parser<'input> {
    fn new(line: &'input str) -> Self {
        Self {
            tokens: Lexer::significant(line).collect::<Vec<_>>().into_iter().peekable(),
            last_span: (0, line.len()),
        }
    }

    fn parse(mut self) -> SyntaxOutcome {
        if self.tokens.peek().is_none() {
            return SyntaxOutcome::Empty;
        }
        match self.parse_statement() {
            Ok(statement) => SyntaxOutcome::Statement(statement),
            Err(error) => SyntaxOutcome::Invalid(error),
        }
    }

    fn next(&mut self) -> Option<Token<'input>> {
        let token = self.tokens.next();
        if let Some(token) = &token {
            self.last_span = token.span();
        }
        token
    }

    fn parse_statement(&mut self) -> Result<Statement, SyntaxError> {
        let data_type = self.parse_type();
        let identifier = self.parse_identifier()?;
        let initializer = self.parse_initializer()?;
        let expected = if initializer.is_some() { Expected::Delimiter } else { Expected::AssignOrDelimiter };
        self.parse_delimiter(expected)?;
        self.parse_end()?;

        Ok(Statement { data_type, identifier, initializer })
    }

    fn parse_type(&mut self) -> Option<TypeName> {
        let data_type = self.tokens.peek().and_then(Token::type_name)?;
        self.next();
        Some(data_type)
    }

    fn parse_identifier(&mut self) -> Result<String, SyntaxError> {
        match self.next() {
            Some(token) if token.ty == TokenType::Word => {
                if token.type_name().is_some() || token.is_literal() {
                    Err(SyntaxError::ReservedIdentifier { span: token.span(), word: token.src.to_string() })
                } else {
                    Ok(token.src.to_string())
                }
            }
            Some(token) if token.is_literal() || matches!(token.ty, TokenType::Assign | TokenType::Delimiter) => {
                Err(SyntaxError::MissingIdentifier { span: token.span() })
            }
            Some(token) => Err(unexpected(token, Expected::Identifier)),
            None => Err(SyntaxError::MissingIdentifier { span: self.last_span }),
        }
    }

    fn parse_initializer(&mut self) -> Result<Option<String>, SyntaxError> {
        match self.tokens.peek().copied() {
            Some(token) if token.ty == TokenType::Assign => { self.next(); }
            _ => return Ok(None),
        }

        match self.tokens.peek().copied() {
            Some(token) if token.is_literal() => {
                self.next();
                Ok(Some(token.src.to_string()))
            }
            Some(token) if token.ty == TokenType::Delimiter => Err(SyntaxError::MissingValue { span: self.last_span }),
            Some(token) => Err(unexpected(token, Expected::Value)),
            None => Err(SyntaxError::MissingValue { span: self.last_span }),
        }
    }

    fn parse_delimiter(&mut self, expected: Expected) -> Result<(), SyntaxError> {
        match self.next() {
            Some(token) if token.ty == TokenType::Delimiter => Ok(()),
            Some(token) => Err(unexpected(token, expected)),
            None => Err(SyntaxError::MissingDelimiter { span: self.last_span }),
        }
    }

    fn parse_end(&mut self) -> Result<(), SyntaxError> {
        match self.next() {
            Some(token) => Err(unexpected(token, Expected::EndOfLine)),
            None => Ok(()),
        }
    }
}

fn unexpected(token: Token, expected: Expected) -> SyntaxError {
    SyntaxError::UnexpectedToken {
        span: token.span(),
        found: token.src.to_string(),
        expected,
    }
}

pub fn parse_line(line: &str) -> SyntaxOutcome {
    Parser::new(line).parse()
}

#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn analyze(source: &str) -> Analysis<SyntaxOutcome> {
    Analysis::of(source, report)
}

/// Runs the stage over lines that were already split and numbered.
pub fn report(lines: SourceLines) -> Report<SyntaxOutcome> {
    Report::build(Stage::Syntax, lines, |line| parse_line(&line.text))
}

impl Outcome for SyntaxOutcome {
    fn fault(&self, line: &SourceLine) -> Option<LineFault> {
        match self {
            SyntaxOutcome::Invalid(error) => Some(LineFault::syntax(line.number, error)),
            _ => None,
        }
    }

    fn render(&self, line: &SourceLine, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: ", line.number)?;
        match self {
            SyntaxOutcome::Empty => writeln!(f, "empty statement"),
            SyntaxOutcome::Statement(Statement { data_type, identifier, initializer }) => {
                match (data_type, initializer) {
                    (Some(data_type), Some(value)) => writeln!(f, "declaration of '{}' ({}) with initializer {}", identifier, data_type, value),
                    (Some(data_type), None)        => writeln!(f, "declaration of '{}' ({})", identifier, data_type),
                    (None, Some(value))            => writeln!(f, "assignment of {} to '{}'", value, identifier),
                    (None, None)                   => writeln!(f, "bare identifier '{}'", identifier),
                }
            }
            SyntaxOutcome::Invalid(error) => writeln!(f, "Syntax error: {}", error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::report::Status;

    fn statement(line: &str) -> Statement {
        match parse_line(line) {
            SyntaxOutcome::Statement(statement) => statement,
            other => panic!("expected {:?} to parse, got {:?}", line, other),
        }
    }

    fn error(line: &str) -> SyntaxError {
        match parse_line(line) {
            SyntaxOutcome::Invalid(error) => error,
            other => panic!("expected {:?} to be rejected, got {:?}", line, other),
        }
    }

    #[test]
    fn accepted_statements() {
        assert_eq!(statement("int x = 5;"), Statement {
            data_type: Some(TypeName::Int),
            identifier: "x".to_string(),
            initializer: Some("5".to_string()),
        });
        assert_eq!(statement("long total;"), Statement {
            data_type: Some(TypeName::Long),
            identifier: "total".to_string(),
            initializer: None,
        });
        assert_eq!(statement("name = \"Ada\";").initializer, Some("\"Ada\"".to_string()));
        assert_eq!(statement("flag = null ;").data_type, None);
        assert_eq!(parse_line(""), SyntaxOutcome::Empty);
    }

    #[test]
    fn missing_parts() {
        assert_eq!(error("int x = 5"), SyntaxError::MissingDelimiter { span: (8, 9) });
        assert_eq!(error("int = 5;"), SyntaxError::MissingIdentifier { span: (4, 5) });
        assert_eq!(error("int"), SyntaxError::MissingIdentifier { span: (0, 3) });
        assert_eq!(error("int x = ;"), SyntaxError::MissingValue { span: (6, 7) });
        assert_eq!(error("x ="), SyntaxError::MissingValue { span: (2, 3) });
    }

    #[test]
    fn out_of_order_tokens() {
        assert_eq!(error("int x 5;"), SyntaxError::UnexpectedToken {
            span: (6, 7),
            found: "5".to_string(),
            expected: Expected::AssignOrDelimiter,
        });
        assert_eq!(error("int x = 5 6;"), SyntaxError::UnexpectedToken {
            span: (10, 11),
            found: "6".to_string(),
            expected: Expected::Delimiter,
        });
        assert_eq!(error("int x = y;"), SyntaxError::UnexpectedToken {
            span: (8, 9),
            found: "y".to_string(),
            expected: Expected::Value,
        });
        assert_eq!(error("int x; int y;"), SyntaxError::UnexpectedToken {
            span: (7, 10),
            found: "int".to_string(),
            expected: Expected::EndOfLine,
        });
        assert_eq!(error("int x += 5;"), SyntaxError::UnexpectedToken {
            span: (6, 7),
            found: "+".to_string(),
            expected: Expected::AssignOrDelimiter,
        });
    }

    #[test]
    fn reserved_words_are_not_identifiers() {
        assert_eq!(error("int int = 5;"), SyntaxError::ReservedIdentifier { span: (4, 7), word: "int".to_string() });
        assert_eq!(error("true = false;"), SyntaxError::ReservedIdentifier { span: (0, 4), word: "true".to_string() });
    }

    #[test]
    fn report_text() {
        let analysis = analyze("int x = 5;\n\ny = 2;\nint z");
        assert_eq!(analysis.status(), Some(Status::Failure));
        assert_eq!(
            analysis.to_string(),
            "Line 1: declaration of 'x' (int) with initializer 5\n\
             Line 2: empty statement\n\
             Line 3: assignment of 2 to 'y'\n\
             Line 4: Syntax error: missing ';' at end of statement\n\
             \n\
             Syntax error(s) detected. Syntax analysis failed.\n"
        );
    }

    #[test]
    fn success_trailer() {
        let analysis = analyze("char c = 'c';\nc;");
        assert_eq!(analysis.status(), Some(Status::Success));
        assert!(analysis.to_string().ends_with("Line 2: bare identifier 'c'\n\nSyntax Analysis completed successfully.\n"));
    }
}
