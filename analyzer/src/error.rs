use std::fmt::{Display, Formatter, Result};
use std::io;
use std::path::PathBuf;
use std::string::FromUtf8Error;

use annotate_snippets::display_list::FormatOptions;
use annotate_snippets::snippet::{Annotation, AnnotationType, Slice, Snippet, SourceAnnotation};
use itertools::Itertools;

use crate::lexer::{Span, TypeName};
use crate::source::SourceLine;

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("could not read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{} is not valid UTF-8: {source}", .path.display())]
    NotUtf8 {
        path: PathBuf,
        #[source]
        source: FromUtf8Error,
    },
}


#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxError {
    UnexpectedToken {
        span: Span,
        found: String,
        expected: Expected,
    },
    ReservedIdentifier {
        span: Span,
        word: String,
    },
    MissingIdentifier { span: Span },
    MissingValue { span: Span },
    MissingDelimiter { span: Span },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Expected {
    Identifier,
    Value,
    AssignOrDelimiter,
    Delimiter,
    EndOfLine,
}

impl Expected {
    fn alternatives(&self) -> &'static [&'static str] {
        use Expected::*;
        match self {
            Identifier        => &["an identifier"],
            Value             => &["a literal value"],
            AssignOrDelimiter => &["'='", "';'"],
            Delimiter         => &["';'"],
            EndOfLine         => &["end of line"],
        }
    }
}

impl Display for Expected {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        write!(f, "{}", self.alternatives().iter().join(" or "))
    }
}

impl Display for SyntaxError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use SyntaxError::*;
        match self {
            UnexpectedToken { found, expected, .. } => write!(f, "unexpected '{}', expected {}", found, expected),
            ReservedIdentifier { word, .. }         => write!(f, "'{}' is reserved and cannot be used as an identifier", word),
            MissingIdentifier { .. }                => write!(f, "missing identifier"),
            MissingValue { .. }                     => write!(f, "missing value after '='"),
            MissingDelimiter { .. }                 => write!(f, "missing ';' at end of statement"),
        }
    }
}

impl SyntaxError {
    pub fn span(&self) -> Span {
        use SyntaxError::*;
        match self {
            UnexpectedToken { span, .. }
            | ReservedIdentifier { span, .. }
            | MissingIdentifier { span }
            | MissingValue { span }
            | MissingDelimiter { span } => *span,
        }
    }

    fn label(&self) -> &'static str {
        use SyntaxError::*;
        match self {
            UnexpectedToken { .. }    => "unexpected token here",
            ReservedIdentifier { .. } => "reserved word here",
            MissingIdentifier { .. }  => "identifier expected here",
            MissingValue { .. }       => "value expected after this",
            MissingDelimiter { .. }   => "statement ends here",
        }
    }
}


/// Why a line failed type checking.
#[derive(Debug, Clone, PartialEq)]
pub enum SemanticFault {
    /// No `identifier = value;` anywhere on the line.
    Malformed,
    TypeMismatch {
        span: Span,
        value: String,
        expected: TypeName,
    },
    /// The first word of the line names no type with a value grammar.
    /// `long` and `double` land here too.
    UnknownType {
        span: Span,
        name: String,
    },
}

impl Display for SemanticFault {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        use SemanticFault::*;
        match self {
            Malformed                        => write!(f, "Invalid code format: Expected 'dataType variableName = value;'"),
            TypeMismatch { value, expected, .. } => write!(f, "Type mismatch: '{}' is not a valid {}.", value, expected),
            UnknownType { name, .. }         => write!(f, "Unknown data type: {}", name),
        }
    }
}

impl SemanticFault {
    /// `None` for [`SemanticFault::Malformed`], which blames the whole line.
    pub fn span(&self) -> Option<Span> {
        use SemanticFault::*;
        match self {
            Malformed                   => None,
            TypeMismatch { span, .. }
            | UnknownType { span, .. } => Some(*span),
        }
    }

    fn label(&self) -> &'static str {
        use SemanticFault::*;
        match self {
            Malformed             => "expected `type name = value;`",
            TypeMismatch { .. }   => "value does not fit the declared type",
            UnknownType { .. }    => "no value grammar for this type",
        }
    }
}


/// A per-line fault from any stage, ready to be shown against its source.
#[derive(Debug, Clone, PartialEq)]
pub struct LineFault {
    pub line: usize,
    pub span: Option<Span>,
    pub message: String,
    pub label: &'static str,
}

impl LineFault {
    pub fn unknown_token(line: usize, span: Span) -> Self {
        LineFault { line, span: Some(span), message: "unknown token".to_string(), label: "cannot be placed in a declaration" }
    }

    pub fn syntax(line: usize, error: &SyntaxError) -> Self {
        LineFault { line, span: Some(error.span()), message: error.to_string(), label: error.label() }
    }

    pub fn semantic(line: usize, fault: &SemanticFault) -> Self {
        LineFault { line, span: fault.span(), message: fault.to_string(), label: fault.label() }
    }

    fn annotations<'a>(&'a self, source: &str) -> Vec<SourceAnnotation<'a>> {
        let range = match self.span {
            Some((start, end)) => (char_offset(source, start), char_offset(source, end)),
            None => (0, source.chars().count()),
        };
        vec![
            SourceAnnotation {
                range,
                label: self.label,
                annotation_type: AnnotationType::Error,
            }
        ]
    }

    fn slices<'a>(&'a self, line: &'a SourceLine, origin: Option<&'a str>) -> Vec<Slice<'a>> {
        let mut slices = Vec::new();
        // Nothing to point at on a blank line.
        if !line.text.is_empty() {
            slices.push(
                Slice {
                    source: line.text.as_str(),
                    line_start: line.number,
                    origin,
                    fold: false,
                    annotations: self.annotations(&line.text),
                }
            );
        }
        slices
    }

    pub fn create_snippet<'a>(&'a self, line: &'a SourceLine, origin: Option<&'a str>, color: bool) -> Snippet<'a> {
        Snippet {
            title: Some(Annotation {
                label: Some(self.message.as_str()),
                id: None,
                annotation_type: AnnotationType::Error,
            }),
            footer: vec![],
            slices: self.slices(line, origin),
            opt: FormatOptions {
                color,
                ..Default::default()
            },
        }
    }
}

fn char_offset(source: &str, byte_offset: usize) -> usize {
    let safe = byte_offset.min(source.len());
    source[..safe].chars().count()
}
