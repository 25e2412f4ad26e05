//! The semantic stage: does the assigned value fit the declared type?
//!
//! Each line is searched (not matched in full) for `name = value;`. The
//! declared type is simply the first whitespace-separated word of the line,
//! wherever the assignment itself sits. The value is then checked against a
//! per-type grammar:
//!
//! | type      | value                                   |
//! |-----------|-----------------------------------------|
//! | `byte`    | optional `-`, 1 to 3 digits             |
//! | `short`   | optional `-`, 1 to 5 digits             |
//! | `int`     | optional `-`, 1 or more digits          |
//! | `float`   | optional `-`, digits `.` digits         |
//! | `boolean` | `true` or `false`                       |
//! | `char`    | one character in single quotes          |
//! | `String`  | anything in double quotes               |
//!
//! Only the shape is checked, so `byte b = 999;` passes. `long` and `double`
//! have no grammar and are rejected as unknown types like any other word.

use std::fmt::{self, Formatter};
use std::sync::OnceLock;

use regex::Regex;

use crate::error::{LineFault, SemanticFault};
use crate::lexer::{Span, TypeName};
use crate::report::{Analysis, Outcome, Report, Stage};
use crate::source::{SourceLine, SourceLines};

#[derive(Debug, Clone, PartialEq)]
pub enum SemanticOutcome {
    Pass {
        identifier: String,
        data_type: TypeName,
        value: String,
    },
    Fail(SemanticFault),
}

const STATEMENT: &str = r#"([a-zA-Z_][a-zA-Z0-9_]*)\s*=\s*(".*"|'.*'|\S+);"#;

const VALUE_GRAMMARS: [(TypeName, &str); 7] = [
    (TypeName::Byte,    r"-?[0-9]{1,3}"),
    (TypeName::Short,   r"-?[0-9]{1,5}"),
    (TypeName::Int,     r"-?[0-9]+"),
    (TypeName::Float,   r"-?[0-9]+\.[0-9]+"),
    (TypeName::Boolean, r"true|false"),
    (TypeName::Char,    r"'.'"),
    (TypeName::String,  r#"".*""#),
];

fn statement() -> &'static Regex {
    static STATEMENT_REGEX: OnceLock<Regex> = OnceLock::new();
    STATEMENT_REGEX.get_or_init(|| Regex::new(STATEMENT).expect("Invalid regex"))
}

fn value_grammar(data_type: TypeName) -> Option<&'static Regex> {
    static GRAMMARS: OnceLock<Vec<(TypeName, Regex)>> = OnceLock::new();
    GRAMMARS
        .get_or_init(|| {
            VALUE_GRAMMARS.iter()
                .map(|(data_type, pattern)| {
                    let anchored = format!("^(?:{})$", pattern);
                    (*data_type, Regex::new(anchored.as_str()).expect("Invalid regex"))
                })
                .collect()
        })
        .iter()
        .find(|(candidate, _)| *candidate == data_type)
        .map(|(_, grammar)| grammar)
}

/// Checks `value` against the grammar of the type named `declared`.
///
/// `declared_span` is where the type name sits in the line, `value_span`
/// where the value does; both end up in the fault for diagnostics.
pub fn type_check(declared: &str, declared_span: Span, value: &str, value_span: Span) -> Result<TypeName, SemanticFault> {
    let unknown = || SemanticFault::UnknownType { span: declared_span, name: declared.to_string() };

    let data_type = TypeName::from_keyword(declared).ok_or_else(unknown)?;
    let grammar = value_grammar(data_type).ok_or_else(unknown)?;

    if grammar.is_match(value) {
        Ok(data_type)
    } else {
        Err(SemanticFault::TypeMismatch { span: value_span, value: value.to_string(), expected: data_type })
    }
}

pub fn check_line(line: &str) -> SemanticOutcome {
    let found = statement()
        .captures(line)
        .and_then(|captures| captures.get(1).zip(captures.get(2)));
    let (identifier, value) = match found {
        Some(groups) => groups,
        None => return SemanticOutcome::Fail(SemanticFault::Malformed),
    };

    let declared = line.split(char::is_whitespace).next().unwrap_or_default();

    match type_check(declared, (0, declared.len()), value.as_str(), (value.start(), value.end())) {
        Ok(data_type) => SemanticOutcome::Pass {
            identifier: identifier.as_str().to_string(),
            data_type,
            value: value.as_str().to_string(),
        },
        Err(fault) => SemanticOutcome::Fail(fault),
    }
}

#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn analyze(source: &str) -> Analysis<SemanticOutcome> {
    Analysis::of(source, report)
}

/// Runs the stage over lines that were already split and numbered.
pub fn report(lines: SourceLines) -> Report<SemanticOutcome> {
    Report::build(Stage::Semantic, lines, |line| check_line(&line.text))
}

impl Outcome for SemanticOutcome {
    fn fault(&self, line: &SourceLine) -> Option<LineFault> {
        match self {
            SemanticOutcome::Pass { .. } => None,
            SemanticOutcome::Fail(fault) => Some(LineFault::semantic(line.number, fault)),
        }
    }

    fn render(&self, _line: &SourceLine, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SemanticOutcome::Pass { identifier, data_type, value } => writeln!(
                f,
                "Semantic analysis passed for variable '{}' with value '{}' and type '{}'.",
                identifier, value, data_type
            ),
            SemanticOutcome::Fail(fault) => writeln!(f, "Error: {}", fault),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::report::Status;

    fn passes(line: &str) -> bool {
        matches!(check_line(line), SemanticOutcome::Pass { .. })
    }

    fn fault(line: &str) -> SemanticFault {
        match check_line(line) {
            SemanticOutcome::Fail(fault) => fault,
            pass => panic!("expected {:?} to fail, got {:?}", line, pass),
        }
    }

    #[test]
    fn value_grammars() {
        let cases = [
            ("byte b = 12;", true),
            ("byte b = -128;", true),
            ("byte b = 999;", true),
            ("byte b = 1000;", false),
            ("short s = 32767;", true),
            ("short s = 123456;", false),
            ("int i = -42;", true),
            ("int i = 4.2;", false),
            ("float f = 3.14;", true),
            ("float f = 3;", false),
            ("boolean ok = false;", true),
            ("boolean ok = 1;", false),
            ("char c = 'z';", true),
            ("char c = 'zz';", false),
            ("String s = \"hi there\";", true),
            ("String s = hi;", false),
        ];
        for (line, expected) in cases.iter() {
            assert_eq!(passes(line), *expected, "{}", line);
        }
    }

    #[test]
    fn pass_carries_the_parts() {
        assert_eq!(check_line("String s = \"hi\";"), SemanticOutcome::Pass {
            identifier: "s".to_string(),
            data_type: TypeName::String,
            value: "\"hi\"".to_string(),
        });
    }

    #[test]
    fn long_and_double_have_no_grammar() {
        assert_eq!(fault("long l = 5;"), SemanticFault::UnknownType { span: (0, 4), name: "long".to_string() });
        assert_eq!(fault("double d = 1.5;"), SemanticFault::UnknownType { span: (0, 6), name: "double".to_string() });
    }

    #[test]
    fn declared_type_is_the_first_word() {
        assert_eq!(fault("x = 5;"), SemanticFault::UnknownType { span: (0, 1), name: "x".to_string() });
        assert_eq!(fault("Integer i = 5;"), SemanticFault::UnknownType { span: (0, 7), name: "Integer".to_string() });
    }

    #[test]
    fn type_mismatch_points_at_the_value() {
        assert_eq!(fault("String s = hi;"), SemanticFault::TypeMismatch {
            span: (11, 13),
            value: "hi".to_string(),
            expected: TypeName::String,
        });
    }

    #[test]
    fn lines_without_an_assignment_are_malformed() {
        assert_eq!(fault("int x;"), SemanticFault::Malformed);
        assert_eq!(fault("int x = 5"), SemanticFault::Malformed);
        assert_eq!(fault(""), SemanticFault::Malformed);
    }

    #[test]
    fn failures_do_not_stop_later_lines() {
        let analysis = analyze("long l = 5;\nint i = 7;\nString s = hi;");
        assert_eq!(analysis.status(), Some(Status::Failure));
        assert_eq!(
            analysis.to_string(),
            "Error: Unknown data type: long\n\
             Semantic analysis passed for variable 'i' with value '7' and type 'int'.\n\
             Error: Type mismatch: 'hi' is not a valid String.\n\
             \n\
             Error(s) detected. Semantic analysis failed."
        );
    }

    #[test]
    fn success_trailer() {
        let analysis = analyze("char c = 'c';");
        assert_eq!(analysis.status(), Some(Status::Success));
        assert_eq!(
            analysis.to_string(),
            "Semantic analysis passed for variable 'c' with value ''c'' and type 'char'.\n\nSemantic Analysis completed successfully."
        );
    }
}
