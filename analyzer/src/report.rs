//! Per-stage reports.
//!
//! Every stage produces the same shape: one outcome per [`SourceLine`], in
//! order, plus a [`Status`] derived from those outcomes. The text a user sees
//! comes from the [`Display`] impls; code that needs to know whether a stage
//! failed should look at [`Report::status`] instead of the text.

use std::fmt::{self, Display, Formatter};

use crate::error::LineFault;
use crate::source::{self, SourceLine, SourceLines};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Lexical,
    Syntax,
    Semantic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Success,
    Failure,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Lexical  => "Lexical",
            Stage::Syntax   => "Syntax",
            Stage::Semantic => "Semantic",
        }
    }

    /// The closing sentence of a report. The wording is part of the output
    /// format, so keep success and failure distinguishable per stage.
    pub fn trailer(&self, status: Status) -> &'static str {
        use Status::*;
        match (self, status) {
            (Stage::Lexical,  Failure) => "\nUnknown token(s) detected. Lexical analysis failed.\n",
            (Stage::Lexical,  Success) => "Lexical Analysis completed successfully.\n",
            (Stage::Syntax,   Failure) => "\nSyntax error(s) detected. Syntax analysis failed.\n",
            (Stage::Syntax,   Success) => "\nSyntax Analysis completed successfully.\n",
            (Stage::Semantic, Failure) => "\nError(s) detected. Semantic analysis failed.",
            (Stage::Semantic, Success) => "\nSemantic Analysis completed successfully.",
        }
    }
}

/// What a stage concluded about one line.
pub trait Outcome {
    /// `Some` when the line counts against the stage.
    fn fault(&self, line: &SourceLine) -> Option<LineFault>;

    fn render(&self, line: &SourceLine, f: &mut Formatter<'_>) -> fmt::Result;

    fn is_fault(&self, line: &SourceLine) -> bool {
        self.fault(line).is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report<T> {
    pub stage: Stage,
    pub lines: Vec<(SourceLine, T)>,
}

/// The result of running one stage over a buffer.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis<T> {
    /// The buffer was blank.
    Empty,
    Complete(Report<T>),
}

pub const NOTHING_TO_ANALYZE: &str = "No code to analyze.";

impl<T: Outcome> Report<T> {
    /// Classifies every line with `classify`.
    ///
    /// A faulty line never stops the stage; the status is only aggregated
    /// once all lines have an outcome.
    pub fn build(stage: Stage, lines: SourceLines, classify: impl Fn(&SourceLine) -> T) -> Report<T> {
        let lines = lines
            .into_iter()
            .map(|line| {
                let outcome = classify(&line);
                if let Some(fault) = outcome.fault(&line) {
                    tracing::debug!(stage = stage.name(), line = line.number, "{}", fault.message);
                }
                (line, outcome)
            })
            .collect();

        Report { stage, lines }
    }

    pub fn status(&self) -> Status {
        if self.lines.iter().any(|(line, outcome)| outcome.is_fault(line)) {
            Status::Failure
        } else {
            Status::Success
        }
    }

    pub fn faults(&self) -> Vec<(&SourceLine, LineFault)> {
        self.lines.iter()
            .filter_map(|(line, outcome)| outcome.fault(line).map(|fault| (line, fault)))
            .collect()
    }

    pub fn outcomes(&self) -> impl Iterator<Item=&T> {
        self.lines.iter().map(|(_, outcome)| outcome)
    }
}

impl<T: Outcome> Display for Report<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for (line, outcome) in &self.lines {
            outcome.render(line, f)?;
        }
        write!(f, "{}", self.stage.trailer(self.status()))
    }
}

impl<T> Analysis<T> {
    /// Hands the numbered lines of `source` to `report`, unless the buffer
    /// is blank.
    pub fn of(source: &str, report: impl FnOnce(SourceLines) -> Report<T>) -> Self {
        match source::numbered(source) {
            Some(lines) => Analysis::Complete(report(lines)),
            None => Analysis::Empty,
        }
    }
}

impl<T: Outcome> Analysis<T> {
    /// `None` for a blank buffer, which neither passes nor fails.
    pub fn status(&self) -> Option<Status> {
        self.report().map(Report::status)
    }

    pub fn report(&self) -> Option<&Report<T>> {
        match self {
            Analysis::Empty => None,
            Analysis::Complete(report) => Some(report),
        }
    }
}

impl<T: Outcome> Display for Analysis<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Analysis::Empty => write!(f, "{}", NOTHING_TO_ANALYZE),
            Analysis::Complete(report) => write!(f, "{}", report),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    struct Even;

    impl Outcome for Even {
        fn fault(&self, line: &SourceLine) -> Option<LineFault> {
            if line.number % 2 == 0 {
                Some(LineFault { line: line.number, span: None, message: "even".to_string(), label: "here" })
            } else {
                None
            }
        }

        fn render(&self, line: &SourceLine, f: &mut Formatter<'_>) -> fmt::Result {
            writeln!(f, "{}", line.text)
        }
    }

    #[test]
    fn blank_source_is_empty() {
        let analysis = Analysis::of("  \n ", |lines| Report::build(Stage::Lexical, lines, |_| Even));
        assert_eq!(analysis.status(), None);
        assert_eq!(analysis.to_string(), "No code to analyze.");
    }

    #[test]
    fn every_line_gets_an_outcome_before_status() {
        let analysis = Analysis::of("a\nb\nc", |lines| Report::build(Stage::Semantic, lines, |_| Even));
        let report = analysis.report().unwrap();
        assert_eq!(report.lines.len(), 3);
        assert_eq!(report.status(), Status::Failure);
        assert_eq!(report.faults().len(), 1);
        assert_eq!(analysis.to_string(), "a\nb\nc\n\nError(s) detected. Semantic analysis failed.");
    }

    #[test]
    fn trailers_differ_between_success_and_failure() {
        for stage in [Stage::Lexical, Stage::Syntax, Stage::Semantic] {
            assert_ne!(stage.trailer(Status::Success), stage.trailer(Status::Failure));
        }
    }
}
