//! Running all three stages in order.
//!
//! A stage only runs when the one before it succeeded. Whatever reports
//! were produced are kept, so a run that stops at the syntax stage still
//! shows the lexical report.

use std::fmt::{self, Display, Formatter};

use crate::error::LineFault;
use crate::lexical::{self, LexicalOutcome};
use crate::report::{Report, Stage, Status};
use crate::semantic::{self, SemanticOutcome};
use crate::source::{self, SourceLine};
use crate::syntax::{self, SyntaxOutcome};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The buffer was blank; no stage ran.
    NothingToRun,
    /// The named stage failed. Later stages did not run, except for
    /// [`Stage::Semantic`], which is always the last one anyway.
    Aborted(Stage),
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PipelineReport {
    pub lexical: Option<Report<LexicalOutcome>>,
    pub syntax: Option<Report<SyntaxOutcome>>,
    pub semantic: Option<Report<SemanticOutcome>>,
    pub verdict: Verdict,
}

pub const NOTHING_TO_RUN: &str = "No code to run.";

#[tracing::instrument(skip_all, fields(source_len = source.len()))]
pub fn run(source: &str) -> PipelineReport {
    let mut report = PipelineReport {
        lexical: None,
        syntax: None,
        semantic: None,
        verdict: Verdict::NothingToRun,
    };
    let lines = match source::numbered(source) {
        Some(lines) => lines,
        None => return report,
    };

    let lexical = lexical::report(lines.clone());
    let lexical_status = lexical.status();
    report.lexical = Some(lexical);
    if lexical_status == Status::Failure {
        tracing::info!("aborting execution due to lexical errors");
        report.verdict = Verdict::Aborted(Stage::Lexical);
        return report;
    }

    let syntax = syntax::report(lines.clone());
    let syntax_status = syntax.status();
    report.syntax = Some(syntax);
    if syntax_status == Status::Failure {
        tracing::info!("aborting execution due to syntax errors");
        report.verdict = Verdict::Aborted(Stage::Syntax);
        return report;
    }

    let semantic = semantic::report(lines);
    report.verdict = match semantic.status() {
        Status::Failure => {
            tracing::info!("semantic errors found");
            Verdict::Aborted(Stage::Semantic)
        }
        Status::Success => Verdict::Completed,
    };
    report.semantic = Some(semantic);

    report
}

impl PipelineReport {
    pub fn status(&self) -> Option<Status> {
        match self.verdict {
            Verdict::NothingToRun => None,
            Verdict::Aborted(_) => Some(Status::Failure),
            Verdict::Completed => Some(Status::Success),
        }
    }

    /// Faults of the last stage that ran.
    pub fn faults(&self) -> Vec<(&SourceLine, LineFault)> {
        if let Some(semantic) = &self.semantic {
            semantic.faults()
        } else if let Some(syntax) = &self.syntax {
            syntax.faults()
        } else if let Some(lexical) = &self.lexical {
            lexical.faults()
        } else {
            Vec::new()
        }
    }
}

impl Display for PipelineReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.verdict == Verdict::NothingToRun {
            return write!(f, "{}", NOTHING_TO_RUN);
        }

        write!(f, "Running the code...\n\n")?;
        if let Some(lexical) = &self.lexical {
            write!(f, "{} Analysis Result:\n{}\n", Stage::Lexical.name(), lexical)?;
        }
        if let Some(syntax) = &self.syntax {
            write!(f, "{} Analysis Result:\n{}\n", Stage::Syntax.name(), syntax)?;
        }
        if let Some(semantic) = &self.semantic {
            write!(f, "{} Analysis Result:\n{}\n", Stage::Semantic.name(), semantic)?;
        }

        match self.verdict {
            Verdict::Aborted(stage) => write!(f, "\nAborting execution due to {} errors.\n", stage.name().to_lowercase()),
            Verdict::Completed => write!(f, "\nCode execution simulated. All analyses are complete."),
            Verdict::NothingToRun => Ok(()),
        }
    }
}


/// Which per-stage actions a front end should offer.
///
/// Derived from stage [`Status`]es only, never from report text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Controls {
    pub lexical: bool,
    pub syntax: bool,
    pub semantic: bool,
}

impl Controls {
    /// Source was just opened: only lexical analysis makes sense yet.
    pub fn source_loaded() -> Self {
        Controls { lexical: true, ..Controls::default() }
    }

    pub fn after_run(self, report: &PipelineReport) -> Self {
        match report.verdict {
            Verdict::NothingToRun              => self,
            Verdict::Aborted(Stage::Lexical)   => Controls { lexical: true, syntax: false, semantic: false },
            Verdict::Aborted(Stage::Syntax)    => Controls { lexical: true, syntax: true,  semantic: false },
            Verdict::Aborted(Stage::Semantic)
            | Verdict::Completed               => Controls { lexical: true, syntax: true,  semantic: true  },
        }
    }

    /// After running a single stage on its own. Blank input changes nothing.
    pub fn after_stage(self, stage: Stage, status: Option<Status>) -> Self {
        let status = match status {
            Some(status) => status,
            None => return self,
        };
        match (stage, status) {
            (Stage::Lexical, Status::Failure)  => Controls { syntax: false, semantic: false, ..self },
            (Stage::Lexical, Status::Success)  => Controls { syntax: true, ..self },
            (Stage::Syntax, Status::Failure)   => Controls { semantic: false, ..self },
            (Stage::Syntax, Status::Success)   => Controls { semantic: true, ..self },
            (Stage::Semantic, _)               => self,
        }
    }
}
