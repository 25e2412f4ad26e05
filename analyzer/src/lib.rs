//! Checks one-line, Java-style declarations such as `int x = 5;`.
//!
//! Three stages look at every line of a buffer independently:
//!
//! - [`lexical`]: does the line have the shape `type name = value;`, with
//!   every part optional?
//! - [`syntax`]: is it a complete statement, in the right order, with its `;`?
//! - [`semantic`]: does the value fit the declared type?
//!
//! [`pipeline::run`] chains them and stops at the first stage that fails.
//! Each stage can also be run on its own, which is what an editor with one
//! button per stage needs:
//!
//! ```
//! use minijava_analyzer::{run_pipeline, lexical_pass, Status};
//!
//! let source = "int x = 5;\nString s = \"hi\";";
//! assert_eq!(lexical_pass(source).status(), Some(Status::Success));
//! assert_eq!(run_pipeline(source).status(), Some(Status::Success));
//! ```

pub mod error;
pub mod lexer;
pub mod source;
pub mod report;

pub mod lexical;
pub mod syntax;
pub mod semantic;
pub mod pipeline;

pub use error::{LineFault, LoadError};
pub use pipeline::{Controls, PipelineReport, Verdict};
pub use report::{Analysis, Report, Stage, Status};

use lexical::LexicalOutcome;
use semantic::SemanticOutcome;
use syntax::SyntaxOutcome;

pub fn run_pipeline(source: &str) -> PipelineReport {
    pipeline::run(source)
}

pub fn lexical_pass(source: &str) -> Analysis<LexicalOutcome> {
    lexical::analyze(source)
}

pub fn syntax_pass(source: &str) -> Analysis<SyntaxOutcome> {
    syntax::analyze(source)
}

pub fn semantic_pass(source: &str) -> Analysis<SemanticOutcome> {
    semantic::analyze(source)
}
