/*! Render programs and analysis results as text.
 *
 * Analysis output has to be read by people and diffed by tools. The IR printer writes programs
 * back in the syntax the parser reads, the result dumper writes points-to sets and call edges as
 * sorted lines so two runs can be compared line by line, and the call graph emitter produces
 * listings and DOT graphs.
 */

pub mod callgraph;
pub mod comparator;
pub mod config;
pub mod dumper;
pub mod emitter;
pub mod ir_printer;
pub mod output;

pub use callgraph::{CallEdgeEntry, CallGraphEmitter, CallGraphReport};
pub use comparator::{Mismatch, MismatchKind, ResultComparator};
pub use config::{EmitterConfig, IndentStyle, VerbosityLevel};
pub use dumper::{ReportSection, ResultDumper, ResultReport};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter, Style};
pub use ir_printer::IrPrinter;
pub use output::OutputFormat;
