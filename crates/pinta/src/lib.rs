/*! Unified interface for points-to analysis.
 *
 * Single import for loading `.pir` programs, running the context-sensitive pointer analysis,
 * building call graphs and dumping results. Batteries-included entry point for analysis drivers.
 */

pub use pinta_core as core;
pub use pinta_emit as emit;
pub use pinta_parser as parser;

pub use pinta_core::analysis::{
    AnalysisError, AnalysisOptions, CallGraphAlgorithm, CallGraphBuilder, CiCallGraph,
    PointerAnalysis, PointerAnalysisResult,
};
pub use pinta_core::{IrError, Program, ProgramBuilder};

pub use pinta_emit::{CallGraphEmitter, IrPrinter, ResultComparator, ResultDumper, ResultReport};

pub use pinta_parser::{load, parse_program, ParseError};
