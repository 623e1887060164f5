use super::{ChaBuilder, CiCallGraph};
use crate::analysis::{AnalysisError, AnalysisOptions, ConfigError, PointerAnalysis};
use crate::program::Program;
use std::fmt;
use std::str::FromStr;

pub trait CallGraphBuilder {
    fn name(&self) -> &'static str;

    fn build(&self, program: &Program) -> Result<CiCallGraph, AnalysisError>;
}

// Builds the call graph as a by-product of the pointer analysis.
#[derive(Debug, Clone, Default)]
pub struct PtaBuilder {
    options: AnalysisOptions,
}

impl PtaBuilder {
    pub fn new(options: AnalysisOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &AnalysisOptions {
        &self.options
    }
}

impl CallGraphBuilder for PtaBuilder {
    fn name(&self) -> &'static str {
        if self.options.is_context_insensitive() {
            "cipta"
        } else {
            "cspta"
        }
    }

    fn build(&self, program: &Program) -> Result<CiCallGraph, AnalysisError> {
        let result = PointerAnalysis::new(self.options.clone()).analyze(program)?;
        Ok(result.into_call_graph())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallGraphAlgorithm {
    Cha,
    Pta,
    Cipta,
    Cspta,
}

impl CallGraphAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            CallGraphAlgorithm::Cha => "cha",
            CallGraphAlgorithm::Pta => "pta",
            CallGraphAlgorithm::Cipta => "cipta",
            CallGraphAlgorithm::Cspta => "cspta",
        }
    }

    // `pta` honors the given options as they are; `cipta` forces `cs:ci`.
    pub fn builder(self, options: &AnalysisOptions) -> Box<dyn CallGraphBuilder> {
        match self {
            CallGraphAlgorithm::Cha => Box::new(ChaBuilder::new()),
            CallGraphAlgorithm::Pta | CallGraphAlgorithm::Cspta => {
                Box::new(PtaBuilder::new(options.clone()))
            }
            CallGraphAlgorithm::Cipta => {
                let mut options = options.clone();
                options.cs = "ci".to_string();
                Box::new(PtaBuilder::new(options))
            }
        }
    }
}

impl fmt::Display for CallGraphAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CallGraphAlgorithm {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "cha" => Ok(CallGraphAlgorithm::Cha),
            "pta" => Ok(CallGraphAlgorithm::Pta),
            "cipta" => Ok(CallGraphAlgorithm::Cipta),
            "cspta" => Ok(CallGraphAlgorithm::Cspta),
            other => Err(ConfigError::UnknownCallGraphAlgorithm(other.to_string())),
        }
    }
}
