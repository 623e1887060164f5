use crate::config::EmitterConfig;
use crate::emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
use crate::output::OutputFormat;
use pinta_core::analysis::CiCallGraph;
use pinta_core::format::{format_call_site, format_method};
use pinta_core::{MethodId, Program};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CallEdgeEntry {
    pub call_site: String,
    pub callee: String,
    pub kind: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CallGraphReport {
    pub entry_methods: Vec<String>,
    pub reachable_methods: Vec<String>,
    pub edges: Vec<CallEdgeEntry>,
}

pub struct CallGraphEmitter<'p> {
    program: &'p Program,
    config: EmitterConfig,
    format: OutputFormat,
}

impl<'p> CallGraphEmitter<'p> {
    pub fn new(program: &'p Program, config: EmitterConfig) -> Self {
        Self {
            program,
            config,
            format: OutputFormat::Text,
        }
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    fn sorted_methods(&self, graph: &CiCallGraph) -> Vec<String> {
        let mut methods: Vec<String> = graph
            .reachable_methods()
            .filter(|m| self.included(*m))
            .map(|m| format_method(self.program, m))
            .collect();
        methods.sort();
        methods
    }

    fn included(&self, method: MethodId) -> bool {
        !self.config.only_app || self.program.is_application_method(method)
    }

    pub fn report(&self, graph: &CiCallGraph) -> CallGraphReport {
        let mut edges: Vec<CallEdgeEntry> = graph
            .edges()
            .filter(|edge| self.included(edge.caller))
            .map(|edge| CallEdgeEntry {
                call_site: format_call_site(self.program, edge.call_site),
                callee: format_method(self.program, edge.callee),
                kind: edge.kind.to_string(),
            })
            .collect();
        edges.sort_by(|a, b| (&a.call_site, &a.callee).cmp(&(&b.call_site, &b.callee)));
        CallGraphReport {
            entry_methods: graph
                .entry_methods()
                .map(|m| format_method(self.program, m))
                .collect(),
            reachable_methods: self.sorted_methods(graph),
            edges,
        }
    }

    fn emit_text<W: Write>(
        &self,
        graph: &CiCallGraph,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let report = self.report(graph);
        EmitHelper::write_section(writer, context, "Reachable methods")?;
        for method in &report.reachable_methods {
            EmitHelper::write_line(writer, context, method)?;
        }
        writeln!(writer)?;

        EmitHelper::write_section(writer, context, "Call graph edges")?;
        for edge in &report.edges {
            EmitHelper::write_line(
                writer,
                context,
                &format!("{} -> {} ({})", edge.call_site, edge.callee, edge.kind),
            )?;
        }
        writeln!(writer)?;

        if self.config.verbosity.should_print_statistics() {
            EmitHelper::write_comment(
                writer,
                context,
                &format!(
                    "{} reachable methods, {} edges",
                    report.reachable_methods.len(),
                    report.edges.len()
                ),
            )?;
        }
        Ok(())
    }

    // Method-level graph: parallel edges from different call sites collapse into one.
    fn emit_dot<W: Write>(
        &self,
        graph: &CiCallGraph,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        let mut nodes: Vec<MethodId> = graph
            .reachable_methods()
            .filter(|m| self.included(*m))
            .collect();
        nodes.sort_by_key(|m| format_method(self.program, *m));

        let mut edges: Vec<(usize, usize)> = graph
            .edges()
            .filter_map(|edge| {
                let from = nodes.iter().position(|m| *m == edge.caller)?;
                let to = nodes.iter().position(|m| *m == edge.callee)?;
                Some((from, to))
            })
            .collect();
        edges.sort();
        edges.dedup();

        EmitHelper::write_block(writer, context, "digraph CallGraph", |w, c| {
            EmitHelper::write_line(w, c, "node [shape=box];")?;
            for (i, method) in nodes.iter().enumerate() {
                EmitHelper::write_line(
                    w,
                    c,
                    &format!(
                        "n{} [label=\"{}\"];",
                        i,
                        escape_label(&format_method(self.program, *method))
                    ),
                )?;
            }
            for (from, to) in &edges {
                EmitHelper::write_line(w, c, &format!("n{} -> n{};", from, to))?;
            }
            Ok(())
        })
    }
}

impl Emitter for CallGraphEmitter<'_> {
    type Item = CiCallGraph;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        graph: &CiCallGraph,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        match self.format {
            OutputFormat::Dot => self.emit_dot(graph, writer, context),
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut *writer, &self.report(graph))?;
                writeln!(writer)?;
                Ok(())
            }
            OutputFormat::Text => self.emit_text(graph, writer, context),
        }
    }
}

fn escape_label(label: &str) -> String {
    label.replace('\\', "\\\\").replace('"', "\\\"")
}
