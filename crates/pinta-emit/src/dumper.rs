use crate::config::EmitterConfig;
use crate::emitter::{parse_section_header, EmitContext, EmitHelper, EmitResult, Emitter};
use pinta_core::analysis::{ObjId, PointerAnalysisResult};
use pinta_core::format::{format_call_site, format_field, format_method, format_var};
use serde::{Deserialize, Serialize};
use std::io::Write;

pub const VARIABLES: &str = "Points-to sets of all variables";
pub const STATIC_FIELDS: &str = "Points-to sets of all static fields";
pub const INSTANCE_FIELDS: &str = "Points-to sets of all instance fields";
pub const ARRAY_INDEXES: &str = "Points-to sets of all array indexes";
pub const CALL_EDGES: &str = "Call graph edges";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSection {
    pub title: String,
    pub lines: Vec<String>,
}

// A points-to result rendered as sorted text lines, one section per kind of pointer. Dumps of
// the same program and options are byte-identical across runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultReport {
    pub sections: Vec<ReportSection>,
}

impl ResultReport {
    pub fn section(&self, title: &str) -> Option<&ReportSection> {
        self.sections.iter().find(|section| section.title == title)
    }

    pub fn lines(&self, title: &str) -> &[String] {
        self.section(title)
            .map(|section| section.lines.as_slice())
            .unwrap_or(&[])
    }

    // Reads a text dump back. Lines before the first header and blank lines are ignored.
    pub fn parse(text: &str) -> Self {
        let mut report = ResultReport::default();
        for line in text.lines() {
            if let Some(title) = parse_section_header(line) {
                report.sections.push(ReportSection {
                    title: title.to_string(),
                    lines: Vec::new(),
                });
            } else if !line.trim().is_empty() {
                if let Some(section) = report.sections.last_mut() {
                    section.lines.push(line.trim_end().to_string());
                }
            }
        }
        report
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

pub struct ResultDumper {
    config: EmitterConfig,
}

impl ResultDumper {
    pub fn new(config: EmitterConfig) -> Self {
        Self { config }
    }

    pub fn report(&self, result: &PointerAnalysisResult<'_>) -> ResultReport {
        let program = result.program();
        let only_app = self.config.only_app || result.options().only_app;
        let objs = |objs: Vec<ObjId>| -> String {
            let names: Vec<String> = objs.into_iter().map(|obj| result.format_obj(obj)).collect();
            format!("[{}]", names.join(", "))
        };

        let mut vars: Vec<String> = result
            .vars()
            .filter(|var| !only_app || program.is_application_method(program.var(*var).method))
            .map(|var| {
                format!(
                    "{} -> {}",
                    format_var(program, var),
                    objs(result.points_to_var(var))
                )
            })
            .collect();

        let mut static_fields: Vec<String> = result
            .static_fields()
            .map(|field| {
                format!(
                    "{} -> {}",
                    format_field(program, field),
                    objs(result.points_to_static(field))
                )
            })
            .collect();

        let mut instance_fields: Vec<String> = result
            .instance_fields()
            .map(|(base, field)| {
                format!(
                    "{}.{} -> {}",
                    result.format_obj(base),
                    format_field(program, field),
                    objs(result.points_to_instance_field(base, field))
                )
            })
            .collect();

        let mut arrays: Vec<String> = result
            .array_objects()
            .map(|array| {
                format!(
                    "{}[*] -> {}",
                    result.format_obj(array),
                    objs(result.points_to_array(array))
                )
            })
            .collect();

        let mut edges: Vec<String> = result
            .call_graph()
            .edges()
            .filter(|edge| !only_app || program.is_application_method(edge.caller))
            .map(|edge| {
                format!(
                    "{} -> {}",
                    format_call_site(program, edge.call_site),
                    format_method(program, edge.callee)
                )
            })
            .collect();

        let mut report = ResultReport::default();
        for (title, lines) in [
            (VARIABLES, &mut vars),
            (STATIC_FIELDS, &mut static_fields),
            (INSTANCE_FIELDS, &mut instance_fields),
            (ARRAY_INDEXES, &mut arrays),
            (CALL_EDGES, &mut edges),
        ] {
            lines.sort();
            report.sections.push(ReportSection {
                title: title.to_string(),
                lines: std::mem::take(lines),
            });
        }
        report
    }
}

impl Default for ResultDumper {
    fn default() -> Self {
        Self::new(EmitterConfig::plain())
    }
}

impl Emitter for ResultDumper {
    type Item = ResultReport;

    fn config(&self) -> &EmitterConfig {
        &self.config
    }

    fn emit<W: Write>(
        &self,
        report: &ResultReport,
        writer: &mut W,
        context: &mut EmitContext,
    ) -> EmitResult {
        for section in &report.sections {
            EmitHelper::write_section(writer, context, &section.title)?;
            for line in &section.lines {
                EmitHelper::write_line(writer, context, line)?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
