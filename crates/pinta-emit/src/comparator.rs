use crate::dumper::ResultReport;
use indexmap::IndexSet;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum MismatchKind {
    Missing,
    Unexpected,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub section: String,
    pub line: String,
    pub kind: MismatchKind,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            MismatchKind::Missing => write!(f, "[{}] {} should be included", self.section, self.line),
            MismatchKind::Unexpected => {
                write!(f, "[{}] {} should NOT be included", self.section, self.line)
            }
        }
    }
}

// Line-set comparison of two reports, section by section.
#[derive(Debug, Clone, Default)]
pub struct ResultComparator {
    ignore_sections: Vec<String>,
}

impl ResultComparator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore_section(mut self, title: &str) -> Self {
        self.ignore_sections.push(title.to_string());
        self
    }

    pub fn compare(&self, expected: &ResultReport, actual: &ResultReport) -> Vec<Mismatch> {
        let mut titles: IndexSet<&str> = IndexSet::new();
        titles.extend(expected.sections.iter().map(|s| s.title.as_str()));
        titles.extend(actual.sections.iter().map(|s| s.title.as_str()));

        let mut mismatches = Vec::new();
        for title in titles {
            if self.ignore_sections.iter().any(|ignored| ignored == title) {
                continue;
            }
            let wanted: IndexSet<&String> = expected.lines(title).iter().collect();
            let given: IndexSet<&String> = actual.lines(title).iter().collect();
            for line in given.difference(&wanted) {
                mismatches.push(Mismatch {
                    section: title.to_string(),
                    line: (*line).clone(),
                    kind: MismatchKind::Unexpected,
                });
            }
            for line in wanted.difference(&given) {
                mismatches.push(Mismatch {
                    section: title.to_string(),
                    line: (*line).clone(),
                    kind: MismatchKind::Missing,
                });
            }
        }
        mismatches
    }
}
