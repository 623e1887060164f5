use super::heap::{AllocationSiteModel, HeapModel, TypeBasedModel};
use super::selector::SelectorRegistry;
use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HeapModelKind {
    #[default]
    AllocSite,
    Type,
}

impl HeapModelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            HeapModelKind::AllocSite => "alloc-site",
            HeapModelKind::Type => "type",
        }
    }

    pub fn create(self) -> Box<dyn HeapModel> {
        match self {
            HeapModelKind::AllocSite => Box::new(AllocationSiteModel::new()),
            HeapModelKind::Type => Box::new(TypeBasedModel::new()),
        }
    }
}

impl fmt::Display for HeapModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HeapModelKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "alloc-site" | "allocation-site" => Ok(HeapModelKind::AllocSite),
            "type" => Ok(HeapModelKind::Type),
            other => Err(ConfigError::UnknownHeapModel(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct AnalysisOptions {
    pub cs: String,
    pub heap_model: HeapModelKind,
    pub only_app: bool,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            cs: "ci".to_string(),
            heap_model: HeapModelKind::AllocSite,
            only_app: false,
        }
    }
}

impl AnalysisOptions {
    pub fn with_cs(cs: &str) -> Self {
        Self {
            cs: cs.to_string(),
            ..Self::default()
        }
    }

    // Parses `key:value` pairs separated by `;`, e.g. `cs:2-obj;only-app:true`.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let mut options = Self::default();
        options.apply(text)?;
        Ok(options)
    }

    pub fn apply(&mut self, text: &str) -> Result<(), ConfigError> {
        for entry in text.split(';').map(str::trim).filter(|e| !e.is_empty()) {
            let (key, value) = entry
                .split_once(':')
                .ok_or_else(|| ConfigError::InvalidOptionValue {
                    key: entry.to_string(),
                    value: String::new(),
                })?;
            self.set(key.trim(), value.trim())?;
        }
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidOptionValue {
            key: key.to_string(),
            value: value.to_string(),
        };
        match key {
            "cs" => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.cs = value.to_string();
            }
            "heap-model" => self.heap_model = value.parse()?,
            "only-app" => self.only_app = value.parse().map_err(|_| invalid())?,
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
        Ok(())
    }

    pub fn is_context_insensitive(&self) -> bool {
        self.cs.trim() == "ci"
    }

    pub fn validate(&self, registry: &SelectorRegistry) -> Result<(), ConfigError> {
        registry.validate(&self.cs)
    }
}

impl fmt::Display for AnalysisOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "cs:{};heap-model:{};only-app:{}",
            self.cs, self.heap_model, self.only_app
        )
    }
}
