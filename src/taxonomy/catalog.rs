use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Statistical bucket of an action. Set once on the catalog entry and frozen into every record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Goal,
    Miss,
    Turnover,
    Save,
}

impl ActionCategory {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Goal => "Goal",
            Self::Miss => "Miss",
            Self::Turnover => "Turnover",
            Self::Save => "Save",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionKind {
    pub primary_type: String,
    pub label: String,
    pub category: ActionCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default = "default_color_tag")]
    pub color_tag: String,
}

fn default_color_tag() -> String {
    "neutral".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubActionKind {
    pub sub_type: String,
    pub label: String,
}

/// A fully resolved action, ready to be written into a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedAction {
    pub action_type: String,
    pub label: String,
    pub category: ActionCategory,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("unknown action '{0}'")]
    UnknownPrimary(String),
    #[error("unknown sub-action '{sub_type}' for '{primary_type}'")]
    UnknownSubAction {
        primary_type: String,
        sub_type: String,
    },
    #[error("action '{0}' requires a sub-action")]
    SubActionRequired(String),
    #[error("action '{primary_type}' references missing sub-catalog '{subcategory}'")]
    MissingSubcategory {
        primary_type: String,
        subcategory: String,
    },
    #[error("duplicate action type '{0}'")]
    DuplicatePrimary(String),
    #[error("duplicate sub-action '{sub_type}' in sub-catalog '{subcategory}'")]
    DuplicateSubAction {
        subcategory: String,
        sub_type: String,
    },
    #[error("failed to read catalog file: {0}")]
    Read(#[from] std::io::Error),
    #[error("failed to parse catalog YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
}

pub fn composite_type(primary_type: &str, sub_type: &str) -> String {
    format!("{primary_type}_{sub_type}")
}

pub fn composite_label(primary_label: &str, sub_label: &str) -> String {
    format!("{primary_label} ({sub_label})")
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogFile {
    primaries: Vec<ActionKind>,
    #[serde(default)]
    subcategories: BTreeMap<String, Vec<SubActionKind>>,
}

/// Immutable action taxonomy, built once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Catalog {
    primaries: Vec<ActionKind>,
    subcategories: BTreeMap<String, Vec<SubActionKind>>,
}

impl Catalog {
    pub fn new(
        primaries: Vec<ActionKind>,
        subcategories: BTreeMap<String, Vec<SubActionKind>>,
    ) -> Result<Self, CatalogError> {
        let mut seen = HashSet::new();
        for kind in &primaries {
            if !seen.insert(kind.primary_type.as_str()) {
                return Err(CatalogError::DuplicatePrimary(kind.primary_type.clone()));
            }
            if let Some(sub) = &kind.subcategory {
                if !subcategories.contains_key(sub) {
                    return Err(CatalogError::MissingSubcategory {
                        primary_type: kind.primary_type.clone(),
                        subcategory: sub.clone(),
                    });
                }
            }
        }
        for (name, subs) in &subcategories {
            let mut seen = HashSet::new();
            for sub in subs {
                if !seen.insert(sub.sub_type.as_str()) {
                    return Err(CatalogError::DuplicateSubAction {
                        subcategory: name.clone(),
                        sub_type: sub.sub_type.clone(),
                    });
                }
            }
        }
        Ok(Self {
            primaries,
            subcategories,
        })
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yaml::from_str(raw)?;
        Self::new(file.primaries, file.subcategories)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let raw = fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    pub fn primaries(&self) -> &[ActionKind] {
        &self.primaries
    }

    pub fn primary(&self, primary_type: &str) -> Option<&ActionKind> {
        self.primaries.iter().find(|k| k.primary_type == primary_type)
    }

    /// Sub-actions offered after choosing `kind`, or `None` when the kind is terminal.
    pub fn sub_actions(&self, kind: &ActionKind) -> Option<&[SubActionKind]> {
        kind.subcategory
            .as_ref()
            .and_then(|name| self.subcategories.get(name))
            .map(Vec::as_slice)
    }

    pub fn has_sub_menu(&self, primary_type: &str) -> bool {
        self.primary(primary_type)
            .and_then(|kind| self.sub_actions(kind))
            .is_some()
    }

    /// Resolve a primary kind that has no sub-menu.
    pub fn resolve_simple(&self, primary_type: &str) -> Result<ResolvedAction, CatalogError> {
        let kind = self
            .primary(primary_type)
            .ok_or_else(|| CatalogError::UnknownPrimary(primary_type.to_string()))?;
        if self.sub_actions(kind).is_some() {
            return Err(CatalogError::SubActionRequired(primary_type.to_string()));
        }
        Ok(ResolvedAction {
            action_type: kind.primary_type.clone(),
            label: kind.label.clone(),
            category: kind.category,
        })
    }

    pub fn resolve_composite(
        &self,
        primary_type: &str,
        sub_type: &str,
    ) -> Result<ResolvedAction, CatalogError> {
        let kind = self
            .primary(primary_type)
            .ok_or_else(|| CatalogError::UnknownPrimary(primary_type.to_string()))?;
        let sub = self
            .sub_actions(kind)
            .and_then(|subs| subs.iter().find(|s| s.sub_type == sub_type))
            .ok_or_else(|| CatalogError::UnknownSubAction {
                primary_type: primary_type.to_string(),
                sub_type: sub_type.to_string(),
            })?;
        Ok(ResolvedAction {
            action_type: composite_type(&kind.primary_type, &sub.sub_type),
            label: composite_label(&kind.label, &sub.label),
            category: kind.category,
        })
    }

    /// Every type identifier the catalog can produce, sorted.
    pub fn known_action_types(&self) -> BTreeSet<String> {
        let mut types = BTreeSet::new();
        for kind in &self.primaries {
            match self.sub_actions(kind) {
                Some(subs) => {
                    for sub in subs {
                        types.insert(composite_type(&kind.primary_type, &sub.sub_type));
                    }
                }
                None => {
                    types.insert(kind.primary_type.clone());
                }
            }
        }
        types
    }
}

impl Catalog {
    /// Built-in handball catalog. Its tables are known to be consistent.
    pub fn handball() -> Self {
        Self {
            primaries: super::handball::primaries(),
            subcategories: super::handball::subcategories(),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::handball()
    }
}
