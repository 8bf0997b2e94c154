use std::collections::{BTreeMap, HashSet};

use serde::{Deserialize, Serialize};

use docdrift_core::RiskTier;

use crate::error::DriftError;
use crate::scoring::ScoringConfig;

/// Width of every score matrix.
pub const CANONICAL_COLUMN_COUNT: usize = 19;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalColumn {
    pub name: String,
    pub tier: RiskTier,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// A business table in the fixed registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub name: String,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Versioned, immutable column risk profile plus the table registry.
///
/// Loaded once and shared read-only; nothing in a run mutates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Taxonomy {
    pub version: String,
    pub columns: Vec<CanonicalColumn>,
    /// Historical label → canonical column name.
    #[serde(default)]
    pub aliases: BTreeMap<String, String>,
    #[serde(default)]
    pub tables: Vec<TableEntry>,
    /// Scoring overrides shipped with the taxonomy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring: Option<ScoringConfig>,
}

// ---------------------------------------------------------------------------
// Reference taxonomy
// ---------------------------------------------------------------------------

const REFERENCE_COLUMNS: [(&str, RiskTier, &[&str]); CANONICAL_COLUMN_COUNT] = [
    ("序号", RiskTier::L3, &["id", "编号", "number"]),
    ("项目类型", RiskTier::L2, &["type", "类型", "category", "项目", "部门", "department"]),
    ("来源", RiskTier::L1, &["source", "origin"]),
    ("任务发起时间", RiskTier::L1, &["start", "开始", "创建", "时间"]),
    ("目标对齐", RiskTier::L1, &["target", "目标", "objective"]),
    ("关键KR对齐", RiskTier::L1, &["kr", "关键", "key"]),
    ("具体计划内容", RiskTier::L2, &["plan", "计划", "content", "内容"]),
    ("邓总指导登记", RiskTier::L2, &["guidance", "指导", "登记"]),
    ("负责人", RiskTier::L1, &["owner", "responsible", "负责", "assignee", "主管"]),
    ("协助人", RiskTier::L2, &["assistant", "协助", "helper"]),
    ("监督人", RiskTier::L2, &["supervisor", "监督", "monitor"]),
    ("重要程度", RiskTier::L1, &["priority", "重要", "importance", "优先级"]),
    ("预计完成时间", RiskTier::L1, &["deadline", "结束", "due"]),
    ("完成进度", RiskTier::L3, &["progress", "进度", "completion", "状态", "status"]),
    ("完成链接", RiskTier::L3, &["link", "链接", "url", "checklist", "清单"]),
    ("经理分析复盘", RiskTier::L3, &["analysis", "分析", "summary", "总结"]),
    ("最新复盘时间", RiskTier::L3, &["review", "复盘", "retrospective"]),
    ("对上汇报", RiskTier::L2, &["report", "汇报", "reporting"]),
    ("应用情况", RiskTier::L3, &["application", "应用", "usage"]),
];

const REFERENCE_ALIASES: [(&str, &str); 8] = [
    ("计划输出思路 8/28", "序号"),
    ("邓总指导登记（日更新）", "邓总指导登记"),
    ("总完成进度", "完成进度"),
    ("形成计划清单", "完成链接"),
    ("复盘时间", "最新复盘时间"),
    ("进度分析总结", "经理分析复盘"),
    ("编号", "序号"),
    ("执行人", "负责人"),
];

const REFERENCE_TABLES: [(&str, &[&str], &[&str]); 3] = [
    ("出国销售计划表", &["出国销售表"], &["出国"]),
    ("回国销售计划表", &["回国销售表"], &["回国"]),
    ("小红书部门", &["小红书部门工作表"], &["小红书", "xiaohongshu"]),
];

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Taxonomy {
    /// The 19-column reference profile.
    pub fn reference() -> Self {
        Self {
            version: "reference-1".into(),
            columns: REFERENCE_COLUMNS
                .iter()
                .map(|(name, tier, keywords)| CanonicalColumn {
                    name: name.to_string(),
                    tier: *tier,
                    keywords: strings(keywords),
                })
                .collect(),
            aliases: REFERENCE_ALIASES
                .iter()
                .map(|(alias, target)| (alias.to_string(), target.to_string()))
                .collect(),
            tables: REFERENCE_TABLES
                .iter()
                .map(|(name, aliases, keywords)| TableEntry {
                    name: name.to_string(),
                    aliases: strings(aliases),
                    keywords: strings(keywords),
                })
                .collect(),
            scoring: None,
        }
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn tier(&self, index: usize) -> Option<RiskTier> {
        self.columns.get(index).map(|c| c.tier)
    }

    pub fn tiers(&self) -> Vec<RiskTier> {
        self.columns.iter().map(|c| c.tier).collect()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.iter().map(|t| t.name.clone()).collect()
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl Taxonomy {
    pub fn from_toml(input: &str) -> Result<Self, DriftError> {
        let taxonomy: Taxonomy = toml::from_str(input).map_err(|e| DriftError::ConfigParse(e.to_string()))?;
        taxonomy.validate()?;
        Ok(taxonomy)
    }

    pub fn validate(&self) -> Result<(), DriftError> {
        if self.version.trim().is_empty() {
            return Err(DriftError::ConfigValidation("taxonomy version must not be empty".into()));
        }

        if self.columns.len() != CANONICAL_COLUMN_COUNT {
            return Err(DriftError::ConfigValidation(format!(
                "taxonomy must declare exactly {CANONICAL_COLUMN_COUNT} columns, found {}",
                self.columns.len()
            )));
        }

        let mut names = HashSet::new();
        for column in &self.columns {
            if column.name.trim().is_empty() {
                return Err(DriftError::ConfigValidation("column name must not be empty".into()));
            }
            if !names.insert(column.name.as_str()) {
                return Err(DriftError::ConfigValidation(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
            if column.keywords.iter().any(|k| k.trim().is_empty()) {
                return Err(DriftError::ConfigValidation(format!(
                    "column '{}': empty keyword",
                    column.name
                )));
            }
        }

        for (alias, target) in &self.aliases {
            if !names.contains(target.as_str()) {
                return Err(DriftError::ConfigValidation(format!(
                    "alias '{alias}' targets unknown column '{target}'"
                )));
            }
        }

        let mut tables = HashSet::new();
        for table in &self.tables {
            if table.name.trim().is_empty() {
                return Err(DriftError::ConfigValidation("table name must not be empty".into()));
            }
            if !tables.insert(table.name.as_str()) {
                return Err(DriftError::ConfigValidation(format!(
                    "duplicate table '{}'",
                    table.name
                )));
            }
        }

        if let Some(scoring) = &self.scoring {
            scoring.validate()?;
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
