//! Raw label → canonical column (and table name → registry slot).
//!
//! One ordered cascade, first hit wins:
//! exact name → alias table → substring containment → keyword.
//! Within a step, earlier entries in the taxonomy win ties.

use std::collections::HashMap;

use serde::Serialize;

use crate::taxonomy::Taxonomy;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMethod {
    Exact,
    Alias,
    Substring,
    Keyword,
    Unmapped,
}

impl std::fmt::Display for MatchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Alias => write!(f, "alias"),
            Self::Substring => write!(f, "substring"),
            Self::Keyword => write!(f, "keyword"),
            Self::Unmapped => write!(f, "unmapped"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Resolution {
    /// Index into the taxonomy columns (or table registry).
    pub column: Option<usize>,
    pub method: MatchMethod,
}

impl Resolution {
    const UNMAPPED: Resolution = Resolution {
        column: None,
        method: MatchMethod::Unmapped,
    };

    pub fn is_mapped(&self) -> bool {
        self.column.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappedColumn {
    pub label: String,
    pub column: usize,
    pub method: MatchMethod,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub resolved: Vec<MappedColumn>,
    pub unmapped: Vec<String>,
}

// ---------------------------------------------------------------------------
// Vocabulary
// ---------------------------------------------------------------------------

/// Names, aliases and keywords of one namespace, pre-normalized.
#[derive(Debug, Clone)]
struct Vocabulary {
    names: Vec<String>,
    aliases: HashMap<String, usize>,
    keywords: Vec<Vec<String>>,
}

impl Vocabulary {
    fn resolve(&self, raw: &str) -> Resolution {
        let label = normalize_label(raw);
        if label.is_empty() {
            return Resolution::UNMAPPED;
        }
        let hit = |column: usize, method| Resolution {
            column: Some(column),
            method,
        };

        if let Some(i) = self.names.iter().position(|n| *n == label) {
            return hit(i, MatchMethod::Exact);
        }
        if let Some(&i) = self.aliases.get(&label) {
            return hit(i, MatchMethod::Alias);
        }

        let label_len = label.chars().count();
        if let Some(i) = self
            .names
            .iter()
            .position(|n| label.contains(n.as_str()) || (label_len >= 2 && n.contains(label.as_str())))
        {
            return hit(i, MatchMethod::Substring);
        }

        let lower = label.to_lowercase();
        let tokens: Vec<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        if let Some(i) = self
            .keywords
            .iter()
            .position(|kws| kws.iter().any(|k| keyword_matches(k, &lower, &tokens)))
        {
            return hit(i, MatchMethod::Keyword);
        }

        Resolution::UNMAPPED
    }
}

/// ASCII keywords match whole word tokens; others match by containment.
fn keyword_matches(keyword: &str, lower_label: &str, tokens: &[&str]) -> bool {
    if keyword.is_ascii() {
        tokens.contains(&keyword)
    } else {
        lower_label.contains(keyword)
    }
}

/// Trim and collapse any whitespace run (newlines included) to one space.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalized_keywords(keywords: &[String]) -> Vec<String> {
    keywords.iter().map(|k| normalize_label(k).to_lowercase()).collect()
}

// ---------------------------------------------------------------------------
// Resolver
// ---------------------------------------------------------------------------

/// Resolves labels against one taxonomy. Build once per taxonomy and share.
#[derive(Debug, Clone)]
pub struct ColumnResolver {
    columns: Vocabulary,
    tables: Vocabulary,
}

impl ColumnResolver {
    pub fn new(taxonomy: &Taxonomy) -> Self {
        let columns = Vocabulary {
            names: taxonomy.columns.iter().map(|c| normalize_label(&c.name)).collect(),
            aliases: taxonomy
                .aliases
                .iter()
                .filter_map(|(alias, target)| taxonomy.column_index(target).map(|i| (normalize_label(alias), i)))
                .collect(),
            keywords: taxonomy.columns.iter().map(|c| normalized_keywords(&c.keywords)).collect(),
        };

        let mut table_aliases = HashMap::new();
        for (i, table) in taxonomy.tables.iter().enumerate() {
            for alias in &table.aliases {
                table_aliases.entry(normalize_label(alias)).or_insert(i);
            }
        }
        let tables = Vocabulary {
            names: taxonomy.tables.iter().map(|t| normalize_label(&t.name)).collect(),
            aliases: table_aliases,
            keywords: taxonomy.tables.iter().map(|t| normalized_keywords(&t.keywords)).collect(),
        };

        Self { columns, tables }
    }

    pub fn resolve(&self, label: &str) -> Resolution {
        self.columns.resolve(label)
    }

    /// Slot of a table name in the business-table registry.
    pub fn resolve_table(&self, name: &str) -> Resolution {
        self.tables.resolve(name)
    }

    /// Resolve every label of a header. Unmapped labels are kept for reporting.
    pub fn map_columns<S: AsRef<str>>(&self, labels: &[S]) -> ColumnMapping {
        let mut mapping = ColumnMapping::default();
        for label in labels {
            let label = label.as_ref();
            let resolution = self.resolve(label);
            match resolution.column {
                Some(column) => mapping.resolved.push(MappedColumn {
                    label: label.to_string(),
                    column,
                    method: resolution.method,
                }),
                None => {
                    log::warn!("column '{label}' does not map to any canonical column");
                    mapping.unmapped.push(label.to_string());
                }
            }
        }
        mapping
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> (Taxonomy, ColumnResolver) {
        let t = Taxonomy::reference();
        let r = ColumnResolver::new(&t);
        (t, r)
    }

    fn name_of(t: &Taxonomy, res: Resolution) -> Option<&str> {
        res.column.map(|i| t.columns[i].name.as_str())
    }

    #[test]
    fn exact_names() {
        let (t, r) = resolver();
        for (i, column) in t.columns.iter().enumerate() {
            let res = r.resolve(&column.name);
            assert_eq!(res.column, Some(i));
            assert_eq!(res.method, MatchMethod::Exact);
        }
        assert_eq!(r.resolve("  负责人 ").method, MatchMethod::Exact);
    }

    #[test]
    fn aliases_beat_substring() {
        let (t, r) = resolver();
        let res = r.resolve("复盘时间");
        assert_eq!(name_of(&t, res), Some("最新复盘时间"));
        assert_eq!(res.method, MatchMethod::Alias);

        let res = r.resolve("计划输出思路\n8/28");
        assert_eq!(name_of(&t, res), Some("序号"));
        assert_eq!(res.method, MatchMethod::Alias);

        assert_eq!(name_of(&t, r.resolve("执行人")), Some("负责人"));
    }

    #[test]
    fn substring_both_directions() {
        let (t, r) = resolver();
        let res = r.resolve("项目负责人");
        assert_eq!(name_of(&t, res), Some("负责人"));
        assert_eq!(res.method, MatchMethod::Substring);

        let res = r.resolve("复盘");
        assert_eq!(name_of(&t, res), Some("经理分析复盘"));
        assert_eq!(res.method, MatchMethod::Substring);
    }

    #[test]
    fn single_char_label_is_not_a_substring_match() {
        let (_, r) = resolver();
        // "人" sits inside 负责人/协助人/监督人 but is too short to mean anything.
        assert_eq!(r.resolve("人").method, MatchMethod::Unmapped);
    }

    #[test]
    fn keywords() {
        let (t, r) = resolver();
        let res = r.resolve("Owner");
        assert_eq!(name_of(&t, res), Some("负责人"));
        assert_eq!(res.method, MatchMethod::Keyword);
        assert_eq!(name_of(&t, r.resolve("priority level")), Some("重要程度"));
        assert_eq!(name_of(&t, r.resolve("Due date")), Some("预计完成时间"));
        assert_eq!(name_of(&t, r.resolve("优先级")), Some("重要程度"));
    }

    #[test]
    fn ascii_keywords_need_whole_words() {
        let (t, r) = resolver();
        // "id" must not fire inside "guidance"
        assert_eq!(name_of(&t, r.resolve("guidance")), Some("邓总指导登记"));
        assert_eq!(name_of(&t, r.resolve("row id")), Some("序号"));
        assert_eq!(r.resolve("ownership").method, MatchMethod::Unmapped);
    }

    #[test]
    fn ties_go_to_the_earlier_column() {
        let (t, r) = resolver();
        // 时间 (任务发起时间) is declared before 结束 (预计完成时间)
        assert_eq!(name_of(&t, r.resolve("结束时间")), Some("任务发起时间"));
    }

    #[test]
    fn unmapped_labels_are_reported() {
        let (_, r) = resolver();
        let mapping = r.map_columns(&["负责人", "rating", "", "Owner"]);
        assert_eq!(mapping.resolved.len(), 2);
        assert_eq!(mapping.unmapped, vec!["rating".to_string(), String::new()]);
        assert_eq!(mapping.resolved[1].method, MatchMethod::Keyword);
    }

    #[test]
    fn tables() {
        let (_, r) = resolver();
        assert_eq!(r.resolve_table("出国销售计划表").column, Some(0));
        assert_eq!(r.resolve_table("出国销售计划表").method, MatchMethod::Exact);
        assert_eq!(r.resolve_table("出国销售表").method, MatchMethod::Alias);
        let res = r.resolve_table("副本-测试版本-回国销售计划表-工作表1");
        assert_eq!(res.column, Some(1));
        assert_eq!(res.method, MatchMethod::Substring);
        let res = r.resolve_table("小红书运营周报");
        assert_eq!(res.column, Some(2));
        assert_eq!(res.method, MatchMethod::Keyword);
        assert!(!r.resolve_table("财务报表").is_mapped());
    }

    #[test]
    fn label_normalization() {
        assert_eq!(normalize_label("  a \n b\t c "), "a b c");
        assert_eq!(normalize_label("   "), "");
    }
}
