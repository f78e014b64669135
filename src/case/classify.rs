//! Heuristic classification: entity families, condition patterns, confidence.
//!
//! The entity table is an ordered list of `(EntityType, patterns)` pairs;
//! the first family whose pattern matches the tested column name wins, so
//! table order is the tie-break. Column names are lowercased before matching
//! and the patterns are written in lowercase.
//!
//! When the column name says nothing, result values are scanned against
//! per-statement-type financial keyword dictionaries; three or more hits in
//! any one dictionary is strong enough evidence to call the CASE an account
//! classification.

use std::sync::LazyLock;

use regex::Regex;

use super::condition::{CaseCondition, ConditionOperator};
use super::types::{CaseWhen, ConditionPattern, EntityType};

// =============================================================================
// Entity classification
// =============================================================================

/// Ordered entity-family table. First match wins.
static ENTITY_PATTERNS: LazyLock<Vec<(EntityType, Vec<Regex>)>> = LazyLock::new(|| {
    fn family(entity: EntityType, patterns: &[&str]) -> (EntityType, Vec<Regex>) {
        let compiled = patterns
            .iter()
            .map(|p| Regex::new(p).expect("static entity pattern"))
            .collect();
        (entity, compiled)
    }

    vec![
        family(
            EntityType::Account,
            &[
                r"account[_\s]*(code|id|num|name)?",
                r"gl[_\s]*(account|code)",
                r"\bacct",
            ],
        ),
        family(
            EntityType::CostCenter,
            &[
                r"cost[_\s]*cent(er|re)",
                r"\bcc[_\s]*(code|id|num)",
                r"costcenter",
            ],
        ),
        family(
            EntityType::Department,
            &[r"department[_\s]*(code|id|name)?", r"\bdept", r"division"],
        ),
        family(
            EntityType::Entity,
            &[
                r"entity[_\s]*(code|id|name)?",
                r"company[_\s]*(code|id)?",
                r"legal[_\s]*entity",
                r"subsidiary",
            ],
        ),
        family(
            EntityType::Project,
            &[
                r"project[_\s]*(code|id|num|name)?",
                r"\bproj[_\s]*(code|id)",
                r"job[_\s]*(code|num)",
            ],
        ),
        family(
            EntityType::Product,
            &[
                r"product[_\s]*(code|id|name)?",
                r"item[_\s]*(code|id|num)",
                r"\bsku\b",
            ],
        ),
        family(
            EntityType::Customer,
            &[
                r"customer[_\s]*(code|id|num|name)?",
                r"\bcust[_\s]*(code|id)",
                r"client[_\s]*(code|id|name)?",
            ],
        ),
        family(
            EntityType::Vendor,
            &[
                r"vendor[_\s]*(code|id|num|name)?",
                r"supplier[_\s]*(code|id)?",
                r"\bpayee",
            ],
        ),
        family(
            EntityType::Employee,
            &[
                r"employee[_\s]*(code|id|num|name)?",
                r"\bemp[_\s]*(code|id|num)",
                r"worker[_\s]*id",
                r"staff[_\s]*id",
            ],
        ),
        family(
            EntityType::Location,
            &[
                r"location[_\s]*(code|id|name)?",
                r"\bloc[_\s]*(code|id)",
                r"site[_\s]*(code|id)?",
                r"\bregion",
                r"\bbranch",
            ],
        ),
        family(
            EntityType::TimePeriod,
            &[
                r"fiscal[_\s]*(year|quarter|month|period)",
                r"\bperiod",
                r"\bmonth\b",
                r"\bquarter\b",
                r"\byear\b",
            ],
        ),
        family(
            EntityType::Currency,
            &[r"currency[_\s]*(code)?", r"\bcurr[_\s]*code", r"iso[_\s]*code"],
        ),
    ]
});

/// Financial keyword dictionaries, one per statement family. A CASE whose
/// result values hit three or more keywords in any one dictionary is
/// classifying accounts even when the column name says nothing.
static FINANCIAL_KEYWORDS: LazyLock<Vec<(&'static str, Vec<&'static str>)>> =
    LazyLock::new(|| {
        vec![
            (
                "balance_sheet",
                vec![
                    "asset",
                    "liability",
                    "liabilities",
                    "equity",
                    "cash",
                    "receivable",
                    "payable",
                    "inventory",
                    "accrual",
                    "prepaid",
                    "goodwill",
                    "debt",
                    "retained earnings",
                    "capital",
                ],
            ),
            (
                "income_statement",
                vec![
                    "revenue",
                    "sales",
                    "income",
                    "expense",
                    "cogs",
                    "cost of goods",
                    "gross profit",
                    "operating",
                    "ebitda",
                    "depreciation",
                    "amortization",
                    "interest",
                    "tax",
                    "margin",
                ],
            ),
            (
                "oil_gas_los",
                vec![
                    "lease operating",
                    "loe",
                    "workover",
                    "severance",
                    "gathering",
                    "processing",
                    "transportation",
                    "royalt",
                    "drilling",
                    "completion",
                    "ngl",
                    "wellhead",
                ],
            ),
        ]
    });

/// Classify the entity family tested by a CASE.
///
/// Matches `input_column` (lowercased) against the ordered entity table; if
/// nothing matches, falls back to scanning the result values against the
/// financial keyword dictionaries.
pub fn classify_entity(input_column: &str, result_values: &[String]) -> EntityType {
    let column = input_column.to_lowercase();
    if !column.is_empty() {
        for (entity, patterns) in ENTITY_PATTERNS.iter() {
            if patterns.iter().any(|p| p.is_match(&column)) {
                return *entity;
            }
        }
    }
    classify_by_keywords(result_values).unwrap_or_default()
}

/// Keyword fallback: >=3 hits in any one dictionary classifies as Account.
fn classify_by_keywords(result_values: &[String]) -> Option<EntityType> {
    let lowered: Vec<String> = result_values.iter().map(|v| v.to_lowercase()).collect();
    for (_, keywords) in FINANCIAL_KEYWORDS.iter() {
        let hits = keywords
            .iter()
            .filter(|kw| lowered.iter().any(|v| v.contains(*kw)))
            .count();
        if hits >= 3 {
            return Some(EntityType::Account);
        }
    }
    None
}

// =============================================================================
// Pattern classification
// =============================================================================

/// Classify one LIKE/ILIKE pattern value by its wildcard placement.
fn like_pattern(value: &str) -> ConditionPattern {
    let starts = value.starts_with('%');
    let ends = value.ends_with('%') && value.len() > 1;
    match (starts, ends) {
        (true, true) => ConditionPattern::Contains,
        (true, false) => ConditionPattern::Suffix,
        (false, true) => ConditionPattern::Prefix,
        (false, false) => ConditionPattern::Exact,
    }
}

/// Tally condition styles across all WHEN clauses and pick the dominant one.
///
/// Ties favor the pattern counted first; no WHEN clauses yields `None`.
pub fn classify_pattern(when_clauses: &[CaseWhen]) -> Option<ConditionPattern> {
    let mut tally: Vec<(ConditionPattern, usize)> = Vec::new();
    let mut bump = |tally: &mut Vec<(ConditionPattern, usize)>, pattern, by: usize| {
        if by == 0 {
            return;
        }
        if let Some(entry) = tally.iter_mut().find(|(p, _)| *p == pattern) {
            entry.1 += by;
        } else {
            tally.push((pattern, by));
        }
    };

    for when in when_clauses {
        for leaf in when.condition.leaves() {
            let CaseCondition::Leaf {
                operator, values, ..
            } = leaf
            else {
                continue;
            };
            match operator {
                ConditionOperator::Like | ConditionOperator::ILike => {
                    for value in values {
                        bump(&mut tally, like_pattern(value), 1);
                    }
                }
                ConditionOperator::In => {
                    bump(&mut tally, ConditionPattern::ExactList, values.len().max(1));
                }
                ConditionOperator::Equals => {
                    bump(&mut tally, ConditionPattern::Exact, 1);
                }
                ConditionOperator::Between => {
                    bump(&mut tally, ConditionPattern::Range, 1);
                }
                _ => {}
            }
        }
    }

    tally
        .into_iter()
        .reduce(|best, candidate| if candidate.1 > best.1 { candidate } else { best })
        .map(|(pattern, _)| pattern)
}

// =============================================================================
// Confidence scoring
// =============================================================================

/// Compute a `[0, 1]` confidence score plus one note per contributing factor.
///
/// Base 0.5; +0.2 for >=10 comparisons (else +0.1 for >=5); +0.15 for a known
/// entity type; +0.1 for a detected pattern; +0.1 when distinct outputs /
/// comparisons < 0.5 (a rollup); +0.1 when a parent edge was inferred
/// (hierarchy-level scoring only). Clamped to 1.0.
pub fn confidence_score(
    condition_count: usize,
    entity_type: EntityType,
    pattern: Option<ConditionPattern>,
    unique_result_count: usize,
    inferred_parent_edge: bool,
) -> (f64, Vec<String>) {
    let mut score: f64 = 0.5;
    let mut notes = vec!["base confidence 0.50".to_string()];

    if condition_count >= 10 {
        score += 0.2;
        notes.push(format!("{condition_count} conditions adds 0.20"));
    } else if condition_count >= 5 {
        score += 0.1;
        notes.push(format!("{condition_count} conditions adds 0.10"));
    }

    if entity_type != EntityType::Unknown {
        score += 0.15;
        notes.push(format!("entity type '{entity_type}' adds 0.15"));
    }

    if let Some(pattern) = pattern {
        score += 0.1;
        notes.push(format!("detected '{pattern}' pattern adds 0.10"));
    }

    if condition_count > 0 {
        let ratio = unique_result_count as f64 / condition_count as f64;
        if ratio < 0.5 {
            score += 0.1;
            notes.push(format!(
                "{unique_result_count} outputs from {condition_count} inputs (rollup) adds 0.10"
            ));
        }
    }

    if inferred_parent_edge {
        score += 0.1;
        notes.push("inferred parent-child structure adds 0.10".to_string());
    }

    (score.min(1.0), notes)
}
