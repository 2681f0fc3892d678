//! 偏见用语检测
//!
//! 关键词表按类别匹配（忽略大小写、按单词边界），每处命中扣 0.1 分。

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

define_string_enum! {
    BiasCategory {
        Gender => "gender",
        Age => "age",
        Ability => "ability",
        Cultural => "cultural",
        Socioeconomic => "socioeconomic",
    }
}

const PENALTY_PER_HIT: f64 = 0.1;

// (类别, 词语, 建议替换)
const BIAS_TERMS: &[(BiasCategory, &str, &str)] = &[
    (BiasCategory::Gender, "chairman", "chairperson"),
    (BiasCategory::Gender, "mankind", "humankind"),
    (BiasCategory::Gender, "manpower", "workforce"),
    (BiasCategory::Gender, "man-made", "artificial"),
    (BiasCategory::Gender, "policeman", "police officer"),
    (BiasCategory::Gender, "fireman", "firefighter"),
    (BiasCategory::Gender, "businessman", "businessperson"),
    (BiasCategory::Gender, "housewife", "homemaker"),
    (BiasCategory::Gender, "you guys", "everyone"),
    (BiasCategory::Age, "old people", "older adults"),
    (BiasCategory::Age, "the elderly", "older adults"),
    (BiasCategory::Age, "senile", "experiencing cognitive decline"),
    (BiasCategory::Age, "too old to", "less familiar with"),
    (BiasCategory::Age, "over the hill", "experienced"),
    (BiasCategory::Ability, "crazy", "surprising"),
    (BiasCategory::Ability, "insane", "extreme"),
    (BiasCategory::Ability, "lame", "weak"),
    (BiasCategory::Ability, "dumb", "uninformed"),
    (BiasCategory::Ability, "retarded", "delayed"),
    (BiasCategory::Ability, "crippled", "impaired"),
    (BiasCategory::Ability, "wheelchair-bound", "wheelchair user"),
    (BiasCategory::Ability, "blind to", "unaware of"),
    (BiasCategory::Cultural, "exotic", "unfamiliar"),
    (BiasCategory::Cultural, "third world", "developing countries"),
    (BiasCategory::Cultural, "primitive", "early"),
    (BiasCategory::Cultural, "oriental", "East Asian"),
    (BiasCategory::Cultural, "normal people", "most people"),
    (BiasCategory::Socioeconomic, "ghetto", "under-resourced neighborhood"),
    (BiasCategory::Socioeconomic, "poor people", "people with low income"),
    (BiasCategory::Socioeconomic, "low-class", "low-income"),
    (BiasCategory::Socioeconomic, "trailer trash", "people living in poverty"),
    (BiasCategory::Socioeconomic, "welfare queen", "person receiving assistance"),
];

static BIAS_PATTERNS: Lazy<Vec<(BiasCategory, &'static str, &'static str, Regex)>> =
    Lazy::new(|| {
        BIAS_TERMS
            .iter()
            .map(|(category, term, suggestion)| {
                let pattern = format!(r"(?i)\b{}\b", regex::escape(term));
                let re = Regex::new(&pattern).expect("Invalid bias term regex");
                (*category, *term, *suggestion, re)
            })
            .collect()
    });

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasFinding {
    pub category: BiasCategory,
    pub term: String,
    pub occurrences: usize,
    pub suggestion: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiasReport {
    pub score: f64,
    pub total_hits: usize,
    pub findings: Vec<BiasFinding>,
}

pub fn analyze(text: &str) -> BiasReport {
    let mut findings = Vec::new();
    let mut total_hits = 0;

    for (category, term, suggestion, re) in BIAS_PATTERNS.iter() {
        let occurrences = re.find_iter(text).count();
        if occurrences > 0 {
            total_hits += occurrences;
            findings.push(BiasFinding {
                category: *category,
                term: (*term).to_string(),
                occurrences,
                suggestion: (*suggestion).to_string(),
            });
        }
    }

    BiasReport {
        score: (1.0 - PENALTY_PER_HIT * total_hits as f64).max(0.0),
        total_hits,
        findings,
    }
}
