use regex::{Regex, RegexBuilder};
use std::collections::HashMap;

use super::rules::{default_rules, PatternOverrides, PatternRule};
use crate::domain::MoneyKind;
use crate::error::Result;

/// A rule compiled once at registry construction
#[derive(Debug, Clone)]
pub struct CompiledRule {
    pub name: String,
    pub regex: Regex,
}

impl CompiledRule {
    pub fn compile(rule: &PatternRule) -> Result<Self> {
        let regex = RegexBuilder::new(&rule.expanded())
            .case_insensitive(true)
            .build()?;
        Ok(Self {
            name: rule.name.clone(),
            regex,
        })
    }
}

/// Registry of ordered extraction rules per money kind
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: HashMap<MoneyKind, Vec<CompiledRule>>,
}

impl PatternRegistry {
    /// Create a registry from the built-in rule lists, replaced per kind by
    /// any configured override
    pub fn new(overrides: &PatternOverrides) -> Result<Self> {
        let mut rules = HashMap::new();

        for kind in MoneyKind::ALL {
            let source = match overrides.for_kind(kind) {
                Some(custom) => custom.to_vec(),
                None => default_rules(kind),
            };
            let compiled = source
                .iter()
                .map(CompiledRule::compile)
                .collect::<Result<Vec<_>>>()?;
            rules.insert(kind, compiled);
        }

        Ok(Self { rules })
    }

    /// Append a rule at the lowest priority for a kind
    pub fn register(&mut self, kind: MoneyKind, rule: &PatternRule) -> Result<()> {
        let compiled = CompiledRule::compile(rule)?;
        self.rules.entry(kind).or_default().push(compiled);
        Ok(())
    }

    /// Rules for a kind in priority order
    pub fn rules_for(&self, kind: MoneyKind) -> &[CompiledRule] {
        self.rules.get(&kind).map(|r| r.as_slice()).unwrap_or(&[])
    }

    /// Rule names for a kind, in priority order
    pub fn list_rules(&self, kind: MoneyKind) -> Vec<&str> {
        self.rules_for(kind).iter().map(|r| r.name.as_str()).collect()
    }
}
