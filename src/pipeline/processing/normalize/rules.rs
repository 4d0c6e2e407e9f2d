use serde::{Deserialize, Serialize};

use crate::domain::MoneyKind;

/// Placeholder expanded to the shared amount grammar inside a rule pattern
pub const AMOUNT_PLACEHOLDER: &str = "{amount}";

/// A number with optional thousands separators, decimals and a magnitude
/// suffix. The suffix must end on a word boundary so `$500 Monthly` does not
/// read as 500M.
pub const AMOUNT_PATTERN: &str =
    r"(?P<amount>(?:\d[\d,]*(?:\.\d+)?|\.\d+)(?:\s*(?:thousand|million|billion|[kmb])\b)?)";

/// Gap allowed between a label and its amount: an optional parenthetical,
/// separators, and an optional currency marker
const LABEL_GAP: &str = r"(?:\s*\([^)]{0,20}\))?[\s:=\-]*(?:usd\s*)?\$?\s*";

/// A single extraction rule. Rules for a kind are tried in list order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternRule {
    /// Short identifier used in logs and tests
    pub name: String,
    /// Regex source, matched case-insensitively; may contain `{amount}`
    pub pattern: String,
}

impl PatternRule {
    pub fn new(name: &str, pattern: &str) -> Self {
        Self {
            name: name.to_string(),
            pattern: pattern.to_string(),
        }
    }

    /// Rule for an amount that follows a label, e.g. `Cash Flow (SDE): $130K`
    pub fn labeled(name: &str, label: &str) -> Self {
        Self::new(
            name,
            &format!(r"\b(?:{label})\b{LABEL_GAP}{AMOUNT_PLACEHOLDER}"),
        )
    }

    /// Rule for an amount that precedes a label, e.g. `$2.1M in revenue`
    pub fn trailing_label(name: &str, label: &str) -> Self {
        Self::new(
            name,
            &format!(r"\$?\s*{AMOUNT_PLACEHOLDER}\s*(?:in\s+)?(?:annual\s+)?(?:{label})\b"),
        )
    }

    /// Pattern source with the amount placeholder expanded
    pub fn expanded(&self) -> String {
        self.pattern.replace(AMOUNT_PLACEHOLDER, AMOUNT_PATTERN)
    }
}

/// Per-kind rule lists from configuration. A present list replaces the
/// built-in list for that kind entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternOverrides {
    pub price: Option<Vec<PatternRule>>,
    pub revenue: Option<Vec<PatternRule>>,
    pub profit: Option<Vec<PatternRule>>,
}

impl PatternOverrides {
    pub fn for_kind(&self, kind: MoneyKind) -> Option<&[PatternRule]> {
        match kind {
            MoneyKind::Price => self.price.as_deref(),
            MoneyKind::Revenue => self.revenue.as_deref(),
            MoneyKind::Profit => self.profit.as_deref(),
        }
    }
}

/// Rules shared by every kind, consulted only after the labeled ones. The
/// last one takes any amount in the text, words around it included.
pub fn fallback_rules() -> Vec<PatternRule> {
    vec![
        PatternRule::new("dollar_amount", &format!(r"\$\s*{AMOUNT_PLACEHOLDER}")),
        PatternRule::new("usd_amount", &format!(r"\busd\s*\$?\s*{AMOUNT_PLACEHOLDER}")),
        PatternRule::new("lone_amount", &format!(r"^\W*{AMOUNT_PLACEHOLDER}\W*$")),
        PatternRule::new("bare_amount", AMOUNT_PLACEHOLDER),
    ]
}

/// Built-in priority list for a kind
pub fn default_rules(kind: MoneyKind) -> Vec<PatternRule> {
    let mut rules = match kind {
        MoneyKind::Price => vec![
            PatternRule::labeled("asking_price", r"asking\s*price"),
            PatternRule::labeled("price", "price"),
            PatternRule::labeled("asking", "asking"),
            PatternRule::labeled("listed_at", r"listed\s+(?:at|for)"),
        ],
        MoneyKind::Revenue => vec![
            PatternRule::labeled("gross_revenue", r"gross\s*(?:sales|revenue)"),
            PatternRule::labeled("annual_revenue", r"annual\s*(?:revenue|sales)"),
            PatternRule::labeled("ttm_revenue", r"ttm\s*(?:revenue|sales)"),
            PatternRule::labeled("trailing_twelve_months", r"trailing\s*twelve\s*months?"),
            PatternRule::labeled("revenue", "revenue"),
            PatternRule::labeled("sales", "sales"),
            PatternRule::labeled("gross", "gross"),
            PatternRule::trailing_label("amount_then_revenue", "revenue|sales|gross"),
        ],
        MoneyKind::Profit => vec![
            PatternRule::labeled("cash_flow", r"cash\s*flow"),
            PatternRule::labeled("seller_discretionary_earnings", r"seller\s*discretionary\s*earnings"),
            PatternRule::labeled("sde", "sde"),
            PatternRule::labeled("ebitda", "ebitda"),
            PatternRule::labeled("net_income", r"net\s*(?:income|profit)"),
            PatternRule::labeled("profit", "profit"),
            PatternRule::labeled("earnings", "earnings"),
            PatternRule::labeled("income", "income"),
            PatternRule::trailing_label("amount_then_profit", r"profit|cash\s*flow|sde"),
        ],
    };
    rules.extend(fallback_rules());
    rules
}
