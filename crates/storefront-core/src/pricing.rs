//! # Pricing Engine
//!
//! Derives the two selling prices of a product from its cost and its
//! manufacturer.
//!
//! ## Where Prices Come From
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Admin form                                                             │
//! │    manufacturer: 13      cost: "100"                                    │
//! │         │                   │                                           │
//! │         ▼                   ▼                                           │
//! │  PricingTable::rule_for("13") ──► MarkupRule::A                         │
//! │                                        │                                │
//! │                                        ▼                                │
//! │  parse_cost("100") ──► 100 ──► MarkupRule::A.apply(100)                 │
//! │                                        │                                │
//! │                                        ▼                                │
//! │            exact decimals: 105.84 / 10.85                               │
//! │                                        │                                │
//! │                                        ▼ half-up to cents               │
//! │            DerivedPrices { dozen: $105.84, offer: $10.85 }              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rule Table
//!
//! | Rule     | dozen price               | offer price                 |
//! |----------|---------------------------|-----------------------------|
//! | A        | cost×0.75×1.12×1.26       | (cost×0.75×1.12)/12×1.55    |
//! | B        | cost×0.80×1.07×12×1.30    | cost×0.80×1.07×1.50         |
//! | C        | cost×1.25                 | cost×1.30                   |
//! | D        | cost×0.88×1.26            | cost×0.88×1.55              |
//! | standard | cost×1.30                 | (cost/12)×1.60              |
//!
//! Built-in manufacturer mapping: `13→A`, `16→B`, `17→C`, `28→D`, `29→C`.
//! Anything else falls back to the standard rule.
//!
//! ## Purity
//! Nothing in this module touches I/O. It is safe to call on every keystroke
//! of the admin form. Loading a rule file from disk is the caller's job;
//! [`PricingTable::from_toml_str`] only parses text.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::PricingError;
use crate::money::Money;

// =============================================================================
// Markup Rules
// =============================================================================

/// A manufacturer-specific markup formula.
///
/// Rules are named by letter. Several manufacturers may share a rule
/// (`17` and `29` both use [`MarkupRule::C`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum MarkupRule {
    /// Discounted cost with a 1.26 dozen markup; offer is per unit.
    A,
    /// Dozen price is twelve discounted units marked up 1.30.
    B,
    /// Flat 1.25 / 1.30 markup.
    C,
    /// Discounted cost with 1.26 / 1.55 markup.
    D,
    /// Fallback for manufacturers without a dedicated rule.
    Standard,
}

impl MarkupRule {
    /// Evaluates the rule on an exact cost.
    ///
    /// Returns `(dozen_price, offer_price)` unrounded, or `None` when the
    /// arithmetic overflows.
    pub fn apply(self, cost: Decimal) -> Option<(Decimal, Decimal)> {
        let twelve = Decimal::from(12);

        match self {
            MarkupRule::A => {
                let base = cost.checked_mul(dec(75, 2))?.checked_mul(dec(112, 2))?;
                let dozen = base.checked_mul(dec(126, 2))?;
                let offer = base.checked_mul(dec(155, 2))?.checked_div(twelve)?;
                Some((dozen, offer))
            }
            MarkupRule::B => {
                let base = cost.checked_mul(dec(80, 2))?.checked_mul(dec(107, 2))?;
                let dozen = base.checked_mul(twelve)?.checked_mul(dec(130, 2))?;
                let offer = base.checked_mul(dec(150, 2))?;
                Some((dozen, offer))
            }
            MarkupRule::C => {
                let dozen = cost.checked_mul(dec(125, 2))?;
                let offer = cost.checked_mul(dec(130, 2))?;
                Some((dozen, offer))
            }
            MarkupRule::D => {
                let base = cost.checked_mul(dec(88, 2))?;
                let dozen = base.checked_mul(dec(126, 2))?;
                let offer = base.checked_mul(dec(155, 2))?;
                Some((dozen, offer))
            }
            MarkupRule::Standard => {
                let dozen = cost.checked_mul(dec(130, 2))?;
                let offer = cost.checked_mul(dec(160, 2))?.checked_div(twelve)?;
                Some((dozen, offer))
            }
        }
    }

    /// Short name used in rule files and logs.
    pub const fn name(self) -> &'static str {
        match self {
            MarkupRule::A => "A",
            MarkupRule::B => "B",
            MarkupRule::C => "C",
            MarkupRule::D => "D",
            MarkupRule::Standard => "standard",
        }
    }
}

#[inline]
fn dec(num: i64, scale: u32) -> Decimal {
    Decimal::new(num, scale)
}

impl fmt::Display for MarkupRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MarkupRule {
    type Err = PricingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(MarkupRule::A),
            "b" => Ok(MarkupRule::B),
            "c" | "e" => Ok(MarkupRule::C),
            "d" => Ok(MarkupRule::D),
            "standard" | "default" => Ok(MarkupRule::Standard),
            _ => Err(PricingError::UnknownRule(s.to_string())),
        }
    }
}

impl TryFrom<String> for MarkupRule {
    type Error = PricingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MarkupRule> for String {
    fn from(rule: MarkupRule) -> Self {
        rule.name().to_string()
    }
}

// =============================================================================
// Derived Prices
// =============================================================================

/// The two selling prices of a product, rounded half-up to cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DerivedPrices {
    /// Standard (dozen) price.
    pub dozen_price: Money,
    /// Promotional price.
    pub offer_price: Money,
}

// =============================================================================
// Cost Parsing
// =============================================================================

/// Parses raw cost text into an exact decimal.
///
/// Accepts plain (`"100"`, `" 12.5 "`, `"-3"`) and scientific (`"1e3"`)
/// notation. Anything else, including `""`, `"NaN"` and `"inf"`, is `None`.
///
/// ## Example
/// ```rust
/// use storefront_core::pricing::parse_cost;
///
/// assert!(parse_cost("100").is_some());
/// assert!(parse_cost("abc").is_none());
/// assert!(parse_cost("").is_none());
/// ```
pub fn parse_cost(raw: &str) -> Option<Decimal> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    // `Decimal::from_str` skips `_` separators; a cost is digits only.
    if !raw
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'))
    {
        return None;
    }

    Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()
}

// =============================================================================
// Pricing Table
// =============================================================================

/// Explicit mapping from manufacturer id to markup rule.
///
/// ## Lookup Order
/// 1. Exact manufacturer id (`"13"`)
/// 2. Rule letter (`"A"`), so rules can be addressed directly
/// 3. The table's default rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingTable {
    rules: HashMap<String, MarkupRule>,
    default_rule: MarkupRule,
}

/// Shape of a TOML rule file.
///
/// ```toml
/// default = "standard"
/// replace_builtin = false
///
/// [manufacturers]
/// "13" = "A"
/// "42" = "C"
/// ```
#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    default: Option<MarkupRule>,
    #[serde(default)]
    replace_builtin: bool,
    #[serde(default)]
    manufacturers: HashMap<String, MarkupRule>,
}

impl PricingTable {
    /// Creates an empty table where every manufacturer uses `default_rule`.
    pub fn new(default_rule: MarkupRule) -> Self {
        PricingTable {
            rules: HashMap::new(),
            default_rule,
        }
    }

    /// The storefront's built-in manufacturer mapping.
    pub fn builtin() -> Self {
        PricingTable::new(MarkupRule::Standard)
            .with_rule("13", MarkupRule::A)
            .with_rule("16", MarkupRule::B)
            .with_rule("17", MarkupRule::C)
            .with_rule("28", MarkupRule::D)
            .with_rule("29", MarkupRule::C)
    }

    /// Adds or replaces the rule for one manufacturer.
    pub fn with_rule(mut self, manufacturer_id: impl Into<String>, rule: MarkupRule) -> Self {
        self.rules.insert(manufacturer_id.into(), rule);
        self
    }

    /// Builds a table from a TOML rule file.
    ///
    /// Entries are layered over [`PricingTable::builtin`] unless the file sets
    /// `replace_builtin = true`.
    pub fn from_toml_str(source: &str) -> Result<Self, PricingError> {
        let file: RuleFile = toml::from_str(source)?;

        let mut table = if file.replace_builtin {
            PricingTable::new(MarkupRule::Standard)
        } else {
            PricingTable::builtin()
        };

        if let Some(default_rule) = file.default {
            table.default_rule = default_rule;
        }
        for (manufacturer_id, rule) in file.manufacturers {
            table.rules.insert(manufacturer_id.trim().to_string(), rule);
        }

        Ok(table)
    }

    /// Returns the rule used when no mapping matches.
    pub fn default_rule(&self) -> MarkupRule {
        self.default_rule
    }

    /// Number of explicit manufacturer mappings.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when only the default rule applies.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Selects the rule for a manufacturer. Never fails.
    pub fn rule_for(&self, manufacturer_id: &str) -> MarkupRule {
        let key = manufacturer_id.trim();

        if let Some(rule) = self.rules.get(key) {
            return *rule;
        }

        match key {
            "A" | "B" | "C" | "D" => key.parse().unwrap_or(self.default_rule),
            _ => self.default_rule,
        }
    }

    /// Derives both selling prices from raw cost text.
    ///
    /// ## Returns
    /// * `Some(DerivedPrices)` - cost parsed and the formula fit in range
    /// * `None` - the "undefined price": cost not numeric, or overflow
    ///
    /// ## Example
    /// ```rust
    /// use storefront_core::pricing::PricingTable;
    ///
    /// let table = PricingTable::builtin();
    /// let prices = table.derive_prices("13", "100").unwrap();
    /// assert_eq!(prices.dozen_price.cents(), 10584);
    /// assert_eq!(prices.offer_price.cents(), 1085);
    ///
    /// assert!(table.derive_prices("13", "abc").is_none());
    /// ```
    pub fn derive_prices(&self, manufacturer_id: &str, cost: &str) -> Option<DerivedPrices> {
        let cost = parse_cost(cost)?;
        self.derive_from_decimal(manufacturer_id, cost)
    }

    /// Same as [`PricingTable::derive_prices`] for an already-parsed cost.
    pub fn derive_from_decimal(&self, manufacturer_id: &str, cost: Decimal) -> Option<DerivedPrices> {
        let (dozen, offer) = self.rule_for(manufacturer_id).apply(cost)?;

        Some(DerivedPrices {
            dozen_price: Money::from_decimal(dozen)?,
            offer_price: Money::from_decimal(offer)?,
        })
    }
}

impl Default for PricingTable {
    fn default() -> Self {
        PricingTable::builtin()
    }
}

/// Derives prices with the built-in table.
///
/// Convenience for callers that never load a rule file.
pub fn derive_prices(manufacturer_id: &str, cost: &str) -> Option<DerivedPrices> {
    static BUILTIN: OnceLock<PricingTable> = OnceLock::new();
    BUILTIN
        .get_or_init(PricingTable::builtin)
        .derive_prices(manufacturer_id, cost)
}

// =============================================================================
// Unit Tests
// =============================================================================
