use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Currencies the dashboard can render, with their display conventions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    /// Indian Rupee, the institute's home currency (lakh/crore digit grouping)
    INR,
    /// US Dollar (thousands grouping)
    USD,
}

impl Default for Currency {
    fn default() -> Self {
        Currency::INR
    }
}

impl Currency {
    /// Returns the decimal scale used for display. Both currencies show paise/cents.
    pub fn scale(&self) -> u32 {
        2
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::INR => "₹",
            Currency::USD => "$",
        }
    }

    /// Rounds a value half away from zero to the display scale
    pub fn round(&self, amount: Decimal) -> Decimal {
        amount.round_dp_with_strategy(self.scale(), RoundingStrategy::MidpointAwayFromZero)
    }

    /// Formats an amount as a localized currency string, e.g. `₹1,20,000.00`
    pub fn format_amount(&self, amount: Decimal) -> String {
        let rounded = self.round(amount);
        let negative = rounded.is_sign_negative() && !rounded.is_zero();
        let digits = format!("{:.width$}", rounded.abs(), width = self.scale() as usize);

        let (whole, fraction) = match digits.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (digits.as_str(), None),
        };

        let grouped = match self {
            Currency::INR => group_indian(whole),
            Currency::USD => group_thousands(whole),
        };

        let mut out = String::with_capacity(grouped.len() + 8);
        if negative {
            out.push('-');
        }
        out.push_str(self.symbol());
        out.push_str(&grouped);
        if let Some(fraction) = fraction {
            out.push('.');
            out.push_str(fraction);
        }
        out
    }

    /// Formats an amount without symbol or grouping, for machine-readable exports
    pub fn format_plain(&self, amount: Decimal) -> String {
        format!("{:.width$}", self.round(amount), width = self.scale() as usize)
    }
}

/// `1234567` -> `12,34,567`
fn group_indian(whole: &str) -> String {
    if whole.len() <= 3 {
        return whole.to_string();
    }
    let (head, tail) = whole.split_at(whole.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

/// `1234567` -> `1,234,567`
fn group_thousands(whole: &str) -> String {
    let mut groups: Vec<&str> = Vec::new();
    let mut end = whole.len();
    while end > 0 {
        let start = end.saturating_sub(3);
        groups.push(&whole[start..end]);
        end = start;
    }
    groups.reverse();
    groups.join(",")
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Currency::INR => write!(f, "INR"),
            Currency::USD => write!(f, "USD"),
        }
    }
}

impl std::str::FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "INR" => Ok(Currency::INR),
            "USD" => Ok(Currency::USD),
            _ => Err(format!("Invalid currency: {}", s)),
        }
    }
}
