//! Purchase terms shown on a composition page.
//!
//! The quote is static and non-binding: nothing is charged, reserved or
//! recorded.

use serde::Serialize;

use super::Composition;

pub const LICENSE_PRICE_CENTS: u64 = 1_000_000;
pub const LICENSE_CURRENCY: &str = "BRL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LicensedRight {
    Recording,
    Distribution,
    PublicPerformance,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Price {
    pub amount_cents: u64,
    pub currency: &'static str,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LicenseQuote {
    pub slug: &'static str,
    pub title: &'static str,
    pub exclusive: bool,
    pub rights: Vec<LicensedRight>,
    pub final_sale: bool,
    pub price: Price,
}

#[must_use]
pub fn license_quote(composition: &Composition) -> LicenseQuote {
    LicenseQuote {
        slug: composition.slug,
        title: composition.title,
        exclusive: true,
        rights: vec![LicensedRight::Recording, LicensedRight::Distribution, LicensedRight::PublicPerformance],
        final_sale: true,
        price: Price {
            amount_cents: LICENSE_PRICE_CENTS,
            currency: LICENSE_CURRENCY,
            display: format_brl(LICENSE_PRICE_CENTS),
        },
    }
}

/// `1_000_000` → `"R$ 10,000.00"`.
#[must_use]
pub fn format_brl(amount_cents: u64) -> String {
    let units = amount_cents / 100;
    let cents = amount_cents % 100;
    let digits = units.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("R$ {grouped}.{cents:02}")
}
