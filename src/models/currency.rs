// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::{debug, warn};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Asia,
    Europe,
    Americas,
    MiddleEast,
    Africa,
    Oceania,
}

impl Region {
    pub fn name(&self) -> &'static str {
        match self {
            Region::Asia => "Asia",
            Region::Europe => "Europe",
            Region::Americas => "Americas",
            Region::MiddleEast => "Middle East",
            Region::Africa => "Africa",
            Region::Oceania => "Oceania",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    pub region: Region,
    pub is_popular: bool,
    /// Units of this currency per 1 USD
    pub conversion_rate: Decimal,
}

impl Currency {
    pub fn new(
        code: &str,
        name: &str,
        symbol: &str,
        region: Region,
        is_popular: bool,
        conversion_rate: Decimal,
    ) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            region,
            is_popular,
            conversion_rate,
        }
    }
}

/// Convert a USD amount into `currency`
pub fn convert_from_usd(currency: &Currency, usd_amount: Decimal) -> Result<Decimal> {
    usd_amount
        .checked_mul(currency.conversion_rate)
        .ok_or_else(|| Error::Overflow(format!("{} USD in {}", usd_amount, currency.code)))
}

/// Convert an amount in `currency` back into USD
pub fn convert_to_usd(currency: &Currency, local_amount: Decimal) -> Result<Decimal> {
    if currency.conversion_rate.is_zero() {
        return Err(Error::RateDivision(currency.code.clone()));
    }
    local_amount
        .checked_div(currency.conversion_rate)
        .ok_or_else(|| Error::Overflow(format!("{} {} in USD", local_amount, currency.code)))
}

/// Render `amount` with the currency's own symbol and exactly two decimals.
///
/// The symbol always comes from the catalogue entry, never from the host
/// locale, and no grouping separators are inserted.
pub fn format(currency: &Currency, amount: Decimal) -> String {
    let mut rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let negative = rounded.is_sign_negative() && !rounded.is_zero();
    rounded.set_sign_positive(true);

    // Padded by hand: at the top of the range there is no room to rescale
    let digits = rounded.to_string();
    let digits = match rounded.scale() {
        0 => format!("{}.00", digits),
        1 => format!("{}0", digits),
        _ => digits,
    };

    if negative {
        format!("-{}{}", currency.symbol, digits)
    } else {
        format!("{}{}", currency.symbol, digits)
    }
}

/// Outcome of applying a rate feed to the catalogue
#[derive(Debug, Default, Clone, PartialEq)]
pub struct RateUpdate {
    pub updated: Vec<String>,
    pub unknown: Vec<String>,
    pub rejected: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct Catalogue {
    currencies: Vec<Currency>,
}

impl Default for Catalogue {
    fn default() -> Self {
        Self {
            currencies: builtin_currencies(),
        }
    }
}

impl Catalogue {
    /// Build a catalogue from an explicit list, enforcing one entry per code
    /// and a strictly positive rate.
    pub fn from_currencies(currencies: Vec<Currency>) -> Result<Self> {
        let mut seen = HashSet::new();
        for currency in &currencies {
            if !seen.insert(currency.code.as_str()) {
                return Err(Error::InvalidArgument(format!(
                    "duplicate currency code {}",
                    currency.code
                )));
            }
            if currency.conversion_rate <= Decimal::ZERO {
                return Err(Error::InvalidArgument(format!(
                    "conversion rate for {} must be positive, got {}",
                    currency.code, currency.conversion_rate
                )));
            }
        }
        Ok(Self { currencies })
    }

    pub fn all(&self) -> &[Currency] {
        &self.currencies
    }

    pub fn len(&self) -> usize {
        self.currencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.currencies.is_empty()
    }

    pub fn lookup(&self, code: &str) -> Option<&Currency> {
        self.currencies.iter().find(|c| c.code == code)
    }

    pub fn require(&self, code: &str) -> Result<&Currency> {
        self.lookup(code).ok_or_else(|| Error::NotFound(code.to_string()))
    }

    pub fn popular(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter().filter(|c| c.is_popular)
    }

    pub fn additional(&self) -> impl Iterator<Item = &Currency> {
        self.currencies.iter().filter(|c| !c.is_popular)
    }

    pub fn by_region(&self, region: Region) -> impl Iterator<Item = &Currency> {
        self.currencies.iter().filter(move |c| c.region == region)
    }

    /// Format by code, degrading to `"<code> <amount>"` for unknown codes
    pub fn format_code(&self, code: &str, amount: Decimal) -> String {
        match self.lookup(code) {
            Some(currency) => format(currency, amount),
            None => {
                debug!(code, "unknown currency code, using plain formatting");
                format!("{} {}", code, amount)
            }
        }
    }

    /// Convert between two catalogue currencies by way of USD
    pub fn convert(&self, amount: Decimal, from_code: &str, to_code: &str) -> Result<Decimal> {
        let from = self.require(from_code)?;
        let to = self.require(to_code)?;
        if from.code == to.code {
            return Ok(amount);
        }
        let usd = convert_to_usd(from, amount)?;
        convert_from_usd(to, usd)
    }

    /// Overwrite rates from an external feed. Codes we don't carry and
    /// non-positive rates are skipped.
    pub fn apply_rates(&mut self, rates: &HashMap<String, Decimal>) -> RateUpdate {
        let mut update = RateUpdate::default();

        for (code, &rate) in rates {
            if rate <= Decimal::ZERO {
                warn!(code = code.as_str(), %rate, "rejecting non-positive rate");
                update.rejected.push(code.clone());
                continue;
            }
            match self.currencies.iter_mut().find(|c| &c.code == code) {
                Some(currency) => {
                    currency.conversion_rate = rate;
                    update.updated.push(code.clone());
                }
                None => update.unknown.push(code.clone()),
            }
        }

        update.updated.sort();
        update.unknown.sort();
        update.rejected.sort();
        update
    }
}

fn builtin_currencies() -> Vec<Currency> {
    use Region::*;

    vec![
        // Popular
        Currency::new("USD", "US Dollar", "$", Americas, true, dec!(1)),
        Currency::new("EUR", "Euro", "€", Europe, true, dec!(0.92)),
        Currency::new("GBP", "British Pound", "£", Europe, true, dec!(0.79)),
        Currency::new("INR", "Indian Rupee", "₹", Asia, true, dec!(83.12)),
        Currency::new("JPY", "Japanese Yen", "¥", Asia, true, dec!(149.50)),
        Currency::new("CNY", "Chinese Yuan", "¥", Asia, true, dec!(7.24)),
        Currency::new("AED", "UAE Dirham", "د.إ", MiddleEast, true, dec!(3.67)),
        Currency::new("SGD", "Singapore Dollar", "S$", Asia, true, dec!(1.34)),
        Currency::new("AUD", "Australian Dollar", "A$", Oceania, true, dec!(1.52)),
        Currency::new("CAD", "Canadian Dollar", "C$", Americas, true, dec!(1.36)),
        // Additional
        Currency::new("CHF", "Swiss Franc", "Fr", Europe, false, dec!(0.88)),
        Currency::new("SEK", "Swedish Krona", "kr", Europe, false, dec!(10.45)),
        Currency::new("NOK", "Norwegian Krone", "kr", Europe, false, dec!(10.68)),
        Currency::new("DKK", "Danish Krone", "kr", Europe, false, dec!(6.87)),
        Currency::new("PLN", "Polish Zloty", "zł", Europe, false, dec!(3.98)),
        Currency::new("CZK", "Czech Koruna", "Kč", Europe, false, dec!(23.10)),
        Currency::new("HUF", "Hungarian Forint", "Ft", Europe, false, dec!(358.50)),
        Currency::new("TRY", "Turkish Lira", "₺", Europe, false, dec!(32.15)),
        Currency::new("HKD", "Hong Kong Dollar", "HK$", Asia, false, dec!(7.82)),
        Currency::new("KRW", "South Korean Won", "₩", Asia, false, dec!(1330.00)),
        Currency::new("THB", "Thai Baht", "฿", Asia, false, dec!(35.80)),
        Currency::new("MYR", "Malaysian Ringgit", "RM", Asia, false, dec!(4.72)),
        Currency::new("IDR", "Indonesian Rupiah", "Rp", Asia, false, dec!(15650)),
        Currency::new("PHP", "Philippine Peso", "₱", Asia, false, dec!(56.20)),
        Currency::new("VND", "Vietnamese Dong", "₫", Asia, false, dec!(24500)),
        Currency::new("SAR", "Saudi Riyal", "﷼", MiddleEast, false, dec!(3.75)),
        Currency::new("KWD", "Kuwaiti Dinar", "د.ك", MiddleEast, false, dec!(0.31)),
        Currency::new("ILS", "Israeli Shekel", "₪", MiddleEast, false, dec!(3.70)),
        Currency::new("BRL", "Brazilian Real", "R$", Americas, false, dec!(4.97)),
        Currency::new("MXN", "Mexican Peso", "Mex$", Americas, false, dec!(17.05)),
        Currency::new("ZAR", "South African Rand", "R", Africa, false, dec!(18.65)),
        Currency::new("NGN", "Nigerian Naira", "₦", Africa, false, dec!(1550)),
        Currency::new("EGP", "Egyptian Pound", "E£", Africa, false, dec!(48.50)),
        Currency::new("KES", "Kenyan Shilling", "KSh", Africa, false, dec!(129.50)),
        Currency::new("NZD", "New Zealand Dollar", "NZ$", Oceania, false, dec!(1.64)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalogue_invariants() {
        let catalogue = Catalogue::default();
        assert_eq!(catalogue.len(), 35);

        // Rebuilding through the validating constructor must succeed
        let rebuilt = Catalogue::from_currencies(catalogue.all().to_vec());
        assert!(rebuilt.is_ok(), "builtin table violates invariants: {:?}", rebuilt.err());

        let popular = catalogue.popular().count();
        let additional = catalogue.additional().count();
        assert_eq!(popular + additional, catalogue.len());
        assert_eq!(popular, 10);

        let oceania: Vec<&str> = catalogue
            .by_region(Region::Oceania)
            .map(|c| c.code.as_str())
            .collect();
        assert_eq!(oceania, vec!["AUD", "NZD"]);
    }

    #[test]
    fn test_lookup() {
        let catalogue = Catalogue::default();

        let inr = catalogue.lookup("INR").expect("INR should be present");
        assert_eq!(inr.symbol, "₹");
        assert_eq!(inr.region, Region::Asia);

        assert!(catalogue.lookup("ZZZ").is_none());
        // Case sensitive
        assert!(catalogue.lookup("inr").is_none());
        assert!(matches!(catalogue.require("ZZZ"), Err(Error::NotFound(code)) if code == "ZZZ"));
    }

    #[test]
    fn test_format() {
        let catalogue = Catalogue::default();
        let usd = catalogue.lookup("USD").unwrap();
        let inr = catalogue.lookup("INR").unwrap();

        assert_eq!(format(usd, Decimal::ZERO), "$0.00");
        assert_eq!(format(inr, dec!(1234.5)), "₹1234.50");
        assert_eq!(format(usd, dec!(-5)), "-$5.00");
        assert_eq!(format(usd, dec!(2.345)), "$2.35");
        assert_eq!(format(usd, dec!(-0.001)), "$0.00");
    }

    #[test]
    fn test_format_code_fallback() {
        let catalogue = Catalogue::default();
        assert_eq!(catalogue.format_code("ZZZ", dec!(5)), "ZZZ 5");
        assert_eq!(catalogue.format_code("EUR", dec!(10)), "€10.00");
    }

    #[test]
    fn test_round_trip_identity() {
        let catalogue = Catalogue::default();
        let amounts = [dec!(0), dec!(1), dec!(0.01), dec!(1234.56), dec!(-42.5), dec!(999999.99)];

        for currency in catalogue.all() {
            for &amount in &amounts {
                let local = convert_from_usd(currency, amount).unwrap();
                let back = convert_to_usd(currency, local).unwrap();
                assert_eq!(back, amount, "round trip failed for {} {}", currency.code, amount);
            }
        }
    }

    #[test]
    fn test_convert_from_usd_is_monotonic() {
        let catalogue = Catalogue::default();
        let smaller = dec!(10.00);
        let larger = dec!(10.01);

        for currency in catalogue.all() {
            assert!(
                convert_from_usd(currency, smaller).unwrap() < convert_from_usd(currency, larger).unwrap()
            );
        }
    }

    #[test]
    fn test_conversion_overflow_is_an_error() {
        let catalogue = Catalogue::default();
        let krw = catalogue.lookup("KRW").unwrap();

        assert!(matches!(convert_from_usd(krw, Decimal::MAX), Err(Error::Overflow(_))));
        assert!(matches!(
            catalogue.convert(Decimal::MAX, "KWD", "USD"),
            Err(Error::Overflow(_))
        ));
        assert!(matches!(
            catalogue.convert(dec!(1000000000000000000000000000), "USD", "IDR"),
            Err(Error::Overflow(_))
        ));
    }

    #[test]
    fn test_format_top_of_range_keeps_two_decimals() {
        let catalogue = Catalogue::default();
        let usd = catalogue.lookup("USD").unwrap();

        assert_eq!(format(usd, Decimal::MAX), "$79228162514264337593543950335.00");
        assert_eq!(
            format(usd, dec!(1234567890123456789012345678.9)),
            "$1234567890123456789012345678.90"
        );
        assert_eq!(format(usd, Decimal::MIN), "-$79228162514264337593543950335.00");
    }

    #[test]
    fn test_convert_to_usd_zero_rate() {
        let broken = Currency::new("XXX", "Broken", "X", Region::Europe, false, Decimal::ZERO);
        let result = convert_to_usd(&broken, dec!(10));
        assert!(matches!(result, Err(Error::RateDivision(code)) if code == "XXX"));
    }

    #[test]
    fn test_cross_conversion() {
        let catalogue = Catalogue::default();

        let eur = catalogue.convert(dec!(92), "EUR", "USD").unwrap();
        assert_eq!(eur, dec!(100));

        let inr = catalogue.convert(dec!(0.92), "EUR", "INR").unwrap();
        assert_eq!(inr, dec!(83.12));

        assert_eq!(catalogue.convert(dec!(7), "GBP", "GBP").unwrap(), dec!(7));
        assert!(catalogue.convert(dec!(1), "EUR", "ZZZ").is_err());
    }

    #[test]
    fn test_apply_rates() {
        let mut catalogue = Catalogue::default();
        let rates = HashMap::from([
            ("EUR".to_string(), dec!(0.95)),
            ("ZZZ".to_string(), dec!(2)),
            ("INR".to_string(), Decimal::ZERO),
        ]);

        let update = catalogue.apply_rates(&rates);
        assert_eq!(update.updated, vec!["EUR".to_string()]);
        assert_eq!(update.unknown, vec!["ZZZ".to_string()]);
        assert_eq!(update.rejected, vec!["INR".to_string()]);

        assert_eq!(catalogue.lookup("EUR").unwrap().conversion_rate, dec!(0.95));
        assert_eq!(catalogue.lookup("INR").unwrap().conversion_rate, dec!(83.12));
    }

    #[test]
    fn test_from_currencies_rejects_duplicates() {
        let currencies = vec![
            Currency::new("USD", "US Dollar", "$", Region::Americas, true, dec!(1)),
            Currency::new("USD", "Other Dollar", "$", Region::Americas, false, dec!(2)),
        ];
        assert!(Catalogue::from_currencies(currencies).is_err());
    }
}
