use crate::data::resolution::SecurityType;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The right of an option contract.
#[derive(Serialize, Deserialize, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub enum OptionRight {
    Call,
    Put,
}

/// An immutable market identifier. Canonical symbols (option/future chains) never carry
/// tradable price data themselves — they exist only to be expanded by a chain provider.
///
/// Lives for the life of the process once resolved; equality and hashing are by value so
/// it can key `DashMap`s throughout the aggregation and subscription layers, and `Ord`
/// so it can key the `BTreeMap` a `TimeSlice` groups data into.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Symbol {
    pub ticker: String,
    pub security_type: SecurityType,
    pub market: String,
    pub underlying: Option<Box<Symbol>>,
    pub expiry: Option<NaiveDate>,
    pub strike: Option<Decimal>,
    pub right: Option<OptionRight>,
}

impl Symbol {
    pub fn new(ticker: impl Into<String>, security_type: SecurityType, market: impl Into<String>) -> Self {
        Symbol {
            ticker: ticker.into(),
            security_type,
            market: market.into(),
            underlying: None,
            expiry: None,
            strike: None,
            right: None,
        }
    }

    pub fn canonical_option(underlying: Symbol, market: impl Into<String>) -> Self {
        Symbol {
            ticker: format!("{}-OPTIONS", underlying.ticker),
            security_type: SecurityType::Option,
            market: market.into(),
            underlying: Some(Box::new(underlying)),
            expiry: None,
            strike: None,
            right: None,
        }
    }

    pub fn canonical_future(root: impl Into<String>, market: impl Into<String>) -> Self {
        let root = root.into();
        Symbol {
            ticker: format!("{}-FUTURES", root.clone()),
            security_type: SecurityType::Future,
            market: market.into(),
            underlying: Some(Box::new(Symbol::new(root, SecurityType::Future, "root"))),
            expiry: None,
            strike: None,
            right: None,
        }
    }

    pub fn option_contract(
        canonical: &Symbol,
        expiry: NaiveDate,
        strike: Decimal,
        right: OptionRight,
    ) -> Self {
        Symbol {
            ticker: format!("{} {} {} {}", canonical.underlying_ticker(), expiry, strike, match right {
                OptionRight::Call => "C",
                OptionRight::Put => "P",
            }),
            security_type: SecurityType::Option,
            market: canonical.market.clone(),
            underlying: canonical.underlying.clone(),
            expiry: Some(expiry),
            strike: Some(strike),
            right: Some(right),
        }
    }

    pub fn future_contract(canonical: &Symbol, contract_ticker: impl Into<String>, expiry: NaiveDate) -> Self {
        Symbol {
            ticker: contract_ticker.into(),
            security_type: SecurityType::Future,
            market: canonical.market.clone(),
            underlying: canonical.underlying.clone(),
            expiry: Some(expiry),
            strike: None,
            right: None,
        }
    }

    pub fn is_canonical(&self) -> bool {
        self.security_type.is_canonical() && self.expiry.is_none()
    }

    fn underlying_ticker(&self) -> String {
        self.underlying
            .as_ref()
            .map(|u| u.ticker.clone())
            .unwrap_or_else(|| self.ticker.clone())
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.market, self.security_type, self.ticker)
    }
}
