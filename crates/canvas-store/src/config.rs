//! Store configuration.

use canvas_core::{AccountId, Amount};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Mint price used when none is configured.
pub const DEFAULT_MINT_PRICE: Amount = 1_000;

/// Account that holds the store's funds unless configured otherwise.
pub const DEFAULT_TREASURY: AccountId = AccountId::from_u128(0x7472_6561_7375_7279);

/// Fixed parameters of a canvas store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    /// Exact payment required by `mint`.
    pub mint_price: Amount,
    /// The only identity allowed to `withdraw`.
    pub admin: AccountId,
    /// Account that receives payments and pays out refunds.
    pub treasury: AccountId,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            mint_price: DEFAULT_MINT_PRICE,
            admin: AccountId::NIL,
            treasury: DEFAULT_TREASURY,
        }
    }
}

impl CanvasConfig {
    /// Read `CANVAS_MINT_PRICE`, `CANVAS_ADMIN` and `CANVAS_TREASURY`.
    ///
    /// Unset variables keep their defaults; unparsable ones are logged and
    /// ignored.
    #[must_use]
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment overrides on top of `self`.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|name| std::env::var(name).ok())
    }

    /// Apply overrides read through `lookup`, keyed by environment variable
    /// name.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(price) = parse_var(&lookup, "CANVAS_MINT_PRICE") {
            self.mint_price = price;
        }
        if let Some(admin) = parse_var(&lookup, "CANVAS_ADMIN") {
            self.admin = admin;
        }
        if let Some(treasury) = parse_var(&lookup, "CANVAS_TREASURY") {
            self.treasury = treasury;
        }
        self
    }

    #[must_use]
    pub const fn with_mint_price(mut self, mint_price: Amount) -> Self {
        self.mint_price = mint_price;
        self
    }

    #[must_use]
    pub const fn with_admin(mut self, admin: AccountId) -> Self {
        self.admin = admin;
        self
    }

    #[must_use]
    pub const fn with_treasury(mut self, treasury: AccountId) -> Self {
        self.treasury = treasury;
        self
    }
}

fn parse_var<T: core::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &str,
) -> Option<T> {
    let value = lookup(name)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!("Ignoring unparsable {name}={value:?}");
            None
        }
    }
}
