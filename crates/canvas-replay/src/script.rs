//! Replay script format.
//!
//! ```json
//! {
//!   "mint_price": 10,
//!   "admin": "admin",
//!   "start_time": 1000,
//!   "steps": [
//!     { "deposit": { "actor": "alice", "amount": 100 } },
//!     { "mint": { "x": 1, "y": 2, "color": 16711680, "rent_price": 1, "payment": 10, "actor": "alice" } },
//!     { "query": { "x_start": 0, "x_end": 1, "y_start": 0, "y_end": 2 } }
//!   ]
//! }
//! ```
//!
//! Actors are referred to by name; each distinct name becomes one account.

use std::path::Path;

use canvas_core::{Amount, Color, Timestamp};
use canvas_store::PixelWrite;
use eyre::WrapErr;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    /// Overrides the configured mint price.
    #[serde(default)]
    pub mint_price: Option<Amount>,
    /// Actor name allowed to withdraw.
    #[serde(default)]
    pub admin: Option<String>,
    #[serde(default)]
    pub start_time: Timestamp,
    pub steps: Vec<Step>,
}

impl Script {
    pub fn load(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {}", path.display()))?;
        serde_json::from_str(&text).wrap_err_with(|| format!("invalid script {}", path.display()))
    }
}

/// Which store a query reads from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    #[default]
    Canvas,
    Log,
}

/// One operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Deposit {
        actor: String,
        amount: Amount,
    },
    Freeze {
        actor: String,
    },
    Unfreeze {
        actor: String,
    },
    Advance {
        secs: u64,
    },
    Mint {
        x: u64,
        y: u64,
        color: Color,
        #[serde(default)]
        rent_price: Amount,
        payment: Amount,
        actor: String,
    },
    SetColor {
        x: u64,
        y: u64,
        color: Color,
        actor: String,
    },
    SetRentPrice {
        x: u64,
        y: u64,
        price: Amount,
        actor: String,
    },
    Rent {
        x: u64,
        y: u64,
        duration: u64,
        payment: Amount,
        actor: String,
    },
    Withdraw {
        actor: String,
    },
    Upsert {
        actor: String,
        writes: Vec<PixelWrite>,
    },
    Query {
        x_start: u64,
        x_end: u64,
        y_start: u64,
        y_end: u64,
        #[serde(default)]
        source: Source,
    },
}

impl Step {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Deposit { .. } => "deposit",
            Self::Freeze { .. } => "freeze",
            Self::Unfreeze { .. } => "unfreeze",
            Self::Advance { .. } => "advance",
            Self::Mint { .. } => "mint",
            Self::SetColor { .. } => "set_color",
            Self::SetRentPrice { .. } => "set_rent_price",
            Self::Rent { .. } => "rent",
            Self::Withdraw { .. } => "withdraw",
            Self::Upsert { .. } => "upsert",
            Self::Query { .. } => "query",
        }
    }
}
