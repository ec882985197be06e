//! Executes a script against in-memory stores.

use std::sync::Arc;

use canvas_core::{AccountId, Amount, Color, Coord, PixelKey};
use canvas_event::{CanvasEvent, EventQueue};
use canvas_store::{
    Bank, Canvas, CanvasConfig, CanvasResult, ColorLookup, LogEntry, ManualClock, PixelLog,
    PixelRecord,
};
use hashbrown::HashMap;
use serde::Serialize;
use tracing::{info, warn};

use crate::script::{Script, Source, Step};

/// Stable name → account mapping; accounts are numbered by first use.
#[derive(Debug, Default)]
struct Actors {
    by_name: HashMap<String, AccountId>,
    names: Vec<String>,
}

impl Actors {
    fn id(&mut self, name: &str) -> AccountId {
        if let Some(id) = self.by_name.get(name) {
            return *id;
        }
        self.names.push(name.to_string());
        let id = AccountId::from_u128(self.names.len() as u128);
        self.by_name.insert(name.to_string(), id);
        id
    }
}

/// What one step produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub colors: Option<Vec<Color>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PixelReport {
    pub coord: Coord,
    #[serde(flatten)]
    pub record: PixelRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BalanceReport {
    pub actor: String,
    pub account: AccountId,
    pub balance: Amount,
}

/// Final state after a replay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub steps: Vec<StepReport>,
    pub events: Vec<CanvasEvent>,
    pub pixels: Vec<PixelReport>,
    pub log: Vec<LogEntry>,
    pub held_balance: Amount,
    pub balances: Vec<BalanceReport>,
    /// Sum of every bank balance; settlement never creates or destroys funds.
    pub total_supply: Amount,
}

/// Both stores plus the in-memory capabilities they run on.
pub struct Replay {
    canvas: Canvas,
    log: PixelLog,
    bank: Arc<Bank>,
    clock: Arc<ManualClock>,
    events: Arc<EventQueue>,
    actors: Actors,
}

impl Replay {
    pub fn new(script: &Script, base: CanvasConfig) -> Self {
        let mut actors = Actors::default();
        let mut config = base;
        if let Some(price) = script.mint_price {
            config = config.with_mint_price(price);
        }
        if let Some(admin) = &script.admin {
            config = config.with_admin(actors.id(admin));
        }

        let bank = Arc::new(Bank::new());
        let clock = Arc::new(ManualClock::new(script.start_time));
        let events = Arc::new(EventQueue::new());

        Self {
            canvas: Canvas::new(config, bank.clone(), clock.clone(), events.clone()),
            log: PixelLog::new(events.clone()),
            bank,
            clock,
            events,
            actors,
        }
    }

    /// Run every step. Failing steps are recorded and the replay continues.
    pub fn run(mut self, steps: &[Step]) -> Report {
        let mut reports = Vec::with_capacity(steps.len());

        for (index, step) in steps.iter().enumerate() {
            let op = step.name();
            let report = match self.apply(step) {
                Ok(colors) => {
                    info!("#{index} {op}: ok");
                    StepReport {
                        index,
                        op,
                        error: None,
                        colors,
                    }
                }
                Err(e) => {
                    warn!("#{index} {op}: {e}");
                    StepReport {
                        index,
                        op,
                        error: Some(e.to_string()),
                        colors: None,
                    }
                }
            };
            reports.push(report);
        }

        self.finish(reports)
    }

    fn key(x: u64, y: u64) -> CanvasResult<PixelKey> {
        Ok(Coord::new(x, y)?.key())
    }

    fn apply(&mut self, step: &Step) -> CanvasResult<Option<Vec<Color>>> {
        match step {
            Step::Deposit { actor, amount } => {
                self.bank.deposit(self.actors.id(actor), *amount);
            }
            Step::Freeze { actor } => self.bank.freeze(self.actors.id(actor)),
            Step::Unfreeze { actor } => self.bank.unfreeze(self.actors.id(actor)),
            Step::Advance { secs } => {
                self.clock.advance(*secs);
            }
            Step::Mint {
                x,
                y,
                color,
                rent_price,
                payment,
                actor,
            } => {
                let actor = self.actors.id(actor);
                self.canvas
                    .mint(Self::key(*x, *y)?, *color, *rent_price, *payment, actor)?;
            }
            Step::SetColor { x, y, color, actor } => {
                let actor = self.actors.id(actor);
                self.canvas.set_color(Self::key(*x, *y)?, *color, actor)?;
            }
            Step::SetRentPrice { x, y, price, actor } => {
                let actor = self.actors.id(actor);
                self.canvas
                    .set_rent_price(Self::key(*x, *y)?, *price, actor)?;
            }
            Step::Rent {
                x,
                y,
                duration,
                payment,
                actor,
            } => {
                let actor = self.actors.id(actor);
                self.canvas
                    .rent(Self::key(*x, *y)?, *duration, actor, *payment)?;
            }
            Step::Withdraw { actor } => {
                let actor = self.actors.id(actor);
                self.canvas.withdraw(actor)?;
            }
            Step::Upsert { actor, writes } => {
                let actor = self.actors.id(actor);
                self.log.upsert_batch(writes, actor)?;
            }
            Step::Query {
                x_start,
                x_end,
                y_start,
                y_end,
                source,
            } => {
                let colors = match source {
                    Source::Canvas => {
                        self.canvas
                            .region_colors(*x_start, *x_end, *y_start, *y_end)?
                    }
                    Source::Log => self.log.region_colors(*x_start, *x_end, *y_start, *y_end)?,
                };
                return Ok(Some(colors));
            }
        }
        Ok(None)
    }

    fn finish(self, steps: Vec<StepReport>) -> Report {
        let pixels = self
            .canvas
            .snapshot()
            .into_iter()
            .map(|(key, record)| PixelReport {
                coord: key.unpack(),
                record,
            })
            .collect();

        let balances = self
            .actors
            .names
            .iter()
            .map(|name| {
                let account = self.actors.by_name[name.as_str()];
                BalanceReport {
                    actor: name.clone(),
                    account,
                    balance: self.bank.balance_of(account),
                }
            })
            .collect();

        Report {
            steps,
            events: self.events.drain(),
            pixels,
            log: self.log.list_all(),
            held_balance: self.canvas.balance(),
            balances,
            total_supply: self.bank.total_supply(),
        }
    }
}

/// Replay `script` on top of `base` configuration.
pub fn replay(script: &Script, base: CanvasConfig) -> Report {
    Replay::new(script, base).run(&script.steps)
}
