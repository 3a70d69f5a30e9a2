// The farm: one variable input (man-hours), one capacity input (land), one output

use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, FirmError};
use crate::goods::{Good, Inventory, Quantity, Stock};
use crate::market::{Fill, MarketStatistics, Order, PriceMakerMarket, PriceTakerMarket, Side};
use crate::production::ProductionFunction;
use crate::types::{AgentId, AgentIdGenerator, Day, Price};

use super::solvency::{DEFAULT_EXIT_PROBABILITY, DEFAULT_GRACE_DAYS};
use super::{
    DayPhase, DividendPaying, ExpectedRevenueStrategy, FinanceDepartment, Financials,
    FirmDecisions, Liquidatable, LossTracker, MarketParticipant, MarketingDepartment, Shareholder,
};

/// Units of input below which a day's spending is not worth it.
pub const MINIMUM_TARGET_INPUT: f64 = 14.0;

// === CONFIG ===

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FirmConfig {
    pub minimum_target_input: f64,
    /// Loss days tolerated before exit draws begin.
    pub grace_days: u32,
    pub exit_probability: f64,
    /// Beliefs used when the market has not priced a good yet.
    pub initial_input_price: Price,
    pub initial_output_price: Price,
}

impl Default for FirmConfig {
    fn default() -> Self {
        Self {
            minimum_target_input: MINIMUM_TARGET_INPUT,
            grace_days: DEFAULT_GRACE_DAYS,
            exit_probability: DEFAULT_EXIT_PROBABILITY,
            initial_input_price: 1.0,
            initial_output_price: 1.0,
        }
    }
}

impl FirmConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.minimum_target_input.is_finite() || self.minimum_target_input < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "minimum_target_input",
                value: self.minimum_target_input,
            });
        }
        if !(0.0..=1.0).contains(&self.exit_probability) {
            return Err(ConfigError::InvalidParameter {
                name: "exit_probability",
                value: self.exit_probability,
            });
        }
        for (name, value) in [
            ("initial_input_price", self.initial_input_price),
            ("initial_output_price", self.initial_output_price),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidParameter { name, value });
            }
        }
        Ok(())
    }
}

// === FIRM ===

#[derive(Debug, Clone)]
pub struct Firm {
    id: AgentId,
    owner: AgentId,
    inventory: Inventory,
    production: Rc<dyn ProductionFunction>,
    marketing: MarketingDepartment,
    finance: FinanceDepartment,
    strategy: ExpectedRevenueStrategy,
    solvency: LossTracker,
    config: FirmConfig,
    phase: DayPhase,
}

impl Firm {
    /// Found a firm, moving the given money and land into its inventory.
    ///
    /// The production function must have exactly one variable input (what the
    /// firm bids for daily) and at most one capital input (what it invests in).
    pub fn new(
        ids: &mut AgentIdGenerator,
        owner: AgentId,
        money: &mut Stock,
        land: &mut Stock,
        production: Rc<dyn ProductionFunction>,
        stats: &MarketStatistics,
        config: FirmConfig,
    ) -> Result<Self, FirmError> {
        config.validate()?;
        let variable = production.variable_inputs();
        let [input] = variable.as_slice() else {
            return Err(ConfigError::VariableInputs(variable.len()).into());
        };
        let capital = production.capital_inputs().len();
        if capital > 1 {
            return Err(ConfigError::CapitalInputs(capital).into());
        }

        let id = ids.next_id();
        let mut inventory = Inventory::new(stats.money());
        inventory.absorb(land)?;
        inventory.absorb(money)?;
        if inventory.money().is_empty() {
            return Err(FirmError::NoStartingCapital { firm: id });
        }

        let marketing = MarketingDepartment::new(
            input.good,
            production.output(),
            stats.snapshot(),
            config.initial_input_price,
            config.initial_output_price,
        );
        let finance = FinanceDepartment::new(Rc::clone(&production), stats.discount_rate());

        Ok(Self {
            id,
            owner,
            inventory,
            strategy: ExpectedRevenueStrategy::new(input.weight),
            solvency: LossTracker::new(config.grace_days, config.exit_probability),
            production,
            marketing,
            finance,
            config,
            phase: DayPhase::Offering,
        })
    }

    /// Hand the firm an extra starting stock, e.g. a first harvest to sell.
    pub fn with_starting_stock(mut self, stock: &mut Stock) -> Result<Self, FirmError> {
        self.inventory.absorb(stock)?;
        Ok(self)
    }

    pub fn id(&self) -> AgentId {
        self.id
    }

    pub fn owner(&self) -> AgentId {
        self.owner
    }

    pub fn phase(&self) -> DayPhase {
        self.phase
    }

    pub fn is_exited(&self) -> bool {
        self.phase == DayPhase::Exited
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn production(&self) -> &dyn ProductionFunction {
        self.production.as_ref()
    }

    pub fn marketing(&self) -> &MarketingDepartment {
        &self.marketing
    }

    pub fn finance(&self) -> &FinanceDepartment {
        &self.finance
    }

    pub fn config(&self) -> &FirmConfig {
        &self.config
    }

    pub fn days_without_profit(&self) -> u32 {
        self.solvency.days_without_profit()
    }

    pub fn price_belief(&self, good: Good) -> Option<Price> {
        self.marketing.price_belief(good)
    }

    pub fn financials(&self) -> Financials {
        self.marketing.financials(&self.inventory)
    }

    /// Input budget for today: nothing if the minimum viable spend is out of
    /// reach, otherwise the larger of the COGS target and that minimum.
    pub fn budget(&self) -> f64 {
        let input_price = self.marketing.input().price();
        let minimum = self.config.minimum_target_input * input_price;
        if self.inventory.money().amount() < minimum {
            0.0
        } else {
            self.strategy.calc_cogs(&self.financials()).max(minimum)
        }
    }

    fn enter(&mut self, operation: &'static str, expected: &[DayPhase]) -> Result<(), FirmError> {
        if self.phase == DayPhase::Exited {
            return Err(FirmError::Exited(self.id));
        }
        if !expected.contains(&self.phase) {
            return Err(FirmError::OutOfPhase {
                operation,
                phase: self.phase,
            });
        }
        Ok(())
    }
}

impl MarketParticipant for Firm {
    fn offer(&mut self, market: &mut dyn PriceMakerMarket) -> Result<f64, FirmError> {
        self.enter("offer", &[DayPhase::Offering])?;
        self.marketing.begin_day();
        let budget = self.budget();
        let _orders = self.marketing.create_offers(market, self.id, &self.inventory, budget);
        self.phase = DayPhase::Trading;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "firm_offer",
            firm_id = self.id.0 as u64,
            budget = budget,
            money = self.inventory.money().amount(),
            input_price = self.marketing.input().price(),
            output_price = self.marketing.output().price(),
            bid = self.marketing.input().offered(),
            ask = self.marketing.output().offered(),
        );

        Ok(budget)
    }

    fn apply_fill(&mut self, fill: &Fill) -> Result<(), FirmError> {
        self.enter("apply_fill", &[DayPhase::Trading, DayPhase::Production])?;
        if fill.agent != self.id {
            return Err(FirmError::ForeignFill {
                firm: self.id,
                addressee: fill.agent,
            });
        }
        match fill.side {
            Side::Buy => {
                self.inventory.money_mut().subtract(fill.value())?;
                self.inventory.stock_mut(fill.good).add(fill.quantity)?;
            }
            Side::Sell => {
                self.inventory.stock_mut(fill.good).subtract(fill.quantity)?;
                self.inventory.money_mut().add(fill.value())?;
            }
        }
        self.marketing.record_fill(fill);
        Ok(())
    }

    fn trade_goods(&mut self, market: &mut dyn PriceTakerMarket) -> Result<Option<Order>, FirmError> {
        self.enter("trade_goods", &[DayPhase::Trading])?;
        let financials = self.marketing.offered_financials(&self.inventory);
        let reserve = self.strategy.calc_cogs(&financials);
        let order = self.finance.invest(self.id, &self.inventory, &financials, market, reserve);
        self.phase = DayPhase::Production;

        #[cfg(feature = "instrument")]
        if let Some(order) = &order {
            tracing::info!(
                target: "firm_invest",
                firm_id = self.id.0 as u64,
                good_id = order.good.id() as u64,
                quantity = order.quantity,
                price = order.limit_price,
                reserve = reserve,
            );
        }

        Ok(order)
    }

    fn produce(&mut self) -> Result<Quantity, FirmError> {
        self.enter("produce", &[DayPhase::Production])?;
        let produced = self.production.consume_inputs(&mut self.inventory)?;
        self.phase = DayPhase::PriceAdaptation;
        Ok(produced)
    }

    fn adapt_prices(&mut self) -> Result<(), FirmError> {
        self.enter("adapt_prices", &[DayPhase::PriceAdaptation])?;
        self.marketing.adapt_prices();
        self.phase = DayPhase::DividendDecision;
        Ok(())
    }
}

impl DividendPaying for Firm {
    fn calculate_dividends(&mut self, day: Day, owner: &mut dyn Shareholder) -> Result<f64, FirmError> {
        self.enter("calculate_dividends", &[DayPhase::DividendDecision])?;
        if owner.id() != self.owner {
            return Err(FirmError::WrongOwner {
                firm: self.id,
                owner: self.owner,
                presented: owner.id(),
            });
        }
        let financials = self.financials();
        let dividend = self
            .strategy
            .calc_dividend(&financials)
            .min(self.inventory.money().amount());
        if dividend > 0.0 {
            let payout = self.inventory.money_mut().split_off(dividend)?;
            owner.receive_dividend(self.id, day, payout)?;
        }
        self.phase = DayPhase::SolvencyCheck;

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "firm_dividend",
            day = day,
            firm_id = self.id.0 as u64,
            owner_id = self.owner.0 as u64,
            dividend = dividend,
            profits = financials.profits,
            cash = financials.cash,
        );

        Ok(dividend)
    }
}

impl Liquidatable for Firm {
    fn consider_bankruptcy(&mut self, stats: &mut MarketStatistics) -> Result<bool, FirmError> {
        self.enter("consider_bankruptcy", &[DayPhase::SolvencyCheck])?;
        let financials = self.financials();
        let exits = self.solvency.check_exit(stats.rng(), financials.profits);

        #[cfg(feature = "instrument")]
        tracing::info!(
            target: "firm_day",
            day = stats.snapshot().day(),
            firm_id = self.id.0 as u64,
            revenue = financials.revenue,
            costs = financials.costs,
            profits = financials.profits,
            cash = financials.cash,
            land = self.finance.production().capital_inputs().first().map_or(0.0, |w| self.inventory.amount(w.good)),
            days_without_profit = self.solvency.days_without_profit(),
        );

        if exits {
            self.phase = DayPhase::Exited;
            #[cfg(feature = "instrument")]
            tracing::info!(
                target: "firm_exit",
                day = stats.snapshot().day(),
                firm_id = self.id.0 as u64,
                days_without_profit = self.solvency.days_without_profit(),
                cash = financials.cash,
            );
        } else {
            self.phase = DayPhase::Offering;
        }
        Ok(exits)
    }

    fn liquidate(&mut self, owner: &mut dyn Shareholder) -> Result<(), FirmError> {
        if self.phase != DayPhase::Exited {
            return Err(FirmError::OutOfPhase {
                operation: "liquidate",
                phase: self.phase,
            });
        }
        if owner.id() != self.owner {
            return Err(FirmError::WrongOwner {
                firm: self.id,
                owner: self.owner,
                presented: owner.id(),
            });
        }
        let assets = self.inventory.take_all();
        owner.receive_assets(self.id, assets)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::goods::Quantity;
    use crate::market::{GoodStats, MarketSnapshot, OrderBook};
    use crate::production::{CobbDouglasProduction, Weight};
    use crate::firm::Founder;

    const MONEY: Good = Good::new(0, "money");
    const LAND: Good = Good::new(1, "land");
    const MAN_HOUR: Good = Good::new(2, "man-hour");
    const POTATO: Good = Good::new(3, "potato");
    const OWNER: AgentId = AgentId(100);

    fn production() -> Rc<dyn ProductionFunction> {
        Rc::new(
            CobbDouglasProduction::new(
                POTATO,
                1.0,
                vec![Weight::capital(LAND, 0.2), Weight::variable(MAN_HOUR, 0.6)],
            )
            .unwrap()
            .with_fixed_cost(Quantity::new(MAN_HOUR, 14.0))
            .unwrap(),
        )
    }

    fn stats(labor_price: f64, potato_price: f64) -> MarketStatistics {
        MarketStatistics::new(MONEY, 0.001, 11).with_snapshot(
            MarketSnapshot::new(0)
                .with_good(MAN_HOUR, GoodStats::priced(labor_price, 0.0))
                .with_good(POTATO, GoodStats::priced(potato_price, 0.0)),
        )
    }

    fn firm(money: f64, stats: &MarketStatistics) -> Firm {
        let mut ids = AgentIdGenerator::new();
        Firm::new(
            &mut ids,
            OWNER,
            &mut Stock::new(MONEY, money).unwrap(),
            &mut Stock::new(LAND, 100.0).unwrap(),
            production(),
            stats,
            FirmConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn founding_moves_money_and_land_in() {
        let stats = stats(1.0, 1.0);
        let mut ids = AgentIdGenerator::new();
        let mut money = Stock::new(MONEY, 50.0).unwrap();
        let mut land = Stock::new(LAND, 100.0).unwrap();
        let firm = Firm::new(&mut ids, OWNER, &mut money, &mut land, production(), &stats, FirmConfig::default()).unwrap();
        assert!(money.is_empty());
        assert!(land.is_empty());
        assert_eq!(firm.inventory().amount(MONEY), 50.0);
        assert_eq!(firm.inventory().amount(LAND), 100.0);
        assert_eq!(firm.phase(), DayPhase::Offering);
        assert_eq!(firm.owner(), OWNER);
    }

    #[test]
    fn founding_without_money_fails() {
        let stats = stats(1.0, 1.0);
        let mut ids = AgentIdGenerator::new();
        let err = Firm::new(
            &mut ids,
            OWNER,
            &mut Stock::empty(MONEY),
            &mut Stock::new(LAND, 100.0).unwrap(),
            production(),
            &stats,
            FirmConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, FirmError::NoStartingCapital { firm: AgentId(0) });
    }

    #[test]
    fn founding_needs_exactly_one_variable_input() {
        let stats = stats(1.0, 1.0);
        let mut ids = AgentIdGenerator::new();
        let land_only = CobbDouglasProduction::new(POTATO, 1.0, vec![Weight::capital(LAND, 0.5)]).unwrap();
        let err = Firm::new(
            &mut ids,
            OWNER,
            &mut Stock::new(MONEY, 10.0).unwrap(),
            &mut Stock::new(LAND, 100.0).unwrap(),
            Rc::new(land_only),
            &stats,
            FirmConfig::default(),
        )
        .unwrap_err();
        assert_eq!(err, FirmError::Config(ConfigError::VariableInputs(0)));
    }

    #[test]
    fn budget_is_zero_below_minimum_viable_spend() {
        let stats = stats(2.0, 1.0);
        // Minimum = 14 * 2 = 28.
        let mut poor = firm(27.0, &stats);
        let mut book = OrderBook::new();
        assert_eq!(poor.offer(&mut book).unwrap(), 0.0);
        assert!(book.offers.is_empty());

        let mut enough = firm(28.0, &stats);
        assert_eq!(enough.offer(&mut book).unwrap(), 28.0);
        assert_eq!(book.offers.len(), 1);
    }

    #[test]
    fn budget_follows_cogs_target_above_minimum() {
        let stats = stats(1.0, 10.0);
        let mut rich = firm(1_000.0, &stats)
            .with_starting_stock(&mut Stock::new(POTATO, 5.0).unwrap())
            .unwrap();
        // Revenue 5 * 10 = 50, target 0.6 * 50 = 30 > minimum 14.
        let mut book = OrderBook::new();
        assert!((rich.offer(&mut book).unwrap() - 30.0).abs() < 1e-12);
    }

    #[test]
    fn out_of_order_calls_are_rejected() {
        let stats = stats(1.0, 1.0);
        let mut firm = firm(100.0, &stats);
        let mut owner = Founder::new(OWNER, MONEY);
        assert_eq!(
            firm.adapt_prices(),
            Err(FirmError::OutOfPhase {
                operation: "adapt_prices",
                phase: DayPhase::Offering
            })
        );
        assert!(matches!(
            firm.calculate_dividends(0, &mut owner),
            Err(FirmError::OutOfPhase { .. })
        ));
        let mut book = OrderBook::new();
        firm.offer(&mut book).unwrap();
        assert!(matches!(firm.offer(&mut book), Err(FirmError::OutOfPhase { .. })));
    }

    #[test]
    fn fills_move_money_and_goods() {
        let stats = stats(1.0, 1.0);
        let mut firm = firm(100.0, &stats);
        let mut book = OrderBook::new();
        firm.offer(&mut book).unwrap();
        let bid = book.offers[0].clone();
        firm.apply_fill(&bid.fill(bid.quantity)).unwrap();
        assert!((firm.inventory().amount(MONEY) - (100.0 - bid.value())).abs() < 1e-9);
        assert_eq!(firm.inventory().amount(MAN_HOUR), bid.quantity);

        let foreign = Fill {
            agent: AgentId(55),
            ..bid.fill(1.0)
        };
        assert_eq!(
            firm.apply_fill(&foreign),
            Err(FirmError::ForeignFill {
                firm: firm.id(),
                addressee: AgentId(55)
            })
        );

        let oversell = Fill {
            side: Side::Sell,
            good: POTATO,
            ..bid.fill(1.0)
        };
        assert!(matches!(firm.apply_fill(&oversell), Err(FirmError::Stock(_))));
    }

    #[test]
    fn full_day_pays_dividend_to_owner() {
        let mut stats = stats(1.0, 10.0);
        let mut firm = firm(1_000.0, &stats)
            .with_starting_stock(&mut Stock::new(POTATO, 5.0).unwrap())
            .unwrap();
        let mut owner = Founder::new(OWNER, MONEY);
        let mut book = OrderBook::new();

        firm.offer(&mut book).unwrap();
        for order in book.offers.clone() {
            firm.apply_fill(&order.fill(order.quantity)).unwrap();
        }
        assert_eq!(firm.trade_goods(&mut book).unwrap(), None);
        let produced = firm.produce().unwrap();
        assert!(produced.amount() > 0.0);
        assert_eq!(firm.inventory().amount(MAN_HOUR), 0.0);
        firm.adapt_prices().unwrap();

        let before = firm.inventory().amount(MONEY);
        let expected = firm.strategy.calc_dividend(&firm.financials());
        let paid = firm.calculate_dividends(0, &mut owner).unwrap();
        assert!((paid - expected).abs() < 1e-12);
        assert!((firm.inventory().amount(MONEY) - (before - paid)).abs() < 1e-9);
        assert!((owner.inventory().amount(MONEY) - paid).abs() < 1e-12);

        assert!(!firm.consider_bankruptcy(&mut stats).unwrap());
        assert_eq!(firm.phase(), DayPhase::Offering);
    }

    #[test]
    fn wrong_owner_cannot_collect() {
        let stats = stats(1.0, 1.0);
        let mut firm = firm(100.0, &stats);
        let mut book = OrderBook::new();
        firm.offer(&mut book).unwrap();
        firm.trade_goods(&mut book).unwrap();
        firm.produce().unwrap();
        firm.adapt_prices().unwrap();
        let mut stranger = Founder::new(AgentId(7), MONEY);
        assert!(matches!(
            firm.calculate_dividends(0, &mut stranger),
            Err(FirmError::WrongOwner { .. })
        ));
    }

    #[test]
    fn exit_is_terminal_and_assets_go_to_owner() {
        let mut stats = stats(1.0, 1.0);
        let mut ids = AgentIdGenerator::new();
        let config = FirmConfig {
            grace_days: 0,
            exit_probability: 1.0,
            ..FirmConfig::default()
        };
        let mut firm = Firm::new(
            &mut ids,
            OWNER,
            &mut Stock::new(MONEY, 5.0).unwrap(),
            &mut Stock::new(LAND, 100.0).unwrap(),
            production(),
            &stats,
            config,
        )
        .unwrap();
        let mut owner = Founder::new(OWNER, MONEY);
        let mut book = OrderBook::new();

        assert!(matches!(firm.liquidate(&mut owner), Err(FirmError::OutOfPhase { .. })));

        firm.offer(&mut book).unwrap();
        firm.trade_goods(&mut book).unwrap();
        firm.produce().unwrap();
        firm.adapt_prices().unwrap();
        firm.calculate_dividends(0, &mut owner).unwrap();
        assert!(firm.consider_bankruptcy(&mut stats).unwrap());
        assert!(firm.is_exited());
        assert_eq!(firm.offer(&mut book), Err(FirmError::Exited(firm.id())));

        firm.liquidate(&mut owner).unwrap();
        assert!(firm.inventory().is_empty());
        assert_eq!(owner.inventory().amount(LAND), 100.0);
        assert_eq!(owner.inventory().amount(MONEY), 5.0);
        assert_eq!(owner.firms_liquidated(), 1);
    }
}
