use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::models::ContractClass;

/// A futures root with its standard and micro point values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instrument {
    pub root: String,
    pub standard_multiplier: f64,
    pub micro_multiplier: f64,
}

impl Instrument {
    pub fn new(root: &str, standard_multiplier: f64, micro_multiplier: f64) -> Self {
        Self {
            root: root.to_uppercase(),
            standard_multiplier,
            micro_multiplier,
        }
    }

    /// NQ is $20/pt (MNQ $2/pt); every other root is priced like ES at
    /// $50/pt (MES $5/pt).
    pub fn for_root(root: &str) -> Self {
        match root.to_uppercase().as_str() {
            "NQ" => Self::new("NQ", 20.0, 2.0),
            other => Self::new(other, 50.0, 5.0),
        }
    }

    pub fn multiplier(&self, class: ContractClass) -> f64 {
        match class {
            ContractClass::Standard => self.standard_multiplier,
            ContractClass::Micro => self.micro_multiplier,
        }
    }

    pub fn contract_symbol(&self, class: ContractClass) -> String {
        match class {
            ContractClass::Standard => self.root.clone(),
            ContractClass::Micro => format!("M{}", self.root),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SizingDecision {
    pub class: ContractClass,
    pub symbol: String,
    pub contracts: u32,
    /// Point value of one contract of the chosen class.
    pub point_value: f64,
    pub risk_budget: f64,
}

/// Fixed-fractional contract sizing.
///
/// Always returns at least one contract, even when one micro contract risks
/// more than the budget.
#[derive(Debug, Clone)]
pub struct PositionSizer {
    pub risk_per_trade: f64,
    /// Stop distance used when entry and stop coincide.
    pub min_stop_distance: f64,
}

impl PositionSizer {
    pub fn new(cfg: &Config) -> Self {
        Self {
            risk_per_trade: cfg.risk_per_trade,
            min_stop_distance: cfg.min_stop_distance,
        }
    }

    pub fn size(
        &self,
        entry_price: f64,
        stop_price: f64,
        instrument: &Instrument,
        account_balance: f64,
    ) -> SizingDecision {
        let risk_budget = account_balance * self.risk_per_trade;

        let mut point_distance = (entry_price - stop_price).abs();
        if point_distance == 0.0 || !point_distance.is_finite() {
            point_distance = self.min_stop_distance;
        }

        let risk_per_standard = point_distance * instrument.standard_multiplier;
        let class = if risk_budget >= risk_per_standard {
            ContractClass::Standard
        } else {
            ContractClass::Micro
        };

        let point_value = instrument.multiplier(class);
        let contracts = (risk_budget / (point_distance * point_value))
            .floor()
            .max(1.0) as u32;

        SizingDecision {
            class,
            symbol: instrument.contract_symbol(class),
            contracts,
            point_value,
            risk_budget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::default_test_config;

    fn sizer() -> PositionSizer {
        PositionSizer::new(&default_test_config())
    }

    #[test]
    fn reference_scenario_one_standard_contract() {
        // 100k * 0.5% = 500 budget; 20 pts * $20 = 400 per NQ
        let d = sizer().size(20000.0, 19980.0, &Instrument::for_root("NQ"), 100_000.0);
        assert_eq!(d.class, ContractClass::Standard);
        assert_eq!(d.symbol, "NQ");
        assert_eq!(d.contracts, 1);
        assert_eq!(d.point_value, 20.0);
        assert!((d.risk_budget - 500.0).abs() < 1e-9);
    }

    #[test]
    fn multiple_standard_contracts_when_budget_allows() {
        // 500 / (5 pts * 20) = 5
        let d = sizer().size(20000.0, 19995.0, &Instrument::for_root("NQ"), 100_000.0);
        assert_eq!(d.class, ContractClass::Standard);
        assert_eq!(d.contracts, 5);
    }

    #[test]
    fn falls_back_to_micro_below_one_standard() {
        // 30 pts * 20 = 600 > 500 -> micro: 500 / (30 * 2) = 8.33 -> 8
        let d = sizer().size(20000.0, 19970.0, &Instrument::for_root("NQ"), 100_000.0);
        assert_eq!(d.class, ContractClass::Micro);
        assert_eq!(d.symbol, "MNQ");
        assert_eq!(d.contracts, 8);
        assert_eq!(d.point_value, 2.0);
    }

    #[test]
    fn switches_exactly_at_boundary() {
        let nq = Instrument::for_root("NQ");
        // budget == risk per standard (25 pts * 20 = 500) stays standard
        let at = sizer().size(20000.0, 19975.0, &nq, 100_000.0);
        assert_eq!(at.class, ContractClass::Standard);
        assert_eq!(at.contracts, 1);
        // one cent under the budget flips to micro
        let under = sizer().size(20000.0, 19975.0, &nq, 99_999.0);
        assert_eq!(under.class, ContractClass::Micro);
    }

    #[test]
    fn zero_distance_uses_floor() {
        // 10 pt floor: 10 * 20 = 200 <= 500 -> 2 NQ
        let d = sizer().size(20000.0, 20000.0, &Instrument::for_root("NQ"), 100_000.0);
        assert_eq!(d.class, ContractClass::Standard);
        assert_eq!(d.contracts, 2);
    }

    #[test]
    fn never_sizes_below_one_contract() {
        let nq = Instrument::for_root("NQ");
        let tiny = sizer().size(20000.0, 18000.0, &nq, 1_000.0);
        assert_eq!(tiny.class, ContractClass::Micro);
        assert_eq!(tiny.contracts, 1);

        let broke = sizer().size(20000.0, 19980.0, &nq, -5_000.0);
        assert_eq!(broke.contracts, 1);
    }

    #[test]
    fn other_roots_use_es_multipliers() {
        let es = Instrument::for_root("es");
        assert_eq!(es.root, "ES");
        assert_eq!(es.standard_multiplier, 50.0);
        assert_eq!(es.micro_multiplier, 5.0);
        assert_eq!(es.contract_symbol(ContractClass::Micro), "MES");

        // 10 pts * 50 = 500 -> exactly one ES
        let d = sizer().size(5000.0, 4990.0, &es, 100_000.0);
        assert_eq!(d.class, ContractClass::Standard);
        assert_eq!(d.contracts, 1);
    }
}
