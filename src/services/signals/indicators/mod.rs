//! Indicator implementations.

pub mod ahr999;
pub mod dominance;
pub mod etf;
pub mod fear_greed;
pub mod funding_rate;
pub mod halving;
pub mod holdings;
pub mod long_short;
pub mod max_pain;
pub mod mayer;
pub mod pi_cycle;
pub mod power_law;
pub mod reserve;
pub mod rsi;
pub mod trend;

pub use ahr999::Ahr999;
pub use dominance::BtcDominance;
pub use etf::EtfActivity;
pub use fear_greed::FearGreed;
pub use funding_rate::FundingRate;
pub use halving::HalvingCycle;
pub use holdings::CompanyHoldings;
pub use long_short::LongShortRatio;
pub use max_pain::MaxPain;
pub use mayer::MayerMultiple;
pub use pi_cycle::PiCycleTop;
pub use power_law::PowerLawCorridor;
pub use reserve::ExchangeReserve;
pub use rsi::RsiFormula;
pub use trend::TrendFormula;

use super::{Indicator, MultiTimeframe};

/// Get all available indicators, in display order.
pub fn all_indicators() -> Vec<Box<dyn Indicator>> {
    vec![
        // Core
        Box::new(MayerMultiple::default()),
        Box::new(PiCycleTop::default()),
        Box::new(HalvingCycle),
        // Reference
        Box::new(Ahr999),
        Box::new(PowerLawCorridor),
        Box::new(FearGreed),
        Box::new(FundingRate),
        Box::new(LongShortRatio),
        Box::new(MaxPain),
        // Auxiliary
        Box::new(BtcDominance),
        Box::new(EtfActivity),
        Box::new(CompanyHoldings),
        Box::new(ExchangeReserve),
        // Short term
        Box::new(MultiTimeframe::new(RsiFormula::default())),
        Box::new(MultiTimeframe::new(TrendFormula::default())),
    ]
}
