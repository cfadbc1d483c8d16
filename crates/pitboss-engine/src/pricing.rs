//! Derived-currency price discovery.
//!
//! ```text
//!   computed = 1 + α · log10(1 + circulation / S)
//!   hm_new   = retain · hm_old + (1 − retain) · computed
//!   price    = base_price · hm
//! ```
//!
//! An enabled override short-circuits all of it.

use pitboss_types::constants::{HM_PRECISION, PRICE_PRECISION};
use pitboss_types::{Coin, PitbossError, PricingConfig, Result};
use rust_decimal::{Decimal, MathematicalOps};

/// Undamped multiplier for the current circulation.
///
/// Negative circulation is treated as zero.
///
/// # Errors
/// Returns [`PitbossError::InvariantViolation`] if the logarithm is undefined
/// or an intermediate value overflows.
pub fn computed_multiplier(circulation: Decimal, cfg: &PricingConfig) -> Result<Decimal> {
    let circulation = circulation.max(Decimal::ZERO);
    let arg = circulation
        .checked_div(cfg.circulation_scale)
        .and_then(|ratio| Decimal::ONE.checked_add(ratio))
        .ok_or_else(|| out_of_range("circulation ratio"))?;
    let log = arg.checked_log10().ok_or_else(|| PitbossError::InvariantViolation {
        reason: format!("log10 undefined for {arg}"),
    })?;
    cfg.alpha
        .checked_mul(log)
        .and_then(|scaled| Decimal::ONE.checked_add(scaled))
        .ok_or_else(|| out_of_range("multiplier"))
}

/// EMA step from `previous` toward the computed multiplier.
///
/// # Errors
/// See [`computed_multiplier`].
pub fn next_multiplier(previous: Decimal, circulation: Decimal, cfg: &PricingConfig) -> Result<Decimal> {
    let computed = computed_multiplier(circulation, cfg)?;
    let kept = cfg.ema_retain.checked_mul(previous);
    let moved = (Decimal::ONE - cfg.ema_retain).checked_mul(computed);
    let next = kept
        .zip(moved)
        .and_then(|(a, b)| a.checked_add(b))
        .ok_or_else(|| out_of_range("multiplier step"))?;
    Ok(next.round_dp(HM_PRECISION))
}

fn out_of_range(what: &str) -> PitbossError {
    PitbossError::InvariantViolation {
        reason: format!("{what} out of range"),
    }
}

/// Price of `coin` from its stored state. No writes, no feed. Saturates
/// rather than overflowing.
#[must_use]
pub fn resolve_price(coin: &Coin) -> Decimal {
    let market = &coin.market;
    if market.override_enabled {
        return market.override_price;
    }
    let price = if market.hm_enabled {
        coin.base_price.saturating_mul(market.hm_value)
    } else {
        coin.base_price
    };
    price.round_dp(PRICE_PRECISION)
}

#[cfg(test)]
mod tests {
    use pitboss_types::CoinMarket;

    use super::*;

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < Decimal::new(1, 9)
    }

    fn gpc(market: CoinMarket) -> Coin {
        Coin {
            symbol: "GPC".into(),
            name: "GlorpCoin".into(),
            decimals: 4,
            base_price: Decimal::new(4000, 0),
            market,
        }
    }

    #[test]
    fn runaway_circulation_is_an_error() {
        let cfg = PricingConfig {
            circulation_scale: Decimal::new(1, 3),
            ..PricingConfig::default()
        };
        assert!(matches!(
            computed_multiplier(Decimal::MAX, &cfg),
            Err(PitbossError::InvariantViolation { .. })
        ));
    }

    #[test]
    fn empty_economy_multiplier_is_one() {
        let cfg = PricingConfig::default();
        assert!(close(computed_multiplier(Decimal::ZERO, &cfg).unwrap(), Decimal::ONE));
        assert!(close(computed_multiplier(Decimal::from(-50), &cfg).unwrap(), Decimal::ONE));
    }

    #[test]
    fn multiplier_grows_with_log_of_circulation() {
        let cfg = PricingConfig::default();
        // 1 + 900/100 = 10 → log10 = 1 → 1.1
        let m = computed_multiplier(Decimal::from(900), &cfg).unwrap();
        assert!(close(m, Decimal::new(11, 1)), "got {m}");
        // 1 + 9900/100 = 100 → 1.2
        let m = computed_multiplier(Decimal::from(9900), &cfg).unwrap();
        assert!(close(m, Decimal::new(12, 1)), "got {m}");
    }

    #[test]
    fn ema_damps_toward_computed() {
        let cfg = PricingConfig::default();
        let next = next_multiplier(Decimal::ONE, Decimal::from(900), &cfg).unwrap();
        // 0.7 × 1 + 0.3 × 1.1
        assert!(close(next, Decimal::new(103, 2)), "got {next}");
        let again = next_multiplier(next, Decimal::from(900), &cfg).unwrap();
        assert!(again > next && again < Decimal::new(11, 1));
    }

    #[test]
    fn override_wins() {
        let mut market = CoinMarket::floating(true);
        market.hm_value = Decimal::new(15, 1);
        market.override_enabled = true;
        market.override_price = Decimal::new(1234, 0);
        assert_eq!(resolve_price(&gpc(market)), Decimal::new(1234, 0));
    }

    #[test]
    fn multiplier_applies_only_when_enabled() {
        let mut market = CoinMarket::floating(false);
        market.hm_value = Decimal::new(105, 2);
        assert_eq!(resolve_price(&gpc(market.clone())), Decimal::new(4000, 0));
        market.hm_enabled = true;
        assert_eq!(resolve_price(&gpc(market)), Decimal::new(4200, 0));
    }
}
