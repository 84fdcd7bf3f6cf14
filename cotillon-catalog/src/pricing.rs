//! Discount computation
//!
//! Money math stays in `Decimal`; final prices are rounded half-up to cents.

use rust_decimal::prelude::*;
use shared::models::{Discount, Offer};

const DECIMAL_PLACES: u32 = 2;

/// Listed price with its discount overlay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceResolution {
    pub price: Decimal,
    pub original_price: Decimal,
    pub discount: Option<Discount>,
}

/// Resolve the listed price
///
/// The percentage comes from the product's own discount, then the matching
/// offer, then is inferred from `base < original`. Without any percentage
/// the base price is listed as is.
pub fn resolve_price(
    base: Decimal,
    original: Decimal,
    own_percent: Option<Decimal>,
    offer: Option<&Offer>,
) -> PriceResolution {
    let mut percent = own_percent
        .filter(|p| !p.is_zero())
        .or_else(|| offer.map(|o| o.percent).filter(|p| !p.is_zero()))
        .map(whole_percent)
        .unwrap_or(0);

    if percent == 0 && original > Decimal::ZERO && base < original {
        percent = whole_percent((Decimal::ONE - base / original) * Decimal::ONE_HUNDRED);
    }

    if percent == 0 {
        return PriceResolution {
            price: base,
            original_price: original,
            discount: None,
        };
    }

    let factor = Decimal::ONE - Decimal::from(percent) / Decimal::ONE_HUNDRED;
    let price = (original * factor)
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero);

    PriceResolution {
        price,
        original_price: original,
        discount: Some(Discount {
            percent,
            offer_id: offer.and_then(|o| o.id.clone()),
        }),
    }
}

/// Round to a whole percentage within `0..=100`
fn whole_percent(value: Decimal) -> u32 {
    value
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u32()
        .unwrap_or(0)
        .min(100)
}

/// First offer active at `now_millis` that targets the product
pub fn find_offer<'a>(
    offers: &'a [Offer],
    product_id: &str,
    category_id: Option<i64>,
    now_millis: i64,
) -> Option<&'a Offer> {
    offers
        .iter()
        .find(|o| o.is_active_at(now_millis) && o.targets(product_id, category_id))
}
