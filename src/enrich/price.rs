use crate::lookups::price::PriceSource;

/// Resolve the USD unit price for one token identifier. Lookup is
/// case-insensitive; an unknown or malformed token resolves to the explicit
/// 0.0 "unpriced" sentinel. Returns (price, defaulted).
pub fn price_for(token: &str, prices: &dyn PriceSource) -> (f64, bool) {
    let key = token.trim().to_lowercase();
    if key.is_empty() {
        return (0.0, true);
    }
    match prices.price_usd(&key) {
        Some(price) => (price, false),
        None => (0.0, true),
    }
}
