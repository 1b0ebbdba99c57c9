//! Purchase cost curve

/// Cost reported for an upgrade that cannot be bought again
pub const UNAFFORDABLE: u32 = u32::MAX;

/// Price of the next purchase after `purchases` earlier ones
///
/// `round(base_cost * multiplier^purchases)`, saturating at [`UNAFFORDABLE`].
pub fn upgrade_cost(base_cost: u32, multiplier: f64, purchases: u32, allow_multiple: bool) -> u32 {
    if !allow_multiple && purchases > 0 {
        return UNAFFORDABLE;
    }
    let exponent = i32::try_from(purchases).unwrap_or(i32::MAX);
    let raw = (base_cost as f64 * multiplier.powi(exponent)).round();
    if !raw.is_finite() || raw >= UNAFFORDABLE as f64 {
        UNAFFORDABLE
    } else if raw <= 0.0 {
        0
    } else {
        raw as u32
    }
}
