use bigdecimal::{BigDecimal, ToPrimitive, Zero};

/// |value - base| / |base|，base 为 0 时返回 None (由调用方按不匹配处理)
pub fn relative_variance(value: &BigDecimal, base: &BigDecimal) -> Option<f64> {
    if base.is_zero() {
        return None;
    }
    let diff = (value - base).abs();
    (diff / base.abs()).to_f64()
}

pub fn abs_diff(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    (a - b).abs()
}

pub fn to_f64(value: &BigDecimal) -> f64 {
    value.to_f64().unwrap_or(f64::MAX)
}
