//! 定点整数到十进制单位的换算。
//!
//! 服务端价格与成交额以「厘」(×1000) 传输，五档挂单量以 1/100 手传输，
//! 总成交量 `TotalHand` 已经是整手，不再缩放。

use rust_decimal::Decimal;

/// 价格与成交额的小数位数 (×1000)
pub const PRICE_SCALE: u32 = 3;

/// 五档挂单量的小数位数 (×100)
pub const DEPTH_VOLUME_SCALE: u32 = 2;

/// # Summary
/// 将以厘为单位的整数价格换算为元。
///
/// # Logic
/// 直接构造 scale 为 3 的 Decimal，等价于 `raw / 1000`，没有舍入误差。
pub fn to_decimal_price(raw: i64) -> Decimal {
    Decimal::new(raw, PRICE_SCALE)
}

/// # Summary
/// 将五档挂单量 (1/100 手) 换算为手。
pub fn to_lot_volume_from_depth(raw: i64) -> Decimal {
    Decimal::new(raw, DEPTH_VOLUME_SCALE)
}

/// # Summary
/// 总成交量 `TotalHand` 已是整手，原样返回。
pub fn to_lot_volume_aggregate(raw: i64) -> Decimal {
    Decimal::from(raw)
}

/// # Summary
/// 将以厘为单位的成交额换算为元。
pub fn to_turnover(raw: i64) -> Decimal {
    Decimal::new(raw, PRICE_SCALE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_price_is_exact_thousandth() {
        assert_eq!(to_decimal_price(15230), dec!(15.23));
        assert_eq!(to_decimal_price(1), dec!(0.001));
        assert_eq!(to_decimal_price(-2500), dec!(-2.5));
        assert_eq!(to_decimal_price(0), Decimal::ZERO);
        for p in [7_i64, 999, 1_000, 123_456_789] {
            assert_eq!(to_decimal_price(p), Decimal::from(p) / Decimal::from(1000));
        }
    }

    #[test]
    fn test_depth_volume_is_hundredth() {
        assert_eq!(to_lot_volume_from_depth(500), dec!(5));
        assert_eq!(to_lot_volume_from_depth(150), dec!(1.5));
        for v in [1_i64, 99, 12_345] {
            assert_eq!(to_lot_volume_from_depth(v), Decimal::from(v) / Decimal::from(100));
        }
    }

    #[test]
    fn test_aggregate_volume_is_not_scaled() {
        assert_eq!(to_lot_volume_aggregate(120000), dec!(120000));
        assert_eq!(to_turnover(1823400000), dec!(1823400));
    }
}
