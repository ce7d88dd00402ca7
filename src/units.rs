use bigdecimal::BigDecimal;
use num_bigint::{BigInt, BigUint, Sign};

/// Convert a smallest-unit balance into display units (`balance / 10^decimals`).
///
/// The integer becomes the mantissa and `decimals` the scale, so the result is
/// exact for any bit length.
pub fn to_decimal_unit(balance: &BigUint, decimals: u8) -> BigDecimal {
    let mantissa = BigInt::from_biguint(Sign::Plus, balance.clone());
    BigDecimal::new(mantissa, i64::from(decimals))
}

/// True when `balance` is strictly below `threshold`
pub fn exceeds_threshold(balance: &BigDecimal, threshold: &BigDecimal) -> bool {
    balance < threshold
}

/// Render a decimal in plain notation without trailing zeros
pub fn format_decimal(value: &BigDecimal) -> String {
    value.normalized().to_plain_string()
}

/// Parse a JSON-RPC hex quantity such as `0x1bc16d674ec80000`.
///
/// The `0x` prefix is optional. Returns `None` for empty, signed or
/// non-hex input.
pub fn parse_hex_quantity(value: &str) -> Option<BigUint> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Parse a base-10 integer amount such as the Cosmos bank `amount` field
pub fn parse_integer_amount(value: &str) -> Option<BigUint> {
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    BigUint::parse_bytes(value.as_bytes(), 10)
}
