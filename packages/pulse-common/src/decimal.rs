use cosmwasm_schema::cw_serde;
use cosmwasm_std::Uint128;

/// A signed 128-bit fixed-point value: an unsigned magnitude plus a sign
/// flag. The zero value is never negative.
///
/// For hashing, the value is encoded as an `i128` in little-endian
/// two's-complement: `magnitude` when non-negative, `2^128 - magnitude`
/// when negative.
#[cw_serde]
#[derive(Copy, Eq)]
pub struct Decimal {
    magnitude: Uint128,
    neg: bool,
}

impl Decimal {
    pub fn new(magnitude: u128, neg: bool) -> Self {
        Decimal {
            magnitude: Uint128::new(magnitude),
            // -0 normalizes to +0
            neg: neg && magnitude != 0,
        }
    }

    pub fn zero() -> Self {
        Decimal::new(0, false)
    }

    /// Raw magnitude, sign ignored.
    pub fn value(&self) -> u128 {
        self.magnitude.u128()
    }

    pub fn is_neg(&self) -> bool {
        self.neg
    }

    pub fn unpack(&self) -> (u128, bool) {
        (self.magnitude.u128(), self.neg)
    }

    /// Canonical 16-byte little-endian two's-complement encoding used by
    /// the message hasher.
    pub fn to_le_bytes(&self) -> [u8; 16] {
        if self.neg {
            self.magnitude.u128().wrapping_neg().to_le_bytes()
        } else {
            self.magnitude.u128().to_le_bytes()
        }
    }

    /// Signed interpretation. `None` if the magnitude exceeds the i128
    /// domain (> 2^127 for negative values, > 2^127 - 1 for positive).
    pub fn to_i128(&self) -> Option<i128> {
        if self.neg {
            if self.magnitude.u128() > 1u128 << 127 {
                None
            } else {
                Some((self.magnitude.u128() as i128).wrapping_neg())
            }
        } else {
            i128::try_from(self.magnitude.u128()).ok()
        }
    }

    pub fn from_i128(v: i128) -> Self {
        Decimal::new(v.unsigned_abs(), v < 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negative_zero_normalizes() {
        let d = Decimal::new(0, true);
        assert!(!d.is_neg());
        assert_eq!(d, Decimal::zero());
    }

    #[test]
    fn test_le_encoding_positive() {
        let d = Decimal::new(1, false);
        let mut expected = [0u8; 16];
        expected[0] = 1;
        assert_eq!(d.to_le_bytes(), expected);
    }

    #[test]
    fn test_le_encoding_negative_one() {
        // -1 in two's complement is all ones
        let d = Decimal::new(1, true);
        assert_eq!(d.to_le_bytes(), [0xFF; 16]);
    }

    #[test]
    fn test_le_encoding_negative_is_complement() {
        let d = Decimal::new(12345, true);
        let expected = (12345u128.wrapping_neg()).to_le_bytes();
        assert_eq!(d.to_le_bytes(), expected);
        // 2^128 - 12345 interpretation
        let as_u128 = u128::from_le_bytes(d.to_le_bytes());
        assert_eq!(as_u128, u128::MAX - 12345 + 1);
    }

    #[test]
    fn test_i128_round_trip() {
        for v in [0i128, 1, -1, 12345, -12345, i128::MAX, i128::MIN] {
            let d = Decimal::from_i128(v);
            assert_eq!(d.to_i128(), Some(v));
            assert_eq!(d.to_le_bytes(), v.to_le_bytes());
        }
    }

    #[test]
    fn test_i128_out_of_range() {
        assert_eq!(Decimal::new(u128::MAX, false).to_i128(), None);
        assert_eq!(Decimal::new((1u128 << 127) + 1, true).to_i128(), None);
        // i128::MIN magnitude is exactly 2^127 and is representable
        assert_eq!(
            Decimal::new(1u128 << 127, true).to_i128(),
            Some(i128::MIN)
        );
    }
}
