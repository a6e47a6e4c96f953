//! Numeric and boolean values.
//!
//! [`Short`] and [`Long`] are fixed-width unsigned integers packed in a
//! caller-supplied byte order. [`Integer`], [`Real`], [`Rational`] and
//! [`Boolean`] are encoded as text.

use std::fmt;

use crate::codec::primitives::{ByteOrder, Reader};
use crate::error::{DecodeError, ValueError};
use crate::value::TypeKind;

/// Largest denominator produced when approximating a float as a rational.
pub const MAX_DENOMINATOR: i64 = 1_000_000;

// =============================================================================
// FIXED-WIDTH UNSIGNED INTEGERS
// =============================================================================

macro_rules! fixed_width {
    ($(#[$doc:meta])* $name:ident, $inner:ty, $width:expr, $kind:expr, $read:ident, $pack:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name($inner);

        impl $name {
            /// Encoded width in bytes.
            pub const WIDTH: usize = $width;

            /// Creates a value, failing if it falls outside the unsigned width.
            pub fn new(value: i64) -> Result<$name, ValueError> {
                <$inner>::try_from(value)
                    .map($name)
                    .map_err(|_| ValueError::OutOfRange {
                        kind: $kind,
                        value: value as f64,
                        min: 0.0,
                        max: <$inner>::MAX as f64,
                    })
            }

            pub fn value(self) -> $inner {
                self.0
            }

            /// Always false: the binary standards define these as unsigned.
            pub fn signed(self) -> bool {
                false
            }

            pub fn encode(self, order: ByteOrder) -> [u8; $width] {
                order.$pack(self.0)
            }

            pub fn decode(bytes: &[u8], order: ByteOrder) -> Result<$name, DecodeError> {
                let mut reader = Reader::new(bytes, order);
                let value = reader.$read($kind)?;
                reader.finish($kind)?;
                Ok($name(value))
            }
        }

        impl From<$inner> for $name {
            fn from(value: $inner) -> Self {
                $name(value)
            }
        }

        impl PartialEq<$inner> for $name {
            fn eq(&self, other: &$inner) -> bool {
                self.0 == *other
            }
        }

        impl PartialEq<i64> for $name {
            fn eq(&self, other: &i64) -> bool {
                self.0 as i64 == *other
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

fixed_width!(
    /// 16-bit unsigned integer.
    Short, u16, 2, TypeKind::Short, read_u16, pack_u16
);

fixed_width!(
    /// 32-bit unsigned integer.
    Long, u32, 4, TypeKind::Long, read_u32, pack_u32
);

// =============================================================================
// TEXT-ENCODED NUMERICS
// =============================================================================

fn decode_str(bytes: &[u8], kind: TypeKind) -> Result<&str, DecodeError> {
    std::str::from_utf8(bytes).map_err(|_| DecodeError::InvalidUtf8 { kind })
}

/// Integer encoded as decimal text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Integer(i64);

impl Integer {
    pub fn new(value: i64) -> Self {
        Integer(value)
    }

    pub fn value(self) -> i64 {
        self.0
    }

    pub fn encode(self) -> Vec<u8> {
        self.0.to_string().into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Integer, DecodeError> {
        let text = decode_str(bytes, TypeKind::Integer)?;
        text.parse()
            .map(Integer)
            .map_err(|_| DecodeError::Malformed {
                kind: TypeKind::Integer,
                input: text.to_string(),
            })
    }
}

impl PartialEq<i64> for Integer {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Integer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Finite float encoded as decimal text.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Real(f64);

impl Real {
    pub fn new(value: f64) -> Result<Real, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::Invalid {
                kind: TypeKind::Real,
                reason: format!("{} is not finite", value),
            });
        }
        Ok(Real(value))
    }

    pub fn value(self) -> f64 {
        self.0
    }

    pub fn encode(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Real, DecodeError> {
        let text = decode_str(bytes, TypeKind::Real)?;
        let malformed = || DecodeError::Malformed {
            kind: TypeKind::Real,
            input: text.to_string(),
        };
        let value: f64 = text.parse().map_err(|_| malformed())?;
        if !value.is_finite() {
            return Err(malformed());
        }
        Ok(Real(value))
    }
}

impl PartialEq<f64> for Real {
    fn eq(&self, other: &f64) -> bool {
        self.0 == *other
    }
}

/// Shortest round-trip repr: integral values keep a `.0`, and magnitudes
/// outside `[1e-4, 1e16)` switch to `d.ddde±XX` notation.
impl fmt::Display for Real {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = self.0;
        if value == 0.0 {
            return f.write_str(if value.is_sign_negative() { "-0.0" } else { "0.0" });
        }

        let scientific = format!("{:e}", value);
        let (mantissa, exponent) = scientific.split_once('e').unwrap_or((&scientific, "0"));
        let exponent: i32 = exponent.parse().unwrap_or(0);

        if (-4..16).contains(&exponent) {
            let plain = format!("{}", value);
            if plain.contains('.') {
                f.write_str(&plain)
            } else {
                write!(f, "{}.0", plain)
            }
        } else {
            let sign = if exponent < 0 { '-' } else { '+' };
            write!(f, "{}e{}{:02}", mantissa, sign, exponent.abs())
        }
    }
}

/// Numerator/denominator pair encoded as `"{numerator}/{denominator}"`.
///
/// Derived forms are computed on demand, so changing either component
/// changes the string and float forms immediately.
#[derive(Debug, Clone, Copy)]
pub struct Rational {
    numerator: i64,
    denominator: i64,
}

impl Rational {
    pub fn new(numerator: i64, denominator: i64) -> Result<Rational, ValueError> {
        if denominator == 0 {
            return Err(ValueError::ZeroDenominator);
        }
        Ok(Rational {
            numerator,
            denominator,
        })
    }

    /// Best rational approximation with denominator at most [`MAX_DENOMINATOR`].
    pub fn from_f64(value: f64) -> Result<Rational, ValueError> {
        if !value.is_finite() {
            return Err(ValueError::Invalid {
                kind: TypeKind::Rational,
                reason: format!("{} is not finite", value),
            });
        }
        if value.abs() >= i64::MAX as f64 {
            return Err(ValueError::OutOfRange {
                kind: TypeKind::Rational,
                value,
                min: i64::MIN as f64,
                max: i64::MAX as f64,
            });
        }

        let (numerator, denominator) = approximate(value.abs(), MAX_DENOMINATOR as i128);
        let numerator = i64::try_from(numerator).map_err(|_| ValueError::OutOfRange {
            kind: TypeKind::Rational,
            value,
            min: i64::MIN as f64,
            max: i64::MAX as f64,
        })?;
        let numerator = if value < 0.0 { -numerator } else { numerator };
        Rational::new(numerator, denominator as i64)
    }

    /// Parses `"n/d"` text supplied by a caller.
    pub fn parse(s: &str) -> Result<Rational, ValueError> {
        Rational::decode(s.as_bytes()).map_err(|_| ValueError::Invalid {
            kind: TypeKind::Rational,
            reason: format!("{:?} is not of the form \"n/d\"", s),
        })
    }

    pub fn numerator(&self) -> i64 {
        self.numerator
    }

    pub fn denominator(&self) -> i64 {
        self.denominator
    }

    pub fn set_numerator(&mut self, numerator: i64) {
        self.numerator = numerator;
    }

    pub fn set_denominator(&mut self, denominator: i64) -> Result<(), ValueError> {
        if denominator == 0 {
            return Err(ValueError::ZeroDenominator);
        }
        self.denominator = denominator;
        Ok(())
    }

    pub fn to_f64(&self) -> f64 {
        self.numerator as f64 / self.denominator as f64
    }

    /// Returns both components as unsigned 32-bit words, if they fit.
    pub fn to_u32_pair(&self) -> Option<(u32, u32)> {
        Some((
            u32::try_from(self.numerator).ok()?,
            u32::try_from(self.denominator).ok()?,
        ))
    }

    pub fn encode(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    pub fn decode(bytes: &[u8]) -> Result<Rational, DecodeError> {
        let text = decode_str(bytes, TypeKind::Rational)?;
        let malformed = || DecodeError::Malformed {
            kind: TypeKind::Rational,
            input: text.to_string(),
        };

        let mut parts = text.split('/');
        let (Some(numerator), Some(denominator), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let numerator: i64 = numerator.parse().map_err(|_| malformed())?;
        let denominator: i64 = denominator.parse().map_err(|_| malformed())?;
        Rational::new(numerator, denominator).map_err(|_| malformed())
    }

    /// Decodes two unsigned 32-bit words (numerator, then denominator).
    pub fn decode_binary(bytes: &[u8], order: ByteOrder) -> Result<Rational, DecodeError> {
        let mut reader = Reader::new(bytes, order);
        let numerator = reader.read_u32(TypeKind::Rational)?;
        let denominator = reader.read_u32(TypeKind::Rational)?;
        reader.finish(TypeKind::Rational)?;
        Rational::new(numerator as i64, denominator as i64).map_err(|_| DecodeError::Malformed {
            kind: TypeKind::Rational,
            input: format!("{}/{}", numerator, denominator),
        })
    }
}

/// Continued-fraction expansion of `x >= 0`, keeping the last convergent or
/// semiconvergent whose denominator fits `max_denominator`.
fn approximate(x: f64, max_denominator: i128) -> (i128, i128) {
    let (mut p0, mut q0, mut p1, mut q1) = (0i128, 1i128, 1i128, 0i128);
    let mut remainder = x;
    let mut bounded = false;

    loop {
        let a = remainder.floor();
        if q1 > 0 && a > max_denominator as f64 {
            bounded = true;
            break;
        }
        let a = a as i128;
        let q2 = q0 + a * q1;
        if q2 > max_denominator {
            bounded = true;
            break;
        }
        (p0, q0, p1, q1) = (p1, q1, p0 + a * p1, q2);

        let fraction = remainder - a as f64;
        if fraction <= f64::EPSILON * remainder.max(1.0) {
            break;
        }
        remainder = 1.0 / fraction;
    }

    if !bounded {
        return (p1, q1);
    }

    let k = (max_denominator - q0) / q1;
    let (p_semi, q_semi) = (p0 + k * p1, q0 + k * q1);
    let error_convergent = (p1 as f64 / q1 as f64 - x).abs();
    let error_semi = (p_semi as f64 / q_semi as f64 - x).abs();
    if error_convergent <= error_semi {
        (p1, q1)
    } else {
        (p_semi, q_semi)
    }
}

impl PartialEq for Rational {
    fn eq(&self, other: &Rational) -> bool {
        self.numerator as i128 * other.denominator as i128
            == other.numerator as i128 * self.denominator as i128
    }
}

impl PartialEq<f64> for Rational {
    fn eq(&self, other: &f64) -> bool {
        self.to_f64() == *other
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

// =============================================================================
// BOOLEAN
// =============================================================================

/// Boolean encoded as the literal text `True` / `False`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Boolean(bool);

impl Boolean {
    pub fn new(value: bool) -> Self {
        Boolean(value)
    }

    pub fn value(self) -> bool {
        self.0
    }

    pub fn encode(self) -> Vec<u8> {
        self.to_string().into_bytes()
    }

    /// Requires an exact, case-sensitive `True` or `False`.
    pub fn decode(bytes: &[u8]) -> Result<Boolean, DecodeError> {
        match bytes {
            b"True" => Ok(Boolean(true)),
            b"False" => Ok(Boolean(false)),
            _ => Err(DecodeError::UnknownBoolean {
                found: String::from_utf8_lossy(bytes).into_owned(),
            }),
        }
    }
}

impl PartialEq<bool> for Boolean {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for Boolean {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.0 { "True" } else { "False" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short() {
        let encoded = Short::new(123).unwrap();
        assert!(!encoded.signed());
        assert_eq!(encoded, 123u16);
        assert_eq!(encoded.encode(ByteOrder::Msb), [0x00, 0x7b]);
        assert_eq!(encoded.encode(ByteOrder::Lsb), [0x7b, 0x00]);

        let decoded = Short::decode(&[0x01, 0xc8], ByteOrder::Msb).unwrap();
        assert_eq!(decoded, 456u16);
        assert_eq!(decoded.encode(ByteOrder::Lsb), [0xc8, 0x01]);
    }

    #[test]
    fn test_short_bounds() {
        for v in [0i64, 65535] {
            let short = Short::new(v).unwrap();
            assert_eq!(Short::decode(&short.encode(ByteOrder::Msb), ByteOrder::Msb).unwrap(), short);
        }
        assert!(matches!(Short::new(65536), Err(ValueError::OutOfRange { .. })));
        assert!(matches!(Short::new(-1), Err(ValueError::OutOfRange { .. })));
    }

    #[test]
    fn test_long() {
        let encoded = Long::new(123).unwrap();
        assert_eq!(encoded.encode(ByteOrder::Msb), [0x00, 0x00, 0x00, 0x7b]);
        assert_eq!(encoded.encode(ByteOrder::Lsb), [0x7b, 0x00, 0x00, 0x00]);

        let decoded = Long::decode(&[0x01, 0xc8, 0x01, 0xc8], ByteOrder::Msb).unwrap();
        assert_eq!(decoded, 29884872u32);
        assert_eq!(decoded.encode(ByteOrder::Lsb), [0xc8, 0x01, 0xc8, 0x01]);

        let max = Long::new(u32::MAX as i64).unwrap();
        assert_eq!(Long::decode(&max.encode(ByteOrder::Lsb), ByteOrder::Lsb).unwrap(), max);
        assert!(Long::new(u32::MAX as i64 + 1).is_err());
    }

    #[test]
    fn test_fixed_width_length_checked() {
        assert!(matches!(
            Short::decode(&[0x01], ByteOrder::Msb),
            Err(DecodeError::UnexpectedLength { .. })
        ));
        assert!(Long::decode(&[0, 0, 0, 0, 0], ByteOrder::Msb).is_err());
    }

    #[test]
    fn test_integer() {
        let encoded = Integer::new(123);
        assert_eq!(encoded, 123i64);
        assert_eq!(encoded.encode(), b"123");

        let decoded = Integer::decode(b"456").unwrap();
        assert_eq!(decoded.value(), 456);
        assert!(Integer::decode(b"4.5").is_err());
    }

    #[test]
    fn test_real() {
        let encoded = Real::new(123.456).unwrap();
        assert_eq!(encoded, 123.456);
        assert_eq!(encoded.encode(), b"123.456");

        let decoded = Real::decode(b"456.123").unwrap();
        assert_eq!(decoded, 456.123);
        assert_eq!(decoded.encode(), b"456.123");
    }

    #[test]
    fn test_real_stringification() {
        assert_eq!(Real::new(1.0).unwrap().to_string(), "1.0");
        assert_eq!(Real::new(-2.5).unwrap().to_string(), "-2.5");
        assert_eq!(Real::new(0.0001).unwrap().to_string(), "0.0001");
        assert_eq!(Real::new(0.00001).unwrap().to_string(), "1e-05");
        assert_eq!(Real::new(1e16).unwrap().to_string(), "1e+16");
        assert_eq!(Real::new(1.5e20).unwrap().to_string(), "1.5e+20");
        assert!(Real::new(f64::NAN).is_err());
        assert!(Real::decode(b"inf").is_err());
    }

    #[test]
    fn test_rational() {
        let mut encoded = Rational::from_f64(0.75).unwrap();
        assert_eq!(encoded.to_string(), "3/4");
        assert_eq!(encoded.to_f64(), 0.75);
        assert_eq!(encoded.encode(), b"3/4");

        encoded.set_numerator(1);
        encoded.set_denominator(2).unwrap();
        assert_eq!(encoded.encode(), b"1/2");
        assert_eq!(encoded.to_f64(), 0.5);

        let decoded = Rational::decode(b"4/9").unwrap();
        assert_eq!(decoded.numerator(), 4);
        assert_eq!(decoded.denominator(), 9);
        assert_eq!(decoded.to_f64(), 0.4444444444444444);
        assert_eq!(decoded.encode(), b"4/9");
    }

    #[test]
    fn test_rational_decode_rejects_malformed() {
        for input in [&b"4"[..], b"4/9/1", b"a/9", b"4/", b"4/0"] {
            assert!(
                matches!(Rational::decode(input), Err(DecodeError::Malformed { .. })),
                "accepted {:?}",
                input
            );
        }
        assert_eq!(Rational::new(1, 0), Err(ValueError::ZeroDenominator));
    }

    #[test]
    fn test_rational_approximation() {
        assert_eq!(Rational::from_f64(0.1).unwrap().to_string(), "1/10");
        assert_eq!(Rational::from_f64(-1.5).unwrap().to_string(), "-3/2");
        assert_eq!(Rational::from_f64(2.0).unwrap().to_string(), "2/1");
        assert_eq!(
            Rational::from_f64(std::f64::consts::PI).unwrap().to_string(),
            "3126535/995207"
        );
    }

    #[test]
    fn test_rational_binary() {
        let value = Rational::new(72, 1).unwrap();
        assert_eq!(value.to_u32_pair(), Some((72, 1)));
        let decoded = Rational::decode_binary(&[0, 0, 0, 72, 0, 0, 0, 1], ByteOrder::Msb).unwrap();
        assert_eq!(decoded, value);
        assert_eq!(Rational::new(-1, 2).unwrap().to_u32_pair(), None);
    }

    #[test]
    fn test_boolean() {
        let encoded = Boolean::new(true);
        assert_eq!(encoded.value(), true);
        assert_eq!(encoded.encode(), b"True");

        let decoded = Boolean::decode(b"False").unwrap();
        assert!(!decoded.value());
        assert_eq!(decoded.encode(), b"False");

        assert!(matches!(
            Boolean::decode(b"false"),
            Err(DecodeError::UnknownBoolean { .. })
        ));
    }

    proptest! {
        #[test]
        fn prop_short_roundtrip(v in any::<u16>(), lsb in any::<bool>()) {
            let order = if lsb { ByteOrder::Lsb } else { ByteOrder::Msb };
            let short = Short::from(v);
            prop_assert_eq!(Short::decode(&short.encode(order), order).unwrap(), short);
        }

        #[test]
        fn prop_long_roundtrip(v in any::<u32>(), lsb in any::<bool>()) {
            let order = if lsb { ByteOrder::Lsb } else { ByteOrder::Msb };
            let long = Long::from(v);
            prop_assert_eq!(Long::decode(&long.encode(order), order).unwrap(), long);
        }

        #[test]
        fn prop_integer_roundtrip(v in any::<i64>()) {
            let integer = Integer::new(v);
            prop_assert_eq!(Integer::decode(&integer.encode()).unwrap(), integer);
        }

        #[test]
        fn prop_real_roundtrip(v in -1e300f64..1e300) {
            let real = Real::new(v).unwrap();
            prop_assert_eq!(Real::decode(&real.encode()).unwrap(), real);
        }

        #[test]
        fn prop_rational_roundtrip(n in any::<i64>(), d in 1i64..=i64::MAX) {
            let rational = Rational::new(n, d).unwrap();
            let decoded = Rational::decode(&rational.encode()).unwrap();
            prop_assert_eq!(decoded.numerator(), n);
            prop_assert_eq!(decoded.denominator(), d);
        }
    }
}
