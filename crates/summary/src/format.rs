//! en-US number rendering used in prompt text.

/// Integer with thousands separators: `12345.6 → "12,346"`
pub fn num0(value: f64) -> String {
    group_thousands(value, 0)
}

/// Two decimals with thousands separators: `1234.5 → "1,234.50"`
pub fn num2(value: f64) -> String {
    group_thousands(value, 2)
}

/// [`num2`] for a "no data" aware average
pub fn avg2(value: Option<f64>) -> String {
    value.map(num2).unwrap_or_else(|| "n/a".to_string())
}

fn group_thousands(value: f64, decimals: usize) -> String {
    if !value.is_finite() {
        return "n/a".to_string();
    }

    let fixed = round_half_up(value.abs(), decimals);
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((int_part, frac_part)) => (int_part, Some(frac_part)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::with_capacity(fixed.len() + int_part.len() / 3 + 1);
    if value < 0.0 && fixed.chars().any(|c| c.is_ascii_digit() && c != '0') {
        out.push('-');
    }
    for (idx, digit) in int_part.chars().enumerate() {
        if idx > 0 && (int_part.len() - idx) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(frac_part) = frac_part {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Fixed-point text of a non-negative `value`, rounding the shortest
/// decimal form with ties away from zero.
fn round_half_up(value: f64, decimals: usize) -> String {
    let shortest = value.to_string();
    let (int_part, frac_part) = shortest.split_once('.').unwrap_or((shortest.as_str(), ""));

    let round_up = frac_part
        .as_bytes()
        .get(decimals)
        .is_some_and(|&digit| digit >= b'5');
    let mut digits: Vec<u8> = int_part
        .bytes()
        .chain(frac_part.bytes().chain(std::iter::repeat(b'0')).take(decimals))
        .collect();

    if round_up {
        let mut idx = digits.len();
        loop {
            if idx == 0 {
                digits.insert(0, b'1');
                break;
            }
            idx -= 1;
            if digits[idx] == b'9' {
                digits[idx] = b'0';
            } else {
                digits[idx] += 1;
                break;
            }
        }
    }

    let split = digits.len() - decimals;
    let mut out = String::from_utf8_lossy(&digits[..split]).into_owned();
    if decimals > 0 {
        out.push('.');
        out.push_str(&String::from_utf8_lossy(&digits[split..]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_thousands() {
        assert_eq!(num0(0.0), "0");
        assert_eq!(num0(999.0), "999");
        assert_eq!(num0(1000.0), "1,000");
        assert_eq!(num0(1234567.0), "1,234,567");
        assert_eq!(num2(1234.5), "1,234.50");
        assert_eq!(num2(5.0), "5.00");
    }

    #[test]
    fn rounds_and_keeps_sign() {
        assert_eq!(num0(2.5001), "3");
        assert_eq!(num2(-1234.567), "-1,234.57");
        assert_eq!(num2(-0.001), "0.00");
    }

    #[test]
    fn halves_round_away_from_zero() {
        assert_eq!(num2(0.125), "0.13");
        assert_eq!(num2(1.005), "1.01");
        assert_eq!(num2(-0.125), "-0.13");
        assert_eq!(num2(999.995), "1,000.00");
        assert_eq!(num0(0.5), "1");
        assert_eq!(num0(2.5), "3");
        assert_eq!(num2(0.124), "0.12");
    }

    #[test]
    fn missing_values_print_as_not_available() {
        assert_eq!(avg2(None), "n/a");
        assert_eq!(avg2(Some(3.0)), "3.00");
        assert_eq!(num2(f64::NAN), "n/a");
    }
}
