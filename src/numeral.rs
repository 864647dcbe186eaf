// RMB Numeral Formatter
// Integer -> formal Chinese uppercase numerals (大写数字), plus the inverse parser

use crate::error::NumeralError;
use serde::{Deserialize, Serialize};

// ============================================================================
// VOCABULARY
// ============================================================================

/// Digit numerals, indexed by digit value
pub const DIGITS: [char; 10] = ['零', '壹', '贰', '叁', '肆', '伍', '陆', '柒', '捌', '玖'];

/// Zero numeral, also used as the separator for collapsed zero runs
pub const ZERO: char = '零';

/// Positional units inside a four-digit group (ones, tens, hundreds, thousands)
const SMALL_UNITS: [&str; 4] = ["", "拾", "佰", "仟"];

/// Large unit suffix per four-digit group, least significant first.
/// The two high groups share a trailing 亿, so 10^12 reads 壹万亿.
const GROUP_UNITS: [&str; 4] = ["", WAN, "", WAN];

const WAN: &str = "万";
const YI: &str = "亿";

/// Largest value expressible with the unit vocabulary (10^16 - 1)
pub const MAX_VALUE: u64 = 9999_9999_9999_9999;

const GROUP_BASE: u64 = 10_000;

// Currency suffixes
const YUAN: &str = "元";
const JIAO: &str = "角";
const FEN: &str = "分";
const WHOLE: &str = "整";

// ============================================================================
// FORMATTER
// ============================================================================

/// Converts integers into the capital numeral form used on receipts and contracts.
///
/// Stateless apart from its options; a single instance can be shared freely
/// between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RmbFormatter {
    /// Render 10..=19 in the leading position as 拾.. instead of 壹拾..
    #[serde(default = "default_omit_leading_one")]
    pub omit_leading_one: bool,
}

fn default_omit_leading_one() -> bool {
    true
}

impl Default for RmbFormatter {
    fn default() -> Self {
        RmbFormatter {
            omit_leading_one: default_omit_leading_one(),
        }
    }
}

impl RmbFormatter {
    pub fn new(omit_leading_one: bool) -> Self {
        RmbFormatter { omit_leading_one }
    }

    /// Format an integer as an RMB numeral.
    ///
    /// Zero runs inside the number collapse into a single 零, trailing zero
    /// groups produce nothing, and `0` itself renders as 零.
    ///
    /// # Errors
    /// * `NumeralError::OutOfRange` - value above [`MAX_VALUE`]
    pub fn format(&self, value: u64) -> Result<String, NumeralError> {
        if value > MAX_VALUE {
            return Err(NumeralError::OutOfRange {
                value: value.to_string(),
                max: MAX_VALUE,
            });
        }
        if value == 0 {
            return Ok(ZERO.to_string());
        }

        let groups = split_groups(value);
        let mut out = String::new();
        let mut pending_zero = false;

        for (index, &group) in groups.iter().enumerate().rev() {
            if group == 0 {
                if !out.is_empty() {
                    pending_zero = true;
                }
            } else {
                for position in (0..SMALL_UNITS.len()).rev() {
                    let digit = (group / 10u64.pow(position as u32) % 10) as usize;
                    if digit == 0 {
                        if !out.is_empty() {
                            pending_zero = true;
                        }
                        continue;
                    }

                    if pending_zero {
                        out.push(ZERO);
                        pending_zero = false;
                    }

                    let leading_ten =
                        self.omit_leading_one && out.is_empty() && digit == 1 && position == 1;
                    if !leading_ten {
                        out.push(DIGITS[digit]);
                    }
                    out.push_str(SMALL_UNITS[position]);
                }

                out.push_str(GROUP_UNITS[index]);
                // Trailing zeros of a group never separate it from the next one
                pending_zero = false;
            }

            if index == 2 && (groups[3] != 0 || groups[2] != 0) {
                out.push_str(YI);
            }
        }

        Ok(out)
    }

    /// Format an amount given in fen (1/100 yuan) with 元/角/分 suffixes.
    ///
    /// Whole amounts end in 整; `0` renders as 零元整.
    pub fn format_amount(&self, fen: u64) -> Result<String, NumeralError> {
        let yuan = fen / 100;
        let jiao = (fen / 10 % 10) as usize;
        let cents = (fen % 10) as usize;

        if yuan > MAX_VALUE {
            return Err(NumeralError::OutOfRange {
                value: format!("{}.{:02}", yuan, fen % 100),
                max: MAX_VALUE,
            });
        }

        let mut out = String::new();
        if yuan > 0 {
            out.push_str(&self.format(yuan)?);
            out.push_str(YUAN);
        }

        if jiao == 0 && cents == 0 {
            if yuan == 0 {
                out.push(ZERO);
                out.push_str(YUAN);
            }
            out.push_str(WHOLE);
            return Ok(out);
        }

        if jiao > 0 {
            out.push(DIGITS[jiao]);
            out.push_str(JIAO);
        } else if yuan > 0 {
            out.push(ZERO);
        }

        if cents > 0 {
            out.push(DIGITS[cents]);
            out.push_str(FEN);
        }

        Ok(out)
    }
}

/// Format with the default options
pub fn to_rmb_upper(value: u64) -> Result<String, NumeralError> {
    RmbFormatter::default().format(value)
}

fn split_groups(value: u64) -> [u64; 4] {
    let mut groups = [0u64; 4];
    let mut rest = value;
    for group in groups.iter_mut() {
        *group = rest % GROUP_BASE;
        rest /= GROUP_BASE;
    }
    groups
}

// ============================================================================
// AMOUNT INPUT
// ============================================================================

/// Parse a decimal yuan amount ("123", "123.4", "123.45") into fen.
pub fn parse_amount(input: &str) -> Result<u64, NumeralError> {
    let trimmed = input.trim();
    let invalid = || NumeralError::InvalidAmount(input.to_string());

    let (int_part, frac_part) = match trimmed.split_once('.') {
        Some((int_part, frac_part)) if !frac_part.is_empty() => (int_part, frac_part),
        Some(_) => return Err(invalid()),
        None => (trimmed, ""),
    };

    if int_part.is_empty()
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || frac_part.len() > 2
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(invalid());
    }

    let out_of_range = || NumeralError::OutOfRange {
        value: int_part.to_string(),
        max: MAX_VALUE,
    };
    let yuan: u64 = int_part.parse().map_err(|_| out_of_range())?;
    if yuan > MAX_VALUE {
        return Err(out_of_range());
    }

    let fraction = match frac_part.len() {
        0 => 0,
        1 => u64::from(frac_part.as_bytes()[0] - b'0') * 10,
        _ => frac_part.parse::<u64>().map_err(|_| invalid())?,
    };

    Ok(yuan * 100 + fraction)
}

// ============================================================================
// PARSER (numeral -> integer)
// ============================================================================

const NO_UNIT: u64 = GROUP_BASE;

/// Parse an RMB numeral back into an integer.
///
/// Accepts exactly what [`RmbFormatter::format`] produces, with or without the
/// leading 壹 before 拾. Gaps between digit positions must be marked with a
/// single 零, and a 零 anywhere else is rejected.
pub fn parse_rmb_upper(input: &str) -> Result<u64, NumeralError> {
    let text = input.trim();
    if text.is_empty() {
        return Err(NumeralError::Malformed("empty input".to_string()));
    }

    for (position, ch) in text.chars().enumerate() {
        if digit_value(ch).is_none() && small_unit_value(ch).is_none() && ch != '万' && ch != '亿'
        {
            return Err(NumeralError::InvalidCharacter { ch, position });
        }
    }

    if text.chars().eq([ZERO]) {
        return Ok(0);
    }

    // Group texts, least significant first
    let mut groups: [Option<&str>; 4] = [None; 4];
    let low = match text.split_once(YI) {
        Some((high, low)) => {
            if high.is_empty() {
                return Err(NumeralError::Malformed(format!(
                    "'{}' has no digits before {}",
                    text, YI
                )));
            }
            let (upper, lower) = split_section(text, high)?;
            groups[3] = upper;
            groups[2] = lower;
            low
        }
        None => text,
    };
    let (upper, lower) = split_section(text, low)?;
    groups[1] = upper;
    groups[0] = lower;

    let mut total: u64 = 0;
    let mut previous: Option<usize> = None;
    for index in (0..groups.len()).rev() {
        let Some(group_text) = groups[index] else {
            continue;
        };
        let (value, leading_position) = parse_group(group_text, previous.is_none())?;

        if let Some(previous) = previous {
            let needs_zero = leading_position < 1000 || previous - index > 1;
            let has_zero = group_text.starts_with(ZERO);
            if needs_zero && !has_zero {
                return Err(NumeralError::Malformed(format!(
                    "'{}': group '{}' needs a leading 零",
                    text, group_text
                )));
            }
            if has_zero && !needs_zero {
                return Err(NumeralError::Malformed(format!(
                    "'{}': unexpected 零 before '{}'",
                    text, group_text
                )));
            }
        }

        total += value * GROUP_BASE.pow(index as u32);
        previous = Some(index);
    }

    Ok(total)
}

/// Split an eight-digit section on 万 into its upper and lower group texts.
fn split_section<'a>(
    text: &str,
    section: &'a str,
) -> Result<(Option<&'a str>, Option<&'a str>), NumeralError> {
    let non_empty = |s: &'a str| if s.is_empty() { None } else { Some(s) };
    match section.split_once(WAN) {
        Some(("", _)) => Err(NumeralError::Malformed(format!(
            "'{}' has no digits before {}",
            text, WAN
        ))),
        Some((upper, lower)) => Ok((Some(upper), non_empty(lower))),
        None => Ok((None, non_empty(section))),
    }
}

/// Parse one four-digit group into its value and the unit of its leading
/// digit. `first` is set for the most significant group of the numeral, the
/// only place where a bare 拾 is allowed and a leading 零 is not.
fn parse_group(text: &str, first: bool) -> Result<(u64, u64), NumeralError> {
    let malformed = |reason: &str| NumeralError::Malformed(format!("'{}': {}", text, reason));

    if first && text.starts_with(ZERO) {
        return Err(malformed("leading 零"));
    }

    let mut value = 0u64;
    let mut digit: Option<u64> = None;
    let mut last_unit = NO_UNIT;
    let mut zero_gap = false;
    let mut leading_position: Option<u64> = None;

    for ch in text.chars() {
        if let Some(d) = digit_value(ch) {
            if d == 0 {
                if digit.is_some() {
                    return Err(malformed("零 directly after a digit"));
                }
                if zero_gap {
                    return Err(malformed("repeated 零"));
                }
                zero_gap = true;
                continue;
            }
            if digit.is_some() {
                return Err(malformed("consecutive digits without a unit"));
            }
            digit = Some(d);
        } else if let Some(unit) = small_unit_value(ch) {
            if unit >= last_unit {
                return Err(malformed("units out of order"));
            }
            check_gap(last_unit, unit, zero_gap).map_err(|reason| malformed(reason))?;
            let d = match digit.take() {
                Some(d) => d,
                None if first && unit == 10 && value == 0 && !zero_gap => 1,
                None => return Err(malformed("unit without a digit")),
            };
            value += d * unit;
            leading_position.get_or_insert(unit);
            last_unit = unit;
            zero_gap = false;
        } else {
            return Err(malformed("unexpected large unit"));
        }
    }

    match digit {
        Some(d) => {
            check_gap(last_unit, 1, zero_gap).map_err(|reason| malformed(reason))?;
            value += d;
            leading_position.get_or_insert(1);
        }
        None if zero_gap => return Err(malformed("trailing 零")),
        None => {}
    }

    match leading_position {
        Some(position) => Ok((value, position)),
        None => Err(malformed("no digits")),
    }
}

/// A 零 must mark a skipped position and nothing else.
fn check_gap(last_unit: u64, unit: u64, zero_gap: bool) -> Result<(), &'static str> {
    if last_unit == NO_UNIT {
        return Ok(());
    }
    let adjacent = unit == last_unit / 10;
    match (adjacent, zero_gap) {
        (true, true) => Err("零 between adjacent positions"),
        (false, false) => Err("skipped position without 零"),
        _ => Ok(()),
    }
}

fn digit_value(ch: char) -> Option<u64> {
    DIGITS.iter().position(|&d| d == ch).map(|d| d as u64)
}

fn small_unit_value(ch: char) -> Option<u64> {
    match ch {
        '拾' => Some(10),
        '佰' => Some(100),
        '仟' => Some(1000),
        _ => None,
    }
}
