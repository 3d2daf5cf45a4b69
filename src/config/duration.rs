// src/config/duration.rs

//! Duration strings as they appear in config files (`"500ms"`, `"1s"`,
//! `"1h30m"`, `"1.5s"`).

use std::time::Duration;

/// Parse a duration string made of one or more `<number><unit>` pairs.
///
/// Supported units: `ns`, `us`/`µs`, `ms`, `s`, `m`, `h`. Numbers may carry a
/// fractional part. A bare `"0"` is accepted as zero. Negative values are
/// rejected; see [`parse_signed_duration`].
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    match parse_signed_duration(s)? {
        (false, d) => Ok(d),
        (true, _) => Err(format!("duration '{}' is negative", s.trim())),
    }
}

/// Like [`parse_duration`] but accepts one leading `-` or `+`.
///
/// Returns whether the value is negative along with its magnitude. A
/// negative zero counts as zero.
pub fn parse_signed_duration(s: &str) -> Result<(bool, Duration), String> {
    let s = s.trim();
    let (negative, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let magnitude = parse_magnitude(s, unsigned)?;
    Ok((negative && !magnitude.is_zero(), magnitude))
}

fn parse_magnitude(s: &str, unsigned: &str) -> Result<Duration, String> {
    if unsigned.is_empty() {
        return Err(if s.is_empty() {
            "empty duration string".to_string()
        } else {
            format!("expected a number in duration '{s}'")
        });
    }
    if unsigned == "0" {
        return Ok(Duration::ZERO);
    }

    let mut total_nanos: f64 = 0.0;
    let mut rest = unsigned;

    while !rest.is_empty() {
        // Find the boundary between the number and its unit.
        let num_end = rest
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .ok_or_else(|| format!("duration '{s}' is missing a unit suffix"))?;
        let (num_part, after_num) = rest.split_at(num_end);
        if num_part.is_empty() {
            return Err(format!("expected a number in duration '{s}'"));
        }
        let value: f64 = num_part
            .parse()
            .map_err(|e| format!("invalid duration number '{num_part}': {e}"))?;

        let unit_end = after_num
            .find(|c: char| c.is_ascii_digit() || c == '.')
            .unwrap_or(after_num.len());
        let (unit, remaining) = after_num.split_at(unit_end);

        let scale = unit_nanos(unit).ok_or_else(|| {
            format!("unsupported duration unit '{unit}'; expected ns, us, ms, s, m, or h")
        })?;

        total_nanos += value * scale;
        rest = remaining;
    }

    if !total_nanos.is_finite() || total_nanos > u64::MAX as f64 {
        return Err(format!("duration '{s}' is out of range"));
    }

    Ok(Duration::from_nanos(total_nanos.round() as u64))
}

fn unit_nanos(unit: &str) -> Option<f64> {
    match unit {
        "ns" => Some(1.0),
        "us" | "µs" | "μs" => Some(1_000.0),
        "ms" => Some(1_000_000.0),
        "s" => Some(1_000_000_000.0),
        "m" => Some(60.0 * 1_000_000_000.0),
        "h" => Some(3_600.0 * 1_000_000_000.0),
        _ => None,
    }
}

/// Render a duration in the same compact notation accepted by
/// [`parse_duration`], e.g. `500ms`, `1s`, `1h30m`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    if d.subsec_nanos() != 0 && d.as_secs() == 0 {
        let nanos = d.subsec_nanos();
        return if nanos % 1_000_000 == 0 {
            format!("{}ms", nanos / 1_000_000)
        } else if nanos % 1_000 == 0 {
            format!("{}us", nanos / 1_000)
        } else {
            format!("{nanos}ns")
        };
    }

    let secs = d.as_secs();
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);

    let mut out = String::new();
    if h > 0 {
        out.push_str(&format!("{h}h"));
    }
    if m > 0 {
        out.push_str(&format!("{m}m"));
    }
    let millis = d.subsec_millis();
    if s > 0 || millis > 0 {
        if millis > 0 {
            out.push_str(&format!("{s}.{millis:03}s"));
        } else {
            out.push_str(&format!("{s}s"));
        }
    }
    out
}
