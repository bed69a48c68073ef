use chrono::Duration;

/// Parse a duration like `90s`, `15m`, `1h30m` or `2d`. A bare `0` means zero
/// and a leading `-` negates the whole duration.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    match s.strip_prefix('-') {
        Some(magnitude) => parse_unsigned(magnitude).map(|d| -d),
        None => parse_unsigned(s),
    }
}

fn parse_unsigned(s: &str) -> Result<Duration, String> {
    if s == "0" {
        return Ok(Duration::zero());
    }
    if s.is_empty() {
        return Err("empty duration".to_string());
    }

    let mut total = Duration::zero();
    let mut rest = s;

    while !rest.is_empty() {
        let digits = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| format!("missing unit in duration {s:?}"))?;
        if digits == 0 {
            return Err(format!("invalid duration {s:?}"));
        }
        let value: i64 = rest[..digits]
            .parse()
            .map_err(|_| format!("invalid duration {s:?}"))?;
        rest = &rest[digits..];

        let unit_len = rest
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(rest.len());
        let part = match &rest[..unit_len] {
            "ms" => Duration::try_milliseconds(value),
            "s" => Duration::try_seconds(value),
            "m" => Duration::try_minutes(value),
            "h" => Duration::try_hours(value),
            "d" => Duration::try_days(value),
            unit => return Err(format!("unknown unit {unit:?} in duration {s:?}")),
        }
        .ok_or_else(|| format!("duration {s:?} is too large"))?;

        total = total
            .checked_add(&part)
            .ok_or_else(|| format!("duration {s:?} is too large"))?;
        rest = &rest[unit_len..];
    }

    Ok(total)
}
