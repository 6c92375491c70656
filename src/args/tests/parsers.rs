use super::*;

#[test]
fn parse_duration_units() -> AppResult<()> {
    let cases = [
        ("250ms", Duration::from_millis(250)),
        ("3", Duration::from_secs(3)),
        ("4s", Duration::from_secs(4)),
        ("2m", Duration::from_secs(120)),
        ("1h", Duration::from_secs(3600)),
    ];
    for (input, expected) in cases {
        let parsed = parse_duration(input).map_err(AppError::validation)?;
        if parsed != expected {
            return Err(AppError::validation(format!(
                "{} parsed as {:?}, expected {:?}",
                input, parsed, expected
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_rejects_invalid_input() -> AppResult<()> {
    let cases = ["", "ms", "0", "0ms", "10d", "99999999999999999999h"];
    for input in cases {
        if parse_duration(input).is_ok() {
            return Err(AppError::validation(format!(
                "Expected '{}' to be rejected",
                input
            )));
        }
    }
    Ok(())
}

#[test]
fn parse_duration_reports_unit() -> AppResult<()> {
    match parse_duration("5w") {
        Err(ValidationError::InvalidDurationUnit { unit }) if unit == "w" => Ok(()),
        other => Err(AppError::validation(format!(
            "Unexpected result: {:?}",
            other
        ))),
    }
}

#[test]
fn parse_bool_env_values() -> AppResult<()> {
    for value in ["1", "true", "YES", "on"] {
        if !parse_bool_env(value)? {
            return Err(AppError::validation(format!("Expected '{}' to be true", value)));
        }
    }
    for value in ["0", "false", "No", "off"] {
        if parse_bool_env(value)? {
            return Err(AppError::validation(format!(
                "Expected '{}' to be false",
                value
            )));
        }
    }
    if parse_bool_env("maybe").is_ok() {
        return Err(AppError::validation("Expected 'maybe' to be rejected"));
    }
    Ok(())
}

#[test]
fn positive_u64_rejects_zero() -> AppResult<()> {
    if PositiveU64::try_from(0).is_ok() {
        return Err(AppError::validation("Expected zero to be rejected"));
    }
    let parsed: PositiveU64 = "12".parse().map_err(AppError::validation)?;
    if parsed.get() != 12 {
        return Err(AppError::validation("Unexpected parsed value"));
    }
    Ok(())
}
