use crate::MAX_CODE_LEN;

/// Check that a family or attribute code is a usable identifier: it ends up
/// in storage keys and generated join aliases, so the alphabet is narrow.
pub fn validate_identifier(code: &str) -> Result<(), String> {
    if code.is_empty() {
        return Err("must not be empty".to_string());
    }
    if code.len() > MAX_CODE_LEN {
        return Err(format!("exceeds {MAX_CODE_LEN} characters"));
    }
    if !code.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err("must start with a lowercase letter".to_string());
    }
    if let Some(bad) = code
        .chars()
        .find(|c| !(c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_'))
    {
        return Err(format!("invalid character '{bad}'"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_snake_case() {
        assert!(validate_identifier("unit_price2").is_ok());
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(validate_identifier("").is_err());
        assert!(validate_identifier("_x").is_err());
        assert!(validate_identifier("Price").is_err());
        assert!(validate_identifier("unit-price").is_err());
        assert!(validate_identifier(&"a".repeat(MAX_CODE_LEN + 1)).is_err());
        assert!(validate_identifier(&"a".repeat(MAX_CODE_LEN)).is_ok());
    }
}
