use anyhow::{Result, bail};

/// Converts an acreage substring already isolated by the legal-description
/// pattern match into a canonical acre value.
///
/// `Ok(None)` means no recognized numeric form (an extraction miss, left to
/// the caller to log). `Err` means a form matched but conversion failed,
/// which usually indicates a pattern bug rather than dirty data, so it is
/// reported distinctly.
pub fn normalize(text: &str) -> Result<Option<f64>> {
    let cleaned = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '/' || c.is_whitespace())
        .collect::<String>();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return Ok(None);
    }

    let tokens = cleaned.split_whitespace().collect::<Vec<&str>>();

    // Mixed number: "1 1/2"
    if tokens.len() == 2 && tokens[1].contains('/') {
        let whole = parse_number(tokens[0])?;
        let fraction = parse_fraction(tokens[1])?;
        return Ok(Some(round6(whole + fraction)));
    }

    if tokens.len() != 1 {
        return Ok(None);
    }

    let value = tokens[0];
    if value.contains('/') {
        return Ok(Some(round6(parse_fraction(value)?)));
    }
    if value.contains('.') {
        return Ok(Some(parse_number(value)?));
    }
    if value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(Some(parse_number(value)?));
    }

    Ok(None)
}

fn parse_fraction(value: &str) -> Result<f64> {
    let Some((numerator, denominator)) = value.split_once('/') else {
        bail!("malformed fraction in acreage expression: {value:?}");
    };
    let numerator = parse_number(numerator)?;
    let denominator = parse_number(denominator)?;
    if denominator == 0.0 {
        bail!("zero denominator in acreage expression: {value:?}");
    }
    Ok(numerator / denominator)
}

fn parse_number(value: &str) -> Result<f64> {
    let parsed = value
        .trim()
        .parse::<f64>()
        .map_err(|err| anyhow::anyhow!("unparsable acreage number {value:?}: {err}"))?;
    Ok(parsed)
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_whole_acre_counts() {
        assert_eq!(normalize("40").unwrap(), Some(40.0));
        assert_eq!(normalize("40 ACRES").unwrap(), Some(40.0));
    }

    #[test]
    fn normalizes_decimal_acreage() {
        assert_eq!(normalize(".5").unwrap(), Some(0.5));
        assert_eq!(normalize("5.44 ACRES").unwrap(), Some(5.44));
    }

    #[test]
    fn normalizes_pure_fractions() {
        assert_eq!(normalize("1/5").unwrap(), Some(0.2));
        assert_eq!(normalize("1/5 ACRES").unwrap(), Some(0.2));
        assert_eq!(normalize("1/3").unwrap(), Some(0.333333));
    }

    #[test]
    fn normalizes_mixed_numbers() {
        assert_eq!(normalize("1 1/2").unwrap(), Some(1.5));
        assert_eq!(normalize("1 1/2 ACS").unwrap(), Some(1.5));
        assert_eq!(normalize("2 1/3 ACRES").unwrap(), Some(2.333333));
    }

    #[test]
    fn unrecognized_forms_are_a_miss_not_an_error() {
        assert_eq!(normalize("").unwrap(), None);
        assert_eq!(normalize("SEE INSTRUMENT").unwrap(), None);
        assert_eq!(normalize("40 1 2").unwrap(), None);
    }

    #[test]
    fn zero_denominator_is_reported_as_an_error() {
        assert!(normalize("1/0").is_err());
        assert!(normalize("3 1/0").is_err());
    }
}
