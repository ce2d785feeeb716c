use super::ApiError;

/// Parses a path id. Non-numeric and non-positive ids are rejected.
pub fn parse_id(raw: &str) -> Result<i32, ApiError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation(format!(
            "Invalid ID: {raw}. ID must be a positive integer"
        ))),
    }
}

/// Percent-decodes a blob handle taken from the path. Handles may contain
/// folder separators encoded as `%2F`.
pub fn decode_handle(raw: &str) -> Result<String, ApiError> {
    let decoded = urlencoding::decode(raw)
        .map_err(|_| ApiError::validation("Invalid image id encoding"))?
        .trim()
        .to_string();

    if decoded.is_empty() {
        return Err(ApiError::validation("Image id is required"));
    }
    Ok(decoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("1").unwrap(), 1);
        assert_eq!(parse_id("12345").unwrap(), 12345);
        assert!(parse_id("0").is_err());
        assert!(parse_id("-1").is_err());
        assert!(parse_id("abc").is_err());
        assert!(parse_id("99999999999").is_err());
    }

    #[test]
    fn test_decode_handle() {
        assert_eq!(
            decode_handle("bharani-scales%2Fproducts%2Fabc123").unwrap(),
            "bharani-scales/products/abc123"
        );
        assert_eq!(decode_handle("plain").unwrap(), "plain");
        assert!(decode_handle("%20").is_err());
        assert!(decode_handle("%FF").is_err());
    }
}
