//! Input validation for user-supplied symbols.

use crate::error::FetchError;

/// Longest symbol accepted (covers Yahoo suffixes such as `BRK-B` or `SHOP.TO`).
const MAX_SYMBOL_LEN: usize = 20;

/// Trims and uppercases `input`, rejecting empty, overlong, or
/// punctuation-laden symbols before they reach a provider URL. A symbol made
/// only of punctuation, such as `..`, would be read as a path segment.
pub fn validate_symbol(input: &str) -> Result<String, FetchError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(FetchError::InvalidSymbol("symbol is empty".to_string()));
    }
    if trimmed.chars().count() > MAX_SYMBOL_LEN {
        return Err(FetchError::InvalidSymbol(format!(
            "symbol exceeds {} characters",
            MAX_SYMBOL_LEN
        )));
    }
    if let Some(bad) = trimmed
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '^' | '=')))
    {
        return Err(FetchError::InvalidSymbol(format!(
            "unexpected character '{}' in {}",
            bad, trimmed
        )));
    }
    if !trimmed.chars().any(|c| c.is_ascii_alphanumeric()) {
        return Err(FetchError::InvalidSymbol(format!(
            "symbol {} has no letters or digits",
            trimmed
        )));
    }
    Ok(trimmed.to_uppercase())
}
