//! Symbol to provider-id table used by the crypto adapters.
//!
//! The default table is compiled in from `seed_data/coin_ids.yml`; callers
//! may inject their own with [`load_coin_ids_from`].

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Error types for coin id table operations.
#[derive(Error, Debug)]
pub enum CoinIdError {
    #[error("Failed to parse coin id YAML: {0}")]
    YamlParse(#[from] serde_yml::Error),
    #[error("Failed to read coin id file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Duplicate symbol in coin id file: {0}")]
    DuplicateSymbol(String),
}

/// Top-level structure for the coin id YAML file.
#[derive(Deserialize, Debug)]
pub struct CoinIdFile {
    pub coins: Vec<CoinIdEntry>,
}

/// Provider ids for one symbol. Either id may be absent.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CoinIdEntry {
    pub symbol: String,
    #[serde(default)]
    pub coingecko: Option<String>,
    #[serde(default)]
    pub coinmarketcap: Option<String>,
}

/// Lookup table keyed by uppercase symbol.
#[derive(Debug, Clone, Default)]
pub struct CoinIds {
    entries: HashMap<String, CoinIdEntry>,
}

impl CoinIds {
    /// CoinGecko id for `symbol`, falling back to the lowercased symbol.
    pub fn coingecko_id(&self, symbol: &str) -> String {
        self.entries
            .get(&symbol.to_uppercase())
            .and_then(|e| e.coingecko.clone())
            .unwrap_or_else(|| symbol.to_lowercase())
    }

    /// CoinMarketCap numeric id for `symbol`, if mapped.
    pub fn coinmarketcap_id(&self, symbol: &str) -> Option<&str> {
        self.entries
            .get(&symbol.to_uppercase())
            .and_then(|e| e.coinmarketcap.as_deref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse a coin id table from YAML content.
pub fn parse_coin_ids(yaml_content: &str) -> Result<CoinIds, CoinIdError> {
    let file: CoinIdFile = serde_yml::from_str(yaml_content)?;

    let mut entries = HashMap::new();
    for mut entry in file.coins {
        let key = entry.symbol.trim().to_uppercase();
        if entries.contains_key(&key) {
            return Err(CoinIdError::DuplicateSymbol(key));
        }
        entry.symbol = key.clone();
        entries.insert(key, entry);
    }

    Ok(CoinIds { entries })
}

/// Load the built-in table embedded at compile time.
pub fn load_coin_ids() -> Result<CoinIds, CoinIdError> {
    let yaml_content = include_str!("../../seed_data/coin_ids.yml");
    parse_coin_ids(yaml_content)
}

/// Load a table from a YAML file on disk.
pub fn load_coin_ids_from(path: &Path) -> Result<CoinIds, CoinIdError> {
    let yaml_content = std::fs::read_to_string(path)?;
    parse_coin_ids(&yaml_content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_table() {
        let yaml = r#"
coins:
  - symbol: BTC
    coingecko: bitcoin
    coinmarketcap: "1"
  - symbol: eth
    coingecko: ethereum
"#;
        let ids = parse_coin_ids(yaml).unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(ids.coingecko_id("btc"), "bitcoin");
        assert_eq!(ids.coinmarketcap_id("BTC"), Some("1"));
        assert_eq!(ids.coingecko_id("ETH"), "ethereum");
        assert_eq!(ids.coinmarketcap_id("ETH"), None);
    }

    #[test]
    fn test_unmapped_symbol_falls_back_to_lowercase() {
        let ids = CoinIds::default();
        assert_eq!(ids.coingecko_id("PEPE"), "pepe");
        assert_eq!(ids.coinmarketcap_id("PEPE"), None);
    }

    #[test]
    fn test_duplicate_symbol_rejected() {
        let yaml = r#"
coins:
  - symbol: BTC
    coingecko: bitcoin
  - symbol: btc
    coingecko: bitcoin-cash
"#;
        let result = parse_coin_ids(yaml);
        assert!(matches!(result.unwrap_err(), CoinIdError::DuplicateSymbol(s) if s == "BTC"));
    }

    #[test]
    fn test_empty_table() {
        let ids = parse_coin_ids("coins: []").unwrap();
        assert!(ids.is_empty());
    }

    #[test]
    fn test_load_builtin_table() {
        let ids = load_coin_ids().unwrap();
        assert_eq!(ids.len(), 10);
        assert_eq!(ids.coingecko_id("MATIC"), "matic-network");
        assert_eq!(ids.coinmarketcap_id("LTC"), Some("2"));
    }

    #[test]
    fn test_load_missing_file() {
        let result = load_coin_ids_from(Path::new("/definitely/not/here.yml"));
        assert!(matches!(result.unwrap_err(), CoinIdError::Io(_)));
    }
}
