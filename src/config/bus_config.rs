use crate::bus::{BusSelector, BusType};
use crate::errors::{ConfigError, ConfigResult};
use serde::Deserialize;
use std::fs;

/// Root structure for loading `[[bus]]` style TOML config
#[derive(Debug, Deserialize)]
pub struct BusConfig {
    #[serde(rename = "bus")]
    pub buses: Vec<BusEntry>,
}

/// One bus entry. With neither `path` nor `number` the adapter is picked
/// automatically.
#[derive(Debug, Clone, Deserialize)]
pub struct BusEntry {
    pub id: String,
    #[serde(rename = "type")]
    pub r#type: String, // 'type' is a reserved word in Rust, use raw identifier
    pub path: Option<String>,
    pub number: Option<u8>,
    /// Log every register transfer
    #[serde(default)]
    pub debug: bool,
}

impl BusEntry {
    pub fn selector(&self) -> BusSelector {
        match (&self.path, self.number) {
            (Some(path), _) => BusSelector::Path(path.clone()),
            (None, Some(n)) => BusSelector::Number(n),
            (None, None) => BusSelector::Auto,
        }
    }
}

impl BusConfig {
    pub fn find(&self, id: &str) -> Option<&BusEntry> {
        self.buses.iter().find(|b| b.id == id)
    }
}

/// Parse and validate bus config text
pub fn parse_bus_config(content: &str) -> ConfigResult<BusConfig> {
    let parsed: BusConfig = toml::from_str(content)?;
    for b in &parsed.buses {
        if BusType::from_str(&b.r#type).is_none() {
            return Err(ConfigError::InvalidValue {
                field: format!("bus.{}.type", b.id),
                reason: format!("unsupported bus type '{}'", b.r#type),
            });
        }
        if b.path.is_some() && b.number.is_some() {
            return Err(ConfigError::InvalidValue {
                field: format!("bus.{}", b.id),
                reason: "set either path or number, not both".to_string(),
            });
        }
    }
    Ok(parsed)
}

/// Load bus config file
pub fn load_bus_config(path: &str) -> ConfigResult<BusConfig> {
    let content = fs::read_to_string(path).map_err(|source| ConfigError::LoadError {
        path: path.to_string(),
        source,
    })?;
    parse_bus_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bus_config() {
        let cfg = parse_bus_config(
            r#"
            [[bus]]
            id = "i2c1"
            type = "i2c"
            number = 1
            debug = true

            [[bus]]
            id = "auto"
            type = "i2c"

            [[bus]]
            id = "custom"
            type = "I2C"
            path = "/dev/i2c-7"
            "#,
        )
        .unwrap();

        let i2c1 = cfg.find("i2c1").unwrap();
        assert!(i2c1.debug);
        assert_eq!(i2c1.selector(), BusSelector::Number(1));
        assert_eq!(cfg.find("auto").unwrap().selector(), BusSelector::Auto);
        assert!(!cfg.find("auto").unwrap().debug);
        assert_eq!(
            cfg.find("custom").unwrap().selector(),
            BusSelector::Path("/dev/i2c-7".to_string())
        );
        assert!(cfg.find("spi0").is_none());
    }

    #[test]
    fn test_rejects_unknown_type_and_ambiguous_selector() {
        assert!(parse_bus_config("[[bus]]\nid = \"s\"\ntype = \"serial\"\n").is_err());
        assert!(parse_bus_config("[[bus]]\nid = \"b\"\ntype = \"i2c\"\npath = \"/dev/i2c-1\"\nnumber = 1\n").is_err());
    }
}
