//! Dictionary file loading.
//!
//! The two dictionary files are JSON arrays:
//!
//! - attributes: `[{"Attribute": 1, "Name": "User-Name", "ContentType": "string"}, ...]`
//! - vendors: `[{"VendorID": 9, "Name": "Cisco", "TLVs": [{"Type": 1, ...}]}, ...]`
//!
//! When a path is not configured, the stock RFC 2865/2866 tables from
//! `radius_codec::defaults` are used.

use crate::config::ConfigError;
use radius_codec::{defaults, AttributeDef, VendorDef};
use std::fs;
use tracing::info;

/// Load the attribute dictionary, or fall back to the stock table.
pub fn load_attributes(path: Option<&str>) -> Result<Vec<AttributeDef>, ConfigError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let attributes: Vec<AttributeDef> = serde_json::from_str(&contents)?;
            info!(path, entries = attributes.len(), "loaded attribute dictionary");
            Ok(attributes)
        }
        None => Ok(defaults::rfc_attributes()),
    }
}

/// Load the vendor dictionary, or fall back to the stock table.
pub fn load_vendors(path: Option<&str>) -> Result<Vec<VendorDef>, ConfigError> {
    match path {
        Some(path) => {
            let contents = fs::read_to_string(path)?;
            let vendors: Vec<VendorDef> = serde_json::from_str(&contents)?;
            info!(path, entries = vendors.len(), "loaded vendor dictionary");
            Ok(vendors)
        }
        None => Ok(defaults::known_vendors()),
    }
}
