//! Attribute and vendor dictionaries.
//!
//! The source tables mirror the JSON dictionary files: an array of top-level
//! attribute entries and an array of vendor entries with nested TLV tables.
//! `Dictionary::resolve` turns them into read-only lookup maps with every
//! content-type name resolved against the codec table, so nothing is looked
//! up by string while packets are being decoded.

use crate::content::{CodecTable, ContentType};
use serde::Deserialize;
use std::collections::HashMap;
use thiserror::Error;

/// Top-level attribute entry as it appears in the RADIUS dictionary file.
#[derive(Debug, Clone, Deserialize)]
pub struct AttributeDef {
    #[serde(rename = "Attribute")]
    pub code: u8,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ContentType")]
    pub content_type: String,
}

/// Vendor sub-attribute entry as it appears in the vendor dictionary file.
#[derive(Debug, Clone, Deserialize)]
pub struct TlvDef {
    #[serde(rename = "Type")]
    pub sub_type: u8,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "ContentType")]
    pub content_type: String,
}

/// Vendor entry as it appears in the vendor dictionary file.
#[derive(Debug, Clone, Deserialize)]
pub struct VendorDef {
    #[serde(rename = "VendorID")]
    pub vendor_id: u32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "TLVs")]
    pub tlvs: Vec<TlvDef>,
}

#[derive(Debug, Error)]
pub enum DictionaryError {
    #[error("attribute code {0} appears twice in the dictionary")]
    DuplicateAttribute(u8),
    #[error("vendor {vendor_id} defines sub-type {sub_type} twice")]
    DuplicateTlv { vendor_id: u32, sub_type: u8 },
    #[error("{owner} names unknown content type {content_type:?}")]
    UnknownContentType { owner: String, content_type: String },
}

/// A resolved top-level attribute.
#[derive(Debug)]
pub struct AttributeEntry {
    pub name: String,
    pub content: ContentType,
}

/// A resolved vendor sub-attribute.
#[derive(Debug)]
pub struct TlvEntry {
    pub name: String,
    pub content: ContentType,
}

/// A resolved vendor with its sub-attribute table.
#[derive(Debug)]
pub struct VendorEntry {
    pub name: String,
    tlvs: HashMap<u8, TlvEntry>,
}

impl VendorEntry {
    pub fn tlv(&self, sub_type: u8) -> Option<&TlvEntry> {
        self.tlvs.get(&sub_type)
    }
}

/// Immutable attribute and vendor lookup tables. Built once at startup,
/// never mutated; unknown codes resolve to `None`.
#[derive(Debug)]
pub struct Dictionary {
    attributes: HashMap<u8, AttributeEntry>,
    by_name: HashMap<String, u8>,
    vendors: HashMap<u32, VendorEntry>,
}

impl Dictionary {
    /// Build the lookup maps, resolving every content-type name against the
    /// codec table and enforcing code uniqueness.
    pub fn resolve(
        attributes: Vec<AttributeDef>,
        vendors: Vec<VendorDef>,
        table: &CodecTable,
    ) -> Result<Self, DictionaryError> {
        let mut attribute_map = HashMap::with_capacity(attributes.len());
        let mut by_name = HashMap::with_capacity(attributes.len());

        for def in attributes {
            let content = match table.resolve(&def.content_type) {
                Some(content) => content,
                None => {
                    return Err(DictionaryError::UnknownContentType {
                        owner: def.name,
                        content_type: def.content_type,
                    });
                }
            };
            if attribute_map.contains_key(&def.code) {
                return Err(DictionaryError::DuplicateAttribute(def.code));
            }
            by_name.entry(def.name.clone()).or_insert(def.code);
            attribute_map.insert(
                def.code,
                AttributeEntry {
                    name: def.name,
                    content,
                },
            );
        }

        let mut vendor_map = HashMap::with_capacity(vendors.len());
        for def in vendors {
            let mut tlvs = HashMap::with_capacity(def.tlvs.len());
            for tlv in def.tlvs {
                let content = match table.resolve(&tlv.content_type) {
                    Some(content) => content,
                    None => {
                        return Err(DictionaryError::UnknownContentType {
                            owner: format!("{}/{}", def.name, tlv.name),
                            content_type: tlv.content_type,
                        });
                    }
                };
                if tlvs.contains_key(&tlv.sub_type) {
                    return Err(DictionaryError::DuplicateTlv {
                        vendor_id: def.vendor_id,
                        sub_type: tlv.sub_type,
                    });
                }
                tlvs.insert(
                    tlv.sub_type,
                    TlvEntry {
                        name: tlv.name,
                        content,
                    },
                );
            }
            vendor_map.insert(
                def.vendor_id,
                VendorEntry {
                    name: def.name,
                    tlvs,
                },
            );
        }

        Ok(Dictionary {
            attributes: attribute_map,
            by_name,
            vendors: vendor_map,
        })
    }

    /// Look up a top-level attribute by code.
    pub fn attribute(&self, code: u8) -> Option<&AttributeEntry> {
        self.attributes.get(&code)
    }

    /// Look up a vendor by vendor ID.
    pub fn vendor(&self, vendor_id: u32) -> Option<&VendorEntry> {
        self.vendors.get(&vendor_id)
    }

    /// Resolve an attribute name back to its code and content type, for
    /// serialization.
    pub fn code_of(&self, name: &str) -> Option<(u8, ContentType)> {
        let code = *self.by_name.get(name)?;
        self.attributes.get(&code).map(|entry| (code, entry.content))
    }
}
