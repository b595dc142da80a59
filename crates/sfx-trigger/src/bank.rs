//! Sound Banks
//!
//! A bank is the serialized form of a set of authored descriptors, loaded
//! as a unit into a trigger system.

use serde::{Deserialize, Serialize};
use sfx_core::{SfxError, SfxResult};
use std::collections::HashSet;
use std::path::Path;

use crate::descriptor::{SoundDescriptor, reserve_descriptor_id};

/// Named collection of descriptors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundBank {
    pub name: String,
    pub descriptors: Vec<SoundDescriptor>,
}

impl SoundBank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            descriptors: Vec::new(),
        }
    }

    pub fn add(&mut self, descriptor: SoundDescriptor) {
        self.descriptors.push(descriptor);
    }

    pub fn with_descriptor(mut self, descriptor: SoundDescriptor) -> Self {
        self.add(descriptor);
        self
    }

    pub fn get(&self, name: &str) -> Option<&SoundDescriptor> {
        self.descriptors.iter().find(|d| d.name == name)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Validate every descriptor and reject duplicate IDs or names
    ///
    /// Unnamed descriptors are only looked up by ID, so any number of them
    /// may share the empty name.
    pub fn validate(&self) -> SfxResult<()> {
        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for desc in &self.descriptors {
            desc.validate()?;
            if !ids.insert(desc.id) {
                return Err(SfxError::DuplicateDescriptor(format!(
                    "id {} ('{}')",
                    desc.id, desc.name
                )));
            }
            if !desc.name.is_empty() && !names.insert(desc.name.as_str()) {
                return Err(SfxError::DuplicateDescriptor(desc.name.clone()));
            }
        }
        Ok(())
    }

    /// Parse a bank; stored IDs are reserved so new descriptors never reuse them
    pub fn from_json(json: &str) -> SfxResult<Self> {
        let bank: Self =
            serde_json::from_str(json).map_err(|e| SfxError::Serialization(e.to_string()))?;
        for desc in &bank.descriptors {
            reserve_descriptor_id(desc.id);
        }
        Ok(bank)
    }

    pub fn to_json(&self) -> SfxResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| SfxError::Serialization(e.to_string()))
    }

    /// Read a bank from a JSON file
    pub fn load(path: impl AsRef<Path>) -> SfxResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Write a bank as JSON
    pub fn save(&self, path: impl AsRef<Path>) -> SfxResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}
