//! Module descriptor and aggregate registry data model
//!
//! Field names follow the JSON documents on disk (`hookPlugins`,
//! `subPackages`, ...). Unknown fields are kept in `extra` maps so a
//! descriptor or registry survives a read/merge/write cycle intact.

use crate::modules::error::ValidationError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

/// One page entry in `setting.pages` or the registry's `pages`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageConfig {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PageConfig {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            style: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubPackageConfig {
    pub root: String,
    pub pages: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_component: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SubPackageConfig {
    pub fn new(root: impl Into<String>, pages: Vec<String>, async_component: bool) -> Self {
        Self {
            root: root.into(),
            pages,
            async_component: Some(async_component),
            extra: Map::new(),
        }
    }

    /// True when this sub-package contributes to `asyncPackageNames`
    pub fn is_async(&self) -> bool {
        self.async_component == Some(true) && !self.root.is_empty()
    }
}

/// The `setting` block merged into the aggregate registry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub pages: Vec<PageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_packages: Option<Vec<SubPackageConfig>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A validated module descriptor (`module.json`)
///
/// Only [`ModuleDescriptor::parse`] produces values from untrusted JSON,
/// so everything downstream of the loader works with checked shapes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hook_plugins: Option<Vec<String>>,
    pub setting: Setting,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route: Option<BTreeMap<String, String>>,
    #[serde(rename = "static", default, skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModuleDescriptor {
    /// Check the shape of raw JSON and convert it into a descriptor
    pub fn parse(raw: Value) -> Result<Self, ValidationError> {
        validate_descriptor(&raw)?;
        serde_json::from_value(raw).map_err(|e| ValidationError::new("descriptor", e.to_string()))
    }

    /// Build a descriptor with only `setting.pages`
    pub fn with_pages(pages: Vec<PageConfig>) -> Self {
        Self {
            hook_plugins: None,
            setting: Setting {
                pages,
                sub_packages: None,
                extra: Map::new(),
            },
            route: None,
            static_dir: None,
            extra: Map::new(),
        }
    }
}

fn validate_descriptor(raw: &Value) -> Result<(), ValidationError> {
    let root = raw
        .as_object()
        .ok_or_else(|| ValidationError::new("<root>", "descriptor must be a JSON object"))?;

    let setting = root
        .get("setting")
        .and_then(Value::as_object)
        .ok_or_else(|| ValidationError::new("setting", "missing or not an object"))?;

    let pages = setting
        .get("pages")
        .and_then(Value::as_array)
        .ok_or_else(|| ValidationError::new("setting.pages", "must be an array"))?;

    for (index, page) in pages.iter().enumerate() {
        let valid = page
            .get("path")
            .and_then(Value::as_str)
            .is_some_and(|path| !path.is_empty());
        if !page.is_object() || !valid {
            return Err(ValidationError::new(
                format!("setting.pages[{}].path", index),
                "page entry needs a non-empty string path",
            ));
        }
        if let Some(style) = page.get("style") {
            if !style.is_object() {
                return Err(ValidationError::new(
                    format!("setting.pages[{}].style", index),
                    "style must be an object",
                ));
            }
        }
    }

    if let Some(sub_packages) = setting.get("subPackages") {
        let sub_packages = sub_packages
            .as_array()
            .ok_or_else(|| ValidationError::new("setting.subPackages", "must be an array"))?;

        for (index, sub_package) in sub_packages.iter().enumerate() {
            let root_ok = sub_package
                .get("root")
                .and_then(Value::as_str)
                .is_some_and(|root| !root.is_empty());
            if !root_ok {
                return Err(ValidationError::new(
                    format!("setting.subPackages[{}].root", index),
                    "sub-package needs a non-empty string root",
                ));
            }
            let pages_ok = sub_package
                .get("pages")
                .and_then(Value::as_array)
                .is_some_and(|pages| pages.iter().all(Value::is_string));
            if !pages_ok {
                return Err(ValidationError::new(
                    format!("setting.subPackages[{}].pages", index),
                    "must be an array of strings",
                ));
            }
            if let Some(flag) = sub_package.get("asyncComponent") {
                if !flag.is_boolean() {
                    return Err(ValidationError::new(
                        format!("setting.subPackages[{}].asyncComponent", index),
                        "must be a boolean",
                    ));
                }
            }
        }
    }

    if let Some(hook_plugins) = root.get("hookPlugins") {
        let all_strings = hook_plugins
            .as_array()
            .is_some_and(|items| items.iter().all(Value::is_string));
        if !all_strings {
            return Err(ValidationError::new(
                "hookPlugins",
                "must be an array of strings",
            ));
        }
    }

    if let Some(route) = root.get("route") {
        let all_strings = route
            .as_object()
            .is_some_and(|map| map.values().all(Value::is_string));
        if !all_strings {
            return Err(ValidationError::new(
                "route",
                "must be an object of string values",
            ));
        }
    }

    if let Some(static_dir) = root.get("static") {
        if !static_dir.is_string() {
            return Err(ValidationError::new("static", "must be a string path"));
        }
    }

    Ok(())
}

/// A loaded descriptor together with its registry key and source file
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleRecord {
    #[serde(rename = "json")]
    pub descriptor: ModuleDescriptor,
    pub key: String,
    pub file_path: PathBuf,
}

/// The merged page registry (`pages.json`)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregateRegistry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_modules: Option<BTreeMap<String, bool>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub async_package_names: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pages: Option<Vec<PageConfig>>,
    /// Kept as written: base documents list page objects, descriptors list
    /// page paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_packages: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AggregateRegistry {
    pub fn pages(&self) -> &[PageConfig] {
        self.pages.as_deref().unwrap_or(&[])
    }

    pub fn async_package_names(&self) -> &[String] {
        self.async_package_names.as_deref().unwrap_or(&[])
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

/// Files whose change should trigger regeneration of the registry
pub type WatchSet = BTreeSet<PathBuf>;
