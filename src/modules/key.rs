//! Registry keys derived from descriptor paths

/// Turns a descriptor file path into a stable, readable registry key
///
/// `src/modules/cart/module.json` under root `src/modules` becomes `cart`,
/// and `src/modules/shop/cart/module.json` becomes `shop/cart`. A
/// descriptor sitting directly in the module root gets the empty key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathKeyDeriver {
    module_root: String,
    descriptor_name: String,
    delimiter: char,
}

impl PathKeyDeriver {
    pub fn new(module_root: impl AsRef<str>, descriptor_name: impl Into<String>) -> Self {
        Self {
            module_root: strip_current_dir(&normalize_separators(module_root.as_ref(), '/'))
                .trim_end_matches('/')
                .to_string(),
            descriptor_name: descriptor_name.into(),
            delimiter: '/',
        }
    }

    /// Use a different delimiter between path segments
    ///
    /// Keys stay unique only while no directory name contains the
    /// delimiter itself, which `/` guarantees and `-` does not.
    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn module_root(&self) -> &str {
        &self.module_root
    }

    pub fn derive(&self, file_path: impl AsRef<str>) -> String {
        let normalized = normalize_separators(file_path.as_ref(), '/');

        let relative = if self.module_root.is_empty() {
            normalized.as_str()
        } else {
            match self.root_end(&normalized) {
                Some(end) => &normalized[end..],
                None => normalized.as_str(),
            }
        };

        let delimited = normalize_separators(relative, self.delimiter);
        let trimmed = delimited.trim_matches(self.delimiter);

        if trimmed == self.descriptor_name {
            return String::new();
        }

        let suffix = format!("{}{}", self.delimiter, self.descriptor_name);
        trimmed
            .strip_suffix(suffix.as_str())
            .unwrap_or(trimmed)
            .to_string()
    }
}

impl PathKeyDeriver {
    /// Byte offset just past the module root inside `path`
    ///
    /// Prefers an occurrence aligned to whole path components, so
    /// `mysrc/modules-old` never matches root `src/modules`. Falls back to the
    /// first plain substring match.
    fn root_end(&self, path: &str) -> Option<usize> {
        let root = self.module_root.as_str();
        let aligned = path.match_indices(root).map(|(start, _)| start).find(|&start| {
            let end = start + root.len();
            let starts_component =
                start == 0 || path[..start].ends_with('/') || root.starts_with('/');
            let ends_component = end == path.len() || path[end..].starts_with('/');
            starts_component && ends_component
        });
        aligned.or_else(|| path.find(root)).map(|start| start + root.len())
    }
}

// "./src/modules" and "src/modules" must match the same scan results
fn strip_current_dir(path: &str) -> &str {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest
}

fn normalize_separators(path: &str, delimiter: char) -> String {
    path.chars()
        .map(|c| if c == '/' || c == '\\' { delimiter } else { c })
        .collect()
}
