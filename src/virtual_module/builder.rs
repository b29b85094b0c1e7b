//! Assembles virtual module source from import, body and export lines

#[derive(Debug, Clone, Default)]
pub struct VirtualModuleContentBuilder {
    imports: Vec<String>,
    content: Vec<String>,
    exports: Vec<String>,
}

impl VirtualModuleContentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_import(&mut self, statement: impl Into<String>) -> &mut Self {
        self.imports.push(statement.into());
        self
    }

    pub fn add_content(&mut self, content: impl Into<String>) -> &mut Self {
        self.content.push(content.into());
        self
    }

    pub fn add_export(&mut self, statement: impl Into<String>) -> &mut Self {
        self.exports.push(statement.into());
        self
    }

    /// Imports, a blank line, body, a blank line, exports
    pub fn build(&self) -> String {
        let mut parts: Vec<&str> =
            Vec::with_capacity(self.imports.len() + self.content.len() + self.exports.len() + 2);
        parts.extend(self.imports.iter().map(String::as_str));
        parts.push("");
        parts.extend(self.content.iter().map(String::as_str));
        parts.push("");
        parts.extend(self.exports.iter().map(String::as_str));
        parts.join("\n")
    }

    pub fn clear(&mut self) -> &mut Self {
        self.imports.clear();
        self.content.clear();
        self.exports.clear();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_layout() {
        let mut builder = VirtualModuleContentBuilder::new();
        builder
            .add_import("import a from 'a';")
            .add_import("import b from 'b';")
            .add_content("const c = a + b;")
            .add_export("export default c;");

        assert_eq!(
            builder.build(),
            "import a from 'a';\nimport b from 'b';\n\nconst c = a + b;\n\nexport default c;"
        );
    }

    #[test]
    fn test_empty_builder_is_two_newlines() {
        assert_eq!(VirtualModuleContentBuilder::new().build(), "\n\n");
    }

    #[test]
    fn test_clear_resets() {
        let mut builder = VirtualModuleContentBuilder::new();
        builder.add_export("export default 1;").clear();
        assert_eq!(builder.build(), "\n\n");
    }
}
