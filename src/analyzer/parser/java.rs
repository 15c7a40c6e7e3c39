use super::{SymbolExtractor, get_node_text, parse_strict};
use crate::types::Result;

/// Symbol used for Java files without a `package` declaration
pub const DEFAULT_PACKAGE: &str = "default";

/// Reads the `package` declaration of Java source files
pub struct JavaPackageExtractor;

impl SymbolExtractor for JavaPackageExtractor {
    fn extensions(&self) -> &'static [&'static str] {
        &["java"]
    }

    fn language(&self) -> &'static str {
        "Java"
    }

    fn extract(&self, path: &str, content: &str) -> Result<String> {
        let tree = parse_strict(tree_sitter_java::LANGUAGE, "Java", path, content)?;
        let root = tree.root_node();
        let mut cursor = root.walk();

        for child in root.named_children(&mut cursor) {
            if child.kind() != "package_declaration" {
                continue;
            }
            let mut inner = child.walk();
            for part in child.named_children(&mut inner) {
                if matches!(part.kind(), "scoped_identifier" | "identifier") {
                    return Ok(get_node_text(part, content.as_bytes()).to_string());
                }
            }
        }

        Ok(DEFAULT_PACKAGE.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoped_package() {
        let src = "package com.example.app;\n\npublic class App {}\n";
        let name = JavaPackageExtractor.extract("App.java", src).unwrap();
        assert_eq!(name, "com.example.app");
    }

    #[test]
    fn test_default_package() {
        let src = "public class Main { public static void main(String[] a) {} }\n";
        let name = JavaPackageExtractor.extract("Main.java", src).unwrap();
        assert_eq!(name, DEFAULT_PACKAGE);
    }

    #[test]
    fn test_syntax_error_fails() {
        assert!(JavaPackageExtractor.extract("Bad.java", "class {").is_err());
    }
}
