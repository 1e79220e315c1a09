use serde::{Deserialize, Serialize};

/// A generated source file: a bare file name and its full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlueFile {
    pub name: String,
    pub content: String,
}

impl GlueFile {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// File name without its extension.
    pub fn stem(&self) -> &str {
        match self.name.rfind('.') {
            Some(idx) => &self.name[..idx],
            None => &self.name,
        }
    }

    /// Content with `\r\n` normalized to `\n`, for comparisons that ignore
    /// line endings.
    pub fn normalized_content(&self) -> String {
        self.content.replace("\r\n", "\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stem() {
        assert_eq!(GlueFile::new("exports.c", "").stem(), "exports");
        assert_eq!(GlueFile::new("extism:host.c", "").stem(), "extism:host");
        assert_eq!(GlueFile::new("noext", "").stem(), "noext");
    }

    #[test]
    fn test_normalized_content() {
        let f = GlueFile::new("env.c", "a\r\nb\n");
        assert_eq!(f.normalized_content(), "a\nb\n");
    }
}
