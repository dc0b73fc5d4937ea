use serde::Deserialize;
use std::error::Error;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use log::info;

const MESSAGE_SLOT: &str = "{message}";

pub const DEFAULT_CHAT_TEMPLATE: &str =
    "You are Bujji, an AI assistant specialized in Java and C++ programming. \
Answer the following programming question clearly and concisely, \
with code examples where they help.\n\nQuestion: {message}";

#[derive(Debug)]
pub enum PromptError {
    MissingSlot(String),
    IoError(std::io::Error),
    JsonError(serde_json::Error),
}

impl fmt::Display for PromptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PromptError::MissingSlot(key) =>
                write!(f, "Prompt template '{}' has no {} placeholder", key, MESSAGE_SLOT),
            PromptError::IoError(e) => write!(f, "Prompt file IO error: {}", e),
            PromptError::JsonError(e) => write!(f, "Prompt JSON parsing error: {}", e),
        }
    }
}

impl Error for PromptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            PromptError::IoError(e) => Some(e),
            PromptError::JsonError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for PromptError {
    fn from(err: std::io::Error) -> Self {
        PromptError::IoError(err)
    }
}

impl From<serde_json::Error> for PromptError {
    fn from(err: serde_json::Error) -> Self {
        PromptError::JsonError(err)
    }
}

/// The instructional wrapper applied to every forwarded message.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct PromptConfig {
    pub chat_template: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self { chat_template: DEFAULT_CHAT_TEMPLATE.to_string() }
    }
}

impl PromptConfig {
    fn validate(&self) -> Result<(), PromptError> {
        if !self.chat_template.contains(MESSAGE_SLOT) {
            return Err(PromptError::MissingSlot("chat_template".to_string()));
        }
        Ok(())
    }

    pub fn render(&self, message: &str) -> String {
        self.chat_template.replace(MESSAGE_SLOT, message)
    }
}

pub fn load_prompts<P: AsRef<Path>>(path: P) -> Result<Arc<PromptConfig>, PromptError> {
    let file_content = fs::read_to_string(path.as_ref())?;
    let config: PromptConfig = serde_json::from_str(&file_content)?;
    config.validate()?;
    info!("Loaded chat template from {}", path.as_ref().display());
    Ok(Arc::new(config))
}

/// Loads the template file when one is configured, otherwise the built-in one.
pub fn resolve_prompts(
    path: Option<&str>
) -> Result<Arc<PromptConfig>, Box<dyn Error + Send + Sync>> {
    match path {
        Some(p) if !p.trim().is_empty() => load_prompts(p)
            .map_err(|e| {
                Box::<dyn Error + Send + Sync>::from(
                    format!("Failed to load prompts file '{}': {}", p, e)
                )
            }),
        _ => {
            info!("Using built-in chat template");
            Ok(Arc::new(PromptConfig::default()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("bujji-{}-{}.json", name, uuid::Uuid::new_v4()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn default_template_names_the_specialization() {
        let prompt = PromptConfig::default().render("What is RAII?");
        assert!(prompt.contains("Java and C++"));
        assert!(prompt.ends_with("Question: What is RAII?"));
    }

    #[test]
    fn loads_template_from_file() {
        let path = temp_file("ok", r#"{"chat_template": "Q: {message}"}"#);
        let config = load_prompts(&path).unwrap();
        assert_eq!(config.render("hi"), "Q: hi");
        fs::remove_file(path).ok();
    }

    #[test]
    fn rejects_template_without_slot() {
        let path = temp_file("noslot", r#"{"chat_template": "static text"}"#);
        let err = load_prompts(&path).unwrap_err();
        assert!(matches!(err, PromptError::MissingSlot(_)));
        fs::remove_file(path).ok();
    }

    #[test]
    fn falls_back_to_builtin_without_path() {
        let config = resolve_prompts(None).unwrap();
        assert_eq!(*config, PromptConfig::default());
        let config = resolve_prompts(Some("  ")).unwrap();
        assert_eq!(*config, PromptConfig::default());
    }
}
