//! Conversation model consumed by request factories.

use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::Result;

/// One completed or in-progress exchange in a conversation.
///
/// A response that is missing or empty means the turn has no answer yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// What the user asked.
    pub prompt: String,
    /// What the assistant answered, if anything.
    #[serde(default)]
    pub response: Option<String>,
}

impl ConversationMessage {
    /// Create a message that has not been answered.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: None,
        }
    }

    /// Create a message with an answer.
    pub fn answered(prompt: impl Into<String>, response: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            response: Some(response.into()),
        }
    }

    /// The response, if present and non-empty.
    pub fn answer(&self) -> Option<&str> {
        self.response.as_deref().filter(|r| !r.is_empty())
    }
}

/// Parameters of the in-flight chat turn.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatTurnParameters {
    /// The prompt for this turn.
    pub prompt: String,
    /// Media type of the attached image (e.g. `image/png`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_media_type: Option<String>,
    /// Raw image bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_data: Option<Vec<u8>>,
    /// Earlier turns, oldest first.
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
    /// Requested output limit; providers fall back to their default when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    /// Files the user attached to this turn.
    #[serde(default)]
    pub referenced_files: Vec<ReferencedFile>,
}

impl ChatTurnParameters {
    /// Create parameters for a text-only turn with no history.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            ..Default::default()
        }
    }

    /// Set the conversation history.
    pub fn history(mut self, history: Vec<ConversationMessage>) -> Self {
        self.conversation_history = history;
        self
    }

    /// Attach an image.
    pub fn image(mut self, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.image_media_type = Some(media_type.into());
        self.image_data = Some(data);
        self
    }

    /// Set the requested max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.max_tokens = Some(tokens);
        self
    }

    /// Set the referenced files.
    pub fn referenced_files(mut self, files: Vec<ReferencedFile>) -> Self {
        self.referenced_files = files;
        self
    }

    /// The attached image, only when both media type and data are present.
    pub fn attached_image(&self) -> Option<(&str, &[u8])> {
        match (&self.image_media_type, &self.image_data) {
            (Some(media_type), Some(data)) => Some((media_type.as_str(), data.as_slice())),
            _ => None,
        }
    }
}

/// A file the user referenced in a turn.
///
/// Two references are the same file when their paths match.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferencedFile {
    pub file_name: String,
    pub file_path: String,
    pub file_content: String,
}

impl ReferencedFile {
    pub fn new(
        file_name: impl Into<String>,
        file_path: impl Into<String>,
        file_content: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            file_content: file_content.into(),
        }
    }

    /// Read a file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, path.to_string_lossy(), content))
    }

    /// Text after the last `.` in the file name.
    ///
    /// A name without a dot is returned whole; a trailing dot yields "".
    pub fn file_extension(&self) -> &str {
        self.file_name.rsplit('.').next().unwrap_or_default()
    }
}

impl PartialEq for ReferencedFile {
    fn eq(&self, other: &Self) -> bool {
        self.file_path == other.file_path
    }
}

impl Eq for ReferencedFile {}

impl Hash for ReferencedFile {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.file_path.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use tempfile::TempDir;

    #[test]
    fn answer_ignores_missing_and_empty_responses() {
        assert_eq!(ConversationMessage::answered("p", "r").answer(), Some("r"));
        assert_eq!(ConversationMessage::new("p").answer(), None);
        assert_eq!(ConversationMessage::answered("p", "").answer(), None);
    }

    #[test]
    fn message_deserializes_without_response() {
        let msg: ConversationMessage = serde_json::from_str(r#"{"prompt": "hi"}"#).unwrap();
        assert_eq!(msg, ConversationMessage::new("hi"));
    }

    #[test]
    fn attached_image_requires_both_parts() {
        let params = ChatTurnParameters::new("look").image("image/png", vec![1, 2, 3]);
        assert_eq!(
            params.attached_image(),
            Some(("image/png", [1u8, 2, 3].as_slice()))
        );

        let mut only_type = ChatTurnParameters::new("look");
        only_type.image_media_type = Some("image/png".to_string());
        assert!(only_type.attached_image().is_none());

        let mut only_data = ChatTurnParameters::new("look");
        only_data.image_data = Some(vec![1]);
        assert!(only_data.attached_image().is_none());
    }

    #[test]
    fn turn_builder_sets_fields() {
        let params = ChatTurnParameters::new("question")
            .history(vec![ConversationMessage::answered("a", "b")])
            .max_tokens(512);

        assert_eq!(params.prompt, "question");
        assert_eq!(params.conversation_history.len(), 1);
        assert_eq!(params.max_tokens, Some(512));
        assert!(params.referenced_files.is_empty());
    }

    #[test]
    fn file_extension_takes_last_segment() {
        assert_eq!(ReferencedFile::new("main.rs", "/src/main.rs", "").file_extension(), "rs");
        assert_eq!(
            ReferencedFile::new("archive.tar.gz", "/a.tar.gz", "").file_extension(),
            "gz"
        );
        assert_eq!(
            ReferencedFile::new("Makefile", "/Makefile", "").file_extension(),
            "Makefile"
        );
        assert_eq!(ReferencedFile::new("notes.", "/notes.", "").file_extension(), "");
    }

    #[test]
    fn referenced_files_compare_by_path() {
        let a = ReferencedFile::new("lib.rs", "/src/lib.rs", "old");
        let b = ReferencedFile::new("lib.rs", "/src/lib.rs", "new");
        let c = ReferencedFile::new("lib.rs", "/other/lib.rs", "old");

        assert_eq!(a, b);
        assert_ne!(a, c);

        let set: HashSet<_> = [a, b, c].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn from_path_reads_name_and_content() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("hello.py");
        std::fs::write(&path, "print('hi')\n").unwrap();

        let file = ReferencedFile::from_path(&path).unwrap();

        assert_eq!(file.file_name, "hello.py");
        assert_eq!(file.file_path, path.to_string_lossy());
        assert_eq!(file.file_content, "print('hi')\n");
        assert_eq!(file.file_extension(), "py");
    }

    #[test]
    fn from_path_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let err = ReferencedFile::from_path(temp_dir.path().join("missing.rs")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }
}
