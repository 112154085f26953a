use std::collections::HashSet;
use std::fmt::Write;

use super::FileContextProvider;
use crate::ChatTurnParameters;

const PREAMBLE: &str = "Use the following context to answer the question at the end.\n\n";

/// Renders referenced files as fenced blocks ahead of the question.
///
/// A file referenced twice (same path) is rendered once. Without referenced
/// files the prompt is returned as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencedFilesContext;

impl FileContextProvider for ReferencedFilesContext {
    fn prompt_with_files_context(&self, params: &ChatTurnParameters) -> String {
        if params.referenced_files.is_empty() {
            return params.prompt.clone();
        }

        let mut seen = HashSet::new();
        let mut out = String::from(PREAMBLE);
        for file in &params.referenced_files {
            if !seen.insert(file) {
                continue;
            }
            // Writing to a String cannot fail.
            let _ = writeln!(
                out,
                "```{}:{}\n{}\n```\n",
                file.file_extension(),
                file.file_path,
                file.file_content.trim_end()
            );
        }
        out.push_str("Question: ");
        out.push_str(&params.prompt);
        out
    }
}
