//! Save-path prompts
//!
//! Every bake starts by asking where to write. Declining (returning `None`)
//! aborts the bake without side effects.

use std::path::PathBuf;

/// What a bake asks the prompt for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveRequest {
    /// Dialog title, e.g. "Save Baked Animation"
    pub title: String,
    /// Suggested file stem
    pub default_name: String,
    /// Expected extension without the dot
    pub extension: String,
    /// Explanatory line shown with the dialog
    pub message: String,
}

impl SaveRequest {
    pub fn new(
        title: impl Into<String>,
        default_name: impl Into<String>,
        extension: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            default_name: default_name.into(),
            extension: extension.into(),
            message: message.into(),
        }
    }

    /// `default_name.extension`
    pub fn default_file_name(&self) -> String {
        format!("{}.{}", self.default_name, self.extension)
    }
}

/// Resolves a save path, or declines
pub trait SavePrompt {
    fn request_path(&mut self, request: &SaveRequest) -> Option<PathBuf>;
}

impl<F> SavePrompt for F
where
    F: FnMut(&SaveRequest) -> Option<PathBuf>,
{
    fn request_path(&mut self, request: &SaveRequest) -> Option<PathBuf> {
        self(request)
    }
}

/// Prompt with a predetermined answer
#[derive(Debug, Clone, Default)]
pub struct FixedPrompt {
    path: Option<PathBuf>,
    requests: Vec<SaveRequest>,
}

impl FixedPrompt {
    /// Always answer with `path`
    pub fn accept(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            requests: Vec::new(),
        }
    }

    /// Always decline
    pub fn cancel() -> Self {
        Self::default()
    }

    /// Requests received so far
    pub fn requests(&self) -> &[SaveRequest] {
        &self.requests
    }
}

impl SavePrompt for FixedPrompt {
    fn request_path(&mut self, request: &SaveRequest) -> Option<PathBuf> {
        self.requests.push(request.clone());
        self.path.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_prompt_records_requests() {
        let mut prompt = FixedPrompt::accept("out/rig.exr");
        let request = SaveRequest::new("Save", "Rig", "exr", "Pick a path");
        assert_eq!(prompt.request_path(&request), Some(PathBuf::from("out/rig.exr")));
        assert_eq!(prompt.requests().len(), 1);
        assert_eq!(prompt.requests()[0].default_file_name(), "Rig.exr");

        let mut cancel = FixedPrompt::cancel();
        assert_eq!(cancel.request_path(&request), None);
    }

    #[test]
    fn test_closure_prompt() {
        let mut prompt = |request: &SaveRequest| Some(PathBuf::from(request.default_file_name()));
        let request = SaveRequest::new("Save", "Mesh Baked", "png", "");
        assert_eq!(
            prompt.request_path(&request),
            Some(PathBuf::from("Mesh Baked.png"))
        );
    }
}
