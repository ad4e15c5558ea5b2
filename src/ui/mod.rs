//! UI surface seam
//!
//! Text input dialogs, option prompts, panel publication and widget feedback.
//! Panel markup is rendered by the host; this crate only hands over
//! view-models.

mod feedback;
mod recording;

pub use feedback::Feedback;
pub use recording::{RecordingSurface, UiCall};

use async_trait::async_trait;

use crate::config::PinMode;
use crate::device::{ConnectorId, InputConnector};
use crate::error::UiError;

/// Text entry dialog. Its response comes back tagged with `feedback`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextInput {
    pub feedback: Feedback,
    pub title: String,
    pub text: String,
    pub placeholder: String,
    pub submit_text: String,
    /// Prefilled value
    pub input_text: Option<String>,
    /// Masked numeric entry
    pub pin: bool,
    pub duration_secs: Option<u32>,
    pub peripheral_id: Option<String>,
}

impl TextInput {
    pub fn new(feedback: Feedback, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            feedback,
            title: title.into(),
            text: text.into(),
            placeholder: String::new(),
            submit_text: "Submit".to_string(),
            input_text: None,
            pin: false,
            duration_secs: None,
            peripheral_id: None,
        }
    }

    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn submit(mut self, submit_text: impl Into<String>) -> Self {
        self.submit_text = submit_text.into();
        self
    }

    pub fn prefill(mut self, input_text: impl Into<String>) -> Self {
        self.input_text = Some(input_text.into());
        self
    }

    pub fn pin(mut self) -> Self {
        self.pin = true;
        self
    }

    pub fn duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    pub fn on(mut self, peripheral_id: Option<String>) -> Self {
        self.peripheral_id = peripheral_id;
        self
    }

    /// Flag the dialog as a retry after rejected input
    pub fn with_error(mut self, message: &str) -> Self {
        self.title = format!("⚠️ {} ⚠️", self.title);
        self.text = format!("⚠️ {message} ⚠️<p>{}", self.text);
        self
    }
}

/// Option prompt with at most four choices, numbered from 1
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub feedback: Option<Feedback>,
    pub title: String,
    pub text: String,
    pub options: Vec<String>,
    pub duration_secs: Option<u32>,
    pub peripheral_id: Option<String>,
}

impl Prompt {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            feedback: None,
            title: title.into(),
            text: text.into(),
            options: Vec::new(),
            duration_secs: None,
            peripheral_id: None,
        }
    }

    pub fn feedback(mut self, feedback: Feedback) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn option(mut self, option: impl Into<String>) -> Self {
        self.options.push(option.into());
        self
    }

    pub fn duration(mut self, secs: u32) -> Self {
        self.duration_secs = Some(secs);
        self
    }

    pub fn on(mut self, peripheral_id: Option<String>) -> Self {
        self.peripheral_id = peripheral_id;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetListItem {
    pub index: usize,
    pub label: String,
    pub is_default: bool,
}

/// Buttons of the preset list panel, in list order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresetListView {
    pub items: Vec<PresetListItem>,
}

/// Content of the preset maker panel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerView {
    pub outputs: Vec<(ConnectorId, String)>,
    pub inputs: Vec<InputConnector>,
    pub pin_mode: PinMode,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelUpdate {
    PresetList(PresetListView),
    PresetMaker(MakerView),
}

impl PanelUpdate {
    pub fn panel_id(&self) -> &'static str {
        use crate::constants::panels;
        match self {
            Self::PresetList(_) => panels::PRESET_LIST,
            Self::PresetMaker(_) => panels::MAKER_HIDDEN,
        }
    }
}

#[async_trait]
pub trait UiSurface: Send + Sync {
    async fn text_input(&self, input: TextInput) -> Result<(), UiError>;

    async fn prompt(&self, prompt: Prompt) -> Result<(), UiError>;

    async fn publish_panel(&self, update: PanelUpdate) -> Result<(), UiError>;

    async fn open_panel(&self, panel_id: &str, peripheral_id: Option<&str>)
    -> Result<(), UiError>;

    async fn set_widget_value(&self, widget_id: &str, value: &str) -> Result<(), UiError>;

    async fn unset_widget_value(&self, widget_id: &str) -> Result<(), UiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_flag_wraps_title_and_text() {
        let input = TextInput::new(Feedback::SavePreset, "Save Monitor Preset", "Enter a name")
            .with_error("Invalid Name, Try Again");
        assert_eq!(input.title, "⚠️ Save Monitor Preset ⚠️");
        assert!(input.text.starts_with("⚠️ Invalid Name, Try Again ⚠️<p>"));
        assert!(input.text.ends_with("Enter a name"));
    }

    #[test]
    fn test_prompt_builder_keeps_option_order() {
        let prompt = Prompt::new("Title", "").option("One").option("Two");
        assert_eq!(prompt.options, vec!["One", "Two"]);
        assert_eq!(prompt.feedback, None);
    }
}
