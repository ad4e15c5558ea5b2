use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};
use tracing::info;

use super::{PanelUpdate, Prompt, TextInput, UiSurface};
use crate::constants::dialogs::MAX_PROMPT_OPTIONS;
use crate::error::UiError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiCall {
    TextInput(TextInput),
    Prompt(Prompt),
    Panel(PanelUpdate),
    OpenPanel {
        panel_id: String,
        peripheral_id: Option<String>,
    },
    SetWidget {
        widget_id: String,
        value: String,
    },
    UnsetWidget {
        widget_id: String,
    },
}

#[derive(Debug, Default)]
struct Recorded {
    calls: Vec<UiCall>,
    widgets: BTreeMap<String, String>,
}

/// Surface that logs every call and keeps them for inspection
#[derive(Debug, Default)]
pub struct RecordingSurface {
    recorded: Mutex<Recorded>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.recorded.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn calls(&self) -> Vec<UiCall> {
        self.lock().calls.clone()
    }

    /// Drain recorded calls, keeping widget values
    pub fn take_calls(&self) -> Vec<UiCall> {
        std::mem::take(&mut self.lock().calls)
    }

    /// Value currently shown by a widget
    pub fn widget_value(&self, widget_id: &str) -> Option<String> {
        self.lock().widgets.get(widget_id).cloned()
    }

    pub fn last_text_input(&self) -> Option<TextInput> {
        self.lock().calls.iter().rev().find_map(|call| match call {
            UiCall::TextInput(input) => Some(input.clone()),
            _ => None,
        })
    }

    pub fn last_prompt(&self) -> Option<Prompt> {
        self.lock().calls.iter().rev().find_map(|call| match call {
            UiCall::Prompt(prompt) => Some(prompt.clone()),
            _ => None,
        })
    }

    pub fn last_panel(&self, panel_id: &str) -> Option<PanelUpdate> {
        self.lock().calls.iter().rev().find_map(|call| match call {
            UiCall::Panel(update) if update.panel_id() == panel_id => Some(update.clone()),
            _ => None,
        })
    }
}

#[async_trait]
impl UiSurface for RecordingSurface {
    async fn text_input(&self, input: TextInput) -> Result<(), UiError> {
        info!(feedback = %input.feedback, title = %input.title, "text input");
        self.lock().calls.push(UiCall::TextInput(input));
        Ok(())
    }

    async fn prompt(&self, prompt: Prompt) -> Result<(), UiError> {
        if prompt.options.len() > MAX_PROMPT_OPTIONS {
            return Err(UiError::TooManyOptions {
                count: prompt.options.len(),
                max: MAX_PROMPT_OPTIONS,
            });
        }
        info!(title = %prompt.title, options = ?prompt.options, "prompt");
        self.lock().calls.push(UiCall::Prompt(prompt));
        Ok(())
    }

    async fn publish_panel(&self, update: PanelUpdate) -> Result<(), UiError> {
        info!(panel = update.panel_id(), "publish panel");
        self.lock().calls.push(UiCall::Panel(update));
        Ok(())
    }

    async fn open_panel(
        &self,
        panel_id: &str,
        peripheral_id: Option<&str>,
    ) -> Result<(), UiError> {
        info!(panel = panel_id, peripheral = ?peripheral_id, "open panel");
        self.lock().calls.push(UiCall::OpenPanel {
            panel_id: panel_id.to_string(),
            peripheral_id: peripheral_id.map(str::to_string),
        });
        Ok(())
    }

    async fn set_widget_value(&self, widget_id: &str, value: &str) -> Result<(), UiError> {
        info!(widget = widget_id, value, "set widget");
        let mut recorded = self.lock();
        recorded.widgets.insert(widget_id.to_string(), value.to_string());
        recorded.calls.push(UiCall::SetWidget {
            widget_id: widget_id.to_string(),
            value: value.to_string(),
        });
        Ok(())
    }

    async fn unset_widget_value(&self, widget_id: &str) -> Result<(), UiError> {
        info!(widget = widget_id, "unset widget");
        let mut recorded = self.lock();
        recorded.widgets.remove(widget_id);
        recorded.calls.push(UiCall::UnsetWidget {
            widget_id: widget_id.to_string(),
        });
        Ok(())
    }
}
