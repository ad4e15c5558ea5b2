//! Dialog contents and the flows driven by their responses

use tracing::{debug, info, warn};

use super::PresetController;
use crate::config::PinMode;
use crate::config::validation::validate_pin;
use crate::constants::dialogs::{PIN_ENTRY_SECS, PRESET_NAME_SECS, SOURCE_REMINDER_SECS};
use crate::device::ConnectorId;
use crate::error::{Error, Result, ValidationError};
use crate::ui::{Feedback, Prompt, TextInput};

const PIN_PLACEHOLDER: &str = "4-8 Digit Numeric Pin Accepted";
const NAME_PLACEHOLDER: &str = "1-20 Alphanumeric Names Accepted";
const INVALID_PIN: &str = "Invalid Pin, Try Again";
const INVALID_NAME: &str = "Invalid Name, Try Again";

/// Pin gate for maker access, or for deleting `preset_name`
pub fn pin_entry(
    feedback: Feedback,
    preset_name: Option<&str>,
    error: bool,
    peripheral_id: Option<String>,
) -> TextInput {
    let input = match preset_name {
        Some(name) => TextInput::new(
            feedback,
            "Are you sure?",
            format!("Enter the Monitor Preset Maker pin to confirm deletion of<p>Preset: {name}"),
        )
        .submit("Delete ⚠️"),
        None => TextInput::new(
            feedback,
            "Monitor Preset Maker Pin",
            "Enter your pin below to access the Monitor Preset Maker",
        )
        .submit("Unlock"),
    }
    .placeholder(PIN_PLACEHOLDER)
    .pin()
    .duration(PIN_ENTRY_SECS)
    .on(peripheral_id);

    if error { input.with_error(INVALID_PIN) } else { input }
}

/// One of the three pin change steps
pub fn pin_edit(feedback: Feedback, error: bool, peripheral_id: Option<String>) -> TextInput {
    let (title, text, submit) = match feedback {
        Feedback::PinEditNewPin => (
            "Monitor Preset New Pin",
            "Enter a NEW 4-8 Digit Numeric Pin for the Monitor Preset Maker",
            "Next",
        ),
        Feedback::PinEditConfirm => (
            "Monitor Preset Confirm Pin",
            "Confirm your NEW 4-8 Digit Numeric Pin for the Monitor Preset Maker",
            "Save",
        ),
        _ => (
            "Monitor Preset Pin Edit",
            "Enter your current pin to confirm access",
            "Next",
        ),
    };
    let input = TextInput::new(feedback, title, text)
        .placeholder(PIN_PLACEHOLDER)
        .submit(submit)
        .pin()
        .duration(PIN_ENTRY_SECS)
        .on(peripheral_id);

    if error { input.with_error(INVALID_PIN) } else { input }
}

pub fn save_preset(error: bool, peripheral_id: Option<String>) -> TextInput {
    let input = TextInput::new(
        Feedback::SavePreset,
        "Save Monitor Preset",
        "Enter a name for your new Monitor Preset",
    )
    .placeholder(NAME_PLACEHOLDER)
    .submit("Save")
    .duration(PRESET_NAME_SECS)
    .on(peripheral_id);

    if error { input.with_error(INVALID_NAME) } else { input }
}

pub fn rename_preset(
    index: usize,
    name: &str,
    error: bool,
    peripheral_id: Option<String>,
) -> TextInput {
    let input = TextInput::new(
        Feedback::RenamePreset { index },
        "Rename Monitor Preset",
        format!("Enter a new name for Monitor Preset<p>{name}"),
    )
    .placeholder(NAME_PLACEHOLDER)
    .prefill(name)
    .submit("Update")
    .duration(PRESET_NAME_SECS)
    .on(peripheral_id);

    if error { input.with_error(INVALID_NAME) } else { input }
}

/// Output display name editor. `rejected` carries the refused name and why.
pub fn output_name(
    connector: ConnectorId,
    current: Option<&str>,
    rejected: Option<(&str, &ValidationError)>,
    peripheral_id: Option<String>,
) -> TextInput {
    let mut input = TextInput::new(
        Feedback::OutputName { connector },
        "Edit HDMI Output Name",
        "Helps identify which display you're working with in Monitor Preset Maker (Weight < 8.0)",
    )
    .placeholder("Enter Monitor Name Here (Weight < 8.0)")
    .submit("Update")
    .on(peripheral_id);

    match rejected {
        Some((name, reason)) => {
            let message = match reason {
                ValidationError::OutputNameWeight { weight, .. } => {
                    format!("Name too large. Weight: {weight:.2}")
                }
                other => other.to_string(),
            };
            input.text = format!("⚠️ {message}<p>{}", input.text);
            input.prefill(name)
        }
        None => {
            if let Some(current) = current {
                input = input.prefill(current);
            }
            input
        }
    }
}

pub fn preset_options(
    index: usize,
    name: &str,
    is_default: bool,
    terminator: &str,
    peripheral_id: Option<String>,
) -> Prompt {
    let default_action = if is_default { "Remove" } else { "Set as" };
    Prompt::new(
        "Monitor Preset Options",
        format!("Choose an option below to modify<p>{name} || Index: {index}"),
    )
    .feedback(Feedback::PresetOptions { index, is_default })
    .option("Rename Preset")
    .option(format!("{default_action} Default Preset => {terminator}"))
    .option("⚠️ Delete Preset ⚠️")
    .option("Dismiss")
    .on(peripheral_id)
}

pub fn confirm_delete(index: usize, name: &str, peripheral_id: Option<String>) -> Prompt {
    Prompt::new(
        "Are you sure?",
        format!("Confirm deletion of<p>Preset: {name}"),
    )
    .feedback(Feedback::ConfirmDeletePrompt { index })
    .option("Delete ⚠️")
    .option("Dismiss")
    .duration(PIN_ENTRY_SECS)
    .on(peripheral_id)
}

pub fn source_reminder(peripheral_id: Option<String>) -> Prompt {
    Prompt::new(
        "Please Select a Source",
        "To Matrix Route to a display, you must select an input source first",
    )
    .option("Dismiss")
    .duration(SOURCE_REMINDER_SECS)
    .on(peripheral_id)
}

pub fn output_name_help(peripheral_id: Option<String>) -> Prompt {
    Prompt::new(
        "Video Output Names",
        "Name your Video Outputs with a Character Weight 8.0 or less<p>Character Weights outlined below",
    )
    .option("[Score 1.0] W, M, @")
    .option("[Score 0.75] A-Z, 0-9")
    .option("[Score 0.3] iltfj.,:;'`!- (spaces)")
    .option("Dismiss")
    .on(peripheral_id)
}

pub fn pin_saved(peripheral_id: Option<String>) -> Prompt {
    Prompt::new("New Pin Saved!", "").option("Dismiss").on(peripheral_id)
}

/// Rejected input is reported back as a retry; everything else propagates
fn validation_failed<T>(result: Result<T>) -> Result<Option<ValidationError>> {
    match result {
        Ok(_) => Ok(None),
        Err(Error::Validation(err)) => Ok(Some(err)),
        Err(err) => Err(err),
    }
}

impl PresetController {
    pub(super) async fn show_text_input(&self, input: TextInput) -> Result<()> {
        self.ui.text_input(input).await?;
        Ok(())
    }

    pub(super) async fn show_prompt(&self, prompt: Prompt) -> Result<()> {
        self.ui.prompt(prompt).await?;
        Ok(())
    }

    /// Ask for confirmation before deleting, with a pin when protection is on
    pub(super) async fn confirm_removal(&self, index: usize, peripheral_id: Option<String>) -> Result<()> {
        let Some(entry) = self.registry.preset(index) else {
            warn!(index, "Cannot confirm removal, preset index does not resolve");
            return Ok(());
        };
        match self.registry.pin_mode() {
            PinMode::Enabled => {
                let input = pin_entry(
                    Feedback::ConfirmDeletePin { index },
                    Some(&entry.name),
                    false,
                    peripheral_id,
                );
                self.show_text_input(input).await
            }
            PinMode::Disabled => {
                self.show_prompt(confirm_delete(index, &entry.name, peripheral_id))
                    .await
            }
        }
    }

    pub(super) async fn prompt_rename(&self, index: usize, error: bool, peripheral_id: Option<String>) -> Result<()> {
        let Some(entry) = self.registry.preset(index) else {
            warn!(index, "Cannot rename, preset index does not resolve");
            return Ok(());
        };
        self.show_text_input(rename_preset(index, &entry.name, error, peripheral_id))
            .await
    }

    pub(super) async fn on_text_input(
        &mut self,
        feedback_id: &str,
        text: &str,
        peripheral_id: Option<String>,
    ) -> Result<()> {
        let feedback: Feedback = match feedback_id.parse() {
            Ok(feedback) => feedback,
            Err(err) => {
                debug!(error = %err, "Ignoring text input for another component");
                return Ok(());
            }
        };

        match feedback {
            Feedback::MakerAccessPin => {
                if validate_pin(text).is_ok() && self.registry.pin_matches(text) {
                    info!("Maker pin accepted");
                    self.open_maker(peripheral_id).await
                } else {
                    warn!("Maker pin rejected");
                    self.show_text_input(pin_entry(feedback, None, true, peripheral_id))
                        .await
                }
            }
            Feedback::ConfirmDeletePin { index } => {
                if validate_pin(text).is_ok() && self.registry.pin_matches(text) {
                    self.registry.remove(index).await
                } else {
                    warn!(index, "Delete pin rejected");
                    let name = self.registry.preset(index).map(|entry| entry.name.clone());
                    self.show_text_input(pin_entry(feedback, name.as_deref(), true, peripheral_id))
                        .await
                }
            }
            Feedback::RenamePreset { index } => {
                match validation_failed(self.registry.rename(index, text).await)? {
                    Some(err) => {
                        warn!(index, error = %err, "Preset rename rejected");
                        self.prompt_rename(index, true, peripheral_id).await
                    }
                    None => Ok(()),
                }
            }
            Feedback::OutputName { connector } => {
                match validation_failed(self.registry.set_output_name(connector, text).await)? {
                    Some(err) => {
                        warn!(connector, error = %err, "Output name rejected");
                        let input = output_name(connector, None, Some((text, &err)), peripheral_id);
                        self.show_text_input(input).await
                    }
                    None => {
                        self.publish_maker().await;
                        Ok(())
                    }
                }
            }
            Feedback::SavePreset => {
                let result = self
                    .registry
                    .save(self.device.as_ref(), &self.routes, Some(text))
                    .await;
                match validation_failed(result)? {
                    Some(err) => {
                        warn!(error = %err, "Preset name rejected");
                        self.show_text_input(save_preset(true, peripheral_id)).await
                    }
                    None => Ok(()),
                }
            }
            Feedback::PinEditValidate => {
                let next = if validate_pin(text).is_ok() && self.registry.pin_matches(text) {
                    pin_edit(Feedback::PinEditNewPin, false, peripheral_id)
                } else {
                    warn!("Current pin rejected during pin change");
                    pin_edit(feedback, true, peripheral_id)
                };
                self.show_text_input(next).await
            }
            Feedback::PinEditNewPin => {
                let next = if validate_pin(text).is_ok() {
                    self.pending_pin = Some(text.to_string());
                    pin_edit(Feedback::PinEditConfirm, false, peripheral_id)
                } else {
                    warn!("New pin rejected");
                    pin_edit(feedback, true, peripheral_id)
                };
                self.show_text_input(next).await
            }
            Feedback::PinEditConfirm => {
                if self.pending_pin.as_deref() != Some(text) {
                    warn!("Pin confirmation does not match");
                    return self
                        .show_text_input(pin_edit(feedback, true, peripheral_id))
                        .await;
                }
                self.registry.set_pin(text).await?;
                self.pending_pin = None;
                self.show_prompt(pin_saved(peripheral_id)).await
            }
            Feedback::PresetOptions { .. } | Feedback::ConfirmDeletePrompt { .. } => {
                debug!(feedback = %feedback, "Prompt feedback delivered as text input, ignoring");
                Ok(())
            }
        }
    }

    pub(super) async fn on_prompt_response(
        &mut self,
        feedback_id: &str,
        option_id: u32,
        peripheral_id: Option<String>,
    ) -> Result<()> {
        let feedback: Feedback = match feedback_id.parse() {
            Ok(feedback) => feedback,
            Err(err) => {
                debug!(error = %err, "Ignoring prompt response for another component");
                return Ok(());
            }
        };

        match (feedback, option_id) {
            (Feedback::PresetOptions { index, .. }, 1) => {
                self.prompt_rename(index, false, peripheral_id).await
            }
            (Feedback::PresetOptions { index, is_default }, 2) => {
                self.registry.set_default(index, is_default).await
            }
            (Feedback::PresetOptions { index, .. }, 3) => {
                self.confirm_removal(index, peripheral_id).await
            }
            (Feedback::ConfirmDeletePrompt { index }, 1) => self.registry.remove(index).await,
            _ => {
                debug!(feedback = %feedback, option_id, "Prompt dismissed");
                Ok(())
            }
        }
    }
}
