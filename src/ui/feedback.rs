use std::fmt;
use std::str::FromStr;

use crate::device::ConnectorId;
use crate::error::UiError;

/// Correlation id attached to a dialog and echoed back in its response.
///
/// Rendered as `{prefix}` or `{prefix}~{Key}:{value}[~{Key}:{value}]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    MakerAccessPin,
    ConfirmDeletePin { index: usize },
    RenamePreset { index: usize },
    OutputName { connector: ConnectorId },
    SavePreset,
    PinEditValidate,
    PinEditNewPin,
    PinEditConfirm,
    PresetOptions { index: usize, is_default: bool },
    ConfirmDeletePrompt { index: usize },
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MakerAccessPin => f.write_str("dop_pinEntry_MakerAccess"),
            Self::ConfirmDeletePin { index } => write!(f, "dop_pinEntry_ConfirmDelete~Index:{index}"),
            Self::RenamePreset { index } => write!(f, "dopm_renamePreset~Index:{index}"),
            Self::OutputName { connector } => write!(f, "dopm_outputName~ConnectorId:{connector}"),
            Self::SavePreset => f.write_str("dopm_savePreset"),
            Self::PinEditValidate => f.write_str("dopm_pinEdit_Validate"),
            Self::PinEditNewPin => f.write_str("dopm_pinEdit_NewPin"),
            Self::PinEditConfirm => f.write_str("dopm_pinEdit_ConfirmNewPin"),
            Self::PresetOptions { index, is_default } => {
                write!(f, "dop_presetOptions~Index:{index}~isDefault:{is_default}")
            }
            Self::ConfirmDeletePrompt { index } => write!(f, "dop_Prompt_ConfirmDelete~Index:{index}"),
        }
    }
}

/// Value of `~{key}:{value}` within the id
fn field<'a>(id: &'a str, key: &str) -> Option<&'a str> {
    id.split('~').skip(1).find_map(|segment| {
        let (name, value) = segment.split_once(':')?;
        (name == key).then_some(value)
    })
}

impl FromStr for Feedback {
    type Err = UiError;

    fn from_str(id: &str) -> Result<Self, Self::Err> {
        let unknown = || UiError::UnknownFeedback { id: id.to_string() };
        let prefix = id.split('~').next().unwrap_or_default();
        let index = || {
            field(id, "Index")
                .and_then(|value| value.parse::<usize>().ok())
                .ok_or_else(unknown)
        };

        let feedback = match prefix {
            "dop_pinEntry_MakerAccess" => Self::MakerAccessPin,
            "dop_pinEntry_ConfirmDelete" => Self::ConfirmDeletePin { index: index()? },
            "dopm_renamePreset" => Self::RenamePreset { index: index()? },
            "dopm_outputName" => Self::OutputName {
                connector: field(id, "ConnectorId")
                    .and_then(|value| value.parse().ok())
                    .ok_or_else(unknown)?,
            },
            "dopm_savePreset" => Self::SavePreset,
            "dopm_pinEdit_Validate" => Self::PinEditValidate,
            "dopm_pinEdit_NewPin" => Self::PinEditNewPin,
            "dopm_pinEdit_ConfirmNewPin" => Self::PinEditConfirm,
            "dop_presetOptions" => Self::PresetOptions {
                index: index()?,
                is_default: field(id, "isDefault") == Some("true"),
            },
            "dop_Prompt_ConfirmDelete" => Self::ConfirmDeletePrompt { index: index()? },
            _ => return Err(unknown()),
        };
        Ok(feedback)
    }
}
