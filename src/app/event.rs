use thiserror::Error;

use crate::dispatch::{WidgetEvent, WidgetPhase};
use crate::triggers::{StandbyState, Subscription};

/// Everything the controller reacts to, in arrival order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    PanelClicked {
        panel_id: String,
        peripheral_id: Option<String>,
    },
    Widget(WidgetEvent),
    TextInputResponse {
        feedback: String,
        text: String,
        peripheral_id: Option<String>,
    },
    PromptResponse {
        feedback: String,
        option_id: u32,
        peripheral_id: Option<String>,
    },
    StandbyChanged(StandbyState),
    CallDisconnected,
    /// Posted by the long-press timer
    LongPressElapsed {
        generation: u64,
        index: usize,
        peripheral_id: Option<String>,
    },
    Shutdown,
}

impl HostEvent {
    /// Subscription gating this event; internal events are never gated
    pub fn subscription(&self) -> Option<Subscription> {
        match self {
            Self::PanelClicked { .. } => Some(Subscription::PanelClicked),
            Self::Widget(_) => Some(Subscription::WidgetAction),
            Self::TextInputResponse { .. } => Some(Subscription::TextInputResponse),
            Self::PromptResponse { .. } => Some(Subscription::PromptResponse),
            Self::StandbyChanged(_) => Some(Subscription::StandbyState),
            Self::CallDisconnected => Some(Subscription::CallDisconnect),
            Self::LongPressElapsed { .. } | Self::Shutdown => None,
        }
    }

    /// Parse one line of the text event script.
    ///
    /// ```text
    /// press <widget> [value]      release <widget> [value]
    /// click <widget> [value]      change <widget> [value]
    /// text <feedback> <text...>   prompt <feedback> <option>
    /// panel <id>                  standby <state>
    /// disconnect                  quit
    /// ```
    pub fn parse_line(line: &str) -> Result<Self, EventParseError> {
        let invalid = |reason: &str| EventParseError::Invalid {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let line = line.trim();
        let (verb, rest) = line.split_once(' ').unwrap_or((line, ""));
        let rest = rest.trim();

        let event = match verb {
            "press" | "release" | "click" | "change" => {
                let phase = match verb {
                    "press" => WidgetPhase::Pressed,
                    "release" => WidgetPhase::Released,
                    "click" => WidgetPhase::Clicked,
                    _ => WidgetPhase::Changed,
                };
                let (widget_id, value) = rest.split_once(' ').unwrap_or((rest, ""));
                if widget_id.is_empty() {
                    return Err(invalid("missing widget id"));
                }
                Self::Widget(WidgetEvent::new(widget_id, phase, value.trim()))
            }
            "text" => {
                let (feedback, text) = rest.split_once(' ').unwrap_or((rest, ""));
                if feedback.is_empty() {
                    return Err(invalid("missing feedback id"));
                }
                Self::TextInputResponse {
                    feedback: feedback.to_string(),
                    text: text.to_string(),
                    peripheral_id: None,
                }
            }
            "prompt" => {
                let (feedback, option) = rest
                    .split_once(' ')
                    .ok_or_else(|| invalid("expected feedback id and option"))?;
                Self::PromptResponse {
                    feedback: feedback.to_string(),
                    option_id: option
                        .trim()
                        .parse()
                        .map_err(|_| invalid("option must be a number"))?,
                    peripheral_id: None,
                }
            }
            "panel" if !rest.is_empty() => Self::PanelClicked {
                panel_id: rest.to_string(),
                peripheral_id: None,
            },
            "standby" => Self::StandbyChanged(rest.parse().map_err(|err: String| invalid(&err))?),
            "disconnect" => Self::CallDisconnected,
            "quit" | "exit" => Self::Shutdown,
            _ => return Err(EventParseError::UnknownVerb(verb.to_string())),
        };
        Ok(event)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventParseError {
    #[error("unknown event `{0}`")]
    UnknownVerb(String),
    #[error("invalid event `{line}`: {reason}")]
    Invalid { line: String, reason: String },
}
