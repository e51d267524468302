//! Render instructions handed to the presentation layer.

use serde::Serialize;

use grid_model::RecordStatus;

/// Text shown for cells that could not be rendered.
pub const PLACEHOLDER: &str = "-";

/// Text shown for an empty chip list.
pub const NO_ITEMS_LABEL: &str = "None";

// =============================================================================
// BADGE TONE
// =============================================================================

/// Color family of a badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeTone {
    /// Active state (green)
    Success,
    /// Inactive or unrecognized state (gray)
    Neutral,
}

impl From<RecordStatus> for BadgeTone {
    fn from(status: RecordStatus) -> Self {
        match status {
            RecordStatus::Active => Self::Success,
            RecordStatus::Inactive => Self::Neutral,
        }
    }
}

// =============================================================================
// CHIP
// =============================================================================

/// One tag of a chip list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chip {
    /// Stable key (the group id).
    pub key: String,
    /// Visible label (the group name).
    pub label: String,
}

// =============================================================================
// RENDER INSTRUCTION
// =============================================================================

/// How a single cell should be painted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderInstruction {
    /// Plain display text.
    Text { text: String },
    /// Labeled, colored indicator.
    Badge { label: String, tone: BadgeTone },
    /// Formatted date.
    Date { text: String },
    /// Ordered tags.
    Chips { chips: Vec<Chip> },
    /// A chip list with no entries.
    NoItems,
    /// Missing or malformed value.
    Placeholder,
}

impl RenderInstruction {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn badge(label: impl Into<String>, tone: BadgeTone) -> Self {
        Self::Badge {
            label: label.into(),
            tone,
        }
    }

    /// Whether the cell degraded to the placeholder.
    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Flatten to plain text, e.g. for terminal output.
    pub fn plain_text(&self) -> String {
        match self {
            Self::Text { text } | Self::Date { text } => text.clone(),
            Self::Badge { label, .. } => label.clone(),
            Self::Chips { chips } => chips
                .iter()
                .map(|chip| chip.label.as_str())
                .collect::<Vec<_>>()
                .join(", "),
            Self::NoItems => NO_ITEMS_LABEL.to_string(),
            Self::Placeholder => PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let chips = RenderInstruction::Chips {
            chips: vec![
                Chip {
                    key: "g1".into(),
                    label: "Engineering".into(),
                },
                Chip {
                    key: "g2".into(),
                    label: "Sales".into(),
                },
            ],
        };
        assert_eq!(chips.plain_text(), "Engineering, Sales");
        assert_eq!(RenderInstruction::NoItems.plain_text(), NO_ITEMS_LABEL);
        assert_eq!(RenderInstruction::Placeholder.plain_text(), PLACEHOLDER);
    }

    #[test]
    fn test_badge_tone_is_total() {
        assert_eq!(BadgeTone::from(RecordStatus::Active), BadgeTone::Success);
        assert_eq!(BadgeTone::from(RecordStatus::Inactive), BadgeTone::Neutral);
    }

    #[test]
    fn test_badge_serialized_form() {
        let badge = RenderInstruction::badge("Inactive", BadgeTone::Neutral);
        assert_eq!(
            serde_json::to_value(&badge).unwrap(),
            serde_json::json!({"kind": "badge", "label": "Inactive", "tone": "neutral"})
        );
    }
}
