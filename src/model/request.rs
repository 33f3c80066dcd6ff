use std::str::FromStr;

use crate::{
    foundation::core::Point,
    foundation::error::{LettererError, LettererResult},
    model::region::RegionTag,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
/// Kind of dialogue element to letter.
///
/// Kinds differ only in candidate pool and alignment: speech and thought share the bubble
/// pool and are centred; narration uses the box pool and reads from the top-left.
pub enum ElementKind {
    /// Spoken dialogue in a speech bubble.
    Speech,
    /// Inner monologue in a thought bubble.
    Thought,
    /// Caption in a rectangular narration box.
    Narration,
}

impl ElementKind {
    /// Region tag this kind draws its candidates from.
    pub fn pool(self) -> RegionTag {
        match self {
            Self::Speech | Self::Thought => RegionTag::SpeechBubble,
            Self::Narration => RegionTag::NarrationBox,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Speech => "speech",
            Self::Thought => "thought",
            Self::Narration => "narration",
        }
    }
}

impl FromStr for ElementKind {
    type Err = LettererError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "speech" | "dialogue" => Ok(Self::Speech),
            "thought" => Ok(Self::Thought),
            "narration" | "caption" => Ok(Self::Narration),
            other => Err(LettererError::input(format!(
                "unknown element kind '{other}'"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
/// One of nine named positions on the panel used to pick among candidate regions.
pub enum Anchor {
    TopLeft,
    #[serde(alias = "top")]
    TopCenter,
    TopRight,
    #[serde(alias = "left")]
    CenterLeft,
    Center,
    #[serde(alias = "right")]
    CenterRight,
    BottomLeft,
    #[serde(alias = "bottom")]
    BottomCenter,
    BottomRight,
}

impl Anchor {
    pub const ALL: [Anchor; 9] = [
        Anchor::TopLeft,
        Anchor::TopCenter,
        Anchor::TopRight,
        Anchor::CenterLeft,
        Anchor::Center,
        Anchor::CenterRight,
        Anchor::BottomLeft,
        Anchor::BottomCenter,
        Anchor::BottomRight,
    ];

    /// Normalized `[0, 1]` image-relative point for this anchor.
    ///
    /// `edge_inset` is the distance of the outer anchors from the panel edge, so with the
    /// default of 0.15 `TopLeft` maps to `(0.15, 0.15)` and `Center` to `(0.5, 0.5)`.
    pub fn normalized(self, edge_inset: f64) -> Point {
        let lo = edge_inset.clamp(0.0, 0.5);
        let hi = 1.0 - lo;
        let (x, y) = match self {
            Self::TopLeft => (lo, lo),
            Self::TopCenter => (0.5, lo),
            Self::TopRight => (hi, lo),
            Self::CenterLeft => (lo, 0.5),
            Self::Center => (0.5, 0.5),
            Self::CenterRight => (hi, 0.5),
            Self::BottomLeft => (lo, hi),
            Self::BottomCenter => (0.5, hi),
            Self::BottomRight => (hi, hi),
        };
        Point::new(x, y)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::TopRight => "top-right",
            Self::CenterLeft => "center-left",
            Self::Center => "center",
            Self::CenterRight => "center-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
            Self::BottomRight => "bottom-right",
        }
    }
}

impl FromStr for Anchor {
    type Err = LettererError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let anchor = match norm.as_str() {
            "top-left" => Self::TopLeft,
            "top" | "top-center" => Self::TopCenter,
            "top-right" => Self::TopRight,
            "left" | "center-left" => Self::CenterLeft,
            "center" | "middle" => Self::Center,
            "right" | "center-right" => Self::CenterRight,
            "bottom-left" => Self::BottomLeft,
            "bottom" | "bottom-center" => Self::BottomCenter,
            "bottom-right" => Self::BottomRight,
            _ => {
                return Err(LettererError::input(format!("unknown anchor '{s}'")));
            }
        };
        Ok(anchor)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
/// A single dialogue element to letter onto a panel.
pub struct ElementRequest {
    /// Element kind (selects candidate pool and alignment).
    pub kind: ElementKind,
    /// Anchor zone used to disambiguate candidates.
    pub anchor: Anchor,
    /// Text to render.
    pub text: String,
    /// Optional maximum character count; longer text is cut at a word boundary.
    #[serde(default)]
    pub max_chars: Option<usize>,
    /// Optional speaker name drawn above speech/thought text.
    #[serde(default)]
    pub speaker: Option<String>,
}

impl ElementRequest {
    pub fn new(kind: ElementKind, anchor: Anchor, text: impl Into<String>) -> Self {
        Self {
            kind,
            anchor,
            text: text.into(),
            max_chars: None,
            speaker: None,
        }
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn with_speaker(mut self, speaker: impl Into<String>) -> Self {
        self.speaker = Some(speaker.into());
        self
    }

    /// Speaker label to draw, if any. Narration never carries one.
    pub fn speaker_label(&self) -> Option<String> {
        if self.kind == ElementKind::Narration {
            return None;
        }
        self.speaker
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_uppercase)
    }

    pub fn validate(&self) -> LettererResult<()> {
        if self.max_chars == Some(0) {
            return Err(LettererError::input("max_chars must be > 0 when set"));
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/model/request.rs"]
mod tests;
