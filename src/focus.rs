//! Input focus: which single UI element receives directional and confirm input.

/// Current focus. A parameter and the preset list can never be focused together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Unfocused,
    Parameter(usize),
    PresetList,
    /// Quit was requested. Terminal: no transition leaves it.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    SelectParameter(usize),
    ActivatePresetList,
    Quit,
}

/// Something that can carry a visual highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Element {
    Parameter(usize),
    PresetList,
}

impl Focus {
    /// Focus persists until another selection or quit; nothing falls back to `Unfocused`.
    pub fn apply(self, t: Transition) -> Focus {
        match (self, t) {
            (Focus::Closed, _) => Focus::Closed,
            (_, Transition::Quit) => Focus::Closed,
            (_, Transition::SelectParameter(i)) => Focus::Parameter(i),
            (_, Transition::ActivatePresetList) => Focus::PresetList,
        }
    }

    pub fn parameter(self) -> Option<usize> {
        match self {
            Focus::Parameter(i) => Some(i),
            _ => None,
        }
    }

    pub fn is_closed(self) -> bool {
        self == Focus::Closed
    }

    /// Highlights are derived from focus, so at most one element is ever lit.
    pub fn highlights(self, el: Element) -> bool {
        match (self, el) {
            (Focus::Parameter(i), Element::Parameter(j)) => i == j,
            (Focus::PresetList, Element::PresetList) => true,
            _ => false,
        }
    }
}
