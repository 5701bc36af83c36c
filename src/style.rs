//! # Style Tracking
//!
//! Tracks the text style the document believes is active and emits a delta
//! only when a setter actually changes something. The composer uses
//! [`StyleTracker::store`] / [`StyleTracker::restore`] to bracket every
//! line, so each line starts from the default style, re-applies whatever
//! carried over, and drives back to default at its end. Re-printing any
//! single line therefore never depends on printer state.

/// A text style record.
///
/// Width and height are character-cell multipliers in `1..=8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub invert: bool,
    pub width: u8,
    pub height: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            bold: false,
            italic: false,
            underline: false,
            invert: false,
            width: 1,
            height: 1,
        }
    }
}

/// A single observed style change.
///
/// Width and height changes coalesce into one `Size` delta carrying both
/// values, mirroring the single wire command that sets them together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleDelta {
    Bold(bool),
    Italic(bool),
    Underline(bool),
    Invert(bool),
    Size { width: u8, height: u8 },
}

/// Current style vs. default style, with change detection.
#[derive(Debug, Default)]
pub struct StyleTracker {
    current: Style,
}

impl StyleTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The style the document currently has active.
    pub fn current(&self) -> &Style {
        &self.current
    }

    pub fn set_bold(&mut self, value: bool) -> Option<StyleDelta> {
        if self.current.bold == value {
            return None;
        }
        self.current.bold = value;
        Some(StyleDelta::Bold(value))
    }

    pub fn set_italic(&mut self, value: bool) -> Option<StyleDelta> {
        if self.current.italic == value {
            return None;
        }
        self.current.italic = value;
        Some(StyleDelta::Italic(value))
    }

    pub fn set_underline(&mut self, value: bool) -> Option<StyleDelta> {
        if self.current.underline == value {
            return None;
        }
        self.current.underline = value;
        Some(StyleDelta::Underline(value))
    }

    pub fn set_invert(&mut self, value: bool) -> Option<StyleDelta> {
        if self.current.invert == value {
            return None;
        }
        self.current.invert = value;
        Some(StyleDelta::Invert(value))
    }

    pub fn set_width(&mut self, value: u8) -> Option<StyleDelta> {
        if self.current.width == value {
            return None;
        }
        self.current.width = value;
        Some(self.size_delta())
    }

    pub fn set_height(&mut self, value: u8) -> Option<StyleDelta> {
        if self.current.height == value {
            return None;
        }
        self.current.height = value;
        Some(self.size_delta())
    }

    pub fn set_size(&mut self, width: u8, height: u8) -> Option<StyleDelta> {
        if self.current.width == width && self.current.height == height {
            return None;
        }
        self.current.width = width;
        self.current.height = height;
        Some(self.size_delta())
    }

    fn size_delta(&self) -> StyleDelta {
        StyleDelta::Size {
            width: self.current.width,
            height: self.current.height,
        }
    }

    /// Deltas that drive the current style back to default.
    ///
    /// Emitted at the end of a line; empty when nothing deviates.
    pub fn store(&self) -> Vec<StyleDelta> {
        self.diff(&self.current, &Style::default())
    }

    /// Deltas that re-apply the current style from default.
    ///
    /// Emitted at the start of the next line.
    pub fn restore(&self) -> Vec<StyleDelta> {
        self.diff(&Style::default(), &self.current)
    }

    /// Forget all deviations, e.g. at the end of an `encode` pass.
    pub fn reset(&mut self) {
        self.current = Style::default();
    }

    fn diff(&self, from: &Style, to: &Style) -> Vec<StyleDelta> {
        let mut deltas = Vec::new();
        if from.bold != to.bold {
            deltas.push(StyleDelta::Bold(to.bold));
        }
        if from.italic != to.italic {
            deltas.push(StyleDelta::Italic(to.italic));
        }
        if from.underline != to.underline {
            deltas.push(StyleDelta::Underline(to.underline));
        }
        if from.invert != to.invert {
            deltas.push(StyleDelta::Invert(to.invert));
        }
        if from.width != to.width || from.height != to.height {
            deltas.push(StyleDelta::Size {
                width: to.width,
                height: to.height,
            });
        }
        deltas
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_only_on_change() {
        let mut tracker = StyleTracker::new();
        assert_eq!(tracker.set_bold(true), Some(StyleDelta::Bold(true)));
        assert_eq!(tracker.set_bold(true), None);
        assert_eq!(tracker.set_bold(false), Some(StyleDelta::Bold(false)));
    }

    #[test]
    fn test_width_and_height_coalesce_into_size() {
        let mut tracker = StyleTracker::new();
        assert_eq!(
            tracker.set_width(2),
            Some(StyleDelta::Size { width: 2, height: 1 })
        );
        assert_eq!(
            tracker.set_height(3),
            Some(StyleDelta::Size { width: 2, height: 3 })
        );
    }

    #[test]
    fn test_store_restore_bracket() {
        let mut tracker = StyleTracker::new();
        tracker.set_bold(true);
        tracker.set_size(2, 2);

        assert_eq!(
            tracker.store(),
            vec![
                StyleDelta::Bold(false),
                StyleDelta::Size { width: 1, height: 1 },
            ]
        );
        assert_eq!(
            tracker.restore(),
            vec![
                StyleDelta::Bold(true),
                StyleDelta::Size { width: 2, height: 2 },
            ]
        );
    }

    #[test]
    fn test_store_restore_identity_on_default() {
        let tracker = StyleTracker::new();
        assert!(tracker.store().is_empty());
        assert!(tracker.restore().is_empty());
    }

    #[test]
    fn test_reset() {
        let mut tracker = StyleTracker::new();
        tracker.set_invert(true);
        tracker.reset();
        assert_eq!(tracker.current(), &Style::default());
    }
}
