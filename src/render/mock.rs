use super::{Surface, View, Warning};

/// Surface that keeps every view it was asked to show.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    views: Vec<View>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn views(&self) -> Vec<View> {
        self.views.clone()
    }

    pub fn warnings(&self) -> Vec<Warning> {
        self.views
            .iter()
            .filter_map(|view| match view {
                View::Warning(warning) => Some(*warning),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.views
            .iter()
            .filter_map(|view| match view {
                View::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    /// Progress texts in the order they were shown, marker included.
    pub fn progress_texts(&self) -> Vec<String> {
        self.views
            .iter()
            .filter(|view| matches!(view, View::Progress(_)))
            .map(|view| view.to_string())
            .collect()
    }

    /// What the result region currently shows.
    pub fn displayed(&self) -> String {
        self.views
            .iter()
            .rev()
            .find(|view| matches!(view, View::Progress(_) | View::Result(_)))
            .map(|view| view.to_string())
            .unwrap_or_default()
    }
}

impl Surface for RecordingSurface {
    fn show(&mut self, view: View) {
        self.views.push(view);
    }
}
