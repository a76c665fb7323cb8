use crate::model::{self, TaskKind};
use crate::tui::picker::PickerState;
use std::path::Path;

/// Which path field has focus on a form tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Input,
    Output,
}

/// One Compress/Decompress tab's form.
#[derive(Debug)]
pub struct FormState {
    pub kind: TaskKind,
    pub input: String,
    pub output: String,
    pub focus: Field,
}

impl FormState {
    pub fn new(kind: TaskKind) -> Self {
        Self {
            kind,
            input: String::new(),
            output: String::new(),
            focus: Field::Input,
        }
    }

    pub fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Input => &mut self.input,
            Field::Output => &mut self.output,
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Field::Input => Field::Output,
            Field::Output => Field::Input,
        };
    }

    /// Apply a picked input path and refresh the suggested output path.
    pub fn apply_input_selection(&mut self, path: &Path) {
        self.input = path.display().to_string();
        let suggested = match self.kind {
            TaskKind::Compress => model::suggest_compress_output(path),
            TaskKind::Decompress => model::suggest_decompress_output(path),
        };
        self.output = suggested.display().to_string();
    }
}

/// UI-thread state. Owned by the UI thread only; no cross-thread mutation.
pub struct UiState {
    pub tab: usize,
    pub compress: FormState,
    pub decompress: FormState,
    pub status: String,
    /// Mirrors the task counter: true while any task is in flight.
    /// Controls are disabled and the spinner shown while set.
    pub busy: bool,
    pub active: u32,
    pub spinner_frame: usize,
    pub log_content: String,
    pub log_scroll: u16,
    pub picker: Option<PickerState>,
    pub show_help: bool,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            tab: 0,
            compress: FormState::new(TaskKind::Compress),
            decompress: FormState::new(TaskKind::Decompress),
            status: "Idle".into(),
            busy: false,
            active: 0,
            spinner_frame: 0,
            log_content: String::new(),
            log_scroll: 0,
            picker: None,
            show_help: false,
        }
    }
}

impl UiState {
    /// The form on the current tab; `None` on the Logs tab.
    pub fn current_form_mut(&mut self) -> Option<&mut FormState> {
        match self.tab {
            0 => Some(&mut self.compress),
            1 => Some(&mut self.decompress),
            _ => None,
        }
    }

    pub fn current_form(&self) -> Option<&FormState> {
        match self.tab {
            0 => Some(&self.compress),
            1 => Some(&self.decompress),
            _ => None,
        }
    }
}
