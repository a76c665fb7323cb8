//! Directory-browsing overlay used to fill the path fields.
//!
//! Open mode selects an existing file; Save mode selects a directory plus an
//! editable file name. Cancelling is a no-op for the form.

use crate::tui::state::Field;
use std::fs;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickerMode {
    Open,
    Save,
}

#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug)]
pub struct PickerState {
    pub mode: PickerMode,
    /// Which form field receives the selection.
    pub target: Field,
    pub dir: PathBuf,
    pub entries: Vec<DirEntryInfo>,
    pub selected: usize,
    /// Save mode: the editable file name joined onto `dir` on confirm.
    pub file_name: String,
    pub error: Option<String>,
}

impl PickerState {
    pub fn open(mode: PickerMode, target: Field, dir: PathBuf, file_name: String) -> Self {
        let mut picker = Self {
            mode,
            target,
            dir,
            entries: Vec::new(),
            selected: 0,
            file_name,
            error: None,
        };
        picker.refresh();
        picker
    }

    pub fn refresh(&mut self) {
        self.entries.clear();
        self.error = None;
        self.selected = 0;
        match fs::read_dir(&self.dir) {
            Ok(read_dir) => {
                for entry in read_dir.flatten() {
                    let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
                    self.entries.push(DirEntryInfo {
                        name: entry.file_name().to_string_lossy().into_owned(),
                        is_dir,
                    });
                }
                // Directories first, then names, for predictable navigation.
                self.entries
                    .sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name)));
            }
            Err(e) => self.error = Some(format!("Cannot read {}: {e}", self.dir.display())),
        }
    }

    pub fn move_up(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn move_down(&mut self) {
        if !self.entries.is_empty() {
            self.selected = (self.selected + 1).min(self.entries.len() - 1);
        }
    }

    pub fn selected_entry(&self) -> Option<&DirEntryInfo> {
        self.entries.get(self.selected)
    }

    /// Enter the selected directory, if the selection is one.
    pub fn descend(&mut self) {
        if let Some(entry) = self.selected_entry() {
            if entry.is_dir {
                self.dir = self.dir.join(&entry.name);
                self.refresh();
            }
        }
    }

    pub fn ascend(&mut self) {
        if let Some(parent) = self.dir.parent() {
            self.dir = parent.to_path_buf();
            self.refresh();
        }
    }

    /// Resolve the selection on Enter. `None` keeps the picker open (Enter
    /// on a directory in Open mode descends instead).
    pub fn confirm(&mut self) -> Option<PathBuf> {
        match self.mode {
            PickerMode::Open => match self.selected_entry() {
                Some(entry) if entry.is_dir => {
                    self.descend();
                    None
                }
                Some(entry) => Some(self.dir.join(&entry.name)),
                None => None,
            },
            PickerMode::Save => {
                if self.file_name.is_empty() {
                    None
                } else {
                    Some(self.dir.join(&self.file_name))
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_mode_selects_files_and_descends_into_directories() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("sub/file.txt"), b"x").unwrap();

        let mut picker = PickerState::open(
            PickerMode::Open,
            Field::Input,
            tmp.path().to_path_buf(),
            String::new(),
        );
        // Only "sub" is listed; Enter descends, then selects the file.
        assert!(picker.confirm().is_none());
        assert_eq!(picker.dir, tmp.path().join("sub"));
        let picked = picker.confirm().unwrap();
        assert_eq!(picked, tmp.path().join("sub/file.txt"));
    }

    #[test]
    fn save_mode_joins_directory_and_name() {
        let tmp = tempfile::tempdir().unwrap();
        let mut picker = PickerState::open(
            PickerMode::Save,
            Field::Output,
            tmp.path().to_path_buf(),
            "out.lzma".into(),
        );
        assert_eq!(picker.confirm().unwrap(), tmp.path().join("out.lzma"));
        picker.file_name.clear();
        assert!(picker.confirm().is_none());
    }
}
