use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BulkAction {
    Download,
    Regenerate,
    Delete,
    Finalize,
    RevertToDraft,
    ExportCsv,
    SendEmail,
}

impl BulkAction {
    pub fn all() -> &'static [Self] {
        &[
            Self::Download,
            Self::Regenerate,
            Self::Delete,
            Self::Finalize,
            Self::RevertToDraft,
            Self::ExportCsv,
            Self::SendEmail,
        ]
    }

    pub fn name(self) -> &'static str {
        match self {
            Self::Download => "download",
            Self::Regenerate => "regenerate",
            Self::Delete => "delete",
            Self::Finalize => "finalize",
            Self::RevertToDraft => "revert-to-draft",
            Self::ExportCsv => "export-csv",
            Self::SendEmail => "send-email",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Download => "Download",
            Self::Regenerate => "Regenerate",
            Self::Delete => "Delete",
            Self::Finalize => "Finalize",
            Self::RevertToDraft => "Revert to draft",
            Self::ExportCsv => "Export CSV",
            Self::SendEmail => "Send email",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.name() == name)
    }

    pub fn is_destructive(self) -> bool {
        matches!(self, Self::Delete)
    }
}

impl fmt::Display for BulkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bulk operation handed to the host. The grid does no I/O itself.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkRequest<Id> {
    pub ids: Vec<Id>,
    pub action: BulkAction,
}

/// Selected record ids plus the host-owned in-flight flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BulkCoordinator<Id: Ord> {
    selected: BTreeSet<Id>,
    processing: bool,
}

impl<Id: Ord> Default for BulkCoordinator<Id> {
    fn default() -> Self {
        Self {
            selected: BTreeSet::new(),
            processing: false,
        }
    }
}

impl<Id: Ord + Clone> BulkCoordinator<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, id: &Id) -> bool {
        self.selected.contains(id)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn has_selection(&self) -> bool {
        !self.selected.is_empty()
    }

    /// Selected ids in id order.
    pub fn selected_ids(&self) -> Vec<Id> {
        self.selected.iter().cloned().collect()
    }

    pub fn set_selected(&mut self, id: Id, selected: bool) {
        if selected {
            self.selected.insert(id);
        } else {
            self.selected.remove(&id);
        }
    }

    pub fn toggle(&mut self, id: Id) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    /// Header checkbox: selects every id on the page unless all of them
    /// are already selected, in which case it clears them.
    pub fn toggle_all(&mut self, page_ids: &[Id]) {
        if self.all_selected(page_ids) {
            for id in page_ids {
                self.selected.remove(id);
            }
        } else {
            self.selected.extend(page_ids.iter().cloned());
        }
    }

    pub fn all_selected(&self, page_ids: &[Id]) -> bool {
        !page_ids.is_empty() && page_ids.iter().all(|id| self.selected.contains(id))
    }

    pub fn partially_selected(&self, page_ids: &[Id]) -> bool {
        let count = page_ids.iter().filter(|id| self.selected.contains(id)).count();
        count > 0 && count < page_ids.len()
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drops ids that are no longer present.
    pub fn retain(&mut self, present: &BTreeSet<Id>) {
        self.selected.retain(|id| present.contains(id));
    }

    pub fn processing(&self) -> bool {
        self.processing
    }

    pub fn set_processing(&mut self, processing: bool) {
        self.processing = processing;
    }

    /// Whether the buttons for bulk actions are enabled.
    pub fn can_dispatch(&self) -> bool {
        !self.processing && !self.selected.is_empty()
    }

    /// Builds the request, or `None` while disabled.
    pub fn dispatch(&self, action: BulkAction) -> Option<BulkRequest<Id>> {
        self.can_dispatch().then(|| BulkRequest {
            ids: self.selected_ids(),
            action,
        })
    }
}
