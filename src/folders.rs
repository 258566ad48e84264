//! Pinned folder classification and the quick-filter list shown under the query field.

use youtrack_api::IssueFolder;

/// Tabs of the quick-filter list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FolderKind {
    Project,
    Tag,
    SavedSearch,
}

impl FolderKind {
    fn type_marker(&self) -> &'static str {
        match self {
            FolderKind::Project => "project",
            FolderKind::Tag => "tag",
            FolderKind::SavedSearch => "savedquery",
        }
    }

    /// True when the folder's `$type` names this kind (case-insensitive substring).
    pub fn matches(&self, folder: &IssueFolder) -> bool {
        folder
            .entity_type
            .as_deref()
            .unwrap_or_default()
            .to_lowercase()
            .contains(self.type_marker())
    }
}

/// Folders of `kind` that would still narrow the current filter.
pub fn quick_filters<'a>(
    folders: &'a [IssueFolder],
    kind: FolderKind,
    scope: Option<&IssueFolder>,
    search: Option<&str>,
) -> Vec<&'a IssueFolder> {
    folders
        .iter()
        .filter(|folder| kind.matches(folder))
        .filter(|folder| !is_folder_in_use(folder, scope, search))
        .collect()
}

/// A folder is in use when it is the scope, or when its query already sits in
/// the search text as a space-delimited run. Only the first occurrence counts.
pub fn is_folder_in_use(folder: &IssueFolder, scope: Option<&IssueFolder>, search: Option<&str>) -> bool {
    if scope.is_some_and(|current| current.id == folder.id) {
        return true;
    }
    let query = match folder.query.as_deref() {
        Some(query) if !query.is_empty() => query,
        _ => return false,
    };
    let trimmed = search.unwrap_or_default().trim_end();
    let Some(start) = trimmed.find(query) else {
        return false;
    };
    let end = start + query.len();
    let starts_on_boundary = start == 0 || trimmed[..start].ends_with(' ');
    let ends_on_boundary = end == trimmed.len() || trimmed[end..].starts_with(' ');
    starts_on_boundary && ends_on_boundary
}

/// Appends `fragment` to `search`, dropping trailing whitespace and separating with one space.
pub fn append_query(search: Option<&str>, fragment: &str) -> String {
    let trimmed = search.unwrap_or_default().trim_end();
    if trimmed.is_empty() {
        fragment.to_string()
    } else {
        format!("{} {}", trimmed, fragment)
    }
}
