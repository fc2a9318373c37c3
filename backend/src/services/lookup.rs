//! Name lookups against a folder, shared by both pipelines.

use crate::error::StoreError;
use crate::workspace::{FileEntry, FileStore};
use log::warn;

/// Returns `true` if `folder_id` already holds a file called exactly `name`.
///
/// This is a point-in-time check; two runs racing on the same folder can both see `false`.
pub fn file_exists_in_folder<F>(files: &F, folder_id: &str, name: &str) -> Result<bool, StoreError>
where
    F: FileStore + ?Sized,
{
    Ok(!files.files_by_name(folder_id, name)?.is_empty())
}

/// The first file named `name` in `folder_id`, in the store's enumeration order.
pub fn first_file_named<F>(files: &F, folder_id: &str, name: &str) -> Result<Option<FileEntry>, StoreError>
where
    F: FileStore + ?Sized,
{
    let mut matches = files.files_by_name(folder_id, name)?;
    if matches.len() > 1 {
        warn!(
            "{} files named '{}' in folder {}; using the first one",
            matches.len(),
            name,
            folder_id
        );
    }
    Ok(if matches.is_empty() {
        None
    } else {
        Some(matches.swap_remove(0))
    })
}

/// The first parent folder of a file, the container both pipelines work in.
pub fn first_parent<F>(files: &F, file_id: &str) -> Result<Option<FileEntry>, StoreError>
where
    F: FileStore + ?Sized,
{
    Ok(files.parents(file_id)?.into_iter().next())
}
