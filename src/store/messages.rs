pub const THROW: &str = "Place in Trashbin";
pub const UNTHROW: &str = "Remove from Trashbin";

pub const COPIED: &str = "Copied to clipboard";
pub const BACKUP_SAVED_SUCCESS: &str = "Backup saved successfully.";
pub const BACKUP_SAVED_FAILED: &str = "Failed to save backup, try copying trashbin contents to clipboard and creating a backup manually.";
pub const BACKUP_RESTORED_SUCCESS: &str = "Backup restored successfully.";
pub const BACKUP_RESTORED_FAILED_FILE_READ: &str =
    "Failed to read file, please ensure it is a valid JSON file.";
pub const TRASHBIN_CLEARED: &str = "Trashbin cleared successfully!";

pub const SONG_ADDED: &str = "Song added to trashbin";
pub const SONG_REMOVED: &str = "Song removed from trashbin";
pub const ARTIST_ADDED: &str = "Artist added to trashbin";
pub const ARTIST_REMOVED: &str = "Artist removed from trashbin";

pub const STORAGE_WRITE_FAILED: &str = "Trashbin could not save your changes, they will be lost on restart.";
pub const SKIP_FAILED: &str = "Could not jump to the next track, skipping instead.";
