use std::path::Path;

/// Create the parent directory of `path` and all of its ancestors if they do not exist.
pub fn create_parent_dir(path: &Path) -> std::io::Result<()> {
	match path.parent() {
		Some(parent) if !parent.as_os_str().is_empty() => std::fs::create_dir_all(parent),
		_ => Ok(()),
	}
}

/// Write `contents` to `path`, creating missing parent directories first.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> std::io::Result<()> {
	create_parent_dir(path)?;
	std::fs::write(path, contents)
}
