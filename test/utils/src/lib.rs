use std::fs;
use std::path;

/// Absolute path to a file under `test/fixtures`.
pub fn fixture(name: &str) -> String {
    return path::PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../fixtures")
        .join(name)
        .to_string_lossy()
        .to_string();
}

/// Writes a file of `size_bytes` zero bytes into a fresh temp directory and
/// returns the directory guard with the file's path. The directory is removed
/// when the guard drops, so hold it for as long as the file is needed. Upload
/// commands only look at the name and size.
pub fn sized_file(name: &str, size_bytes: u64) -> (tempfile::TempDir, String) {
    let dir = tempfile::Builder::new()
        .prefix("campusflow-test")
        .tempdir()
        .unwrap();

    let file_path = dir.path().join(name);
    let file = fs::File::create(&file_path).unwrap();
    file.set_len(size_bytes).unwrap();

    return (dir, file_path.to_string_lossy().to_string());
}

#[cfg(test)]
mod tests {
    use std::path;

    use super::sized_file;

    #[test]
    fn it_writes_a_file_of_the_given_size() {
        let (_dir, file_path) = sized_file("photo.jpg", 4096);

        let metadata = std::fs::metadata(&file_path).unwrap();
        assert_eq!(metadata.len(), 4096);
        assert!(file_path.ends_with("photo.jpg"));
    }

    #[test]
    fn it_removes_the_file_when_the_guard_drops() {
        let (dir, file_path) = sized_file("12th.pdf", 2048);
        let dir_path = dir.path().to_path_buf();
        assert!(path::Path::new(&file_path).exists());

        drop(dir);

        assert!(!path::Path::new(&file_path).exists());
        assert!(!dir_path.exists());
    }

    #[test]
    fn it_uses_a_fresh_directory_per_call() {
        let (first_dir, first) = sized_file("scan.pdf", 1);
        let (second_dir, second) = sized_file("scan.pdf", 1);

        assert_ne!(first_dir.path(), second_dir.path());
        assert_ne!(first, second);
    }
}
