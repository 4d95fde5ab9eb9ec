use std::fs;
use std::path::Path;

/// Writes each `(relative path, content)` pair under `root`, creating parent directories and
/// overwriting existing files.
pub fn write_files(root: &Path, files: &[(&str, &str)]) {
    for (relative_path, content) in files {
        let path = root.join(relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("create fixture directory");
        }
        fs::write(&path, content).expect("write fixture file");
    }
}

/// A complete HTML document whose body is `body`.
pub fn html_page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html>\n<head><title>{title}</title></head>\n<body>{body}</body>\n</html>"
    )
}
