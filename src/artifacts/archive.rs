//! Zip archiving of completed run directories

use crate::error::Result;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archive `run_dir` into a sibling `<run_dir>.zip` and return its path.
///
/// Entry names are relative to the run directory and use forward slashes
/// regardless of platform. The suffix is appended rather than substituted
/// so model names containing dots keep their full directory name.
pub fn archive_run_dir(run_dir: &Path) -> Result<PathBuf> {
    let mut zip_name = run_dir.as_os_str().to_os_string();
    zip_name.push(".zip");
    let zip_path = PathBuf::from(zip_name);

    let file = File::create(&zip_path)?;
    let mut writer = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    add_dir(&mut writer, run_dir, "", options)?;
    writer.finish()?;

    Ok(zip_path)
}

fn add_dir(
    writer: &mut ZipWriter<File>,
    dir: &Path,
    prefix: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let entry_name = if prefix.is_empty() { name } else { format!("{prefix}/{name}") };
        let path = entry.path();

        if path.is_dir() {
            add_dir(writer, &path, &entry_name, options)?;
        } else {
            writer.start_file(entry_name, options)?;
            writer.write_all(&fs::read(&path)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_archive_contains_nested_files() {
        let base = tempfile::tempdir().unwrap();
        let run_dir = base.path().join("20240101_000000_demo");
        fs::create_dir_all(run_dir.join("nested")).unwrap();
        fs::write(run_dir.join("training.log"), "log line\n").unwrap();
        fs::write(run_dir.join("nested").join("loss.csv"), "epoch,training_loss\n").unwrap();

        let zip_path = archive_run_dir(&run_dir).unwrap();
        assert_eq!(zip_path, base.path().join("20240101_000000_demo.zip"));

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert!(names.contains(&"training.log".to_string()));
        assert!(names.contains(&"nested/loss.csv".to_string()));
    }

    #[test]
    fn test_archive_appends_suffix_to_dotted_names() {
        let base = tempfile::tempdir().unwrap();
        let run_dir = base.path().join("20240101_000000_model.v2");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(run_dir.join("training.log"), "x").unwrap();

        let zip_path = archive_run_dir(&run_dir).unwrap();

        assert_eq!(zip_path, base.path().join("20240101_000000_model.v2.zip"));
        assert!(zip_path.exists());
    }

    #[test]
    fn test_archive_round_trips_content() {
        let base = tempfile::tempdir().unwrap();
        let run_dir = base.path().join("run");
        fs::create_dir_all(&run_dir).unwrap();
        fs::write(run_dir.join("training.log"), "starting training\n").unwrap();

        let zip_path = archive_run_dir(&run_dir).unwrap();

        let mut archive = zip::ZipArchive::new(File::open(&zip_path).unwrap()).unwrap();
        let mut entry = archive.by_name("training.log").unwrap();
        let mut contents = String::new();
        std::io::Read::read_to_string(&mut entry, &mut contents).unwrap();
        assert_eq!(contents, "starting training\n");
    }
}
