//! Directory preview runner.
//!
//! Walks the entries of one directory in the order the OS returns them and,
//! for each, prints a row preview and then a schema listing. Entries are not
//! filtered, and the first entry that fails to load ends the run.

use std::{fs, io::Write, path::Path};

use anyhow::Result;
use tracing::debug;

use crate::{
    config::PreviewConfig,
    reader::{PREVIEW_READER, SCHEMA_READER, SchemaSummary, TablePreview},
};

pub const USAGE: &str = "Invalid number of arguments! Usage: Path to folder to .parquet files!";

/// Preview the single directory in `args`.
///
/// Any other argument count prints [`USAGE`] and returns `Ok`.
pub async fn run(args: &[String], out: &mut dyn Write) -> Result<()> {
    let [dir] = args else {
        writeln!(out, "{USAGE}")?;
        return Ok(());
    };

    let processed = preview_dir(dir, &PreviewConfig::default(), out).await?;
    debug!(dir = %dir, processed, "preview finished");
    Ok(())
}

/// Preview every entry of `dir`, returning how many were processed.
pub async fn preview_dir(
    dir: &str,
    config: &PreviewConfig,
    out: &mut dyn Write,
) -> Result<usize> {
    let entries = list_entries(dir)?;
    debug!(dir, entries = entries.len(), "listed directory");

    for name in &entries {
        preview_entry(dir, name, config, out).await?;
    }

    Ok(entries.len())
}

/// Names of all entries in `dir`, unfiltered and unsorted.
pub fn list_entries(dir: &str) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Join a directory and an entry name with exactly one separator.
pub fn entry_path(dir: &str, entry: &str) -> String {
    if dir.ends_with('/') || dir.ends_with(std::path::MAIN_SEPARATOR) {
        format!("{dir}{entry}")
    } else {
        format!("{dir}/{entry}")
    }
}

async fn preview_entry(
    dir: &str,
    name: &str,
    config: &PreviewConfig,
    out: &mut dyn Write,
) -> Result<()> {
    let path = entry_path(dir, name);
    debug!(path = %path, "previewing entry");

    let preview = TablePreview::load(&path, config).await?;
    writeln!(out, "Open file {name} with {PREVIEW_READER}")?;
    preview.render(out)?;
    writeln!(out)?;

    let summary = SchemaSummary::load(Path::new(&path))?;
    writeln!(out, "Open file {name} with {SCHEMA_READER}")?;
    summary.render(out)?;

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_data::{TestBatch, TestFile};
    use tempfile::TempDir;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_entry_path_inserts_one_separator() {
        assert_eq!(entry_path("data", "a.parquet"), "data/a.parquet");
        assert_eq!(entry_path("data/", "a.parquet"), "data/a.parquet");
        assert_eq!(entry_path("/", "a.parquet"), "/a.parquet");
        assert_eq!(entry_path("./nested/dir", "b"), "./nested/dir/b");
    }

    #[tokio::test]
    async fn test_run_with_no_arguments_prints_usage() {
        let mut out: Vec<u8> = Vec::new();
        run(&[], &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{USAGE}\n"));
    }

    #[tokio::test]
    async fn test_run_with_two_arguments_prints_usage() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_parquet_batch(
            &temp_dir.path().join("a.parquet"),
            &TestBatch::id_datetime_value(2),
        );
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        run(&args(&[dir, dir]), &mut out).await.unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), format!("{USAGE}\n"));
    }

    #[tokio::test]
    async fn test_empty_directory_prints_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        run(&args(&[dir]), &mut out).await.unwrap();
        assert!(out.is_empty());

        let processed = preview_dir(dir, &PreviewConfig::default(), &mut Vec::<u8>::new())
            .await
            .unwrap();
        assert_eq!(processed, 0);
    }

    #[tokio::test]
    async fn test_single_file_prints_both_banners_in_order() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_parquet_batch(
            &temp_dir.path().join("quotes.parquet"),
            &TestBatch::id_datetime_value(8),
        );
        let dir = format!("{}/", temp_dir.path().display());

        let mut out: Vec<u8> = Vec::new();
        run(&args(&[dir.as_str()]), &mut out).await.unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(out.matches("Open file ").count(), 2);
        let preview_at = out
            .find("Open file quotes.parquet with datafusion\n")
            .unwrap();
        let schema_at = out.find("Open file quotes.parquet with parquet\n").unwrap();
        assert!(preview_at < schema_at);

        let preview_section = &out[preview_at..schema_at];
        assert_eq!(preview_section.matches("2024-01-02 09:").count(), 5);
        assert!(preview_section.ends_with("\n\n"));

        assert!(out.ends_with(
            "id: Int32 not null\ndatetime_str: Utf8 not null\nvalue: Float64 not null\n"
        ));
    }

    #[tokio::test]
    async fn test_every_entry_is_previewed() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.parquet", "b.parquet", "c"] {
            TestFile::write_parquet_batch(
                &temp_dir.path().join(name),
                &TestBatch::id_datetime_value(1),
            );
        }
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        let processed = preview_dir(dir, &PreviewConfig::default(), &mut out)
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert_eq!(processed, 3);
        assert_eq!(out.matches("with datafusion").count(), 3);
        assert_eq!(out.matches("with parquet").count(), 3);
        assert!(out.contains("Open file c with parquet"));
    }

    #[tokio::test]
    async fn test_missing_index_column_aborts_before_schema_banner() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_parquet_batch(
            &temp_dir.path().join("people.parquet"),
            &TestBatch::simple(),
        );
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        let err = run(&args(&[dir]), &mut out).await.unwrap_err();
        let out = String::from_utf8(out).unwrap();

        assert!(err.to_string().contains("datetime_str"));
        assert!(!out.contains("Open file people.parquet with parquet"));
        assert!(!out.contains("Open file people.parquet with datafusion"));
    }

    #[tokio::test]
    async fn test_failing_entry_stops_the_remaining_entries() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["a.parquet", "b.parquet", "d.parquet", "e.parquet"] {
            TestFile::write_parquet_batch(
                &temp_dir.path().join(name),
                &TestBatch::id_datetime_value(2),
            );
        }
        TestFile::write_parquet_batch(&temp_dir.path().join("c.parquet"), &TestBatch::simple());
        let dir = temp_dir.path().to_str().unwrap();

        let entries = list_entries(dir).unwrap();
        let failing_at = entries.iter().position(|name| name == "c.parquet").unwrap();

        let mut out: Vec<u8> = Vec::new();
        let err = preview_dir(dir, &PreviewConfig::default(), &mut out)
            .await
            .unwrap_err();
        let out = String::from_utf8(out).unwrap();
        assert!(err.to_string().contains("c.parquet"));

        for name in &entries[..failing_at] {
            assert!(out.contains(&format!("Open file {name} with datafusion\n")));
            assert!(out.contains(&format!("Open file {name} with parquet\n")));
        }
        for name in &entries[failing_at..] {
            assert!(!out.contains(&format!("Open file {name} ")), "{name}");
        }
        assert_eq!(out.matches("Open file ").count(), 2 * failing_at);
    }

    #[tokio::test]
    async fn test_glob_characters_in_entry_names_are_literal() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_parquet_batch(
            &temp_dir.path().join("q[1].parquet"),
            &TestBatch::id_datetime_value(2),
        );
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        preview_dir(dir, &PreviewConfig::default(), &mut out)
            .await
            .unwrap();
        let out = String::from_utf8(out).unwrap();

        assert!(out.contains("Open file q[1].parquet with datafusion\n"));
        assert!(out.contains("Open file q[1].parquet with parquet\n"));
        assert_eq!(out.matches("2024-01-02 09:").count(), 2);
    }

    #[tokio::test]
    async fn test_non_parquet_entry_aborts_run() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_invalid_file(&temp_dir.path().join("README"));
        let dir = temp_dir.path().to_str().unwrap();

        let mut out: Vec<u8> = Vec::new();
        assert!(run(&args(&[dir]), &mut out).await.is_err());
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_missing_directory_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("nope");

        let mut out: Vec<u8> = Vec::new();
        let result = run(&args(&[missing.to_str().unwrap()]), &mut out).await;
        assert!(result.is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn test_list_entries_includes_everything() {
        let temp_dir = TempDir::new().unwrap();
        TestFile::write_text(&temp_dir.path().join("notes.txt"), "x");
        TestFile::write_parquet_batch(
            &temp_dir.path().join("a.parquet"),
            &TestBatch::id_datetime_value(1),
        );
        std::fs::create_dir(temp_dir.path().join("sub")).unwrap();

        let mut names = list_entries(temp_dir.path().to_str().unwrap()).unwrap();
        names.sort();
        assert_eq!(names, vec!["a.parquet", "notes.txt", "sub"]);
    }
}
