use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::build::BUILD_MANIFEST_PREFIX;
use crate::model::BuildRunManifest;
use crate::store::count_rows;
use crate::util::read_json;

pub fn run(args: StatusArgs) -> Result<()> {
    let manifest_dir = args.out_dir.join("manifests");

    info!(out_dir = %args.out_dir.display(), "status requested");

    let mut db_path = args.db_path.clone();

    match latest_build_manifest(&manifest_dir)? {
        Some(path) => {
            let manifest: BuildRunManifest = read_json(&path)?;
            info!(
                path = %path.display(),
                run_id = %manifest.run_id,
                status = %manifest.status,
                document_version = manifest.document_version,
                started_at = %manifest.started_at,
                updated_at = %manifest.updated_at,
                institutions_built = manifest.counts.institutions_built,
                institutions_failed = manifest.counts.institutions_failed,
                courses_built = manifest.counts.courses_built,
                courses_failed = manifest.counts.courses_failed,
                "loaded build run manifest"
            );
            for failure in &manifest.failures {
                warn!(
                    entity = %failure.entity,
                    pub_ukprn = %failure.pub_ukprn.as_deref().unwrap_or_default(),
                    course_id = %failure.course_id.as_deref().unwrap_or_default(),
                    reason = %failure.reason,
                    "recorded failure"
                );
            }
            if db_path.is_none() {
                db_path = manifest.paths.db_path.map(PathBuf::from);
            }
        }
        None => warn!(path = %manifest_dir.display(), "no build run manifest found"),
    }

    match db_path {
        Some(db_path) if db_path.exists() => {
            let conn = Connection::open(&db_path)
                .with_context(|| format!("failed to open {}", db_path.display()))?;
            let courses = count_rows(&conn, "courses").unwrap_or(0);
            let institutions = count_rows(&conn, "institutions").unwrap_or(0);

            info!(
                path = %db_path.display(),
                courses,
                institutions,
                "document store status"
            );
        }
        Some(db_path) => warn!(path = %db_path.display(), "database file missing"),
        None => {}
    }

    Ok(())
}

pub fn latest_build_manifest(manifest_dir: &Path) -> Result<Option<PathBuf>> {
    if !manifest_dir.exists() {
        return Ok(None);
    }

    let entries = fs::read_dir(manifest_dir)
        .with_context(|| format!("failed to read {}", manifest_dir.display()))?;

    let mut latest: Option<PathBuf> = None;
    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", manifest_dir.display()))?;
        let path = entry.path();

        let is_build_manifest = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(BUILD_MANIFEST_PREFIX) && name.ends_with(".json"))
            .unwrap_or(false);

        if is_build_manifest && latest.as_ref().is_none_or(|current| path > *current) {
            latest = Some(path);
        }
    }

    Ok(latest)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_manifest_is_last_by_timestamp() {
        let dir = tempfile::tempdir().expect("temp dir");
        for name in [
            "build_run_20260101T000000Z.json",
            "build_run_20260301T000000Z.json",
            "build_run_20260201T000000Z.json",
            "inspect.json",
        ] {
            fs::write(dir.path().join(name), "{}").expect("write manifest");
        }

        let latest = latest_build_manifest(dir.path())
            .expect("scan succeeds")
            .expect("manifest found");
        assert!(latest.ends_with("build_run_20260301T000000Z.json"));
    }

    #[test]
    fn missing_manifest_dir_has_no_manifest() {
        let dir = tempfile::tempdir().expect("temp dir");
        assert_eq!(
            latest_build_manifest(&dir.path().join("manifests")).expect("scan succeeds"),
            None
        );
    }
}
