use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::InspectArgs;
use crate::commands::build::load_submission;
use crate::lookup::{build_accreditations, build_kis_aims};
use crate::model::{SectorCounts, SourceEntry, SourceInspectManifest};
use crate::stats::{SectorMatcher, StatFamily};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InspectArgs) -> Result<()> {
    let manifest = inspect_source(&args.xml_path)?;

    info!(
        institutions = manifest.institution_count,
        courses = manifest.course_count,
        accreditations = manifest.accreditation_count,
        kis_aims = manifest.kis_aim_count,
        go_salary_sector = manifest.sector_counts.go_salary,
        leo3_sector = manifest.sector_counts.leo3,
        leo5_sector = manifest.sector_counts.leo5,
        salary_sector = manifest.sector_counts.salary,
        sha256 = %manifest.source.sha256,
        "inspected submission"
    );

    if let Some(manifest_path) = args.manifest_path {
        write_json_pretty(&manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote inspect manifest");
    }

    Ok(())
}

pub fn inspect_source(xml_path: &Path) -> Result<SourceInspectManifest> {
    let root = load_submission(xml_path)?;

    let institutions = root.blocks("INSTITUTION");
    let course_count = institutions
        .iter()
        .map(|institution| institution.blocks("KISCOURSE").len())
        .sum::<usize>();
    let sector_count = |family| SectorMatcher::new(family, &root).len();

    Ok(SourceInspectManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source: SourceEntry {
            path: xml_path.display().to_string(),
            sha256: sha256_file(xml_path)?,
        },
        institution_count: institutions.len(),
        course_count,
        accreditation_count: build_accreditations(&root)
            .context("failed to index accreditation table")?
            .len(),
        kis_aim_count: build_kis_aims(&root)
            .context("failed to index KIS aims")?
            .len(),
        sector_counts: SectorCounts {
            go_salary: sector_count(StatFamily::GoSalarySector),
            leo3: sector_count(StatFamily::Leo3Sector),
            leo5: sector_count(StatFamily::Leo5Sector),
            salary: sector_count(StatFamily::SalarySector),
        },
    })
}
