use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use tracing::{debug, error, info};

use crate::cli::BuildArgs;
use crate::documents::{AssemblyOptions, DocumentAssembler, InstitutionContext};
use crate::lookup::{LookupIndex, parse_qualification_levels};
use crate::model::{BuildCounts, BuildPaths, BuildRunManifest, EntityFailure, SourceEntry};
use crate::reference::ReferenceData;
use crate::registry::{ProviderIndex, ProviderRecord};
use crate::store::{DocumentStore, JsonDirectoryStore, SqliteStore};
use crate::util::{
    ensure_directory, now_utc_string, read_json, read_text, sha256_file, utc_compact_string,
    write_json_pretty,
};
use crate::xml::{RawBlock, parse_document};

pub const BUILD_MANIFEST_PREFIX: &str = "build_run_";

pub fn run(args: BuildArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("build-{}", utc_compact_string(started_ts));
    let manifest_dir = args.out_dir.join("manifests");

    info!(xml_path = %args.xml_path.display(), run_id = %run_id, "starting build");

    let reference = ReferenceData::load(args.reference_data_path.as_deref())?;
    let root = load_submission(&args.xml_path)?;
    let qualification_levels = load_qualification_levels(&args.qualification_levels_path)?;
    let providers = load_providers(&args.enrichment_path)?;

    let assembler = DocumentAssembler::new(
        &root,
        &reference,
        &providers,
        &qualification_levels,
        AssemblyOptions {
            version: args.version_tag,
            created_at: started_at.clone(),
        },
    )
    .context("failed to build submission lookups")?;

    let mut stores: Vec<Box<dyn DocumentStore>> = Vec::new();
    if !args.dry_run {
        ensure_directory(&args.out_dir)?;
        stores.push(Box::new(JsonDirectoryStore::new(&args.out_dir)));
        if let Some(db_path) = &args.db_path {
            stores.push(Box::new(SqliteStore::open(db_path)?));
        }
    }

    let mut build = BuildState {
        fail_fast: args.fail_fast,
        counts: BuildCounts::default(),
        failures: Vec::new(),
    };

    for block in assembler.institutions() {
        build.counts.institutions_total += 1;
        let institution = match assembler.institution_context(block) {
            Ok(institution) => institution,
            Err(err) => {
                let pub_ukprn = block.non_empty_text("PUBUKPRN").map(ToOwned::to_owned);
                build.counts.institutions_failed += 1;
                build.record(EntityFailure {
                    entity: "institution".to_string(),
                    pub_ukprn: pub_ukprn.clone(),
                    course_id: None,
                    course_mode: None,
                    reason: err.to_string(),
                })?;

                for course in block.blocks("KISCOURSE") {
                    build.counts.courses_total += 1;
                    build.counts.courses_failed += 1;
                    build.record(EntityFailure {
                        entity: "course".to_string(),
                        pub_ukprn: pub_ukprn.clone(),
                        course_id: course.non_empty_text("KISCOURSEID").map(ToOwned::to_owned),
                        course_mode: course.non_empty_text("KISMODE").map(ToOwned::to_owned),
                        reason: format!("institution skipped: {err}"),
                    })?;
                }
                continue;
            }
        };

        build_institution(&assembler, &institution, &mut stores, &mut build)?;
    }

    let status = if build.failures.is_empty() {
        "completed"
    } else {
        "completed_with_failures"
    };

    if args.dry_run {
        info!(
            institutions = build.counts.institutions_built,
            courses = build.counts.courses_built,
            courses_failed = build.counts.courses_failed,
            status,
            "build dry-run complete"
        );
        return Ok(());
    }

    let mut sources = vec![
        source_entry(&args.xml_path)?,
        source_entry(&args.qualification_levels_path)?,
        source_entry(&args.enrichment_path)?,
    ];
    if let Some(path) = &args.reference_data_path {
        sources.push(source_entry(path)?);
    }

    let manifest = BuildRunManifest {
        manifest_version: 1,
        run_id,
        status: status.to_string(),
        dry_run: args.dry_run,
        document_version: args.version_tag,
        started_at,
        updated_at: now_utc_string(),
        paths: BuildPaths {
            out_dir: args.out_dir.display().to_string(),
            manifest_dir: manifest_dir.display().to_string(),
            db_path: args.db_path.as_ref().map(|path| path.display().to_string()),
        },
        sources,
        counts: build.counts,
        failures: build.failures,
    };

    let manifest_path = manifest_dir.join(format!(
        "{BUILD_MANIFEST_PREFIX}{}.json",
        utc_compact_string(started_ts)
    ));
    write_json_pretty(&manifest_path, &manifest)?;

    info!(path = %manifest_path.display(), "wrote build run manifest");
    info!(
        institutions = manifest.counts.institutions_built,
        courses = manifest.counts.courses_built,
        courses_failed = manifest.counts.courses_failed,
        status = %manifest.status,
        "build completed"
    );

    Ok(())
}

struct BuildState {
    fail_fast: bool,
    counts: BuildCounts,
    failures: Vec<EntityFailure>,
}

impl BuildState {
    fn record(&mut self, failure: EntityFailure) -> Result<()> {
        error!(
            entity = %failure.entity,
            pub_ukprn = %failure.pub_ukprn.as_deref().unwrap_or_default(),
            course_id = %failure.course_id.as_deref().unwrap_or_default(),
            reason = %failure.reason,
            "entity skipped"
        );
        if self.fail_fast {
            bail!("{} failed: {}", failure.entity, failure.reason);
        }
        self.failures.push(failure);
        Ok(())
    }
}

fn build_institution<'d>(
    assembler: &DocumentAssembler<'d>,
    institution: &InstitutionContext<'d>,
    stores: &mut [Box<dyn DocumentStore>],
    build: &mut BuildState,
) -> Result<()> {
    match assembler.assemble_institution(institution) {
        Ok(document) => {
            for store in stores.iter_mut() {
                store.save_institution(&document)?;
            }
            build.counts.institutions_built += 1;
        }
        Err(err) => {
            build.counts.institutions_failed += 1;
            build.record(EntityFailure {
                entity: "institution".to_string(),
                pub_ukprn: Some(institution.pub_ukprn.to_string()),
                course_id: None,
                course_mode: None,
                reason: err.to_string(),
            })?;
        }
    }

    let courses = institution.courses();
    for &course in &courses {
        build.counts.courses_total += 1;
        match assembler.assemble_course(institution, course) {
            Ok(document) => {
                for store in stores.iter_mut() {
                    store.save_course(&document)?;
                }
                build.counts.courses_built += 1;
            }
            Err(err) => {
                build.counts.courses_failed += 1;
                build.record(course_failure(institution, course, err.to_string()))?;
            }
        }
    }

    debug!(
        pub_ukprn = institution.pub_ukprn,
        courses = courses.len(),
        "institution processed"
    );
    Ok(())
}

fn course_failure(institution: &InstitutionContext<'_>, course: &RawBlock, reason: String) -> EntityFailure {
    EntityFailure {
        entity: "course".to_string(),
        pub_ukprn: Some(institution.pub_ukprn.to_string()),
        course_id: course.non_empty_text("KISCOURSEID").map(ToOwned::to_owned),
        course_mode: course.non_empty_text("KISMODE").map(ToOwned::to_owned),
        reason,
    }
}

pub fn load_submission(path: &Path) -> Result<RawBlock> {
    let xml = read_text(path)?;
    parse_document(&xml).with_context(|| format!("failed to parse {}", path.display()))
}

fn load_qualification_levels(path: &Path) -> Result<LookupIndex<String>> {
    let text = read_text(path)?;
    let levels = parse_qualification_levels(&text)
        .with_context(|| format!("failed to load qualification levels from {}", path.display()))?;
    info!(path = %path.display(), entries = levels.len(), "loaded qualification levels");
    Ok(levels)
}

fn load_providers(path: &Path) -> Result<ProviderIndex> {
    let records: BTreeMap<String, ProviderRecord> = read_json(path)?;
    let providers = ProviderIndex::new(records)
        .with_context(|| format!("failed to load registry enrichment from {}", path.display()))?;
    info!(path = %path.display(), providers = providers.len(), "loaded registry enrichment");
    Ok(providers)
}

fn source_entry(path: &Path) -> Result<SourceEntry> {
    Ok(SourceEntry {
        path: path.display().to_string(),
        sha256: sha256_file(path)?,
    })
}
