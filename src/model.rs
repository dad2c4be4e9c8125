use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub path: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInspectManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source: SourceEntry,
    pub institution_count: usize,
    pub course_count: usize,
    pub accreditation_count: usize,
    pub kis_aim_count: usize,
    pub sector_counts: SectorCounts,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SectorCounts {
    pub go_salary: usize,
    pub leo3: usize,
    pub leo5: usize,
    pub salary: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildPaths {
    pub out_dir: String,
    pub manifest_dir: String,
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BuildCounts {
    pub institutions_total: usize,
    pub institutions_built: usize,
    pub institutions_failed: usize,
    pub courses_total: usize,
    pub courses_built: usize,
    pub courses_failed: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityFailure {
    pub entity: String,
    pub pub_ukprn: Option<String>,
    pub course_id: Option<String>,
    pub course_mode: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub dry_run: bool,
    pub document_version: u32,
    pub started_at: String,
    pub updated_at: String,
    pub paths: BuildPaths,
    pub sources: Vec<SourceEntry>,
    pub counts: BuildCounts,
    pub failures: Vec<EntityFailure>,
}
