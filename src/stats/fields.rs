use crate::error::{ExtractError, Result};
use crate::stats::StatFamily;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    Mandatory,
    Optional,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Count,
    Text,
    /// Subject code; drives disaggregation.
    Subject,
    /// Unavailable-reason code, expanded with configured text.
    Unavailable,
    TariffBand,
    /// Nested job entries, folded into an ordered `job_list`.
    JobList,
    Mode,
    Level,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub raw_key: &'static str,
    pub semantic_key: &'static str,
    pub cardinality: Cardinality,
    pub kind: ValueKind,
}

#[derive(Debug)]
pub struct FieldTable {
    pub family: StatFamily,
    pub specs: &'static [FieldSpec],
}

impl FieldTable {
    pub fn resolve(&self, raw_key: &str) -> Result<&FieldSpec> {
        self.specs
            .iter()
            .find(|spec| spec.raw_key == raw_key)
            .ok_or_else(|| ExtractError::UnknownField {
                family: self.family,
                raw_key: raw_key.to_string(),
            })
    }

    pub fn mandatory(&self) -> impl Iterator<Item = &FieldSpec> {
        self.specs
            .iter()
            .filter(|spec| spec.cardinality == Cardinality::Mandatory)
    }

    pub fn spec_of_kind(&self, kind: ValueKind) -> Option<&FieldSpec> {
        self.specs.iter().find(|spec| spec.kind == kind)
    }
}

const fn required(raw_key: &'static str, semantic_key: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec {
        raw_key,
        semantic_key,
        cardinality: Cardinality::Mandatory,
        kind,
    }
}

const fn optional(raw_key: &'static str, semantic_key: &'static str, kind: ValueKind) -> FieldSpec {
    FieldSpec {
        raw_key,
        semantic_key,
        cardinality: Cardinality::Optional,
        kind,
    }
}

const fn count(raw_key: &'static str, semantic_key: &'static str) -> FieldSpec {
    optional(raw_key, semantic_key, ValueKind::Count)
}

const fn band(raw_key: &'static str) -> FieldSpec {
    optional(raw_key, "entrants", ValueKind::TariffBand)
}

use ValueKind::{JobList, Level, Mode, Subject, Text, Unavailable};

static CONTINUATION: FieldTable = FieldTable {
    family: StatFamily::Continuation,
    specs: &[
        required("CONTUNAVAILREASON", "unavailable", Unavailable),
        count("CONTPOP", "number_of_students"),
        count("CONTAGG", "aggregation_code"),
        optional("CONTSBJ", "subject", Subject),
        count("UCONT", "continuing_with_provider"),
        count("UDORMANT", "dormant"),
        count("UGAINED", "gained"),
        count("ULEFT", "left"),
        count("ULOWER", "lower"),
    ],
};

static ENTRY: FieldTable = FieldTable {
    family: StatFamily::Entry,
    specs: &[
        required("ENTUNAVAILREASON", "unavailable", Unavailable),
        count("ENTPOP", "number_of_students"),
        count("ENTAGG", "aggregation_code"),
        optional("ENTSBJ", "subject", Subject),
        count("ACCESS", "access"),
        count("ALEVEL", "a_level"),
        count("BACC", "baccalaureate"),
        count("DEGREE", "degree"),
        count("FOUNDTN", "foundation"),
        count("NOQUALS", "none"),
        count("OTHER", "other_qualifications"),
        count("OTHERHE", "another_higher_education_qualifications"),
    ],
};

static EMPLOYMENT: FieldTable = FieldTable {
    family: StatFamily::Employment,
    specs: &[
        required("EMPUNAVAILREASON", "unavailable", Unavailable),
        count("EMPPOP", "number_of_students"),
        count("EMPRESP_RATE", "response_rate"),
        count("EMPAGG", "aggregation_code"),
        optional("EMPSBJ", "subject", Subject),
        count("WORKSTUDY", "in_work_and_study"),
        count("STUDY", "in_study"),
        count("UNEMP", "unemployed"),
        count("PREVWORKSTUD", "in_work_or_study"),
        count("BOTH", "in_work_and_study_combined"),
        count("NOAVAIL", "not_available_for_work_or_study"),
        count("WORK", "in_work"),
    ],
};

static JOB_TYPE: FieldTable = FieldTable {
    family: StatFamily::JobType,
    specs: &[
        required("JOBUNAVAILREASON", "unavailable", Unavailable),
        count("JOBPOP", "number_of_students"),
        count("JOBRESP_RATE", "response_rate"),
        count("JOBAGG", "aggregation_code"),
        optional("JOBSBJ", "subject", Subject),
        count("PROFMAN", "professional_or_managerial_jobs"),
        count("OTHERJOB", "non_professional_or_managerial_jobs"),
        count("UNKWN", "unknown_professions"),
    ],
};

static JOB_LIST: FieldTable = FieldTable {
    family: StatFamily::JobList,
    specs: &[
        required("COMUNAVAILREASON", "unavailable", Unavailable),
        count("COMPOP", "number_of_students"),
        count("COMRESP_RATE", "response_rate"),
        count("COMAGG", "aggregation_code"),
        optional("COMSBJ", "subject", Subject),
        optional("JOBLIST", "job_list", JobList),
    ],
};

/// Entries nested under `COMMON/JOBLIST`.
pub(crate) static JOB_ENTRY: FieldTable = FieldTable {
    family: StatFamily::JobList,
    specs: &[
        required("JOB", "job", Text),
        count("PERC", "percentage_of_students"),
        required("ORDER", "order", ValueKind::Count),
    ],
};

static SALARY: FieldTable = FieldTable {
    family: StatFamily::Salary,
    specs: &[
        required("SALUNAVAILREASON", "unavailable", Unavailable),
        count("SALPOP", "number_of_graduates"),
        count("SALRESP_RATE", "response_rate"),
        count("SALAGG", "aggregation_code"),
        optional("SALSBJ", "subject", Subject),
        count("INSTLQ", "lower_quartile"),
        count("INSTMED", "median"),
        count("INSTUQ", "upper_quartile"),
        count("LDLQ", "lower_quartile_later"),
        count("LDMED", "median_later"),
        count("LDUQ", "upper_quartile_later"),
    ],
};

static NSS: FieldTable = FieldTable {
    family: StatFamily::Nss,
    specs: &[
        required("NSSUNAVAILREASON", "unavailable", Unavailable),
        count("NSSPOP", "number_of_students"),
        count("NSSRESP_RATE", "response_rate"),
        count("NSSAGG", "aggregation_code"),
        optional("NSSSBJ", "subject", Subject),
        count("Q1", "question_1"),
        count("Q2", "question_2"),
        count("Q3", "question_3"),
        count("Q4", "question_4"),
        count("Q5", "question_5"),
        count("Q6", "question_6"),
        count("Q7", "question_7"),
        count("Q8", "question_8"),
        count("Q9", "question_9"),
        count("Q10", "question_10"),
        count("Q11", "question_11"),
        count("Q12", "question_12"),
        count("Q13", "question_13"),
        count("Q14", "question_14"),
        count("Q15", "question_15"),
        count("Q16", "question_16"),
        count("Q17", "question_17"),
        count("Q18", "question_18"),
        count("Q19", "question_19"),
        count("Q20", "question_20"),
        count("Q21", "question_21"),
        count("Q22", "question_22"),
        count("Q23", "question_23"),
        count("Q24", "question_24"),
        count("Q25", "question_25"),
        count("Q26", "question_26"),
        count("Q27", "question_27"),
    ],
};

static NHS_NSS: FieldTable = FieldTable {
    family: StatFamily::NhsNss,
    specs: &[
        required("NHSUNAVAILREASON", "unavailable", Unavailable),
        count("NHSPOP", "number_of_students"),
        count("NHSRESP_RATE", "response_rate"),
        count("NHSAGG", "aggregation_code"),
        optional("NHSSBJ", "subject", Subject),
        count("NHSQ1", "question_1"),
        count("NHSQ2", "question_2"),
        count("NHSQ3", "question_3"),
        count("NHSQ4", "question_4"),
        count("NHSQ5", "question_5"),
        count("NHSQ6", "question_6"),
    ],
};

static TARIFF: FieldTable = FieldTable {
    family: StatFamily::Tariff,
    specs: &[
        required("TARUNAVAILREASON", "unavailable", Unavailable),
        count("TARPOP", "number_of_students"),
        count("TARAGG", "aggregation_code"),
        optional("TARSBJ", "subject", Subject),
        band("T001"),
        band("T048"),
        band("T064"),
        band("T080"),
        band("T096"),
        band("T112"),
        band("T128"),
        band("T144"),
        band("T160"),
        band("T176"),
        band("T192"),
        band("T208"),
        band("T224"),
        band("T240"),
    ],
};

static LEO3: FieldTable = FieldTable {
    family: StatFamily::Leo3,
    specs: &[
        required("LEO3UNAVAILREASON", "unavailable", Unavailable),
        count("LEO3POP", "number_of_graduates"),
        count("LEO3AGG", "aggregation_code"),
        optional("LEO3SBJ", "subject", Subject),
        count("LEO3INSTLQ", "lower_quartile"),
        count("LEO3INSTMED", "median"),
        count("LEO3INSTUQ", "upper_quartile"),
        count("LEO3PROV_PC_UK", "uk_provider_percentage"),
    ],
};

static LEO5: FieldTable = FieldTable {
    family: StatFamily::Leo5,
    specs: &[
        required("LEO5UNAVAILREASON", "unavailable", Unavailable),
        count("LEO5POP", "number_of_graduates"),
        count("LEO5AGG", "aggregation_code"),
        optional("LEO5SBJ", "subject", Subject),
        count("LEO5INSTLQ", "lower_quartile"),
        count("LEO5INSTMED", "median"),
        count("LEO5INSTUQ", "upper_quartile"),
        count("LEO5PROV_PC_UK", "uk_provider_percentage"),
    ],
};

static GO_SALARY: FieldTable = FieldTable {
    family: StatFamily::GoSalary,
    specs: &[
        required("GOSALUNAVAILREASON", "unavailable", Unavailable),
        count("GOSALPOP", "number_of_graduates"),
        count("GOSALRESP_RATE", "response_rate"),
        count("GOSALAGG", "aggregation_code"),
        optional("GOSALSBJ", "subject", Subject),
        count("GOINSTLQ", "lower_quartile"),
        count("GOINSTMED", "median"),
        count("GOINSTUQ", "upper_quartile"),
        count("GOPROV_PC_UK", "uk_provider_percentage"),
    ],
};

static GO_SALARY_SECTOR: FieldTable = FieldTable {
    family: StatFamily::GoSalarySector,
    specs: &[
        required("GOSECSBJ", "subject", Subject),
        required("KISMODE", "mode", Mode),
        required("KISLEVEL", "level", Level),
        optional("GOSECUNAVAILREASON", "unavailable", Unavailable),
        count("GOSECPOP", "number_of_graduates"),
        count("GOSECRESP_RATE", "response_rate"),
        count("GOSECLQ", "lower_quartile"),
        count("GOSECMED", "median"),
        count("GOSECUQ", "upper_quartile"),
    ],
};

static LEO3_SECTOR: FieldTable = FieldTable {
    family: StatFamily::Leo3Sector,
    specs: &[
        required("LEO3SECSBJ", "subject", Subject),
        required("KISMODE", "mode", Mode),
        required("KISLEVEL", "level", Level),
        optional("LEO3SECUNAVAILREASON", "unavailable", Unavailable),
        count("LEO3SECPOP", "number_of_graduates"),
        count("LEO3SECLQ", "lower_quartile"),
        count("LEO3SECMED", "median"),
        count("LEO3SECUQ", "upper_quartile"),
    ],
};

static LEO5_SECTOR: FieldTable = FieldTable {
    family: StatFamily::Leo5Sector,
    specs: &[
        required("LEO5SECSBJ", "subject", Subject),
        required("KISMODE", "mode", Mode),
        required("KISLEVEL", "level", Level),
        optional("LEO5SECUNAVAILREASON", "unavailable", Unavailable),
        count("LEO5SECPOP", "number_of_graduates"),
        count("LEO5SECLQ", "lower_quartile"),
        count("LEO5SECMED", "median"),
        count("LEO5SECUQ", "upper_quartile"),
    ],
};

static SALARY_SECTOR: FieldTable = FieldTable {
    family: StatFamily::SalarySector,
    specs: &[
        required("SECSALSBJ", "subject", Subject),
        required("KISMODE", "mode", Mode),
        required("KISLEVEL", "level", Level),
        optional("SECSALUNAVAILREASON", "unavailable", Unavailable),
        count("SECSALPOP", "number_of_graduates"),
        count("SECSALRESP_RATE", "response_rate"),
        count("SECSALLQ", "lower_quartile"),
        count("SECSALMED", "median"),
        count("SECSALUQ", "upper_quartile"),
        count("SECLDLQ", "lower_quartile_later"),
        count("SECLDMED", "median_later"),
        count("SECLDUQ", "upper_quartile_later"),
    ],
};

pub(crate) fn table_for(family: StatFamily) -> &'static FieldTable {
    match family {
        StatFamily::Continuation => &CONTINUATION,
        StatFamily::Entry => &ENTRY,
        StatFamily::Employment => &EMPLOYMENT,
        StatFamily::JobType => &JOB_TYPE,
        StatFamily::JobList => &JOB_LIST,
        StatFamily::Salary => &SALARY,
        StatFamily::Nss => &NSS,
        StatFamily::NhsNss => &NHS_NSS,
        StatFamily::Tariff => &TARIFF,
        StatFamily::Leo3 => &LEO3,
        StatFamily::Leo5 => &LEO5,
        StatFamily::GoSalary => &GO_SALARY,
        StatFamily::GoSalarySector => &GO_SALARY_SECTOR,
        StatFamily::Leo3Sector => &LEO3_SECTOR,
        StatFamily::Leo5Sector => &LEO5_SECTOR,
        StatFamily::SalarySector => &SALARY_SECTOR,
    }
}
