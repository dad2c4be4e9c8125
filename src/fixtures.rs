use std::collections::BTreeMap;

use crate::lookup::{LookupIndex, parse_qualification_levels};
use crate::registry::{ProviderIndex, ProviderRecord};

pub const SUBMISSION_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<KIS>
  <ACCREDITATIONTABLE>
    <ACCTYPE>15</ACCTYPE>
    <ACCTEXT>Accredited by the Nursing and Midwifery Council</ACCTEXT>
    <ACCTEXTW>Achredwyd gan y Cyngor Nyrsio a Bydwreigiaeth</ACCTEXTW>
  </ACCREDITATIONTABLE>
  <KISAIM><KISAIMCODE>021</KISAIMCODE><KISAIMLABEL>BSc (Hons)</KISAIMLABEL></KISAIM>
  <KISAIM><KISAIMCODE>051</KISAIMCODE><KISAIMLABEL>MSc</KISAIMLABEL></KISAIM>
  <INSTITUTION>
    <PUBUKPRN>10007857</PUBUKPRN>
    <UKPRN>10007857</UKPRN>
    <COUNTRY>XI</COUNTRY>
    <LOCATION>
      <LOCID>BANGOR</LOCID>
      <LOCNAME>Bangor</LOCNAME>
      <LOCNAMEW>Bangor</LOCNAMEW>
      <LATITUDE>53.2288</LATITUDE>
      <LONGITUDE>-4.1295</LONGITUDE>
      <ACCOMURL>https://www.bangor.ac.uk/accommodation</ACCOMURL>
    </LOCATION>
    <KISCOURSE>
      <KISCOURSEID>B720</KISCOURSEID>
      <KISMODE>1</KISMODE>
      <KISLEVEL>3</KISLEVEL>
      <KISAIMCODE>021</KISAIMCODE>
      <TITLE>Nursing (Adult)</TITLE>
      <TITLEW>Nyrsio (Oedolion)</TITLEW>
      <NUMSTAGES>3</NUMSTAGES>
      <DISTANCE>0</DISTANCE>
      <FOUNDATION>0</FOUNDATION>
      <HONOURS>1</HONOURS>
      <NHS>1</NHS>
      <SANDWICH>0</SANDWICH>
      <YEARABROAD>1</YEARABROAD>
      <CRSEURL>https://www.bangor.ac.uk/courses/b720</CRSEURL>
      <SBJ>100280</SBJ>
      <ACCREDITATION>
        <ACCTYPE>15</ACCTYPE>
        <ACCDEPEND>0</ACCDEPEND>
        <ACCDEPENDURL>https://www.nmc.org.uk</ACCDEPENDURL>
      </ACCREDITATION>
      <COURSELOCATION>
        <LOCID>BANGOR</LOCID>
        <UCASCOURSEID>B720</UCASCOURSEID>
      </COURSELOCATION>
      <CONTINUATION>
        <CONTUNAVAILREASON>0</CONTUNAVAILREASON>
        <CONTPOP>120</CONTPOP>
        <CONTAGG>14</CONTAGG>
        <UCONT>92</UCONT>
        <UDORMANT>2</UDORMANT>
        <UGAINED>0</UGAINED>
        <ULEFT>6</ULEFT>
        <ULOWER>0</ULOWER>
      </CONTINUATION>
      <TARIFF>
        <TARUNAVAILREASON>0</TARUNAVAILREASON>
        <TARPOP>80</TARPOP>
        <T001>5</T001>
        <T096>40</T096>
        <T240>2</T240>
      </TARIFF>
      <GOSALARY>
        <GOSALUNAVAILREASON>0</GOSALUNAVAILREASON>
        <GOSALSBJ>100280</GOSALSBJ>
        <GOINSTMED>25000</GOINSTMED>
      </GOSALARY>
      <LEO3>
        <LEO3UNAVAILREASON>0</LEO3UNAVAILREASON>
        <LEO3SBJ>100280</LEO3SBJ>
        <LEO3INSTMED>26000</LEO3INSTMED>
      </LEO3>
      <SALARY>
        <SALUNAVAILREASON>0</SALUNAVAILREASON>
        <SALSBJ>100280</SALSBJ>
        <INSTMED>24000</INSTMED>
      </SALARY>
    </KISCOURSE>
    <KISCOURSE>
      <KISCOURSEID>JOINT1</KISCOURSEID>
      <KISMODE>2</KISMODE>
      <KISLEVEL>3</KISLEVEL>
      <KISAIMCODE>051</KISAIMCODE>
      <TITLE>Law with Criminology</TITLE>
      <SBJ>100485</SBJ>
      <SBJ>100484</SBJ>
      <SALARY>
        <SALUNAVAILREASON>0</SALUNAVAILREASON>
        <SALSBJ>100485</SALSBJ>
        <INSTMED>23000</INSTMED>
      </SALARY>
      <SALARY>
        <SALUNAVAILREASON>0</SALUNAVAILREASON>
        <SALSBJ>100484</SALSBJ>
        <INSTMED>21000</INSTMED>
      </SALARY>
    </KISCOURSE>
  </INSTITUTION>
  <INSTITUTION>
    <PUBUKPRN>10003678</PUBUKPRN>
    <UKPRN>10003678</UKPRN>
    <COUNTRY>XF</COUNTRY>
    <KISCOURSE>
      <KISCOURSEID>DANCE</KISCOURSEID>
      <KISMODE>1</KISMODE>
      <TITLE>Dance</TITLE>
      <COURSELOCATION><UCASCOURSEID>W500</UCASCOURSEID></COURSELOCATION>
    </KISCOURSE>
  </INSTITUTION>
  <GOSECSAL>
    <GOSECSBJ>100280</GOSECSBJ><KISMODE>1</KISMODE><KISLEVEL>3</KISLEVEL>
    <GOSECUNAVAILREASON>0</GOSECUNAVAILREASON><GOSECMED>24500</GOSECMED>
  </GOSECSAL>
  <GOSECSAL>
    <GOSECSBJ>100280</GOSECSBJ><KISMODE>1</KISMODE><KISLEVEL>3</KISLEVEL>
    <GOSECUNAVAILREASON>0</GOSECUNAVAILREASON><GOSECMED>1</GOSECMED>
  </GOSECSAL>
  <LEO3SEC>
    <LEO3SECSBJ>100280</LEO3SECSBJ><KISMODE>2</KISMODE><KISLEVEL>3</KISLEVEL>
    <LEO3SECMED>22000</LEO3SECMED>
  </LEO3SEC>
  <SECTORSAL>
    <SECSALSBJ>100484</SECSALSBJ><KISMODE>2</KISMODE><KISLEVEL>3</KISLEVEL>
    <SECSALMED>22000</SECSALMED>
  </SECTORSAL>
  <SECTORSAL>
    <SECSALSBJ>100280</SECSALSBJ><KISMODE>1</KISMODE><KISLEVEL>3</KISLEVEL>
    <SECSALMED>23500</SECSALMED>
  </SECTORSAL>
  <SECTORSAL>
    <SECSALSBJ>100485</SECSALSBJ><KISMODE>2</KISMODE><KISLEVEL>3</KISLEVEL>
    <SECSALMED>25000</SECSALMED>
  </SECTORSAL>
</KIS>
"#;

pub const QUALIFICATION_LEVELS_CSV: &str = "code,label,level\n021,BSc (Hons),6\n051,MSc,7\n";

pub const REGISTRY_JSON: &str = r#"{
  "10007857": {
    "ukprn_name": "BANGOR UNIVERSITY",
    "legal_name": "BANGOR UNIVERSITY",
    "contacts": [
      {
        "contact_type": "P",
        "address": {"address_2": "College Road", "address_3": "Bangor", "post_code": "LL57 2DG"},
        "telephone": "01248 351151"
      },
      {"contact_type": "L", "website": "https://www.bangor.ac.uk"}
    ]
  },
  "10003678": {"ukprn_name": "LIPA"}
}"#;

pub fn providers() -> ProviderIndex {
    let records: BTreeMap<String, ProviderRecord> =
        serde_json::from_str(REGISTRY_JSON).expect("registry fixture parses");
    ProviderIndex::new(records).expect("registry fixture indexes")
}

pub fn qualification_levels() -> LookupIndex<String> {
    parse_qualification_levels(QUALIFICATION_LEVELS_CSV).expect("qualification fixture parses")
}
