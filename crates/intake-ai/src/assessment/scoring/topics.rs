use serde::{Deserialize, Serialize};

/// Fixed checklist of clinical topic areas the interview needs to touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClinicalTopic {
    SymptomDetail,
    MedicalHistory,
    RiskFactors,
    HearingConcerns,
    DailyLifeImpact,
    MedicationsAndFamily,
}

impl ClinicalTopic {
    pub const ALL: [ClinicalTopic; 6] = [
        ClinicalTopic::SymptomDetail,
        ClinicalTopic::MedicalHistory,
        ClinicalTopic::RiskFactors,
        ClinicalTopic::HearingConcerns,
        ClinicalTopic::DailyLifeImpact,
        ClinicalTopic::MedicationsAndFamily,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            ClinicalTopic::SymptomDetail => "symptom_detail",
            ClinicalTopic::MedicalHistory => "medical_history",
            ClinicalTopic::RiskFactors => "risk_factors",
            ClinicalTopic::HearingConcerns => "hearing_concerns",
            ClinicalTopic::DailyLifeImpact => "daily_life_impact",
            ClinicalTopic::MedicationsAndFamily => "medications_and_family",
        }
    }

    /// Maximum points the topic can contribute regardless of repetition.
    pub const fn cap(self) -> u8 {
        match self {
            ClinicalTopic::SymptomDetail => 25,
            ClinicalTopic::MedicalHistory => 20,
            ClinicalTopic::RiskFactors => 10,
            ClinicalTopic::HearingConcerns => 15,
            ClinicalTopic::DailyLifeImpact => 10,
            ClinicalTopic::MedicationsAndFamily => 10,
        }
    }

    /// Points awarded when the topic is mentioned without depth markers.
    pub(crate) const fn mention_points(self) -> u8 {
        match self {
            ClinicalTopic::SymptomDetail => 15,
            ClinicalTopic::MedicalHistory => 12,
            ClinicalTopic::RiskFactors => 6,
            ClinicalTopic::HearingConcerns => 9,
            ClinicalTopic::DailyLifeImpact => 6,
            ClinicalTopic::MedicationsAndFamily => 6,
        }
    }

    /// Topic-indicative stems matched against lowercased patient text.
    pub(crate) fn vocabulary(self) -> &'static [&'static str] {
        match self {
            ClinicalTopic::SymptomDetail => &[
                "pain", "headache", "dizz", "numb", "tingling", "weakness", "ache", "pressure",
                "nausea", "symptom",
            ],
            ClinicalTopic::MedicalHistory => &[
                "diagnos", "condition", "disease", "surgery", "treatment", "hospital", "doctor",
                "infection",
            ],
            ClinicalTopic::RiskFactors => {
                &["smok", "alcohol", "stress", "noise", "exposure", "loud", "headphone"]
            }
            ClinicalTopic::HearingConcerns => &[
                "hearing", "ear", "sound", "volume", "ringing", "tinnitus", "muffled", "deaf",
            ],
            ClinicalTopic::DailyLifeImpact => &[
                "daily", "sleep", "concentrat", "conversation", "work", "social", "interfere",
                "affect", "struggle",
            ],
            ClinicalTopic::MedicationsAndFamily => &[
                "medication", "medicine", "pill", "prescri", "family", "mother", "father",
                "hereditary", "runs in",
            ],
        }
    }
}

/// Qualitative markers that promote a mention to full credit. A patient who
/// volunteers a detailed account outranks a terse acknowledgement of the same
/// topic.
const DEPTH_MARKERS: &[&str] = &[
    "detail",
    "thorough",
    "extensive",
    "comprehensive",
    "specifically",
    "exactly",
];

/// How deeply a topic has been covered so far.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageDepth {
    Absent,
    Mentioned,
    Detailed,
}

/// Per-topic contribution to the coverage component, kept for audit trails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicCoverage {
    pub topic: ClinicalTopic,
    pub depth: CoverageDepth,
    pub points: u8,
}

/// Assess one topic against the patient-authored transcript. Matching is
/// presence-based over a growing transcript, so awarded depth (and points)
/// never decrease as turns are appended.
pub(crate) fn assess_topic(topic: ClinicalTopic, patient_texts: &[String]) -> TopicCoverage {
    let mut depth = CoverageDepth::Absent;
    for text in patient_texts {
        if !topic.vocabulary().iter().any(|stem| text.contains(stem)) {
            continue;
        }
        if DEPTH_MARKERS.iter().any(|marker| text.contains(marker)) {
            depth = CoverageDepth::Detailed;
            break;
        }
        depth = depth.max(CoverageDepth::Mentioned);
    }

    let points = match depth {
        CoverageDepth::Absent => 0,
        CoverageDepth::Mentioned => topic.mention_points(),
        CoverageDepth::Detailed => topic.cap(),
    };

    TopicCoverage {
        topic,
        depth,
        points,
    }
}
