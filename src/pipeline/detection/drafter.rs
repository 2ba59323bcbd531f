//! Legal-notice drafting from a pollution decision.
//!
//! Pure string formatting: no model calls, same input and date give the
//! same document.

use chrono::NaiveDate;

use super::types::{Evidence, PollutionCategory, PollutionDecision, PollutionReport};

pub const NO_POLLUTION_NOTICE: &str = "No significant pollution detected warranting a legal notice.";
pub const DETECTION_FAILED_NOTICE: &str =
    "Detection could not be completed; no legal notice was generated.";

/// Statute paragraph per category.
fn legal_context(category: PollutionCategory) -> &'static str {
    match category {
        PollutionCategory::VehicularEmission => {
            "This is in direct violation of the Motor Vehicles Act and applicable Air Prevention \
and Control of Pollution norms regarding vehicular emissions."
        }
        PollutionCategory::IndustrialEmission => {
            "This constitutes a violation of the Air (Prevention and Control of Pollution) Act \
and relevant environmental clearance conditions."
        }
        PollutionCategory::SolidWaste => {
            "This is a violation of the Solid Waste Management Rules, 2016, and local municipal \
sanitation bylaws."
        }
        _ => {
            "This activity violates the Environment (Protection) Act and public nuisance laws \
under the Indian Penal Code."
        }
    }
}

/// Capitalize the first letter of every alphabetic run, lowercase the rest.
fn title_case(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    let mut prev_alpha = false;
    for c in label.chars() {
        if c.is_alphabetic() {
            if prev_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_alpha = true;
        } else {
            out.push(c);
            prev_alpha = false;
        }
    }
    out
}

/// Build the complaint document for `category` backed by `evidence`.
pub fn generate_legal_draft(
    category: PollutionCategory,
    evidence: &[Evidence],
    date: NaiveDate,
) -> String {
    let date_str = date.format("%B %d, %Y");
    let ref_no = format!("ENV/COMP/{}/001", date.format("%Y%m%d"));

    let confidence = evidence
        .iter()
        .map(|e| e.score)
        .fold(None, |acc: Option<f64>, s| Some(acc.map_or(s, |a| a.max(s))))
        .unwrap_or(0.0);

    let evidence_list = evidence
        .iter()
        .map(|e| {
            format!(
                "   - {} (Confidence: {:.1}%)",
                title_case(&e.label),
                e.score * 100.0
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let pollution_type = category.as_str();

    format!(
        "[Legal Notice - Automated Draft]
Ref No: {ref_no}
Date: {date_str}

To,
The Regional Officer / Municipal Commissioner,
Pollution Control Board / Municipal Corporation,
[City Name, State, Zip Code]

SUBJECT: FORMAL COMPLAINT REGARDING {subject}

1. INCIDENT DETAILS
   - Pollution Type: {pollution_type}
   - Detection Confidence Level: {confidence:.2}%
   - Date of Observation: {date_str}
   - Location: [Location/Address]

2. EVIDENCE SUMMARY
The following sources were detected by our automated AI monitoring system:
{evidence_list}

3. LEGAL VIOLATIONS
{context}

4. DEMAND FOR ACTION
I hereby request the competent authority to:
   a) Conduct an immediate site inspection.
   b) Take necessary measures to abate the pollution source.
   c) Initiate appropriate legal action against the violators.

Please treat this as an urgent matter affecting public health.

Sincerely,

[Your User Name]
Concerned Citizen
",
        subject = pollution_type.to_uppercase(),
        confidence = confidence * 100.0,
        context = legal_context(category),
    )
}

/// Draft for a decision; no notice when nothing was found or detection failed.
pub fn draft_for_decision(decision: &PollutionDecision, date: NaiveDate) -> String {
    match decision.category {
        PollutionCategory::NoPollutionDetected => NO_POLLUTION_NOTICE.to_string(),
        PollutionCategory::Error => DETECTION_FAILED_NOTICE.to_string(),
        category => generate_legal_draft(category, &decision.evidence, date),
    }
}

impl PollutionReport {
    pub fn from_decision(decision: PollutionDecision, date: NaiveDate) -> Self {
        let legal_draft = draft_for_decision(&decision, date);
        Self {
            pollution_type: decision.category,
            confidence_level: decision.confidence,
            legal_draft,
            details: decision.evidence,
        }
    }
}
