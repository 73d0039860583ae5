//! Judge prompt template.

use serde_json::Value;

use super::JudgeRequest;
use crate::domain::EvaluationDatasetEntry;

/// System-role instruction sent with every request.
pub const JUDGE_SYSTEM_PROMPT: &str =
    "You are a professional evaluator for digital forensics and LLM outputs. Return JSON only.";

const INSTRUCTIONS: &str = r#"You are a forensic AI evaluator assessing a model-generated summary of an APK data leakage analysis.

You are given:
- Ground Truth Summary: the result of manual expert analysis.
- Model Output: the summary produced by a language model.

Focus on structured forensic accuracy. Extra detail is not an error as long as it is factually aligned with the ground truth.

### Evaluation Dimensions (score each 1-5):
1. **Data Type Identification** - Are the sensitive data types (e.g. deviceId) identified correctly?
2. **Data Propagation Accuracy** - Is the data movement (source -> transformation -> sink) described correctly?
   - The ground truth may be brief (e.g. "source -> data -> sink").
   - Correct intermediate steps or method calls that expand on the ground truth are not penalized.
   - Penalize only flows that contradict the ground truth or add steps it does not imply.
3. **Sink Function Match** - Are the final sink method(s) identified correctly?
   - Bytecode notation (e.g. `android/util/Log;->d:...`) and Java notation (`Log.d(...)`) name the same function.
   - Naming convention differences are not penalized when the function is clearly the same.
4. **Leakage Inference** - Is the leaked / not-leaked verdict correct?
5. **Coherence & Fluency** - Is the output clear, logical and grammatical?

Treat bytecode and Java method references as equivalent when they refer to the same API call."#;

const OUTPUT_SCHEMA: &str = r#"Respond with valid JSON only, no explanation, using exactly this schema:
{
  "data_type_identification": <integer 1-5>,
  "data_propagation_accuracy": <integer 1-5>,
  "sink_function_match": <integer 1-5>,
  "leakage_inference": <integer 1-5>,
  "coherence_and_fluency": <integer 1-5>
}"#;

/// Render the judge request for one dataset entry.
///
/// Both summaries are embedded verbatim as compact JSON, object keys in the
/// order they were read.
pub fn build_request(entry: &EvaluationDatasetEntry) -> JudgeRequest {
    let prompt = format!(
        "{INSTRUCTIONS}\n\n---\nGround Truth Summary (JSON):\n{}\n\n---\nModel Output (JSON):\n{}\n\n---\n{OUTPUT_SCHEMA}\n",
        render(&entry.ground_truth_summary),
        render(&entry.model_summary),
    );
    JudgeRequest {
        system: JUDGE_SYSTEM_PROMPT.to_string(),
        prompt,
    }
}

fn render(value: &Value) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| value.to_string())
}
