//! Answer grading through the Ollama client.
//!
//! Builds the grading prompts, invokes the model once per QA pair, and
//! turns the raw reply into a tagged outcome. A failed call never aborts
//! the batch; it becomes a `Failed` outcome that callers pattern-match.

use crate::extract::{GradingResult, extract_grading, parse_strict};
use crate::llm::{GenerateRequest, OllamaClient};
use thiserror::Error;

/// Why a grading attempt produced no valid grade.
#[derive(Debug, Clone, Error)]
pub enum GradeFailure {
    /// The call to the grader itself failed (network, timeout, model error).
    #[error("Error interacting with Ollama: {0}")]
    CallFailed(String),

    /// The strict parse variant rejected the reply.
    #[error("Error parsing grader reply: {0}")]
    ParseFailed(String),

    /// The call was skipped because a required input was empty.
    #[error("Skipped grader call: {0}")]
    InputMissing(String),
}

/// Outcome of grading one QA pair: a valid grade or a tagged failure.
///
/// A valid grade always carries a score in 0-100 territory; -1 is reserved
/// for rendering failures in outputs that cannot express null.
#[derive(Debug, Clone)]
pub enum GradeOutcome {
    Graded(GradingResult),
    Failed(GradeFailure),
}

impl GradeOutcome {
    /// The score, if this outcome is a valid grade.
    pub fn score(&self) -> Option<i64> {
        match self {
            GradeOutcome::Graded(result) => Some(result.score),
            GradeOutcome::Failed(_) => None,
        }
    }

    /// The explanation for a grade, or the failure description.
    pub fn explanation(&self) -> String {
        match self {
            GradeOutcome::Graded(result) => result.explanation.clone(),
            GradeOutcome::Failed(failure) => failure.to_string(),
        }
    }
}

/// System instruction for the directory-mode grading prompt.
const GRADER_SYSTEM: &str = "You are a fair teacher who grades students' answers. \
    Evaluate the quality of the *Answer* specifically in response to the *Question*, \
    considering the *Context* provided. \
    Format your entire response as a single JSON object containing 'score' \
    (an integer between 0 and 100, where 100 is best) and 'explanation' \
    (a string briefly justifying the score).";

/// Grades answers against reference context using an Ollama-hosted model.
pub struct AnswerGrader {
    client: OllamaClient,
    model: String,
}

impl AnswerGrader {
    /// Create a new grader for the given model.
    pub fn new(client: OllamaClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
        }
    }

    /// The model this grader sends work to.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Grade an answer with the fixed system instruction plus a user turn.
    ///
    /// Replies are run through the lenient extraction chain, so a malformed
    /// reply still yields a grade; only a failed call yields `Failed`.
    pub async fn grade(&self, question: &str, answer: &str, context: &str) -> GradeOutcome {
        let prompt = format!(
            "Question: {}\nAnswer: {}\n\nAnd given the following context:\n{}\n",
            question, answer, context
        );

        let request = GenerateRequest::new(&self.model, prompt)
            .with_system(GRADER_SYSTEM)
            .with_num_ctx(self.client.num_ctx());

        match self.client.generate(&request).await {
            Ok(reply) => GradeOutcome::Graded(extract_grading(&reply)),
            Err(e) => GradeOutcome::Failed(GradeFailure::CallFailed(e.to_string())),
        }
    }

    /// Grade an answer with everything folded into a single prompt.
    ///
    /// Used by the tabular pipeline: no system turn, a list-bracket artifact
    /// is stripped from the answer, and the reply is parsed strictly, so a
    /// malformed reply is a real `ParseFailed` here.
    pub async fn grade_inline(&self, question: &str, answer: &str, context: &str) -> GradeOutcome {
        let answer = strip_list_artifact(answer);

        let prompt = format!(
            "Given the following context:\n{}\nQuestion: {}\nAnswer: {}\n\n\
             Please evaluate the quality of the *Answer* specifically in response to the *Question*, \
             considering the *Context* provided. \
             Provide your response as a JSON object with two keys and ',' delimiter: 'score' \
             (an integer between 0 and 100, where 100 is best) and 'explanation' \
             (a string briefly justifying the score, noting if the answer is irrelevant \
             to the question or context). No extra notes outside JSON in the output.",
            context, question, answer
        );

        let request = GenerateRequest::new(&self.model, prompt);

        let reply = match self.client.generate(&request).await {
            Ok(reply) => reply,
            Err(e) => return GradeOutcome::Failed(GradeFailure::CallFailed(e.to_string())),
        };

        match parse_strict(&reply) {
            Ok(result) => GradeOutcome::Graded(result),
            Err(e) => GradeOutcome::Failed(GradeFailure::ParseFailed(match e {
                crate::error::GraderError::ResponseParse(msg) => msg,
                other => other.to_string(),
            })),
        }
    }
}

/// Strip a two-character list-bracket wrapping from an answer, when present.
///
/// Answers exported from list-valued columns arrive as `["..."]`; the two
/// outermost characters on each side are artifacts, not answer text.
fn strip_list_artifact(answer: &str) -> &str {
    if !answer.starts_with('[') {
        return answer;
    }
    if answer.len() >= 4 && answer.is_char_boundary(2) && answer.is_char_boundary(answer.len() - 2)
    {
        &answer[2..answer.len() - 2]
    } else {
        ""
    }
}
