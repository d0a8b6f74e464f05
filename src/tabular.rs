//! Tabular grading pipeline over a CSV dataset.
//!
//! Each input row is graded twice against the same stitched noisy context:
//! once with the neighboring row's answer and once with its own, so every
//! input row yields two output records.

use crate::error::{GraderError, Result};
use crate::grader::{AnswerGrader, GradeFailure, GradeOutcome};
use crate::llm::OllamaClient;
use crate::neighbors::{neighbor_answer, stitched_context};
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;

/// Columns the input CSV must provide.
const REQUIRED_COLUMNS: [&str; 4] = ["query_id", "question", "answer", "passages"];

/// Explicit configuration for one tabular run.
#[derive(Debug, Clone)]
pub struct CsvJob {
    /// Input CSV path.
    pub input: PathBuf,
    /// Output CSV path.
    pub output: PathBuf,
    /// Grader model identifier.
    pub model: String,
}

/// One row of the input dataset. Extra columns are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TableRow {
    #[serde(default)]
    pub query_id: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub passages: String,
}

/// One graded output record.
#[derive(Debug, Serialize)]
struct OutputRow<'a> {
    query_id: &'a str,
    question: &'a str,
    answer: &'a str,
    context: &'a str,
    score: i64,
    explanation: &'a str,
}

/// Read and validate all rows up front.
///
/// Input must be UTF-8; a decode failure or a missing required column is a
/// fatal input error, not something to grade around.
fn read_rows<R: io::Read>(reader: &mut csv::Reader<R>) -> Result<Vec<TableRow>> {
    let headers = reader.headers()?.clone();

    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|col| !headers.iter().any(|h| h == **col))
        .map(|col| col.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(GraderError::MissingColumns(missing));
    }

    let mut rows = Vec::new();
    for result in reader.deserialize() {
        rows.push(result?);
    }
    Ok(rows)
}

/// Grade one (question, answer, context) triple, skipping the call when a
/// required input is empty.
async fn grade_or_skip(
    grader: &AnswerGrader,
    question: &str,
    answer: &str,
    context: &str,
) -> GradeOutcome {
    if question.is_empty() || answer.is_empty() {
        return GradeOutcome::Failed(GradeFailure::InputMissing(
            "empty question or answer".to_string(),
        ));
    }
    grader.grade_inline(question, answer, context).await
}

/// Render an outcome for the CSV columns.
///
/// CSV has no null, so -1 marks a failure; successful grading never
/// produces it.
fn csv_fields(outcome: &GradeOutcome) -> (i64, String) {
    match outcome {
        GradeOutcome::Graded(result) => (result.score, result.explanation.clone()),
        GradeOutcome::Failed(failure) => (-1, failure.to_string()),
    }
}

fn write_record<W: io::Write>(
    writer: &mut csv::Writer<W>,
    row: &TableRow,
    answer: &str,
    context: &str,
    outcome: &GradeOutcome,
) -> Result<()> {
    let (score, explanation) = csv_fields(outcome);
    writer.serialize(OutputRow {
        query_id: &row.query_id,
        question: &row.question,
        answer,
        context,
        score,
        explanation: &explanation,
    })?;
    Ok(())
}

/// Run the tabular pipeline to completion.
pub async fn run_csv(client: &OllamaClient, job: &CsvJob) -> Result<()> {
    let mut reader = csv::Reader::from_path(&job.input)?;
    let rows = read_rows(&mut reader)?;

    println!("Read {} rows from {}", rows.len(), job.input.display());
    if rows.is_empty() {
        println!("Input file is empty. No processing done.");
        return Ok(());
    }

    let grader = AnswerGrader::new(client.clone(), &job.model);
    let mut writer = csv::Writer::from_path(&job.output)?;

    let total = rows.len();
    for (i, row) in rows.iter().enumerate() {
        println!("Processing row {}/{}...", i + 1, total);

        let neighbor = neighbor_answer(i, &rows);
        let context = stitched_context(i, &rows);

        let outcome = grade_or_skip(&grader, &row.question, &neighbor, &context).await;
        write_record(&mut writer, row, &neighbor, &context, &outcome)?;

        let outcome = grade_or_skip(&grader, &row.question, &row.answer, &context).await;
        write_record(&mut writer, row, &row.answer, &context, &outcome)?;
    }

    writer
        .flush()
        .map_err(|e| GraderError::io(&job.output, e))?;

    println!("Successfully processed {} rows.", total);
    println!("Expanded data saved to {}", job.output.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::GradingResult;

    #[test]
    fn test_read_rows() {
        let data = "query_id,question,answer,passages,extra\n\
                    q1,What?,Because.,Some passage,ignored\n\
                    q2,Why?,Thus.,Another passage,ignored\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());

        let rows = read_rows(&mut reader).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].query_id, "q1");
        assert_eq!(rows[1].passages, "Another passage");
    }

    #[test]
    fn test_missing_columns_are_named() {
        let data = "query_id,question\nq1,What?\n";
        let mut reader = csv::Reader::from_reader(data.as_bytes());

        match read_rows(&mut reader) {
            Err(GraderError::MissingColumns(cols)) => {
                assert_eq!(cols, vec!["answer", "passages"]);
            }
            other => panic!("expected MissingColumns, got {:?}", other),
        }
    }

    #[test]
    fn test_csv_fields_for_failure() {
        let outcome = GradeOutcome::Failed(GradeFailure::CallFailed("refused".to_string()));
        let (score, explanation) = csv_fields(&outcome);
        assert_eq!(score, -1);
        assert!(explanation.contains("refused"));
    }

    #[test]
    fn test_csv_fields_for_grade() {
        let outcome = GradeOutcome::Graded(GradingResult {
            score: 77,
            explanation: "fine".to_string(),
        });
        assert_eq!(csv_fields(&outcome), (77, "fine".to_string()));
    }

    #[test]
    fn test_output_header_and_doubling() {
        let row = TableRow {
            query_id: "q1".to_string(),
            question: "What?".to_string(),
            answer: "Because.".to_string(),
            passages: "P".to_string(),
        };
        let outcome = GradeOutcome::Graded(GradingResult {
            score: 50,
            explanation: "half".to_string(),
        });

        let mut writer = csv::Writer::from_writer(Vec::new());
        // Two records per input row
        write_record(&mut writer, &row, "neighbor answer", "ctx", &outcome).unwrap();
        write_record(&mut writer, &row, &row.answer, "ctx", &outcome).unwrap();

        let data = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let mut lines = data.lines();
        assert_eq!(
            lines.next().unwrap(),
            "query_id,question,answer,context,score,explanation"
        );
        assert_eq!(lines.count(), 2);
    }
}
