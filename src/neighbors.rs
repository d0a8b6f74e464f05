//! Neighbor answer and stitched-context synthesis for the tabular pipeline.
//!
//! Both functions deliberately decorrelate what gets graded from the true
//! source row: the answer comes from the next row and the context mixes in
//! the surrounding rows' passages, probing whether the grader penalizes
//! answers that are irrelevant to their question or context.

use crate::tabular::TableRow;

/// The answer of row `(index + 1) mod N`.
///
/// With no rows the result is empty; with a single row there is no neighbor
/// and the row's own answer is returned.
pub fn neighbor_answer(index: usize, rows: &[TableRow]) -> String {
    match rows.len() {
        0 => String::new(),
        1 => rows[0].answer.clone(),
        n => rows[(index + 1) % n].answer.clone(),
    }
}

/// Passages of the previous, current, and next rows joined with newlines.
///
/// Neighbor contributions are skipped when their index coincides with the
/// current one, so a single-row dataset yields just its own passage; empty
/// passages are skipped as well.
pub fn stitched_context(index: usize, rows: &[TableRow]) -> String {
    let n = rows.len();
    if n == 0 {
        return String::new();
    }

    let prev_index = (index + n - 1) % n;
    let next_index = (index + 1) % n;

    let mut parts: Vec<&str> = Vec::with_capacity(3);

    if prev_index != index && !rows[prev_index].passages.is_empty() {
        parts.push(&rows[prev_index].passages);
    }
    if !rows[index].passages.is_empty() {
        parts.push(&rows[index].passages);
    }
    if next_index != index && !rows[next_index].passages.is_empty() {
        parts.push(&rows[next_index].passages);
    }

    parts.join("\n")
}
