//! Shared test helpers for integration tests
//!
//! Note: Functions may appear unused because each test file compiles separately.

#![allow(dead_code)]

use hlstream::stream::Replayable;
use hlstream::{highlight, Operation, OperationLog};

/// Highlight `code` as `language` and record every event
pub fn record(code: &str, language: &str) -> OperationLog {
    let mut log = OperationLog::new();
    highlight(code, Some(language), &mut log).unwrap();
    log
}

/// Assert scopes and sub-language brackets nest properly and all close
pub fn assert_balanced(log: &OperationLog) {
    let mut stack = Vec::new();
    for (i, op) in log.iter().enumerate() {
        match op {
            Operation::BeginScope { .. } => stack.push("scope"),
            Operation::BeginSublanguage { .. } => stack.push("sublanguage"),
            Operation::EndScope => {
                assert_eq!(stack.pop(), Some("scope"), "unmatched end_scope at {}", i)
            }
            Operation::EndSublanguage => assert_eq!(
                stack.pop(),
                Some("sublanguage"),
                "unmatched end_sublanguage at {}",
                i
            ),
            Operation::EmitText { .. } => {}
        }
    }
    assert!(stack.is_empty(), "unclosed: {:?}", stack);
}

/// Index pairs of the top-level sub-language brackets named `name`
///
/// Brackets nested inside any other sub-language are skipped.
pub fn sublanguage_bounds(log: &OperationLog, name: &str) -> Vec<(usize, usize)> {
    let mut bounds = Vec::new();
    let mut open: Vec<(usize, bool)> = Vec::new();
    for (i, op) in log.operations().iter().enumerate() {
        match op {
            Operation::BeginSublanguage { name: sub } => {
                let top_level = sub == name && open.is_empty();
                open.push((i, top_level));
            }
            Operation::EndSublanguage => {
                if let Some((start, true)) = open.pop() {
                    bounds.push((start, i));
                }
            }
            _ => {}
        }
    }
    bounds
}

/// Index pair of the first sub-language bracket named `name`, at any depth
pub fn first_sublanguage(log: &OperationLog, name: &str) -> Option<(usize, usize)> {
    let ops = log.operations();
    let start = ops
        .iter()
        .position(|op| matches!(op, Operation::BeginSublanguage { name: sub } if sub == name))?;

    let mut depth = 0usize;
    for (i, op) in ops.iter().enumerate().skip(start) {
        match op {
            Operation::BeginSublanguage { .. } => depth += 1,
            Operation::EndSublanguage => {
                depth -= 1;
                if depth == 0 {
                    return Some((start, i));
                }
            }
            _ => {}
        }
    }
    None
}

/// Concatenated text strictly between `start` and `end`
pub fn text_between(log: &OperationLog, start: usize, end: usize) -> String {
    OperationLog::from(log.operations()[start + 1..end].to_vec()).text()
}

/// Names of every sub-language bracket opened, in order
pub fn sublanguages(log: &OperationLog) -> Vec<&str> {
    log.iter()
        .filter_map(|op| match op {
            Operation::BeginSublanguage { name } => Some(name.as_str()),
            _ => None,
        })
        .collect()
}
