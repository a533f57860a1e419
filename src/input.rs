//! Line-oriented input parsing, per spec §6.
//!
//! ```text
//! T Q N
//! <topic lines>,    T of them: <topic_id:int> <x:float> <y:float>
//! <question lines>, Q of them: <question_id:int> <m:int> <topic_id_1> ... <topic_id_m>
//! <query lines>,    N of them: <kind:'t'|'q'> <k:int> <x:float> <y:float>
//! ```

use crate::dispatch::{QuestionInput, TopicInput};
use std::io::BufRead;
use thiserror::Error;

/// A parsed query: its kind, requested result count, and 2-d location.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Query {
    pub kind: QueryKind,
    pub k: usize,
    pub coords: [f64; 2],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Topic,
    Question,
}

/// The fully parsed input: declared topics, declared questions, and the
/// sequence of queries to answer, in the order they appeared.
#[derive(Debug, Clone)]
pub struct ParsedInput {
    pub topics: Vec<TopicInput<f64>>,
    pub questions: Vec<QuestionInput>,
    pub queries: Vec<Query>,
}

/// Errors from malformed input, per spec §7's "malformed input" category.
/// Carries the 1-based line number of the offending line.
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("line {line}: expected a header of 3 integers (topic count, question count, query count)")]
    BadHeader { line: usize },
    #[error("line {line}: expected a non-negative integer field, found {field:?}")]
    NotAnInteger { line: usize, field: String },
    #[error("line {line}: expected a floating-point field, found {field:?}")]
    NotAFloat { line: usize, field: String },
    #[error("line {line}: expected {expected} fields, found {found}")]
    WrongFieldCount {
        line: usize,
        expected: usize,
        found: usize,
    },
    #[error("line {line}: question declares m={declared} topics but only {found} were given")]
    QuestionTopicCountMismatch {
        line: usize,
        declared: usize,
        found: usize,
    },
    #[error("line {line}: unknown query kind {kind:?} (expected 't' or 'q')")]
    UnknownQueryKind { line: usize, kind: String },
    #[error("unexpected end of input after line {line}")]
    UnexpectedEof { line: usize },
}

/// Parses the full input from `source`, per spec §6.
pub fn parse<R: BufRead>(source: R) -> Result<ParsedInput, ParseError> {
    let mut lines = source.lines();
    let mut line_no = 0usize;

    let mut next_line = |lines: &mut std::io::Lines<R>, line_no: &mut usize| -> Result<String, ParseError> {
        *line_no += 1;
        match lines.next() {
            Some(Ok(line)) => Ok(line),
            Some(Err(_)) | None => Err(ParseError::UnexpectedEof { line: *line_no - 1 }),
        }
    };

    let header = next_line(&mut lines, &mut line_no)?;
    let header_fields: Vec<&str> = header.split_whitespace().collect();
    if header_fields.len() != 3 {
        return Err(ParseError::BadHeader { line: line_no });
    }
    let num_topics = parse_usize(header_fields[0], line_no)?;
    let num_questions = parse_usize(header_fields[1], line_no)?;
    let num_queries = parse_usize(header_fields[2], line_no)?;

    let mut topics = Vec::with_capacity(num_topics);
    for _ in 0..num_topics {
        let line = next_line(&mut lines, &mut line_no)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 3 {
            return Err(ParseError::WrongFieldCount {
                line: line_no,
                expected: 3,
                found: fields.len(),
            });
        }
        let id = parse_i64(fields[0], line_no)?;
        let x = parse_f64(fields[1], line_no)?;
        let y = parse_f64(fields[2], line_no)?;
        topics.push(TopicInput { id, coords: [x, y] });
    }

    let mut questions = Vec::with_capacity(num_questions);
    for _ in 0..num_questions {
        let line = next_line(&mut lines, &mut line_no)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 2 {
            return Err(ParseError::WrongFieldCount {
                line: line_no,
                expected: 2,
                found: fields.len(),
            });
        }
        let id = parse_i64(fields[0], line_no)?;
        let m = parse_usize(fields[1], line_no)?;
        let topic_ids_raw = &fields[2..];
        if topic_ids_raw.len() != m {
            return Err(ParseError::QuestionTopicCountMismatch {
                line: line_no,
                declared: m,
                found: topic_ids_raw.len(),
            });
        }
        let topic_ids = topic_ids_raw
            .iter()
            .map(|f| parse_i64(f, line_no))
            .collect::<Result<Vec<_>, _>>()?;
        questions.push(QuestionInput { id, topic_ids });
    }

    let mut queries = Vec::with_capacity(num_queries);
    for _ in 0..num_queries {
        let line = next_line(&mut lines, &mut line_no)?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return Err(ParseError::WrongFieldCount {
                line: line_no,
                expected: 4,
                found: fields.len(),
            });
        }
        let kind = match fields[0] {
            "t" => QueryKind::Topic,
            "q" => QueryKind::Question,
            other => {
                return Err(ParseError::UnknownQueryKind {
                    line: line_no,
                    kind: other.to_string(),
                })
            }
        };
        let k = parse_usize(fields[1], line_no)?;
        let x = parse_f64(fields[2], line_no)?;
        let y = parse_f64(fields[3], line_no)?;
        queries.push(Query {
            kind,
            k,
            coords: [x, y],
        });
    }

    Ok(ParsedInput {
        topics,
        questions,
        queries,
    })
}

fn parse_usize(field: &str, line: usize) -> Result<usize, ParseError> {
    field.parse().map_err(|_| ParseError::NotAnInteger {
        line,
        field: field.to_string(),
    })
}

fn parse_i64(field: &str, line: usize) -> Result<i64, ParseError> {
    field.parse().map_err(|_| ParseError::NotAnInteger {
        line,
        field: field.to_string(),
    })
}

fn parse_f64(field: &str, line: usize) -> Result<f64, ParseError> {
    field.parse().map_err(|_| ParseError::NotAFloat {
        line,
        field: field.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse_str(s: &str) -> Result<ParsedInput, ParseError> {
        parse(Cursor::new(s.as_bytes()))
    }

    #[test]
    fn parses_minimal_topic_query_scenario() {
        let input = "4 0 1\n1 0 0\n2 10 0\n3 0 10\n4 10 10\nt 1 1 1\n";
        let parsed = parse_str(input).unwrap();
        assert_eq!(parsed.topics.len(), 4);
        assert_eq!(parsed.questions.len(), 0);
        assert_eq!(parsed.queries.len(), 1);
        assert_eq!(parsed.queries[0].kind, QueryKind::Topic);
        assert_eq!(parsed.queries[0].k, 1);
        assert_eq!(parsed.queries[0].coords, [1.0, 1.0]);
    }

    #[test]
    fn parses_questions_with_topic_references() {
        let input = "1 2 0\n1 0 0\n100 1 1\n200 0\n";
        let parsed = parse_str(input).unwrap();
        assert_eq!(parsed.questions[0].topic_ids, vec![1]);
        assert!(parsed.questions[1].topic_ids.is_empty());
    }

    #[test]
    fn rejects_non_numeric_field() {
        let input = "1 0 0\n1 x 0\n";
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, ParseError::NotAFloat { line: 2, .. }));
    }

    #[test]
    fn rejects_question_with_mismatched_topic_count() {
        let input = "1 1 0\n1 0 0\n100 2 1\n";
        let err = parse_str(input).unwrap_err();
        assert!(matches!(
            err,
            ParseError::QuestionTopicCountMismatch {
                line: 3,
                declared: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn rejects_unknown_query_kind() {
        let input = "1 0 1\n1 0 0\nx 1 0 0\n";
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, ParseError::UnknownQueryKind { line: 3, .. }));
    }

    #[test]
    fn rejects_truncated_input() {
        let input = "2 0 0\n1 0 0\n";
        let err = parse_str(input).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof { .. }));
    }
}
