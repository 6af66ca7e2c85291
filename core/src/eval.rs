use crate::error::Result;
use crate::index::{DocId, InvertedIndex, ResultSet};
use crate::query::{parse, Expr};

/// Evaluate `expr` bottom-up against `index`.
///
/// `!x` is the complement of `x` within the whole corpus, never within a sibling
/// subexpression.
pub fn evaluate(expr: &Expr, index: &InvertedIndex) -> ResultSet {
    match expr {
        Expr::Term(word) => index.postings(word),
        Expr::And(l, r) => {
            let left = evaluate(l, index);
            if left.is_empty() {
                return left;
            }
            let right = evaluate(r, index);
            left.intersection(&right).copied().collect()
        }
        Expr::Or(l, r) => {
            let mut left = evaluate(l, index);
            left.extend(evaluate(r, index));
            left
        }
        Expr::Not(inner) => {
            let excluded = evaluate(inner, index);
            index.all_document_ids().difference(&excluded).copied().collect()
        }
        Expr::Group(inner) => evaluate(inner, index),
    }
}

/// Parse and evaluate a query string.
pub fn query(index: &InvertedIndex, input: &str) -> Result<ResultSet> {
    let expr = parse(input)?;
    tracing::debug!(%expr, "evaluating query");
    Ok(evaluate(&expr, index))
}

/// Order `results` by the summed tf-idf weight of the query's non-negated words,
/// divided by each document's norm. Ties go to the lower document id.
pub fn rank(index: &InvertedIndex, expr: &Expr, results: &ResultSet) -> Vec<(DocId, f64)> {
    let positive: Vec<&str> = expr.terms().into_iter().filter(|(_, neg)| !neg).map(|(w, _)| w).collect();
    let mut scored: Vec<(DocId, f64)> = results
        .iter()
        .map(|&doc| {
            let sum: f64 = positive.iter().map(|w| index.weight(w, doc)).sum();
            let norm = index.doc_norm(doc);
            (doc, if norm > 0.0 { sum / norm } else { sum })
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal).then(a.0.cmp(&b.0)));
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalyzerConfig;
    use crate::error::{Error, QueryError};
    use crate::index::Document;
    use crate::tokenizer::StopWordSet;

    fn index() -> InvertedIndex {
        let docs = vec![
            Document::new("D1", "cat dog"),
            Document::new("D2", "dog bird"),
            Document::new("D3", "cat bird fish"),
        ];
        InvertedIndex::build(&docs, &StopWordSet::new(), AnalyzerConfig::default())
    }

    fn ids(idx: &InvertedIndex, q: &str) -> Vec<String> {
        query(idx, q)
            .unwrap()
            .into_iter()
            .filter_map(|d| idx.external_id(d).map(str::to_string))
            .collect()
    }

    #[test]
    fn boolean_operators() {
        let idx = index();
        assert_eq!(ids(&idx, "cat * dog"), vec!["D1"]);
        assert_eq!(ids(&idx, "cat + bird"), vec!["D1", "D2", "D3"]);
        assert_eq!(ids(&idx, "!cat"), vec!["D2"]);
        assert_eq!(ids(&idx, "(cat + dog) * !bird"), vec!["D1"]);
    }

    #[test]
    fn negation_is_relative_to_corpus() {
        let idx = index();
        assert_eq!(ids(&idx, "fish * !cat"), Vec::<String>::new());
        assert_eq!(ids(&idx, "!unicorn"), vec!["D1", "D2", "D3"]);
        assert_eq!(ids(&idx, "!!cat"), vec!["D1", "D3"]);
    }

    #[test]
    fn case_insensitive_words() {
        let idx = index();
        assert_eq!(ids(&idx, "CAT*Dog"), vec!["D1"]);
    }

    #[test]
    fn syntax_errors_surface() {
        let idx = index();
        assert!(matches!(query(&idx, "* foo"), Err(Error::Syntax(QueryError::MissingOperand { .. }))));
        assert!(matches!(query(&idx, "(foo"), Err(Error::Syntax(QueryError::UnbalancedParen { .. }))));
        assert!(matches!(query(&idx, ""), Err(Error::Syntax(QueryError::EmptyQuery))));
    }

    #[test]
    fn oversized_queries_are_rejected_before_evaluation() {
        let idx = index();
        let negations = format!("{}cat", "!".repeat(200_000));
        assert!(matches!(query(&idx, &negations), Err(Error::Syntax(QueryError::TooLong { .. }))));
        let parens = format!("{}cat{}", "(".repeat(1_000), ")".repeat(1_000));
        assert!(matches!(query(&idx, &parens), Err(Error::Syntax(QueryError::TooDeep { .. }))));
        let chain = vec!["cat"; 2_000].join(" + ");
        assert_eq!(query(&idx, &chain).unwrap(), query(&idx, "cat").unwrap());
    }

    #[test]
    fn empty_index_returns_empty_sets() {
        let idx = InvertedIndex::build(&[], &StopWordSet::new(), AnalyzerConfig::default());
        assert!(query(&idx, "cat").unwrap().is_empty());
        assert!(query(&idx, "!cat").unwrap().is_empty());
    }

    #[test]
    fn ranking_prefers_heavier_documents() {
        let docs = vec![
            Document::new("a", "rust rust rust memory"),
            Document::new("b", "rust memory safety speed"),
            Document::new("c", "python"),
        ];
        let idx = InvertedIndex::build(&docs, &StopWordSet::new(), AnalyzerConfig::default());
        let expr = parse("rust * !python").unwrap();
        let results = evaluate(&expr, &idx);
        let ranked = rank(&idx, &expr, &results);
        assert_eq!(ranked.iter().map(|(d, _)| *d).collect::<Vec<_>>(), vec![0, 1]);
        assert!(ranked[0].1 > ranked[1].1);
    }
}
