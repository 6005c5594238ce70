// Set operations over shinglings and Jaccard similarity.
//
//   jaccard(A, B) = |A ∩ B| / |A ∪ B|
//
// Both sides are counted as unique fingerprints, never token occurrences.
// Intersection cardinality comes from hash membership alone; the counters of
// an intersection result carry no meaning and nothing reads them.

use super::fingerprint::Shingling;
use crate::error::{EngineError, EngineResult};

fn check_multiplicity(a: &Shingling, b: &Shingling) -> EngineResult<()> {
    if a.multiplicity() != b.multiplicity() {
        return Err(EngineError::validation(format!(
            "cannot compare shinglings of multiplicity {} and {}",
            a.multiplicity(),
            b.multiplicity()
        )));
    }
    Ok(())
}

/// All shingles of `a` then `b`, deduplicated. Each side contributes one
/// occurrence per unique shingle, so counts are 1 or 2.
pub fn union(a: &Shingling, b: &Shingling) -> EngineResult<Shingling> {
    check_multiplicity(a, b)?;
    Shingling::from_shingles(
        a.multiplicity(),
        a.shingles().iter().chain(b.shingles()).cloned(),
    )
}

/// Shingles present in both, taken from `a`.
pub fn intersect(a: &Shingling, b: &Shingling) -> EngineResult<Shingling> {
    check_multiplicity(a, b)?;
    Shingling::from_shingles(
        a.multiplicity(),
        a.shingles()
            .iter()
            .filter(|s| b.contains(&s.hash()))
            .cloned(),
    )
}

/// Number of unique shingles shared by both sides.
pub fn intersection_size(a: &Shingling, b: &Shingling) -> EngineResult<usize> {
    check_multiplicity(a, b)?;
    // Probe the larger side with the smaller one
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    Ok(small
        .shingles()
        .iter()
        .filter(|s| large.contains(&s.hash()))
        .count())
}

/// Jaccard similarity in [0, 1].
///
/// Fails with a computation error when both sides are empty, since the
/// similarity of two empty sets is undefined.
pub fn jaccard_similarity(a: &Shingling, b: &Shingling) -> EngineResult<f64> {
    let shared = intersection_size(a, b)?;
    let union_size = a.len() + b.len() - shared;
    if union_size == 0 {
        return Err(EngineError::computation(
            "jaccard similarity is undefined for two empty shinglings",
        ));
    }
    Ok(shared as f64 / union_size as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shingling(text: &str, n: usize) -> Shingling {
        let tokens: Vec<String> = text.split_whitespace().map(str::to_string).collect();
        Shingling::from_tokens(&tokens, n).unwrap()
    }

    #[test]
    fn test_identical_documents() {
        let a = shingling("cupom fiscal valor total", 2);
        assert!((jaccard_similarity(&a, &a).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_disjoint_documents() {
        let a = shingling("cupom fiscal", 1);
        let b = shingling("playstation joystick", 1);
        assert_eq!(jaccard_similarity(&a, &b).unwrap(), 0.0);
    }

    #[test]
    fn test_partial_overlap() {
        // {total, compra, valor} vs {cupom, fiscal, valor, total}: 2 shared, 5 total
        let a = shingling("total compra valor", 1);
        let b = shingling("cupom fiscal valor total", 1);
        let score = jaccard_similarity(&a, &b).unwrap();
        assert!((score - 0.4).abs() < 1e-12, "got {score}");
    }

    #[test]
    fn test_repeats_do_not_change_similarity() {
        let a = shingling("total valor", 1);
        let b = shingling("total total total valor", 1);
        assert!((jaccard_similarity(&a, &b).unwrap() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_union_counts_presence_per_side() {
        let a = shingling("total valor total", 1);
        let b = shingling("total cupom", 1);
        let u = union(&a, &b).unwrap();
        assert_eq!(u.len(), 3);
        let total = a.shingles()[0].hash();
        let valor = a.shingles()[1].hash();
        assert_eq!(u.count(&total), Some(2));
        assert_eq!(u.count(&valor), Some(1));
    }

    #[test]
    fn test_intersect_takes_first_side_instances() {
        let a = shingling("total valor cupom", 1);
        let b = shingling("cupom total troco", 1);
        let i = intersect(&a, &b).unwrap();
        let texts: Vec<String> = i.shingles().iter().map(|s| s.text()).collect();
        assert_eq!(texts, vec!["total", "cupom"]);
        assert_eq!(intersection_size(&a, &b).unwrap(), i.len());
    }

    #[test]
    fn test_cardinalities_agree_with_set_operations() {
        let a = shingling("a b c d e f", 2);
        let b = shingling("c d e x y", 2);
        let expected =
            intersect(&a, &b).unwrap().len() as f64 / union(&a, &b).unwrap().len() as f64;
        assert_eq!(jaccard_similarity(&a, &b).unwrap(), expected);
    }

    #[test]
    fn test_mismatched_multiplicity() {
        let a = shingling("a b c", 1);
        let b = shingling("a b c", 2);
        assert!(matches!(
            jaccard_similarity(&a, &b),
            Err(EngineError::Validation(_))
        ));
        assert!(union(&a, &b).is_err());
        assert!(intersect(&a, &b).is_err());
    }

    #[test]
    fn test_both_empty_is_undefined() {
        let a = Shingling::empty(1).unwrap();
        let b = Shingling::empty(1).unwrap();
        assert!(matches!(
            jaccard_similarity(&a, &b),
            Err(EngineError::Computation(_))
        ));
    }

    #[test]
    fn test_one_empty_side_is_zero() {
        let a = Shingling::empty(1).unwrap();
        let b = shingling("total", 1);
        assert_eq!(jaccard_similarity(&a, &b).unwrap(), 0.0);
    }
}
