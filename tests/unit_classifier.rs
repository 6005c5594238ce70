// Unit tests for training, classification and the binary codec.
//
// Tests TF-IDF model compression, normalization against the training
// corpus, ensemble scoring, and that encoding never changes behavior.

use inkprint::classifier::codec;
use inkprint::classifier::{
    Classifier, ClassifierOptions, ClassifierSet, ModelBuilder, DEFAULT_SCORE_EXPONENT,
};
use inkprint::error::EngineError;
use inkprint::text::PipelineConfig;
use proptest::prelude::*;

const GROCERIES: [&str; 2] = ["total compra valor", "cupom fiscal valor total"];

fn plain() -> ClassifierOptions {
    ClassifierOptions::default().with_pipeline(PipelineConfig::plain())
}

fn groceries() -> Classifier {
    Classifier::train("groceries", &GROCERIES, plain()).unwrap()
}

// ============================================================
// Training
// ============================================================

#[test]
fn best_training_text_scores_one() {
    let corpus = [
        "cupom fiscal mercado total valor",
        "mercado central cupom total",
        "nota cupom total valor troco",
    ];
    let c = Classifier::train("market", &corpus, plain()).unwrap();
    let best = corpus
        .iter()
        .map(|t| c.classify(t).unwrap())
        .fold(f64::MIN, f64::max);
    assert!((best - 1.0).abs() < 1e-9, "got {best}");
}

#[test]
fn raw_similarity_times_factor_is_score() {
    let c = groceries();
    let raw = c.raw_similarity("valor total compra").unwrap();
    let score = c.classify("valor total compra").unwrap();
    assert!((raw * c.normalization_factor() - score).abs() < 1e-12);
}

#[test]
fn matching_text_outranks_unrelated_text() {
    let c = groceries();
    let receipt = c.classify("valor total compra").unwrap();
    let console = c.classify("playstation controller joystick").unwrap();
    assert!(receipt > console, "{receipt} vs {console}");
    assert_eq!(console, 0.0);
}

#[test]
fn single_text_corpus_keeps_everything() {
    let c = Classifier::train("one", &["cupom fiscal valor"], plain()).unwrap();
    assert_eq!(c.model_size(), 3);
    assert!((c.normalization_factor() - 1.0).abs() < 1e-12);
}

#[test]
fn higher_multiplicity_uses_word_pairs() {
    let options = plain().with_multiplicity(2);
    let c = Classifier::train(
        "pairs",
        &["valor total compra", "cupom valor total"],
        options,
    )
    .unwrap();
    // Only "valor total" appears in both texts
    assert_eq!(c.model_size(), 1);
    assert_eq!(c.model().shingles()[0].text(), "valor total");
}

#[test]
fn raising_the_cutoff_keeps_more() {
    let strict = Classifier::train("strict", &GROCERIES, plain()).unwrap();
    let loose = Classifier::train("loose", &GROCERIES, plain().with_tfidf_cutoff(1.0)).unwrap();
    assert!(loose.model_size() > strict.model_size());
    assert_eq!(loose.model_size(), loose.vocabulary_size());
}

#[test]
fn disjoint_corpus_cannot_normalize() {
    let err = Classifier::train("none", &["alpha beta", "gamma delta"], plain()).unwrap_err();
    assert!(matches!(err, EngineError::Computation(_)));
}

#[test]
fn builder_tracks_progress() {
    let mut builder = ModelBuilder::new("groceries", plain()).unwrap();
    for text in GROCERIES {
        builder.add_text(text).unwrap();
    }
    assert_eq!(builder.document_count(), 2);
    assert_eq!(builder.fingerprint_count(), 5);
    let c = builder.finish().unwrap();
    assert_eq!(c.training_texts(), 2);
}

// ============================================================
// ClassifierSet
// ============================================================

#[test]
fn empty_set_errors() {
    let set = ClassifierSet::new();
    assert_eq!(set.classify("valor"), Err(EngineError::EmptySet));
    assert_eq!(set.exponent(), DEFAULT_SCORE_EXPONENT);
}

#[test]
fn set_ranks_by_confidence() {
    let games = Classifier::train(
        "games",
        &["playstation controle jogo", "jogo playstation console"],
        plain(),
    )
    .unwrap();
    let set = ClassifierSet::from_classifiers([groceries(), games]).unwrap();

    let scores = set.classify("jogo playstation novo").unwrap();
    assert_eq!(scores[0].name, "games");
    let scores = set.classify("cupom total valor").unwrap();
    assert_eq!(scores[0].name, "groceries");
}

#[test]
fn set_propagates_classifier_errors() {
    let pairs = Classifier::train(
        "pairs",
        &["valor total", "valor total compra"],
        plain().with_multiplicity(2),
    )
    .unwrap();
    let set = ClassifierSet::from_classifiers([groceries(), pairs]).unwrap();
    assert!(matches!(
        set.classify("valor"),
        Err(EngineError::Validation(_))
    ));
}

proptest! {
    #[test]
    fn confidences_sum_to_one(words in prop::collection::vec(
        prop::sample::select(vec!["total", "valor", "compra", "cupom", "jogo", "playstation", "troco"]),
        1..10,
    )) {
        let games = Classifier::train(
            "games",
            &["playstation controle jogo", "jogo playstation console"],
            plain(),
        )
        .unwrap();
        let set = ClassifierSet::from_classifiers([groceries(), games]).unwrap();

        let text = words.join(" ");
        let scores = set.classify(&text).unwrap();
        let sum: f64 = scores.iter().map(|s| s.confidence).sum();
        prop_assert!((sum - 1.0).abs() < 1e-9, "sum {} for {:?}", sum, text);
        prop_assert!(scores.windows(2).all(|w| w[0].confidence >= w[1].confidence));
    }
}

// ============================================================
// Codec
// ============================================================

#[test]
fn decoded_classifier_scores_identically() {
    let c = Classifier::train("groceries", &GROCERIES, ClassifierOptions::default()).unwrap();
    let decoded = codec::decode(&codec::encode(&c).unwrap()).unwrap();
    for text in [
        "valor total compra",
        "playstation controller joystick",
        "CUPOM FISCAL\nDecrição",
    ] {
        assert_eq!(decoded.classify(text), c.classify(text), "text {text:?}");
    }
}

proptest! {
    #[test]
    fn decoded_classifier_matches_on_generated_text(
        words in prop::collection::vec(
            prop_oneof![
                prop::sample::select(vec!["valor", "total", "compra", "cupom", "Decrição", "R$", "\n"])
                    .prop_map(str::to_string),
                "[a-zA-Zçã0-9,.$]{1,8}",
            ],
            0..8,
        ),
        separator in prop::sample::select(vec![" ", "  ", "\n", "\t"]),
    ) {
        // Multiplicity 2, so texts of zero or one token fail on both sides
        let c = Classifier::train(
            "pairs",
            &["valor total compra", "cupom valor total"],
            ClassifierOptions::default().with_multiplicity(2),
        )
        .unwrap();
        let decoded = codec::decode(&codec::encode(&c).unwrap()).unwrap();

        let text = words.join(separator);
        prop_assert_eq!(decoded.classify(&text), c.classify(&text), "text {:?}", text);
    }
}

#[test]
fn decoded_classifier_keeps_short_text_errors() {
    let c = Classifier::train(
        "pairs",
        &["valor total compra", "cupom valor total"],
        ClassifierOptions::default().with_multiplicity(2),
    )
    .unwrap();
    let decoded = Classifier::decode(&c.encode().unwrap()).unwrap();
    assert!(matches!(c.classify("valor"), Err(EngineError::Validation(_))));
    assert_eq!(decoded.classify("valor"), c.classify("valor"));
    assert_eq!(decoded.classify(""), c.classify(""));
}

#[test]
fn encoding_is_deterministic() {
    let c = groceries();
    assert_eq!(c.encode().unwrap(), c.encode().unwrap());
}

#[test]
fn decode_rejects_foreign_bytes() {
    let err = codec::decode(b"not a classifier at all").unwrap_err();
    assert!(matches!(err, EngineError::Validation(_)));
}
