//! End-to-end tests of tokenization + noise pipelines built from JSON
//! configurations, the way a training data preparation job builds them.

#[cfg(test)]
mod tests {
    use crate::{Pipeline, PipelineState, PrepError, ProcessType, TranslationUnit};
    use serde_json::{Value, json};
    use std::io::Write;

    /// Pipeline of a conservative tokenization followed by a noise block
    fn noise_pipeline(noise: Value, process_type: ProcessType) -> Pipeline {
        let mut block = json!({"op": "noise"});
        if let (Some(block), Some(extra)) = (block.as_object_mut(), noise.as_object()) {
            block.extend(extra.clone());
        }
        let config = json!({
            "source": "en",
            "target": "fr",
            "preprocess": [
                {
                    "op": "tokenization",
                    "source": {"mode": "conservative", "joiner_annotate": true},
                    "target": {"mode": "conservative", "joiner_annotate": true}
                },
                block
            ]
        });
        Pipeline::new(&config, process_type).expect("valid pipeline")
    }

    fn run_seeded(noise: Value, process_type: ProcessType, text: &str, seed: u64) -> Vec<String> {
        let pipeline = noise_pipeline(noise, process_type);
        let mut state = PipelineState::seeded(seed);
        pipeline
            .run(vec![TranslationUnit::with_target(text, text)], &mut state)
            .expect("pipeline run")
            .iter()
            .map(|tu| tu.src_detok())
            .collect()
    }

    fn run(noise: Value, text: &str) -> Vec<String> {
        run_seeded(noise, ProcessType::Training, text, 0)
    }

    /// Run over several seeds and check every output is one of `expected`
    fn assert_one_of(noise: Value, text: &str, expected: &[&str]) {
        for seed in 0..25 {
            let output = run_seeded(noise.clone(), ProcessType::Training, text, seed);
            assert_eq!(output.len(), 1);
            assert!(
                expected.contains(&output[0].as_str()),
                "unexpected output {:?} for seed {}",
                output[0],
                seed
            );
        }
    }

    #[test]
    fn test_no_noise_is_identity() {
        assert_eq!(run(json!({}), "hello world."), vec!["hello world."]);
    }

    #[test]
    fn test_drop_word() {
        assert_eq!(run(json!({"drop_word_prob": 1}), "hello world."), vec![""]);
        assert_eq!(
            run(json!({"source": {"drop_word_prob": 1}}), "hello world."),
            vec![""]
        );
    }

    #[test]
    fn test_noise_skipped_for_inference() {
        assert_eq!(
            run_seeded(
                json!({"drop_word_prob": 1}),
                ProcessType::Inference,
                "hello world.",
                0
            ),
            vec!["hello world."]
        );
    }

    #[test]
    fn test_drop_space() {
        assert_eq!(
            run(json!({"drop_space_prob": 1}), "hello world."),
            vec!["helloworld."]
        );
    }

    #[test]
    fn test_drop_char() {
        assert_eq!(run(json!({"drop_char_prob": 1}), "hello world."), vec![""]);
        assert_eq!(run(json!({"drop_char_prob": 1}), "a｟a｠."), vec!["｟a｠"]);
        assert_eq!(
            run(json!({"drop_word_prob": 1, "drop_space_prob": 1}), "a｟a｠."),
            vec!["｟a｠"]
        );
    }

    #[test]
    fn test_duplicate_and_swap_char() {
        assert_eq!(
            run(json!({"duplicate_char_prob": 1}), "hello."),
            vec!["hheelllloo.."]
        );
        assert_eq!(run(json!({"swap_char_prob": 1}), "hello."), vec!["ehllo."]);
    }

    #[test]
    fn test_insert_space() {
        assert_one_of(
            json!({"insert_space_prob": 1}),
            "hello.",
            &["h ello.", "he llo.", "hel lo.", "hell o."],
        );
        assert_one_of(
            json!({"insert_space_prob": 1, "drop_space_prob": 1}),
            "hello.",
            &["hello."],
        );
    }

    #[test]
    fn test_substitute_char() {
        assert_one_of(
            json!({"substitute_char_prob": 1}),
            "pp",
            &["oo", "ol", "lo", "ll"],
        );
        assert_one_of(
            json!({"substitute_char_prob": 1}),
            "PP",
            &["OO", "OL", "LO", "LL"],
        );
    }

    #[test]
    fn test_marker() {
        assert_eq!(
            run(json!({"drop_space_prob": 1, "add_marker": true}), "hello world."),
            vec!["｟mrk_noisy｠ helloworld."]
        );
        assert_one_of(
            json!({"insert_space_prob": 1, "add_marker": true}),
            "hello.",
            &[
                "｟mrk_noisy｠ h ello.",
                "｟mrk_noisy｠ he llo.",
                "｟mrk_noisy｠ hel lo.",
                "｟mrk_noisy｠ hell o.",
            ],
        );
    }

    #[test]
    fn test_duplicate_and_swap_word() {
        assert_eq!(
            run(json!({"duplicate_word_prob": 1}), "hello."),
            vec!["hello hello.."]
        );
        assert_eq!(run(json!({"swap_word_prob": 1}), "hello."), vec![". hello"]);
    }

    #[test]
    fn test_substitute_word_with_embeddings() {
        let mut file = tempfile::Builder::new().suffix(".vec").tempfile().unwrap();
        writeln!(file, "7 3").unwrap();
        writeln!(file, "hello 1.0 0.0 0.0").unwrap();
        writeln!(file, "translator 0.9 0.1 0.0").unwrap();
        writeln!(file, "violin 0.8 0.2 0.0").unwrap();
        writeln!(file, "hello! 0.99 0.0 0.01").unwrap();
        writeln!(file, "luce 0.7 0.3 0.0").unwrap();
        writeln!(file, "h3llo 0.95 0.05 0.0").unwrap();
        writeln!(file, "world 0.0 0.0 1.0").unwrap();

        let noise = json!({
            "substitute_word": {
                "prob": 1,
                "word_embedding_file": file.path(),
                "nearest_neighbors_num": 5
            }
        });
        assert_one_of(
            noise,
            "hello.",
            &["translator.", "violin.", "luce."],
        );
    }

    #[test]
    fn test_missing_embedding_file() {
        let config = json!([
            {
                "op": "noise",
                "substitute_word": {
                    "prob": 1,
                    "word_embedding_file": "/nonexistent/dbpedia.vec",
                    "nearest_neighbors_num": 5
                }
            }
        ]);
        let err = Pipeline::new(&config, ProcessType::Training).unwrap_err();
        assert!(matches!(err, PrepError::Config(_)));
    }

    #[test]
    fn test_data_augmentation() {
        assert_eq!(
            run(
                json!({"drop_word_prob": 1, "data_augmentation": true}),
                "hello world."
            ),
            vec!["", "hello world."]
        );
        assert_eq!(
            run(
                json!({"drop_space_prob": 1, "data_augmentation": true}),
                "hello world."
            ),
            vec!["helloworld.", "hello world."]
        );
        assert_eq!(
            run(
                json!({"drop_space_prob": 0, "data_augmentation": true}),
                "hello world."
            ),
            vec!["hello world."]
        );
    }

    #[test]
    fn test_augmented_copy_keeps_target() {
        let pipeline = noise_pipeline(
            json!({"drop_word_prob": 1, "data_augmentation": true}),
            ProcessType::Training,
        );
        let mut state = PipelineState::seeded(0);
        let output = pipeline
            .run(
                vec![TranslationUnit::with_target("hello world.", "bonjour le monde.")],
                &mut state,
            )
            .unwrap();
        assert_eq!(output.len(), 2);
        for tu in &output {
            assert_eq!(tu.tgt_detok().as_deref(), Some("bonjour le monde."));
        }
    }

    #[test]
    fn test_char_equivalence() {
        let text = "Élève doit connaître la leçon par cœur.";
        assert_eq!(
            run(
                json!({
                    "char_equivalence_prob": 1,
                    "char_equivalence_table": {"\u{300}": "'", "\u{301}": "'"},
                    "data_augmentation": true
                }),
                text
            ),
            vec!["E'le've doit connaître la leçon par cœur.", text]
        );
        assert_eq!(
            run(
                json!({
                    "char_equivalence_prob": 1,
                    "char_equivalence_table": {"\u{300}": "'", "\u{301}": "'", "\u{302}": "^"},
                    "data_augmentation": true
                }),
                text
            ),
            vec!["E'le've doit connai^tre la leçon par cœur.", text]
        );
        assert_eq!(
            run(
                json!({
                    "char_equivalence_prob": 1,
                    "char_equivalence_table": {"-": " "},
                    "data_augmentation": false
                }),
                "mini-saia com letras de logotipo"
            ),
            vec!["mini saia com letras de logotipo"]
        );
    }

    #[test]
    fn test_batch_units_are_independent() {
        let pipeline = noise_pipeline(
            json!({"drop_space_prob": 1, "data_augmentation": true}),
            ProcessType::Training,
        );
        let mut state = PipelineState::seeded(3);
        let output = pipeline
            .run(
                vec![
                    TranslationUnit::new("hello world."),
                    TranslationUnit::new("single"),
                    TranslationUnit::new("good bye"),
                ],
                &mut state,
            )
            .unwrap();
        let texts: Vec<_> = output.iter().map(|tu| tu.src_detok()).collect();
        assert_eq!(
            texts,
            vec!["helloworld.", "hello world.", "single", "goodbye", "good bye"]
        );
        assert_eq!(state.counters()["noise"].input, 3);
        assert_eq!(state.counters()["noise"].output, 5);
    }

    #[test]
    fn test_invalid_noise_config_fails_before_processing() {
        let config = json!([{"op": "noise", "swap_word_prob": 1.5}]);
        assert!(Pipeline::new(&config, ProcessType::Training).is_err());

        let config = json!([{"op": "noise", "source": {"drop_word": 0.5}}]);
        assert!(Pipeline::new(&config, ProcessType::Training).is_err());

        let config = json!([{"op": "noise", "substitute_word": {"nearest_neighbors_num": 2.5}}]);
        assert!(Pipeline::new(&config, ProcessType::Training).is_err());
    }
}
