// src/registry/builtin.rs

//! The stock model table shipped with the runner.
//!
//! Every stock model lives in a directory named after its id under the base
//! directory and runs in an environment of the same name.

use std::collections::BTreeMap;

use super::model::{ModelSpec, Registry};

fn stock(
    id: &str,
    description: &str,
    python_version: &str,
    command: &str,
    output_format: &str,
    output_pattern: Option<&str>,
) -> ModelSpec {
    ModelSpec {
        id: id.to_string(),
        description: description.to_string(),
        command: command.to_string(),
        working_dir: id.to_string(),
        environment: id.to_string(),
        output_format: output_format.to_string(),
        output_pattern: output_pattern.map(str::to_string),
        env_vars: BTreeMap::new(),
        python_version: Some(python_version.to_string()),
        huggingface_model: None,
        deprecated: false,
        requires_auth: false,
        requires_model: false,
        model_note: None,
        ready: None,
    }
}

/// Build the built-in registry in its canonical run order.
pub fn builtin_registry() -> Registry {
    let models = vec![
        stock(
            "homr",
            "End-to-end OMR using vision transformers",
            "3.11",
            "poetry run homr {input}",
            "musicxml",
            Some("{input_stem}.musicxml"),
        ),
        stock(
            "oemer",
            "End-to-end OMR system",
            "3.10",
            "oemer {input} -o {output_dir}",
            "musicxml",
            Some("{input_stem}.musicxml"),
        ),
        ModelSpec {
            huggingface_model: Some("PRAIG/smt-grandstaff".to_string()),
            ready: Some(false),
            ..stock(
                "SMT",
                "Sheet Music Transformer",
                "3.10",
                "python predict.py --image {input}",
                "bekern",
                None,
            )
        },
        ModelSpec {
            deprecated: true,
            ..stock(
                "SMT-plusplus",
                "Sheet Music Transformer++ (deprecated)",
                "3.10",
                "python predict.py --image {input}",
                "bekern",
                None,
            )
        },
        ModelSpec {
            requires_auth: true,
            env_vars: BTreeMap::from([("PYTHONPATH".to_string(), ".".to_string())]),
            ..stock(
                "legato",
                "LEGATO: Large-scale End-to-end OMR",
                "3.12",
                "python scripts/inference.py --model_path guangyangmusic/legato --image_path {input} --device {device}",
                "abc",
                None,
            )
        },
        stock(
            "Polyphonic-TrOMR",
            "Polyphonic Transformer OMR",
            "3.9",
            "python tromr/inference.py {input}",
            "custom",
            None,
        ),
        ModelSpec {
            requires_model: true,
            model_note: Some(
                "Requires trained model. Download from PrIMuS dataset.".to_string(),
            ),
            ..stock(
                "tf-end-to-end",
                "TensorFlow CTC-based OMR (monophonic)",
                "3.8",
                "python ctc_predict.py -image {input} -model {model} -vocabulary {vocabulary}",
                "semantic",
                None,
            )
        },
        stock(
            "cadenCV",
            "Python OMR with MIDI output",
            "3.9",
            "python main.py {input}",
            "midi",
            Some("output/*.mid"),
        ),
    ];

    Registry::new_unchecked(models)
}
