use std::{fs, io::BufReader};

use hmmtagger::{
    dataset::{read_sentences, write_tagged},
    Dataset, Error, Evaluation, HmmModel, Options, ProbTable, SmoothOpt, TrainOpt,
};
use tempfile::TempDir;

fn model() -> HmmModel {
    let ds = Dataset::from_path("tests/data/sample.tsv").unwrap();
    hmmtagger::train(&ds, TrainOpt::default())
}

#[test]
fn test_tables_round_trip() {
    let dir = TempDir::new().unwrap();
    let transitions = dir.path().join("transitions.tsv");
    let emissions = dir.path().join("emissions.tsv");
    let model = model();
    model.save_tables(&transitions, &emissions).unwrap();

    let loaded = HmmModel::from_tables(&transitions, &emissions).unwrap();
    assert_eq!(loaded, model);
    for (tag, row) in model.emissions.rows() {
        for (word, lp) in row {
            let back = loaded.emissions.get(tag, word).unwrap();
            assert_eq!(back.to_bits(), lp.to_bits());
        }
    }

    let text = fs::read_to_string(&transitions).unwrap();
    assert!(text.lines().any(|l| l == "0\tART\tNN"));
}

#[test]
fn test_json_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    let mut model = model();
    model.smooth(&SmoothOpt::default());
    model.save_json(&path).unwrap();
    assert_eq!(HmmModel::from_json(&path).unwrap(), model);
}

#[test]
fn test_missing_and_malformed_tables() {
    let dir = TempDir::new().unwrap();
    match ProbTable::from_path(dir.path().join("missing.tsv")) {
        Err(Error::Open { .. }) => {}
        other => panic!("unexpected: {other:?}"),
    }

    let bad = dir.path().join("bad.tsv");
    fs::write(&bad, "0\tART\tNN\n-0.5\tNN\n").unwrap();
    match ProbTable::from_path(&bad) {
        Err(Error::InvalidFormat { line, .. }) => assert_eq!(line, 2),
        other => panic!("unexpected: {other:?}"),
    }
    fs::write(&bad, "zero\tART\tNN\n").unwrap();
    match ProbTable::from_path(&bad) {
        Err(Error::InvalidFormat { line, .. }) => assert_eq!(line, 1),
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn test_options_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("options.json");
    fs::write(&path, r#"{"train": {"denoising": true}}"#).unwrap();
    let mut opts = Options::from_path(&path).unwrap();
    assert!(opts.train.denoising);
    assert_eq!(opts.smooth, SmoothOpt::default());
    opts.apply("smooth.blocked_tags=ART").unwrap();
    assert_eq!(opts.smooth.blocked_tags, vec!["ART"]);

    fs::write(&path, "{").unwrap();
    assert!(matches!(Options::from_path(&path), Err(Error::Json(_))));
}

#[test]
fn test_train_tag_eval() {
    let dir = TempDir::new().unwrap();
    let transitions = dir.path().join("transitions.tsv");
    let emissions = dir.path().join("emissions.tsv");
    let output = dir.path().join("tagged.tsv");
    let diff = dir.path().join("diff.txt");

    model().save_tables(&transitions, &emissions).unwrap();
    let mut model = HmmModel::from_tables(&transitions, &emissions).unwrap();
    model.smooth(&SmoothOpt::default());
    let tagger = model.tagger();

    let f = fs::File::open("tests/data/untagged.txt").unwrap();
    let sentences = read_sentences(BufReader::new(f)).unwrap();
    assert_eq!(sentences.len(), 3);
    let mut out = Vec::new();
    for sentence in &sentences {
        write_tagged(&mut out, &tagger.decode(sentence.as_slice()).tokens).unwrap();
    }
    fs::write(&output, &out).unwrap();
    assert_eq!(
        fs::read_to_string(&output).unwrap(),
        fs::read_to_string("tests/data/reference.tsv").unwrap()
    );

    let eval = Evaluation::from_paths(&output, "tests/data/reference.tsv").unwrap();
    assert_eq!(eval.accuracy(), 100.0);
    assert_eq!(eval.num_candidate(), 15);
    eval.save_diff(&diff).unwrap();
    assert_eq!(fs::read_to_string(&diff).unwrap(), "");

    // drop the first tagged line: one hunk, headed by both paths
    let reference = fs::read_to_string("tests/data/reference.tsv").unwrap();
    let shortened: String = reference.lines().skip(1).map(|l| format!("{l}\n")).collect();
    fs::write(&output, shortened).unwrap();
    let eval = Evaluation::from_paths(&output, "tests/data/reference.tsv").unwrap();
    eval.save_diff(&diff).unwrap();
    let text = fs::read_to_string(&diff).unwrap();
    let header = format!(
        "--- {}\n+++ tests/data/reference.tsv\n@@ -1,",
        output.display()
    );
    assert!(text.starts_with(&header), "{text}");
    assert_eq!(text.lines().filter(|l| l.starts_with("@@ ")).count(), 1);
    let first = reference.lines().next().unwrap();
    assert!(text.contains(&format!("\n+{first}\n")), "{text}");
}
