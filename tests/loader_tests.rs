mod common;

use rstest::rstest;
use std::io::{Cursor, Write};
use strokeforge::error::StrokeForgeError;
use strokeforge::geometry::{Coord, Finger};
use strokeforge::scorer::loader::{
    load_ngrams, load_ngrams_file, load_speed_samples, write_speed_samples, CorpusCache,
};
use strokeforge::scorer::{SpeedSample, Tristroke};
use tempfile::NamedTempFile;

const NGRAMS: &str = "e\t120\nt\t80\nth\t40\nthe\t30\nand\t12\nhe\t25\nthe\t5\n";

#[test]
fn test_load_ngrams_splits_by_length() {
    let corpus = load_ngrams(Cursor::new(NGRAMS)).unwrap();
    assert_eq!(corpus.key_counts[&'e'], 120);
    assert_eq!(corpus.key_counts[&'t'], 80);
    assert_eq!(corpus.bigrams, vec![(['t', 'h'], 40), (['h', 'e'], 25)]);
    // duplicates merge before ordering
    assert_eq!(corpus.trigrams, vec![(['t', 'h', 'e'], 35), (['a', 'n', 'd'], 12)]);
    assert_eq!(corpus.trigram_total(), 47);
}

#[test]
fn test_load_ngrams_skips_bad_rows() {
    let data = "the\t10\nbroken\n\t5\nxyz\tmany\nlonger\t3\nab\t-2\nqu\t4\n";
    let corpus = load_ngrams(Cursor::new(data)).unwrap();
    assert_eq!(corpus.trigrams, vec![(['t', 'h', 'e'], 10)]);
    assert_eq!(corpus.bigrams, vec![(['q', 'u'], 4)]);
    assert!(corpus.key_counts.is_empty());
}

#[test]
fn test_load_ngrams_keeps_quotes_and_case() {
    let corpus = load_ngrams(Cursor::new("'s \t7\nTh\t2\n")).unwrap();
    assert_eq!(corpus.trigrams, vec![(['\'', 's', ' '], 7)]);
    assert_eq!(corpus.bigrams, vec![(['T', 'h'], 2)]);
}

#[rstest]
#[case("")]
#[case("nothing here\n")]
#[case("abcd\t4\nx\tone\n")]
fn test_load_ngrams_rejects_empty_tables(#[case] data: &str) {
    let err = load_ngrams(Cursor::new(data)).unwrap_err();
    assert!(matches!(err, StrokeForgeError::Validation(_)));
}

#[test]
fn test_load_ngrams_missing_file() {
    let err = load_ngrams_file("/definitely/not/here.tsv").unwrap_err();
    assert!(matches!(err, StrokeForgeError::Io(_)));
}

#[test]
fn test_corpus_cache_reuses_loads() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(NGRAMS.as_bytes()).unwrap();

    let mut cache = CorpusCache::new();
    assert!(cache.is_empty());
    let full = cache.get_or_load(file.path(), 0).unwrap();
    let again = cache.get_or_load(file.path(), 0).unwrap();
    assert!(std::sync::Arc::ptr_eq(&full, &again));
    assert_eq!(cache.len(), 1);

    let top = cache.get_or_load(file.path(), 1).unwrap();
    assert_eq!(top.trigrams, vec![(['t', 'h', 'e'], 35)]);
    assert_eq!(full.trigrams.len(), 2);
    assert_eq!(cache.len(), 2);
}

const SPEEDS: &str = "\
note,finger0,finger1,finger2,x0,y0,x1,y1,x2,y2
roll,LP,LR,LM,0,1,1,1,2,1,90,110,95,105
,RI,RI,RM,6,0,6,1,7,1,150,120,160
bad,XX,LR,LM,0,1,1,1,2,1,90,110
short,LP,LR
nan,LP,LR,LM,0,1,1,1,2,1,90,fast
";

#[test]
fn test_load_speed_samples() {
    let samples = load_speed_samples(Cursor::new(SPEEDS)).unwrap();
    assert_eq!(samples.len(), 3);

    let roll = Tristroke::new(
        [Finger::LP, Finger::LR, Finger::LM],
        [Coord::new(0.0, 1.0), Coord::new(1.0, 1.0), Coord::new(2.0, 1.0)],
    );
    assert_eq!(samples[0].stroke, roll);
    assert_eq!((samples[0].first_ms, samples[0].second_ms), (90.0, 110.0));
    assert_eq!((samples[1].first_ms, samples[1].second_ms), (95.0, 105.0));
    assert_eq!(samples[0].note.as_deref(), Some("roll"));

    // the unpaired trailing value is dropped
    assert_eq!(samples[2].stroke.fingers, [Finger::RI, Finger::RI, Finger::RM]);
    assert_eq!((samples[2].first_ms, samples[2].second_ms), (150.0, 120.0));
    assert_eq!(samples[2].note, None);
}

#[test]
fn test_speed_samples_survive_a_write() {
    let layout = common::qwerty();
    let mut samples = vec![
        SpeedSample::new(layout.tristroke(['a', 's', 'd']).unwrap(), 80.5, 92.25),
        SpeedSample::new(layout.tristroke(['j', 'u', 'm']).unwrap(), 140.0, 133.0),
    ];
    samples[1].note = Some("sfb".to_string());

    let mut buf = Vec::new();
    write_speed_samples(&mut buf, &samples).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();
    assert!(text.starts_with("note,finger0,finger1,finger2,x0,y0"));

    let loaded = load_speed_samples(Cursor::new(buf)).unwrap();
    assert_eq!(loaded, samples);
}
