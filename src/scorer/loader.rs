use crate::corpus::Corpus;
use crate::error::{SfResult, StrokeForgeError};
use crate::geometry::{Coord, Finger};
use crate::scorer::speed::SpeedSample;
use crate::scorer::stroke::Tristroke;
use std::collections::HashMap;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

const SPEED_HEADER: [&str; 10] = [
    "note", "finger0", "finger1", "finger2", "x0", "y0", "x1", "y1", "x2", "y2",
];

/// Reads `ngram<TAB>count` lines. 1-grams become key counts. Rows that do
/// not parse are skipped; a table with no usable rows is an error.
pub fn load_ngrams<R: Read>(reader: R) -> SfResult<Corpus> {
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut corpus = Corpus::new();
    let mut lines_read = 0;
    let mut skipped = 0;

    for result in rdr.records() {
        lines_read += 1;
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                debug!("[Row {}] TSV Parse Error: {}", lines_read, e);
                skipped += 1;
                continue;
            }
        };
        if rec.len() < 2 || rec[0].is_empty() {
            skipped += 1;
            continue;
        }
        let count: u64 = match rec[1].trim().parse() {
            Ok(v) => v,
            Err(_) => {
                skipped += 1;
                continue;
            }
        };
        if !corpus.add(&rec[0], count) {
            skipped += 1;
        }
    }
    corpus.finish();

    debug!(
        "Scanned {} lines ({} skipped). Loaded: {} keys, {} 2-grams, {} 3-grams.",
        lines_read,
        skipped,
        corpus.key_counts.len(),
        corpus.bigrams.len(),
        corpus.trigrams.len()
    );

    if corpus.is_empty() {
        return Err(StrokeForgeError::Validation(
            "N-gram table contains no usable rows".to_string(),
        ));
    }
    Ok(corpus)
}

pub fn load_ngrams_file<P: AsRef<Path>>(path: P) -> SfResult<Corpus> {
    info!("Loading n-grams from {}", path.as_ref().display());
    load_ngrams(File::open(path)?)
}

/// Loaded corpora keyed by (file, trigram precision).
#[derive(Debug, Default)]
pub struct CorpusCache {
    entries: HashMap<(PathBuf, usize), Arc<Corpus>>,
}

impl CorpusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_or_load<P: AsRef<Path>>(&mut self, path: P, precision: usize) -> SfResult<Arc<Corpus>> {
        let key = (path.as_ref().to_path_buf(), precision);
        if let Some(corpus) = self.entries.get(&key) {
            return Ok(corpus.clone());
        }
        let corpus = Arc::new(load_ngrams_file(&key.0)?.with_precision(precision));
        self.entries.insert(key, corpus.clone());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_sample_row(rec: &csv::StringRecord) -> Option<(Tristroke, Option<String>, Vec<f64>)> {
    if rec.len() < SPEED_HEADER.len() {
        return None;
    }
    let mut fingers = [Finger::Unknown; 3];
    for (n, finger) in fingers.iter_mut().enumerate() {
        *finger = Finger::from_str(rec[1 + n].trim()).ok()?;
    }
    let mut coords = [Coord::default(); 3];
    for (n, coord) in coords.iter_mut().enumerate() {
        let x: f64 = rec[4 + 2 * n].trim().parse().ok()?;
        let y: f64 = rec[5 + 2 * n].trim().parse().ok()?;
        *coord = Coord::new(x, y);
    }
    let speeds: Option<Vec<f64>> = rec
        .iter()
        .skip(SPEED_HEADER.len())
        .filter(|s| !s.trim().is_empty())
        .map(|s| s.trim().parse().ok())
        .collect();
    let note = Some(rec[0].to_string()).filter(|n| !n.is_empty());
    Some((Tristroke::new(fingers, coords), note, speeds?))
}

/// Reads timing samples. Each row names a tristroke followed by any number
/// of (first, second) millisecond pairs; an unpaired trailing value is
/// dropped.
pub fn load_speed_samples<R: Read>(reader: R) -> SfResult<Vec<SpeedSample>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut samples = Vec::new();
    let mut skipped = 0;
    for (row_idx, result) in rdr.records().enumerate() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                debug!("[Row {}] CSV Parse Error: {}", row_idx + 1, e);
                skipped += 1;
                continue;
            }
        };
        let Some((stroke, note, speeds)) = parse_sample_row(&rec) else {
            skipped += 1;
            continue;
        };
        for pair in speeds.chunks_exact(2) {
            samples.push(SpeedSample {
                stroke,
                first_ms: pair[0],
                second_ms: pair[1],
                note: note.clone(),
            });
        }
    }

    if skipped > 0 {
        debug!("Skipped {} invalid rows in speed data.", skipped);
    }
    debug!("Loaded {} speed samples", samples.len());
    Ok(samples)
}

pub fn load_speed_samples_file<P: AsRef<Path>>(path: P) -> SfResult<Vec<SpeedSample>> {
    info!("Loading speed samples from {}", path.as_ref().display());
    load_speed_samples(File::open(path)?)
}

/// Writes samples in the format read by [`load_speed_samples`], one row
/// per sample.
pub fn write_speed_samples<W: Write>(writer: W, samples: &[SpeedSample]) -> SfResult<()> {
    let mut wtr = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    wtr.write_record(SPEED_HEADER)?;
    for sample in samples {
        let mut row: Vec<String> = Vec::with_capacity(12);
        row.push(sample.note.clone().unwrap_or_default());
        row.extend(sample.stroke.fingers.iter().map(|f| f.to_string()));
        for c in &sample.stroke.coords {
            row.push(c.x.to_string());
            row.push(c.y.to_string());
        }
        row.push(sample.first_ms.to_string());
        row.push(sample.second_ms.to_string());
        wtr.write_record(&row)?;
    }
    wtr.flush()?;
    Ok(())
}
