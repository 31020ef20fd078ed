//! aggregation of detector verdicts by composite name tags

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use crate::error::Result;

/// one row of the detector's csv output: composite file name, shannon
/// entropy of the reconstructed perturbation, and the detection verdict.
/// rows are read positionally, the detector's header names are not a
/// contract.
#[derive(Debug, Clone, Deserialize)]
pub struct DetectionRecord {
    pub file_name: String,
    pub entropy: f64,
    pub detected: String,
}

impl DetectionRecord {
    /// the detector emits stringified tensors in the verdict column
    pub fn is_detected(&self) -> bool {
        self.detected == "tensor(True)"
    }
}

/// tags recovered from a composite file name of the form
/// `<base>_<noise>_<procedural>_L<NN>.png`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeTags {
    pub noise: String,
    pub mask: String,
    pub lightness: String,
}

impl CompositeTags {
    pub fn parse(file_name: &str) -> Option<Self> {
        let stem = Path::new(file_name).file_stem()?.to_str()?;
        let mut parts = stem.split('_');
        let _base = parts.next()?;
        Some(Self {
            noise: parts.next()?.to_string(),
            mask: parts.next()?.to_string(),
            lightness: parts.next()?.to_string(),
        })
    }
}

/// per-tag accumulation of entropy samples and detection verdicts
#[derive(Debug, Default)]
pub struct TagAccumulator {
    entropy: BTreeMap<String, Vec<f64>>,
    detections: BTreeMap<String, Vec<bool>>,
}

impl TagAccumulator {
    pub fn record(&mut self, tag: &str, entropy: f64, detected: bool) {
        self.entropy.entry(tag.to_string()).or_default().push(entropy);
        self.detections
            .entry(tag.to_string())
            .or_default()
            .push(detected);
    }

    /// mean entropy per tag, in tag order
    pub fn mean_entropy(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entropy.iter().map(|(tag, samples)| {
            (
                tag.as_str(),
                samples.iter().sum::<f64>() / samples.len() as f64,
            )
        })
    }

    /// fraction of detected composites per tag, in tag order
    pub fn detection_rates(&self) -> impl Iterator<Item = (&str, f64)> {
        self.detections.iter().map(|(tag, verdicts)| {
            let detected = verdicts.iter().filter(|&&verdict| verdict).count();
            (tag.as_str(), detected as f64 / verdicts.len() as f64)
        })
    }
}

/// every record grouped three ways along the composite naming contract
#[derive(Debug, Default)]
pub struct DetectionSummary {
    pub by_noise: TagAccumulator,
    pub by_mask: TagAccumulator,
    pub by_lightness: TagAccumulator,
}

/// reads the detector's csv output. the first row is treated as a header
/// and skipped; remaining rows deserialize positionally.
pub fn read_records(path: &Path) -> Result<Vec<DetectionRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut records = Vec::new();
    for row in reader.records() {
        records.push(row?.deserialize(None)?);
    }
    Ok(records)
}

/// groups records by their noise, mask and lightness tags. records whose
/// file name does not carry the full tag triple are logged and skipped.
pub fn summarize(records: &[DetectionRecord]) -> DetectionSummary {
    let mut summary = DetectionSummary::default();
    for record in records {
        let Some(tags) = CompositeTags::parse(&record.file_name) else {
            log::warn!("Skipping unparseable file name: {}", record.file_name);
            continue;
        };
        let detected = record.is_detected();
        summary.by_noise.record(&tags.noise, record.entropy, detected);
        summary.by_mask.record(&tags.mask, record.entropy, detected);
        summary
            .by_lightness
            .record(&tags.lightness, record.entropy, detected);
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(file_name: &str, entropy: f64, detected: bool) -> DetectionRecord {
        DetectionRecord {
            file_name: file_name.to_string(),
            entropy,
            detected: if detected { "tensor(True)" } else { "tensor(False)" }.to_string(),
        }
    }

    #[test]
    fn parses_the_tag_triple_from_a_composite_name() {
        let tags = CompositeTags::parse("portrait_glaze_perlin_L50.png").unwrap();
        assert_eq!(tags.noise, "glaze");
        assert_eq!(tags.mask, "perlin");
        assert_eq!(tags.lightness, "L50");

        assert!(CompositeTags::parse("portrait_glaze.png").is_none());
    }

    #[test]
    fn summarize_groups_by_each_tag() {
        let records = vec![
            record("a_glaze_perlin_L10.png", 4.0, true),
            record("a_glaze_worley_L10.png", 6.0, false),
            record("b_shade_perlin_L50.png", 2.0, true),
        ];

        let summary = summarize(&records);

        let noise: Vec<_> = summary.by_noise.mean_entropy().collect();
        assert_eq!(noise, vec![("glaze", 5.0), ("shade", 2.0)]);

        let rates: Vec<_> = summary.by_mask.detection_rates().collect();
        assert_eq!(rates, vec![("perlin", 1.0), ("worley", 0.0)]);

        let lightness: Vec<_> = summary.by_lightness.detection_rates().collect();
        assert_eq!(lightness, vec![("L10", 0.5), ("L50", 1.0)]);
    }

    #[test]
    fn unparseable_names_are_skipped() {
        let records = vec![record("orphan.png", 1.0, true)];
        let summary = summarize(&records);
        assert_eq!(summary.by_noise.mean_entropy().count(), 0);
    }
}
