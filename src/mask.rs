//! batch mask generation over a directory of procedural noises

use std::fs;
use std::path::Path;

use crate::error::Result;
use crate::gamma::GammaSearch;
use crate::loader;

/// decile brightness levels used when no explicit targets are configured
pub const DEFAULT_TARGETS: [f64; 8] = [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8];

/// formats the lightness suffix for a target level. the target is scaled to
/// a percentage and truncated, so callers should supply clean decile values.
pub fn level_suffix(target: f64) -> String {
    format!("L{:02}", (target * 100.0) as u32)
}

/// runs the gamma search against every recognized image in `source_dir` for
/// every level in `targets`, persisting each mask to `output_dir` as
/// `<identity>_L<NN>.png`. returns the number of masks written.
///
/// non-image files are skipped silently; unreadable images are logged and
/// skipped. re-running with the same inputs overwrites identical outputs.
pub fn generate_masks(source_dir: &Path, output_dir: &Path, targets: &[f64]) -> Result<usize> {
    log::info!("Starting mask generation for directory: {:?}", source_dir);

    let mut written = 0;
    for entry in fs::read_dir(source_dir)? {
        let path = entry?.path();
        let (image, identity) = match loader::load_luma(&path) {
            Ok(Some(loaded)) => loaded,
            Ok(None) => continue,
            Err(e) => {
                log::error!("Skipping {:?} due to error: {}", path, e);
                continue;
            }
        };

        log::debug!("Processing noise: {:?}", path);
        for &target in targets {
            let mask = GammaSearch::with_target(target).mask(&image)?;
            let mask_path = output_dir.join(format!("{}_{}.png", identity, level_suffix(target)));
            mask.save(&mask_path)?;
            log::debug!("Saved mask to {:?}", mask_path);
            written += 1;
        }
    }

    log::info!("Wrote {} masks to {:?}", written, output_dir);
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_suffix_truncates() {
        assert_eq!(level_suffix(0.1), "L10");
        assert_eq!(level_suffix(0.5), "L50");
        assert_eq!(level_suffix(0.8), "L80");
        // truncation, not rounding
        assert_eq!(level_suffix(0.085), "L08");
    }
}
