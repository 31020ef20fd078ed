//! cartesian enumeration of bases x perturbations x masks

use std::fs;
use std::path::{Path, PathBuf};

use crate::composite::composite;
use crate::error::Result;
use crate::loader;

fn entries(dir: &Path) -> Result<Vec<PathBuf>> {
    Ok(fs::read_dir(dir)?
        .filter_map(|entry| Some(entry.ok()?.path()))
        .collect())
}

fn load_or_skip<T>(loaded: Result<Option<T>>, path: &Path) -> Option<T> {
    match loaded {
        Ok(Some(value)) => Some(value),
        Ok(None) => None,
        Err(e) => {
            log::error!("Skipping {:?} due to error: {}", path, e);
            None
        }
    }
}

/// composites every base x perturbation x mask combination found in the
/// three directories, persisting each result to `output_dir` as
/// `<base>_<perturbation>_<mask>.png`. returns the number of composites
/// written.
///
/// combinations are independent: a load failure or a dimension mismatch
/// skips that combination and the enumeration continues. the naming scheme
/// is injective over the identity triple, so re-runs and interrupted runs
/// only ever overwrite a file with identical content.
pub fn permute_composites(
    base_dir: &Path,
    overlay_dir: &Path,
    mask_dir: &Path,
    output_dir: &Path,
    alpha: f64,
) -> Result<usize> {
    log::info!(
        "Compositing bases from {:?} with perturbations from {:?} and masks from {:?}",
        base_dir,
        overlay_dir,
        mask_dir
    );

    let base_paths = entries(base_dir)?;
    let overlay_paths = entries(overlay_dir)?;
    let mask_paths = entries(mask_dir)?;

    let mut written = 0;
    for base_path in &base_paths {
        let Some((base, base_identity)) = load_or_skip(loader::load_rgb(base_path), base_path)
        else {
            continue;
        };

        for overlay_path in &overlay_paths {
            let Some((overlay, overlay_identity)) =
                load_or_skip(loader::load_rgb(overlay_path), overlay_path)
            else {
                continue;
            };

            for mask_path in &mask_paths {
                let Some((mask, mask_identity)) =
                    load_or_skip(loader::load_luma(mask_path), mask_path)
                else {
                    continue;
                };

                let blended = match composite(&base, &overlay, &mask, alpha) {
                    Ok(blended) => blended,
                    Err(e) => {
                        log::error!(
                            "Skipping {}_{}_{}: {}",
                            base_identity,
                            overlay_identity,
                            mask_identity,
                            e
                        );
                        continue;
                    }
                };

                let output_path = output_dir.join(format!(
                    "{}_{}_{}.png",
                    base_identity, overlay_identity, mask_identity
                ));
                blended.save(&output_path)?;
                log::debug!("Saved composite to {:?}", output_path);
                written += 1;
            }
        }
    }

    log::info!("Wrote {} composites to {:?}", written, output_dir);
    Ok(written)
}
