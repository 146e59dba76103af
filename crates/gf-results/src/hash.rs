//! Content-based hashing for run IDs.

use gf_project::ModelDef;
use sha2::{Digest, Sha256};

pub fn compute_run_id(model: &ModelDef, engine_version: &str) -> String {
    let mut hasher = Sha256::new();

    let model_json = serde_json::to_string(model).unwrap_or_default();
    hasher.update(model_json.as_bytes());
    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    format!("{:x}", result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_is_stable() {
        let model = ModelDef::new("venlo");
        let a = compute_run_id(&model, "v1");
        let b = compute_run_id(&model, "v1");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn hash_tracks_model_changes() {
        let base = ModelDef::new("venlo");
        let mut changed = base.clone();
        changed.greenhouse.geometry.floor_area_m2 *= 2.0;
        assert_ne!(
            compute_run_id(&base, "v1"),
            compute_run_id(&changed, "v1")
        );
        assert_ne!(
            compute_run_id(&base, "v1"),
            compute_run_id(&base, "v2")
        );
    }
}
