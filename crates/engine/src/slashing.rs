use corebeam_slashing::{AttesterSlashingDetector, FinalityEquivocationDetector, SlashingConfig};

/// Both equivocation detectors live behind one lock: the design groups
/// "slashing detectors" as a single component sharing one readers-writer
/// lock (§5), distinct from the finality engine and fork-choice store.
#[derive(Debug)]
pub struct SlashingDetectors {
    pub attester: AttesterSlashingDetector,
    pub finality: FinalityEquivocationDetector,
}

impl SlashingDetectors {
    pub fn new(config: SlashingConfig) -> Self {
        Self { attester: AttesterSlashingDetector::new(config), finality: FinalityEquivocationDetector::new() }
    }
}
