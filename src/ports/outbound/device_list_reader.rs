use crate::shared::Result;
use crate::vulnerability_scanning::domain::ScanTarget;
use std::path::Path;

/// DeviceListReader port for loading the devices of a batch scan
///
/// This port abstracts where the CLI's device list comes from.
pub trait DeviceListReader {
    /// Reads and validates the device list at `path`
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file is missing, a symlink or too large
    /// - The content is not a valid device list
    /// - A device has a blank brand, model or version
    fn read_device_list(&self, path: &Path) -> Result<Vec<ScanTarget>>;
}
