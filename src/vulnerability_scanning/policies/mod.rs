mod finding_defaults;

pub use finding_defaults::FindingDefaults;
