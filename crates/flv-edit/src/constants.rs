//! Metadata keys written into the `onMetaData` tag.

pub const METADATA_DURATION: &str = "duration";
pub const METADATA_LASTTIMESTAMP: &str = "lasttimestamp";
pub const METADATA_METADATACREATOR: &str = "metadatacreator";
pub const METADATA_KEYFRAMES: &str = "keyframes";

// keyframes object
pub const KEYFRAMES_TIMES: &str = "times";
pub const KEYFRAMES_FILEPOSITIONS: &str = "filepositions";

pub const DEFAULT_CREATOR: &str = "flvtool by flv-edit";
