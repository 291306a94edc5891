use serde::Serialize;
use std::collections::HashMap;

/// Key carrying the thermal metadata schema version
pub const THERMAL_METADATA_METAVERSION: &str = "com.parrot.thermal.metaversion";

/// Key carrying the thermal/visible alignment descriptor
pub const THERMAL_METADATA_ALIGNMENT: &str = "com.parrot.thermal.alignment";

/// Metadata pairs as the demuxer reports them, in iteration order
pub type RawMetadata = Vec<(Vec<u8>, Vec<u8>)>;

/// Decoded metadata returned to callers
pub type MetadataMap = HashMap<String, String>;

/// Picture format of an embedded cover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CoverType {
    Jpeg,
    Png,
    Bmp,
}

impl CoverType {
    /// Map the native enumeration value, `None` for unknown values.
    pub fn from_raw(value: i32) -> Option<Self> {
        match value {
            0 => Some(CoverType::Jpeg),
            1 => Some(CoverType::Png),
            2 => Some(CoverType::Bmp),
            _ => None,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            CoverType::Jpeg => "JPEG",
            CoverType::Png => "PNG",
            CoverType::Bmp => "BMP",
        }
    }

    pub fn extension(&self) -> &str {
        match self {
            CoverType::Jpeg => "jpg",
            CoverType::Png => "png",
            CoverType::Bmp => "bmp",
        }
    }
}

/// Cover picture embedded in the file metadata
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cover {
    pub kind: CoverType,
    pub data: Vec<u8>,
}

/// The two reserved thermal keys, looked up but not interpreted
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ThermalMetadata {
    pub metaversion: Option<String>,
    pub alignment: Option<String>,
}

impl ThermalMetadata {
    pub fn from_map(map: &MetadataMap) -> Self {
        Self {
            metaversion: map.get(THERMAL_METADATA_METAVERSION).cloned(),
            alignment: map.get(THERMAL_METADATA_ALIGNMENT).cloned(),
        }
    }

    /// True when the file carries at least one of the thermal keys.
    pub fn is_thermal(&self) -> bool {
        self.metaversion.is_some() || self.alignment.is_some()
    }
}
