use std::fmt;

use crate::error::{ClientError, ClientResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Monitor,
    Zone,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Monitor => write!(f, "monitor"),
            EntityKind::Zone => write!(f, "zone"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub readable: bool,
    pub writable: bool,
    pub domain: Option<&'static [&'static str]>,
}

const fn param(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        readable: true,
        writable: true,
        domain: None,
    }
}

const fn read_only(name: &'static str) -> ParamSpec {
    ParamSpec {
        name,
        readable: true,
        writable: false,
        domain: None,
    }
}

const fn restricted(name: &'static str, domain: &'static [&'static str]) -> ParamSpec {
    ParamSpec {
        name,
        readable: true,
        writable: true,
        domain: Some(domain),
    }
}

pub const MONITOR_FUNCTIONS: &[&str] = &["None", "Monitor", "Modect", "Record", "Mocord", "Nodect"];

/// Reserved pseudo-parameter: reading it on a monitor enumerates the owned
/// zone collection instead of a scalar field.
pub const ZONE_LIST_PARAM: &str = "Zones";

const MONITOR_PARAMS: &[ParamSpec] = &[
    param("Name"),
    restricted("Function", MONITOR_FUNCTIONS),
    restricted("Enabled", &["0", "1"]),
    restricted(
        "Type",
        &["Local", "Remote", "File", "Ffmpeg", "Libvlc", "cURL"],
    ),
    param("Protocol"),
    param("Method"),
    param("Host"),
    param("Port"),
    param("Path"),
    param("Width"),
    param("Height"),
    restricted("Colours", &["1", "3", "4"]),
    param("MaxFPS"),
    param("AlarmMaxFPS"),
    param("RefBlendPerc"),
    read_only("Sequence"),
];

const ZONE_PARAMS: &[ParamSpec] = &[
    param("Name"),
    restricted(
        "Type",
        &[
            "Active",
            "Inclusive",
            "Exclusive",
            "Preclusive",
            "Inactive",
            "Privacy",
        ],
    ),
    restricted("Units", &["Percent", "Pixels"]),
    restricted(
        "CheckMethod",
        &["AlarmedPixels", "FilteredPixels", "Blobs"],
    ),
    param("Coords"),
    read_only("Area"),
    param("AlarmRGB"),
    param("MinPixelThreshold"),
    param("MaxPixelThreshold"),
    param("MinAlarmPixels"),
    param("MaxAlarmPixels"),
    param("FilterX"),
    param("FilterY"),
    param("MinFilterPixels"),
    param("MaxFilterPixels"),
    param("MinBlobPixels"),
    param("MaxBlobPixels"),
    param("MinBlobs"),
    param("MaxBlobs"),
    param("OverloadFrames"),
    param("ExtendAlarmFrames"),
];

pub fn lookup(kind: EntityKind, name: &str) -> Option<&'static ParamSpec> {
    let table = match kind {
        EntityKind::Monitor => MONITOR_PARAMS,
        EntityKind::Zone => ZONE_PARAMS,
    };
    table.iter().find(|spec| spec.name == name)
}

pub fn validate_read(kind: EntityKind, name: &str) -> ClientResult<()> {
    if kind == EntityKind::Monitor && name == ZONE_LIST_PARAM {
        return Ok(());
    }
    match lookup(kind, name) {
        Some(spec) if spec.readable => Ok(()),
        _ => Err(ClientError::unknown_parameter(kind, name)),
    }
}

pub fn validate_write(kind: EntityKind, name: &str, value: &str) -> ClientResult<()> {
    let spec = match lookup(kind, name) {
        Some(spec) if spec.writable => spec,
        _ => return Err(ClientError::unknown_parameter(kind, name)),
    };
    if value.trim().is_empty() {
        return Err(ClientError::EmptyValue {
            name: name.to_string(),
        });
    }
    if let Some(domain) = spec.domain {
        if !domain.contains(&value) {
            return Err(ClientError::InvalidEnumValue {
                name: name.to_string(),
                value: value.to_string(),
                allowed: domain.join(", "),
            });
        }
    }
    Ok(())
}

/// Split a command-surface token into its Name:Value parts. A bare name with
/// no delimiter, or an empty value after it, is a validation failure.
pub fn parse_assignment(token: &str) -> ClientResult<(&str, &str)> {
    let (name, value) = token.split_once(':').ok_or_else(|| ClientError::EmptyValue {
        name: token.to_string(),
    })?;
    if value.trim().is_empty() {
        return Err(ClientError::EmptyValue {
            name: name.to_string(),
        });
    }
    Ok((name, value))
}
