use crate::error::{ClientError, ClientResult};

/// Unit mode for a zone's pixel-count thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneUnits {
    Percent,
    Pixels,
}

impl ZoneUnits {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Percent" => Some(ZoneUnits::Percent),
            "Pixels" => Some(ZoneUnits::Pixels),
            _ => None,
        }
    }
}

/// Threshold parameters whose value is a count of pixels that may
/// alternatively be expressed as a fraction of the zone's polygon area.
/// Everything else passes through unconverted regardless of unit mode.
pub const AREA_SCALED_PARAMS: &[&str] = &[
    "MinAlarmPixels",
    "MaxAlarmPixels",
    "MinFilterPixels",
    "MaxFilterPixels",
    "MinBlobPixels",
    "MaxBlobPixels",
];

pub fn is_area_scaled(name: &str) -> bool {
    AREA_SCALED_PARAMS.contains(&name)
}

/// Convert a user-supplied threshold value into the absolute pixel count the
/// server stores, using the zone's polygon area as the reference quantity.
pub fn convert_write(units: ZoneUnits, name: &str, value: &str, area: u64) -> ClientResult<String> {
    if !is_area_scaled(name) {
        return Ok(value.to_string());
    }
    let number = value
        .trim()
        .parse::<f64>()
        .map_err(|err| ClientError::parse(format!("value for {name}"), err))?;
    if number < 0.0 {
        return Err(ClientError::range(format!("{name} must not be negative")));
    }
    match units {
        ZoneUnits::Percent => {
            if number > 100.0 {
                return Err(ClientError::range(format!(
                    "{name} is {number}% of the zone but a percentage cannot exceed 100"
                )));
            }
            let pixels = (area as f64 * number / 100.0).round() as u64;
            Ok(pixels.to_string())
        }
        ZoneUnits::Pixels => {
            if number > area as f64 {
                return Err(ClientError::range(format!(
                    "{name} is {number} pixels but the zone only covers {area}"
                )));
            }
            Ok(value.trim().to_string())
        }
    }
}

/// Format a stored threshold for display. In percent mode the stored pixel
/// count is converted back to a percentage of the zone area; an absent stored
/// value emits nothing rather than zero.
pub fn display_read(
    units: ZoneUnits,
    name: &str,
    stored: Option<&str>,
    area: u64,
) -> ClientResult<Option<String>> {
    let Some(stored) = stored else {
        return Ok(None);
    };
    if stored.trim().is_empty() {
        return Ok(None);
    }
    if !is_area_scaled(name) || units == ZoneUnits::Pixels {
        return Ok(Some(stored.to_string()));
    }
    let pixels = stored
        .trim()
        .parse::<f64>()
        .map_err(|err| ClientError::parse(format!("stored value for {name}"), err))?;
    if area == 0 {
        return Ok(Some(stored.to_string()));
    }
    let percent = pixels * 100.0 / area as f64;
    Ok(Some(format!("{percent:.2}")))
}
