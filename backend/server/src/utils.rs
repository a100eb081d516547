use readings::{NewInspection, Readings};
use serde::Deserialize;
#[cfg(feature = "verbose")]
use tracing::info;

use crate::error::AppError;

/// Body of `POST /api/inspections` before validation. `null` counts as absent.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct InspectionPayload {
    pub package_id: Option<String>,
    pub temperature: Option<f64>,
    pub weight: Option<f64>,
    pub is_sealed: Option<bool>,
    pub image_data: Option<String>,
}

pub fn get_inspection_from_payload(payload: InspectionPayload) -> Result<NewInspection, AppError> {
    let InspectionPayload {
        package_id,
        temperature,
        weight,
        is_sealed,
        image_data,
    } = payload;

    let (Some(package_id), Some(temperature), Some(weight), Some(is_sealed)) =
        (package_id, temperature, weight, is_sealed)
    else {
        return Err(AppError::MissingFields);
    };

    if package_id.is_empty() {
        return Err(AppError::MissingFields);
    }

    #[cfg(feature = "verbose")]
    info!(
        package_id = %package_id,
        temperature,
        weight,
        is_sealed,
        image_bytes = image_data.as_ref().map_or(0, String::len),
        "Inspection payload"
    );

    let readings = Readings {
        temperature,
        weight,
        is_sealed,
    };

    Ok(NewInspection::evaluate(package_id, readings, image_data))
}
