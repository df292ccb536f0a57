use std::io::Write;

use actix_multipart::Multipart;
use actix_web::{Error, HttpResponse, web};
use chrono::Local;
use futures::{StreamExt, TryStreamExt};
use log::{error, info};
use ndarray::Array3;
use serde::Serialize;
use serde_json::json;
use shared::{AlertCategory, PredictResponse};

use crate::classifier::ImageClassifier;
use crate::location::geo_service::GeoService;
use crate::notify::sms_service::SmsService;

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/predict/").route(web::post().to(handle_predict)))
        .service(web::resource("/health").route(web::get().to(health_check)));
}

async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

async fn handle_predict(
    classifier: web::Data<dyn ImageClassifier>,
    geo_service: web::Data<GeoService>,
    sms_service: web::Data<SmsService>,
    mut payload: Multipart,
) -> Result<HttpResponse, Error> {
    info!("Received a file for prediction.");

    let mut image_data = Vec::new();
    while let Ok(Some(mut field)) = payload.try_next().await {
        while let Some(chunk) = field.next().await {
            let data = chunk?;
            image_data.write_all(&data)?;
        }
        if !image_data.is_empty() {
            break;
        }
    }

    if image_data.is_empty() {
        return Ok(HttpResponse::BadRequest().json(ErrorResponse {
            error: "No image data in upload".to_string(),
        }));
    }
    info!("File received: {} bytes", image_data.len());

    let rgb = match image::load_from_memory(&image_data) {
        Ok(decoded) => decoded.to_rgb8(),
        Err(e) => {
            error!("Failed to decode uploaded image: {}", e);
            return Ok(HttpResponse::BadRequest().json(ErrorResponse {
                error: "Uploaded file is not a decodable image".to_string(),
            }));
        }
    };

    let (width, height) = rgb.dimensions();
    let pixels =
        match Array3::from_shape_vec((height as usize, width as usize, 3), rgb.into_raw()) {
            Ok(pixels) => pixels,
            Err(e) => {
                error!("Decoded image has an inconsistent pixel buffer: {}", e);
                return Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Failed to read decoded image".to_string(),
                }));
            }
        };
    info!("Image shape: ({}, {}, 3)", height, width);

    let label = match classifier.predict(&pixels) {
        Ok(prediction) => title_case(&prediction.label),
        Err(e) => {
            error!("Model inference error: {:?}", e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Model inference failed".to_string(),
            }));
        }
    };
    info!("Predicted label: {}", label);

    let timestamp = Local::now().format("%Y-%m-%dT%H:%M:%S%.6f").to_string();

    let (latitude, longitude) = geo_service.lookup().await;

    let mut alert_message = String::new();
    if AlertCategory::match_label(&label).is_some() {
        alert_message = format!(
            "{} alert triggered! Location: Latitude {}, Longitude {}, Timestamp: {}",
            label, latitude, longitude, timestamp
        );
        if let Err(e) = sms_service.send_alert(&alert_message).await {
            error!("Failed to send alert message: {}", e);
            return Ok(HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Failed to send alert".to_string(),
            }));
        }
    }

    Ok(HttpResponse::Ok().json(PredictResponse {
        predicted_label: label,
        alert_message,
        timestamp,
        latitude,
        longitude,
    }))
}

/// First letter of each word upper, the rest lower, single spaces between
/// words. Matches the display form the alert categories are defined in.
fn title_case(label: &str) -> String {
    label
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::title_case;

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("fight on a street"), "Fight On A Street");
    }

    #[test]
    fn title_case_lowercases_the_rest() {
        assert_eq!(title_case("CAR CRASH"), "Car Crash");
        assert_eq!(title_case("Car Crash"), "Car Crash");
    }

    #[test]
    fn title_case_collapses_whitespace() {
        assert_eq!(title_case("  fire   in office "), "Fire In Office");
        assert_eq!(title_case(""), "");
    }
}
