use std::env;
use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{App, HttpServer, web};
use backend::classifier::ImageClassifier;
use backend::classifier::onnx::OnnxClassifier;
use backend::location::geo_service::GeoService;
use backend::notify::sms_service::SmsService;
use backend::routes::configure_routes;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    dotenv::dotenv().ok();

    let model_path = env::var("MODEL_PATH").unwrap_or_else(|_| "./model/model.onnx".to_string());
    let class_list_path =
        env::var("CLASS_LIST_PATH").unwrap_or_else(|_| "./model/class_list.txt".to_string());

    let classifier = match OnnxClassifier::new(&model_path, &class_list_path) {
        Ok(classifier) => classifier,
        Err(e) => {
            log::error!("Failed to preload model at startup: {:?}", e);
            return Err(std::io::Error::new(
                std::io::ErrorKind::Other,
                format!("Model loading failed: {:?}", e),
            ));
        }
    };
    let classifier: Arc<dyn ImageClassifier> = Arc::new(classifier);

    // Twilio credentials and the alert numbers
    let account_sid = env::var("TWILIO_ACCOUNT_SID").unwrap();
    let auth_token = env::var("TWILIO_AUTH_TOKEN").unwrap();
    let alert_to = env::var("ALERT_TO_NUMBER").unwrap();
    let alert_from = env::var("ALERT_FROM_NUMBER").unwrap();

    let geo_endpoint =
        env::var("GEO_ENDPOINT").unwrap_or_else(|_| "https://ipinfo.io/json".to_string());
    let sms_api_base =
        env::var("TWILIO_API_BASE").unwrap_or_else(|_| "https://api.twilio.com".to_string());
    let allowed_origin =
        env::var("ALLOWED_ORIGIN").unwrap_or_else(|_| "http://localhost:5173".to_string());

    let http_client = reqwest::Client::new();
    let geo_service = GeoService::new(http_client.clone(), geo_endpoint);
    let sms_service = SmsService::new(
        http_client,
        sms_api_base,
        account_sid,
        auth_token,
        alert_to,
        alert_from,
    );

    let port = env::var("PORT").unwrap_or_else(|_| "8000".to_string());
    let bind_address = format!("0.0.0.0:{}", port);

    log::info!("Starting server on {}", bind_address);

    HttpServer::new(move || {
        App::new()
            .wrap(
                Cors::default()
                    .allowed_origin(&allowed_origin)
                    .allow_any_method()
                    .allow_any_header()
                    .supports_credentials()
                    .max_age(3600),
            )
            .app_data(web::Data::from(classifier.clone()))
            .app_data(web::Data::new(geo_service.clone()))
            .app_data(web::Data::new(sms_service.clone()))
            .configure(configure_routes)
    })
    .bind(&bind_address)?
    .run()
    .await
}
