use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::JsonPayloadError,
    web, Error, HttpRequest,
};
use futures_util::future::LocalBoxFuture;
use std::future::{ready, Ready};
use std::rc::Rc;

use crate::core::AppError;

/// Logs every failed request and every 5xx response with method and path
pub struct ErrorLogger;

impl<S, B> Transform<S, ServiceRequest> for ErrorLogger
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = ErrorLoggerMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(ErrorLoggerMiddleware {
            service: Rc::new(service),
        }))
    }
}

pub struct ErrorLoggerMiddleware<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for ErrorLoggerMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let method = req.method().clone();
        let path = req.path().to_string();

        Box::pin(async move {
            let result = service.call(req).await;

            match &result {
                Err(err) => {
                    tracing::error!(method = %method, path = %path, error = %err, "Request failed");
                }
                Ok(res) if res.status().is_server_error() => {
                    tracing::error!(
                        method = %method,
                        path = %path,
                        status = %res.status(),
                        "Request ended with server error"
                    );
                }
                Ok(_) => {}
            }

            result
        })
    }
}

/// Map a rejected JSON body to the standard error envelope.
///
/// Body fields that are parsed into configuration types (export format, report type)
/// report their own error kind; anything else is a validation error.
fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> Error {
    let app_error = match &err {
        JsonPayloadError::Deserialize(inner) => {
            let message = inner.to_string();
            if message.starts_with("Invalid configuration: ") {
                AppError::invalid_config(message.trim_start_matches("Invalid configuration: "))
            } else {
                AppError::validation(format!("Invalid request body: {}", message))
            }
        }
        other => AppError::validation(format!("Invalid request body: {}", other)),
    };
    app_error.into()
}

/// JSON extractor settings shared by every route
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(256 * 1024)
        .error_handler(json_error)
}
