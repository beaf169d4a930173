use actix_web::{web, HttpResponse};
use chrono::Utc;
use serde::Deserialize;

use crate::core::Result;
use crate::modules::schedules::models::ScheduleSettings;
use crate::modules::schedules::services::{ScheduleService, ScheduleTrigger};

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default)]
    pub owner: Option<String>,
}

/// GET /schedules
pub async fn list_schedules(
    service: web::Data<ScheduleService>,
    query: web::Query<ListQuery>,
) -> Result<HttpResponse> {
    let jobs = service.list(query.owner.as_deref()).await?;
    Ok(HttpResponse::Ok().json(jobs))
}

/// POST /schedules
pub async fn create_schedule(
    service: web::Data<ScheduleService>,
    body: web::Json<ScheduleSettings>,
) -> Result<HttpResponse> {
    let job = service.create(body.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Created().json(job))
}

/// GET /schedules/{id}
pub async fn get_schedule(
    service: web::Data<ScheduleService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let job = service.get(&path).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// PUT /schedules/{id}
pub async fn update_schedule(
    service: web::Data<ScheduleService>,
    path: web::Path<String>,
    body: web::Json<ScheduleSettings>,
) -> Result<HttpResponse> {
    let job = service.update(&path, body.into_inner(), Utc::now()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// DELETE /schedules/{id}
pub async fn delete_schedule(
    service: web::Data<ScheduleService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    service.delete(&path).await?;
    Ok(HttpResponse::NoContent().finish())
}

/// POST /schedules/{id}/pause
pub async fn pause_schedule(
    service: web::Data<ScheduleService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let job = service.pause(&path, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /schedules/{id}/resume
pub async fn resume_schedule(
    service: web::Data<ScheduleService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    let job = service.resume(&path, Utc::now()).await?;
    Ok(HttpResponse::Ok().json(job))
}

/// POST /schedules/sweep
///
/// Runs one trigger sweep now; lets an external cron drive the trigger instead of the
/// in-process runner.
pub async fn run_sweep(trigger: web::Data<ScheduleTrigger>) -> Result<HttpResponse> {
    let summary = trigger.sweep(Utc::now()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// Configure routes for schedules module
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/schedules")
            .route("", web::get().to(list_schedules))
            .route("", web::post().to(create_schedule))
            .route("/sweep", web::post().to(run_sweep))
            .route("/{id}", web::get().to(get_schedule))
            .route("/{id}", web::put().to(update_schedule))
            .route("/{id}", web::delete().to(delete_schedule))
            .route("/{id}/pause", web::post().to(pause_schedule))
            .route("/{id}/resume", web::post().to(resume_schedule)),
    );
}
