pub mod fees;
pub mod health;
pub mod records;
pub mod reports;
pub mod schedules;

use actix_web::web;

/// Register every module's routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    health::controllers::configure(cfg);
    fees::controllers::configure(cfg);
    reports::controllers::configure(cfg);
    schedules::controllers::configure(cfg);
}
