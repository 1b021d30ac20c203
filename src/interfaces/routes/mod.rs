pub mod auth;
pub mod certifications;
pub mod projects;

use actix_web::web;

use crate::handlers::home;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home::home);
    auth::config_routes(cfg);
    projects::config_routes(cfg);
    certifications::config_routes(cfg);
}
