use actix_web::web;

use crate::handlers::certifications;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/certifications")
            .service(
                web::resource("")
                    .route(web::get().to(certifications::list_certifications))
                    .route(web::post().to(certifications::create_certification)),
            )
            .service(
                web::resource("/{id}")
                    .route(web::get().to(certifications::get_certification))
                    .route(web::put().to(certifications::update_certification))
                    .route(web::delete().to(certifications::delete_certification)),
            ),
    );
}
