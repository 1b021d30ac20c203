mod domain;
mod infrastructure;
mod interfaces;
pub mod errors;
pub mod graceful_shutdown;
pub mod settings;

pub use domain::{entities, use_cases};
pub use infrastructure::{auth, db, media, utils};
pub use interfaces::{handlers, middlewares, repositories, routes};

use auth::jwt::JwtService;
use media::cloudinary::CloudinaryClient;
use repositories::sqlx_repo::{SqlxCertificationRepo, SqlxProjectRepo, SqlxUserRepo};
use use_cases::auth::AuthHandler;
use use_cases::certifications::CertificationHandler;
use use_cases::projects::ProjectHandler;

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppProjectHandler = ProjectHandler<SqlxProjectRepo, CloudinaryClient>;
pub type AppCertificationHandler = CertificationHandler<SqlxCertificationRepo, CloudinaryClient>;

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub project_handler: AppProjectHandler,
    pub certification_handler: AppCertificationHandler,
}

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Self {
        let jwt_service = JwtService::new(config);
        let media = CloudinaryClient::new(config);

        let auth_handler = AuthHandler::new(SqlxUserRepo::new(pool.clone()), jwt_service);
        let project_handler =
            ProjectHandler::new(SqlxProjectRepo::new(pool.clone()), media.clone());
        let certification_handler =
            CertificationHandler::new(SqlxCertificationRepo::new(pool), media);

        AppState {
            auth_handler,
            project_handler,
            certification_handler,
        }
    }
}
