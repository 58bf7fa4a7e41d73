use actix_web::web::*;

use crate::handlers::error;

mod account;
mod allocation;
mod budget;
mod category;
mod envelope;
mod health;
mod transaction;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/api")
            .app_data(error::json_config())
            .app_data(error::query_config())
            .app_data(error::path_config())
            .configure(budget::configure)
            .configure(health::configure),
    );
}
