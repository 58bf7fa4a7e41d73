use actix_web::web::*;

use crate::handlers::category;

use super::envelope;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/{budget_id}/categories")
            .service(
                resource("")
                    .route(get().to(category::get_all))
                    .route(post().to(category::create)),
            )
            .service(
                resource("/{category_id}")
                    .route(get().to(category::get))
                    .route(patch().to(category::edit))
                    .route(delete().to(category::delete)),
            )
            .configure(envelope::configure),
    );
}
