use actix_web::web::*;

use crate::handlers::allocation;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/{envelope_id}/allocations")
            .service(
                resource("")
                    .route(get().to(allocation::get_all))
                    .route(post().to(allocation::create)),
            )
            .service(
                resource("/{allocation_id}")
                    .route(get().to(allocation::get))
                    .route(patch().to(allocation::edit))
                    .route(delete().to(allocation::delete)),
            ),
    );
}
