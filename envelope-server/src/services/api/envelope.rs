use actix_web::web::*;

use crate::handlers::envelope;

use super::allocation;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/{category_id}/envelopes")
            .service(
                resource("")
                    .route(get().to(envelope::get_all))
                    .route(post().to(envelope::create)),
            )
            .service(
                resource("/{envelope_id}")
                    .route(get().to(envelope::get))
                    .route(patch().to(envelope::edit))
                    .route(delete().to(envelope::delete)),
            )
            .service(resource("/{envelope_id}/month").route(get().to(envelope::get_month)))
            .configure(allocation::configure),
    );
}
