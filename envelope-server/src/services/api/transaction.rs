use actix_web::web::*;

use crate::handlers::transaction;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/{budget_id}/transactions")
            .service(
                resource("")
                    .route(get().to(transaction::get_all))
                    .route(post().to(transaction::create)),
            )
            .service(
                resource("/{transaction_id}")
                    .route(get().to(transaction::get))
                    .route(patch().to(transaction::edit))
                    .route(delete().to(transaction::delete)),
            ),
    );
}
