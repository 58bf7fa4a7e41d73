use actix_web::web::*;

use crate::handlers::account;

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/{budget_id}/accounts")
            .service(
                resource("")
                    .route(get().to(account::get_all))
                    .route(post().to(account::create)),
            )
            .service(
                resource("/{account_id}")
                    .route(get().to(account::get))
                    .route(patch().to(account::edit))
                    .route(delete().to(account::delete)),
            ),
    );
}
