use actix_web::web::*;

use crate::handlers::budget;

use super::{account, category, transaction};

pub fn configure(cfg: &mut ServiceConfig) {
    cfg.service(
        scope("/budgets")
            .service(
                resource("")
                    .route(get().to(budget::get_all))
                    .route(post().to(budget::create)),
            )
            .service(
                resource("/{budget_id}")
                    .route(get().to(budget::get))
                    .route(patch().to(budget::edit))
                    .route(delete().to(budget::delete)),
            )
            .service(resource("/{budget_id}/month").route(get().to(budget::get_month)))
            .configure(account::configure)
            .configure(category::configure)
            .configure(transaction::configure),
    );
}
