use actix_web::{web, HttpResponse};
use envelope_common::db::DaoError;
use envelope_common::request_io::{InputTransaction, OutputTransaction, TransactionUpdate};
use envelope_common::store::Store;
use uuid::Uuid;

use crate::handlers::check;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};

pub async fn get_all(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = path.into_inner();
    let store = store.into_inner();

    let transactions = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.get_transactions(&path)
    })
    .await?
    {
        Ok(t) => t,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to get transactions",
            ));
        }
    };

    let transactions = transactions
        .into_iter()
        .map(OutputTransaction::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(transactions))
}

pub async fn create(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    transaction_data: web::Json<InputTransaction>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(transaction_data.validate())?;

    let budget_id = path.into_inner();
    let store = store.into_inner();

    // The outer result is the budget lookup, the inner one the insert
    let transaction = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        Ok::<_, DaoError>(store.create_transaction(&path, &transaction_data))
    })
    .await?
    {
        Ok(Ok(t)) => t,
        Ok(Err(e)) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::AccountOrEnvelope,
                "Failed to create transaction",
            ));
        }
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to create transaction",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputTransaction::from(transaction)))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, transaction_id) = path.into_inner();
    let store = store.into_inner();

    let transaction = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.get_transaction(&path, transaction_id)
    })
    .await?
    {
        Ok(t) => t,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Transaction,
                "Failed to get transaction",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputTransaction::from(transaction)))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
    transaction_data: web::Json<TransactionUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(transaction_data.validate())?;

    let (budget_id, transaction_id) = path.into_inner();
    let store = store.into_inner();

    let transaction = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.update_transaction(&path, transaction_id, &transaction_data)
    })
    .await?
    {
        Ok(t) => t,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Transaction,
                "Failed to update transaction",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputTransaction::from(transaction)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, transaction_id) = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.delete_transaction(&path, transaction_id)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Transaction,
                "Failed to delete transaction",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}
