use actix_web::{web, HttpResponse};
use envelope_common::calc;
use envelope_common::request_io::{EnvelopeUpdate, InputEnvelope, InputMonth, OutputEnvelope};
use envelope_common::store::{ResolvePath, Store};
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::handlers::{check, month_param};

pub async fn get_all(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id) = path.into_inner();
    let store = store.into_inner();

    let envelopes = match web::block(move || {
        let path = store.resolve_category(budget_id, category_id)?;
        store.get_envelopes(&path)
    })
    .await?
    {
        Ok(e) => e,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Category,
                "Failed to get envelopes",
            ));
        }
    };

    let envelopes = envelopes
        .into_iter()
        .map(|envelope| OutputEnvelope::new(budget_id, envelope))
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(envelopes))
}

pub async fn create(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
    envelope_data: web::Json<InputEnvelope>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(envelope_data.validate())?;

    let (budget_id, category_id) = path.into_inner();
    let store = store.into_inner();

    let envelope = match web::block(move || {
        let path = store.resolve_category(budget_id, category_id)?;
        store.create_envelope(&path, &envelope_data)
    })
    .await?
    {
        Ok(e) => e,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Category,
                "Failed to create envelope",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputEnvelope::new(budget_id, envelope)))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    let envelope = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        store.envelope(&path)
    })
    .await?
    {
        Ok(e) => e,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Envelope,
                "Failed to get envelope",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputEnvelope::new(budget_id, envelope)))
}

/// Also moves the envelope when `category_id` is given. The target category must be in the
/// same budget.
pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    envelope_data: web::Json<EnvelopeUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(envelope_data.validate())?;

    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    let envelope = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        store.update_envelope(&path, &envelope_data)
    })
    .await?
    {
        Ok(e) => e,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Envelope,
                "Failed to update envelope",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputEnvelope::new(budget_id, envelope)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        store.delete_envelope(&path)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Envelope,
                "Failed to delete envelope",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_month(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    query: web::Query<InputMonth>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let month = month_param(&query)?;
    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    let envelope_month = match web::block(move || {
        calc::envelope_month(store.as_ref(), budget_id, category_id, envelope_id, month)
    })
    .await?
    {
        Ok(m) => m,
        Err(e) => return Err(HttpErrorResponse::from_calc(e, "Failed to get envelope month")),
    };

    Ok(HttpResponse::Ok().json(envelope_month))
}
