use actix_web::{web, HttpResponse};
use envelope_common::db::DaoError;
use envelope_common::request_io::{
    envelope_href, AllocationUpdate, InputAllocation, OutputAllocation,
};
use envelope_common::store::{AllocationStore, ResolvePath, Store};
use uuid::Uuid;

use crate::handlers::check;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};

pub async fn get_all(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    let allocations = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        store.get_allocations(&path)
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Envelope,
                "Failed to get allocations",
            ));
        }
    };

    let href = envelope_href(budget_id, category_id, envelope_id);
    let allocations = allocations
        .into_iter()
        .map(|allocation| OutputAllocation::new(&href, allocation))
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(allocations))
}

pub async fn create(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid)>,
    allocation_data: web::Json<InputAllocation>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(allocation_data.validate())?;

    let (budget_id, category_id, envelope_id) = path.into_inner();
    let store = store.into_inner();

    let (href, allocation) = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        let allocation = store.create_allocation(&path, &allocation_data)?;
        Ok::<_, DaoError>((path.href(), allocation))
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Envelope,
                "Failed to create allocation",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputAllocation::new(&href, allocation)))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id, envelope_id, allocation_id) = path.into_inner();
    let store = store.into_inner();

    let (href, allocation) = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        let allocation = store.get_allocation(&path, allocation_id)?;
        Ok::<_, DaoError>((path.href(), allocation))
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Allocation,
                "Failed to get allocation",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputAllocation::new(&href, allocation)))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid, Uuid)>,
    allocation_data: web::Json<AllocationUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(allocation_data.validate())?;

    let (budget_id, category_id, envelope_id, allocation_id) = path.into_inner();
    let store = store.into_inner();

    let (href, allocation) = match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        let allocation = store.update_allocation(&path, allocation_id, &allocation_data)?;
        Ok::<_, DaoError>((path.href(), allocation))
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Allocation,
                "Failed to update allocation",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputAllocation::new(&href, allocation)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid, Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id, envelope_id, allocation_id) = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_envelope(budget_id, category_id, envelope_id)?;
        store.delete_allocation(&path, allocation_id)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Allocation,
                "Failed to delete allocation",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}
