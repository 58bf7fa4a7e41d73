use actix_web::{web, HttpResponse};
use envelope_common::request_io::{CategoryUpdate, InputCategory, OutputCategory};
use envelope_common::store::{CategoryStore, ResolvePath, Store};
use uuid::Uuid;

use crate::handlers::check;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};

pub async fn get_all(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = path.into_inner();
    let store = store.into_inner();

    let categories = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.get_categories(&path)
    })
    .await?
    {
        Ok(c) => c,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to get categories",
            ));
        }
    };

    let categories = categories
        .into_iter()
        .map(OutputCategory::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(categories))
}

pub async fn create(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    category_data: web::Json<InputCategory>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(category_data.validate())?;

    let budget_id = path.into_inner();
    let store = store.into_inner();

    let category = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.create_category(&path, &category_data)
    })
    .await?
    {
        Ok(c) => c,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to create category",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputCategory::from(category)))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id) = path.into_inner();
    let store = store.into_inner();

    let category = match web::block(move || {
        let path = store.resolve_category(budget_id, category_id)?;
        store.get_category(&path)
    })
    .await?
    {
        Ok(c) => c,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Category,
                "Failed to get category",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputCategory::from(category)))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
    category_data: web::Json<CategoryUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(category_data.validate())?;

    let (budget_id, category_id) = path.into_inner();
    let store = store.into_inner();

    let category = match web::block(move || {
        let path = store.resolve_category(budget_id, category_id)?;
        store.update_category(&path, &category_data)
    })
    .await?
    {
        Ok(c) => c,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Category,
                "Failed to update category",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputCategory::from(category)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, category_id) = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_category(budget_id, category_id)?;
        store.delete_category(&path)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Category,
                "Failed to delete category",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}
