use actix_web::{web, HttpResponse};
use envelope_common::calc;
use envelope_common::request_io::{BudgetUpdate, InputBudget, InputMonth, OutputBudget};
use envelope_common::store::{BudgetStore, Ledger, ResolvePath, Store};
use uuid::Uuid;

use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};
use crate::handlers::{check, month_param};

pub async fn get_all(store: web::Data<dyn Store>) -> Result<HttpResponse, HttpErrorResponse> {
    let store = store.into_inner();

    let budgets = match web::block(move || store.get_all_budgets()).await? {
        Ok(b) => b,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to get budgets",
            ));
        }
    };

    let budgets = budgets
        .into_iter()
        .map(OutputBudget::from)
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(budgets))
}

pub async fn create(
    store: web::Data<dyn Store>,
    budget_data: web::Json<InputBudget>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(budget_data.validate())?;

    let store = store.into_inner();
    let budget = match web::block(move || store.create_budget(&budget_data)).await? {
        Ok(b) => b,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to create budget",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputBudget::from(budget)))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = path.into_inner();
    let store = store.into_inner();

    let budget = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.budget(&path)
    })
    .await?
    {
        Ok(b) => b,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to get budget",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputBudget::from(budget)))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    budget_data: web::Json<BudgetUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(budget_data.validate())?;

    let budget_id = path.into_inner();
    let store = store.into_inner();

    let budget = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.update_budget(&path, &budget_data)
    })
    .await?
    {
        Ok(b) => b,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to update budget",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputBudget::from(budget)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.delete_budget(&path)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to delete budget",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}

pub async fn get_month(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    query: web::Query<InputMonth>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let month = month_param(&query)?;
    let budget_id = path.into_inner();
    let store = store.into_inner();

    let budget_month =
        match web::block(move || calc::budget_month(store.as_ref(), budget_id, month)).await? {
            Ok(m) => m,
            Err(e) => return Err(HttpErrorResponse::from_calc(e, "Failed to get budget month")),
        };

    Ok(HttpResponse::Ok().json(budget_month))
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_utils::{self, create, delete, error_type, get, patch, post};

    #[actix_rt::test]
    async fn test_create_get_and_list() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let id = create(
            &app,
            "/api/budgets",
            json!({ "name": "Household", "currency": "EUR" }),
        )
        .await;

        let (status, budget) = get(&app, &format!("/api/budgets/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(budget["name"], "Household");
        assert_eq!(budget["note"], "");
        assert_eq!(budget["currency"], "EUR");
        assert_eq!(budget["links"]["self"], format!("/api/budgets/{id}"));
        assert_eq!(
            budget["links"]["categories"],
            format!("/api/budgets/{id}/categories")
        );

        create(&app, "/api/budgets", json!({ "name": "Vacation" })).await;

        let (status, budgets) = get(&app, "/api/budgets").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(budgets.as_array().unwrap().len(), 2);
        assert_eq!(budgets[0]["id"], id.as_str());
    }

    #[actix_rt::test]
    async fn test_invalid_budget_is_rejected() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let (status, body) = post(&app, "/api/budgets", json!({ "name": "  " })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_type(&body), "InvalidInput");

        let (status, body) = post(&app, "/api/budgets", json!({ "note": "no name" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_type(&body), "IncorrectlyFormed");
    }

    #[actix_rt::test]
    async fn test_patch_keeps_absent_fields() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let id = create(
            &app,
            "/api/budgets",
            json!({ "name": "Household", "note": "Shared", "currency": "EUR" }),
        )
        .await;
        let uri = format!("/api/budgets/{id}");

        let (status, budget) = patch(&app, &uri, json!({ "note": "" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(budget["name"], "Household");
        assert_eq!(budget["note"], "");
        assert_eq!(budget["currency"], "EUR");
    }

    #[actix_rt::test]
    async fn test_delete_cascades() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let id = create(&app, "/api/budgets", json!({ "name": "Household" })).await;
        let category_id = create(
            &app,
            &format!("/api/budgets/{id}/categories"),
            json!({ "name": "Food" }),
        )
        .await;

        let (status, _) = delete(&app, &format!("/api/budgets/{id}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, body) = get(&app, &format!("/api/budgets/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_type(&body), "DoesNotExist");

        let (status, _) = get(
            &app,
            &format!("/api/budgets/{id}/categories/{category_id}"),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = delete(&app, &format!("/api/budgets/{id}")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_rt::test]
    async fn test_malformed_budget_id() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let (status, body) = get(&app, "/api/budgets/not-a-uuid").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_type(&body), "IncorrectlyFormed");
    }

    #[actix_rt::test]
    async fn test_budget_month_requires_month() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let id = create(&app, "/api/budgets", json!({ "name": "Household" })).await;
        let missing = uuid::Uuid::now_v7();

        for uri in [
            format!("/api/budgets/{id}/month"),
            format!("/api/budgets/{id}/month?month="),
            format!("/api/budgets/{id}/month?month=0001-01-01T00:00:00Z"),
            format!("/api/budgets/{missing}/month"),
        ] {
            let (status, body) = get(&app, &uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(error_type(&body), "InvalidMonth", "{uri}");
        }

        let (status, body) = get(&app, &format!("/api/budgets/{id}/month?month=March")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_type(&body), "IncorrectlyFormed");

        let (status, body) = get(&app, &format!("/api/budgets/{missing}/month?month=2022-01")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_type(&body), "DoesNotExist");

        let (status, body) = get(&app, &format!("/api/budgets/{id}/month?month=2022-01")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month"], "2022-01-01T00:00:00Z");
        assert_eq!(body["envelopes"], json!([]));
    }
}
