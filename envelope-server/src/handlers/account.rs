use actix_web::{web, HttpResponse};
use envelope_common::calc;
use envelope_common::db::DaoError;
use envelope_common::request_io::{AccountBalance, AccountUpdate, InputAccount, OutputAccount};
use envelope_common::store::{AccountStore, Ledger, Store};
use uuid::Uuid;

use crate::handlers::check;
use crate::handlers::error::{DoesNotExistType, HttpErrorResponse};

pub async fn get_all(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let budget_id = path.into_inner();
    let store = store.into_inner();

    let accounts = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        calc::accounts_with_balances(store.as_ref(), &path)
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to get accounts",
            ));
        }
    };

    let accounts = accounts
        .into_iter()
        .map(|(account, balance)| OutputAccount::new(account, balance))
        .collect::<Vec<_>>();

    Ok(HttpResponse::Ok().json(accounts))
}

pub async fn create(
    store: web::Data<dyn Store>,
    path: web::Path<Uuid>,
    account_data: web::Json<InputAccount>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(account_data.validate())?;

    let budget_id = path.into_inner();
    let store = store.into_inner();

    let account = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.create_account(&path, &account_data)
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Budget,
                "Failed to create account",
            ));
        }
    };

    Ok(HttpResponse::Created().json(OutputAccount::new(account, AccountBalance::default())))
}

pub async fn get(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, account_id) = path.into_inner();
    let store = store.into_inner();

    let (account, balance) = match web::block(move || {
        calc::account_balance(store.as_ref(), budget_id, account_id)
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => return Err(HttpErrorResponse::from_calc(e, "Failed to get account")),
    };

    Ok(HttpResponse::Ok().json(OutputAccount::new(account, balance)))
}

pub async fn edit(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
    account_data: web::Json<AccountUpdate>,
) -> Result<HttpResponse, HttpErrorResponse> {
    check(account_data.validate())?;

    let (budget_id, account_id) = path.into_inner();
    let store = store.into_inner();

    let (account, balance) = match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        let account = store.update_account(&path, account_id, &account_data)?;
        let transactions = store.transactions_for_account(account.id)?;

        let balance = calc::balance_for(account.id, &transactions);
        Ok::<_, DaoError>((account, balance))
    })
    .await?
    {
        Ok(a) => a,
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Account,
                "Failed to update account",
            ));
        }
    };

    Ok(HttpResponse::Ok().json(OutputAccount::new(account, balance)))
}

pub async fn delete(
    store: web::Data<dyn Store>,
    path: web::Path<(Uuid, Uuid)>,
) -> Result<HttpResponse, HttpErrorResponse> {
    let (budget_id, account_id) = path.into_inner();
    let store = store.into_inner();

    match web::block(move || {
        let path = store.resolve_budget(budget_id)?;
        store.delete_account(&path, account_id)
    })
    .await?
    {
        Ok(_) => (),
        Err(e) => {
            return Err(HttpErrorResponse::from_dao(
                e,
                DoesNotExistType::Account,
                "Failed to delete account",
            ));
        }
    };

    Ok(HttpResponse::NoContent().finish())
}

#[cfg(test)]
mod tests {
    use actix_web::http::StatusCode;
    use serde_json::json;

    use crate::handlers::test_utils::{self, create, delete, error_type, get, patch, post};

    #[actix_rt::test]
    async fn test_account_balances() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let budget = create(&app, "/api/budgets", json!({ "name": "Household" })).await;
        let accounts = format!("/api/budgets/{budget}/accounts");

        let checking = create(&app, &accounts, json!({ "name": "Checking" })).await;
        let shop = create(
            &app,
            &accounts,
            json!({ "name": "Shop", "on_budget": false, "external": true }),
        )
        .await;

        let transactions = format!("/api/budgets/{budget}/transactions");
        for (amount, reconciled) in [("10.00", true), ("5.25", false)] {
            create(
                &app,
                &transactions,
                json!({
                    "date": "2022-01-10T00:00:00Z",
                    "amount": amount,
                    "source_account_id": checking,
                    "destination_account_id": shop,
                    "reconciled_source": reconciled,
                }),
            )
            .await;
        }

        let (status, account) = get(&app, &format!("{accounts}/{checking}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(account["balance"], "-15.25");
        assert_eq!(account["reconciled_balance"], "-10.00");
        assert_eq!(account["on_budget"], true);
        assert_eq!(account["external"], false);

        let (status, all) = get(&app, &accounts).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(all.as_array().unwrap().len(), 2);
        assert_eq!(all[1]["id"], shop.as_str());
        assert_eq!(all[1]["balance"], "15.25");
        assert_eq!(all[1]["reconciled_balance"], "0");

        let (status, renamed) = patch(
            &app,
            &format!("{accounts}/{checking}"),
            json!({ "name": "Main" }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(renamed["name"], "Main");
        assert_eq!(renamed["balance"], "-15.25");
    }

    #[actix_rt::test]
    async fn test_account_under_other_budget_is_not_found() {
        let app = test_utils::init_app(test_utils::memory_store()).await;

        let first = create(&app, "/api/budgets", json!({ "name": "First" })).await;
        let second = create(&app, "/api/budgets", json!({ "name": "Second" })).await;
        let account = create(
            &app,
            &format!("/api/budgets/{first}/accounts"),
            json!({ "name": "Checking" }),
        )
        .await;

        let uri = format!("/api/budgets/{second}/accounts/{account}");

        let (status, body) = get(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_type(&body), "DoesNotExist");

        let (status, _) = patch(&app, &uri, json!({ "name": "Stolen" })).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = delete(&app, &uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = delete(&app, &format!("/api/budgets/{first}/accounts/{account}")).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[actix_rt::test]
    async fn test_accounts_of_missing_budget() {
        let app = test_utils::init_app(test_utils::memory_store()).await;
        let missing = uuid::Uuid::now_v7();

        let (status, body) = get(&app, &format!("/api/budgets/{missing}/accounts")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "Budget not found");

        let (status, _) = post(
            &app,
            &format!("/api/budgets/{missing}/accounts"),
            json!({ "name": "Checking" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
