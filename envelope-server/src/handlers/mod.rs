pub mod account;
pub mod allocation;
pub mod budget;
pub mod category;
pub mod envelope;
pub mod health;
pub mod transaction;

use chrono::{DateTime, Utc};
use envelope_common::month::{self, MonthError};
use envelope_common::request_io::InputMonth;
use envelope_common::validators::Validity;

use self::error::HttpErrorResponse;

fn check(validity: Validity) -> Result<(), HttpErrorResponse> {
    match validity {
        Validity::Valid => Ok(()),
        Validity::Invalid(msg) => Err(HttpErrorResponse::InvalidInput(msg)),
    }
}

/// Reads the `month` query parameter. A missing month comes back as the zero timestamp, which
/// the calculators turn into `InvalidMonth`.
fn month_param(query: &InputMonth) -> Result<DateTime<Utc>, HttpErrorResponse> {
    month::parse_month_param(query.month.as_deref()).map_err(|e| match e {
        MonthError::Unparseable => HttpErrorResponse::IncorrectlyFormed(e.to_string()),
        MonthError::Unset | MonthError::OutOfRange | MonthError::YearOutOfRange => {
            HttpErrorResponse::InvalidMonth(e.to_string())
        }
    })
}

pub mod error {
    use actix_web::error::{BlockingError, JsonPayloadError, PathError, QueryPayloadError};
    use actix_web::http::StatusCode;
    use actix_web::{web, HttpRequest, HttpResponse};
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use envelope_common::calc::{CalcError, ResourceKind};
    use envelope_common::db::DaoError;
    use envelope_common::request_io::{ErrorType, ServerErrorResponse};
    use std::fmt;
    use uuid::Uuid;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum DoesNotExistType {
        Budget,
        Account,
        Category,
        Envelope,
        Allocation,
        Transaction,
        AccountOrEnvelope,
    }

    impl fmt::Display for DoesNotExistType {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let name = match self {
                DoesNotExistType::Budget => "Budget",
                DoesNotExistType::Account => "Account",
                DoesNotExistType::Category => "Category",
                DoesNotExistType::Envelope => "Envelope",
                DoesNotExistType::Allocation => "Allocation",
                DoesNotExistType::Transaction => "Transaction",
                DoesNotExistType::AccountOrEnvelope => "Account or envelope",
            };

            write!(f, "{name}")
        }
    }

    impl From<ResourceKind> for DoesNotExistType {
        fn from(kind: ResourceKind) -> Self {
            match kind {
                ResourceKind::Budget => DoesNotExistType::Budget,
                ResourceKind::Account => DoesNotExistType::Account,
                ResourceKind::Envelope => DoesNotExistType::Envelope,
            }
        }
    }

    #[derive(Debug)]
    pub enum HttpErrorResponse {
        // 400
        IncorrectlyFormed(String),
        InvalidMonth(String),
        InvalidInput(String),
        ConflictWithExisting(String),

        // 404
        DoesNotExist(String, DoesNotExistType),

        // 500
        InternalError(String),
    }

    impl HttpErrorResponse {
        pub fn not_found(dne_type: DoesNotExistType) -> Self {
            HttpErrorResponse::DoesNotExist(format!("{dne_type} not found"), dne_type)
        }

        /// Logs the underlying error under a new correlation ID. Only the ID and `context` are
        /// sent to the client.
        pub fn internal<E: fmt::Display>(error: E, context: &str) -> Self {
            let correlation_id = Uuid::now_v7();
            log::error!("[{correlation_id}] {context}: {error}");

            HttpErrorResponse::InternalError(format!("{context} (error ID {correlation_id})"))
        }

        /// Maps a store error for a request that targets a `dne_type` resource.
        pub fn from_dao(error: DaoError, dne_type: DoesNotExistType, context: &str) -> Self {
            match error {
                DaoError::QueryFailure(DieselError::NotFound) => Self::not_found(dne_type),
                DaoError::QueryFailure(DieselError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    _,
                )) => HttpErrorResponse::ConflictWithExisting(format!(
                    "{dne_type} conflicts with an existing one"
                )),
                DaoError::CannotRunQuery(msg) => HttpErrorResponse::InvalidInput(String::from(msg)),
                e => Self::internal(e, context),
            }
        }

        pub fn from_calc(error: CalcError, context: &str) -> Self {
            match error {
                CalcError::InvalidMonth(e) => HttpErrorResponse::InvalidMonth(e.to_string()),
                CalcError::NotFound(kind) => Self::not_found(kind.into()),
                CalcError::Store(e) => Self::internal(e, context),
            }
        }
    }

    impl std::error::Error for HttpErrorResponse {}

    impl fmt::Display for HttpErrorResponse {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            let server_error: ServerErrorResponse = self.into();
            write!(f, "{:?}", server_error)
        }
    }

    impl From<HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: HttpErrorResponse) -> Self {
            (&resp).into()
        }
    }

    impl From<&HttpErrorResponse> for ServerErrorResponse {
        fn from(resp: &HttpErrorResponse) -> Self {
            match resp {
                // 400
                HttpErrorResponse::IncorrectlyFormed(msg) => ServerErrorResponse {
                    error_type: ErrorType::IncorrectlyFormed,
                    message: format!("Incorrectly formed request: {msg}"),
                },
                HttpErrorResponse::InvalidMonth(msg) => ServerErrorResponse {
                    error_type: ErrorType::InvalidMonth,
                    message: format!("Invalid month: {msg}"),
                },
                HttpErrorResponse::InvalidInput(msg) => ServerErrorResponse {
                    error_type: ErrorType::InvalidInput,
                    message: format!("Invalid input: {msg}"),
                },
                HttpErrorResponse::ConflictWithExisting(msg) => ServerErrorResponse {
                    error_type: ErrorType::ConflictWithExisting,
                    message: format!("Conflict with existing data: {msg}"),
                },

                // 404
                HttpErrorResponse::DoesNotExist(msg, _) => ServerErrorResponse {
                    error_type: ErrorType::DoesNotExist,
                    message: msg.clone(),
                },

                // 500
                HttpErrorResponse::InternalError(msg) => ServerErrorResponse {
                    error_type: ErrorType::InternalError,
                    message: format!("Internal error: {msg}"),
                },
            }
        }
    }

    impl actix_web::error::ResponseError for HttpErrorResponse {
        fn error_response(&self) -> HttpResponse {
            HttpResponse::build(self.status_code()).json(ServerErrorResponse::from(self))
        }

        fn status_code(&self) -> StatusCode {
            match *self {
                HttpErrorResponse::IncorrectlyFormed(_)
                | HttpErrorResponse::InvalidMonth(_)
                | HttpErrorResponse::InvalidInput(_)
                | HttpErrorResponse::ConflictWithExisting(_) => StatusCode::BAD_REQUEST,
                HttpErrorResponse::DoesNotExist(_, _) => StatusCode::NOT_FOUND,
                HttpErrorResponse::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            }
        }
    }

    impl From<BlockingError> for HttpErrorResponse {
        fn from(result: BlockingError) -> Self {
            HttpErrorResponse::internal(result, "Actix thread pool failure")
        }
    }

    // Extractor failures answer with the same JSON error body as the handlers

    pub fn json_config() -> web::JsonConfig {
        web::JsonConfig::default().error_handler(|err: JsonPayloadError, _req: &HttpRequest| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    pub fn query_config() -> web::QueryConfig {
        web::QueryConfig::default().error_handler(|err: QueryPayloadError, _req: &HttpRequest| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    pub fn path_config() -> web::PathConfig {
        web::PathConfig::default().error_handler(|err: PathError, _req: &HttpRequest| {
            HttpErrorResponse::IncorrectlyFormed(err.to_string()).into()
        })
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use actix_web::ResponseError;

        #[test]
        fn test_error_body_and_status() {
            let resp = HttpErrorResponse::not_found(DoesNotExistType::Envelope);
            assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);

            let body = ServerErrorResponse::from(&resp);
            assert_eq!(body.error_type, ErrorType::DoesNotExist);
            assert_eq!(body.message, "Envelope not found");
        }

        #[test]
        fn test_dao_error_mapping() {
            let not_found = HttpErrorResponse::from_dao(
                DaoError::QueryFailure(DieselError::NotFound),
                DoesNotExistType::Transaction,
                "Failed to get transaction",
            );
            assert!(matches!(
                not_found,
                HttpErrorResponse::DoesNotExist(_, DoesNotExistType::Transaction)
            ));

            let conflict = HttpErrorResponse::from_dao(
                DaoError::QueryFailure(DieselError::DatabaseError(
                    DatabaseErrorKind::UniqueViolation,
                    Box::new(String::from("duplicate key")),
                )),
                DoesNotExistType::Allocation,
                "Failed to create allocation",
            );
            assert!(matches!(conflict, HttpErrorResponse::ConflictWithExisting(_)));
            assert_eq!(conflict.status_code(), StatusCode::BAD_REQUEST);

            let internal = HttpErrorResponse::from_dao(
                DaoError::QueryFailure(DieselError::RollbackTransaction),
                DoesNotExistType::Budget,
                "Failed to get budget",
            );
            assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

            let body = ServerErrorResponse::from(&internal);
            assert!(body.message.contains("Failed to get budget"));
            assert!(!body.message.contains("rollback"));
        }
    }
}
