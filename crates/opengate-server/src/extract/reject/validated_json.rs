//! JSON extractor with declarative validation.

use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::Validate;

use super::Json;
use crate::handler::{Error, ErrorKind};

/// JSON body extractor that validates the payload before the handler runs.
///
/// Request types declare their rules with `validator` derive attributes;
/// handlers taking this extractor only ever see shape-valid input. A failed
/// rule rejects the request with 400 and the offending fields in context.
#[must_use]
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidateJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidateJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = Error<'static>;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;

        value.validate().map_err(|errors| {
            ErrorKind::BadRequest
                .with_message("The request could not be processed due to invalid data")
                .with_context(errors.to_string())
        })?;

        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize, Validate)]
    struct SampleRequest {
        #[validate(email)]
        email: String,
        #[validate(length(min = 8))]
        password: String,
    }

    #[test]
    fn validation_rules_apply() {
        let valid = SampleRequest {
            email: "user@example.com".to_owned(),
            password: "long-enough".to_owned(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = SampleRequest {
            email: "not-an-email".to_owned(),
            password: "long-enough".to_owned(),
        };
        assert!(bad_email.validate().is_err());

        let short_password = SampleRequest {
            email: "user@example.com".to_owned(),
            password: "short".to_owned(),
        };
        assert!(short_password.validate().is_err());
    }
}
