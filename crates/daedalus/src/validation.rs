//! Contract validation preset.
//!
//! [`ContractValidation`] turns [`ValidationSettings`] and an error handler
//! into the validator middleware, in the order they must be appended. Once
//! built, the request passes through them as
//! `stamp → response → path params → query → body → handler`.

use std::sync::Arc;

use daedalus_config::{DaedalusConfig, ValidationSettings};
use daedalus_core::{BasicSchemaValidator, SchemaValidator};
use daedalus_middleware::{
    BodyValidator, ErrorHandler, PathExtractor, PathParameterExtractor, QueryValidator,
    ResponseBodyValidator,
};

use crate::options::RouterOption;

/// The contract validators, configured together.
///
/// # Example
///
/// ```
/// use daedalus::{ContractValidation, RouterOption};
/// use daedalus::middleware::json_error_handler;
///
/// let options: Vec<RouterOption> =
///     ContractValidation::new(json_error_handler(http::StatusCode::BAD_REQUEST)).into_options();
/// assert_eq!(options.len(), 3);
/// ```
#[derive(Clone)]
pub struct ContractValidation {
    settings: ValidationSettings,
    error_handler: ErrorHandler,
    schema_validator: Arc<dyn SchemaValidator>,
    path_extractor: Option<PathExtractor>,
}

impl ContractValidation {
    /// Default settings with the built-in schema validator.
    #[must_use]
    pub fn new(error_handler: ErrorHandler) -> Self {
        Self {
            settings: ValidationSettings::default(),
            error_handler,
            schema_validator: Arc::new(BasicSchemaValidator),
            path_extractor: None,
        }
    }

    /// Uses the `[validation]` section of a loaded configuration.
    #[must_use]
    pub fn from_config(config: &DaedalusConfig, error_handler: ErrorHandler) -> Self {
        Self::new(error_handler).settings(config.validation.clone())
    }

    /// Replaces the settings.
    #[must_use]
    pub fn settings(mut self, settings: ValidationSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Replaces the schema validator used for bodies and responses.
    #[must_use]
    pub fn schema_validator(mut self, validator: Arc<dyn SchemaValidator>) -> Self {
        self.schema_validator = validator;
        self
    }

    /// Reads raw path parameters with `extractor` instead of the default engine's captures.
    #[must_use]
    pub fn path_extractor(mut self, extractor: PathExtractor) -> Self {
        self.path_extractor = Some(extractor);
        self
    }

    /// Router options for every enabled validator, in append order.
    #[must_use]
    pub fn into_options(self) -> Vec<RouterOption> {
        let Self {
            settings,
            error_handler,
            schema_validator,
            path_extractor,
        } = self;
        let mut options = Vec::with_capacity(4);

        if settings.body {
            options.push(RouterOption::middleware(
                BodyValidator::new(error_handler.clone())
                    .with_schema_validator(Arc::clone(&schema_validator)),
            ));
        }
        if settings.query {
            options.push(RouterOption::middleware(
                QueryValidator::new(error_handler.clone())
                    .continue_on_error(settings.continue_on_query_error),
            ));
        }
        if settings.path_params {
            options.push(RouterOption::middleware(
                path_extractor.map_or_else(PathParameterExtractor::default, PathParameterExtractor::new),
            ));
        }
        if settings.responses {
            options.push(RouterOption::middleware(
                ResponseBodyValidator::new(error_handler)
                    .with_schema_validator(schema_validator)
                    .report_decode_errors(settings.report_response_decode_errors),
            ));
        }

        options
    }
}

impl IntoIterator for ContractValidation {
    type Item = RouterOption;
    type IntoIter = std::vec::IntoIter<RouterOption>;

    fn into_iter(self) -> Self::IntoIter {
        self.into_options().into_iter()
    }
}

impl std::fmt::Debug for ContractValidation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractValidation")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
